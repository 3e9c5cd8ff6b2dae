use crate::civil_time::{CivilTime, Clock, SystemClock};
use crate::fetch::Fetch;
use crate::manifest::{
    Endpoint, IndexedManifest, Manifest, Variant, CURRENT_HOUR_FIELD, TODAY_FIELD,
};
use crate::LoadError;
use chrono_tz::Tz;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// The data object handed to a page renderer. Every field of the variant is
/// always present.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    variant: Variant,
    fields: Map<String, Value>,
}

impl LoadResult {
    /// All fields at their empty defaults.
    pub fn empty(variant: Variant) -> Self {
        Self {
            variant,
            fields: variant.empty_fields(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Elements of a list field; empty for a missing or non-list field.
    pub fn list(&self, field: &str) -> &[Value] {
        self.fields
            .get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn today(&self) -> Option<&str> {
        self.fields.get(TODAY_FIELD).and_then(Value::as_str)
    }

    pub fn current_hour(&self) -> Option<i64> {
        self.fields.get(CURRENT_HOUR_FIELD).and_then(Value::as_i64)
    }

    pub fn is_empty_default(&self) -> bool {
        self.fields == self.variant.empty_fields()
    }
}

impl Serialize for LoadResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// What a page load produced. Both arms carry a complete result; a degraded
/// one holds only defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(LoadResult),
    Degraded(LoadResult),
}

impl LoadOutcome {
    pub fn result(&self) -> &LoadResult {
        match self {
            LoadOutcome::Loaded(result) | LoadOutcome::Degraded(result) => result,
        }
    }

    pub fn into_result(self) -> LoadResult {
        match self {
            LoadOutcome::Loaded(result) | LoadOutcome::Degraded(result) => result,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, LoadOutcome::Degraded(_))
    }
}

pub struct PageDataLoader<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    timezone: Tz,
}

impl<F: Fetch> PageDataLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            clock: SystemClock,
            timezone: crate::DEFAULT_TIMEZONE,
        }
    }
}

impl<F: Fetch, C: Clock> PageDataLoader<F, C> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> PageDataLoader<F, C2> {
        PageDataLoader {
            fetcher: self.fetcher,
            clock,
            timezone: self.timezone,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Loads every field of `variant`. Never fails: any error is logged and
    /// the whole result falls back to its empty defaults.
    pub fn load(&self, variant: Variant) -> LoadOutcome {
        match self.try_load(variant) {
            Ok(result) => {
                info!(
                    "Page data loaded — variant={} fields={}",
                    variant,
                    result.fields.len()
                );
                LoadOutcome::Loaded(result)
            }
            Err(e) => {
                error!(
                    "Error loading page data; rendering empty defaults — variant={} path={} error={}",
                    variant,
                    e.path(),
                    e
                );
                LoadOutcome::Degraded(LoadResult::empty(variant))
            }
        }
    }

    /// Same as [`load`](Self::load) but hands back the first failure instead
    /// of the defaults.
    pub fn try_load(&self, variant: Variant) -> Result<LoadResult, LoadError> {
        let mut fields = match variant.manifest() {
            Manifest::Fixed(endpoints) => self.load_fixed(endpoints)?,
            Manifest::Indexed(indexed) => self.load_indexed(&indexed)?,
        };

        if variant.derives_civil_time() {
            let civil = CivilTime::now(&self.clock, self.timezone);
            debug!(
                "Derived civil time — timezone={} today={} current_hour={}",
                self.timezone, civil.today, civil.current_hour
            );
            fields.insert(TODAY_FIELD.to_string(), Value::from(civil.today));
            fields.insert(CURRENT_HOUR_FIELD.to_string(), Value::from(civil.current_hour));
        }

        Ok(LoadResult { variant, fields })
    }

    fn load_fixed(&self, endpoints: &[Endpoint]) -> Result<Map<String, Value>, LoadError> {
        let values = endpoints
            .par_iter()
            .map(|endpoint| -> Result<_, LoadError> {
                let value = self.fetch_json(endpoint.field, endpoint.path)?;
                Ok((endpoint.field, unwrap_field(endpoint, value)?))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        Ok(values
            .into_iter()
            .map(|(field, value)| (field.to_string(), value))
            .collect())
    }

    fn load_indexed(&self, manifest: &IndexedManifest) -> Result<Map<String, Value>, LoadError> {
        let index = self.fetch_json(manifest.index_field, manifest.index_path)?;
        let ids = city_ids(&index).ok_or_else(|| {
            warn!(
                "Index is not a list of identifiers — field={} path={}",
                manifest.index_field, manifest.index_path
            );
            LoadError::InvalidIndex {
                path: manifest.index_path.to_string(),
            }
        })?;
        debug!(
            "Index loaded — path={} entries={}",
            manifest.index_path,
            ids.len()
        );

        let details = ids
            .par_iter()
            .map(|id| -> Result<_, LoadError> {
                let path = manifest.detail_path(id);
                let value = self.fetch_json(manifest.detail_field, &path)?;
                Ok((id.to_string(), value))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let mut fields = Map::new();
        fields.insert(manifest.index_field.to_string(), index);
        fields.insert(
            manifest.detail_field.to_string(),
            Value::Object(details.into_iter().collect()),
        );
        Ok(fields)
    }

    fn fetch_json(&self, field: &str, path: &str) -> Result<Value, LoadError> {
        let parsed = self.fetcher.fetch(path).and_then(|bytes| {
            serde_json::from_slice::<Value>(&bytes).map_err(|source| LoadError::Decode {
                path: path.to_string(),
                source,
            })
        });
        if let Err(e) = &parsed {
            warn!("Field failed to load — field={} path={} error={}", field, path, e);
        }
        parsed
    }
}

/// A missing key surfaces as null; a body that is not an object at all fails.
fn unwrap_field(endpoint: &Endpoint, value: Value) -> Result<Value, LoadError> {
    match (endpoint.unwrap, value) {
        (Some(key), Value::Object(mut object)) => Ok(object.remove(key).unwrap_or(Value::Null)),
        (Some(key), _) => {
            warn!(
                "Expected an object to unwrap — field={} path={} key={}",
                endpoint.field, endpoint.path, key
            );
            Err(LoadError::UnexpectedShape {
                path: endpoint.path.to_string(),
            })
        }
        (None, value) => Ok(value),
    }
}

fn city_ids(index: &Value) -> Option<Vec<&str>> {
    index.as_array()?.iter().map(Value::as_str).collect()
}
