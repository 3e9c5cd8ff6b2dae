use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Field name of the derived civil date.
pub const TODAY_FIELD: &str = "today";
/// Field name of the derived civil hour.
pub const CURRENT_HOUR_FIELD: &str = "currentHour";

/// Placeholder replaced by each city identifier in a detail path template.
const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    List,
    Map,
    Nullable,
}

impl FieldShape {
    /// The value a field of this shape takes when a load degrades.
    pub fn empty(self) -> Value {
        match self {
            FieldShape::List => Value::Array(Vec::new()),
            FieldShape::Map => Value::Object(Map::new()),
            FieldShape::Nullable => Value::Null,
        }
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldShape::List => "list",
            FieldShape::Map => "map",
            FieldShape::Nullable => "nullable",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub field: &'static str,
    pub path: &'static str,
    pub shape: FieldShape,
    /// When set, only this key of the response object is surfaced.
    pub unwrap: Option<&'static str>,
}

impl Endpoint {
    const fn list(field: &'static str, path: &'static str) -> Self {
        Self {
            field,
            path,
            shape: FieldShape::List,
            unwrap: None,
        }
    }
}

const HISTORIC_TEMP: Endpoint = Endpoint::list("historicTemp", "/historic_temp.json");
const HISTORIC_RAIN: Endpoint = Endpoint::list("historicRain", "/historic_rain.json");
const OBSERVATIONS: Endpoint = Endpoint::list("observations", "/observations.json");
const FORECASTS: Endpoint = Endpoint::list("forecasts", "/forecasts.json");
const CLIMATE: Endpoint = Endpoint::list("climate", "/climate.json");
const CLIMATE_STATS: Endpoint = Endpoint::list("climateStats", "/climate_stats.json");
const LAST_30: Endpoint = Endpoint::list("last30", "/last30.json");
const LAST_UPDATED: Endpoint = Endpoint {
    field: "lastUpdated",
    path: "/last_updated.json",
    shape: FieldShape::Nullable,
    unwrap: Some("lastUpdated"),
};

const WEATHER_ENDPOINTS: &[Endpoint] = &[
    HISTORIC_TEMP,
    HISTORIC_RAIN,
    OBSERVATIONS,
    CLIMATE,
    LAST_UPDATED,
    CLIMATE_STATS,
];

const FORECAST_ENDPOINTS: &[Endpoint] = &[
    HISTORIC_TEMP,
    HISTORIC_RAIN,
    OBSERVATIONS,
    FORECASTS,
    CLIMATE,
    LAST_UPDATED,
    CLIMATE_STATS,
    LAST_30,
];

/// Index-then-detail layout used by the city dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedManifest {
    /// Field holding the identifiers from the index.
    pub index_field: &'static str,
    pub index_path: &'static str,
    /// Field holding the id -> detail mapping.
    pub detail_field: &'static str,
    pub detail_template: &'static str,
}

impl IndexedManifest {
    pub fn detail_path(&self, id: &str) -> String {
        self.detail_template.replace(ID_PLACEHOLDER, id)
    }
}

const CITIES: IndexedManifest = IndexedManifest {
    index_field: "cities",
    index_path: "/cities/_list.json",
    detail_field: "cityData",
    detail_template: "/cities/{id}.json",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manifest {
    Fixed(&'static [Endpoint]),
    Indexed(IndexedManifest),
}

/// A page-loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Multi-city dashboard.
    Cities,
    /// Melbourne page: history, observations and climate.
    Weather,
    /// Melbourne page with the hourly forecast table and the last 30 days.
    Forecast,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Cities, Variant::Weather, Variant::Forecast];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Cities => "cities",
            Variant::Weather => "weather",
            Variant::Forecast => "forecast",
        }
    }

    pub fn manifest(self) -> Manifest {
        match self {
            Variant::Cities => Manifest::Indexed(CITIES),
            Variant::Weather => Manifest::Fixed(WEATHER_ENDPOINTS),
            Variant::Forecast => Manifest::Fixed(FORECAST_ENDPOINTS),
        }
    }

    /// Whether the page needs `today` / `currentHour` to tell past forecast
    /// hours from future ones.
    pub fn derives_civil_time(self) -> bool {
        matches!(self, Variant::Cities | Variant::Forecast)
    }

    /// Every field the renderer expects, in output order.
    pub fn field_names(self) -> Vec<&'static str> {
        let mut names = match self.manifest() {
            Manifest::Fixed(endpoints) => endpoints.iter().map(|e| e.field).collect(),
            Manifest::Indexed(indexed) => vec![indexed.index_field, indexed.detail_field],
        };
        if self.derives_civil_time() {
            names.push(TODAY_FIELD);
            names.push(CURRENT_HOUR_FIELD);
        }
        names
    }

    /// The all-defaults object handed to the renderer when a load fails.
    pub fn empty_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self.manifest() {
            Manifest::Fixed(endpoints) => {
                for endpoint in endpoints {
                    fields.insert(endpoint.field.to_string(), endpoint.shape.empty());
                }
            }
            Manifest::Indexed(indexed) => {
                fields.insert(indexed.index_field.to_string(), FieldShape::List.empty());
                fields.insert(indexed.detail_field.to_string(), FieldShape::Map.empty());
            }
        }
        if self.derives_civil_time() {
            // Sentinels the dashboard checks for; never null.
            fields.insert(TODAY_FIELD.to_string(), Value::from(""));
            fields.insert(CURRENT_HOUR_FIELD.to_string(), Value::from(-1));
        }
        fields
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown variant '{}' (expected cities, weather or forecast)", s)
            })
    }
}
