// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod civil_time;
pub mod config;
pub mod fetch;
pub mod loader;
pub mod manifest;

pub use civil_time::{CivilTime, Clock, FixedClock, SystemClock};
pub use config::{Deployment, SiteConfig};
pub use fetch::{DirFetcher, Fetch, HttpFetcher};
pub use loader::{LoadOutcome, LoadResult, PageDataLoader};
pub use manifest::{Endpoint, FieldShape, Manifest, Variant};

use thiserror::Error;

/// Civil timezone the dashboards are published for.
pub const DEFAULT_TIMEZONE: chrono_tz::Tz = chrono_tz::Australia::Melbourne;

/// Everything that can sink a page load.
///
/// Callers of [`PageDataLoader::load`] never see this: any variant collapses
/// into a degraded result. The distinct reasons only reach the log.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("request for {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned status {status}")]
    Status { path: String, status: u16 },
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} did not return a JSON object")]
    UnexpectedShape { path: String },
    #[error("{path} did not return a list of city identifiers")]
    InvalidIndex { path: String },
    #[error("refusing to fetch {path}: path escapes the site root")]
    InvalidPath { path: String },
    #[error("cannot build a URL for {path}: {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

impl LoadError {
    /// Site-relative path of the request that failed.
    pub fn path(&self) -> &str {
        match self {
            LoadError::Transport { path, .. }
            | LoadError::Status { path, .. }
            | LoadError::Io { path, .. }
            | LoadError::Decode { path, .. }
            | LoadError::UnexpectedShape { path }
            | LoadError::InvalidIndex { path }
            | LoadError::InvalidPath { path }
            | LoadError::InvalidUrl { path, .. } => path,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LoadError::Transport { source, .. } if source.is_timeout())
    }
}
