//! Unified error handling.
//!
//! The geometric core never fails; these errors come from the external
//! collaborators (point-data service, routing service, file access) and
//! keep "could not reach it" apart from "it answered with garbage".

use thiserror::Error;

/// Upstream service an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// OpenStreetMap Overpass API (speed camera nodes)
    Overpass,
    /// OSRM routing service (route geometry)
    Osrm,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Overpass => write!(f, "Overpass"),
            Service::Osrm => write!(f, "OSRM"),
        }
    }
}

/// Errors surfaced by route collection.
#[derive(Debug, Error)]
pub enum RouteSnapError {
    #[error("{service} unavailable: {reason}")]
    ServiceUnavailable { service: Service, reason: String },

    #[error("malformed {service} response: {reason}")]
    MalformedResponse { service: Service, reason: String },

    #[error("routing service returned no route (code: {code})")]
    NoRoute { code: String },

    #[error("unknown route '{0}'")]
    UnknownRoute(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouteSnapError {
    /// Whether retrying later could help (transport-level failure).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RouteSnapError::ServiceUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, RouteSnapError>;

/// Convert missing response fields into [`RouteSnapError::MalformedResponse`].
pub trait OptionExt<T> {
    fn ok_or_malformed(self, service: Service, reason: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_malformed(self, service: Service, reason: &str) -> Result<T> {
        self.ok_or_else(|| RouteSnapError::MalformedResponse {
            service,
            reason: reason.to_string(),
        })
    }
}
