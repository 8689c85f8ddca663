//! Error types for the agent.

use slotwatch_resolve::{Axis, ResolveError};
use thiserror::Error;

/// Fatal agent errors with standardized reason codes.
///
/// Every variant stops the process before the first round.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The strategies file defines no demand.
    #[error("no demands configured")]
    NoDemands,

    /// A configured literal could not be turned into a matcher.
    #[error("invalid {axis} rule for {person}: {source}")]
    InvalidRule {
        person: String,
        axis: Axis,
        #[source]
        source: ResolveError,
    },

    /// No person with this name is known upstream.
    #[error("person_not_found: {0}")]
    PersonNotFound(String),

    /// The person cannot reserve or cannot be notified.
    #[error("person_unauthorized: {0}")]
    PersonUnauthorized(String),

    /// No provider with this name is listed by the source.
    #[error("provider_not_found: {name} in {source_url}")]
    ProviderNotFound { name: String, source_url: String },

    /// The provider takes no online bookings.
    #[error("provider_offline: {0}")]
    ProviderOffline(String),

    /// An entry refers to a visit-type category missing from the table.
    #[error("unknown_visit_type: {0}")]
    UnknownVisitType(String),

    /// The strategies file could not be read or parsed.
    #[error("strategies file {path}: {detail}")]
    StrategiesFile { path: String, detail: String },

    /// A lookup needed to build demands failed.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl AgentError {
    /// Get the standardized reason code for this error.
    pub fn reason_code(&self) -> &'static str {
        match self {
            AgentError::NoDemands => "no_demands",
            AgentError::InvalidRule { .. } => "invalid_rule",
            AgentError::PersonNotFound(_) => "person_not_found",
            AgentError::PersonUnauthorized(_) => "person_unauthorized",
            AgentError::ProviderNotFound { .. } => "provider_not_found",
            AgentError::ProviderOffline(_) => "provider_offline",
            AgentError::UnknownVisitType(_) => "unknown_visit_type",
            AgentError::StrategiesFile { .. } => "strategies_file",
            AgentError::Upstream(_) => "upstream_error",
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Upstream(format!("{err:#}"))
    }
}
