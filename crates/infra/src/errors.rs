//! Infrastructure error conversions
//!
//! `PriceloomError` lives in the domain crate, so foreign error types are
//! funneled through a local wrapper to satisfy coherence.

use priceloom_domain::PriceloomError;

/// Newtype wrapper enabling `From` conversions for foreign error types.
#[derive(Debug)]
pub struct InfraError(pub PriceloomError);

impl From<InfraError> for PriceloomError {
    fn from(err: InfraError) -> Self {
        err.0
    }
}

impl From<reqwest::Error> for InfraError {
    fn from(err: reqwest::Error) -> Self {
        Self(PriceloomError::Network(format!("http: {err}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        Self(PriceloomError::Io(err.to_string()))
    }
}

impl std::fmt::Display for InfraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for InfraError {}
