//! Engine error taxonomy and the numeric code surface.
//!
//! Errors are `Clone` so the session error register can hold the first
//! failure and keep returning it; collaborator errors arrive stringified
//! through the `From` impls.

use thiserror::Error;

use crate::fault::FaultKind;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("System fault ({}) during {site}", kind.label())]
    SystemFault { kind: FaultKind, site: &'static str },

    #[error("Session is not open for this operation")]
    NotOpen,

    #[error("Routing time step is not positive: {step_s}")]
    Timestep { step_s: f64 },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    Index {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Raised by collaborators on non-finite intermediate values; the
    /// fault barrier intercepts it before it can reach the register.
    #[error("Numeric fault ({}) in {site}", kind.label())]
    NumericFault { kind: FaultKind, site: &'static str },

    #[error("Runoff error: {message}")]
    Runoff { message: String },

    #[error("Routing error: {message}")]
    Routing { message: String },

    #[error("Hot-start error: {message}")]
    Hotstart { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Rainfall error: {message}")]
    Rainfall { message: String },

    #[error("Report error: {message}")]
    Report { message: String },
}

impl EngineError {
    /// Numeric code reported to callers and used as the process exit
    /// value; 0 means no error.
    pub fn code(&self) -> i32 {
        match self {
            EngineError::SystemFault { .. } | EngineError::NumericFault { .. } => 101,
            EngineError::NotOpen => 102,
            EngineError::Timestep { .. } => 103,
            EngineError::Index { .. } => 104,
            EngineError::Configuration { .. } => 200,
            EngineError::Runoff { .. } => 301,
            EngineError::Routing { .. } => 302,
            EngineError::Hotstart { .. } => 303,
            EngineError::Output { .. } => 304,
            EngineError::Rainfall { .. } => 305,
            EngineError::Report { .. } => 306,
        }
    }
}

impl From<sf_project::ProjectError> for EngineError {
    fn from(e: sf_project::ProjectError) -> Self {
        EngineError::Configuration {
            message: e.to_string(),
        }
    }
}

impl From<sf_network::NetworkError> for EngineError {
    fn from(e: sf_network::NetworkError) -> Self {
        EngineError::Configuration {
            message: e.to_string(),
        }
    }
}

impl From<sf_core::CoreError> for EngineError {
    fn from(e: sf_core::CoreError) -> Self {
        EngineError::Configuration {
            message: e.to_string(),
        }
    }
}

impl From<sf_results::ResultsError> for EngineError {
    fn from(e: sf_results::ResultsError) -> Self {
        EngineError::Output {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(EngineError::NotOpen.code(), 102);
        assert_eq!(EngineError::Timestep { step_s: 0.0 }.code(), 103);
        assert_eq!(
            EngineError::Index { what: "node", index: 9, len: 2 }.code(),
            104
        );
        assert_eq!(
            EngineError::Configuration { message: String::new() }.code(),
            200
        );
        assert_eq!(
            EngineError::SystemFault {
                kind: FaultKind::AccessViolation,
                site: "step"
            }
            .code(),
            101
        );
    }

    #[test]
    fn collaborator_errors_stringify() {
        let err: EngineError = sf_network::NetworkError::NodeIndex { index: 3, len: 1 }.into();
        match err {
            EngineError::Configuration { message } => assert!(message.contains("3")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
