//! Error types for topology construction and hand-off

use thiserror::Error;

use crate::resources::{ResourceKind, ResourceName};

/// Errors that can occur while declaring or validating a topology
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A configuration value failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two descriptors were declared under the same logical name
    #[error("Resource '{0}' is already declared")]
    DuplicateResource(ResourceName),

    /// A descriptor references a logical name that is not in the topology
    #[error("Resource '{from}' references unknown resource '{to}'")]
    UnknownReference {
        from: ResourceName,
        to: ResourceName,
    },

    /// A descriptor references a resource of the wrong kind
    #[error("Resource '{from}' expects '{to}' to be a {expected}, found {found}")]
    ReferenceKindMismatch {
        from: ResourceName,
        to: ResourceName,
        expected: ResourceKind,
        found: ResourceKind,
    },

    /// Two outputs were exported under the same key
    #[error("Output '{0}' is already exported")]
    DuplicateExport(String),

    /// An output resolution targeted an attribute nobody is waiting on
    #[error("No pending output '{attribute}' for resource '{resource}'")]
    UnknownOutput {
        resource: ResourceName,
        attribute: String,
    },

    /// A deferred output was resolved more than once
    #[error("Output '{attribute}' of resource '{resource}' is already resolved")]
    OutputAlreadyResolved {
        resource: ResourceName,
        attribute: String,
    },

    /// Generic validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure reported by the reconciliation engine
    #[error("Engine error: {0}")]
    Engine(String),
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;

impl From<crate::resources::ResourceError> for TopologyError {
    fn from(err: crate::resources::ResourceError) -> Self {
        TopologyError::Validation(err.to_string())
    }
}
