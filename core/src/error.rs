use crate::identifier::ResourceIdentifier;
use thiserror::Error;

/// The abstract error taxonomy every validator, regenerator, and
/// resource-service method returns (or propagates) a variant of; callers
/// are expected to match on `kind`-bearing fields rather than on the
/// rendered message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: ResourceIdentifier },

    #[error("{kind} {id} invalid: {reason}")]
    Invalid {
        kind: &'static str,
        id: ResourceIdentifier,
        reason: String,
    },

    #[error("{kind} {id} references nonexistent {ref_kind} {ref_id}: {reason}")]
    ReferenceInvalid {
        kind: &'static str,
        id: ResourceIdentifier,
        ref_kind: &'static str,
        ref_id: ResourceIdentifier,
        reason: String,
    },

    #[error("{kind} {id} duplicates {conflicting_id}")]
    DuplicateRule {
        kind: &'static str,
        id: ResourceIdentifier,
        conflicting_id: ResourceIdentifier,
    },

    #[error("{kind} {id} field {field} is immutable")]
    Immutable {
        kind: &'static str,
        id: ResourceIdentifier,
        field: &'static str,
    },

    #[error("{kind} {id} has {} live dependents", dependents.len())]
    DependencyExists {
        kind: &'static str,
        id: ResourceIdentifier,
        dependents: Vec<ResourceIdentifier>,
    },

    #[error(
        "services {service_a} and {service_b} conflict on address group {address_group} protocol {protocol}: {overlap}"
    )]
    PortConflict {
        service_a: ResourceIdentifier,
        service_b: ResourceIdentifier,
        address_group: ResourceIdentifier,
        protocol: &'static str,
        overlap: String,
    },

    #[error("transient I/O failure: {0}")]
    TransientIO(#[source] anyhow::Error),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
