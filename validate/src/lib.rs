#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Per-kind dependency validators: existence, reference integrity,
//! namespace scoping, uniqueness, and safe-deletion checks run before a
//! resource service persists a mutation.

mod address_group;
mod binding;
mod network;
mod port_conflict;
mod rule_s2s;
mod service;
mod service_alias;

pub use address_group::AddressGroupValidator;
pub use binding::AddressGroupBindingValidator;
pub use network::{NetworkBindingValidator, NetworkValidator};
pub use port_conflict::check_cross_service_port_conflict;
pub use rule_s2s::RuleS2SValidator;
pub use service::ServiceValidator;
pub use service_alias::ServiceAliasValidator;
