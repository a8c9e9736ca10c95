#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Per-kind resource services: the CRUD surface every caller goes through,
//! each composing its kind's validator with the store and, for `Service`
//! and `ServiceAlias`, the sgroups `SyncManager`, the `ConditionManager`,
//! and the reactive orchestrator's fan-out via the `Regenerators`
//! setter-injection glue in `wiring`.

mod address_group;
mod binding;
mod conditions;
mod network;
mod network_binding;
mod rule_s2s;
mod service;
mod service_alias;
mod sync;
mod wiring;

pub use address_group::AddressGroupService;
pub use binding::AddressGroupBindingService;
pub use conditions::{ConditionManager, LoggingConditionManager};
pub use network::NetworkService;
pub use network_binding::NetworkBindingService;
pub use rule_s2s::RuleS2SService;
pub use service::ServiceService;
pub use service_alias::ServiceAliasService;
pub use sync::{LoggingSyncManager, SyncManager, SyncableEntity};
pub use wiring::Regenerators;
