#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Change detection and fan-out: decides which derived artifacts need
//! recomputing after a resource service commits, and calls narrow
//! capability traits to do it. The concrete regenerators live in the
//! services crate, injected here as trait objects/generics to break the
//! cycle between `ServiceService` and `RuleS2SService`.

mod capabilities;
mod orchestrator;

pub use capabilities::{
    RegenerateIEAgAgRulesForService, RegenerateIEAgAgRulesForServiceAlias,
    RegeneratePortMappingsForAddressGroup, RegeneratePortMappingsForService,
};
pub use orchestrator::{on_service_alias_upserted, on_service_created, on_service_deleted, on_service_updated};
