#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Turns stored intent (`Service`, `RuleS2S`, `AddressGroupBinding`, ...)
//! into derived resources (`AddressGroupPortMapping`, `IEAgAgRule`) and
//! reconciles them against what's currently stored.

mod aggregate_ports;
mod ieagag;
mod name;
mod port_mapping;

pub use aggregate_ports::aggregate_by_transport;
pub use ieagag::{derive_for_many, derive_for_rule, reconcile};
pub use name::deterministic_name;
pub use port_mapping::{affected_address_groups, regenerate_for_address_group};
