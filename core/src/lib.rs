#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Resource model for the network-policy reconciliation core: identifiers,
//! typed references, intent and derived entities, and the error taxonomy
//! every other crate in the workspace builds on. No I/O, no async — the
//! store, validators, derivation engine, and orchestrator layer on top of
//! these plain types.

mod address_group;
mod aggregate;
mod alias;
mod binding;
pub mod error;
mod identifier;
mod ieagag_rule;
mod network;
mod port_mapping;
mod refs;
mod rule_s2s;
mod service;

pub use address_group::{AddressGroup, DefaultAction};
pub use aggregate::aggregated_address_groups;
pub use alias::ServiceAlias;
pub use binding::{AddressGroupBinding, NetworkBinding};
pub use error::{Error, Result};
pub use identifier::{ResourceIdentifier, SelfRef};
pub use ieagag_rule::{Action, IEAgAgRule, PortSpec, Transport};
pub use network::Network;
pub use port_mapping::{AccessPort, AddressGroupPortMapping};
pub use refs::{AddressGroupRef, NetworkRef, ServiceAliasRef, ServiceRef};
pub use rule_s2s::{RuleS2S, Traffic};
pub use service::{
    AddressGroupSource, AggregatedAddressGroup, IngressPort, Protocol, Service,
};

/// Every resource kind the store, validators, and services dispatch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Service,
    AddressGroup,
    AddressGroupBinding,
    ServiceAlias,
    RuleS2S,
    Network,
    NetworkBinding,
    AddressGroupPortMapping,
    IEAgAgRule,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "Service",
            Self::AddressGroup => "AddressGroup",
            Self::AddressGroupBinding => "AddressGroupBinding",
            Self::ServiceAlias => "ServiceAlias",
            Self::RuleS2S => "RuleS2S",
            Self::Network => "Network",
            Self::NetworkBinding => "NetworkBinding",
            Self::AddressGroupPortMapping => "AddressGroupPortMapping",
            Self::IEAgAgRule => "IEAgAgRule",
        }
    }

    /// Whether resources of this kind are owned by the core and must never
    /// be mutated from outside the derivation engine.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::AddressGroupPortMapping | Self::IEAgAgRule)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
