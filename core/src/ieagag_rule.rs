use crate::identifier::SelfRef;
use crate::refs::AddressGroupRef;
use crate::rule_s2s::Traffic;
use crate::service::Protocol;

/// The transport protocols an `IEAgAgRule` can carry; unlike `Protocol`,
/// `ICMP` never produces a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transport {
    Tcp,
    Udp,
}

impl Transport {
    /// `None` for protocols that never produce an `IEAgAgRule`.
    pub fn from_service_protocol(p: Protocol) -> Option<Self> {
        match p {
            Protocol::Tcp => Some(Self::Tcp),
            Protocol::Udp => Some(Self::Udp),
            Protocol::Icmp => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
        }
    }
}

/// A single port-spec entry on an `IEAgAgRule`. `destination` is the
/// ascending, string-sorted, comma-joined set of ports the rule aggregates;
/// `source` is always empty — the derivation engine never produces source
/// port restrictions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSpec {
    pub destination: String,
    pub source: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Accept,
}

/// A derived, low-level ingress/egress address-group-to-address-group rule.
/// Owned by the core; never mutated from outside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IEAgAgRule {
    pub id: SelfRef,
    pub transport: Transport,
    pub traffic: Traffic,
    pub address_group_local: AddressGroupRef,
    pub address_group: AddressGroupRef,
    pub ports: Vec<PortSpec>,
    pub action: Action,
    pub logs: bool,
    pub trace: bool,
    pub priority: u16,
}

impl IEAgAgRule {
    pub const PRIORITY_DEFAULT: u16 = 100;
}
