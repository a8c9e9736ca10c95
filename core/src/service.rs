use crate::identifier::SelfRef;
use crate::refs::AddressGroupRef;
use std::fmt;

/// A transport protocol an ingress port is advertised over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
            Self::Icmp => "ICMP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single advertised ingress port or port range, e.g. `"80"` or `"80-90"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IngressPort {
    pub protocol: Protocol,
    /// A single port (`"80"`) or an inclusive range (`"80-90"`).
    pub port: String,
    pub description: String,
}

impl IngressPort {
    pub fn new(protocol: Protocol, port: impl Into<String>) -> Self {
        Self {
            protocol,
            port: port.into(),
            description: String::new(),
        }
    }

    /// Parses `self.port` into an inclusive `(low, high)` numeric range.
    /// A malformed value yields `None`; validators are responsible for
    /// rejecting those before they reach derivation.
    pub fn range(&self) -> Option<(u32, u32)> {
        match self.port.split_once('-') {
            Some((lo, hi)) => {
                let lo: u32 = lo.trim().parse().ok()?;
                let hi: u32 = hi.trim().parse().ok()?;
                if lo > hi {
                    None
                } else {
                    Some((lo, hi))
                }
            }
            None => {
                let p: u32 = self.port.trim().parse().ok()?;
                Some((p, p))
            }
        }
    }

    pub fn overlaps(&self, other: &IngressPort) -> bool {
        if self.protocol != other.protocol {
            return false;
        }
        match (self.range(), other.range()) {
            (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => a_lo <= b_hi && b_lo <= a_hi,
            _ => false,
        }
    }
}

/// Where an `AddressGroup` entry in a service's aggregated view came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressGroupSource {
    Spec,
    Binding,
}

/// An `AddressGroupRef` annotated with why it belongs to a service's
/// aggregated view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedAddressGroup {
    pub address_group: AddressGroupRef,
    pub source: AddressGroupSource,
}

/// A named group of ingress ports, the top-level intent resources are
/// organized around.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    pub id: SelfRef,
    pub description: String,
    pub ingress_ports: Vec<IngressPort>,
    /// `AddressGroups` as authored in the spec, not the aggregated view.
    pub address_groups: Vec<AddressGroupRef>,
}

impl Service {
    /// Ports compared ignoring order and description; this is the
    /// `portsChanged` definition used to decide whether derived rules need
    /// recomputing.
    pub fn ports_equal(a: &[IngressPort], b: &[IngressPort]) -> bool {
        let strip = |ports: &[IngressPort]| -> Vec<(Protocol, String)> {
            let mut v: Vec<_> = ports
                .iter()
                .map(|p| (p.protocol, p.port.clone()))
                .collect();
            v.sort();
            v
        };
        strip(a) == strip(b)
    }

    /// AddressGroups (spec-authored only) compared ignoring order.
    pub fn address_groups_equal(a: &[AddressGroupRef], b: &[AddressGroupRef]) -> bool {
        let mut a: Vec<_> = a.iter().map(|r| (r.namespace.clone(), r.name.clone())).collect();
        let mut b: Vec<_> = b.iter().map(|r| (r.namespace.clone(), r.name.clone())).collect();
        a.sort();
        b.sort();
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parses_single_port() {
        assert_eq!(IngressPort::new(Protocol::Tcp, "80").range(), Some((80, 80)));
    }

    #[test]
    fn range_parses_port_range() {
        assert_eq!(
            IngressPort::new(Protocol::Tcp, "80-90").range(),
            Some((80, 90))
        );
    }

    #[test]
    fn range_rejects_malformed() {
        assert_eq!(IngressPort::new(Protocol::Tcp, "not-a-port").range(), None);
    }

    #[test]
    fn overlap_requires_same_protocol() {
        let tcp = IngressPort::new(Protocol::Tcp, "80");
        let udp = IngressPort::new(Protocol::Udp, "80");
        assert!(!tcp.overlaps(&udp));
    }

    #[test]
    fn overlap_detects_touching_ranges() {
        let a = IngressPort::new(Protocol::Tcp, "80-90");
        let b = IngressPort::new(Protocol::Tcp, "90-100");
        assert!(a.overlaps(&b));
    }

    #[test]
    fn overlap_detects_disjoint_ranges() {
        let a = IngressPort::new(Protocol::Tcp, "80-90");
        let b = IngressPort::new(Protocol::Tcp, "91-100");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn ports_equal_ignores_order_and_description() {
        let mut a = IngressPort::new(Protocol::Tcp, "80");
        a.description = "http".into();
        let b = IngressPort::new(Protocol::Tcp, "80");
        assert!(Service::ports_equal(&[a], &[b]));
    }
}
