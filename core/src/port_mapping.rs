use crate::identifier::SelfRef;
use crate::refs::ServiceRef;
use crate::service::Protocol;
use std::collections::BTreeSet;

/// One `(protocol, port-range)` entry a service exposes through an
/// `AddressGroup`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccessPort {
    pub protocol: Protocol,
    pub port: String,
}

/// Derived, one per `AddressGroup`: the ports every bound `Service` exposes
/// through it. Owned by the core; regenerated whenever a member service's
/// ports or address-group membership changes, or the binding set changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressGroupPortMapping {
    pub id: SelfRef,
    pub access_ports: Vec<(ServiceRef, BTreeSet<AccessPort>)>,
}
