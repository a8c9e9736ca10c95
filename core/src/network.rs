use crate::identifier::SelfRef;
use ipnet::IpNet;

/// An auxiliary CIDR resource that can be attached to an `AddressGroup` via
/// a `NetworkBinding`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    pub id: SelfRef,
    pub cidr: IpNet,
}
