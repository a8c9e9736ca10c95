use crate::identifier::SelfRef;
use crate::refs::{AddressGroupRef, NetworkRef, ServiceRef};

/// Attaches an `AddressGroup` to a `Service`; lifetime is tied to the
/// existence of both referents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressGroupBinding {
    pub id: SelfRef,
    pub service_ref: ServiceRef,
    pub address_group_ref: AddressGroupRef,
}

/// Attaches a CIDR (`Network`) to an `AddressGroup`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkBinding {
    pub id: SelfRef,
    pub network_ref: NetworkRef,
    pub address_group_ref: AddressGroupRef,
}
