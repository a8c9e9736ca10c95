use crate::identifier::SelfRef;
use ipnet::IpNet;

/// The posture an address group applies to traffic that doesn't match any
/// more specific rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultAction {
    Accept,
    Drop,
}

/// A named collection of host addresses, owned globally (no namespace).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressGroup {
    pub id: SelfRef,
    pub addresses: Vec<IpNet>,
    pub default_action: DefaultAction,
    pub logs: bool,
    pub trace: bool,
}
