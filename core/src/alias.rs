use crate::identifier::SelfRef;
use crate::refs::ServiceRef;

/// A namespace-local handle for referring to a `Service`, possibly across
/// namespaces, from a `RuleS2S`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceAlias {
    pub id: SelfRef,
    pub service_ref: ServiceRef,
}
