use crate::identifier::SelfRef;
use crate::refs::ServiceAliasRef;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Traffic {
    Ingress,
    Egress,
}

impl Traffic {
    /// The prefix the deterministic IEAgAgRule name is built from.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            Self::Ingress => "ing",
            Self::Egress => "egr",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingress => "INGRESS",
            Self::Egress => "EGRESS",
        }
    }
}

impl fmt::Display for Traffic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service-to-service traffic permission intent. `traffic`,
/// `service_local_ref` and `service_ref` are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleS2S {
    pub id: SelfRef,
    pub traffic: Traffic,
    /// Must resolve in the same namespace as `id`.
    pub service_local_ref: ServiceAliasRef,
    /// May omit namespace; resolves in `id`'s namespace when unqualified.
    pub service_ref: ServiceAliasRef,
    pub trace: bool,
}

impl RuleS2S {
    /// The three fields considered immutable after creation.
    pub fn immutable_fields_equal(&self, other: &RuleS2S) -> bool {
        self.traffic == other.traffic
            && self.service_local_ref == other.service_local_ref
            && self.service_ref == other.service_ref
    }
}
