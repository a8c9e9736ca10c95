use crate::identifier::ResourceIdentifier;
use std::fmt;

/// A typed, API-style reference to another resource: the identifier plus
/// the kind/version it names, so a dangling reference records *what* it
/// expected to find, not just a bare name.
macro_rules! typed_ref {
    ($name:ident, $kind:literal) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name {
            pub api_version: String,
            pub kind: String,
            pub name: String,
            /// Empty for an unqualified reference; resolution rules for
            /// that case are kind-specific (see the validators).
            pub namespace: String,
        }

        impl $name {
            pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
                Self {
                    api_version: "netguard.sgroups.io/v1".to_string(),
                    kind: $kind.to_string(),
                    name: name.into(),
                    namespace: namespace.into(),
                }
            }

            /// Resolves this reference against `namespace_if_unqualified` and
            /// returns the identifier it names.
            pub fn resolve(&self, namespace_if_unqualified: &str) -> ResourceIdentifier {
                let ns = if self.namespace.is_empty() {
                    namespace_if_unqualified
                } else {
                    self.namespace.as_str()
                };
                ResourceIdentifier::new(ns, self.name.clone())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.namespace.is_empty() {
                    write!(f, "{}", self.name)
                } else {
                    write!(f, "{}/{}", self.namespace, self.name)
                }
            }
        }
    };
}

typed_ref!(ServiceRef, "Service");
typed_ref!(ServiceAliasRef, "ServiceAlias");
typed_ref!(AddressGroupRef, "AddressGroup");
typed_ref!(NetworkRef, "Network");
