use std::fmt;

/// Identifies a resource by name within an optional namespace.
///
/// Namespace-less resources (e.g. `AddressGroup`, `Network`) use an empty
/// namespace; their `Key` is `/name`, matching namespaced resources'
/// `namespace/name` shape so callers never need to special-case either kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentifier {
    pub namespace: String,
    pub name: String,
}

impl ResourceIdentifier {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// A namespace-less (globally scoped) identifier.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            name: name.into(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Wraps an identifier to mark it as the resource's own identity, as
/// opposed to a reference to some other resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelfRef(pub ResourceIdentifier);

impl SelfRef {
    pub fn new(id: ResourceIdentifier) -> Self {
        Self(id)
    }

    pub fn id(&self) -> &ResourceIdentifier {
        &self.0
    }
}

impl fmt::Display for SelfRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
