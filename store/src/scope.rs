use netguard_pg_backend_core::ResourceIdentifier;

/// Which subset of a resource kind's rows an operation addresses.
///
/// Every resource is namespace-or-global, and both the derivation engine's
/// reconciliation step and several validators need to list within one
/// namespace without enumerating every id in it first, hence `Namespace`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// All rows of the kind.
    Empty,
    /// Exactly the named ids.
    ResourceIdentifiers(Vec<ResourceIdentifier>),
    /// All rows in one namespace.
    Namespace(String),
}

impl Scope {
    pub fn one(id: ResourceIdentifier) -> Self {
        Self::ResourceIdentifiers(vec![id])
    }

    /// Whether `id` falls within this scope.
    pub fn contains(&self, id: &ResourceIdentifier) -> bool {
        match self {
            Self::Empty => true,
            Self::ResourceIdentifiers(ids) => ids.contains(id),
            Self::Namespace(ns) => &id.namespace == ns,
        }
    }
}

/// The two operations a `Writer::sync` call can perform against a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOp {
    /// Rewrites the scoped subset to exactly the given items.
    Upsert,
    /// Removes the scoped subset.
    Delete,
}
