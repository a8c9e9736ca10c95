//! The one concrete implementation of the reader/writer contract this
//! workspace ships: an in-memory store used by every other crate's test
//! suite. A durable backend is out of scope here; this exists to make the
//! contract testable.

use crate::kinds::*;
use crate::registry::Registry;
use crate::scope::{Scope, SyncOp};
use crate::traits::Transaction;
use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use netguard_pg_backend_core::{
    AddressGroup, AddressGroupBinding, AddressGroupPortMapping, Error, IEAgAgRule, Network,
    NetworkBinding, Result, ResourceIdentifier, RuleS2S, Service, ServiceAlias,
};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Clone, Debug, Default)]
struct StoreData {
    services: HashMap<ResourceIdentifier, Service>,
    address_groups: HashMap<ResourceIdentifier, AddressGroup>,
    address_group_bindings: HashMap<ResourceIdentifier, AddressGroupBinding>,
    service_aliases: HashMap<ResourceIdentifier, ServiceAlias>,
    rule_s2s: HashMap<ResourceIdentifier, RuleS2S>,
    networks: HashMap<ResourceIdentifier, Network>,
    network_bindings: HashMap<ResourceIdentifier, NetworkBinding>,
    port_mappings: HashMap<ResourceIdentifier, AddressGroupPortMapping>,
    ieagag_rules: HashMap<ResourceIdentifier, IEAgAgRule>,
}

/// The in-memory backend handle. Cloning is cheap (it's an `Arc`) and every
/// clone shares the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    data: Arc<Mutex<StoreData>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    type Reader = InMemoryReader;
    type Writer = InMemoryWriter;

    async fn reader(&self, cancel: CancellationToken) -> Result<Self::Reader> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let snapshot = self.data.lock().await.clone();
        Ok(InMemoryReader { snapshot, cancel })
    }

    async fn writer(&self, cancel: CancellationToken) -> Result<Self::Writer> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let guard = self.data.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryWriter {
            guard,
            staged,
            cancel,
        })
    }
}

/// A read-snapshot: data is cloned at acquisition time, so concurrent
/// writers are invisible to it for its whole lifetime.
pub struct InMemoryReader {
    snapshot: StoreData,
    cancel: CancellationToken,
}

impl InMemoryReader {
    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

fn scoped<'a, 'b, T>(
    map: &'a HashMap<ResourceIdentifier, T>,
    scope: &'b Scope,
) -> impl Iterator<Item = &'a T> + use<'a, 'b, T> {
    map.iter()
        .filter(move |(id, _)| scope.contains(id))
        .map(|(_, v)| v)
}

macro_rules! impl_reader {
    ($trait:ident, $ty:ty, $field:ident, $kind:expr) => {
        #[async_trait]
        impl $trait for InMemoryReader {
            async fn get_by_id(&self, id: &ResourceIdentifier) -> Result<$ty> {
                self.check_cancelled()?;
                self.snapshot
                    .$field
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::NotFound {
                        kind: $kind,
                        id: id.clone(),
                    })
            }

            async fn list(
                &self,
                scope: &Scope,
                consume: &mut (dyn FnMut($ty) -> Result<()> + Send),
            ) -> Result<()> {
                self.check_cancelled()?;
                for item in scoped(&self.snapshot.$field, scope) {
                    self.check_cancelled()?;
                    trace!(kind = $kind, "listing item");
                    consume(item.clone())?;
                }
                Ok(())
            }
        }
    };
}

impl_reader!(ServiceReader, Service, services, "Service");
impl_reader!(AddressGroupReader, AddressGroup, address_groups, "AddressGroup");
impl_reader!(
    AddressGroupBindingReader,
    AddressGroupBinding,
    address_group_bindings,
    "AddressGroupBinding"
);
impl_reader!(ServiceAliasReader, ServiceAlias, service_aliases, "ServiceAlias");
impl_reader!(RuleS2SReader, RuleS2S, rule_s2s, "RuleS2S");
impl_reader!(NetworkReader, Network, networks, "Network");
impl_reader!(
    NetworkBindingReader,
    NetworkBinding,
    network_bindings,
    "NetworkBinding"
);
impl_reader!(
    AddressGroupPortMappingReader,
    AddressGroupPortMapping,
    port_mappings,
    "AddressGroupPortMapping"
);
impl_reader!(IEAgAgRuleReader, IEAgAgRule, ieagag_rules, "IEAgAgRule");

/// Single-use: `commit`/`abort` consume `self`, so the type system — not a
/// runtime flag — prevents reuse. Mutations land in `staged`, a
/// working copy; `commit` publishes it back into the still-held mutex
/// guard, `abort` just drops everything, leaving storage untouched.
pub struct InMemoryWriter {
    guard: OwnedMutexGuard<StoreData>,
    staged: StoreData,
    cancel: CancellationToken,
}

impl InMemoryWriter {
    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

fn apply_sync<T>(map: &mut HashMap<ResourceIdentifier, T>, scope: Scope, items: Vec<T>, op: SyncOp)
where
    T: Clone,
    T: HasId,
{
    match op {
        SyncOp::Upsert => {
            map.retain(|id, _| !scope.contains(id));
            for item in items {
                map.insert(item.id_ref(), item);
            }
        }
        SyncOp::Delete => {
            map.retain(|id, _| !scope.contains(id));
        }
    }
}

/// Lets `apply_sync` extract an identifier from any resource kind without
/// a generic `Resource` trait threaded through every call site.
trait HasId {
    fn id_ref(&self) -> ResourceIdentifier;
}

macro_rules! has_id {
    ($ty:ty, $path:expr) => {
        impl HasId for $ty {
            fn id_ref(&self) -> ResourceIdentifier {
                $path(self)
            }
        }
    };
}

has_id!(Service, |s: &Service| s.id.0.clone());
has_id!(AddressGroup, |s: &AddressGroup| s.id.0.clone());
has_id!(AddressGroupBinding, |s: &AddressGroupBinding| s.id.0.clone());
has_id!(ServiceAlias, |s: &ServiceAlias| s.id.0.clone());
has_id!(RuleS2S, |s: &RuleS2S| s.id.0.clone());
has_id!(Network, |s: &Network| s.id.0.clone());
has_id!(NetworkBinding, |s: &NetworkBinding| s.id.0.clone());
has_id!(AddressGroupPortMapping, |s: &AddressGroupPortMapping| s
    .id
    .0
    .clone());
has_id!(IEAgAgRule, |s: &IEAgAgRule| s.id.0.clone());

macro_rules! impl_writer {
    ($trait:ident, $ty:ty, $field:ident) => {
        #[async_trait]
        impl $trait for InMemoryWriter {
            async fn sync(&mut self, scope: Scope, items: Vec<$ty>, op: SyncOp) -> Result<()> {
                self.check_cancelled()?;
                apply_sync(&mut self.staged.$field, scope, items, op);
                Ok(())
            }

            async fn delete_by_ids(&mut self, ids: Vec<ResourceIdentifier>) -> Result<()> {
                self.check_cancelled()?;
                for id in ids {
                    self.staged.$field.remove(&id);
                }
                Ok(())
            }
        }
    };
}

impl_writer!(ServiceWriter, Service, services);
impl_writer!(AddressGroupWriter, AddressGroup, address_groups);
impl_writer!(
    AddressGroupBindingWriter,
    AddressGroupBinding,
    address_group_bindings
);
impl_writer!(ServiceAliasWriter, ServiceAlias, service_aliases);
impl_writer!(RuleS2SWriter, RuleS2S, rule_s2s);
impl_writer!(NetworkWriter, Network, networks);
impl_writer!(NetworkBindingWriter, NetworkBinding, network_bindings);
impl_writer!(
    AddressGroupPortMappingWriter,
    AddressGroupPortMapping,
    port_mappings
);
impl_writer!(IEAgAgRuleWriter, IEAgAgRule, ieagag_rules);

#[async_trait]
impl Transaction for InMemoryWriter {
    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryWriter {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }

    async fn abort(self: Box<Self>) {}
}
