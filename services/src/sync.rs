use async_trait::async_trait;
use netguard_pg_backend_core::{Result, Service};
use netguard_pg_backend_store::SyncOp;
use tracing::debug;

/// Marks a resource kind as eligible for the sgroups push. Only `Service`
/// implements this today.
pub trait SyncableEntity: Send + Sync {}

impl SyncableEntity for Service {}

/// Pushes a syncable entity to the external sgroups service. Best-effort:
/// the resource service logs and swallows failures rather than failing the
/// primary mutation.
#[async_trait]
pub trait SyncManager<T: SyncableEntity>: Send + Sync {
    async fn sync_entity(&self, entity: &T, op: SyncOp) -> Result<()>;
}

/// The default collaborator: no external sgroups endpoint is wired up.
#[derive(Clone, Copy, Default)]
pub struct LoggingSyncManager;

#[async_trait]
impl SyncManager<Service> for LoggingSyncManager {
    async fn sync_entity(&self, entity: &Service, op: SyncOp) -> Result<()> {
        debug!(service = %entity.id, ?op, "syncing service to sgroups");
        Ok(())
    }
}
