use async_trait::async_trait;
use netguard_pg_backend_core::{AddressGroupBinding, Result, Service, ServiceAlias};
use tracing::debug;

/// Surfaces status conditions on intent resources after a successful
/// commit. Failures are logged by the caller and never fail the primary
/// mutation — this trait's methods return `Result` only so a real
/// implementation can report transient I/O, not to make the caller treat
/// every failure as fatal.
#[async_trait]
pub trait ConditionManager: Send + Sync {
    async fn process_service_conditions(&self, service: &Service) -> Result<()>;
    async fn process_service_alias_conditions(&self, alias: &ServiceAlias) -> Result<()>;
    async fn process_address_group_binding_conditions(&self, binding: &AddressGroupBinding) -> Result<()>;
}

/// The default collaborator: no external status-reporting surface is wired
/// up, so processing a condition is just a debug-level trace of the event.
#[derive(Clone, Copy, Default)]
pub struct LoggingConditionManager;

#[async_trait]
impl ConditionManager for LoggingConditionManager {
    async fn process_service_conditions(&self, service: &Service) -> Result<()> {
        debug!(service = %service.id, "processing service conditions");
        Ok(())
    }

    async fn process_service_alias_conditions(&self, alias: &ServiceAlias) -> Result<()> {
        debug!(alias = %alias.id, "processing service alias conditions");
        Ok(())
    }

    async fn process_address_group_binding_conditions(&self, binding: &AddressGroupBinding) -> Result<()> {
        debug!(binding = %binding.id, "processing address group binding conditions");
        Ok(())
    }
}
