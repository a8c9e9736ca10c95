use async_trait::async_trait;
use netguard_pg_backend_core::{ResourceIdentifier, Result};

/// Recomputes the port mapping for the address group a single service
/// belongs to; used when regenerating every AddressGroup a changed
/// service's aggregated view still touches.
#[async_trait]
pub trait RegeneratePortMappingsForService: Send + Sync {
    async fn regenerate_port_mappings_for_service(&self, service_id: &ResourceIdentifier) -> Result<()>;
}

/// Recomputes the port mapping for one address group directly.
#[async_trait]
pub trait RegeneratePortMappingsForAddressGroup: Send + Sync {
    async fn regenerate_port_mappings_for_address_group(
        &self,
        address_group_id: &ResourceIdentifier,
    ) -> Result<()>;
}

/// Re-derives and reconciles every `IEAgAgRule` reachable from a service,
/// directly or through an alias pointing to it.
#[async_trait]
pub trait RegenerateIEAgAgRulesForService: Send + Sync {
    async fn regenerate_ieagag_rules_for_service(&self, service_id: &ResourceIdentifier) -> Result<()>;
}

/// Re-derives and reconciles every `IEAgAgRule` derivable through one
/// `ServiceAlias`.
#[async_trait]
pub trait RegenerateIEAgAgRulesForServiceAlias: Send + Sync {
    async fn regenerate_ieagag_rules_for_service_alias(&self, alias_id: &ResourceIdentifier) -> Result<()>;
}
