use netguard_pg_backend_core::{NetworkBinding, Result, ResourceIdentifier};
use netguard_pg_backend_store::{NetworkBindingReader, NetworkBindingWriter, Registry, Scope, SyncOp, Transaction};
use netguard_pg_backend_validate::NetworkBindingValidator;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Composes `NetworkBindingValidator` with the store for the
/// `NetworkBinding` kind. Lifetime is tied to both referents existing; no
/// uniqueness rule beyond that (unlike `AddressGroupBinding`, two bindings
/// attaching the same network to the same group aren't meaningfully
/// distinct but aren't forbidden either).
pub struct NetworkBindingService<R> {
    registry: R,
}

impl<R: Registry + Clone> NetworkBindingService<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    #[instrument(skip(self, cancel), fields(id = %id))]
    pub async fn get(&self, id: &ResourceIdentifier, cancel: CancellationToken) -> Result<NetworkBinding> {
        self.registry.reader(cancel).await?.get_by_id(id).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, scope: &Scope, cancel: CancellationToken) -> Result<Vec<NetworkBinding>> {
        self.registry.reader(cancel).await?.list_all(scope).await
    }

    #[instrument(skip(self, ids, cancel))]
    pub async fn get_by_ids(
        &self,
        ids: Vec<ResourceIdentifier>,
        cancel: CancellationToken,
    ) -> Result<Vec<NetworkBinding>> {
        self.list(&Scope::ResourceIdentifiers(ids), cancel).await
    }

    #[instrument(skip(self, binding, cancel), fields(id = %binding.id))]
    pub async fn create(&self, binding: NetworkBinding, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        NetworkBindingValidator::validate_references(&reader, &reader, &binding).await?;
        drop(reader);

        let id = binding.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![binding], SyncOp::Upsert).await?;
        Box::new(writer).commit().await
    }

    #[instrument(skip(self, binding, cancel), fields(id = %binding.id))]
    pub async fn update(&self, binding: NetworkBinding, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        reader.get_by_id(&binding.id.0).await?;
        NetworkBindingValidator::validate_references(&reader, &reader, &binding).await?;
        drop(reader);

        let id = binding.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![binding], SyncOp::Upsert).await?;
        Box::new(writer).commit().await
    }

    #[instrument(skip(self, items, cancel))]
    pub async fn sync(
        &self,
        items: Vec<NetworkBinding>,
        scope: Scope,
        op: SyncOp,
        cancel: CancellationToken,
    ) -> Result<()> {
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(scope, items, op).await?;
        Box::new(writer).commit().await
    }

    /// No dependents of its own kind; nothing references a `NetworkBinding`.
    #[instrument(skip(self, ids, cancel))]
    pub async fn delete_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<()> {
        let mut writer = self.registry.writer(cancel).await?;
        writer.delete_by_ids(ids).await?;
        Box::new(writer).commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkService;
    use netguard_pg_backend_core::{AddressGroup, AddressGroupRef, DefaultAction, Error, NetworkRef, SelfRef};
    use netguard_pg_backend_store::InMemoryRegistry;

    async fn seeded() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
        NetworkService::new(registry.clone())
            .create(
                netguard_pg_backend_core::Network {
                    id: SelfRef::new(ResourceIdentifier::global("corp-net")),
                    cidr: "10.0.0.0/8".parse().unwrap(),
                },
                CancellationToken::new(),
            )
            .await
            .unwrap();
        crate::address_group::AddressGroupService::new(registry.clone())
            .create(
                AddressGroup {
                    id: SelfRef::new(ResourceIdentifier::global("web-ag")),
                    addresses: vec![],
                    default_action: DefaultAction::Accept,
                    logs: false,
                    trace: false,
                },
                CancellationToken::new(),
            )
            .await
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn create_rejects_dangling_network_reference() {
        let registry = InMemoryRegistry::new();
        let svc = NetworkBindingService::new(registry);
        let binding = NetworkBinding {
            id: SelfRef::new(ResourceIdentifier::global("b1")),
            network_ref: NetworkRef::new("ghost-net", ""),
            address_group_ref: AddressGroupRef::new("web-ag", ""),
        };
        let err = svc.create(binding, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::ReferenceInvalid { .. }));
    }

    #[tokio::test]
    async fn create_with_valid_references_succeeds() {
        let registry = seeded().await;
        let svc = NetworkBindingService::new(registry);
        let binding = NetworkBinding {
            id: SelfRef::new(ResourceIdentifier::global("b1")),
            network_ref: NetworkRef::new("corp-net", ""),
            address_group_ref: AddressGroupRef::new("web-ag", ""),
        };
        svc.create(binding, CancellationToken::new()).await.unwrap();
    }
}
