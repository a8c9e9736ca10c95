use crate::conditions::ConditionManager;
use netguard_pg_backend_core::{AddressGroupBinding, Result, ResourceIdentifier};
use netguard_pg_backend_store::{
    AddressGroupBindingReader, AddressGroupBindingWriter, Registry, Scope, SyncOp, Transaction,
};
use netguard_pg_backend_validate::AddressGroupBindingValidator;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

/// Composes `AddressGroupBindingValidator` with the store for the
/// `AddressGroupBinding` kind. Creating or updating one changes which
/// `AddressGroup`s the bound service's aggregated view includes, so its
/// port mapping needs recomputing — but that's the service's job: bindings
/// carry no reactive fan-out of their own, only their own conditions via
/// `ConditionManager`.
pub struct AddressGroupBindingService<R, CM> {
    registry: R,
    condition_manager: CM,
}

impl<R: Registry + Clone, CM: ConditionManager> AddressGroupBindingService<R, CM> {
    pub fn new(registry: R, condition_manager: CM) -> Self {
        Self {
            registry,
            condition_manager,
        }
    }

    async fn process_conditions(&self, binding: &AddressGroupBinding) {
        if let Err(err) = self
            .condition_manager
            .process_address_group_binding_conditions(binding)
            .await
        {
            warn!(binding = %binding.id, %err, "condition processing failed");
        }
    }

    #[instrument(skip(self, cancel), fields(id = %id))]
    pub async fn get(&self, id: &ResourceIdentifier, cancel: CancellationToken) -> Result<AddressGroupBinding> {
        self.registry.reader(cancel).await?.get_by_id(id).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, scope: &Scope, cancel: CancellationToken) -> Result<Vec<AddressGroupBinding>> {
        self.registry.reader(cancel).await?.list_all(scope).await
    }

    #[instrument(skip(self, ids, cancel))]
    pub async fn get_by_ids(
        &self,
        ids: Vec<ResourceIdentifier>,
        cancel: CancellationToken,
    ) -> Result<Vec<AddressGroupBinding>> {
        self.list(&Scope::ResourceIdentifiers(ids), cancel).await
    }

    #[instrument(skip(self, binding, cancel), fields(id = %binding.id))]
    pub async fn create(&self, binding: AddressGroupBinding, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        AddressGroupBindingValidator::validate_references(&reader, &reader, &binding).await?;
        AddressGroupBindingValidator::validate_no_duplicate(&reader, &binding).await?;
        drop(reader);

        let id = binding.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![binding.clone()], SyncOp::Upsert).await?;
        Box::new(writer).commit().await?;

        self.process_conditions(&binding).await;
        Ok(())
    }

    #[instrument(skip(self, binding, cancel), fields(id = %binding.id))]
    pub async fn update(&self, binding: AddressGroupBinding, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        reader.get_by_id(&binding.id.0).await?;
        AddressGroupBindingValidator::validate_references(&reader, &reader, &binding).await?;
        AddressGroupBindingValidator::validate_no_duplicate(&reader, &binding).await?;
        drop(reader);

        let id = binding.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![binding.clone()], SyncOp::Upsert).await?;
        Box::new(writer).commit().await?;

        self.process_conditions(&binding).await;
        Ok(())
    }

    #[instrument(skip(self, items, cancel))]
    pub async fn sync(
        &self,
        items: Vec<AddressGroupBinding>,
        scope: Scope,
        op: SyncOp,
        cancel: CancellationToken,
    ) -> Result<()> {
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(scope, items, op).await?;
        Box::new(writer).commit().await
    }

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
    use crate::address_group::AddressGroupService;
    use crate::conditions::LoggingConditionManager;
    use netguard_pg_backend_core::{AddressGroup, AddressGroupRef, DefaultAction, Error, SelfRef, Service, ServiceRef};
    use netguard_pg_backend_store::InMemoryRegistry;

    async fn seeded() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
        AddressGroupService::new(registry.clone())
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

        let mut writer = registry.writer(CancellationToken::new()).await.unwrap();
        netguard_pg_backend_store::ServiceWriter::sync(
            &mut writer,
            Scope::one(ResourceIdentifier::new("ns", "web")),
            vec![Service {
                id: SelfRef::new(ResourceIdentifier::new("ns", "web")),
                description: String::new(),
                ingress_ports: vec![],
                address_groups: vec![],
            }],
            SyncOp::Upsert,
        )
        .await
        .unwrap();
        Box::new(writer).commit().await.unwrap();
        registry
    }

    fn binding(name: &str) -> AddressGroupBinding {
        AddressGroupBinding {
            id: SelfRef::new(ResourceIdentifier::new("ns", name)),
            service_ref: ServiceRef::new("web", ""),
            address_group_ref: AddressGroupRef::new("web-ag", ""),
        }
    }

    #[tokio::test]
    async fn create_with_valid_references_succeeds() {
        let registry = seeded().await;
        AddressGroupBindingService::new(registry, LoggingConditionManager)
            .create(binding("b1"), CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_binding_is_rejected() {
        let registry = seeded().await;
        let svc = AddressGroupBindingService::new(registry, LoggingConditionManager);
        svc.create(binding("b1"), CancellationToken::new()).await.unwrap();
        let err = svc.create(binding("b2"), CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateRule { .. }));
    }

    #[tokio::test]
    async fn create_rejects_dangling_service_reference() {
        let registry = InMemoryRegistry::new();
        AddressGroupService::new(registry.clone())
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
        let err = AddressGroupBindingService::new(registry, LoggingConditionManager)
            .create(binding("b1"), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReferenceInvalid { .. }));
    }
}
