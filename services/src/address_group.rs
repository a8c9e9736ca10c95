use netguard_pg_backend_core::{AddressGroup, Result, ResourceIdentifier};
use netguard_pg_backend_store::{AddressGroupReader, AddressGroupWriter, Registry, Scope, SyncOp, Transaction};
use netguard_pg_backend_validate::AddressGroupValidator;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Composes `AddressGroupValidator` with the store for the `AddressGroup`
/// kind. No reactive fan-out of its own: an `AddressGroup`'s port mapping is
/// recomputed from the services that reference it, not from the group
/// itself.
pub struct AddressGroupService<R> {
    registry: R,
}

impl<R: Registry + Clone> AddressGroupService<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    #[instrument(skip(self, cancel), fields(id = %id))]
    pub async fn get(&self, id: &ResourceIdentifier, cancel: CancellationToken) -> Result<AddressGroup> {
        self.registry.reader(cancel).await?.get_by_id(id).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, scope: &Scope, cancel: CancellationToken) -> Result<Vec<AddressGroup>> {
        self.registry.reader(cancel).await?.list_all(scope).await
    }

    #[instrument(skip(self, ids, cancel))]
    pub async fn get_by_ids(
        &self,
        ids: Vec<ResourceIdentifier>,
        cancel: CancellationToken,
    ) -> Result<Vec<AddressGroup>> {
        self.list(&Scope::ResourceIdentifiers(ids), cancel).await
    }

    #[instrument(skip(self, group, cancel), fields(id = %group.id))]
    pub async fn create(&self, group: AddressGroup, cancel: CancellationToken) -> Result<()> {
        AddressGroupValidator::validate_no_duplicate_addresses(&group)?;
        let id = group.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![group], SyncOp::Upsert).await?;
        Box::new(writer).commit().await
    }

    #[instrument(skip(self, group, cancel), fields(id = %group.id))]
    pub async fn update(&self, group: AddressGroup, cancel: CancellationToken) -> Result<()> {
        AddressGroupValidator::validate_no_duplicate_addresses(&group)?;
        let reader = self.registry.reader(cancel.clone()).await?;
        reader.get_by_id(&group.id.0).await?;
        drop(reader);

        let id = group.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![group], SyncOp::Upsert).await?;
        Box::new(writer).commit().await
    }

    #[instrument(skip(self, items, cancel))]
    pub async fn sync(
        &self,
        items: Vec<AddressGroup>,
        scope: Scope,
        op: SyncOp,
        cancel: CancellationToken,
    ) -> Result<()> {
        for group in &items {
            AddressGroupValidator::validate_no_duplicate_addresses(group)?;
        }
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(scope, items, op).await?;
        Box::new(writer).commit().await
    }

    /// Idempotent: an id with no live row is skipped, not an error, matching
    /// every other kind's delete.
    #[instrument(skip(self, ids, cancel))]
    pub async fn delete_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        for id in &ids {
            AddressGroupValidator::check_dependencies(id, &reader, &reader).await?;
        }
        drop(reader);

        let mut writer = self.registry.writer(cancel).await?;
        writer.delete_by_ids(ids).await?;
        Box::new(writer).commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_pg_backend_core::{DefaultAction, Error, SelfRef};
    use netguard_pg_backend_store::InMemoryRegistry;

    fn ag(name: &str, addrs: Vec<&str>) -> AddressGroup {
        AddressGroup {
            id: SelfRef::new(ResourceIdentifier::global(name)),
            addresses: addrs.into_iter().map(|a| a.parse().unwrap()).collect(),
            default_action: DefaultAction::Accept,
            logs: false,
            trace: false,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let svc = AddressGroupService::new(InMemoryRegistry::new());
        svc.create(ag("web-ag", vec!["10.0.0.0/24"]), CancellationToken::new())
            .await
            .unwrap();
        let got = svc
            .get(&ResourceIdentifier::global("web-ag"), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(got.addresses.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_addresses() {
        let svc = AddressGroupService::new(InMemoryRegistry::new());
        let err = svc
            .create(ag("web-ag", vec!["10.0.0.0/24", "10.0.0.0/24"]), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent_for_missing_id() {
        let svc = AddressGroupService::new(InMemoryRegistry::new());
        svc.delete_by_ids(vec![ResourceIdentifier::global("nope")], CancellationToken::new())
            .await
            .unwrap();
    }
}
