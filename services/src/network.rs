use netguard_pg_backend_core::{Network, Result, ResourceIdentifier};
use netguard_pg_backend_store::{NetworkReader, NetworkWriter, Registry, Scope, SyncOp, Transaction};
use netguard_pg_backend_validate::NetworkValidator;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Composes `NetworkValidator` with the store for the `Network` kind. A
/// `Network` carries only a CIDR; parsing happens at the edge (the caller's
/// deserializer), so there's nothing left to validate on create/update
/// beyond the safe-delete check.
pub struct NetworkService<R> {
    registry: R,
}

impl<R: Registry + Clone> NetworkService<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    #[instrument(skip(self, cancel), fields(id = %id))]
    pub async fn get(&self, id: &ResourceIdentifier, cancel: CancellationToken) -> Result<Network> {
        self.registry.reader(cancel).await?.get_by_id(id).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, scope: &Scope, cancel: CancellationToken) -> Result<Vec<Network>> {
        self.registry.reader(cancel).await?.list_all(scope).await
    }

    #[instrument(skip(self, ids, cancel))]
    pub async fn get_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<Vec<Network>> {
        self.list(&Scope::ResourceIdentifiers(ids), cancel).await
    }

    #[instrument(skip(self, network, cancel), fields(id = %network.id))]
    pub async fn create(&self, network: Network, cancel: CancellationToken) -> Result<()> {
        let id = network.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![network], SyncOp::Upsert).await?;
        Box::new(writer).commit().await
    }

    #[instrument(skip(self, network, cancel), fields(id = %network.id))]
    pub async fn update(&self, network: Network, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        reader.get_by_id(&network.id.0).await?;
        drop(reader);

        let id = network.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![network], SyncOp::Upsert).await?;
        Box::new(writer).commit().await
    }

    #[instrument(skip(self, items, cancel))]
    pub async fn sync(&self, items: Vec<Network>, scope: Scope, op: SyncOp, cancel: CancellationToken) -> Result<()> {
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(scope, items, op).await?;
        Box::new(writer).commit().await
    }

    #[instrument(skip(self, ids, cancel))]
    pub async fn delete_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        for id in &ids {
            NetworkValidator::check_dependencies(id, &reader).await?;
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
    use netguard_pg_backend_core::SelfRef;
    use netguard_pg_backend_store::InMemoryRegistry;

    fn net(name: &str, cidr: &str) -> Network {
        Network {
            id: SelfRef::new(ResourceIdentifier::global(name)),
            cidr: cidr.parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let svc = NetworkService::new(InMemoryRegistry::new());
        svc.create(net("corp-net", "10.0.0.0/8"), CancellationToken::new())
            .await
            .unwrap();
        let got = svc
            .get(&ResourceIdentifier::global("corp-net"), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(got.cidr.to_string(), "10.0.0.0/8");
    }

    #[tokio::test]
    async fn delete_is_idempotent_for_missing_id() {
        let svc = NetworkService::new(InMemoryRegistry::new());
        svc.delete_by_ids(vec![ResourceIdentifier::global("nope")], CancellationToken::new())
            .await
            .unwrap();
    }
}
