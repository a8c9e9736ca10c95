use crate::wiring::Regenerators;
use netguard_pg_backend_core::{Result, ResourceIdentifier, RuleS2S};
use netguard_pg_backend_store::{Registry, RuleS2SReader, RuleS2SWriter, Scope, SyncOp, Transaction};
use netguard_pg_backend_validate::RuleS2SValidator;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Composes `RuleS2SValidator` with the store for the `RuleS2S` kind.
/// Unlike the other resource services, a `RuleS2S` mutation re-derives
/// `IEAgAgRule`s directly rather than through a reactive capability trait:
/// it's the triggering entity itself, not a side effect of some other
/// kind's change, so there's no setter-injection cycle to break here.
pub struct RuleS2SService<R> {
    registry: R,
}

impl<R: Registry + Clone> RuleS2SService<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    #[instrument(skip(self, cancel), fields(id = %id))]
    pub async fn get(&self, id: &ResourceIdentifier, cancel: CancellationToken) -> Result<RuleS2S> {
        self.registry.reader(cancel).await?.get_by_id(id).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, scope: &Scope, cancel: CancellationToken) -> Result<Vec<RuleS2S>> {
        self.registry.reader(cancel).await?.list_all(scope).await
    }

    #[instrument(skip(self, ids, cancel))]
    pub async fn get_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<Vec<RuleS2S>> {
        self.list(&Scope::ResourceIdentifiers(ids), cancel).await
    }

    #[instrument(skip(self, rule, cancel), fields(id = %rule.id))]
    pub async fn create(&self, rule: RuleS2S, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        RuleS2SValidator::validate_for_creation(&reader, &reader, &rule).await?;
        drop(reader);

        let namespace = rule.id.0.namespace.clone();
        let id = rule.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![rule], SyncOp::Upsert).await?;
        Box::new(writer).commit().await?;

        Regenerators::new(self.registry.clone()).regenerate_namespace(&namespace).await
    }

    #[instrument(skip(self, rule, cancel), fields(id = %rule.id))]
    pub async fn update(&self, rule: RuleS2S, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        let old = reader.get_by_id(&rule.id.0).await?;
        RuleS2SValidator::validate_for_update(&old, &rule)?;
        drop(reader);

        let namespace = rule.id.0.namespace.clone();
        let id = rule.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![rule], SyncOp::Upsert).await?;
        Box::new(writer).commit().await?;

        Regenerators::new(self.registry.clone()).regenerate_namespace(&namespace).await
    }

    #[instrument(skip(self, items, cancel))]
    pub async fn sync(&self, items: Vec<RuleS2S>, scope: Scope, op: SyncOp, cancel: CancellationToken) -> Result<()> {
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(scope, items, op).await?;
        Box::new(writer).commit().await
    }

    /// Idempotent per-kind delete rule. After removing the rows, every
    /// affected namespace is recomputed so the `IEAgAgRule`s the deleted
    /// rules contributed disappear too.
    #[instrument(skip(self, ids, cancel))]
    pub async fn delete_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        let mut namespaces = ahash::AHashSet::default();
        for id in &ids {
            if let Ok(rule) = reader.get_by_id(id).await {
                namespaces.insert(rule.id.0.namespace.clone());
            }
        }
        drop(reader);

        let mut writer = self.registry.writer(cancel).await?;
        writer.delete_by_ids(ids).await?;
        Box::new(writer).commit().await?;

        let regenerators = Regenerators::new(self.registry.clone());
        for namespace in namespaces {
            regenerators.regenerate_namespace(&namespace).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_pg_backend_core::{Error, SelfRef, Service, ServiceAlias, ServiceAliasRef, ServiceRef, Traffic};
    use netguard_pg_backend_store::InMemoryRegistry;

    async fn seeded() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
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
        netguard_pg_backend_store::ServiceWriter::sync(
            &mut writer,
            Scope::one(ResourceIdentifier::new("ns", "db")),
            vec![Service {
                id: SelfRef::new(ResourceIdentifier::new("ns", "db")),
                description: String::new(),
                ingress_ports: vec![],
                address_groups: vec![],
            }],
            SyncOp::Upsert,
        )
        .await
        .unwrap();
        netguard_pg_backend_store::ServiceAliasWriter::sync(
            &mut writer,
            Scope::one(ResourceIdentifier::new("ns", "web-alias")),
            vec![ServiceAlias {
                id: SelfRef::new(ResourceIdentifier::new("ns", "web-alias")),
                service_ref: ServiceRef::new("web", ""),
            }],
            SyncOp::Upsert,
        )
        .await
        .unwrap();
        netguard_pg_backend_store::ServiceAliasWriter::sync(
            &mut writer,
            Scope::one(ResourceIdentifier::new("ns", "db-alias")),
            vec![ServiceAlias {
                id: SelfRef::new(ResourceIdentifier::new("ns", "db-alias")),
                service_ref: ServiceRef::new("db", ""),
            }],
            SyncOp::Upsert,
        )
        .await
        .unwrap();
        Box::new(writer).commit().await.unwrap();
        registry
    }

    fn rule(name: &str) -> RuleS2S {
        RuleS2S {
            id: SelfRef::new(ResourceIdentifier::new("ns", name)),
            traffic: Traffic::Ingress,
            service_local_ref: ServiceAliasRef::new("web-alias", ""),
            service_ref: ServiceAliasRef::new("db-alias", ""),
            trace: false,
        }
    }

    #[tokio::test]
    async fn create_rejects_dangling_alias_reference() {
        let registry = InMemoryRegistry::new();
        let svc = RuleS2SService::new(registry);
        let err = svc.create(rule("r1"), CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::ReferenceInvalid { .. }));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_traffic_pair() {
        let registry = seeded().await;
        let svc = RuleS2SService::new(registry);
        svc.create(rule("r1"), CancellationToken::new()).await.unwrap();
        let err = svc.create(rule("r2"), CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateRule { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent_for_missing_id() {
        let registry = seeded().await;
        let svc = RuleS2SService::new(registry);
        svc.delete_by_ids(vec![ResourceIdentifier::new("ns", "nope")], CancellationToken::new())
            .await
            .unwrap();
    }
}
