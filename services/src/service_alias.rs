use crate::conditions::ConditionManager;
use netguard_pg_backend_core::{Result, ResourceIdentifier, ServiceAlias};
use netguard_pg_backend_reactive::RegenerateIEAgAgRulesForServiceAlias;
use netguard_pg_backend_store::{Registry, Scope, ServiceAliasReader, ServiceAliasWriter, SyncOp, Transaction};
use netguard_pg_backend_validate::ServiceAliasValidator;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

/// Composes `ServiceAliasValidator` with the store, triggers the
/// `RegenerateIEAgAgRulesForServiceAlias` capability after every successful
/// create/update per the reactive orchestrator's alias-upserted fan-out, and
/// reprocesses the alias's own conditions through `ConditionManager`.
pub struct ServiceAliasService<R, RA, CM> {
    registry: R,
    regenerator: Arc<RA>,
    condition_manager: CM,
}

impl<R, RA, CM> ServiceAliasService<R, RA, CM>
where
    R: Registry + Clone,
    RA: RegenerateIEAgAgRulesForServiceAlias,
    CM: ConditionManager,
{
    pub fn new(registry: R, regenerator: Arc<RA>, condition_manager: CM) -> Self {
        Self {
            registry,
            regenerator,
            condition_manager,
        }
    }

    async fn process_conditions(&self, alias: &ServiceAlias) {
        if let Err(err) = self.condition_manager.process_service_alias_conditions(alias).await {
            warn!(alias = %alias.id, %err, "condition processing failed");
        }
    }

    #[instrument(skip(self, cancel), fields(id = %id))]
    pub async fn get(&self, id: &ResourceIdentifier, cancel: CancellationToken) -> Result<ServiceAlias> {
        self.registry.reader(cancel).await?.get_by_id(id).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, scope: &Scope, cancel: CancellationToken) -> Result<Vec<ServiceAlias>> {
        self.registry.reader(cancel).await?.list_all(scope).await
    }

    #[instrument(skip(self, ids, cancel))]
    pub async fn get_by_ids(
        &self,
        ids: Vec<ResourceIdentifier>,
        cancel: CancellationToken,
    ) -> Result<Vec<ServiceAlias>> {
        self.list(&Scope::ResourceIdentifiers(ids), cancel).await
    }

    #[instrument(skip(self, alias, cancel), fields(id = %alias.id))]
    pub async fn create(&self, alias: ServiceAlias, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        ServiceAliasValidator::validate_references(&reader, &alias).await?;
        drop(reader);

        let id = alias.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id.clone()), vec![alias.clone()], SyncOp::Upsert).await?;
        Box::new(writer).commit().await?;

        self.process_conditions(&alias).await;
        netguard_pg_backend_reactive::on_service_alias_upserted(self.regenerator.as_ref(), &id).await;
        Ok(())
    }

    #[instrument(skip(self, alias, cancel), fields(id = %alias.id))]
    pub async fn update(&self, alias: ServiceAlias, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        reader.get_by_id(&alias.id.0).await?;
        ServiceAliasValidator::validate_references(&reader, &alias).await?;
        drop(reader);

        let id = alias.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id.clone()), vec![alias.clone()], SyncOp::Upsert).await?;
        Box::new(writer).commit().await?;

        self.process_conditions(&alias).await;
        netguard_pg_backend_reactive::on_service_alias_upserted(self.regenerator.as_ref(), &id).await;
        Ok(())
    }

    #[instrument(skip(self, items, cancel))]
    pub async fn sync(&self, items: Vec<ServiceAlias>, scope: Scope, op: SyncOp, cancel: CancellationToken) -> Result<()> {
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(scope, items, op).await?;
        Box::new(writer).commit().await
    }

    /// Refuses deletion while any `RuleS2S` still references the alias; no
    /// regeneration counterpart on delete (see `on_service_alias_upserted`'s
    /// doc comment for why).
    #[instrument(skip(self, ids, cancel))]
    pub async fn delete_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        for id in &ids {
            ServiceAliasValidator::check_dependencies(id, &reader).await?;
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
    use crate::conditions::LoggingConditionManager;
    use async_trait::async_trait;
    use netguard_pg_backend_core::{Error, SelfRef, Service, ServiceRef};
    use netguard_pg_backend_store::InMemoryRegistry;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRegenerator {
        calls: Mutex<Vec<ResourceIdentifier>>,
    }

    #[async_trait]
    impl RegenerateIEAgAgRulesForServiceAlias for RecordingRegenerator {
        async fn regenerate_ieagag_rules_for_service_alias(&self, id: &ResourceIdentifier) -> Result<()> {
            self.calls.lock().unwrap().push(id.clone());
            Ok(())
        }
    }

    async fn seeded_with_service() -> InMemoryRegistry {
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
        Box::new(writer).commit().await.unwrap();
        registry
    }

    #[tokio::test]
    async fn create_triggers_regeneration() {
        let registry = seeded_with_service().await;
        let regenerator = Arc::new(RecordingRegenerator::default());
        let svc = ServiceAliasService::new(registry, regenerator.clone(), LoggingConditionManager);
        let alias = ServiceAlias {
            id: SelfRef::new(ResourceIdentifier::new("ns", "web-alias")),
            service_ref: ServiceRef::new("web", ""),
        };
        svc.create(alias, CancellationToken::new()).await.unwrap();
        assert_eq!(regenerator.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_dangling_service_reference() {
        let registry = InMemoryRegistry::new();
        let regenerator = Arc::new(RecordingRegenerator::default());
        let svc = ServiceAliasService::new(registry, regenerator, LoggingConditionManager);
        let alias = ServiceAlias {
            id: SelfRef::new(ResourceIdentifier::new("ns", "web-alias")),
            service_ref: ServiceRef::new("ghost", ""),
        };
        let err = svc.create(alias, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::ReferenceInvalid { .. }));
    }
}
