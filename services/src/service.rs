use crate::conditions::ConditionManager;
use crate::sync::SyncManager;
use crate::wiring::Regenerators;
use netguard_pg_backend_core::{Result, ResourceIdentifier, Service};
use netguard_pg_backend_reactive::{on_service_created, on_service_deleted, on_service_updated};
use netguard_pg_backend_store::{Registry, Scope, ServiceReader, ServiceWriter, SyncOp, Transaction};
use netguard_pg_backend_validate::ServiceValidator;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

/// Composes `ServiceValidator` with the store, the best-effort sgroups
/// `SyncManager`/`ConditionManager` collaborators, and the reactive
/// orchestrator's `on_service_*` fan-out. The most involved resource
/// service: every mutation follows acquire reader, validate, acquire
/// writer, persist, commit, process conditions, run reactive fan-out, in
/// that order, with fan-out failures logged and swallowed.
pub struct ServiceService<R, SM, CM> {
    registry: R,
    regenerators: Arc<Regenerators<R>>,
    sync_manager: SM,
    condition_manager: CM,
}

impl<R, SM, CM> ServiceService<R, SM, CM>
where
    R: Registry + Clone,
    SM: SyncManager<Service>,
    CM: ConditionManager,
{
    pub fn new(registry: R, sync_manager: SM, condition_manager: CM) -> Self {
        let regenerators = Arc::new(Regenerators::new(registry.clone()));
        Self {
            registry,
            regenerators,
            sync_manager,
            condition_manager,
        }
    }

    #[instrument(skip(self, cancel), fields(id = %id))]
    pub async fn get(&self, id: &ResourceIdentifier, cancel: CancellationToken) -> Result<Service> {
        self.registry.reader(cancel).await?.get_by_id(id).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, scope: &Scope, cancel: CancellationToken) -> Result<Vec<Service>> {
        self.registry.reader(cancel).await?.list_all(scope).await
    }

    #[instrument(skip(self, ids, cancel))]
    pub async fn get_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<Vec<Service>> {
        self.list(&Scope::ResourceIdentifiers(ids), cancel).await
    }

    #[instrument(skip(self, service, cancel), fields(id = %service.id))]
    pub async fn create(&self, service: Service, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        ServiceValidator::validate_for_creation(&reader, &service).await?;
        drop(reader);

        let id = service.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![service.clone()], SyncOp::Upsert).await?;
        Box::new(writer).commit().await?;

        self.after_commit(&service).await;
        on_service_created(self.regenerators.as_ref(), self.regenerators.as_ref(), &service).await;
        Ok(())
    }

    #[instrument(skip(self, service, cancel), fields(id = %service.id))]
    pub async fn update(&self, service: Service, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        let old = reader.get_by_id(&service.id.0).await?;
        ServiceValidator::validate_for_update(&reader, &old, &service).await?;
        drop(reader);

        let id = service.id.0.clone();
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(Scope::one(id), vec![service.clone()], SyncOp::Upsert).await?;
        Box::new(writer).commit().await?;

        self.after_commit(&service).await;
        on_service_updated(self.regenerators.as_ref(), self.regenerators.as_ref(), &old, &service).await;
        Ok(())
    }

    #[instrument(skip(self, items, cancel))]
    pub async fn sync(&self, items: Vec<Service>, scope: Scope, op: SyncOp, cancel: CancellationToken) -> Result<()> {
        let mut writer = self.registry.writer(cancel).await?;
        writer.sync(scope, items, op).await?;
        Box::new(writer).commit().await
    }

    /// Refuses deletion while any `AddressGroupBinding` or `ServiceAlias`
    /// still references the service; derived artifacts (port mappings,
    /// `IEAgAgRule`s) never block it and are cleaned up by the fan-out
    /// below instead.
    #[instrument(skip(self, ids, cancel))]
    pub async fn delete_by_ids(&self, ids: Vec<ResourceIdentifier>, cancel: CancellationToken) -> Result<()> {
        let reader = self.registry.reader(cancel.clone()).await?;
        let mut deleted = Vec::with_capacity(ids.len());
        for id in &ids {
            ServiceValidator::check_dependencies(id, &reader, &reader).await?;
            deleted.push(reader.get_by_id(id).await?);
        }
        drop(reader);

        let mut writer = self.registry.writer(cancel).await?;
        writer.delete_by_ids(ids.clone()).await?;
        Box::new(writer).commit().await?;

        for service in &deleted {
            if let Err(err) = self.sync_manager.sync_entity(service, SyncOp::Delete).await {
                warn!(service = %service.id, %err, "sgroups delete sync failed");
            }
        }
        for id in &ids {
            on_service_deleted(self.regenerators.as_ref(), self.regenerators.as_ref(), id).await;
        }
        Ok(())
    }

    async fn after_commit(&self, service: &Service) {
        if let Err(err) = self.sync_manager.sync_entity(service, SyncOp::Upsert).await {
            warn!(service = %service.id, %err, "sgroups sync failed");
        }
        if let Err(err) = self.condition_manager.process_service_conditions(service).await {
            warn!(service = %service.id, %err, "condition processing failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::LoggingConditionManager;
    use crate::sync::LoggingSyncManager;
    use netguard_pg_backend_core::{
        AddressGroupRef, Error, IngressPort, Protocol, SelfRef,
    };
    use netguard_pg_backend_store::InMemoryRegistry;

    fn svc(name: &str, ports: Vec<IngressPort>, ags: Vec<&str>) -> Service {
        Service {
            id: SelfRef::new(ResourceIdentifier::new("ns", name)),
            description: String::new(),
            ingress_ports: ports,
            address_groups: ags.into_iter().map(|a| AddressGroupRef::new(a, "")).collect(),
        }
    }

    fn new_service() -> ServiceService<InMemoryRegistry, LoggingSyncManager, LoggingConditionManager> {
        ServiceService::new(InMemoryRegistry::new(), LoggingSyncManager, LoggingConditionManager)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let svc_handle = new_service();
        svc_handle
            .create(svc("web", vec![IngressPort::new(Protocol::Tcp, "80")], vec![]), CancellationToken::new())
            .await
            .unwrap();
        let got = svc_handle
            .get(&ResourceIdentifier::new("ns", "web"), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(got.ingress_ports.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_internal_port_overlap() {
        let svc_handle = new_service();
        let ports = vec![
            IngressPort::new(Protocol::Tcp, "80-90"),
            IngressPort::new(Protocol::Tcp, "85"),
        ];
        let err = svc_handle
            .create(svc("web", ports, vec![]), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
    }

    #[tokio::test]
    async fn delete_is_refused_while_binding_exists() {
        let registry = InMemoryRegistry::new();
        let svc_handle =
            ServiceService::new(registry.clone(), LoggingSyncManager, LoggingConditionManager);
        svc_handle
            .create(svc("web", vec![], vec![]), CancellationToken::new())
            .await
            .unwrap();

        crate::address_group::AddressGroupService::new(registry.clone())
            .create(
                netguard_pg_backend_core::AddressGroup {
                    id: SelfRef::new(ResourceIdentifier::global("web-ag")),
                    addresses: vec![],
                    default_action: netguard_pg_backend_core::DefaultAction::Accept,
                    logs: false,
                    trace: false,
                },
                CancellationToken::new(),
            )
            .await
            .unwrap();
        crate::binding::AddressGroupBindingService::new(registry.clone(), LoggingConditionManager)
            .create(
                netguard_pg_backend_core::AddressGroupBinding {
                    id: SelfRef::new(ResourceIdentifier::new("ns", "b1")),
                    service_ref: netguard_pg_backend_core::ServiceRef::new("web", ""),
                    address_group_ref: AddressGroupRef::new("web-ag", ""),
                },
                CancellationToken::new(),
            )
            .await
            .unwrap();

        let err = svc_handle
            .delete_by_ids(vec![ResourceIdentifier::new("ns", "web")], CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DependencyExists { .. }));
    }
}
