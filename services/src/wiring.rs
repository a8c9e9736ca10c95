//! Setter-injection glue breaking the cycle between `ServiceService` (needs
//! to trigger IEAgAgRule/port-mapping regeneration) and `RuleS2SService`
//! (needs to read services to derive rules): both sides depend only on the
//! narrow capability traits from the reactive crate, and `Regenerators<R>`
//! is the single concrete implementation of all four, built directly from
//! a store handle rather than from either resource service.

use ahash::AHashSet as HashSet;
use async_trait::async_trait;
use netguard_pg_backend_core::{AddressGroupRef, Error, ResourceIdentifier, Result, ServiceRef};
use netguard_pg_backend_derive::{affected_address_groups, derive_for_rule, reconcile, regenerate_for_address_group};
use netguard_pg_backend_reactive::{
    RegenerateIEAgAgRulesForService, RegenerateIEAgAgRulesForServiceAlias,
    RegeneratePortMappingsForAddressGroup, RegeneratePortMappingsForService,
};
use netguard_pg_backend_store::{
    AddressGroupPortMappingWriter, AddressGroupReader, Registry, RuleS2SReader, Scope,
    ServiceAliasReader, ServiceReader, SyncOp, Transaction,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The one concrete regenerator: holds a store handle and nothing else, so
/// either resource service can be handed an `Arc<Regenerators<R>>` after
/// construction without either depending on the other's type.
pub struct Regenerators<R> {
    registry: R,
}

impl<R: Registry + Clone> Regenerators<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Recomputes the full desired `IEAgAgRule` set for every `RuleS2S` in
    /// `namespace` and reconciles it against what's currently stored. The
    /// desired set always covers the whole namespace, not just the rules
    /// that triggered the call, so an unrelated rule sharing the namespace
    /// is never dropped by the diff. A rule whose alias chain currently
    /// resolves to a deleted service or alias contributes nothing rather
    /// than failing the whole batch.
    pub(crate) async fn regenerate_namespace(&self, namespace: &str) -> Result<()> {
        let cancel = CancellationToken::new();
        let reader = self.registry.reader(cancel.clone()).await?;
        let rules = RuleS2SReader::list_all(&reader, &Scope::Namespace(namespace.to_string())).await?;

        let mut desired = Vec::new();
        for rule in &rules {
            match derive_for_rule(&reader, &reader, &reader, rule).await {
                Ok(mut derived) => desired.append(&mut derived),
                Err(Error::NotFound { kind, id }) => {
                    debug!(rule = %rule.id, %kind, %id, "dangling reference, skipping rule in regeneration");
                }
                Err(err) => return Err(err),
            }
        }

        let mut writer = self.registry.writer(cancel).await?;
        reconcile(&reader, &mut writer, namespace, desired).await?;
        Box::new(writer).commit().await
    }

    async fn namespaces_referencing_alias(&self, alias_id: &ResourceIdentifier) -> Result<HashSet<String>> {
        let cancel = CancellationToken::new();
        let reader = self.registry.reader(cancel).await?;
        let rules = RuleS2SReader::list_all(&reader, &Scope::Empty).await?;
        let mut namespaces = HashSet::default();
        for rule in rules {
            let local = rule.service_local_ref.resolve(&rule.id.0.namespace);
            let target = rule.service_ref.resolve(&rule.id.0.namespace);
            if &local == alias_id || &target == alias_id {
                namespaces.insert(rule.id.0.namespace.clone());
            }
        }
        Ok(namespaces)
    }

    async fn namespaces_referencing_service(&self, service_id: &ResourceIdentifier) -> Result<HashSet<String>> {
        let cancel = CancellationToken::new();
        let reader = self.registry.reader(cancel).await?;
        let aliases = ServiceAliasReader::list_all(&reader, &Scope::Empty).await?;
        let mut alias_ids = HashSet::default();
        for alias in aliases {
            if &alias.service_ref.resolve(&alias.id.0.namespace) == service_id {
                alias_ids.insert(alias.id.0.clone());
            }
        }

        let rules = RuleS2SReader::list_all(&reader, &Scope::Empty).await?;
        let mut namespaces = HashSet::default();
        for rule in rules {
            let local = rule.service_local_ref.resolve(&rule.id.0.namespace);
            let target = rule.service_ref.resolve(&rule.id.0.namespace);
            if alias_ids.contains(&local) || alias_ids.contains(&target) {
                namespaces.insert(rule.id.0.namespace.clone());
            }
        }
        Ok(namespaces)
    }
}

#[async_trait]
impl<R: Registry + Clone> RegeneratePortMappingsForAddressGroup for Regenerators<R> {
    async fn regenerate_port_mappings_for_address_group(&self, ag_id: &ResourceIdentifier) -> Result<()> {
        let cancel = CancellationToken::new();
        let reader = self.registry.reader(cancel.clone()).await?;
        let ag_ref = AddressGroupRef::new(ag_id.name.clone(), String::new());
        let mapping = regenerate_for_address_group(&reader, &reader, &ag_ref).await?;

        let mut writer = self.registry.writer(cancel).await?;
        AddressGroupPortMappingWriter::sync(
            &mut writer,
            Scope::one(mapping.id.0.clone()),
            vec![mapping],
            SyncOp::Upsert,
        )
        .await?;
        Box::new(writer).commit().await
    }
}

#[async_trait]
impl<R: Registry + Clone> RegeneratePortMappingsForService for Regenerators<R> {
    /// The service row is already gone by the time this runs (delete fan-out
    /// happens post-commit), so its former address-group membership can't
    /// be recovered from the id alone. Falls back to recomputing every
    /// stored `AddressGroup`'s mapping, which is correct — just less
    /// targeted than the per-address-group path — and acceptable under the
    /// eventual-consistency allowance for reactive regeneration.
    async fn regenerate_port_mappings_for_service(&self, service_id: &ResourceIdentifier) -> Result<()> {
        let cancel = CancellationToken::new();
        let reader = self.registry.reader(cancel.clone()).await?;

        if let Ok(service) = ServiceReader::get_by_id(&reader, service_id).await {
            let service_ref = ServiceRef::new(service_id.name.clone(), service_id.namespace.clone());
            let affected = affected_address_groups(&reader, &service_ref, &service.address_groups).await?;
            drop(reader);
            for ag in affected {
                self.regenerate_port_mappings_for_address_group(&ResourceIdentifier::global(ag.name))
                    .await?;
            }
            return Ok(());
        }

        let all_groups = AddressGroupReader::list_all(&reader, &Scope::Empty).await?;
        drop(reader);
        for ag in all_groups {
            self.regenerate_port_mappings_for_address_group(&ag.id.0).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Registry + Clone> RegenerateIEAgAgRulesForService for Regenerators<R> {
    async fn regenerate_ieagag_rules_for_service(&self, service_id: &ResourceIdentifier) -> Result<()> {
        for namespace in self.namespaces_referencing_service(service_id).await? {
            self.regenerate_namespace(&namespace).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Registry + Clone> RegenerateIEAgAgRulesForServiceAlias for Regenerators<R> {
    async fn regenerate_ieagag_rules_for_service_alias(&self, alias_id: &ResourceIdentifier) -> Result<()> {
        for namespace in self.namespaces_referencing_alias(alias_id).await? {
            self.regenerate_namespace(&namespace).await?;
        }
        Ok(())
    }
}
