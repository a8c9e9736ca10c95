use crate::capabilities::{
    RegenerateIEAgAgRulesForService, RegeneratePortMappingsForAddressGroup,
    RegeneratePortMappingsForService,
};
use netguard_pg_backend_core::{AddressGroupRef, ResourceIdentifier, Service};
use tracing::{debug, warn};

fn address_group_id(r: &AddressGroupRef) -> ResourceIdentifier {
    ResourceIdentifier::global(r.name.clone())
}

async fn regenerate_affected_port_mappings<PG>(pg: &PG, groups: impl Iterator<Item = AddressGroupRef>)
where
    PG: RegeneratePortMappingsForAddressGroup,
{
    for ag in groups {
        let id = address_group_id(&ag);
        if let Err(err) = pg.regenerate_port_mappings_for_address_group(&id).await {
            warn!(address_group = %id, %err, "port mapping regeneration failed");
        }
    }
}

async fn regenerate_ieagag_for_service<RS>(rs: &RS, service_id: &ResourceIdentifier)
where
    RS: RegenerateIEAgAgRulesForService,
{
    if let Err(err) = rs.regenerate_ieagag_rules_for_service(service_id).await {
        warn!(service = %service_id, %err, "IEAgAgRule regeneration failed");
    }
}

/// Fan-out for a successfully committed `Service` update: recomputes port
/// mappings for every address group the service currently belongs to and
/// every one it just left, then re-derives the service's `IEAgAgRule`s —
/// but only when ports or the declared address-group set actually
/// changed.
pub async fn on_service_updated<PG, RS>(port_mappings: &PG, ieagag_rules: &RS, old: &Service, new: &Service)
where
    PG: RegeneratePortMappingsForAddressGroup,
    RS: RegenerateIEAgAgRulesForService,
{
    let ports_changed = !Service::ports_equal(&old.ingress_ports, &new.ingress_ports);
    let address_groups_changed = !Service::address_groups_equal(&old.address_groups, &new.address_groups);
    if !ports_changed && !address_groups_changed {
        debug!(service = %new.id, "no port or address-group change, skipping fan-out");
        return;
    }

    let departed = old
        .address_groups
        .iter()
        .filter(|ag| !new.address_groups.iter().any(|n| n.name == ag.name && n.namespace == ag.namespace))
        .cloned();
    regenerate_affected_port_mappings(port_mappings, new.address_groups.iter().cloned()).await;
    regenerate_affected_port_mappings(port_mappings, departed).await;
    regenerate_ieagag_for_service(ieagag_rules, &new.id.0).await;
}

/// Fan-out for a newly created `Service`: nothing to regenerate unless the
/// spec already declares address groups.
pub async fn on_service_created<PG, RS>(port_mappings: &PG, ieagag_rules: &RS, created: &Service)
where
    PG: RegeneratePortMappingsForAddressGroup,
    RS: RegenerateIEAgAgRulesForService,
{
    if created.address_groups.is_empty() {
        debug!(service = %created.id, "created with no address groups, skipping fan-out");
        return;
    }
    regenerate_affected_port_mappings(port_mappings, created.address_groups.iter().cloned()).await;
    regenerate_ieagag_for_service(ieagag_rules, &created.id.0).await;
}

/// Fan-out for a deleted `Service`: removes its contribution from every
/// port mapping it was part of and reconciles its `IEAgAgRule`s down to
/// nothing. Reprocessing dependent `ServiceAlias`/`AddressGroupBinding`
/// conditions is the resource service's job, not this orchestrator's — it
/// needs the condition manager collaborator, which reactive doesn't see.
pub async fn on_service_deleted<PS, RS>(port_mappings: &PS, ieagag_rules: &RS, deleted_id: &ResourceIdentifier)
where
    PS: RegeneratePortMappingsForService,
    RS: RegenerateIEAgAgRulesForService,
{
    if let Err(err) = port_mappings.regenerate_port_mappings_for_service(deleted_id).await {
        warn!(service = %deleted_id, %err, "port mapping regeneration failed");
    }
    regenerate_ieagag_for_service(ieagag_rules, deleted_id).await;
}

/// Fan-out for a `ServiceAlias` create or update: re-derive every
/// `IEAgAgRule` reachable through it. Deletion deliberately has no
/// counterpart here — regenerating after delete would read a freshly
/// removed object, and the admission-time safe-delete check already
/// guarantees no live `RuleS2S` can still reference it.
pub async fn on_service_alias_upserted<RA>(ieagag_rules: &RA, alias_id: &ResourceIdentifier)
where
    RA: crate::capabilities::RegenerateIEAgAgRulesForServiceAlias,
{
    if let Err(err) = ieagag_rules.regenerate_ieagag_rules_for_service_alias(alias_id).await {
        warn!(alias = %alias_id, %err, "IEAgAgRule regeneration failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::RegenerateIEAgAgRulesForServiceAlias;
    use async_trait::async_trait;
    use netguard_pg_backend_core::{Error, ResourceIdentifier as Rid, SelfRef};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCapabilities {
        port_mapping_calls: Mutex<Vec<Rid>>,
        ieagag_calls: Mutex<Vec<Rid>>,
        fail_next: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl RegeneratePortMappingsForAddressGroup for RecordingCapabilities {
        async fn regenerate_port_mappings_for_address_group(&self, id: &Rid) -> netguard_pg_backend_core::Result<()> {
            self.port_mapping_calls.lock().unwrap().push(id.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl RegeneratePortMappingsForService for RecordingCapabilities {
        async fn regenerate_port_mappings_for_service(&self, id: &Rid) -> netguard_pg_backend_core::Result<()> {
            self.port_mapping_calls.lock().unwrap().push(id.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl RegenerateIEAgAgRulesForService for RecordingCapabilities {
        async fn regenerate_ieagag_rules_for_service(&self, id: &Rid) -> netguard_pg_backend_core::Result<()> {
            if self.fail_next.swap(false, std::sync::atomic::Ordering::SeqCst) {
                return Err(Error::TransientIO(anyhow::anyhow!("boom")));
            }
            self.ieagag_calls.lock().unwrap().push(id.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl RegenerateIEAgAgRulesForServiceAlias for RecordingCapabilities {
        async fn regenerate_ieagag_rules_for_service_alias(&self, id: &Rid) -> netguard_pg_backend_core::Result<()> {
            self.ieagag_calls.lock().unwrap().push(id.clone());
            Ok(())
        }
    }

    fn svc(name: &str, ports: Vec<netguard_pg_backend_core::IngressPort>, ags: Vec<&str>) -> Service {
        Service {
            id: SelfRef::new(Rid::new("ns", name)),
            description: String::new(),
            ingress_ports: ports,
            address_groups: ags.into_iter().map(|a| AddressGroupRef::new(a, "")).collect(),
        }
    }

    #[tokio::test]
    async fn unchanged_service_triggers_no_fan_out() {
        let caps = RecordingCapabilities::default();
        let old = svc("web", vec![], vec!["ag-1"]);
        let new = svc("web", vec![], vec!["ag-1"]);
        on_service_updated(&caps, &caps, &old, &new).await;
        assert!(caps.port_mapping_calls.lock().unwrap().is_empty());
        assert!(caps.ieagag_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn address_group_swap_regenerates_old_and_new() {
        let caps = RecordingCapabilities::default();
        let old = svc("web", vec![], vec!["ag-old"]);
        let new = svc("web", vec![], vec!["ag-new"]);
        on_service_updated(&caps, &caps, &old, &new).await;

        let calls = caps.port_mapping_calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().any(|id| id.name == "ag-old"));
        assert!(calls.iter().any(|id| id.name == "ag-new"));
        assert_eq!(caps.ieagag_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn created_with_no_address_groups_skips_fan_out() {
        let caps = RecordingCapabilities::default();
        let created = svc("web", vec![], vec![]);
        on_service_created(&caps, &caps, &created).await;
        assert!(caps.port_mapping_calls.lock().unwrap().is_empty());
        assert!(caps.ieagag_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_regeneration_is_swallowed() {
        let caps = RecordingCapabilities::default();
        caps.fail_next.store(true, std::sync::atomic::Ordering::SeqCst);
        let old = svc("web", vec![], vec!["ag-1"]);
        let new = svc("web", vec![], vec!["ag-2"]);
        on_service_updated(&caps, &caps, &old, &new).await;
        assert!(caps.ieagag_calls.lock().unwrap().is_empty());
    }
}
