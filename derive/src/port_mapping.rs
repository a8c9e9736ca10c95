use ahash::AHashSet as HashSet;
use netguard_pg_backend_core::{
    aggregated_address_groups, AccessPort, AddressGroupPortMapping, AddressGroupRef,
    ResourceIdentifier, Result, SelfRef, ServiceRef,
};
use netguard_pg_backend_store::{AddressGroupBindingReader, Scope, ServiceReader};
use std::collections::BTreeSet;
use tracing::instrument;

/// Recomputes the `AddressGroupPortMapping` for `ag`: the ports every
/// service whose aggregated address-group view includes `ag` exposes
/// through it. Scans every service rather than an index, matching the
/// store's lack of a reverse-lookup surface.
#[instrument(skip(services, bindings))]
pub async fn regenerate_for_address_group<S, B>(
    services: &S,
    bindings: &B,
    ag: &AddressGroupRef,
) -> Result<AddressGroupPortMapping>
where
    S: ServiceReader,
    B: AddressGroupBindingReader,
{
    let all_services = services.list_all(&Scope::Empty).await?;
    let all_bindings = bindings.list_all(&Scope::Empty).await?;

    let mut access_ports = Vec::new();
    for service in &all_services {
        let service_ref = ServiceRef::new(service.id.0.name.clone(), service.id.0.namespace.clone());
        let aggregated = aggregated_address_groups(
            &service_ref,
            &service.address_groups,
            all_bindings.clone(),
        );
        let belongs = aggregated
            .iter()
            .any(|a| a.address_group.name == ag.name && a.address_group.namespace == ag.namespace);
        if !belongs {
            continue;
        }

        let ports: BTreeSet<AccessPort> = service
            .ingress_ports
            .iter()
            .map(|p| AccessPort {
                protocol: p.protocol,
                port: p.port.clone(),
            })
            .collect();
        if !ports.is_empty() {
            access_ports.push((service_ref, ports));
        }
    }
    access_ports.sort_by(|a, b| (a.0.namespace.as_str(), a.0.name.as_str()).cmp(&(b.0.namespace.as_str(), b.0.name.as_str())));

    Ok(AddressGroupPortMapping {
        id: SelfRef::new(ResourceIdentifier::global(ag.name.clone())),
        access_ports,
    })
}

/// The distinct address groups `service`'s aggregated view touches, used by
/// callers deciding which `AddressGroupPortMapping`s need regenerating after
/// a service change.
#[instrument(skip(bindings, service_ref, spec_address_groups))]
pub async fn affected_address_groups<B>(
    bindings: &B,
    service_ref: &ServiceRef,
    spec_address_groups: &[AddressGroupRef],
) -> Result<Vec<AddressGroupRef>>
where
    B: AddressGroupBindingReader,
{
    let all_bindings = bindings.list_all(&Scope::Empty).await?;
    let aggregated = aggregated_address_groups(service_ref, spec_address_groups, all_bindings);
    let mut seen = HashSet::default();
    let mut out = Vec::new();
    for a in aggregated {
        let key = (a.address_group.namespace.clone(), a.address_group.name.clone());
        if seen.insert(key) {
            out.push(a.address_group);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_pg_backend_core::{IngressPort, Protocol, Service};
    use netguard_pg_backend_store::{InMemoryRegistry, Registry, ServiceWriter, SyncOp, Transaction};
    use tokio_util::sync::CancellationToken;

    fn svc(name: &str, ports: Vec<IngressPort>, ags: Vec<&str>) -> Service {
        Service {
            id: SelfRef::new(ResourceIdentifier::new("ns", name)),
            description: String::new(),
            ingress_ports: ports,
            address_groups: ags.into_iter().map(|a| AddressGroupRef::new(a, "")).collect(),
        }
    }

    #[tokio::test]
    async fn mapping_collects_ports_from_every_member_service() {
        let registry = InMemoryRegistry::new();
        let mut writer = registry.writer(CancellationToken::new()).await.unwrap();
        ServiceWriter::sync(
            &mut writer,
            Scope::Empty,
            vec![
                svc("web", vec![IngressPort::new(Protocol::Tcp, "80")], vec!["shared-ag"]),
                svc("db", vec![IngressPort::new(Protocol::Tcp, "5432")], vec!["shared-ag"]),
                svc("other", vec![IngressPort::new(Protocol::Tcp, "22")], vec!["other-ag"]),
            ],
            SyncOp::Upsert,
        )
        .await
        .unwrap();
        Box::new(writer).commit().await.unwrap();

        let reader = registry.reader(CancellationToken::new()).await.unwrap();
        let mapping = regenerate_for_address_group(&reader, &reader, &AddressGroupRef::new("shared-ag", ""))
            .await
            .unwrap();

        assert_eq!(mapping.access_ports.len(), 2);
        assert!(mapping.access_ports.iter().any(|(s, _)| s.name == "web"));
        assert!(mapping.access_ports.iter().any(|(s, _)| s.name == "db"));
    }

    #[tokio::test]
    async fn service_with_no_ports_is_excluded() {
        let registry = InMemoryRegistry::new();
        let mut writer = registry.writer(CancellationToken::new()).await.unwrap();
        ServiceWriter::sync(
            &mut writer,
            Scope::Empty,
            vec![svc("web", vec![], vec!["shared-ag"])],
            SyncOp::Upsert,
        )
        .await
        .unwrap();
        Box::new(writer).commit().await.unwrap();

        let reader = registry.reader(CancellationToken::new()).await.unwrap();
        let mapping = regenerate_for_address_group(&reader, &reader, &AddressGroupRef::new("shared-ag", ""))
            .await
            .unwrap();
        assert!(mapping.access_ports.is_empty());
    }
}
