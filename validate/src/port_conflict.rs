use netguard_pg_backend_core::{
    AddressGroupRef, Error, IngressPort, Result, ResourceIdentifier,
};
use netguard_pg_backend_store::AddressGroupPortMappingReader;

/// Cross-service port conflict check: if any `AddressGroup` is shared with
/// another service, the union of their exposed ranges per protocol must not
/// overlap. Checked against the currently stored
/// `AddressGroupPortMapping` for each candidate address group — not
/// against other services' live specs, since the mapping is already the
/// aggregated truth of who exposes what through that group.
pub async fn check_cross_service_port_conflict<R>(
    reader: &R,
    candidate_service: &ResourceIdentifier,
    candidate_ports: &[IngressPort],
    candidate_address_groups: &[AddressGroupRef],
) -> Result<()>
where
    R: AddressGroupPortMappingReader,
{
    for ag_ref in candidate_address_groups {
        let mapping_id = ResourceIdentifier::global(ag_ref.name.clone());
        let mapping = match reader.get_by_id(&mapping_id).await {
            Ok(m) => m,
            Err(Error::NotFound { .. }) => continue,
            Err(e) => return Err(e),
        };

        for (other_service, other_ports) in &mapping.access_ports {
            let other_id = ResourceIdentifier::new(
                other_service.namespace.clone(),
                other_service.name.clone(),
            );
            if &other_id == candidate_service {
                continue;
            }

            for candidate_port in candidate_ports {
                for existing in other_ports {
                    let existing_port = IngressPort::new(existing.protocol, existing.port.clone());
                    if existing_port.overlaps(candidate_port) {
                        return Err(Error::PortConflict {
                            service_a: candidate_service.clone(),
                            service_b: other_id,
                            address_group: mapping_id,
                            protocol: candidate_port.protocol.as_str(),
                            overlap: format!("{} vs {}", candidate_port.port, existing.port),
                        });
                    }
                }
            }
        }
    }

    Ok(())
}
