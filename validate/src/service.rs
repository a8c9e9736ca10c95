use crate::port_conflict::check_cross_service_port_conflict;
use netguard_pg_backend_core::{Error, IngressPort, Result, ResourceIdentifier, Service};
use netguard_pg_backend_store::{
    AddressGroupBindingReader, AddressGroupPortMappingReader, Scope, ServiceAliasReader,
};
use tracing::instrument;

/// Validates `Service.Create`/`Service.Update`: well-formed, non-overlapping
/// ingress ports within the service, and — when the reader provides access
/// to port mappings — the cross-service conflict check over shared address
/// groups.
pub struct ServiceValidator;

impl ServiceValidator {
    /// Within one service, no two ingress ports may overlap on the same
    /// protocol.
    #[instrument(skip(ports), fields(service = %service.id))]
    pub fn validate_no_internal_overlap(service: &Service, ports: &[IngressPort]) -> Result<()> {
        for p in ports {
            if p.range().is_none() {
                return Err(Error::Invalid {
                    kind: "Service",
                    id: service.id.0.clone(),
                    reason: format!("malformed port {:?}", p.port),
                });
            }
        }
        for (i, a) in ports.iter().enumerate() {
            for b in &ports[i + 1..] {
                if a.overlaps(b) {
                    return Err(Error::Invalid {
                        kind: "Service",
                        id: service.id.0.clone(),
                        reason: format!(
                            "ingress ports {} and {} overlap on {}",
                            a.port, b.port, a.protocol
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    #[instrument(skip(reader, service), fields(service = %service.id))]
    pub async fn validate_for_creation<R>(reader: &R, service: &Service) -> Result<()>
    where
        R: AddressGroupPortMappingReader,
    {
        Self::validate_no_internal_overlap(service, &service.ingress_ports)?;
        check_cross_service_port_conflict(
            reader,
            &service.id.0,
            &service.ingress_ports,
            &service.address_groups,
        )
        .await
    }

    #[instrument(skip(reader, old, new), fields(service = %new.id))]
    pub async fn validate_for_update<R>(reader: &R, old: &Service, new: &Service) -> Result<()>
    where
        R: AddressGroupPortMappingReader,
    {
        let _ = old;
        Self::validate_for_creation(reader, new).await
    }

    /// Safe-delete rule generalized to `Service`: refuse while any
    /// `AddressGroupBinding` or `ServiceAlias` still references it.
    #[instrument(skip(bindings, aliases))]
    pub async fn check_dependencies<B, A>(id: &ResourceIdentifier, bindings: &B, aliases: &A) -> Result<()>
    where
        B: AddressGroupBindingReader,
        A: ServiceAliasReader,
    {
        let mut dependents = Vec::new();
        bindings
            .list(&Scope::Empty, &mut |b| {
                if b.service_ref.resolve(&b.id.0.namespace) == *id {
                    dependents.push(b.id.0.clone());
                }
                Ok(())
            })
            .await?;
        aliases
            .list(&Scope::Empty, &mut |a| {
                if a.service_ref.resolve(&a.id.0.namespace) == *id {
                    dependents.push(a.id.0.clone());
                }
                Ok(())
            })
            .await?;

        if !dependents.is_empty() {
            return Err(Error::DependencyExists {
                kind: "Service",
                id: id.clone(),
                dependents,
            });
        }
        Ok(())
    }
}
