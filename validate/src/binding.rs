use netguard_pg_backend_core::{AddressGroupBinding, Error, Result};
use netguard_pg_backend_store::{AddressGroupBindingReader, AddressGroupReader, Scope, ServiceReader};
use tracing::instrument;

pub struct AddressGroupBindingValidator;

impl AddressGroupBindingValidator {
    /// Lifetime tied to the existence of both referents.
    #[instrument(skip(services, groups, binding), fields(binding = %binding.id))]
    pub async fn validate_references<S, G>(
        services: &S,
        groups: &G,
        binding: &AddressGroupBinding,
    ) -> Result<()>
    where
        S: ServiceReader,
        G: AddressGroupReader,
    {
        let service_id = binding.service_ref.resolve(&binding.id.0.namespace);
        services.get_by_id(&service_id).await.map_err(|_| {
            Error::ReferenceInvalid {
                kind: "AddressGroupBinding",
                id: binding.id.0.clone(),
                ref_kind: "Service",
                ref_id: service_id.clone(),
                reason: "service does not exist".to_string(),
            }
        })?;

        let ag_id =
            netguard_pg_backend_core::ResourceIdentifier::global(binding.address_group_ref.name.clone());
        groups.get_by_id(&ag_id).await.map_err(|_| Error::ReferenceInvalid {
            kind: "AddressGroupBinding",
            id: binding.id.0.clone(),
            ref_kind: "AddressGroup",
            ref_id: ag_id.clone(),
            reason: "address group does not exist".to_string(),
        })?;

        Ok(())
    }

    /// Uniqueness: no duplicate `(ServiceRef, AddressGroupRef)` pair.
    #[instrument(skip(existing, binding), fields(binding = %binding.id))]
    pub async fn validate_no_duplicate<B>(existing: &B, binding: &AddressGroupBinding) -> Result<()>
    where
        B: AddressGroupBindingReader,
    {
        let mut conflict = None;
        existing
            .list(&Scope::Namespace(binding.id.0.namespace.clone()), &mut |b| {
                if b.id.0 != binding.id.0
                    && b.service_ref.name == binding.service_ref.name
                    && b.service_ref.namespace == binding.service_ref.namespace
                    && b.address_group_ref.name == binding.address_group_ref.name
                {
                    conflict = Some(b.id.0.clone());
                }
                Ok(())
            })
            .await?;

        if let Some(conflicting_id) = conflict {
            return Err(Error::DuplicateRule {
                kind: "AddressGroupBinding",
                id: binding.id.0.clone(),
                conflicting_id,
            });
        }
        Ok(())
    }
}
