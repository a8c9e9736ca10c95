use netguard_pg_backend_core::{Error, NetworkBinding, Result, ResourceIdentifier};
use netguard_pg_backend_store::{
    AddressGroupReader, NetworkBindingReader, NetworkReader, Scope,
};
use tracing::instrument;

pub struct NetworkValidator;

impl NetworkValidator {
    /// Safe-delete rule generalized to `Network`: refuse while any
    /// `NetworkBinding` references it.
    #[instrument(skip(bindings))]
    pub async fn check_dependencies<B>(id: &ResourceIdentifier, bindings: &B) -> Result<()>
    where
        B: NetworkBindingReader,
    {
        let mut dependents = Vec::new();
        bindings
            .list(&Scope::Empty, &mut |b| {
                if b.network_ref.name == id.name {
                    dependents.push(b.id.0.clone());
                }
                Ok(())
            })
            .await?;

        if !dependents.is_empty() {
            return Err(Error::DependencyExists {
                kind: "Network",
                id: id.clone(),
                dependents,
            });
        }
        Ok(())
    }
}

pub struct NetworkBindingValidator;

impl NetworkBindingValidator {
    #[instrument(skip(networks, groups, binding), fields(binding = %binding.id))]
    pub async fn validate_references<N, G>(
        networks: &N,
        groups: &G,
        binding: &NetworkBinding,
    ) -> Result<()>
    where
        N: NetworkReader,
        G: AddressGroupReader,
    {
        let network_id = ResourceIdentifier::global(binding.network_ref.name.clone());
        networks
            .get_by_id(&network_id)
            .await
            .map_err(|_| Error::ReferenceInvalid {
                kind: "NetworkBinding",
                id: binding.id.0.clone(),
                ref_kind: "Network",
                ref_id: network_id,
                reason: "network does not exist".to_string(),
            })?;

        let ag_id = ResourceIdentifier::global(binding.address_group_ref.name.clone());
        groups
            .get_by_id(&ag_id)
            .await
            .map_err(|_| Error::ReferenceInvalid {
                kind: "NetworkBinding",
                id: binding.id.0.clone(),
                ref_kind: "AddressGroup",
                ref_id: ag_id,
                reason: "address group does not exist".to_string(),
            })?;

        Ok(())
    }
}
