use netguard_pg_backend_core::{AddressGroup, Error, Result, ResourceIdentifier};
use netguard_pg_backend_store::{AddressGroupBindingReader, NetworkBindingReader, Scope};
use tracing::instrument;

pub struct AddressGroupValidator;

impl AddressGroupValidator {
    pub fn validate_no_duplicate_addresses(ag: &AddressGroup) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for addr in &ag.addresses {
            if !seen.insert(addr.to_string()) {
                return Err(Error::Invalid {
                    kind: "AddressGroup",
                    id: ag.id.0.clone(),
                    reason: format!("duplicate address {addr}"),
                });
            }
        }
        Ok(())
    }

    /// Safe-delete rule generalized to `AddressGroup`: refuse while any
    /// binding still references it.
    #[instrument(skip(bindings, network_bindings))]
    pub async fn check_dependencies<B, N>(
        id: &ResourceIdentifier,
        bindings: &B,
        network_bindings: &N,
    ) -> Result<()>
    where
        B: AddressGroupBindingReader,
        N: NetworkBindingReader,
    {
        let mut dependents = Vec::new();
        bindings
            .list(&Scope::Empty, &mut |b| {
                if b.address_group_ref.name == id.name {
                    dependents.push(b.id.0.clone());
                }
                Ok(())
            })
            .await?;
        network_bindings
            .list(&Scope::Empty, &mut |b| {
                if b.address_group_ref.name == id.name {
                    dependents.push(b.id.0.clone());
                }
                Ok(())
            })
            .await?;

        if !dependents.is_empty() {
            return Err(Error::DependencyExists {
                kind: "AddressGroup",
                id: id.clone(),
                dependents,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_pg_backend_core::{DefaultAction, SelfRef};

    fn ag(addrs: Vec<&str>) -> AddressGroup {
        AddressGroup {
            id: SelfRef::new(ResourceIdentifier::global("web-ag")),
            addresses: addrs.into_iter().map(|a| a.parse().unwrap()).collect(),
            default_action: DefaultAction::Accept,
            logs: false,
            trace: false,
        }
    }

    #[test]
    fn duplicate_addresses_rejected() {
        let group = ag(vec!["10.0.0.0/24", "10.0.0.0/24"]);
        assert!(AddressGroupValidator::validate_no_duplicate_addresses(&group).is_err());
    }

    #[test]
    fn distinct_addresses_accepted() {
        let group = ag(vec!["10.0.0.0/24", "10.0.1.0/24"]);
        assert!(AddressGroupValidator::validate_no_duplicate_addresses(&group).is_ok());
    }
}
