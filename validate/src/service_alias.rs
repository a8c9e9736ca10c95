use netguard_pg_backend_core::{Error, Result, ResourceIdentifier, ServiceAlias};
use netguard_pg_backend_store::{RuleS2SReader, Scope, ServiceReader};
use tracing::instrument;

pub struct ServiceAliasValidator;

impl ServiceAliasValidator {
    #[instrument(skip(services, alias), fields(alias = %alias.id))]
    pub async fn validate_references<S>(services: &S, alias: &ServiceAlias) -> Result<()>
    where
        S: ServiceReader,
    {
        let service_id = alias.service_ref.resolve(&alias.id.0.namespace);
        services
            .get_by_id(&service_id)
            .await
            .map_err(|_| Error::ReferenceInvalid {
                kind: "ServiceAlias",
                id: alias.id.0.clone(),
                ref_kind: "Service",
                ref_id: service_id,
                reason: "service does not exist".to_string(),
            })?;
        Ok(())
    }

    /// Refuses deletion while any `RuleS2S` still references this alias as
    /// either endpoint.
    #[instrument(skip(rules, id))]
    pub async fn check_dependencies<RU>(id: &ResourceIdentifier, rules: &RU) -> Result<()>
    where
        RU: RuleS2SReader,
    {
        let mut dependents = Vec::new();
        rules
            .list(&Scope::Empty, &mut |r| {
                let local = r.service_local_ref.resolve(&r.id.0.namespace);
                let target = r.service_ref.resolve(&r.id.0.namespace);
                if &local == id || &target == id {
                    dependents.push(r.id.0.clone());
                }
                Ok(())
            })
            .await?;

        if !dependents.is_empty() {
            return Err(Error::DependencyExists {
                kind: "ServiceAlias",
                id: id.clone(),
                dependents,
            });
        }
        Ok(())
    }
}
