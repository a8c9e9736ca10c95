use netguard_pg_backend_core::{Error, Result, RuleS2S};
use netguard_pg_backend_store::{RuleS2SReader, Scope, ServiceAliasReader};
use tracing::instrument;

pub struct RuleS2SValidator;

impl RuleS2SValidator {
    /// `RuleS2S.Create` checks: `serviceLocalRef` must be in the rule's own
    /// namespace, both alias targets must exist, and no duplicate
    /// `(Traffic, ServiceLocalRef, ServiceRef)` may exist.
    #[instrument(skip(aliases, existing, rule), fields(rule = %rule.id))]
    pub async fn validate_for_creation<A, E>(aliases: &A, existing: &E, rule: &RuleS2S) -> Result<()>
    where
        A: ServiceAliasReader,
        E: RuleS2SReader,
    {
        if !rule.service_local_ref.namespace.is_empty()
            && rule.service_local_ref.namespace != rule.id.0.namespace
        {
            return Err(Error::ReferenceInvalid {
                kind: "RuleS2S",
                id: rule.id.0.clone(),
                ref_kind: "ServiceAlias",
                ref_id: rule.service_local_ref.resolve(&rule.id.0.namespace),
                reason: "serviceLocalRef must be in the same namespace".to_string(),
            });
        }

        let local_id = rule.service_local_ref.resolve(&rule.id.0.namespace);
        aliases
            .get_by_id(&local_id)
            .await
            .map_err(|_| Error::ReferenceInvalid {
                kind: "RuleS2S",
                id: rule.id.0.clone(),
                ref_kind: "ServiceAlias",
                ref_id: local_id.clone(),
                reason: "serviceLocalRef does not exist".to_string(),
            })?;

        let target_id = rule.service_ref.resolve(&rule.id.0.namespace);
        aliases
            .get_by_id(&target_id)
            .await
            .map_err(|_| Error::ReferenceInvalid {
                kind: "RuleS2S",
                id: rule.id.0.clone(),
                ref_kind: "ServiceAlias",
                ref_id: target_id.clone(),
                reason: "serviceRef does not exist".to_string(),
            })?;

        let mut conflict = None;
        existing
            .list(&Scope::Namespace(rule.id.0.namespace.clone()), &mut |r| {
                if r.id.0 != rule.id.0
                    && r.traffic == rule.traffic
                    && r.service_local_ref == rule.service_local_ref
                    && r.service_ref == rule.service_ref
                {
                    conflict = Some(r.id.0.clone());
                }
                Ok(())
            })
            .await?;
        if let Some(conflicting_id) = conflict {
            return Err(Error::DuplicateRule {
                kind: "RuleS2S",
                id: rule.id.0.clone(),
                conflicting_id,
            });
        }

        Ok(())
    }

    /// `Traffic`, `ServiceLocalRef`, and `ServiceRef` are immutable after
    /// creation.
    #[instrument(skip(old, new), fields(rule = %new.id))]
    pub fn validate_for_update(old: &RuleS2S, new: &RuleS2S) -> Result<()> {
        if old.traffic != new.traffic {
            return Err(Error::Immutable {
                kind: "RuleS2S",
                id: new.id.0.clone(),
                field: "traffic",
            });
        }
        if old.service_local_ref != new.service_local_ref {
            return Err(Error::Immutable {
                kind: "RuleS2S",
                id: new.id.0.clone(),
                field: "serviceLocalRef",
            });
        }
        if old.service_ref != new.service_ref {
            return Err(Error::Immutable {
                kind: "RuleS2S",
                id: new.id.0.clone(),
                field: "serviceRef",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_pg_backend_core::{ResourceIdentifier, SelfRef, ServiceAliasRef, Traffic};

    fn rule() -> RuleS2S {
        RuleS2S {
            id: SelfRef::new(ResourceIdentifier::new("ns", "r1")),
            traffic: Traffic::Ingress,
            service_local_ref: ServiceAliasRef::new("web-alias", ""),
            service_ref: ServiceAliasRef::new("db-alias", ""),
            trace: false,
        }
    }

    #[test]
    fn immutable_traffic_rejected() {
        let old = rule();
        let mut new = rule();
        new.traffic = Traffic::Egress;
        let err = RuleS2SValidator::validate_for_update(&old, &new).unwrap_err();
        assert!(matches!(err, Error::Immutable { field: "traffic", .. }));
    }

    #[test]
    fn unrelated_field_changes_are_allowed() {
        let old = rule();
        let mut new = rule();
        new.trace = true;
        assert!(RuleS2SValidator::validate_for_update(&old, &new).is_ok());
    }
}
