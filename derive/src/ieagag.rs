use crate::aggregate_ports::aggregate_by_transport;
use crate::name::deterministic_name;
use ahash::AHashSet as HashSet;
use netguard_pg_backend_core::{
    aggregated_address_groups, Action, IEAgAgRule, PortSpec, Result, ResourceIdentifier, RuleS2S,
    SelfRef, Service, ServiceRef, Traffic,
};
use netguard_pg_backend_store::{
    AddressGroupBindingReader, IEAgAgRuleReader, IEAgAgRuleWriter, Scope, ServiceAliasReader,
    ServiceReader, SyncOp,
};
use tracing::{debug, instrument};

async fn resolve_alias_target<A, S>(
    aliases: &A,
    services: &S,
    alias_ref_id: &ResourceIdentifier,
) -> Result<(ServiceRef, Service)>
where
    A: ServiceAliasReader,
    S: ServiceReader,
{
    let alias = aliases.get_by_id(alias_ref_id).await?;
    let service_id = alias.service_ref.resolve(&alias.id.0.namespace);
    let service = services.get_by_id(&service_id).await?;
    let service_ref = ServiceRef::new(service_id.name.clone(), service_id.namespace.clone());
    Ok((service_ref, service))
}

/// The full derivation for one `RuleS2S`, pure apart from the reads needed
/// to resolve aliases, services, and bindings. Returns an empty set (not an
/// error) when either address-group set or the port source is empty.
#[instrument(skip(aliases, services, bindings, rule), fields(rule = %rule.id))]
pub async fn derive_for_rule<A, S, B>(
    aliases: &A,
    services: &S,
    bindings: &B,
    rule: &RuleS2S,
) -> Result<Vec<IEAgAgRule>>
where
    A: ServiceAliasReader,
    S: ServiceReader,
    B: AddressGroupBindingReader,
{
    let local_id = rule.service_local_ref.resolve(&rule.id.0.namespace);
    let target_id = rule.service_ref.resolve(&rule.id.0.namespace);

    let (local_ref, local_service) = resolve_alias_target(aliases, services, &local_id).await?;
    let (target_ref, target_service) = resolve_alias_target(aliases, services, &target_id).await?;

    let all_bindings = bindings.list_all(&Scope::Empty).await?;

    let local_ags = aggregated_address_groups(
        &local_ref,
        &local_service.address_groups,
        all_bindings.clone(),
    );
    let target_ags =
        aggregated_address_groups(&target_ref, &target_service.address_groups, all_bindings);

    if local_ags.is_empty() || target_ags.is_empty() {
        debug!("empty address group set, no rules derived");
        return Ok(vec![]);
    }

    let port_source = match rule.traffic {
        Traffic::Ingress => &local_service.ingress_ports,
        Traffic::Egress => &target_service.ingress_ports,
    };
    let groups = aggregate_by_transport(port_source);
    if groups.is_empty() {
        debug!("no ports from port source, no rules derived");
        return Ok(vec![]);
    }

    let mut out = Vec::with_capacity(local_ags.len() * target_ags.len() * groups.len());
    for local_ag in &local_ags {
        for target_ag in &target_ags {
            for (transport, destination) in &groups {
                let name = deterministic_name(
                    rule.traffic,
                    &local_ag.address_group.name,
                    &target_ag.address_group.name,
                    *transport,
                );
                out.push(IEAgAgRule {
                    id: SelfRef::new(ResourceIdentifier::new(rule.id.0.namespace.clone(), name)),
                    transport: *transport,
                    traffic: rule.traffic,
                    address_group_local: local_ag.address_group.clone(),
                    address_group: target_ag.address_group.clone(),
                    ports: vec![PortSpec {
                        destination: destination.clone(),
                        source: String::new(),
                    }],
                    action: Action::Accept,
                    logs: true,
                    trace: rule.trace,
                    priority: IEAgAgRule::PRIORITY_DEFAULT,
                });
            }
        }
    }
    Ok(out)
}

/// Computes the union of `derive_for_rule` across every rule in `rules`,
/// deduplicating by name (two rules can legitimately aggregate into the
/// same `(traffic, localAG, targetAG, protocol)` group).
pub async fn derive_for_many<A, S, B>(
    aliases: &A,
    services: &S,
    bindings: &B,
    rules: &[RuleS2S],
) -> Result<Vec<IEAgAgRule>>
where
    A: ServiceAliasReader,
    S: ServiceReader,
    B: AddressGroupBindingReader,
{
    let mut by_name = ahash::AHashMap::new();
    for rule in rules {
        for derived in derive_for_rule(aliases, services, bindings, rule).await? {
            by_name.insert(derived.id.0.name.clone(), derived);
        }
    }
    Ok(by_name.into_values().collect())
}

/// Reads the currently stored `IEAgAgRule`s scoped to `namespace`, diffs
/// against `desired`, and issues one writer transaction that upserts the
/// desired set and deletes whatever is no longer desired. A no-op world
/// (nothing to upsert, nothing to delete) still performs the sync call —
/// reconciling to an unchanged result is idempotent, not skipped.
#[instrument(skip(current_reader, writer, desired))]
pub async fn reconcile<R, W>(
    current_reader: &R,
    writer: &mut W,
    namespace: &str,
    desired: Vec<IEAgAgRule>,
) -> Result<(usize, usize)>
where
    R: IEAgAgRuleReader,
    W: IEAgAgRuleWriter,
{
    let current = current_reader
        .list_all(&Scope::Namespace(namespace.to_string()))
        .await?;

    let desired_names: HashSet<String> = desired.iter().map(|r| r.id.0.name.clone()).collect();
    let to_delete: Vec<ResourceIdentifier> = current
        .iter()
        .filter(|r| !desired_names.contains(&r.id.0.name))
        .map(|r| r.id.0.clone())
        .collect();

    let upsert_count = desired.len();
    let delete_count = to_delete.len();
    let upsert_ids: Vec<ResourceIdentifier> = desired.iter().map(|r| r.id.0.clone()).collect();

    // Scoped to exactly the ids being written, not the whole namespace, so
    // this upsert never touches rows the diff didn't decide about.
    writer
        .sync(Scope::ResourceIdentifiers(upsert_ids), desired, SyncOp::Upsert)
        .await?;
    if !to_delete.is_empty() {
        writer.delete_by_ids(to_delete).await?;
    }

    debug!(upsert_count, delete_count, "reconciled IEAgAgRules");
    Ok((upsert_count, delete_count))
}
