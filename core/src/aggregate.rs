use crate::binding::AddressGroupBinding;
use crate::refs::{AddressGroupRef, ServiceRef};
use crate::service::{AddressGroupSource, AggregatedAddressGroup};
use ahash::AHashMap as HashMap;

/// Computes `AggregatedAddressGroups = spec ∪ bindings` for a service: the
/// union of the service's spec-declared address groups and every
/// `AddressGroupBinding` targeting it, preferring `Source::Spec` when both
/// apply. Intentionally not cached or persisted — call this fresh inside
/// every transaction that needs the view.
pub fn aggregated_address_groups(
    service: &ServiceRef,
    spec_address_groups: &[AddressGroupRef],
    bindings: impl IntoIterator<Item = AddressGroupBinding>,
) -> Vec<AggregatedAddressGroup> {
    let mut by_key: HashMap<(String, String), AggregatedAddressGroup> = HashMap::default();

    for ag in spec_address_groups {
        by_key.insert(
            (ag.namespace.clone(), ag.name.clone()),
            AggregatedAddressGroup {
                address_group: ag.clone(),
                source: AddressGroupSource::Spec,
            },
        );
    }

    for binding in bindings {
        if binding.service_ref.namespace != service.namespace
            || binding.service_ref.name != service.name
        {
            continue;
        }
        let key = (
            binding.address_group_ref.namespace.clone(),
            binding.address_group_ref.name.clone(),
        );
        by_key.entry(key).or_insert(AggregatedAddressGroup {
            address_group: binding.address_group_ref,
            source: AddressGroupSource::Binding,
        });
    }

    let mut out: Vec<_> = by_key.into_values().collect();
    out.sort_by(|a, b| {
        (a.address_group.namespace.as_str(), a.address_group.name.as_str())
            .cmp(&(b.address_group.namespace.as_str(), b.address_group.name.as_str()))
    });
    out
}
