use ahash::AHashMap as HashMap;
use netguard_pg_backend_core::{IngressPort, Transport};

/// Groups ports by the transport they produce a rule for (protocols with
/// no `Transport` mapping — ICMP — are ignored), collects the distinct port
/// strings per group, sorts them ascending as strings (not numerically —
/// downstream consumers rely on the string ordering), and joins with `,`.
///
/// Returns one `(Transport, joined_destination)` entry per transport
/// present among `ports`.
pub fn aggregate_by_transport(ports: &[IngressPort]) -> Vec<(Transport, String)> {
    let mut by_transport: HashMap<Transport, Vec<String>> = HashMap::default();
    for p in ports {
        let Some(transport) = Transport::from_service_protocol(p.protocol) else {
            continue;
        };
        let entry = by_transport.entry(transport).or_default();
        if !entry.contains(&p.port) {
            entry.push(p.port.clone());
        }
    }

    let mut out: Vec<_> = by_transport.into_iter().collect();
    for (_, ports) in out.iter_mut() {
        ports.sort();
    }
    out.sort_by_key(|(t, _)| *t);
    out.into_iter()
        .map(|(t, ports)| (t, ports.join(",")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_pg_backend_core::Protocol;

    #[test]
    fn groups_by_protocol_and_sorts_lexicographically() {
        let ports = vec![
            IngressPort::new(Protocol::Tcp, "80"),
            IngressPort::new(Protocol::Tcp, "443"),
            IngressPort::new(Protocol::Tcp, "8080"),
        ];
        let groups = aggregate_by_transport(&ports);
        assert_eq!(groups.len(), 1);
        // String-sorted, not numeric: "443" < "80" < "8080" — preserved deliberately.
        assert_eq!(groups[0].1, "443,80,8080");
    }

    #[test]
    fn distinct_protocols_produce_distinct_groups() {
        let ports = vec![
            IngressPort::new(Protocol::Tcp, "80"),
            IngressPort::new(Protocol::Udp, "53"),
        ];
        let groups = aggregate_by_transport(&ports);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn icmp_is_ignored() {
        let ports = vec![IngressPort::new(Protocol::Icmp, "0")];
        assert!(aggregate_by_transport(&ports).is_empty());
    }

    #[test]
    fn duplicate_ports_are_deduplicated() {
        let ports = vec![
            IngressPort::new(Protocol::Tcp, "80"),
            IngressPort::new(Protocol::Tcp, "80"),
        ];
        let groups = aggregate_by_transport(&ports);
        assert_eq!(groups[0].1, "80");
    }
}
