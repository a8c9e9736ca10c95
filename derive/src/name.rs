use netguard_pg_backend_core::{Traffic, Transport};
use uuid::Uuid;

/// The deterministic name for an `IEAgAgRule`: a pure function of
/// `(traffic, localAG, targetAG, protocol)` after case normalization.
///
/// Uses UUIDv5 (name-based, SHA-1) over a fixed all-zero 16-byte namespace,
/// with the `traffic|local|target|protocol` pipe-joined string as the
/// domain separator, held fixed across calls. What matters for downstream
/// consumers is determinism and sensitivity to each input, not
/// bit-compatibility with any other naming scheme.
pub fn deterministic_name(traffic: Traffic, local_ag: &str, target_ag: &str, transport: Transport) -> String {
    let input = format!(
        "{}|{}|{}|{}",
        traffic.as_str().to_lowercase(),
        local_ag.to_lowercase(),
        target_ag.to_lowercase(),
        transport.as_str().to_lowercase(),
    );
    let uuid = Uuid::new_v5(&Uuid::nil(), input.as_bytes());
    format!("{}-{}", traffic.name_prefix(), uuid.hyphenated())
}
