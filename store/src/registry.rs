use crate::kinds::{FullReader, FullWriter};
use async_trait::async_trait;
use netguard_pg_backend_core::Result;
use tokio_util::sync::CancellationToken;

/// The store handle every resource service and regenerator is built
/// against. `reader`/`writer` are scoped acquisitions: the returned
/// value's `Drop` releases whatever the backend needed to hold (a lock, a
/// connection, a snapshot) on every exit path, including early returns and
/// panicking unwinds, so callers never need an explicit release step.
#[async_trait]
pub trait Registry: Send + Sync {
    type Reader: FullReader;
    type Writer: FullWriter;

    async fn reader(&self, cancel: CancellationToken) -> Result<Self::Reader>;
    async fn writer(&self, cancel: CancellationToken) -> Result<Self::Writer>;
}
