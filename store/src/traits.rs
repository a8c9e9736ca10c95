use async_trait::async_trait;
use netguard_pg_backend_core::Result;

/// Consumed on `commit`/`abort` so a writer cannot be reused afterwards —
/// enforced by the type system rather than a runtime flag.
#[async_trait]
pub trait Transaction: Send {
    async fn commit(self: Box<Self>) -> Result<()>;
    async fn abort(self: Box<Self>);
}

/// Declares a `{Kind}Reader`/`{Kind}Writer` trait pair for one resource
/// kind: a scoped-list operation taking a consumer callback that may stop
/// iteration early by returning an error, a point lookup, and per-kind
/// sync/delete on the writer side.
macro_rules! kind_store {
    ($reader:ident, $writer:ident, $ty:ty, $kind:literal) => {
        #[async_trait]
        pub trait $reader: Send + Sync {
            const KIND: &'static str = $kind;

            async fn get_by_id(&self, id: &ResourceIdentifier) -> Result<$ty>;

            /// Invokes `consume` for each row in `scope`, in unspecified
            /// order. `consume` returning `Err` stops iteration and that
            /// error is propagated.
            async fn list(
                &self,
                scope: &Scope,
                consume: &mut (dyn FnMut($ty) -> Result<()> + Send),
            ) -> Result<()>;

            /// Convenience built on `list`: collects every row in `scope`.
            async fn list_all(&self, scope: &Scope) -> Result<Vec<$ty>> {
                let mut out = Vec::new();
                self.list(scope, &mut |item| {
                    out.push(item);
                    Ok(())
                })
                .await?;
                Ok(out)
            }
        }

        #[async_trait]
        pub trait $writer: Transaction {
            /// Rewrites (`Upsert`) or removes (`Delete`) exactly the rows
            /// in `scope` to/from `items`.
            async fn sync(&mut self, scope: Scope, items: Vec<$ty>, op: SyncOp) -> Result<()>;

            async fn delete_by_ids(&mut self, ids: Vec<ResourceIdentifier>) -> Result<()>;
        }
    };
}

pub(crate) use kind_store;
