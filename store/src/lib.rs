#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! The transactional resource store contract: typed scoped-list and
//! point-lookup reads over a read-snapshot, and single-use, per-kind
//! upsert/delete writes committed or aborted as one transaction.

mod kinds;
mod memory;
mod registry;
mod scope;
mod traits;

pub use kinds::{
    AddressGroupBindingReader, AddressGroupBindingWriter, AddressGroupPortMappingReader,
    AddressGroupPortMappingWriter, AddressGroupReader, AddressGroupWriter, FullReader, FullWriter,
    IEAgAgRuleReader, IEAgAgRuleWriter, NetworkBindingReader, NetworkBindingWriter, NetworkReader,
    NetworkWriter, RuleS2SReader, RuleS2SWriter, ServiceAliasReader, ServiceAliasWriter,
    ServiceReader, ServiceWriter,
};
pub use memory::{InMemoryReader, InMemoryRegistry, InMemoryWriter};
pub use registry::Registry;
pub use scope::{Scope, SyncOp};
pub use traits::Transaction;
