use crate::scope::{Scope, SyncOp};
use crate::traits::{kind_store, Transaction};
use async_trait::async_trait;
use netguard_pg_backend_core::{
    AddressGroup, AddressGroupBinding, AddressGroupPortMapping, IEAgAgRule, Network,
    NetworkBinding, ResourceIdentifier, Result, RuleS2S, Service, ServiceAlias,
};

kind_store!(ServiceReader, ServiceWriter, Service, "Service");
kind_store!(AddressGroupReader, AddressGroupWriter, AddressGroup, "AddressGroup");
kind_store!(
    AddressGroupBindingReader,
    AddressGroupBindingWriter,
    AddressGroupBinding,
    "AddressGroupBinding"
);
kind_store!(ServiceAliasReader, ServiceAliasWriter, ServiceAlias, "ServiceAlias");
kind_store!(RuleS2SReader, RuleS2SWriter, RuleS2S, "RuleS2S");
kind_store!(NetworkReader, NetworkWriter, Network, "Network");
kind_store!(
    NetworkBindingReader,
    NetworkBindingWriter,
    NetworkBinding,
    "NetworkBinding"
);
kind_store!(
    AddressGroupPortMappingReader,
    AddressGroupPortMappingWriter,
    AddressGroupPortMapping,
    "AddressGroupPortMapping"
);
kind_store!(IEAgAgRuleReader, IEAgAgRuleWriter, IEAgAgRule, "IEAgAgRule");

/// Every reader capability together — what `Registry::Reader` must provide.
pub trait FullReader:
    ServiceReader
    + AddressGroupReader
    + AddressGroupBindingReader
    + ServiceAliasReader
    + RuleS2SReader
    + NetworkReader
    + NetworkBindingReader
    + AddressGroupPortMappingReader
    + IEAgAgRuleReader
{
}

impl<T> FullReader for T where
    T: ServiceReader
        + AddressGroupReader
        + AddressGroupBindingReader
        + ServiceAliasReader
        + RuleS2SReader
        + NetworkReader
        + NetworkBindingReader
        + AddressGroupPortMappingReader
        + IEAgAgRuleReader
{
}

/// Every writer capability together — what `Registry::Writer` must provide.
pub trait FullWriter:
    ServiceWriter
    + AddressGroupWriter
    + AddressGroupBindingWriter
    + ServiceAliasWriter
    + RuleS2SWriter
    + NetworkWriter
    + NetworkBindingWriter
    + AddressGroupPortMappingWriter
    + IEAgAgRuleWriter
{
}

impl<T> FullWriter for T where
    T: ServiceWriter
        + AddressGroupWriter
        + AddressGroupBindingWriter
        + ServiceAliasWriter
        + RuleS2SWriter
        + NetworkWriter
        + NetworkBindingWriter
        + AddressGroupPortMappingWriter
        + IEAgAgRuleWriter
{
}
