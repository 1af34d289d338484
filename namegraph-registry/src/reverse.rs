//! Reverse-record management: the address → name direction.
//!
//! Every account owns a node `<hex-address>.addr.reverse` in the
//! registry. Claiming it and setting its name record is what makes an
//! address display as a human-readable name.

use tracing::{info, instrument};

use namegraph_core::error::{NamegraphError, Result};
use namegraph_core::namehash::namehash;
use namegraph_core::types::{Address, Hash256, ReverseRecord, TxHash};
use namegraph_core::{
    ADDR_REVERSE_SUFFIX, REVERSE_REGISTRAR, SIG_CLAIM_WITH_RESOLVER, SIG_NAME, SIG_SET_NAME,
};

use crate::abi;
use crate::client::RegistryClient;

/// Client for the reverse registrar contract.
pub struct ReverseRegistrar {
    registry: RegistryClient,
    registrar: Address,
}

impl ReverseRegistrar {
    /// Creates a reverse registrar client against a custom registrar
    /// deployment.
    pub fn new(registry: RegistryClient, registrar: Address) -> Self {
        Self {
            registry,
            registrar,
        }
    }

    /// Creates a client against the mainnet reverse registrar.
    pub fn mainnet(registry: RegistryClient) -> Self {
        Self::new(registry, REVERSE_REGISTRAR)
    }

    /// The reverse node id for an address:
    /// `namehash(hex(address).addr.reverse)`.
    pub fn reverse_node(address: &Address) -> Hash256 {
        namehash(&format!(
            "{}.{}",
            hex::encode(address.as_bytes()),
            ADDR_REVERSE_SUFFIX
        ))
    }

    /// Claims the active account's reverse node and points it at the
    /// given resolver.
    #[instrument(skip(self))]
    pub async fn claim(&self, resolver: Address) -> Result<TxHash> {
        let account = self.registry.account();
        let data = abi::call_data(
            SIG_CLAIM_WITH_RESOLVER,
            &[abi::address_word(&account), abi::address_word(&resolver)],
        );
        let tx = self
            .registry
            .transport()
            .send_transaction(account, self.registrar, data)
            .await?;
        info!(%account, %resolver, %tx, "reverse record claimed");
        Ok(tx)
    }

    /// Sets the name stored at the active account's reverse node.
    #[instrument(skip(self))]
    pub async fn set_name(&self, name: &str) -> Result<TxHash> {
        let account = self.registry.account();
        let data = abi::call_data_with_string(SIG_SET_NAME, name);
        let tx = self
            .registry
            .transport()
            .send_transaction(account, self.registrar, data)
            .await?;
        info!(%account, name, %tx, "reverse name set");
        Ok(tx)
    }

    /// Reads the reverse record of an address: its stored name and the
    /// resolver backing it.
    #[instrument(skip(self))]
    pub async fn get_name(&self, address: &Address) -> Result<ReverseRecord> {
        let node = Self::reverse_node(address);
        let resolver_addr = self.registry.resolver_of_node(node).await?;
        if resolver_addr.is_zero() {
            return Err(NamegraphError::NoResolver(address.to_hex_string()));
        }

        let data = abi::call_data(SIG_NAME, &[abi::hash_word(&node)]);
        let output = self.registry.transport().call(resolver_addr, data).await?;
        let name = abi::decode_string(&output)?;

        Ok(ReverseRecord {
            name,
            resolver_addr,
        })
    }
}
