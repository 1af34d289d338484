//! Typed client for the ENS registry and resolver contracts.
//!
//! Every operation is one independent asynchronous chain interaction
//! signed (where it writes) by the active account the provider supplied.
//! Reads return current chain state; writes return pending transaction
//! hashes without waiting for confirmation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use namegraph_core::error::{NamegraphError, Result};
use namegraph_core::namehash::{labelhash, namehash};
use namegraph_core::traits::ChainTransport;
use namegraph_core::types::{
    Address, CreatedSubdomain, DeleteReport, DeleteStep, Hash256, ResolverDetail, TxHash,
};
use namegraph_core::{
    ENS_DEPLOYED_BLOCK, ENS_REGISTRY, SIG_ADDR, SIG_CONTENT, SIG_OWNER, SIG_RESOLVER,
    SIG_SET_ADDR, SIG_SET_CONTENT, SIG_SET_OWNER, SIG_SET_RESOLVER, SIG_SET_SUBNODE_OWNER,
};

use crate::abi;

/// Registry client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Address of the registry contract.
    pub registry: Address,
    /// Block the registry was deployed at; historical scans start here.
    pub deployed_block: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry: ENS_REGISTRY,
            deployed_block: ENS_DEPLOYED_BLOCK,
        }
    }
}

impl RegistryConfig {
    /// Configuration for a custom registry deployment.
    pub fn new(registry: Address, deployed_block: u64) -> Self {
        Self {
            registry,
            deployed_block,
        }
    }
}

/// Client for registry reads and writes.
///
/// Cheap to clone; the transport is shared.
#[derive(Clone)]
pub struct RegistryClient {
    transport: Arc<dyn ChainTransport>,
    config: RegistryConfig,
    account: Address,
}

impl RegistryClient {
    /// Connects to the registry, taking the active signing account from
    /// the provider.
    pub async fn connect(transport: Arc<dyn ChainTransport>, config: RegistryConfig) -> Result<Self> {
        let accounts = transport.accounts().await?;
        let account = accounts.first().copied().ok_or(NamegraphError::NoAccount)?;

        info!(%account, registry = %config.registry, "connected to registry");
        Ok(Self {
            transport,
            config,
            account,
        })
    }

    /// Creates a client with an explicitly chosen signing account.
    pub fn with_account(
        transport: Arc<dyn ChainTransport>,
        config: RegistryConfig,
        account: Address,
    ) -> Self {
        Self {
            transport,
            config,
            account,
        }
    }

    /// The active signing account.
    pub fn account(&self) -> Address {
        self.account
    }

    /// The registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<dyn ChainTransport> {
        &self.transport
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Current owner of a name.
    #[instrument(skip(self))]
    pub async fn owner(&self, name: &str) -> Result<Address> {
        self.owner_of_node(namehash(name)).await
    }

    /// Current owner of a node id.
    pub async fn owner_of_node(&self, node: Hash256) -> Result<Address> {
        let data = abi::call_data(SIG_OWNER, &[abi::hash_word(&node)]);
        let output = self.transport.call(self.config.registry, data).await?;
        abi::decode_address(&output)
    }

    /// Resolver contract for a name; zero when none is set.
    #[instrument(skip(self))]
    pub async fn resolver(&self, name: &str) -> Result<Address> {
        self.resolver_of_node(namehash(name)).await
    }

    /// Resolver contract for a node id; zero when none is set.
    pub async fn resolver_of_node(&self, node: Hash256) -> Result<Address> {
        let data = abi::call_data(SIG_RESOLVER, &[abi::hash_word(&node)]);
        let output = self.transport.call(self.config.registry, data).await?;
        abi::decode_address(&output)
    }

    /// Address record of a name, read through its resolver.
    ///
    /// Fails with [`NamegraphError::NoResolver`] when the name has no
    /// resolver set.
    #[instrument(skip(self))]
    pub async fn addr(&self, name: &str) -> Result<Address> {
        let node = namehash(name);
        let resolver = self.require_resolver(name, node).await?;
        let data = abi::call_data(SIG_ADDR, &[abi::hash_word(&node)]);
        let output = self.transport.call(resolver, data).await?;
        abi::decode_address(&output)
    }

    /// Content hash record of a name, read through its resolver.
    #[instrument(skip(self))]
    pub async fn content(&self, name: &str) -> Result<Hash256> {
        let node = namehash(name);
        let resolver = self.require_resolver(name, node).await?;
        let data = abi::call_data(SIG_CONTENT, &[abi::hash_word(&node)]);
        let output = self.transport.call(resolver, data).await?;
        abi::decode_hash(&output)
    }

    /// Address and content records of a node through a known resolver,
    /// fetched concurrently and awaited jointly.
    pub async fn resolver_detail_of(
        &self,
        node: Hash256,
        resolver: Address,
    ) -> Result<ResolverDetail> {
        if resolver.is_zero() {
            return Err(NamegraphError::NoResolver(node.to_hex_string()));
        }

        let addr_data = abi::call_data(SIG_ADDR, &[abi::hash_word(&node)]);
        let content_data = abi::call_data(SIG_CONTENT, &[abi::hash_word(&node)]);

        let (addr_out, content_out) = tokio::try_join!(
            self.transport.call(resolver, addr_data),
            self.transport.call(resolver, content_data)
        )?;

        Ok(ResolverDetail {
            addr: abi::decode_address(&addr_out)?,
            content: abi::decode_hash(&content_out)?,
        })
    }

    /// Owner of `label.parent`.
    #[instrument(skip(self))]
    pub async fn check_subdomain(&self, label: &str, parent: &str) -> Result<Address> {
        validate_label(label)?;
        self.owner(&format!("{label}.{parent}")).await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WRITES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Sets the address record of a name through its resolver.
    #[instrument(skip(self))]
    pub async fn set_addr(&self, name: &str, address: Address) -> Result<TxHash> {
        let node = namehash(name);
        let resolver = self.require_resolver(name, node).await?;
        let data = abi::call_data(
            SIG_SET_ADDR,
            &[abi::hash_word(&node), abi::address_word(&address)],
        );
        self.transport.send_transaction(self.account, resolver, data).await
    }

    /// Sets the content hash record of a name through its resolver.
    #[instrument(skip(self))]
    pub async fn set_content(&self, name: &str, content: Hash256) -> Result<TxHash> {
        let node = namehash(name);
        let resolver = self.require_resolver(name, node).await?;
        let data = abi::call_data(
            SIG_SET_CONTENT,
            &[abi::hash_word(&node), abi::hash_word(&content)],
        );
        self.transport.send_transaction(self.account, resolver, data).await
    }

    /// Points a name at a resolver contract (zero clears it).
    #[instrument(skip(self))]
    pub async fn set_resolver(&self, name: &str, resolver: Address) -> Result<TxHash> {
        let data = abi::call_data(
            SIG_SET_RESOLVER,
            &[abi::hash_word(&namehash(name)), abi::address_word(&resolver)],
        );
        self.transport
            .send_transaction(self.account, self.config.registry, data)
            .await
    }

    /// Transfers ownership of a name.
    #[instrument(skip(self))]
    pub async fn set_owner(&self, name: &str, new_owner: Address) -> Result<TxHash> {
        let data = abi::call_data(
            SIG_SET_OWNER,
            &[abi::hash_word(&namehash(name)), abi::address_word(&new_owner)],
        );
        self.transport
            .send_transaction(self.account, self.config.registry, data)
            .await
    }

    /// Creates or reassigns the subnode `label.parent`.
    ///
    /// A zero `new_owner` is the deletion idiom.
    #[instrument(skip(self))]
    pub async fn set_subnode_owner(
        &self,
        label: &str,
        parent: &str,
        new_owner: Address,
    ) -> Result<TxHash> {
        validate_label(label)?;
        let data = abi::call_data(
            SIG_SET_SUBNODE_OWNER,
            &[
                abi::hash_word(&namehash(parent)),
                abi::hash_word(&labelhash(label)),
                abi::address_word(&new_owner),
            ],
        );
        self.transport
            .send_transaction(self.account, self.config.registry, data)
            .await
    }

    /// Creates `label.parent` owned by the active account.
    #[instrument(skip(self))]
    pub async fn create_subdomain(&self, label: &str, parent: &str) -> Result<CreatedSubdomain> {
        let tx = self.set_subnode_owner(label, parent, self.account).await?;
        info!(label, parent, %tx, "subdomain created");
        Ok(CreatedSubdomain {
            tx,
            owner: self.account,
        })
    }

    /// Deletes `label.parent` via the multi-step relinquish sequence.
    ///
    /// When the subnode has a resolver, ownership is first reclaimed by
    /// the active account (authorizing the change), the resolver is
    /// cleared, and only then is the subnode owner set to zero — a
    /// resolver must never outlive its node's ownership.
    ///
    /// The sequence is not transactional. On a mid-sequence failure the
    /// partial [`DeleteReport`] travels inside
    /// [`NamegraphError::DeleteInterrupted`]; calling again re-reads
    /// chain state and performs only the steps still outstanding.
    #[instrument(skip(self))]
    pub async fn delete_subdomain(&self, label: &str, parent: &str) -> Result<DeleteReport> {
        validate_label(label)?;
        let name = format!("{label}.{parent}");
        let mut report = DeleteReport::default();

        let resolver = self.resolver(&name).await?;
        if !resolver.is_zero() {
            let current_owner = self.owner(&name).await?;
            if current_owner != self.account {
                match self.set_subnode_owner(label, parent, self.account).await {
                    Ok(tx) => report.reclaimed_ownership = Some(tx),
                    Err(e) => {
                        return Err(interrupted(&name, DeleteStep::ReclaimOwnership, report, e))
                    }
                }
            } else {
                debug!(name, "already controller, skipping ownership reclaim");
            }

            match self.set_resolver(&name, Address::zero()).await {
                Ok(tx) => report.cleared_resolver = Some(tx),
                Err(e) => return Err(interrupted(&name, DeleteStep::ClearResolver, report, e)),
            }
        }

        match self.set_subnode_owner(label, parent, Address::zero()).await {
            Ok(tx) => report.relinquished = Some(tx),
            Err(e) => return Err(interrupted(&name, DeleteStep::Relinquish, report, e)),
        }

        info!(name, steps = report.completed_steps().len(), "subdomain deleted");
        Ok(report)
    }

    /// Resolver for `name`, or `NoResolver` when unset.
    async fn require_resolver(&self, name: &str, node: Hash256) -> Result<Address> {
        let resolver = self.resolver_of_node(node).await?;
        if resolver.is_zero() {
            return Err(NamegraphError::NoResolver(name.to_string()));
        }
        Ok(resolver)
    }
}

fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(NamegraphError::Validation("label cannot be empty".into()));
    }
    if label.contains('.') {
        return Err(NamegraphError::Validation(format!(
            "label '{label}' must not contain dots"
        )));
    }
    Ok(())
}

fn interrupted(
    name: &str,
    step: DeleteStep,
    report: DeleteReport,
    source: NamegraphError,
) -> NamegraphError {
    NamegraphError::DeleteInterrupted {
        name: name.to_string(),
        step,
        report,
        reason: source.to_string(),
    }
}
