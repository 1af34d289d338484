//! Recursive domain tree reconstruction.
//!
//! One level is rebuilt from three independent asynchronous sources:
//! historical `NewOwner` logs, a batch preimage lookup, and per-node
//! current-state reads. The sources race freely inside a level; levels
//! themselves never pipeline, so every child sees a fully decorated
//! parent. A failed chain call aborts the whole walk — there are no
//! partial trees.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture};
use tracing::{debug, info, instrument};

use namegraph_core::error::Result;
use namegraph_core::namehash::{keccak256, labelhash, namehash, subnode};
use namegraph_core::traits::LabelDecryptor;
use namegraph_core::types::{Address, DomainNode, Hash256, LogFilter, SubdomainEvent};
use namegraph_core::{placeholder_label, EVENT_NEW_OWNER};
use namegraph_registry::RegistryClient;

/// Rebuilds the subdomain tree under a name.
///
/// Every build is a fresh snapshot; nothing is cached between calls and
/// returned nodes are never mutated afterwards.
pub struct TreeBuilder {
    registry: RegistryClient,
    decryptor: Arc<dyn LabelDecryptor>,
}

impl TreeBuilder {
    /// Creates a builder over a registry client and a preimage
    /// collaborator.
    pub fn new(registry: RegistryClient, decryptor: Arc<dyn LabelDecryptor>) -> Self {
        Self {
            registry,
            decryptor,
        }
    }

    /// Builds the root node for a name: owner and resolver fetched
    /// jointly, resolver detail attached when present. Does not recurse;
    /// [`TreeBuilder::build_tree`] drives the descent.
    #[instrument(skip(self))]
    pub async fn root_domain(&self, name: &str) -> Result<DomainNode> {
        let node = namehash(name);
        let (owner, resolver) = tokio::try_join!(
            self.registry.owner_of_node(node),
            self.registry.resolver_of_node(node)
        )?;

        let label = name.split('.').next().unwrap_or(name).to_string();
        let parent = name.splitn(2, '.').nth(1).unwrap_or("").to_string();

        let mut root = DomainNode {
            name: name.to_string(),
            label_hash: labelhash(&label),
            label,
            parent,
            owner,
            resolver,
            decrypted: true,
            detail: None,
            children: Vec::new(),
        };

        if root.has_resolver() {
            root.detail = Some(self.registry.resolver_detail_of(node, resolver).await?);
        }

        Ok(root)
    }

    /// Discovers the direct subdomains of a name: one fully decorated
    /// tree level, children ordered latest-created first.
    #[instrument(skip(self))]
    pub async fn subdomains(&self, name: &str) -> Result<Vec<DomainNode>> {
        self.subdomains_of(namehash(name), name).await
    }

    /// Builds the full tree under a name, eagerly, to full depth.
    ///
    /// Sibling subtrees expand concurrently; a level only starts once
    /// its parent level is completely assembled.
    #[instrument(skip(self))]
    pub async fn build_tree(&self, name: &str) -> Result<DomainNode> {
        let mut root = self.root_domain(name).await?;
        self.expand(&mut root, namehash(name)).await?;

        info!(name, nodes = root.size(), "tree built");
        Ok(root)
    }

    fn expand<'a>(&'a self, parent: &'a mut DomainNode, node: Hash256) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let name = parent.name.clone();
            parent.children = self.subdomains_of(node, &name).await?;

            let expansions = parent.children.iter_mut().map(|child| {
                // The child node id composes from hashes alone, so the
                // walk continues below undecrypted labels too.
                let child_node = subnode(&node, &child.label_hash);
                self.expand(child, child_node)
            });
            try_join_all(expansions).await?;

            Ok(())
        })
    }

    async fn subdomains_of(&self, node: Hash256, name: &str) -> Result<Vec<DomainNode>> {
        // Scan the registry's whole history for subnode creations under
        // this node.
        let filter = LogFilter {
            address: self.registry.config().registry,
            topics: vec![
                Some(keccak256(EVENT_NEW_OWNER.as_bytes())),
                Some(node),
            ],
            from_block: self.registry.config().deployed_block,
            to_block: None,
        };
        let raw_logs = self.registry.transport().get_logs(&filter).await?;

        let mut events = raw_logs
            .iter()
            .map(SubdomainEvent::from_log)
            .collect::<Result<Vec<_>>>()?;

        // Latest event wins: walk newest-first and keep the first
        // occurrence of each label. Ties inside one block keep provider
        // order. A label whose latest owner is zero was relinquished and
        // is dropped only after the dedup, so an old creation can never
        // resurrect it.
        events.reverse();
        let mut seen = HashSet::new();
        let events: Vec<SubdomainEvent> = events
            .into_iter()
            .filter(|event| seen.insert(event.label_hash))
            .filter(|event| !event.owner.is_zero())
            .collect();

        if events.is_empty() {
            debug!(name, "no live subdomains");
            return Ok(Vec::new());
        }

        // One batch to the preimage service for the whole level.
        let hashes: Vec<Hash256> = events.iter().map(|event| event.label_hash).collect();
        let labels = self.decryptor.decrypt_hashes(&hashes).await?;

        // Current owner and resolver for every decrypted label, two
        // concurrent batches awaited jointly and correlated by index.
        // The owner embedded in the log is stale by definition; it is
        // kept only for labels whose name cannot be queried at all.
        let owner_futures = events.iter().zip(labels.iter()).map(|(event, label)| {
            let child = subnode(&node, &event.label_hash);
            let log_owner = event.owner;
            let known = label.is_some();
            async move {
                if known {
                    self.registry.owner_of_node(child).await
                } else {
                    Ok(log_owner)
                }
            }
        });
        let resolver_futures = events.iter().zip(labels.iter()).map(|(event, label)| {
            let child = subnode(&node, &event.label_hash);
            let known = label.is_some();
            async move {
                if known {
                    self.registry.resolver_of_node(child).await
                } else {
                    Ok(Address::zero())
                }
            }
        });
        let (owners, resolvers) = tokio::try_join!(
            try_join_all(owner_futures),
            try_join_all(resolver_futures)
        )?;

        let mut nodes = Vec::with_capacity(events.len());
        for (index, event) in events.iter().enumerate() {
            let (label, owner, decrypted) = match &labels[index] {
                Some(label) => (label.clone(), owners[index], true),
                None => (placeholder_label(&event.label_hash), event.owner, false),
            };

            nodes.push(DomainNode {
                name: format!("{label}.{name}"),
                label,
                label_hash: event.label_hash,
                parent: name.to_string(),
                owner,
                resolver: resolvers[index],
                decrypted,
                detail: None,
                children: Vec::new(),
            });
        }

        // Resolver detail for every node that has one, concurrently.
        // A zero resolver is terminal: no fetch is issued for it.
        let details = try_join_all(nodes.iter().map(|child| {
            let child_node = subnode(&node, &child.label_hash);
            let resolver = child.resolver;
            async move {
                if resolver.is_zero() {
                    Ok(None)
                } else {
                    self.registry
                        .resolver_detail_of(child_node, resolver)
                        .await
                        .map(Some)
                }
            }
        }))
        .await?;

        for (child, detail) in nodes.iter_mut().zip(details) {
            child.detail = detail;
        }

        debug!(name, children = nodes.len(), "level assembled");
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use namegraph_core::error::NamegraphError;
    use namegraph_core::traits::ChainTransport;
    use namegraph_core::types::{RawLog, TxHash};
    use namegraph_core::{
        ENS_REGISTRY, SIG_ADDR, SIG_CONTENT, SIG_OWNER, SIG_RESOLVER,
    };
    use namegraph_registry::{abi, RegistryConfig};
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::preimage::StaticLabelTable;

    const ACCOUNT: Address = Address::new([0x11; 20]);
    const OWNER_A: Address = Address::new([0xA1; 20]);
    const OWNER_B: Address = Address::new([0xB2; 20]);
    const RESOLVER: Address = Address::new([0x33; 20]);

    /// Scripted provider: logs keyed by the filtered node, calls keyed
    /// by exact calldata. An unstubbed call fails, which doubles as
    /// proof that no fetch was issued for it.
    #[derive(Default)]
    struct MockChain {
        logs: Mutex<HashMap<Hash256, Vec<RawLog>>>,
        responses: Mutex<HashMap<(Address, Vec<u8>), Vec<u8>>>,
    }

    impl MockChain {
        fn add_new_owner(&self, node: Hash256, label_hash: Hash256, owner: Address, block: u64) {
            let mut data = vec![0u8; 32];
            data[12..].copy_from_slice(owner.as_bytes());
            self.logs.lock().unwrap().entry(node).or_default().push(RawLog {
                topics: vec![keccak256(EVENT_NEW_OWNER.as_bytes()), node, label_hash],
                data,
                block_number: block,
            });
        }

        fn stub_owner(&self, node: Hash256, owner: Address) {
            self.stub(
                ENS_REGISTRY,
                abi::call_data(SIG_OWNER, &[abi::hash_word(&node)]),
                abi::address_word(&owner).to_vec(),
            );
        }

        fn stub_resolver(&self, node: Hash256, resolver: Address) {
            self.stub(
                ENS_REGISTRY,
                abi::call_data(SIG_RESOLVER, &[abi::hash_word(&node)]),
                abi::address_word(&resolver).to_vec(),
            );
        }

        fn stub_detail(&self, node: Hash256, resolver: Address, addr: Address, content: Hash256) {
            self.stub(
                resolver,
                abi::call_data(SIG_ADDR, &[abi::hash_word(&node)]),
                abi::address_word(&addr).to_vec(),
            );
            self.stub(
                resolver,
                abi::call_data(SIG_CONTENT, &[abi::hash_word(&node)]),
                content.as_bytes().to_vec(),
            );
        }

        fn stub(&self, to: Address, data: Vec<u8>, output: Vec<u8>) {
            self.responses.lock().unwrap().insert((to, data), output);
        }
    }

    #[async_trait]
    impl ChainTransport for MockChain {
        async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
            self.responses
                .lock()
                .unwrap()
                .get(&(to, data))
                .cloned()
                .ok_or_else(|| NamegraphError::ChainCall {
                    method: "eth_call".into(),
                    reason: "no stubbed response".into(),
                })
        }

        async fn send_transaction(&self, _: Address, _: Address, _: Vec<u8>) -> Result<TxHash> {
            Ok(Hash256::zero())
        }

        async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>> {
            let node = filter.topics.get(1).copied().flatten().unwrap_or(Hash256::zero());
            Ok(self
                .logs
                .lock()
                .unwrap()
                .get(&node)
                .cloned()
                .unwrap_or_default())
        }

        async fn block_number(&self) -> Result<u64> {
            Ok(10_000_000)
        }

        async fn accounts(&self) -> Result<Vec<Address>> {
            Ok(vec![ACCOUNT])
        }
    }

    fn builder_with(chain: Arc<MockChain>, labels: &[&str]) -> TreeBuilder {
        let table = StaticLabelTable::new();
        table.insert_many(labels.iter().copied());
        let registry =
            RegistryClient::with_account(chain, RegistryConfig::default(), ACCOUNT);
        TreeBuilder::new(registry, Arc::new(table))
    }

    #[tokio::test]
    async fn test_empty_log_set_yields_childless_node() {
        let chain = Arc::new(MockChain::default());
        let builder = builder_with(chain, &[]);

        let children = builder.subdomains("example.eth").await.unwrap();
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn test_latest_event_wins_and_owner_is_fresh() {
        let chain = Arc::new(MockChain::default());
        let parent = namehash("example.eth");
        let wallet = labelhash("wallet");

        // Created by A, later reassigned to B; the current chain owner
        // is a third party entirely.
        chain.add_new_owner(parent, wallet, OWNER_A, 100);
        chain.add_new_owner(parent, wallet, OWNER_B, 200);

        let child = namehash("wallet.example.eth");
        let current = Address::new([0xC3; 20]);
        chain.stub_owner(child, current);
        chain.stub_resolver(child, Address::zero());

        let builder = builder_with(chain, &["wallet"]);
        let children = builder.subdomains("example.eth").await.unwrap();

        assert_eq!(children.len(), 1);
        let node = &children[0];
        assert_eq!(node.label, "wallet");
        assert_eq!(node.name, "wallet.example.eth");
        assert_eq!(node.parent, "example.eth");
        assert!(node.decrypted);
        // Not the log owner: ownership may have moved since the event
        assert_eq!(node.owner, current);
        assert!(node.detail.is_none());
    }

    #[tokio::test]
    async fn test_zero_owner_tail_excludes_label() {
        let chain = Arc::new(MockChain::default());
        let parent = namehash("example.eth");
        let doomed = labelhash("doomed");

        chain.add_new_owner(parent, doomed, OWNER_A, 100);
        chain.add_new_owner(parent, doomed, Address::zero(), 200);

        let builder = builder_with(chain, &["doomed"]);
        let children = builder.subdomains("example.eth").await.unwrap();

        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn test_recreation_after_deletion_survives() {
        let chain = Arc::new(MockChain::default());
        let parent = namehash("example.eth");
        let phoenix = labelhash("phoenix");

        chain.add_new_owner(parent, phoenix, OWNER_A, 100);
        chain.add_new_owner(parent, phoenix, Address::zero(), 200);
        chain.add_new_owner(parent, phoenix, OWNER_B, 300);

        let child = namehash("phoenix.example.eth");
        chain.stub_owner(child, OWNER_B);
        chain.stub_resolver(child, Address::zero());

        let builder = builder_with(chain, &["phoenix"]);
        let children = builder.subdomains("example.eth").await.unwrap();

        assert_eq!(children.len(), 1);
        assert_eq!(children[0].owner, OWNER_B);
    }

    #[tokio::test]
    async fn test_undecrypted_label_degrades_to_placeholder() {
        let chain = Arc::new(MockChain::default());
        let parent = namehash("example.eth");
        let secret = labelhash("secret");

        chain.add_new_owner(parent, secret, OWNER_B, 100);
        // No stubs: the mock fails any read, proving the builder never
        // queries a name it cannot spell.

        let builder = builder_with(chain, &[]);
        let children = builder.subdomains("example.eth").await.unwrap();

        assert_eq!(children.len(), 1);
        let node = &children[0];
        assert!(!node.decrypted);
        assert_eq!(node.label, format!("unknown{}", secret.tail_hex(6)));
        assert_eq!(node.owner, OWNER_B); // raw log value
        assert!(node.resolver.is_zero());
        assert!(node.detail.is_none());
    }

    #[tokio::test]
    async fn test_resolver_detail_attached_when_present() {
        let chain = Arc::new(MockChain::default());
        let parent = namehash("example.eth");
        let vault = labelhash("vault");

        chain.add_new_owner(parent, vault, OWNER_A, 100);

        let child = namehash("vault.example.eth");
        let record_addr = Address::new([0xD4; 20]);
        let content = Hash256::new([0xE5; 32]);
        chain.stub_owner(child, OWNER_A);
        chain.stub_resolver(child, RESOLVER);
        chain.stub_detail(child, RESOLVER, record_addr, content);

        let builder = builder_with(chain, &["vault"]);
        let children = builder.subdomains("example.eth").await.unwrap();

        let detail = children[0].detail.expect("resolver detail");
        assert_eq!(detail.addr, record_addr);
        assert_eq!(detail.content, content);
    }

    #[tokio::test]
    async fn test_children_ordered_latest_first() {
        let chain = Arc::new(MockChain::default());
        let parent = namehash("example.eth");

        chain.add_new_owner(parent, labelhash("older"), OWNER_A, 100);
        chain.add_new_owner(parent, labelhash("newer"), OWNER_B, 200);

        for label in ["older", "newer"] {
            let child = namehash(&format!("{label}.example.eth"));
            chain.stub_owner(child, OWNER_A);
            chain.stub_resolver(child, Address::zero());
        }

        let builder = builder_with(chain, &["older", "newer"]);
        let children = builder.subdomains("example.eth").await.unwrap();

        let labels: Vec<&str> = children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_root_domain_with_resolver_merges_detail() {
        let chain = Arc::new(MockChain::default());
        let node = namehash("example.eth");
        let record_addr = Address::new([0xD4; 20]);
        let content = Hash256::new([0xE5; 32]);

        chain.stub_owner(node, OWNER_A);
        chain.stub_resolver(node, RESOLVER);
        chain.stub_detail(node, RESOLVER, record_addr, content);

        let builder = builder_with(chain, &[]);
        let root = builder.root_domain("example.eth").await.unwrap();

        assert_eq!(root.name, "example.eth");
        assert_eq!(root.label, "example");
        assert_eq!(root.parent, "eth");
        assert_eq!(root.owner, OWNER_A);
        let detail = root.detail.expect("resolver detail");
        assert_eq!(detail.addr, record_addr);
        assert_eq!(detail.content, content);
        assert!(root.children.is_empty());
    }

    #[tokio::test]
    async fn test_root_domain_without_resolver_has_no_detail() {
        let chain = Arc::new(MockChain::default());
        let node = namehash("example.eth");

        chain.stub_owner(node, OWNER_A);
        chain.stub_resolver(node, Address::zero());

        let builder = builder_with(chain, &[]);
        let root = builder.root_domain("example.eth").await.unwrap();

        assert!(root.detail.is_none());
    }

    #[tokio::test]
    async fn test_build_tree_recurses_to_full_depth() {
        let chain = Arc::new(MockChain::default());
        let root_node = namehash("example.eth");
        let sub_node = namehash("sub.example.eth");
        let deep_node = namehash("deep.sub.example.eth");

        chain.stub_owner(root_node, OWNER_A);
        chain.stub_resolver(root_node, Address::zero());

        chain.add_new_owner(root_node, labelhash("sub"), OWNER_A, 100);
        chain.stub_owner(sub_node, OWNER_A);
        chain.stub_resolver(sub_node, Address::zero());

        chain.add_new_owner(sub_node, labelhash("deep"), OWNER_B, 200);
        chain.stub_owner(deep_node, OWNER_B);
        chain.stub_resolver(deep_node, Address::zero());

        let builder = builder_with(chain, &["sub", "deep"]);
        let tree = builder.build_tree("example.eth").await.unwrap();

        assert_eq!(tree.size(), 3);
        assert_eq!(tree.children.len(), 1);
        let sub = &tree.children[0];
        assert_eq!(sub.name, "sub.example.eth");
        assert_eq!(sub.children.len(), 1);
        let deep = &sub.children[0];
        assert_eq!(deep.name, "deep.sub.example.eth");
        assert_eq!(deep.owner, OWNER_B);
        assert!(deep.children.is_empty());
    }

    #[tokio::test]
    async fn test_discovery_continues_below_undecrypted_labels() {
        let chain = Arc::new(MockChain::default());
        let root_node = namehash("example.eth");

        chain.stub_owner(root_node, OWNER_A);
        chain.stub_resolver(root_node, Address::zero());

        // The middle label is never decrypted, but its node id still
        // composes from hashes, so its own children are discoverable.
        let hidden = labelhash("hidden");
        let hidden_node = subnode(&root_node, &hidden);
        chain.add_new_owner(root_node, hidden, OWNER_A, 100);

        let inner = labelhash("inner");
        let inner_node = subnode(&hidden_node, &inner);
        chain.add_new_owner(hidden_node, inner, OWNER_B, 200);
        chain.stub_owner(inner_node, OWNER_B);
        chain.stub_resolver(inner_node, Address::zero());

        let builder = builder_with(chain, &["inner"]);
        let tree = builder.build_tree("example.eth").await.unwrap();

        let placeholder = &tree.children[0];
        assert!(!placeholder.decrypted);
        assert_eq!(placeholder.children.len(), 1);
        assert_eq!(placeholder.children[0].label, "inner");
        assert_eq!(
            placeholder.children[0].parent,
            format!("unknown{}.example.eth", hidden.tail_hex(6))
        );
    }

    #[tokio::test]
    async fn test_deleted_on_chain_disappears_from_next_build() {
        let chain = Arc::new(MockChain::default());
        let parent = namehash("example.eth");
        let vault = labelhash("vault");

        chain.add_new_owner(parent, vault, OWNER_A, 100);
        let child = namehash("vault.example.eth");
        chain.stub_owner(child, OWNER_A);
        chain.stub_resolver(child, Address::zero());

        let builder = builder_with(chain.clone(), &["vault"]);
        assert_eq!(builder.subdomains("example.eth").await.unwrap().len(), 1);

        // The deletion sequence lands on chain as one more NewOwner
        // event assigning the zero address.
        chain.add_new_owner(parent, vault, Address::zero(), 200);
        assert!(builder.subdomains("example.eth").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chain_failure_aborts_whole_build() {
        let chain = Arc::new(MockChain::default());
        let parent = namehash("example.eth");

        chain.add_new_owner(parent, labelhash("wallet"), OWNER_A, 100);
        // Owner read for the decrypted child is left unstubbed.

        let builder = builder_with(chain, &["wallet"]);
        let result = builder.subdomains("example.eth").await;

        assert!(matches!(result, Err(NamegraphError::ChainCall { .. })));
    }
}
