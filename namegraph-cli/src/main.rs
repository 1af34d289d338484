//! namegraph CLI
//!
//! Command-line front end for exploring and managing ENS names: prints
//! the reconstructed subdomain tree and issues ownership, resolver, and
//! record transactions through the connected provider.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use namegraph_core::traits::LabelDecryptor;
use namegraph_core::types::{Address, DomainNode, Hash256};
use namegraph_registry::{
    HttpTransport, RegistryClient, RegistryConfig, ReverseRegistrar, RpcConfig,
};
use namegraph_tree::{HttpPreimageClient, StaticLabelTable, TreeBuilder};

/// namegraph - explore and manage the ENS registry tree
#[derive(Parser)]
#[command(name = "namegraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ethereum RPC URL
    #[arg(long, global = true, env = "ETH_RPC_URL")]
    rpc_url: Option<String>,

    /// Label preimage service URL
    #[arg(long, global = true, env = "PREIMAGE_URL")]
    preimage_url: Option<String>,

    /// Signing account (defaults to the provider's first account)
    #[arg(long, global = true)]
    account: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct and print the full subdomain tree of a name
    Tree {
        /// Root name, e.g. example.eth
        name: String,
    },

    /// Show the root node of a name (no descent)
    Root {
        /// Name to inspect
        name: String,
    },

    /// Show the current owner of a name
    Owner {
        /// Name to inspect
        name: String,
    },

    /// Show the resolver contract of a name
    Resolver {
        /// Name to inspect
        name: String,
    },

    /// Show the address record of a name
    Addr {
        /// Name to inspect
        name: String,
    },

    /// Create a subdomain owned by the active account
    CreateSub {
        /// Subdomain label, e.g. vault
        label: String,
        /// Parent name, e.g. example.eth
        parent: String,
    },

    /// Delete a subdomain (multi-step relinquish sequence)
    DeleteSub {
        /// Subdomain label
        label: String,
        /// Parent name
        parent: String,
    },

    /// Set the address record of a name
    SetAddr {
        /// Name to update
        name: String,
        /// Address to store
        address: String,
    },

    /// Point a name at a resolver contract
    SetResolver {
        /// Name to update
        name: String,
        /// Resolver contract address
        resolver: String,
    },

    /// Reverse-record operations (address → name)
    Reverse {
        #[command(subcommand)]
        command: ReverseCommands,
    },
}

#[derive(Subcommand)]
enum ReverseCommands {
    /// Read the reverse record of an address
    Get {
        /// Address to look up
        address: String,
    },

    /// Claim the active account's reverse node with a resolver
    Claim {
        /// Resolver contract address
        resolver: String,
    },

    /// Set the name stored at the active account's reverse node
    SetName {
        /// Name to store, e.g. alice.eth
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "namegraph=debug,info"
    } else {
        "namegraph=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let registry = connect(&cli).await?;

    match &cli.command {
        Commands::Tree { name } => cmd_tree(&cli, registry, name).await,
        Commands::Root { name } => cmd_root(&cli, registry, name).await,
        Commands::Owner { name } => {
            let owner = registry.owner(name).await?;
            println!("{} {}", "owner:".cyan(), owner);
            Ok(())
        }
        Commands::Resolver { name } => {
            let resolver = registry.resolver(name).await?;
            if resolver.is_zero() {
                println!("{}", "no resolver set".yellow());
            } else {
                println!("{} {}", "resolver:".cyan(), resolver);
            }
            Ok(())
        }
        Commands::Addr { name } => {
            let addr = registry.addr(name).await?;
            println!("{} {}", "addr:".cyan(), addr);
            Ok(())
        }
        Commands::CreateSub { label, parent } => {
            let created = registry.create_subdomain(label, parent).await?;
            println!(
                "{} {}.{} owned by {}",
                "✅ created".green(),
                label,
                parent,
                created.owner
            );
            println!("   tx: {}", created.tx);
            Ok(())
        }
        Commands::DeleteSub { label, parent } => {
            let report = registry.delete_subdomain(label, parent).await?;
            println!("{} {}.{}", "✅ deleted".green(), label, parent);
            if let Some(tx) = report.reclaimed_ownership {
                println!("   reclaimed ownership: {tx}");
            }
            if let Some(tx) = report.cleared_resolver {
                println!("   cleared resolver:    {tx}");
            }
            if let Some(tx) = report.relinquished {
                println!("   relinquished:        {tx}");
            }
            Ok(())
        }
        Commands::SetAddr { name, address } => {
            let address = Address::from_hex(address)?;
            let tx = registry.set_addr(name, address).await?;
            println!("{} tx: {}", "✅ addr set".green(), tx);
            Ok(())
        }
        Commands::SetResolver { name, resolver } => {
            let resolver = Address::from_hex(resolver)?;
            let tx = registry.set_resolver(name, resolver).await?;
            println!("{} tx: {}", "✅ resolver set".green(), tx);
            Ok(())
        }
        Commands::Reverse { command } => cmd_reverse(registry, command).await,
    }
}

/// Builds the registry client from CLI options.
///
/// Only write commands need a signing account; reads work against
/// providers that expose none.
async fn connect(cli: &Cli) -> Result<RegistryClient> {
    let rpc_config = match &cli.rpc_url {
        Some(url) => RpcConfig::new(url),
        None => RpcConfig::default(),
    };
    let transport = Arc::new(HttpTransport::with_config(rpc_config));

    let client = match &cli.account {
        Some(account) => RegistryClient::with_account(
            transport,
            RegistryConfig::default(),
            Address::from_hex(account)?,
        ),
        None if needs_signer(&cli.command) => {
            RegistryClient::connect(transport, RegistryConfig::default()).await?
        }
        None => {
            RegistryClient::with_account(transport, RegistryConfig::default(), Address::zero())
        }
    };
    Ok(client)
}

/// True for commands that submit transactions.
fn needs_signer(command: &Commands) -> bool {
    matches!(
        command,
        Commands::CreateSub { .. }
            | Commands::DeleteSub { .. }
            | Commands::SetAddr { .. }
            | Commands::SetResolver { .. }
            | Commands::Reverse {
                command: ReverseCommands::Claim { .. } | ReverseCommands::SetName { .. },
            }
    )
}

/// Builds the preimage collaborator: the configured HTTP service, or an
/// empty table when none is available (every label stays encrypted).
fn decryptor(cli: &Cli) -> Arc<dyn LabelDecryptor> {
    match &cli.preimage_url {
        Some(url) => Arc::new(HttpPreimageClient::new(url.clone())),
        None => Arc::new(StaticLabelTable::new()),
    }
}

async fn cmd_tree(cli: &Cli, registry: RegistryClient, name: &str) -> Result<()> {
    let builder = TreeBuilder::new(registry, decryptor(cli));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(format!("walking event logs under {name}..."));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let tree = builder.build_tree(name).await;
    spinner.finish_and_clear();
    let tree = tree?;

    println!(
        "{} ({} names)",
        "domain tree".cyan().bold(),
        tree.size()
    );
    print_node(&tree, 0);
    Ok(())
}

async fn cmd_root(cli: &Cli, registry: RegistryClient, name: &str) -> Result<()> {
    let builder = TreeBuilder::new(registry, decryptor(cli));
    let root = builder.root_domain(name).await?;
    print_node(&root, 0);
    Ok(())
}

async fn cmd_reverse(registry: RegistryClient, command: &ReverseCommands) -> Result<()> {
    let registrar = ReverseRegistrar::mainnet(registry);

    match command {
        ReverseCommands::Get { address } => {
            let address = Address::from_hex(address)?;
            let record = registrar.get_name(&address).await?;
            println!("{} {}", "name:".cyan(), record.name);
            println!("{} {}", "resolver:".cyan(), record.resolver_addr);
        }
        ReverseCommands::Claim { resolver } => {
            let resolver = Address::from_hex(resolver)?;
            let tx = registrar.claim(resolver).await?;
            println!("{} tx: {}", "✅ reverse record claimed".green(), tx);
        }
        ReverseCommands::SetName { name } => {
            let tx = registrar.set_name(name).await?;
            println!("{} tx: {}", "✅ reverse name set".green(), tx);
        }
    }
    Ok(())
}

/// Prints one node and its subtree with indentation.
fn print_node(node: &DomainNode, depth: usize) {
    let indent = "  ".repeat(depth);

    let label = if node.decrypted {
        node.name.bold()
    } else {
        node.name.yellow()
    };

    let resolver = if node.has_resolver() {
        format!("resolver {}", short(&node.resolver))
    } else {
        "no resolver".dimmed().to_string()
    };

    println!(
        "{indent}{} {} {}",
        label,
        format!("owner {}", short(&node.owner)).dimmed(),
        resolver
    );

    if let Some(detail) = &node.detail {
        if !detail.addr.is_zero() {
            println!("{indent}  {} {}", "addr:".dimmed(), detail.addr);
        }
        if !detail.content.is_zero() {
            println!("{indent}  {} {}", "content:".dimmed(), short_hash(&detail.content));
        }
    }

    for child in &node.children {
        print_node(child, depth + 1);
    }
}

/// Shortens an address for display: 0x1234..abcd.
fn short(addr: &Address) -> String {
    let hex = addr.to_hex_string();
    format!("{}..{}", &hex[..6], &hex[hex.len() - 4..])
}

/// Shortens a hash for display.
fn short_hash(hash: &Hash256) -> String {
    let hex = hash.to_hex_string();
    format!("{}..{}", &hex[..6], &hex[hex.len() - 4..])
}
