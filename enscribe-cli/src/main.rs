//! enscribe CLI
//!
//! Command-line interface for ENS names, records, content hashes and resolver calls.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use enscribe_chash::ContentHash;
use enscribe_coin::{Address, Coin};
use enscribe_core::bytes::{parse_uint, phex_from_bytes};
use enscribe_record::{Profile, Record, SetterOptions};
use enscribe_tree::Node;

use config::{CliConfig, DEFAULT_ROOT_TAG};

/// enscribe - ENS record store toolkit
#[derive(Parser)]
#[command(name = "enscribe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Render records in human form (short content hash entries, pubkey x/y)
    #[arg(long, global = true, env = "ENSCRIBE_HUMAN")]
    human: bool,

    /// Tag of the root node label
    #[arg(long, global = true, env = "ENSCRIBE_ROOT_TAG", default_value = DEFAULT_ROOT_TAG)]
    root_tag: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash one or more names
    Namehash {
        /// Dotted names (normalized first)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Describe a coin, or parse an address for it
    Coin {
        /// Coin name, `chain:<id>`, or numeric coin type
        query: Option<String>,
        /// Address to parse with this coin
        #[arg(short, long)]
        address: Option<String>,
        /// List every bundled coin
        #[arg(long, conflicts_with = "query")]
        list: bool,
    },

    /// Decode a content hash from a URL, hash or hex envelope
    Chash {
        /// `ipfs://...`, `ar://...`, `data:...`, `0x...`, or a bare hash with --hint
        input: String,
        /// Construction hint (`ipfs`, `onion`, `text`, a MIME type, ...)
        #[arg(long)]
        hint: Option<String>,
    },

    /// Import a JSON tree and print it
    Tree {
        /// JSON file (`-` for stdin)
        file: PathBuf,
        /// Print the tree as JSON instead of an outline
        #[arg(long)]
        json: bool,
    },

    /// Encode getter calls for a name
    Getters {
        /// Dotted name
        name: String,
        /// Record keys to fetch (defaults to the common ENS profile)
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,
        /// Fetch the fields present in this record JSON instead
        #[arg(short, long, conflicts_with = "keys")]
        record: Option<PathBuf>,
    },

    /// Encode setter calls for a record
    Setters {
        /// Dotted name
        name: String,
        /// Desired record JSON (`-` for stdin)
        file: PathBuf,
        /// Current record JSON; only changed fields are emitted
        #[arg(long)]
        init: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig {
        human: cli.human,
        root_tag: cli.root_tag,
        verbose: cli.verbose,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Namehash { names } => cmd_namehash(&config, &names),
        Commands::Coin { query, address, list } => cmd_coin(query.as_deref(), address.as_deref(), list),
        Commands::Chash { input, hint } => cmd_chash(&input, hint.as_deref()),
        Commands::Tree { file, json } => cmd_tree(&config, &file, json),
        Commands::Getters { name, keys, record } => cmd_getters(&config, &name, &keys, record.as_deref()),
        Commands::Setters { name, file, init } => cmd_setters(&config, &name, &file, init.as_deref()),
    }
}

/// Reads JSON from a file, or stdin for `-`
fn read_json(path: &Path) -> Result<Value> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_calls(title: &str, calls: &[Vec<u8>]) {
    println!("{} {}", title.green().bold(), format!("({})", calls.len()).dimmed());
    for call in calls {
        println!("{}", phex_from_bytes(call));
    }
}

/// Resolves a node for `name` under a fresh root
fn node_for(config: &CliConfig, name: &str) -> Result<Node> {
    Node::new_root(Some(&config.root_tag))
        .create(name)
        .with_context(|| format!("Invalid name: {name}"))
}

fn coin_from_arg(query: &str) -> Result<Coin> {
    let coin = match parse_uint(query) {
        Ok(coin_type) => Coin::from_type(coin_type),
        Err(_) => Coin::from_name(query).with_context(|| format!("Unknown coin: {query}"))?,
    };
    Ok(coin)
}

/// Hash names
fn cmd_namehash(config: &CliConfig, names: &[String]) -> Result<()> {
    for name in names {
        let node = node_for(config, name)?;
        println!("{} {}", "Name:".cyan().bold(), node.name());
        println!("   {} {}", "Namehash:".dimmed(), phex_from_bytes(&node.namehash()));
        println!("   {} {}", "Labelhash:".dimmed(), phex_from_bytes(&node.labelhash()));
        println!("   {} {}", "DNS:".dimmed(), phex_from_bytes(&node.dns()?));
    }
    Ok(())
}

/// Describe coins and addresses
fn cmd_coin(query: Option<&str>, address: Option<&str>, list: bool) -> Result<()> {
    if list {
        let coins = Coin::all();
        println!("{} {}", "Coins:".cyan().bold(), coins.len());
        for coin in coins {
            println!("   {:>12}  {:<12} {}", coin.coin_type().to_string().dimmed(), coin.name(), coin.title());
        }
        return Ok(());
    }

    let Some(query) = query else {
        bail!("Expected a coin query or --list");
    };
    let coin = coin_from_arg(query)?;
    match address {
        Some(address) => {
            let address = Address::parse(coin, address).context("Failed to parse address")?;
            debug!(coin = %address.name(), "Parsed address");
            print_json(&address.to_object())
        }
        None => print_json(&coin.to_object()),
    }
}

/// Decode a content hash
fn cmd_chash(input: &str, hint: Option<&str>) -> Result<()> {
    let chash = ContentHash::from(&Value::String(input.into()), hint)
        .context("Failed to decode content hash")?;
    println!("{} {}", "Protocol:".cyan().bold(), chash.protocol().name());
    println!("   {} {}", "Envelope:".dimmed(), chash.to_phex());
    println!("   {} {}", "Gateway:".dimmed(), chash.to_gateway_url()?);
    print_json(&chash.to_object()?)
}

/// Import and print a tree
fn cmd_tree(config: &CliConfig, file: &Path, json: bool) -> Result<()> {
    let value = read_json(file)?;
    let root = Node::new_root(Some(&config.root_tag));
    root.import(&value).context("Failed to import tree")?;

    if json {
        return print_json(&root.to_json(config.human)?);
    }
    print!("{}", root.render());
    let mut records = 0;
    root.scan(|node, _| records += usize::from(node.has_record()));
    println!(
        "\n{} {} nodes, {} records",
        "Total:".green().bold(),
        root.node_count(),
        records
    );
    Ok(())
}

/// Encode getters
fn cmd_getters(config: &CliConfig, name: &str, keys: &[String], record: Option<&Path>) -> Result<()> {
    let profile = match (record, keys.is_empty()) {
        (Some(path), _) => {
            let mut profile = Profile::new();
            profile.import_json(&read_json(path)?).context("Invalid record keys")?;
            profile
        }
        (None, false) => Profile::from_keys(keys).context("Invalid record keys")?,
        (None, true) => Profile::ens(),
    };
    let node = node_for(config, name)?;
    let calls = profile.make_getters(&node.namehash())?;

    println!("{} {}", "Name:".cyan().bold(), node.name());
    println!("   {} {}", "Keys:".dimmed(), profile.keys().join(", "));
    print_calls("Getters", &calls);
    Ok(())
}

/// Encode setters
fn cmd_setters(config: &CliConfig, name: &str, file: &Path, init: Option<&Path>) -> Result<()> {
    let record = Record::from_json(&read_json(file)?).context("Invalid record")?;
    let init = init
        .map(|path| Record::from_json(&read_json(path)?).context("Invalid initial record"))
        .transpose()?;
    let node = node_for(config, name)?;

    let mut options = SetterOptions::new(node.namehash());
    if let Some(init) = &init {
        options = options.diff(init);
    }
    let calls = record.make_setters(&options)?;
    if calls.is_empty() {
        println!("{}", "No changes.".yellow());
        return Ok(());
    }

    println!("{} {}", "Name:".cyan().bold(), node.name());
    println!("   {} {}", "Record:".dimmed(), serde_json::to_string(&record.to_json(config.human)?)?);
    print_calls("Setters", &calls);
    Ok(())
}
