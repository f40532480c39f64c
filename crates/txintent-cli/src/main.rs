// txintent CLI
// Evaluate parsed intents from a file or stdin, inspect the registries, and
// encode ERC-20 calls by hand.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use log::info;
use std::io::Read;
use std::path::{Path, PathBuf};
use txintent::engine::evm::{encode_erc20_approve, encode_erc20_transfer, Erc20Reader};
use txintent::engine::registry::{ActionRegistry, NetworkRegistry};
use txintent::{outcome_to_value, ActionEvaluator, EngineConfig, EngineError, EngineResult};

#[derive(Parser)]
#[command(name = "txintent", version, about = "Turn parsed intents into EVM transaction descriptors")]
struct Cli {
    /// Configuration file (TOML). Defaults to <config_dir>/txintent/config.toml
    #[arg(long, global = true, env = "TXINTENT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a JSON array of intents; prints one JSON outcome per line
    Evaluate {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Pretty-print each outcome
        #[arg(long)]
        pretty: bool,
    },
    /// List supported networks
    Chains,
    /// List the action registry
    Actions,
    /// Resolve a chain name to its network record
    ResolveChain { name: String },
    /// Encode an ERC-20 transfer/approve call
    Encode {
        /// Token contract address
        #[arg(long)]
        contract: String,
        #[arg(long, value_enum)]
        function: Erc20Function,
        /// Recipient (transfer) or spender (approve)
        #[arg(long)]
        to: String,
        /// Amount in base units
        #[arg(long)]
        amount: String,
    },
    /// Read name, symbol and decimals from an ERC-20 contract
    TokenInfo {
        /// Chain name, e.g. "ethereum"
        #[arg(long)]
        chain: String,
        /// Token contract address
        #[arg(long)]
        contract: String,
    },
    /// Print shell completions
    Completions { shell: clap_complete::Shell },
}

#[derive(Clone, Copy, ValueEnum)]
enum Erc20Function {
    Transfer,
    Approve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> EngineResult<()> {
    match cli.command {
        Commands::Evaluate { file, pretty } => {
            let config = EngineConfig::load(cli.config.as_deref())?;
            let text = read_input(file.as_deref())?;
            let evaluator = ActionEvaluator::from_config(&config)?;

            let outcomes = evaluator
                .evaluate_response(&text)
                .await
                .map_err(|e| EngineError::Other(e.to_string()))?;
            info!("[cli] Evaluated {} intents", outcomes.len());
            for outcome in &outcomes {
                let value = outcome_to_value(outcome);
                let line = if pretty { serde_json::to_string_pretty(&value)? } else { value.to_string() };
                println!("{}", line);
            }
        }
        Commands::Chains => {
            let config = EngineConfig::load(cli.config.as_deref())?;
            let networks = network_registry(&config)?;
            println!("{:<10} {:<12} {:<6} {}", "ID", "NAME", "SYMBOL", "DECIMALS");
            for n in networks.networks() {
                println!("{:<10} {:<12} {:<6} {}", n.id, n.name, n.symbol, n.decimals);
            }
        }
        Commands::Actions => {
            let config = EngineConfig::load(cli.config.as_deref())?;
            let actions = match &config.actions_path {
                Some(path) => ActionRegistry::from_file(path)?,
                None => ActionRegistry::builtin()?,
            };
            println!("Action registry v{}", actions.version());
            for spec in actions.supported_actions() {
                println!("  {:<10} {}", spec.action.as_str(), spec.description);
            }
        }
        Commands::ResolveChain { name } => {
            let config = EngineConfig::load(cli.config.as_deref())?;
            let networks = network_registry(&config)?;
            let network = networks
                .resolve_chain(&name)
                .ok_or_else(|| EngineError::Other(format!("Unsupported chain: {}", name)))?;
            println!("{}", serde_json::to_string_pretty(network)?);
        }
        Commands::Encode { contract, function, to, amount } => {
            let data = match function {
                Erc20Function::Transfer => encode_erc20_transfer(&contract, &to, &amount)?,
                Erc20Function::Approve => encode_erc20_approve(&contract, &to, &amount)?,
            };
            println!("{}", data);
        }
        Commands::TokenInfo { chain, contract } => {
            let config = EngineConfig::load(cli.config.as_deref())?;
            let networks = network_registry(&config)?;
            let network = networks
                .resolve_chain(&chain)
                .ok_or_else(|| EngineError::Other(format!("Unsupported chain: {}", chain)))?;
            let reader = Erc20Reader::for_network(network, config.rpc_api_key.as_deref());
            let token = reader.get_token_info(&contract).await?;
            println!("{}", serde_json::to_string_pretty(&token)?);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "txintent", &mut std::io::stdout());
        }
    }
    Ok(())
}

fn network_registry(config: &EngineConfig) -> EngineResult<NetworkRegistry> {
    match &config.networks_path {
        Some(path) => NetworkRegistry::from_file(path),
        None => NetworkRegistry::builtin(),
    }
}

fn read_input(file: Option<&Path>) -> EngineResult<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encode_arguments() {
        let cli = Cli::try_parse_from([
            "txintent",
            "encode",
            "--contract",
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            "--function",
            "approve",
            "--to",
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
            "--amount",
            "1000000",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Encode { function: Erc20Function::Approve, .. }));
    }

    #[test]
    fn parses_token_info_arguments() {
        let cli = Cli::try_parse_from([
            "txintent",
            "token-info",
            "--chain",
            "polygon",
            "--contract",
            "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359",
        ])
        .unwrap();
        match cli.command {
            Commands::TokenInfo { chain, contract } => {
                assert_eq!(chain, "polygon");
                assert!(contract.starts_with("0x3c49"));
            }
            _ => panic!("expected token-info"),
        }
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::try_parse_from(["txintent", "-vv", "chains"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Chains));
    }
}
