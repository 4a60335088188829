use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::json;
use std::str::FromStr;

use dexplatform_sdk::{DexClient, OperationOutcome, PairKey, SimChain, TokenDirectory};

/// Default dev account — override with --account or DEXPLATFORM_ACCOUNT.
const DEFAULT_ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Resolve a symbol (WETH, DAI, …) or a raw 0x hex address.
fn resolve_token(directory: &TokenDirectory, input: &str) -> Result<Address> {
    if let Some(token) = directory.find_by_name(input) {
        return Ok(token.address);
    }
    Address::from_str(input).map_err(|_| {
        anyhow!(
            "Unknown token '{}'. Use a built-in symbol ({}) or a 0x hex address.",
            input,
            directory
                .tokens()
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

// ─── Version banner ───────────────────────────────────────────────────────────

/// Print the DEX Platform banner to stdout.
fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  DEX Platform  v{ver}  ·  AMM pool registry client");
    println!("  {}", "─".repeat(62));
    println!("  Amounts   18-decimal fixed point (decimal strings on the CLI)");
    println!("  Backend   simulated chain, persisted to the --state-file JSON");
    println!("  Docs      https://github.com/dexplatform/dexplatform-client");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// DEX Platform — discover pools, provide liquidity, and swap tokens.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   DEXPLATFORM_STATE    — path of the simulated chain state file
///   DEXPLATFORM_ACCOUNT  — account address to act as
#[derive(Parser)]
#[command(
    name    = "dexplatform",
    version = env!("CARGO_PKG_VERSION"),
    author  = "DEX Platform",
    about   = "AMM pool registry and transaction coordination client.",
    after_help = "\
ENVIRONMENT:
  DEXPLATFORM_STATE      Simulated chain state file  [default: dexplatform-state.json]
  DEXPLATFORM_ACCOUNT    Account address to act as

QUICK START:
  dexplatform create-pool    --token-a WETH --token-b DAI
  dexplatform add-liquidity  --token-a WETH --amount-a 10 --token-b DAI --amount-b 25000
  dexplatform swap           --in DAI --out WETH --amount 250
  dexplatform pools
  dexplatform positions"
)]
struct Cli {
    /// Path of the simulated chain's JSON state file
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = "dexplatform-state.json",
        env = "DEXPLATFORM_STATE"
    )]
    state_file: String,

    /// Account address to act as (0x hex)
    #[arg(
        long,
        global = true,
        value_name = "ADDRESS",
        default_value = DEFAULT_ACCOUNT,
        env = "DEXPLATFORM_ACCOUNT"
    )]
    account: String,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable tokens of the static directory
    Tokens,

    /// Show every registered pool with reserves and total shares
    ///
    /// Read-only — refreshes the registry snapshot and prints it.
    Pools,

    /// Show the acting account's non-zero liquidity positions
    Positions,

    /// Create a liquidity pool for a token pair
    ///
    /// Fails client-side with "pool already exists" when the registry
    /// already holds the pair, in either order.
    #[command(
        name = "create-pool",
        after_help = "\
EXAMPLES:
  dexplatform create-pool --token-a WETH --token-b DAI
  dexplatform create-pool --token-a 0xC02a… --token-b 0x6B17… --json

NOTES:
  A freshly created pool is empty. Run `add-liquidity` to seed it."
    )]
    CreatePool {
        /// First token — symbol or 0x hex address
        #[arg(long, value_name = "TOKEN")]
        token_a: String,

        /// Second token — symbol or 0x hex address
        #[arg(long, value_name = "TOKEN")]
        token_b: String,
    },

    /// Deposit both tokens of an existing pool
    ///
    /// Token order does not matter: the pair is canonicalized before
    /// submission and each amount stays with its token.
    #[command(
        name = "add-liquidity",
        after_help = "\
EXAMPLES:
  dexplatform add-liquidity --token-a WETH --amount-a 10 --token-b DAI --amount-b 25000
  dexplatform add-liquidity --token-a DAI --amount-a 25000 --token-b WETH --amount-b 10

NOTES:
  Amounts are decimal strings with up to 18 fractional digits."
    )]
    AddLiquidity {
        /// First token — symbol or 0x hex address
        #[arg(long, value_name = "TOKEN")]
        token_a: String,

        /// Amount of the first token (decimal)
        #[arg(long, value_name = "AMOUNT")]
        amount_a: String,

        /// Second token — symbol or 0x hex address
        #[arg(long, value_name = "TOKEN")]
        token_b: String,

        /// Amount of the second token (decimal)
        #[arg(long, value_name = "AMOUNT")]
        amount_b: String,
    },

    /// Burn liquidity shares and withdraw proportional reserves
    #[command(
        name = "remove-liquidity",
        after_help = "\
EXAMPLES:
  dexplatform remove-liquidity --token0 WETH --token1 DAI --shares 100

NOTES:
  Run `dexplatform positions` to see your current share balances."
    )]
    RemoveLiquidity {
        /// First token of the pool — symbol or 0x hex address
        #[arg(long, value_name = "TOKEN")]
        token0: String,

        /// Second token of the pool — symbol or 0x hex address
        #[arg(long, value_name = "TOKEN")]
        token1: String,

        /// Number of shares to burn (decimal)
        #[arg(long, value_name = "SHARES")]
        shares: String,
    },

    /// Swap an input amount through an existing pool
    #[command(
        after_help = "\
EXAMPLES:
  dexplatform swap --in DAI --out WETH --amount 250
  dexplatform swap --in WETH --out DAI --amount 0.5 --json

NOTES:
  The swap direction is exactly --in → --out; the pool is discovered
  order-independently."
    )]
    Swap {
        /// Token to sell — symbol or 0x hex address
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,

        /// Token to receive — symbol or 0x hex address
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,

        /// Amount of the input token to sell (decimal)
        #[arg(long, value_name = "AMOUNT")]
        amount: String,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    let account = Address::from_str(&cli.account)
        .map_err(|_| anyhow!("--account '{}' is not a valid 0x address", cli.account))?;
    let chain = SimChain::with_state_file(&cli.state_file, account)
        .with_context(|| format!("Cannot open state file '{}'", cli.state_file))?;

    let mut client = DexClient::new(chain.clone(), chain.clone());
    client
        .connect(&chain)
        .await
        .context("Failed to connect the session account")?;

    match &cli.command {
        Commands::Tokens => cmd_tokens(&client, cli.json),
        Commands::Pools => cmd_pools(&client, cli.json).await?,
        Commands::Positions => cmd_positions(&client, cli.json).await?,
        Commands::CreatePool { token_a, token_b } => {
            cmd_create_pool(&client, token_a, token_b, cli.json).await?;
        }
        Commands::AddLiquidity { token_a, amount_a, token_b, amount_b } => {
            cmd_add_liquidity(&client, token_a, amount_a, token_b, amount_b, cli.json).await?;
        }
        Commands::RemoveLiquidity { token0, token1, shares } => {
            cmd_remove_liquidity(&client, token0, token1, shares, cli.json).await?;
        }
        Commands::Swap { token_in, token_out, amount } => {
            cmd_swap(&client, token_in, token_out, amount, cli.json).await?;
        }
    }

    Ok(())
}

type Client = DexClient<SimChain, SimChain>;

// ─── tokens ──────────────────────────────────────────────────────────────────

fn cmd_tokens(client: &Client, json_output: bool) {
    let directory = client.directory();
    if json_output {
        let tokens: Vec<_> = directory
            .tokens()
            .iter()
            .map(|t| json!({ "name": t.name, "address": t.address.to_string() }))
            .collect();
        println!("{}", json!({ "status": "ok", "command": "tokens", "tokens": tokens }));
    } else {
        println!("─── Token Directory ──────────────────────────────────────────────");
        for token in directory.tokens() {
            println!("  {:<8} {}", token.name, token.address);
        }
    }
}

// ─── pools ───────────────────────────────────────────────────────────────────

async fn cmd_pools(client: &Client, json_output: bool) -> Result<()> {
    let snapshot = client.refresh().await?;
    let directory = client.directory();

    if json_output {
        let pools: Vec<_> = snapshot
            .pools()
            .iter()
            .map(|p| {
                json!({
                    "token0":       p.pair.token0().to_string(),
                    "token1":       p.pair.token1().to_string(),
                    "reserve0":     p.reserve0.to_string(),
                    "reserve1":     p.reserve1.to_string(),
                    "total_shares": p.total_shares.to_string(),
                })
            })
            .collect();
        println!("{}", json!({ "status": "ok", "command": "pools", "pools": pools }));
        return Ok(());
    }

    println!("─── Pool Information ─────────────────────────────────────────────");
    if snapshot.pools().is_empty() {
        println!("  No pools registered yet. Run `dexplatform create-pool` first.");
        return Ok(());
    }
    println!(
        "  {:<14} {:>18} {:>18} {:>16}",
        "Pair", "Reserve 0", "Reserve 1", "Total Shares"
    );
    for pool in snapshot.pools() {
        let label = format!(
            "{}-{}",
            directory.label(pool.pair.token0()),
            directory.label(pool.pair.token1())
        );
        println!(
            "  {:<14} {:>18} {:>18} {:>16}",
            label,
            pool.reserve0.to_string(),
            pool.reserve1.to_string(),
            pool.total_shares.to_string()
        );
    }
    Ok(())
}

// ─── positions ───────────────────────────────────────────────────────────────

async fn cmd_positions(client: &Client, json_output: bool) -> Result<()> {
    let snapshot = client.refresh().await?;
    let directory = client.directory();

    if json_output {
        let positions: Vec<_> = snapshot
            .positions()
            .iter()
            .map(|p| {
                json!({
                    "token0": p.pair.token0().to_string(),
                    "token1": p.pair.token1().to_string(),
                    "shares": p.shares.to_string(),
                })
            })
            .collect();
        println!(
            "{}",
            json!({
                "status":    "ok",
                "command":   "positions",
                "account":   client.account().map(|a| a.to_string()),
                "positions": positions,
            })
        );
        return Ok(());
    }

    println!("─── Your Liquidity Positions ─────────────────────────────────────");
    if let Some(account) = client.account() {
        println!("  Account  {account}");
    }
    if snapshot.positions().is_empty() {
        println!("  No positions. Run `dexplatform add-liquidity` to open one.");
        return Ok(());
    }
    for position in snapshot.positions() {
        let label = format!(
            "{}-{}",
            directory.label(position.pair.token0()),
            directory.label(position.pair.token1())
        );
        println!("  {:<14} {:>18} shares", label, position.shares.to_string());
    }
    Ok(())
}

// ─── create-pool ─────────────────────────────────────────────────────────────

async fn cmd_create_pool(
    client: &Client,
    token_a: &str,
    token_b: &str,
    json_output: bool,
) -> Result<()> {
    let directory = client.directory();
    let addr_a = resolve_token(directory, token_a).context("--token-a")?;
    let addr_b = resolve_token(directory, token_b).context("--token-b")?;

    let outcome = client.create_pool(addr_a, addr_b).await?;

    if json_output {
        println!("{}", outcome_json("create-pool", &outcome));
    } else {
        println!("─── Pool Created ─────────────────────────────────────────────────");
        print_outcome_pair(client, &outcome.pair);
        println!("  Transaction      {}", outcome.tx_hash);
        println!();
        println!("  The pool is empty — seed it next:");
        println!("    dexplatform add-liquidity --token-a {token_a} --amount-a <AMT> \\");
        println!("      --token-b {token_b} --amount-b <AMT>");
    }
    Ok(())
}

// ─── add-liquidity ───────────────────────────────────────────────────────────

async fn cmd_add_liquidity(
    client: &Client,
    token_a: &str,
    amount_a: &str,
    token_b: &str,
    amount_b: &str,
    json_output: bool,
) -> Result<()> {
    let directory = client.directory();
    let addr_a = resolve_token(directory, token_a).context("--token-a")?;
    let addr_b = resolve_token(directory, token_b).context("--token-b")?;

    let outcome = client.add_liquidity(addr_a, amount_a, addr_b, amount_b).await?;

    if json_output {
        println!("{}", outcome_json("add-liquidity", &outcome));
    } else {
        println!("─── Liquidity Added ──────────────────────────────────────────────");
        print_outcome_pair(client, &outcome.pair);
        println!("  Deposited        {amount_a} {token_a}  +  {amount_b} {token_b}");
        println!("  Transaction      {}", outcome.tx_hash);
        println!();
        println!("  Run `dexplatform positions` to see your share balance.");
    }
    Ok(())
}

// ─── remove-liquidity ────────────────────────────────────────────────────────

async fn cmd_remove_liquidity(
    client: &Client,
    token0: &str,
    token1: &str,
    shares: &str,
    json_output: bool,
) -> Result<()> {
    let directory = client.directory();
    let addr0 = resolve_token(directory, token0).context("--token0")?;
    let addr1 = resolve_token(directory, token1).context("--token1")?;

    let outcome = client.remove_liquidity(addr0, addr1, shares).await?;

    if json_output {
        println!("{}", outcome_json("remove-liquidity", &outcome));
    } else {
        println!("─── Liquidity Removed ────────────────────────────────────────────");
        print_outcome_pair(client, &outcome.pair);
        println!("  Shares burned    {shares}");
        println!("  Transaction      {}", outcome.tx_hash);
    }
    Ok(())
}

// ─── swap ────────────────────────────────────────────────────────────────────

async fn cmd_swap(
    client: &Client,
    token_in: &str,
    token_out: &str,
    amount: &str,
    json_output: bool,
) -> Result<()> {
    let directory = client.directory();
    let addr_in = resolve_token(directory, token_in).context("--in")?;
    let addr_out = resolve_token(directory, token_out).context("--out")?;

    let outcome = client.swap(addr_in, addr_out, amount).await?;

    if json_output {
        println!("{}", outcome_json("swap", &outcome));
    } else {
        println!("─── Swap Executed ────────────────────────────────────────────────");
        println!("  Direction        {token_in} → {token_out}");
        println!("  Sold             {amount} {token_in}");
        println!("  Transaction      {}", outcome.tx_hash);
        println!();
        println!("  Run `dexplatform pools` to see the updated reserves.");
    }
    Ok(())
}

// ─── Output helpers ──────────────────────────────────────────────────────────

fn outcome_json(command: &str, outcome: &OperationOutcome) -> serde_json::Value {
    json!({
        "status":  "ok",
        "command": command,
        "token0":  outcome.pair.token0().to_string(),
        "token1":  outcome.pair.token1().to_string(),
        "tx":      outcome.tx_hash.to_string(),
    })
}

fn print_outcome_pair(client: &Client, pair: &PairKey) {
    let directory = client.directory();
    println!(
        "  Pair             {}-{}",
        directory.label(pair.token0()),
        directory.label(pair.token1())
    );
    println!("  Token 0          {}", pair.token0());
    println!("  Token 1          {}", pair.token1());
}
