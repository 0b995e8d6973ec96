//! Referendum daemon: entry point for operating a referendum.

mod config;
mod runner;
mod shutdown;
mod stakes;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use referendum_governance::{
    Authorizer, ReferendumEngine, ReferendumError, SignerAuthorizer, StakeOracle,
};
use referendum_store::ReferendumStore;
use referendum_store_lmdb::{check_data_dir, LmdbEnvironment, LmdbReferendumStore};
use referendum_types::{AccountName, Timestamp, VoteSide};
use referendum_utils::LogFormat;
use serde_json::json;

use crate::config::DaemonConfig;
use crate::shutdown::ShutdownController;
use crate::stakes::StakeTable;

/// Room for the referendum's two databases plus headroom.
const MAX_DBS: u32 = 4;

#[derive(Parser)]
#[command(name = "referendum-daemon", about = "Recurring stake-weighted referendum")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "REFERENDUM_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for referendum storage.
    #[arg(long, env = "REFERENDUM_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON file mapping accounts to their current stake.
    #[arg(long, env = "REFERENDUM_STAKES")]
    stakes: Option<PathBuf>,

    /// The referendum's own account.
    #[arg(long, env = "REFERENDUM_CONTRACT")]
    contract: Option<AccountName>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "REFERENDUM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "REFERENDUM_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Wall-clock seconds per referendum day in `run`.
    #[arg(long, env = "REFERENDUM_SECONDS_PER_DAY")]
    seconds_per_day: Option<u64>,

    /// Account signing the action. Defaults to the account the action
    /// requires (publisher or voter), so without this flag the signer
    /// check always passes; anyone who can run the daemon acts as that
    /// account. Set it to check a real signer against the required one.
    #[arg(long, global = true)]
    caller: Option<AccountName>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Install the configured parameters and reset the counters.
    Init {
        #[arg(long)]
        publisher: AccountName,
    },
    /// Register a ballot.
    Vote {
        #[arg(long)]
        voter: AccountName,
        /// "yes", "no", or a raw side code.
        #[arg(long, value_parser = parse_side)]
        side: u8,
    },
    /// Withdraw a ballot.
    Unvote {
        #[arg(long)]
        voter: AccountName,
    },
    /// Tally once, re-arm the daily recount, and print the day's report.
    Count {
        #[arg(long)]
        publisher: AccountName,
    },
    /// Print configuration, state and ballots as JSON.
    Status,
    /// Keep tallying daily until the referendum closes. Tallies now unless
    /// a recount is already scheduled, in which case it waits for that.
    Run {
        #[arg(long)]
        publisher: AccountName,
    },
}

fn parse_side(s: &str) -> Result<u8, String> {
    match s.to_ascii_lowercase().as_str() {
        "yes" => Ok(VoteSide::YES_CODE),
        "no" => Ok(VoteSide::NO_CODE),
        other => other
            .parse::<u8>()
            .map_err(|_| format!("expected \"yes\", \"no\" or a side code, got {other:?}")),
    }
}

/// File config (or defaults) with CLI flags and env vars layered on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(stakes) = &cli.stakes {
        config.stakes_file = Some(stakes.clone());
    }
    if let Some(contract) = &cli.contract {
        config.contract_account = contract.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(seconds) = cli.seconds_per_day {
        config.seconds_per_day = seconds;
    }
    Ok(config)
}

fn open_store(config: &DaemonConfig) -> anyhow::Result<LmdbReferendumStore> {
    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(&config.data_dir, MAX_DBS, config.map_size)
        .with_context(|| format!("failed to open data dir {}", config.data_dir.display()))?;

    let report = env.check_integrity()?;
    if !report.is_healthy() {
        for error in &report.errors {
            tracing::error!(%error, "integrity check failed");
        }
        anyhow::bail!("referendum database failed its integrity check");
    }
    tracing::info!(
        databases = report.databases_checked,
        entries = report.total_entries,
        "integrity check passed"
    );
    Ok(env.referendum_store())
}

/// The signer for an action that requires `account`: `--caller` if given,
/// otherwise `account` itself.
fn signer_for(caller: Option<&AccountName>, account: &AccountName) -> AccountName {
    caller.cloned().unwrap_or_else(|| account.clone())
}

/// Treat `NotInitialized` as absence.
fn optional<T>(result: Result<T, ReferendumError>) -> Result<Option<T>, ReferendumError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ReferendumError::NotInitialized) => Ok(None),
        Err(e) => Err(e),
    }
}

fn status<S, O, A>(engine: &ReferendumEngine<S, O, A>) -> anyhow::Result<serde_json::Value>
where
    S: ReferendumStore,
    O: StakeOracle,
    A: Authorizer,
{
    let ballots: Vec<_> = engine
        .ballots()?
        .into_iter()
        .map(|ballot| {
            json!({
                "voter": ballot.voter,
                "side": ballot.side.as_str(),
                "stake": engine.oracle().stake_of(&ballot.voter),
            })
        })
        .collect();

    let pending: Vec<_> = engine
        .deferred()?
        .pending(engine.contract())
        .map(|(due, scheduled)| {
            json!({
                "action": scheduled.action.name(),
                "due": due.as_secs(),
            })
        })
        .into_iter()
        .collect();

    let config = optional(engine.config())?;
    let state = optional(engine.state())?;
    let summary = match (config, state) {
        (Some(config), Some(state)) => json!({
            "contract": engine.contract(),
            "initialized": true,
            "publisher": config.publisher,
            "params": config.params,
            "state": state,
            "days_remaining": state.days_remaining(&config.params),
            "sustained_reached": state.sustained_reached(&config.params),
            "ballot_count": engine.ballot_count()?,
            "ballots": ballots,
            "scheduled": pending,
        }),
        _ => json!({
            "contract": engine.contract(),
            "initialized": false,
            "ballot_count": engine.ballot_count()?,
            "ballots": ballots,
        }),
    };
    Ok(summary)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    referendum_utils::init_logging(config.log_format, &config.log_level);

    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let store = open_store(&config)?;
    let stakes: StakeTable = stakes::load_stakes(config.stakes_file.as_deref())?;
    let engine = ReferendumEngine::new(
        config.contract_account.clone(),
        config.referendum.clone(),
        store,
        stakes,
        SignerAuthorizer,
    );

    let signer = |account: &AccountName| signer_for(cli.caller.as_ref(), account);

    match &cli.command {
        Command::Init { publisher } => {
            engine.init(&signer(publisher), publisher)?;
            println!("{}", serde_json::to_string_pretty(&status(&engine)?)?);
        }
        Command::Vote { voter, side } => {
            let ballot = engine.vote(&signer(voter), voter, *side)?;
            println!("{}", serde_json::to_string_pretty(&ballot)?);
        }
        Command::Unvote { voter } => {
            let ballot = engine.unvote(&signer(voter), voter)?;
            println!("{}", serde_json::to_string_pretty(&ballot)?);
        }
        Command::Count { publisher } => {
            let outcome =
                engine.count_votes_and_arm(&signer(publisher), publisher, Timestamp::now())?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&status(&engine)?)?);
        }
        Command::Run { publisher } => {
            let shutdown = ShutdownController::new();
            let receiver = shutdown.subscribe();
            tracing::info!(
                %publisher,
                seconds_per_day = config.seconds_per_day,
                "starting daily tally loop"
            );

            let caller = signer(publisher);
            let run = runner::run_daily_tally(
                &engine,
                &caller,
                publisher,
                config.seconds_per_day,
                receiver,
            );
            tokio::pin!(run);

            // On a signal the loop sees the broadcast and returns at its next wait.
            let summary = tokio::select! {
                summary = &mut run => summary?,
                _ = shutdown.wait_for_signal() => run.await?,
            };
            println!("{}", serde_json::to_string_pretty(&summary.final_state)?);
            tracing::info!(tallies = summary.tallies, "referendum daemon exited cleanly");
        }
    }

    Ok(())
}
