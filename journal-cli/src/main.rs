//! Journal CLI: position manager over the journal file store.
//!
//! Each command loads one position, applies one engine operation, and saves
//! it back only if the operation succeeded:
//! - `new` / `entry`: create a planned position and record its entry
//! - `scale-out` / `update-leg` / `remove-leg` / `close`: manage partial exits
//! - `breakeven` / `manual-pnl`: metadata and broker reconciliation
//! - `show` / `list` / `delete`: inspect and remove positions

mod format;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use journal_core::{
    normalize, normalize_opt, AccountBalances, AccountId, Direction, LegId, LegPatch, Position,
    PositionError, PositionId, PositionStore, PositionSummary,
};
use journal_store::{BalanceBook, JournalConfig, JsonFileStore};

const DEFAULT_CONFIG: &str = "journal.toml";

#[derive(Parser)]
#[command(name = "journal", about = "Trading journal position manager")]
struct Cli {
    /// Path to a TOML config file. Defaults to ./journal.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a planned position.
    New {
        /// Instrument symbol (e.g., EURUSD, ES).
        symbol: String,

        /// Account the position belongs to.
        #[arg(long)]
        account: Option<String>,

        /// Trade date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
    },
    /// Record or edit the entry (only before any scale-out).
    Entry {
        id: String,

        /// long or short.
        #[arg(long, default_value = "long")]
        direction: String,

        #[arg(long, allow_hyphen_values = true)]
        entry: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        size: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        stop: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        target: Option<String>,
    },
    /// Close part of the position, by absolute size or percent of what remains.
    ScaleOut {
        id: String,

        #[arg(long, conflicts_with = "percent", allow_hyphen_values = true)]
        size: Option<String>,

        /// Percent of the remaining size (0, 100].
        #[arg(long, allow_hyphen_values = true)]
        percent: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        price: String,
    },
    /// Change the size and/or price of an existing leg.
    UpdateLeg {
        id: String,
        leg: u64,

        #[arg(long, allow_hyphen_values = true)]
        size: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        price: Option<String>,
    },
    /// Remove a leg (reopens a closed position).
    RemoveLeg { id: String, leg: u64 },
    /// Close all remaining size at one price.
    Close {
        id: String,

        #[arg(long, allow_hyphen_values = true)]
        price: String,
    },
    /// Mark the stop as moved to breakeven.
    Breakeven {
        id: String,

        #[arg(long, allow_hyphen_values = true)]
        price: Option<String>,

        /// Unmark instead.
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
    /// Set or clear the manual P&L override.
    ManualPnl {
        id: String,

        #[arg(allow_hyphen_values = true)]
        value: Option<String>,

        #[arg(long, default_value_t = false)]
        clear: bool,
    },
    /// Show a position with every derived value.
    Show {
        id: String,

        /// Current/mark price for unrealized P&L.
        #[arg(long, allow_hyphen_values = true)]
        mark: Option<String>,

        /// Emit the raw summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List stored positions.
    List,
    /// Delete a position and all its legs.
    Delete { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = JournalConfig::load(cli.config.as_deref(), Path::new(DEFAULT_CONFIG))?;
    init_logging(&config.log_level);

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    let mut store = JsonFileStore::open(&data_dir)
        .with_context(|| format!("opening store at {}", data_dir.display()))?;
    let balances = config.balance_book();
    debug!(data_dir = %data_dir.display(), "journal ready");

    match cli.command {
        Commands::New {
            symbol,
            account,
            date,
        } => run_new(&mut store, symbol, account, date),
        Commands::Entry {
            id,
            direction,
            entry,
            size,
            stop,
            target,
        } => {
            let direction: Direction = direction.parse().map_err(anyhow::Error::msg)?;
            edit(&mut store, &id, |pos| {
                pos.set_entry(
                    direction,
                    normalize_opt(entry.as_deref()),
                    normalize_opt(stop.as_deref()),
                    normalize_opt(target.as_deref()),
                    normalize_opt(size.as_deref()),
                )
            })
        }
        Commands::ScaleOut {
            id,
            size,
            percent,
            price,
        } => run_scale_out(&mut store, &id, size, percent, &price),
        Commands::UpdateLeg {
            id,
            leg,
            size,
            price,
        } => {
            let patch = LegPatch {
                size: optional_number("--size", size.as_deref())?,
                price: optional_number("--price", price.as_deref())?,
            };
            if patch.is_empty() {
                bail!("nothing to update: pass --size and/or --price");
            }
            edit(&mut store, &id, |pos| pos.update_leg(LegId(leg), patch))
        }
        Commands::RemoveLeg { id, leg } => edit(&mut store, &id, |pos| {
            pos.remove_leg(LegId(leg)).map(|_| ())
        }),
        Commands::Close { id, price } => {
            let price = required_number("--price", &price)?;
            edit(&mut store, &id, |pos| pos.close_remaining(price).map(|_| ()))
        }
        Commands::Breakeven { id, price, clear } => {
            let price = optional_number("--price", price.as_deref())?;
            edit(&mut store, &id, |pos| {
                if clear {
                    pos.set_breakeven(false, None)
                } else {
                    let price = price.or(pos.entry_price());
                    pos.set_breakeven(true, price)
                }
            })
        }
        Commands::ManualPnl { id, value, clear } => {
            let value = match (clear, value.as_deref()) {
                (true, Some(_)) => bail!("pass either a value or --clear, not both"),
                (true, None) => None,
                (false, Some(raw)) => Some(required_number("value", raw)?),
                (false, None) => bail!("a value is required (or --clear)"),
            };
            edit(&mut store, &id, |pos| pos.set_manual_pnl(value))
        }
        Commands::Show { id, mark, json } => {
            let mark = optional_number("--mark", mark.as_deref())?;
            run_show(&store, &balances, &id, mark, json)
        }
        Commands::List => run_list(&store),
        Commands::Delete { id } => {
            store
                .delete(&PositionId::new(id.clone()))
                .with_context(|| format!("deleting position {id}"))?;
            println!("Deleted {id}");
            Ok(())
        }
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env("JOURNAL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load, apply one engine operation, and save only on success.
fn edit<F>(store: &mut JsonFileStore, id: &str, op: F) -> Result<()>
where
    F: FnOnce(&mut Position) -> Result<(), PositionError>,
{
    let id = PositionId::new(id);
    let mut position = store
        .load(&id)
        .with_context(|| format!("loading position {id}"))?;
    op(&mut position).with_context(|| format!("position {id} unchanged"))?;
    store.save(&position)?;
    println!("{id}: {}", position.status());
    Ok(())
}

fn required_number(name: &str, raw: &str) -> Result<f64> {
    match normalize(raw) {
        Some(value) => Ok(value),
        None => bail!("{name} must be a finite number, got '{raw}'"),
    }
}

/// Absent stays absent; present-but-unparseable is an argument error.
fn optional_number(name: &str, raw: Option<&str>) -> Result<Option<f64>> {
    raw.map(|r| required_number(name, r)).transpose()
}

fn run_new(
    store: &mut JsonFileStore,
    symbol: String,
    account: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let mut position = Position::new(symbol);
    if let Some(account) = account {
        position = position.with_account(AccountId::new(account));
    }
    if let Some(date) = date {
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{date}' (expected YYYY-MM-DD)"))?;
        position = position.with_trade_date(date);
    }
    store.save(&position)?;
    println!("{}", position.id());
    Ok(())
}

enum ScaleAmount {
    Size(f64),
    /// Percent of the remaining size.
    Percent(f64),
}

fn run_scale_out(
    store: &mut JsonFileStore,
    id: &str,
    size: Option<String>,
    percent: Option<String>,
    price: &str,
) -> Result<()> {
    let price = required_number("--price", price)?;
    let amount = match (
        optional_number("--size", size.as_deref())?,
        optional_number("--percent", percent.as_deref())?,
    ) {
        (Some(size), _) => ScaleAmount::Size(size),
        (None, Some(pct)) => ScaleAmount::Percent(pct),
        (None, None) => bail!("one of --size or --percent is required"),
    };

    edit(store, id, |pos| {
        let size = match amount {
            ScaleAmount::Size(size) => size,
            ScaleAmount::Percent(pct) => pos.size_for_percent(pct)?,
        };
        pos.add_leg(size, price).map(|_| ())
    })
}

fn run_show(
    store: &JsonFileStore,
    balances: &BalanceBook,
    id: &str,
    mark: Option<f64>,
    json: bool,
) -> Result<()> {
    let id = PositionId::new(id);
    let position = store
        .load(&id)
        .with_context(|| format!("loading position {id}"))?;
    let balance = position
        .account_id()
        .and_then(|account| balances.account_balance(account));
    let summary = PositionSummary::compute(&position, mark, balance);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        format::print_position(&position, &summary);
    }
    Ok(())
}

fn run_list(store: &JsonFileStore) -> Result<()> {
    let ids = store.list()?;
    if ids.is_empty() {
        println!("No positions in {}", store.dir().display());
        return Ok(());
    }

    println!(
        "{:<18} {:<10} {:<6} {:<17} {:>12}",
        "ID", "Symbol", "Side", "Status", "Total PnL"
    );
    println!("{}", "-".repeat(67));
    for id in ids {
        match store.load(&id) {
            Ok(position) => {
                let summary = PositionSummary::compute(&position, None, None);
                println!(
                    "{:<18} {:<10} {:<6} {:<17} {:>12}",
                    id,
                    summary.symbol,
                    summary.direction.as_str(),
                    summary.status.as_str(),
                    format::money(summary.total_pnl)
                );
            }
            Err(err) => eprintln!("{id}: {err}"),
        }
    }
    Ok(())
}
