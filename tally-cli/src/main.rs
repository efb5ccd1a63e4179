use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tally_analytics::{compare_profiles, compute_statistics};
use tally_core::{DateRange, KindFilter, LedgerEntry, build_ledger, filter_ledger};
use tally_ingest::{
    FORMAT_HELP, MergeOutcome, example_csv, merge_rows, read_rows_from_path, validate_rows,
    write_ledger_csv,
};
use tracing::{info, warn};

mod config;
mod logging;
mod report;
mod store;

use config::{Config, ImportMode};
use report::Style;
use store::Store;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Deposit/withdrawal history analytics"
)]
struct Cli {
    /// Debug logging on stderr (TALLY_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Validate a Date;Tipe;Vaule CSV and store its rows in a profile
    Import {
        csv: PathBuf,

        #[arg(long)]
        profile: Option<String>,

        /// Add new rows to the stored ones instead of replacing them
        #[arg(long)]
        merge: bool,
    },

    /// Check a CSV without storing anything
    Validate { csv: PathBuf },

    /// Statistics and insights for a profile
    Report {
        #[command(flatten)]
        view: ViewArgs,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the ledger with running balances
    Ledger {
        #[command(flatten)]
        view: ViewArgs,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Write the filtered ledger as CSV
    Export {
        out: PathBuf,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Compare two profiles side by side
    Compare { a: String, b: String },

    /// Write (or print) a sample upload file
    Example { out: Option<PathBuf> },

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    List,
    Create { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config.toml if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Args, Debug, Clone, Default)]
struct ViewArgs {
    /// Profile id (default: configured profile, else the first one)
    #[arg(long, conflicts_with = "all")]
    profile: Option<String>,

    /// Every profile combined
    #[arg(long)]
    all: bool,

    /// All, Deposit or Withdrawal
    #[arg(long)]
    kind: Option<KindFilter>,

    /// First day, YYYY-MM-DD
    #[arg(long)]
    from: Option<String>,

    /// Last day (inclusive), YYYY-MM-DD
    #[arg(long)]
    to: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let home = store::tally_home()?;
    let cfg = config::load_config(&home)?;
    logging::init_logging(&cfg.general.log_level, cli.verbose);

    let style = Style {
        currency_symbol: &cfg.report.currency_symbol,
        insight_limit: cfg.report.insight_limit,
    };

    match cli.command {
        Command::Profile { command } => {
            let store = Store::open(&home)?;
            match command {
                ProfileCommand::List => {
                    for p in store.list()? {
                        println!("{:<20} {:<24} {}", p.id, p.name, p.created_at);
                    }
                }
                ProfileCommand::Create { name } => {
                    let p = store.create(&name)?;
                    println!("Created profile '{}' ({})", p.name, p.id);
                }
                ProfileCommand::Rename { id, name } => {
                    let p = store.rename(&id, &name)?;
                    println!("Renamed {} to '{}'", p.id, p.name);
                }
                ProfileCommand::Delete { id } => {
                    store.delete(&id)?;
                    println!("Deleted profile {id}");
                }
            }
        }

        Command::Import {
            csv,
            profile,
            merge,
        } => {
            let store = Store::open(&home)?;
            let mode = if merge { ImportMode::Merge } else { cfg.import.mode };
            import(&store, &cfg, &csv, profile, mode)?;
        }

        Command::Validate { csv } => {
            let rows = read_rows_from_path(&csv)?;
            let validation = validate_rows(&rows);
            if !validation.is_clean() {
                bail!(
                    "found invalid rows in {} ({}) {}",
                    csv.display(),
                    validation.summary(),
                    FORMAT_HELP
                );
            }
            println!(
                "{}: {} valid rows ({} blank skipped)",
                csv.display(),
                validation.valid_count(),
                validation.blank
            );
        }

        Command::Report { view, json } => {
            let store = Store::open(&home)?;
            let entries = load_view(&store, &cfg, &view)?;
            let stats = compute_statistics(&entries);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", report::render_statistics(&stats, &style));
            }
        }

        Command::Ledger { view, limit } => {
            let store = Store::open(&home)?;
            let entries = load_view(&store, &cfg, &view)?;
            print!("{}", report::render_ledger(&entries, limit, &style));
        }

        Command::Export { out, view } => {
            let store = Store::open(&home)?;
            let entries = load_view(&store, &cfg, &view)?;
            let file =
                fs::File::create(&out).with_context(|| format!("create {}", out.display()))?;
            write_ledger_csv(&entries, file)
                .with_context(|| format!("write {}", out.display()))?;
            println!("Wrote {} rows to {}", entries.len(), out.display());
        }

        Command::Compare { a, b } => {
            let store = Store::open(&home)?;
            let (pa, pb) = (store.get(&a)?, store.get(&b)?);
            let sa = compute_statistics(&build_ledger(&store.load_rows(&pa.id)?));
            let sb = compute_statistics(&build_ledger(&store.load_rows(&pb.id)?));
            let cmp = compare_profiles(&sa, &sb);
            print!("{}", report::render_comparison(&pa.name, &pb.name, &cmp, &style));
        }

        Command::Example { out } => match out {
            Some(path) => {
                // BOM so spreadsheet tools open it as UTF-8
                fs::write(&path, format!("\u{feff}{}", example_csv()))
                    .with_context(|| format!("write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
            None => println!("{}", example_csv()),
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&home)?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path(&home).display());
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },
    }

    Ok(())
}

fn import(
    store: &Store,
    cfg: &Config,
    csv: &Path,
    profile: Option<String>,
    mode: ImportMode,
) -> Result<()> {
    let size = fs::metadata(csv)
        .with_context(|| format!("stat {}", csv.display()))?
        .len();
    if size > cfg.import.max_file_bytes {
        bail!(
            "{} is too large ({} bytes, limit {})",
            csv.display(),
            size,
            cfg.import.max_file_bytes
        );
    }

    let rows = read_rows_from_path(csv)?;
    if rows.is_empty() {
        bail!("{} is empty. {}", csv.display(), FORMAT_HELP);
    }
    let validation = validate_rows(&rows);
    if !validation.is_clean() {
        bail!(
            "found invalid rows in the CSV ({}) {}",
            validation.summary(),
            FORMAT_HELP
        );
    }
    if validation.valid_count() == 0 {
        bail!("{} has no valid transactions. {}", csv.display(), FORMAT_HELP);
    }

    let target = match profile.or_else(|| cfg.general.default_profile.clone()) {
        Some(id) => store.get(&id)?,
        None => store.get_or_create_default()?,
    };

    match mode {
        ImportMode::Replace => {
            store.save_rows(&target.id, &validation.rows)?;
            info!(profile = %target.id, rows = validation.rows.len(), "import stored");
            println!(
                "Imported {} rows into '{}' (replaced previous data)",
                validation.rows.len(),
                target.name
            );
        }
        ImportMode::Merge => {
            let existing = store.load_rows(&target.id)?;
            match merge_rows(&existing, &validation.rows) {
                MergeOutcome::Conflicts(conflicts) => {
                    for c in &conflicts {
                        warn!(date = %c.date, kind = %c.kind, "merge conflict");
                        eprintln!(
                            "{} {}: stored {:.2}, file has {:.2}",
                            c.date, c.kind, c.old_amount, c.new_amount
                        );
                    }
                    bail!(
                        "{} rows conflict with stored data; nothing was merged",
                        conflicts.len()
                    );
                }
                MergeOutcome::Merged { rows, added, total } => {
                    store.save_rows(&target.id, &rows)?;
                    info!(profile = %target.id, added, total, "import merged");
                    println!("Merged {added} new rows into '{}' ({total} total)", target.name);
                }
            }
        }
    }
    Ok(())
}

/// Rows of the selected profile(s), built into a ledger, then narrowed.
fn load_view(store: &Store, cfg: &Config, view: &ViewArgs) -> Result<Vec<LedgerEntry>> {
    let rows = if view.all {
        store.load_all_rows()?
    } else {
        let id = match view.profile.clone().or_else(|| cfg.general.default_profile.clone()) {
            Some(id) => id,
            None => store.get_or_create_default()?.id,
        };
        store.load_rows(&id)?
    };

    let kind = match view.kind {
        Some(kind) => kind,
        None => cfg
            .report
            .default_kind
            .parse()
            .context("report.default_kind in config.toml")?,
    };

    // the filter itself fails closed; surface the reason instead of an empty view
    DateRange::parse(view.from.as_deref(), view.to.as_deref())?;

    let ledger = build_ledger(&rows);
    Ok(filter_ledger(&ledger, kind, view.from.as_deref(), view.to.as_deref()))
}
