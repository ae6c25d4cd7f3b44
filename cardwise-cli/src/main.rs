use anyhow::{Context, Result};
use cardwise_core::{CanonicalCategory, CardRecommendation, DebtAccount};
use cardwise_engine::{
    rank_named, recommend, CardCatalog, CardRewardIndex, DebtInsightEngine, SpendEstimates,
};
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod state;

use config::Config;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARDWISE_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "cardwise", version = VERSION, about = "Card reward & debt recommendations")]
struct Cli {
    /// Config file (default: ~/.cardwise/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter ~/.cardwise/config.toml
    Init,

    /// List canonical reward categories in priority order
    Categories {
        #[arg(long)]
        json: bool,
    },

    /// Classify a business from its name and place-type tags
    Classify {
        #[arg(long)]
        name: String,

        /// Place-type tag, repeatable (e.g. --tag restaurant --tag food)
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Rank cards for one category
    Rank {
        /// Canonical category name (see `cardwise categories`)
        #[arg(long)]
        category: String,

        /// Card catalog JSON (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Monthly spend in the category (default: from config)
        #[arg(long)]
        spend: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Classify a business, then rank cards for it
    Recommend {
        #[arg(long)]
        name: String,

        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Evaluate a debt portfolio (JSON array or CSV)
    Debt {
        #[arg(long)]
        accounts: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(cli.config.as_deref())?;
    init_logging(&cli, &cfg);
    debug!("cardwise {}", VERSION);

    match cli.command {
        Command::Init => {
            config::init_config()?;
        }

        Command::Categories { json } => {
            if json {
                let rows: Vec<CategoryRow> = CanonicalCategory::ALL
                    .iter()
                    .map(|c| CategoryRow {
                        category: *c,
                        label: c.display().label,
                        color: c.display().color,
                    })
                    .collect();
                print_json(&rows)?;
            } else {
                for c in CanonicalCategory::ALL {
                    println!("{:>2}. {:<30} {}", c.priority_rank() + 1, c.as_str(), c.display().label);
                }
            }
        }

        Command::Classify { name, tags, json } => {
            let result = cardwise_engine::classify_explained(&name, &tags);
            if json {
                print_json(&result)?;
            } else {
                println!("{} -> {} ({})", name, result.category, result.category.display().label);
                match result.matched {
                    Some(m) => println!("  matched {:?} via {:?}", m, result.step),
                    None => println!("  no match; {:?}", result.step),
                }
            }
        }

        Command::Rank {
            category,
            catalog,
            spend,
            json,
        } => {
            let index = load_index(catalog.as_deref(), &cfg)?;
            let spend = match spend {
                Some(s) => s,
                None => {
                    let parsed: CanonicalCategory = category.parse()?;
                    cfg.spend.to_estimates()?.get(parsed)
                }
            };
            let recs = rank_named(&category, &index, Some(spend))?;
            if json {
                print_json(&recs)?;
            } else {
                println!("Cards for {} at ${:.2}/month\n", category, spend);
                print_recommendations(&recs);
            }
        }

        Command::Recommend {
            name,
            tags,
            catalog,
            json,
        } => {
            let index = load_index(catalog.as_deref(), &cfg)?;
            let estimates: SpendEstimates = cfg.spend.to_estimates()?;
            let rec = recommend(&name, &tags, &index, &estimates);
            if json {
                print_json(&rec)?;
            } else {
                println!(
                    "{} -> {} (${:.2}/month)\n",
                    name,
                    rec.classification.category.display().label,
                    rec.monthly_spend
                );
                print_recommendations(&rec.cards);
            }
        }

        Command::Debt { accounts, json } => {
            let accts = load_accounts(&accounts)?;
            let summary = DebtInsightEngine::summarize(&accts);
            let insights = DebtInsightEngine::evaluate(&accts);

            if json {
                print_json(&DebtReport {
                    summary: &summary,
                    insights: &insights,
                })?;
            } else {
                println!("Loaded {} accounts from {}", accts.len(), accounts.display());
                println!(
                    "Total balance ${:.2} | minimums ${:.2}/month | weighted APR {:.2}%",
                    summary.total_balance, summary.total_minimum_payment, summary.weighted_apr
                );
                if let Some(u) = summary.credit_utilization {
                    println!("Credit utilization {:.1}%", u * 100.0);
                }
                println!();

                for i in &insights {
                    println!("{} [{:?}] {}", i.icon, i.priority, i.title);
                    println!("   {}", i.description);
                    if let Some(s) = i.potential_savings {
                        println!("   potential savings: ${:.2}", s);
                    }
                    for a in &i.action_items {
                        println!("   - {}", a);
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli, cfg: &Config) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cfg.logging.level.as_str()),
    );
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// `--catalog` wins over `[catalog] path`; neither means the built-in snapshot.
fn load_index(flag: Option<&Path>, cfg: &Config) -> Result<CardRewardIndex> {
    let index = match flag.or(cfg.catalog.path.as_deref()) {
        Some(p) => {
            info!("loading card catalog from {}", p.display());
            let catalog = CardCatalog::from_path(p)?;
            CardRewardIndex::from_catalog(catalog)
                .with_context(|| format!("indexing {}", p.display()))?
        }
        None => CardRewardIndex::builtin().context("built-in card catalog")?,
    };
    Ok(index)
}

fn load_accounts(path: &Path) -> Result<Vec<DebtAccount>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        let mut rdr = csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
        rdr.deserialize()
            .collect::<Result<Vec<DebtAccount>, _>>()
            .with_context(|| format!("parsing {}", path.display()))
    } else {
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        parse_accounts_json(&s).with_context(|| format!("parsing {}", path.display()))
    }
}

fn parse_accounts_json(s: &str) -> Result<Vec<DebtAccount>> {
    Ok(serde_json::from_str(s)?)
}

fn print_recommendations(recs: &[CardRecommendation]) {
    if recs.is_empty() {
        println!("(no card earns rewards here)");
        return;
    }
    for r in recs {
        let marker = if r.is_top_choice { "*" } else { " " };
        let via = if r.is_fallback() { " (catch-all)" } else { "" };
        println!(
            "{} {:<34} {:>4}x {:<9} fee=${:<4.0} ~${:.2}/month{}",
            marker,
            r.display_name,
            r.multiplier,
            r.reward_type,
            r.annual_fee,
            r.estimated_monthly_value,
            via
        );
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct CategoryRow {
    category: CanonicalCategory,
    label: &'static str,
    color: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DebtReport<'a> {
    summary: &'a cardwise_core::DebtSummary,
    insights: &'a [cardwise_core::DebtInsight],
}
