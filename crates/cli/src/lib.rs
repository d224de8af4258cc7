pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tierwise_core::config::{ConfigOverrides, LoadOptions, LogFormat};

use crate::commands::run::RunArgs;
use crate::commands::select::SelectArgs;
use crate::commands::tco::TcoArgs;
use crate::commands::verify::VerifyArgs;
use crate::commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "tierwise",
    about = "Tierwise product selection and TCO CLI",
    long_about = "Pick three products from a winning price tier and aggregate their total cost of ownership.",
    after_help = "Examples:\n  tierwise select --candidates pool.json --metrics metrics.json\n  tierwise tco --selection selection.json --costs costs.json\n  tierwise run --candidates pool.json --costs costs.json --output export.json\n  tierwise verify --export export.json\n  tierwise config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a tierwise.toml config file")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level (trace|debug|info|warn|error)")]
    pub log_level: Option<String>,
    #[arg(long, global = true, help = "Override logging.format (compact|pretty|json)")]
    pub log_format: Option<LogFormat>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Classify a candidate pool into tiers and select three products")]
    Select {
        #[command(flatten)]
        inputs: SelectionInputs,
        #[arg(long, help = "Write the selection result here instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Aggregate total cost of ownership for a selection result")]
    Tco {
        #[arg(long, help = "Selection result JSON produced by `select`")]
        selection: PathBuf,
        #[arg(long, help = "Cost evidence JSON (recurring costs, consumables, resale)")]
        costs: Option<PathBuf>,
        #[arg(long, help = "Ownership horizon in years, overriding config")]
        horizon_years: Option<u32>,
        #[arg(long, help = "Write the TCO export here instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Run selection and TCO aggregation end to end")]
    Run {
        #[command(flatten)]
        inputs: SelectionInputs,
        #[arg(long, help = "Cost evidence JSON (recurring costs, consumables, resale)")]
        costs: Option<PathBuf>,
        #[arg(long, help = "Ownership horizon in years, overriding config")]
        horizon_years: Option<u32>,
        #[arg(long, help = "Also write the intermediate selection result here")]
        selection_output: Option<PathBuf>,
        #[arg(long, help = "Write the TCO export here instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Check a TCO export against its arithmetic invariants")]
    Verify {
        #[arg(long, help = "TCO export JSON to check")]
        export: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

#[derive(Debug, Args)]
pub struct SelectionInputs {
    #[arg(long, help = "Candidate pool JSON")]
    pub candidates: PathBuf,
    #[arg(long, help = "Keyword metrics JSON")]
    pub metrics: Option<PathBuf>,
    #[arg(long, help = "Community mention counts JSON")]
    pub mentions: Option<PathBuf>,
    #[arg(long, help = "Split tiers whose max/min price ratio exceeds the configured limit")]
    pub enforce_tier_price_ratio: bool,
}

impl Cli {
    /// Config load options carrying every flag-level override.
    pub fn load_options(&self) -> LoadOptions {
        let (horizon_years, enforce_tier_price_ratio) = match &self.command {
            Command::Select { inputs, .. } => {
                (None, inputs.enforce_tier_price_ratio.then_some(true))
            }
            Command::Tco { horizon_years, .. } => (*horizon_years, None),
            Command::Run { inputs, horizon_years, .. } => {
                (*horizon_years, inputs.enforce_tier_price_ratio.then_some(true))
            }
            Command::Verify { .. } | Command::Config => (None, None),
        };

        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                log_format: self.log_format,
                horizon_years,
                enforce_tier_price_ratio,
            },
        }
    }
}

pub fn dispatch(cli: Cli) -> CommandResult {
    let load = cli.load_options();

    match cli.command {
        Command::Select { inputs, output } => commands::select::run(&SelectArgs {
            candidates: inputs.candidates,
            metrics: inputs.metrics,
            mentions: inputs.mentions,
            output,
            load,
        }),
        Command::Tco { selection, costs, output, .. } => {
            commands::tco::run(&TcoArgs { selection, costs, output, load })
        }
        Command::Run { inputs, costs, selection_output, output, .. } => {
            commands::run::run(&RunArgs {
                candidates: inputs.candidates,
                metrics: inputs.metrics,
                mentions: inputs.mentions,
                costs,
                selection_output,
                output,
                load,
            })
        }
        Command::Verify { export } => commands::verify::run(&VerifyArgs { export }),
        Command::Config => commands::config::run(&load),
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = dispatch(cli);

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
