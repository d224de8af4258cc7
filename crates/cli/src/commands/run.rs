use std::path::PathBuf;

use tierwise_core::config::LoadOptions;
use tierwise_core::errors::ApplicationError;
use tierwise_core::TcoExport;
use tracing::info;

use crate::commands::select::{self, SelectArgs};
use crate::commands::{load_config, render_json, tco, write_file, CommandResult};

/// Selection followed by TCO aggregation in one pass.
#[derive(Clone, Debug, Default)]
pub struct RunArgs {
    pub candidates: PathBuf,
    pub metrics: Option<PathBuf>,
    pub mentions: Option<PathBuf>,
    pub costs: Option<PathBuf>,
    pub selection_output: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub load: LoadOptions,
}

pub fn run(args: &RunArgs) -> CommandResult {
    match pipeline(args) {
        Ok(export) => CommandResult::document("run", &export, args.output.as_deref()),
        Err(error) => CommandResult::from_error("run", &error),
    }
}

fn pipeline(args: &RunArgs) -> Result<TcoExport, ApplicationError> {
    let config = load_config(&args.load)?;

    let select_args = SelectArgs {
        candidates: args.candidates.clone(),
        metrics: args.metrics.clone(),
        mentions: args.mentions.clone(),
        output: None,
        load: args.load.clone(),
    };
    let selection = select::select(&config, &select_args)?;

    if let Some(path) = &args.selection_output {
        write_file(path, &render_json(&selection)?)?;
        info!(
            event_name = "cli.run.selection_written",
            path = %path.display(),
            "selection result written"
        );
    }

    tco::export(&config, &args.load, &selection, args.costs.as_ref())
}
