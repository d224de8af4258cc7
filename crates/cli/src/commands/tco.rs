use std::path::PathBuf;

use tierwise_core::boundary::{decode, parse_costs};
use tierwise_core::config::{AppConfig, LoadOptions};
use tierwise_core::errors::ApplicationError;
use tierwise_core::{
    CostSource, NoCostEvidence, SelectionResult, TcoCalculator, TcoExport, TcoExporter,
};

use crate::commands::{load_config, read_file, resolver_for, source_label, CommandResult};

#[derive(Clone, Debug, Default)]
pub struct TcoArgs {
    pub selection: PathBuf,
    pub costs: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub load: LoadOptions,
}

pub fn run(args: &TcoArgs) -> CommandResult {
    let outcome = load_config(&args.load).and_then(|config| {
        let selection: SelectionResult =
            decode(&source_label(&args.selection), &read_file(&args.selection)?)?;
        export(&config, &args.load, &selection, args.costs.as_ref())
    });

    match outcome {
        Ok(export) => CommandResult::document("tco", &export, args.output.as_deref()),
        Err(error) => CommandResult::from_error("tco", &error),
    }
}

/// Horizon from an explicit override, else the category horizon.
pub(crate) fn horizon_years(config: &AppConfig, load: &LoadOptions, category: &str) -> u32 {
    if load.overrides.horizon_years.is_some() {
        config.tco.horizon_years
    } else {
        config.tco.horizon_for(category)
    }
}

pub(crate) fn export(
    config: &AppConfig,
    load: &LoadOptions,
    selection: &SelectionResult,
    costs: Option<&PathBuf>,
) -> Result<TcoExport, ApplicationError> {
    let resolver = resolver_for(config);
    let costs: Box<dyn CostSource> = match costs {
        Some(path) => Box::new(parse_costs(&source_label(path), &read_file(path)?, &resolver)?),
        None => Box::new(NoCostEvidence),
    };

    let horizon = horizon_years(config, load, &selection.category);
    let exporter = TcoExporter::new(TcoCalculator::new(&config.tco));
    Ok(exporter.export(selection, costs.as_ref(), horizon)?)
}
