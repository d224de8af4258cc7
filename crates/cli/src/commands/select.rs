use std::path::PathBuf;

use tierwise_core::boundary::{parse_candidates, parse_mentions, parse_metrics};
use tierwise_core::config::{AppConfig, LoadOptions};
use tierwise_core::errors::ApplicationError;
use tierwise_core::{
    DeterministicSelectionEngine, MentionSource, MetricsSource, NoMentions, NoMetrics,
    SelectionEngine, SelectionResult,
};
use tracing::info;

use crate::commands::{load_config, read_file, resolver_for, source_label, CommandResult};

#[derive(Clone, Debug, Default)]
pub struct SelectArgs {
    pub candidates: PathBuf,
    pub metrics: Option<PathBuf>,
    pub mentions: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub load: LoadOptions,
}

pub fn run(args: &SelectArgs) -> CommandResult {
    let outcome = load_config(&args.load).and_then(|config| select(&config, args));
    match outcome {
        Ok(result) => CommandResult::document("select", &result, args.output.as_deref()),
        Err(error) => CommandResult::from_error("select", &error),
    }
}

pub(crate) fn select(
    config: &AppConfig,
    args: &SelectArgs,
) -> Result<SelectionResult, ApplicationError> {
    let resolver = resolver_for(config);

    let pool = parse_candidates(
        &source_label(&args.candidates),
        &read_file(&args.candidates)?,
        &resolver,
    )?;

    let metrics: Box<dyn MetricsSource> = match &args.metrics {
        Some(path) => {
            Box::new(parse_metrics(&source_label(path), &read_file(path)?, &resolver)?)
        }
        None => Box::new(NoMetrics),
    };
    let mentions: Box<dyn MentionSource> = match &args.mentions {
        Some(path) => {
            Box::new(parse_mentions(&source_label(path), &read_file(path)?, &resolver)?)
        }
        None => Box::new(NoMentions),
    };

    info!(
        event_name = "cli.select.loaded",
        category = pool.category.as_str(),
        candidates = pool.candidates.len(),
        excluded = pool.excluded.len(),
        "candidate pool loaded"
    );

    let engine = DeterministicSelectionEngine::new(&config.selection);
    let mut result =
        engine.select(&pool.category, &pool.candidates, metrics.as_ref(), mentions.as_ref());
    result.excluded_candidates = pool.excluded;
    Ok(result)
}
