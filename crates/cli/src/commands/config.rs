use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tierwise_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{load_config, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &error),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];

    for (key_path, value, env_keys) in entries(&config) {
        let source = if flag_overridden(options, key_path) {
            "flag".to_string()
        } else {
            field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
        };
        lines.push(render_line(key_path, &value, source));
    }

    for (category, years) in &config.tco.category_horizons {
        lines.push(render_line(
            &format!("tco.category_horizons.{category}"),
            &years.to_string(),
            format!("file ({})", display_path(config_file_path.as_deref())),
        ));
    }
    for (canonical, aliases) in &config.selection.manufacturer_aliases {
        lines.push(render_line(
            &format!("selection.manufacturer_aliases.{canonical}"),
            &aliases.join(", "),
            format!("file ({})", display_path(config_file_path.as_deref())),
        ));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

type Entry = (&'static str, String, &'static [&'static str]);

fn entry(key_path: &'static str, value: String, env_keys: &'static [&'static str]) -> Entry {
    (key_path, value, env_keys)
}

fn entries(config: &AppConfig) -> Vec<Entry> {
    let selection = &config.selection;
    let tco = &config.tco;
    vec![
        entry(
            "selection.weights.clicks",
            selection.weights.clicks.to_string(),
            &["TIERWISE_SELECTION_WEIGHT_CLICKS"],
        ),
        entry(
            "selection.weights.cpc",
            selection.weights.cpc.to_string(),
            &["TIERWISE_SELECTION_WEIGHT_CPC"],
        ),
        entry(
            "selection.weights.search_volume",
            selection.weights.search_volume.to_string(),
            &["TIERWISE_SELECTION_WEIGHT_SEARCH_VOLUME"],
        ),
        entry(
            "selection.weights.competition",
            selection.weights.competition.to_string(),
            &["TIERWISE_SELECTION_WEIGHT_COMPETITION"],
        ),
        entry(
            "selection.max_bonus",
            selection.mention_bonus.max_bonus.to_string(),
            &["TIERWISE_SELECTION_MAX_BONUS"],
        ),
        entry(
            "selection.bonus_half_saturation",
            selection.mention_bonus.half_saturation.to_string(),
            &["TIERWISE_SELECTION_BONUS_HALF_SATURATION"],
        ),
        entry(
            "selection.enforce_tier_price_ratio",
            selection.enforce_tier_price_ratio.to_string(),
            &["TIERWISE_SELECTION_ENFORCE_TIER_PRICE_RATIO"],
        ),
        entry(
            "selection.max_tier_price_ratio",
            selection.max_tier_price_ratio.to_string(),
            &["TIERWISE_SELECTION_MAX_TIER_PRICE_RATIO"],
        ),
        entry("tco.horizon_years", tco.horizon_years.to_string(), &["TIERWISE_TCO_HORIZON_YEARS"]),
        entry("tco.resale_thresholds.low", tco.resale_thresholds.low.to_string(), &[]),
        entry("tco.resale_thresholds.medium", tco.resale_thresholds.medium.to_string(), &[]),
        entry("tco.resale_thresholds.high", tco.resale_thresholds.high.to_string(), &[]),
        entry(
            "tco.min_resale_confidence",
            format!("{:?}", tco.min_resale_confidence).to_ascii_lowercase(),
            &["TIERWISE_TCO_MIN_RESALE_CONFIDENCE"],
        ),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["TIERWISE_LOGGING_LEVEL", "TIERWISE_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["TIERWISE_LOGGING_FORMAT", "TIERWISE_LOG_FORMAT"],
        ),
    ]
}

fn flag_overridden(options: &LoadOptions, key_path: &str) -> bool {
    let overrides = &options.overrides;
    match key_path {
        "logging.level" => overrides.log_level.is_some(),
        "logging.format" => overrides.log_format.is_some(),
        "tco.horizon_years" => overrides.horizon_years.is_some(),
        "selection.enforce_tier_price_ratio" => overrides.enforce_tier_price_ratio.is_some(),
        _ => false,
    }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("tierwise.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/tierwise.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            return format!("file ({})", display_path(config_file_path));
        }
    }

    "default".to_string()
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| "config file".to_string())
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
