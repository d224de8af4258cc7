use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::tco::ResaleConfidence;
use crate::selection::scorer::ScoreWeights;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub selection: SelectionConfig,
    pub tco: TcoConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectionConfig {
    pub weights: ScoreWeights,
    pub mention_bonus: MentionBonusConfig,
    pub enforce_tier_price_ratio: bool,
    pub max_tier_price_ratio: f64,
    /// Extra `canonical -> [aliases]` pairs on top of the built-in manufacturer table.
    pub manufacturer_aliases: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MentionBonusConfig {
    pub max_bonus: f64,
    pub half_saturation: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcoConfig {
    pub horizon_years: u32,
    pub category_horizons: BTreeMap<String, u32>,
    pub resale_thresholds: ResaleThresholds,
    pub min_resale_confidence: ResaleConfidence,
}

/// Minimum number of real transactions for each resale confidence level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResaleThresholds {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub horizon_years: Option<u32>,
    pub enforce_tier_price_ratio: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig {
                weights: ScoreWeights::default(),
                mention_bonus: MentionBonusConfig { max_bonus: 0.10, half_saturation: 5.0 },
                enforce_tier_price_ratio: false,
                max_tier_price_ratio: 3.0,
                manufacturer_aliases: BTreeMap::new(),
            },
            tco: TcoConfig {
                horizon_years: 3,
                category_horizons: BTreeMap::new(),
                resale_thresholds: ResaleThresholds { low: 1, medium: 3, high: 10 },
                min_resale_confidence: ResaleConfidence::Medium,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl TcoConfig {
    /// Ownership horizon for a category, falling back to the default horizon.
    pub fn horizon_for(&self, category: &str) -> u32 {
        self.category_horizons.get(category.trim()).copied().unwrap_or(self.horizon_years)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("tierwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(selection) = patch.selection {
            if let Some(weights) = selection.weights {
                if let Some(clicks) = weights.clicks {
                    self.selection.weights.clicks = clicks;
                }
                if let Some(cpc) = weights.cpc {
                    self.selection.weights.cpc = cpc;
                }
                if let Some(search_volume) = weights.search_volume {
                    self.selection.weights.search_volume = search_volume;
                }
                if let Some(competition) = weights.competition {
                    self.selection.weights.competition = competition;
                }
            }
            if let Some(max_bonus) = selection.max_bonus {
                self.selection.mention_bonus.max_bonus = max_bonus;
            }
            if let Some(half_saturation) = selection.bonus_half_saturation {
                self.selection.mention_bonus.half_saturation = half_saturation;
            }
            if let Some(enforce) = selection.enforce_tier_price_ratio {
                self.selection.enforce_tier_price_ratio = enforce;
            }
            if let Some(ratio) = selection.max_tier_price_ratio {
                self.selection.max_tier_price_ratio = ratio;
            }
            if let Some(aliases) = selection.manufacturer_aliases {
                self.selection.manufacturer_aliases.extend(aliases);
            }
        }

        if let Some(tco) = patch.tco {
            if let Some(horizon_years) = tco.horizon_years {
                self.tco.horizon_years = horizon_years;
            }
            if let Some(category_horizons) = tco.category_horizons {
                self.tco.category_horizons.extend(category_horizons);
            }
            if let Some(thresholds) = tco.resale_thresholds {
                if let Some(low) = thresholds.low {
                    self.tco.resale_thresholds.low = low;
                }
                if let Some(medium) = thresholds.medium {
                    self.tco.resale_thresholds.medium = medium;
                }
                if let Some(high) = thresholds.high {
                    self.tco.resale_thresholds.high = high;
                }
            }
            if let Some(min_confidence) = tco.min_resale_confidence {
                self.tco.min_resale_confidence = min_confidence.parse().map_err(|message| {
                    ConfigError::Validation(format!("tco.min_resale_confidence: {message}"))
                })?;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TIERWISE_SELECTION_WEIGHT_CLICKS") {
            self.selection.weights.clicks = parse_f64("TIERWISE_SELECTION_WEIGHT_CLICKS", &value)?;
        }
        if let Some(value) = read_env("TIERWISE_SELECTION_WEIGHT_CPC") {
            self.selection.weights.cpc = parse_f64("TIERWISE_SELECTION_WEIGHT_CPC", &value)?;
        }
        if let Some(value) = read_env("TIERWISE_SELECTION_WEIGHT_SEARCH_VOLUME") {
            self.selection.weights.search_volume =
                parse_f64("TIERWISE_SELECTION_WEIGHT_SEARCH_VOLUME", &value)?;
        }
        if let Some(value) = read_env("TIERWISE_SELECTION_WEIGHT_COMPETITION") {
            self.selection.weights.competition =
                parse_f64("TIERWISE_SELECTION_WEIGHT_COMPETITION", &value)?;
        }
        if let Some(value) = read_env("TIERWISE_SELECTION_MAX_BONUS") {
            self.selection.mention_bonus.max_bonus =
                parse_f64("TIERWISE_SELECTION_MAX_BONUS", &value)?;
        }
        if let Some(value) = read_env("TIERWISE_SELECTION_BONUS_HALF_SATURATION") {
            self.selection.mention_bonus.half_saturation =
                parse_f64("TIERWISE_SELECTION_BONUS_HALF_SATURATION", &value)?;
        }
        if let Some(value) = read_env("TIERWISE_SELECTION_ENFORCE_TIER_PRICE_RATIO") {
            self.selection.enforce_tier_price_ratio =
                parse_bool("TIERWISE_SELECTION_ENFORCE_TIER_PRICE_RATIO", &value)?;
        }
        if let Some(value) = read_env("TIERWISE_SELECTION_MAX_TIER_PRICE_RATIO") {
            self.selection.max_tier_price_ratio =
                parse_f64("TIERWISE_SELECTION_MAX_TIER_PRICE_RATIO", &value)?;
        }

        if let Some(value) = read_env("TIERWISE_TCO_HORIZON_YEARS") {
            self.tco.horizon_years = parse_u32("TIERWISE_TCO_HORIZON_YEARS", &value)?;
        }
        if let Some(value) = read_env("TIERWISE_TCO_MIN_RESALE_CONFIDENCE") {
            self.tco.min_resale_confidence =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "TIERWISE_TCO_MIN_RESALE_CONFIDENCE".to_string(),
                    value: value.clone(),
                })?;
        }

        let log_level =
            read_env("TIERWISE_LOGGING_LEVEL").or_else(|| read_env("TIERWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TIERWISE_LOGGING_FORMAT").or_else(|| read_env("TIERWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(horizon_years) = overrides.horizon_years {
            self.tco.horizon_years = horizon_years;
        }
        if let Some(enforce) = overrides.enforce_tier_price_ratio {
            self.selection.enforce_tier_price_ratio = enforce;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_selection(&self.selection)?;
        validate_tco(&self.tco)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("tierwise.toml"), PathBuf::from("config/tierwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_selection(selection: &SelectionConfig) -> Result<(), ConfigError> {
    let weights = selection.weights;
    let parts = [weights.clicks, weights.cpc, weights.search_volume, weights.competition];
    if parts.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
        return Err(ConfigError::Validation(
            "selection.weights must be finite and non-negative".to_string(),
        ));
    }
    let sum: f64 = parts.iter().sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(ConfigError::Validation(format!(
            "selection.weights must sum to 1.0 (got {sum:.4}) so total_score stays within 0..=1"
        )));
    }

    let bonus = selection.mention_bonus;
    if !(0.0..=1.0).contains(&bonus.max_bonus) {
        return Err(ConfigError::Validation(
            "selection.max_bonus must be in range 0.0..=1.0".to_string(),
        ));
    }
    if !bonus.half_saturation.is_finite() || bonus.half_saturation <= 0.0 {
        return Err(ConfigError::Validation(
            "selection.bonus_half_saturation must be greater than zero".to_string(),
        ));
    }

    if !selection.max_tier_price_ratio.is_finite() || selection.max_tier_price_ratio <= 1.0 {
        return Err(ConfigError::Validation(
            "selection.max_tier_price_ratio must be greater than 1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_tco(tco: &TcoConfig) -> Result<(), ConfigError> {
    if !(1..=10).contains(&tco.horizon_years) {
        return Err(ConfigError::Validation("tco.horizon_years must be in range 1..=10".to_string()));
    }

    for (category, years) in &tco.category_horizons {
        if !(1..=10).contains(years) {
            return Err(ConfigError::Validation(format!(
                "tco.category_horizons.{category} must be in range 1..=10"
            )));
        }
    }

    if tco.min_resale_confidence == ResaleConfidence::None {
        return Err(ConfigError::Validation(
            "tco.min_resale_confidence must be low, medium or high".to_string(),
        ));
    }

    let thresholds = tco.resale_thresholds;
    if thresholds.low == 0 || thresholds.low > thresholds.medium || thresholds.medium > thresholds.high
    {
        return Err(ConfigError::Validation(
            "tco.resale_thresholds must satisfy 1 <= low <= medium <= high".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    selection: Option<SelectionPatch>,
    tco: Option<TcoPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SelectionPatch {
    weights: Option<WeightsPatch>,
    max_bonus: Option<f64>,
    bonus_half_saturation: Option<f64>,
    enforce_tier_price_ratio: Option<bool>,
    max_tier_price_ratio: Option<f64>,
    manufacturer_aliases: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
struct WeightsPatch {
    clicks: Option<f64>,
    cpc: Option<f64>,
    search_volume: Option<f64>,
    competition: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct TcoPatch {
    horizon_years: Option<u32>,
    category_horizons: Option<BTreeMap<String, u32>>,
    resale_thresholds: Option<ResaleThresholdsPatch>,
    min_resale_confidence: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResaleThresholdsPatch {
    low: Option<u32>,
    medium: Option<u32>,
    high: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::domain::tco::ResaleConfidence;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_and_match_documented_values() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.tco.horizon_years == 3, "default horizon should be 3 years")?;
        ensure((config.selection.weights.clicks - 0.4).abs() < 1e-12, "clicks weight is 0.4")?;
        ensure(
            config.tco.min_resale_confidence == ResaleConfidence::Medium,
            "resale below medium confidence is ignored by default",
        )?;
        ensure(!config.selection.enforce_tier_price_ratio, "tier ratio enforcement is opt-in")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact logs by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_TIERWISE_PET_HORIZON", "2");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("tierwise.toml");
            fs::write(
                &path,
                r#"
[tco]
horizon_years = 3

[tco.category_horizons]
"펫드라이어" = ${TEST_TIERWISE_PET_HORIZON}
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.tco.horizon_for("펫드라이어") == 2, "category horizon from file")?;
            ensure(config.tco.horizon_for("로봇청소기") == 3, "other categories use default")?;
            Ok(())
        })();

        clear_vars(&["TEST_TIERWISE_PET_HORIZON"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TIERWISE_LOG_LEVEL", "warn");
        env::set_var("TIERWISE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["TIERWISE_LOG_LEVEL", "TIERWISE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TIERWISE_TCO_HORIZON_YEARS", "2");
        env::set_var("TIERWISE_SELECTION_MAX_BONUS", "0.05");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("tierwise.toml");
            fs::write(
                &path,
                r#"
[selection]
max_bonus = 0.2
max_tier_price_ratio = 4.0

[tco]
horizon_years = 5

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    horizon_years: Some(1),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.tco.horizon_years == 1, "override horizon should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                (config.selection.mention_bonus.max_bonus - 0.05).abs() < 1e-12,
                "env bonus should win over file",
            )?;
            ensure(
                (config.selection.max_tier_price_ratio - 4.0).abs() < 1e-12,
                "file ratio should win over default",
            )?;
            Ok(())
        })();

        clear_vars(&["TIERWISE_TCO_HORIZON_YEARS", "TIERWISE_SELECTION_MAX_BONUS"]);
        result
    }

    #[test]
    fn weights_that_do_not_sum_to_one_fail_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TIERWISE_SELECTION_WEIGHT_CLICKS", "0.9");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("selection.weights")
            );
            ensure(has_message, "validation failure should mention selection.weights")
        })();

        clear_vars(&["TIERWISE_SELECTION_WEIGHT_CLICKS"]);
        result
    }

    #[test]
    fn invalid_env_number_is_reported_with_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TIERWISE_TCO_HORIZON_YEARS", "three");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "TIERWISE_TCO_HORIZON_YEARS"
                ),
                "error should name the offending variable",
            )
        })();

        clear_vars(&["TIERWISE_TCO_HORIZON_YEARS"]);
        result
    }

    #[test]
    fn none_is_rejected_as_minimum_resale_confidence() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TIERWISE_TCO_MIN_RESALE_CONFIDENCE", "none");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected validation failure for `none`".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::Validation(ref message)
                        if message.contains("tco.min_resale_confidence")
                ),
                "validation failure should mention tco.min_resale_confidence",
            )
        })();

        clear_vars(&["TIERWISE_TCO_MIN_RESALE_CONFIDENCE"]);
        result
    }

    #[test]
    fn missing_required_file_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("absent.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "required config file should be reported missing",
        )
    }
}
