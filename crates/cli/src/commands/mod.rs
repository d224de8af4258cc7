pub mod config;
pub mod run;
pub mod select;
pub mod tco;
pub mod verify;

use std::fs;
use std::path::Path;

use serde::Serialize;
use tierwise_core::config::{AppConfig, LoadOptions};
use tierwise_core::errors::ApplicationError;
use tierwise_core::ManufacturerResolver;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    /// Emit `document` on stdout, or write it to `output` and report where.
    pub fn document<T: Serialize>(command: &str, document: &T, output: Option<&Path>) -> Self {
        let rendered = match render_json(document) {
            Ok(rendered) => rendered,
            Err(error) => return Self::from_error(command, &error),
        };

        match output {
            None => Self { exit_code: 0, output: rendered },
            Some(path) => match write_file(path, &rendered) {
                Ok(()) => Self::success(command, format!("wrote {}", path.display())),
                Err(error) => Self::from_error(command, &error),
            },
        }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(options: &LoadOptions) -> Result<AppConfig, ApplicationError> {
    Ok(AppConfig::load(options.clone())?)
}

pub(crate) fn resolver_for(config: &AppConfig) -> ManufacturerResolver {
    ManufacturerResolver::with_aliases(&config.selection.manufacturer_aliases)
}

pub(crate) fn read_file(path: &Path) -> Result<String, ApplicationError> {
    fs::read_to_string(path).map_err(|error| ApplicationError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    })
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), ApplicationError> {
    fs::write(path, contents).map_err(|error| ApplicationError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    })
}

pub(crate) fn render_json<T: Serialize>(document: &T) -> Result<String, ApplicationError> {
    serde_json::to_string_pretty(document).map_err(|error| ApplicationError::Serialization {
        path: "<output>".to_string(),
        message: error.to_string(),
    })
}

pub(crate) fn source_label(path: &Path) -> String {
    path.display().to_string()
}
