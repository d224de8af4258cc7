use std::path::PathBuf;

use tierwise_core::boundary::decode;
use tierwise_core::errors::{ApplicationError, DomainError};
use tierwise_core::{verify_export, TcoExport};

use crate::commands::{read_file, source_label, CommandResult};

#[derive(Clone, Debug, Default)]
pub struct VerifyArgs {
    pub export: PathBuf,
}

pub fn run(args: &VerifyArgs) -> CommandResult {
    let export = match load_export(args) {
        Ok(export) => export,
        Err(error) => return CommandResult::from_error("verify", &error),
    };

    let issues = verify_export(&export);
    if issues.is_empty() {
        return CommandResult::success(
            "verify",
            format!("export verified: {} products", export.products.len()),
        );
    }

    let details = issues
        .iter()
        .map(|issue| format!("{}: {}", issue.product, issue.message))
        .collect::<Vec<_>>();
    let violation = DomainError::InvariantViolation(format!(
        "{} issue(s): {}",
        issues.len(),
        details.join("; ")
    ));
    CommandResult::from_error("verify", &ApplicationError::Domain(violation))
}

fn load_export(args: &VerifyArgs) -> Result<TcoExport, ApplicationError> {
    decode(&source_label(&args.export), &read_file(&args.export)?)
}
