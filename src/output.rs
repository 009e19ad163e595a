//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and, where output is printed in one go, a `print_*` wrapper
//! that writes to stdout. Format functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Publish
//!
//! ```text
//! 404.html
//!     copied → 1 file
//! carol.jpg
//!     Jpeg 256x256 → 5 files (48213 bytes each)
//! dave.svg
//!     passed through (decode failed: unrecognized image format) → 5 files
//! archive/ skipped
//! ==> Done: 3 assets (1 normalized, 1 passed through, 1 copied), 11 files written, 1 directories skipped
//! ```
//!
//! ## Check
//!
//! ```text
//! carol.jpg → carol
//!     carol.png
//!     f650a6273adbe8161b817c0d8362d9b40afa42fafae6925155f7d5c0c377bad5
//!     ...
//! ```
//!
//! ## Targets
//!
//! ```text
//! alice@circlecat.org
//!     sha256  f650a6273adbe8161b817c0d8362d9b40afa42fafae6925155f7d5c0c377bad5
//!     md5     83e1ffb33fc9bb3ed75ae6e4a5dd4b39
//! ```

use crate::identity::Identity;
use crate::publish::{AssetKind, AssetOutcome, Plan, PublishEvent, PublishSummary};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn files(n: usize) -> String {
    if n == 1 {
        "1 file".to_string()
    } else {
        format!("{n} files")
    }
}

// ============================================================================
// Publish
// ============================================================================

/// Format a single publish progress event as display lines.
pub fn format_publish_event(event: &PublishEvent) -> Vec<String> {
    match event {
        PublishEvent::DirectorySkipped { name } => vec![format!("{name}/ skipped")],
        PublishEvent::AssetPublished {
            name,
            outcome,
            targets,
            bytes,
        } => {
            let detail = match outcome {
                AssetOutcome::Copied => format!("copied → {}", files(targets.len())),
                AssetOutcome::Normalized {
                    width,
                    height,
                    source_format,
                } => {
                    let format = source_format
                        .map(|f| format!("{f:?}"))
                        .unwrap_or_else(|| "image".to_string());
                    format!(
                        "{format} {width}x{height} → {} ({bytes} bytes each)",
                        files(targets.len())
                    )
                }
                AssetOutcome::PassedThrough { reason } => {
                    format!("passed through ({reason}) → {}", files(targets.len()))
                }
            };
            vec![name.clone(), format!("{}{}", indent(1), detail)]
        }
    }
}

/// Format the closing line of a publish run.
pub fn format_summary(summary: &PublishSummary) -> String {
    format!("==> Done: {summary}")
}

// ============================================================================
// Check
// ============================================================================

/// Format a dry-run plan: every source file with the names it would be
/// written under.
pub fn format_plan(plan: &Plan) -> Vec<String> {
    let mut lines = Vec::new();
    for asset in &plan.assets {
        match &asset.kind {
            AssetKind::Verbatim => lines.push(format!("{} (verbatim)", asset.name)),
            AssetKind::Avatar { user } => lines.push(format!("{} → {}", asset.name, user)),
        }
        for target in &asset.targets {
            lines.push(format!("{}{}", indent(1), target));
        }
    }
    for dir in &plan.skipped_dirs {
        lines.push(format!("{dir}/ skipped"));
    }
    lines
}

/// Print a dry-run plan to stdout.
pub fn print_plan(plan: &Plan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Targets
// ============================================================================

/// Format derived identities grouped by email address.
pub fn format_identities(identities: &[Identity]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<&str> = None;
    for identity in identities {
        if current != Some(identity.email.as_str()) {
            lines.push(identity.email.clone());
            current = Some(identity.email.as_str());
        }
        lines.push(format!(
            "{}{:<8}{}",
            indent(1),
            identity.scheme.name(),
            identity.filename
        ));
    }
    lines
}

/// Print derived identities to stdout.
pub fn print_identities(identities: &[Identity]) {
    for line in format_identities(identities) {
        println!("{}", line);
    }
}
