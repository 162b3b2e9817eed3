//! # Output Configuration
//!
//! This module provides utilities for controlling CLI output appearance,
//! including color and emoji support based on terminal capabilities and
//! user preferences, and renders the human-readable run summary.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spec_jsonschema::output::{OutputConfig, summary_lines};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! for line in summary_lines(&config, &summary) {
//!     println!("{}", line);
//! }
//! ```

use std::env;

use console::style;

use crate::phases::RunSummary;
use crate::version::SpecVersion;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Lines describing a finished generation run.
pub fn summary_lines(config: &OutputConfig, summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for report in &summary.versions {
        let manifest = if report.manifest_synthesized {
            ", root manifest synthesized"
        } else {
            ""
        };
        let dangling = if report.dangling_references > 0 {
            format!(", {} dangling references", report.dangling_references)
        } else {
            String::new()
        };
        lines.push(format!(
            "{} {}: {} documents, {} bundles{}{}",
            emoji(config, "✅", "[OK]"),
            paint(config, &report.version, Paint::Bold),
            report.documents,
            report.bundles,
            manifest,
            dangling
        ));
    }

    for (version, reason) in &summary.skipped {
        lines.push(format!(
            "{} {}: skipped ({})",
            emoji(config, "⚠️ ", "[SKIP]"),
            paint(config, version, Paint::Warning),
            reason.lines().next().unwrap_or_default()
        ));
    }

    lines.push(format!(
        "{} versions generated, {} documents, {} bundles",
        summary.versions.len(),
        summary.documents(),
        summary.bundles()
    ));
    lines
}

/// Lines listing versions with their commits.
pub fn version_lines(config: &OutputConfig, versions: &[SpecVersion]) -> Vec<String> {
    versions
        .iter()
        .map(|version| {
            format!(
                "{}\t{}\t{}",
                paint(config, &version.label, Paint::Bold),
                version.git_ref,
                version.commit
            )
        })
        .collect()
}

enum Paint {
    Bold,
    Warning,
}

fn paint(config: &OutputConfig, text: &str, paint: Paint) -> String {
    if !config.use_color {
        return text.to_string();
    }
    let styled = match paint {
        Paint::Bold => style(text).bold(),
        Paint::Warning => style(text).yellow(),
    };
    styled.force_styling(true).to_string()
}
