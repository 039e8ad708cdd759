use crate::app::models::{LogFormat, RawCliOptions};

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// Rebuilds the invoking command line from the flags the user actually typed.
///
/// Defaults are never rendered, and `--hide-command` is left out since the
/// command only shows up when it is not set.
pub fn render_command(glob_pattern: &str, raw: &RawCliOptions) -> String {
    let mut parts: Vec<String> = vec![PROGRAM_NAME.to_string()];

    if glob_pattern.contains(char::is_whitespace) || glob_pattern.contains('*') {
        parts.push(quote(glob_pattern));
    } else {
        parts.push(glob_pattern.to_string());
    }

    if let Some(out_dir) = &raw.out_dir {
        parts.push("--out-dir".into());
        parts.push(out_dir.clone());
    }
    if let Some(header) = &raw.header {
        parts.push("--header".into());
        parts.push(quote(header));
    }
    if let Some(footer) = &raw.footer {
        parts.push("--footer".into());
        parts.push(quote(footer));
    }
    if let Some(config) = &raw.config {
        parts.push("--config".into());
        parts.push(config.clone());
    }
    if raw.remove_source == Some(true) {
        parts.push("--remove-source".into());
    }
    if let Some(format) = raw.log_format.filter(|f| *f != LogFormat::Text) {
        parts.push("--log-format".into());
        parts.push(format.to_string());
    }
    if raw.quiet == Some(true) {
        parts.push("--quiet".into());
    }

    parts.join(" ")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value)
}
