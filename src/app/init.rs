use crate::app::command::PROGRAM_NAME;
use crate::app::errors::AppError;
use crate::app::models::{ConfigFileOptions, LogFormat};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub const SCHEMA_URL: &str = "https://unpkg.com/mermaid-markdown-wrap/schema/config.schema.json";

/// Config file formats `init` can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub const ALL: [ConfigFormat; 3] = [ConfigFormat::Json, ConfigFormat::Yaml, ConfigFormat::Toml];

    pub fn label(self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON (.json)",
            ConfigFormat::Yaml => "YAML (.yaml)",
            ConfigFormat::Toml => "TOML (.toml)",
        }
    }

    pub fn file_name(self) -> String {
        let extension = match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
        };
        format!(".{}rc.{}", PROGRAM_NAME, extension)
    }
}

/// Renders `config` in the given format. JSON gets a `$schema` pointer.
pub fn generate_config_content(config: &ConfigFileOptions, format: ConfigFormat) -> Result<String> {
    let content = match format {
        ConfigFormat::Json => {
            let mut value = serde_json::to_value(config)?;
            if let Value::Object(map) = &mut value {
                map.insert("$schema".to_string(), Value::String(SCHEMA_URL.to_string()));
            }
            let mut text = serde_json::to_string_pretty(&value)?;
            text.push('\n');
            text
        }
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        ConfigFormat::Toml => toml::to_string(config)?,
    };
    Ok(content)
}

/// Asks the questions of the init wizard.
///
/// Every method fails with [`AppError::UserCancelled`] when the user backs out.
pub trait Prompter {
    fn select(&mut self, message: &str, choices: &[&str], default: usize) -> Result<usize>;
    fn text(&mut self, message: &str, default: &str) -> Result<String>;
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
}

/// Line-based prompter: questions go to `output`, answers are read from `input`.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "? {} ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::UserCancelled.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn select(&mut self, message: &str, choices: &[&str], default: usize) -> Result<usize> {
        writeln!(self.output, "? {}", message)?;
        for (index, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", index + 1, choice)?;
        }

        loop {
            let answer = self.ask(&format!("Choice [{}]:", default + 1))?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.output, "  Enter a number between 1 and {}", choices.len())?,
            }
        }
    }

    fn text(&mut self, message: &str, default: &str) -> Result<String> {
        let prompt = if default.is_empty() {
            format!("{}:", message)
        } else {
            format!("{} [{}]:", message, default)
        };
        let answer = self.ask(&prompt)?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("{} ({})", message, hint))?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "  Please answer y or n")?,
            }
        }
    }
}

/// Runs the wizard. Only answers that differ from the defaults end up in the config.
pub fn run_prompts(prompter: &mut dyn Prompter) -> Result<(ConfigFileOptions, ConfigFormat)> {
    let labels: Vec<&str> = ConfigFormat::ALL.iter().map(|f| f.label()).collect();
    let format = ConfigFormat::ALL
        .get(prompter.select("Choose a config file format", &labels, 0)?)
        .copied()
        .unwrap_or(ConfigFormat::Json);

    let out_dir = prompter.text("Output directory (leave empty for same as input)", "")?;
    let header = prompter.text("Header text to prepend to each converted file", "")?;
    let footer = prompter.text("Footer text to append to each converted file", "")?;
    let remove_source = prompter.confirm("Remove original .mmd files after conversion?", false)?;
    let hide_command = prompter.confirm("Hide the generation command in output files?", false)?;
    let log_format = match prompter.select(
        "Log output format",
        &["Text (human-readable)", "JSON (machine-readable)"],
        0,
    )? {
        1 => LogFormat::Json,
        _ => LogFormat::Text,
    };
    let quiet = prompter.confirm("Suppress non-error output?", false)?;

    let out_dir = out_dir.trim();
    let config = ConfigFileOptions {
        out_dir: (!out_dir.is_empty()).then(|| out_dir.to_string()),
        header: (!header.is_empty()).then_some(header),
        footer: (!footer.is_empty()).then_some(footer),
        remove_source: remove_source.then_some(true),
        hide_command: hide_command.then_some(true),
        log_format: (log_format != LogFormat::Text).then_some(log_format),
        quiet: quiet.then_some(true),
    };

    Ok((config, format))
}

pub struct InitRequest {
    /// Skip the wizard and write an all-defaults JSON config.
    pub yes: bool,
    /// With `yes`, replace an existing file.
    pub force: bool,
}

/// Creates a config file in `dir`. Returns `None` when the user chose not
/// to overwrite an existing file.
pub fn init_config(
    dir: &Path,
    request: &InitRequest,
    prompter: &mut dyn Prompter,
) -> Result<Option<PathBuf>> {
    let (config, format) = if request.yes {
        (ConfigFileOptions::default(), ConfigFormat::Json)
    } else {
        run_prompts(prompter)?
    };

    let file_name = format.file_name();
    let path = dir.join(&file_name);

    if path.exists() {
        if request.yes {
            if !request.force {
                return Err(AppError::ConfigExists { path }.into());
            }
            log::warn!("Overwriting {}", path.display());
        } else if !prompter.confirm(
            &format!("{} already exists. Do you want to overwrite it?", file_name),
            false,
        )? {
            return Ok(None);
        }
    }

    let content = generate_config_content(&config, format)?;
    fs::write(&path, content).with_context(|| format!("Failed to create {}", file_name))?;

    Ok(Some(path))
}
