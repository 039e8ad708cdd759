use crate::app::errors::AppError;
use crate::app::models::{LogFormat, RawCliOptions};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mermaid-markdown-wrap",
    author,
    version,
    about = "Convert .mmd/.mermaid files to Markdown with mermaid code blocks",
    args_conflicts_with_subcommands = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// File path or glob pattern (e.g. 'file.mmd', '*.mermaid', '**/*.{mmd,mermaid}')
    pub input: Option<String>,

    /// Output directory (default: same as input file)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<String>,

    /// Header text to prepend
    #[arg(long, value_name = "TEXT")]
    pub header: Option<String>,

    /// Footer text to append
    #[arg(long, value_name = "TEXT")]
    pub footer: Option<String>,

    /// Remove source .mmd/.mermaid files after conversion
    #[arg(long)]
    pub remove_source: bool,

    /// Hide the generation command in output files
    #[arg(long)]
    pub hide_command: bool,

    /// Log output format: text or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Suppress non-error output
    #[arg(long)]
    pub quiet: bool,

    /// Config file path
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive wizard to create a configuration file
    Init(InitArgs),

    /// Show current configuration (config file merged with defaults)
    ConfigShow {
        /// Config file to load instead of searching the default locations
        config_file: Option<PathBuf>,
    },

    /// Validate a configuration file
    ConfigValidate {
        /// Config file to validate instead of searching the default locations
        config_file: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Skip prompts and use default settings
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Overwrite an existing config file when used with --yes
    #[arg(long, requires = "yes")]
    pub force: bool,
}

impl Cli {
    /// The options exactly as typed. Boolean flags can only be switched on,
    /// so an unset flag is `None` rather than `Some(false)`.
    pub fn raw_options(&self) -> Result<RawCliOptions, AppError> {
        let log_format = self
            .log_format
            .as_deref()
            .map(str::parse::<LogFormat>)
            .transpose()
            .map_err(|message: String| AppError::InvalidOptions(format!("--log-format: {}", message)))?;

        Ok(RawCliOptions {
            out_dir: self.out_dir.clone(),
            header: self.header.clone(),
            footer: self.footer.clone(),
            remove_source: self.remove_source.then_some(true),
            hide_command: self.hide_command.then_some(true),
            log_format,
            quiet: self.quiet.then_some(true),
            config: self.config.clone(),
        })
    }
}
