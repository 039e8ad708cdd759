use crate::app::command::render_command;
use crate::app::errors::AppError;
use crate::app::formatter::MarkdownFormatter;
use crate::app::models::{BatchReport, ConversionOutcome, ProcessingOptions, RawCliOptions};
use crate::app::paths::resolve_output_path;
use crate::app::scanner::Scanner;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinHandle;

/// Converts every file matched by `glob_pattern` and reports per-file results.
///
/// Only two things abort the whole batch: the pattern matching nothing and the
/// output directory not being creatable. Any other failure is recorded on the
/// file it happened to while the rest of the batch carries on.
pub async fn convert_all(
    glob_pattern: &str,
    options: &ProcessingOptions,
    raw: &RawCliOptions,
) -> Result<BatchReport> {
    let pattern = glob_pattern.to_string();
    let files = tokio::task::spawn_blocking(move || Scanner::new(&pattern).map(|scanner| scanner.scan()))
        .await
        .context("File discovery task failed")??;
    if files.is_empty() {
        return Err(AppError::NoFilesFound {
            pattern: glob_pattern.to_string(),
        }
        .into());
    }

    if let Some(out_dir) = &options.out_dir {
        fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    }

    let command_info: Option<Arc<str>> =
        (!options.hide_command).then(|| render_command(glob_pattern, raw).into());
    let options = Arc::new(options.clone());

    log::info!("Converting {} file(s)", files.len());

    // The first source claiming an output path wins; later ones fail without touching it.
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let pending: Vec<(PathBuf, Result<JoinHandle<ConversionOutcome>, ConversionOutcome>)> = files
        .into_iter()
        .map(|source| {
            let output = resolve_output_path(&source, &options);
            if let Some(first) = claimed.get(&output) {
                let reason = format!(
                    "output {} is already written from {}",
                    output.display(),
                    first.display()
                );
                return (source.clone(), Err(ConversionOutcome::failure(source, output, reason)));
            }
            claimed.insert(output, source.clone());

            let options = Arc::clone(&options);
            let command_info = command_info.clone();
            let task_source = source.clone();
            let handle = tokio::spawn(async move {
                convert_file(task_source, &options, command_info.as_deref()).await
            });
            (source, Ok(handle))
        })
        .collect();

    // Awaiting in spawn order keeps outcomes in discovery order.
    let mut outcomes = Vec::with_capacity(pending.len());
    for (source, task) in pending {
        let outcome = match task {
            Ok(handle) => match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    let output = resolve_output_path(&source, &options);
                    ConversionOutcome::failure(source, output, format!("conversion task failed: {}", join_err))
                }
            },
            Err(duplicate) => duplicate,
        };
        outcomes.push(outcome);
    }

    Ok(BatchReport::from_outcomes(outcomes))
}

async fn convert_file(
    source: PathBuf,
    options: &ProcessingOptions,
    command_info: Option<&str>,
) -> ConversionOutcome {
    let output = resolve_output_path(&source, options);

    match write_markdown(&source, &output, options, command_info).await {
        Ok(()) => ConversionOutcome::success(source, output),
        Err(err) => {
            log::debug!("Conversion of {} failed: {:#}", source.display(), err);
            ConversionOutcome::failure(source, output, format!("{:#}", err))
        }
    }
}

async fn write_markdown(
    source: &Path,
    output: &Path,
    options: &ProcessingOptions,
    command_info: Option<&str>,
) -> Result<()> {
    let content = fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read {}", source.display()))?;

    let markdown = MarkdownFormatter::format(&content, options, command_info);

    fs::write(output, markdown)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if options.remove_source {
        if is_same_file(source, output).await {
            log::warn!(
                "Keeping {}: it was overwritten by its own output",
                source.display()
            );
        } else {
            fs::remove_file(source)
                .await
                .with_context(|| format!("Failed to remove {}", source.display()))?;
        }
    }

    Ok(())
}

/// Compares resolved paths so `./a.md`, `sub/../a.md` and symlinks all match.
/// Anything that cannot be resolved counts as the same file, keeping the source.
async fn is_same_file(source: &Path, output: &Path) -> bool {
    if source == output {
        return true;
    }
    match (fs::canonicalize(source).await, fs::canonicalize(output).await) {
        (Ok(source), Ok(output)) => source == output,
        _ => true,
    }
}
