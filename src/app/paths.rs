use crate::app::models::ProcessingOptions;
use std::path::{Path, PathBuf};

pub const OUTPUT_EXTENSION: &str = "md";

/// Output file for `input`: same stem with a `.md` extension, placed in
/// `out_dir` when set, otherwise next to the input.
pub fn resolve_output_path(input: &Path, options: &ProcessingOptions) -> PathBuf {
    let dir = match &options.out_dir {
        Some(out_dir) => out_dir.as_path(),
        None => input.parent().unwrap_or_else(|| Path::new("")),
    };
    let stem = input.file_stem().unwrap_or_default();

    let mut file_name = stem.to_os_string();
    file_name.push(".");
    file_name.push(OUTPUT_EXTENSION);

    dir.join(file_name)
}
