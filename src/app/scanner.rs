use crate::app::errors::AppError;
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::path::{Path, PathBuf};

const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

/// Expands a glob pattern into the list of matching files.
pub struct Scanner {
    pattern: String,
    root: PathBuf,
    matcher: Option<GlobMatcher>,
    max_depth: Option<usize>,
}

impl Scanner {
    pub fn new(pattern: &str) -> Result<Self, AppError> {
        let (root, rest) = split_pattern(pattern);

        if rest.is_empty() {
            return Ok(Self {
                pattern: pattern.to_string(),
                root,
                matcher: None,
                max_depth: None,
            });
        }

        let matcher = GlobBuilder::new(&rest)
            .literal_separator(true)
            .build()
            .map_err(|e| AppError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.kind().to_string(),
            })?
            .compile_matcher();

        // Without `**` no match can sit deeper than the pattern's own segments.
        let max_depth = (!rest.contains("**")).then(|| rest.split('/').count());

        Ok(Self {
            pattern: pattern.to_string(),
            root,
            matcher: Some(matcher),
            max_depth,
        })
    }

    /// Files matching the pattern, sorted by path.
    pub fn scan(&self) -> Vec<PathBuf> {
        let Some(matcher) = &self.matcher else {
            // A pattern without wildcards names a single file.
            return if self.root.is_file() {
                vec![self.root.clone()]
            } else {
                Vec::new()
            };
        };

        let walk_root = if self.root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.root.as_path()
        };
        if !walk_root.is_dir() {
            return Vec::new();
        }

        let walker = WalkBuilder::new(walk_root)
            .standard_filters(false)
            .hidden(true)
            .max_depth(self.max_depth)
            .build();

        let mut files = Vec::new();
        for result in walker {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|t| t.is_file()) {
                        continue;
                    }
                    let Some(relative) = diff_paths(entry.path(), walk_root) else {
                        continue;
                    };
                    if matcher.is_match(&relative) {
                        files.push(self.root.join(relative));
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        files.sort();
        log::debug!("Pattern {:?} matched {} file(s)", self.pattern, files.len());
        files
    }
}

/// Splits a pattern into its literal leading directory and the glob remainder.
fn split_pattern(pattern: &str) -> (PathBuf, String) {
    let segments: Vec<&str> = pattern.split('/').collect();
    let first_glob = segments
        .iter()
        .position(|segment| segment.contains(GLOB_META));

    match first_glob {
        None => (PathBuf::from(pattern), String::new()),
        Some(index) => {
            let literal = segments[..index].join("/");
            let root = if literal.is_empty() && pattern.starts_with('/') {
                PathBuf::from("/")
            } else {
                PathBuf::from(literal)
            };
            (root, segments[index..].join("/"))
        }
    }
}
