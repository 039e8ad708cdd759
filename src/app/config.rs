use crate::app::command::PROGRAM_NAME;
use crate::app::errors::{AppError, ValidationIssue};
use crate::app::models::{ConfigFileOptions, LogFormat, ProcessingOptions, RawCliOptions};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_EXTENSIONS: [&str; 4] = ["json", "yaml", "yml", "toml"];

/// A configuration file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    /// Options live under the package-name key of a `package.json`.
    pub in_package_json: bool,
}

impl ConfigLocation {
    /// A file named by the user; a `package.json` is read through its package-name key.
    pub fn explicit(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            in_package_json: path.file_name().is_some_and(|n| n == "package.json"),
        }
    }
}

/// Config file options together with where they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    pub options: ConfigFileOptions,
    pub source: Option<PathBuf>,
}

/// User-level config directory, e.g. `~/.config/mermaid-markdown-wrap`.
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PROGRAM_NAME))
}

/// Candidate files in search order, first existing one wins.
fn candidate_files(cwd: &Path, user_dir: Option<&Path>) -> Vec<PathBuf> {
    let rc_name = format!(".{}rc", PROGRAM_NAME);
    let dot_config_name = format!("{}rc", PROGRAM_NAME);
    let dot_config = cwd.join(".config");

    let mut candidates = vec![cwd.join(&rc_name)];
    candidates.extend(
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| cwd.join(format!("{}.{}", rc_name, ext))),
    );
    candidates.push(dot_config.join(&dot_config_name));
    candidates.extend(
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| dot_config.join(format!("{}.{}", dot_config_name, ext))),
    );

    if let Some(user_dir) = user_dir {
        candidates.extend(
            ["toml", "json", "yaml", "yml"]
                .iter()
                .map(|ext| user_dir.join(format!("config.{}", ext))),
        );
    }

    candidates
}

/// Looks for a configuration file starting with `package.json` in `cwd`.
pub fn discover_config_file(cwd: &Path, user_dir: Option<&Path>) -> Option<ConfigLocation> {
    let package_json = cwd.join("package.json");
    if package_json.is_file() && package_json_has_config(&package_json) {
        return Some(ConfigLocation {
            path: package_json,
            in_package_json: true,
        });
    }

    candidate_files(cwd, user_dir)
        .into_iter()
        .find(|path| path.is_file())
        .map(|path| ConfigLocation {
            path,
            in_package_json: false,
        })
}

fn package_json_has_config(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        .is_some_and(|value| value.get(PROGRAM_NAME).is_some())
}

/// Parses a config file into a generic value, picking the parser by extension.
fn parse_config_text(path: &Path, text: &str) -> Result<Value, String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => serde_json::from_str(text).map_err(|e| e.to_string()),
        Some("yaml") | Some("yml") | None => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        Some("toml") => toml::from_str(text).map_err(|e| e.to_string()),
        Some(ext @ ("js" | "ts" | "cjs" | "mjs" | "cts" | "mts")) => Err(format!(
            "script config files (.{}) are not supported; use JSON, YAML or TOML",
            ext
        )),
        Some(ext) => Err(format!("no loader for .{} files", ext)),
    }
}

/// Reads the raw configuration value stored at `location`.
pub fn read_config_value(location: &ConfigLocation) -> Result<Value, AppError> {
    let load_error = |message: String| AppError::ConfigLoad {
        path: location.path.clone(),
        message,
    };

    let text = fs::read_to_string(&location.path).map_err(|e| load_error(e.to_string()))?;
    let value = parse_config_text(&location.path, &text).map_err(load_error)?;

    if location.in_package_json {
        return Ok(value.get(PROGRAM_NAME).cloned().unwrap_or(Value::Null));
    }
    Ok(value)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(_) => "Array".to_string(),
        Value::Object(_) => "Object".to_string(),
    }
}

fn type_issue(path: &str, expected: &str, received: &Value) -> ValidationIssue {
    ValidationIssue::new(
        path,
        format!(
            "Invalid type: Expected {} but received {}",
            expected,
            describe(received)
        ),
    )
}

fn string_field(
    map: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        other => {
            issues.push(type_issue(key, "string", other));
            None
        }
    }
}

fn bool_field(
    map: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<bool> {
    match map.get(key)? {
        Value::Bool(b) => Some(*b),
        other => {
            issues.push(type_issue(key, "boolean", other));
            None
        }
    }
}

fn log_format_field(
    map: &Map<String, Value>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<LogFormat> {
    let value = map.get("logFormat")?;
    let parsed = value
        .as_str()
        .ok_or_else(|| type_issue("logFormat", "(\"text\" | \"json\")", value).message)
        .and_then(|s| s.parse::<LogFormat>());

    match parsed {
        Ok(format) => Some(format),
        Err(message) => {
            issues.push(ValidationIssue::new("logFormat", message));
            None
        }
    }
}

/// Checks a raw config value against the option schema.
///
/// Unknown keys such as `$schema` are ignored. An empty document counts as
/// an empty config.
pub fn validate_config(value: &Value) -> Result<ConfigFileOptions, Vec<ValidationIssue>> {
    let map = match value {
        Value::Null => return Ok(ConfigFileOptions::default()),
        Value::Object(map) => map,
        other => return Err(vec![type_issue("root", "Object", other)]),
    };

    let mut issues = Vec::new();
    let options = ConfigFileOptions {
        out_dir: string_field(map, "outDir", &mut issues),
        header: string_field(map, "header", &mut issues),
        footer: string_field(map, "footer", &mut issues),
        remove_source: bool_field(map, "removeSource", &mut issues),
        hide_command: bool_field(map, "hideCommand", &mut issues),
        log_format: log_format_field(map, &mut issues),
        quiet: bool_field(map, "quiet", &mut issues),
    };

    for key in map.keys() {
        if !is_known_key(key) {
            log::debug!("Ignoring unknown config key {:?}", key);
        }
    }

    if issues.is_empty() {
        Ok(options)
    } else {
        Err(issues)
    }
}

fn is_known_key(key: &str) -> bool {
    matches!(
        key,
        "$schema"
            | "outDir"
            | "header"
            | "footer"
            | "removeSource"
            | "hideCommand"
            | "logFormat"
            | "quiet"
    )
}

/// Reads and validates the configuration stored at `location`.
pub fn load_config_file(location: &ConfigLocation) -> Result<ConfigFileOptions, AppError> {
    let value = read_config_value(location)?;
    validate_config(&value).map_err(|issues| AppError::ConfigInvalid {
        path: location.path.clone(),
        issues,
    })
}

/// Loads config options.
///
/// An explicit path must load cleanly. Without one, the search result is
/// used when it loads and silently skipped when it does not.
pub fn load_config(
    explicit: Option<&Path>,
    cwd: &Path,
    user_dir: Option<&Path>,
) -> Result<LoadedConfig, AppError> {
    if let Some(path) = explicit {
        let location = ConfigLocation::explicit(path);
        let options = load_config_file(&location)?;
        log::info!("Using config file {}", path.display());
        return Ok(LoadedConfig {
            options,
            source: Some(location.path),
        });
    }

    let Some(location) = discover_config_file(cwd, user_dir) else {
        log::debug!("No config file found, using defaults");
        return Ok(LoadedConfig::default());
    };

    match load_config_file(&location) {
        Ok(options) => {
            log::info!("Using config file {}", location.path.display());
            Ok(LoadedConfig {
                options,
                source: Some(location.path),
            })
        }
        Err(err) => {
            log::warn!("Ignoring config file: {}", err);
            Ok(LoadedConfig::default())
        }
    }
}

/// Merges options with precedence CLI > config file > defaults.
pub fn combine_options(raw: &RawCliOptions, config: &ConfigFileOptions) -> ProcessingOptions {
    let defaults = ProcessingOptions::default();

    ProcessingOptions {
        out_dir: raw
            .out_dir
            .clone()
            .or_else(|| config.out_dir.clone())
            .map(PathBuf::from),
        header: raw
            .header
            .clone()
            .or_else(|| config.header.clone())
            .unwrap_or(defaults.header),
        footer: raw
            .footer
            .clone()
            .or_else(|| config.footer.clone())
            .unwrap_or(defaults.footer),
        remove_source: raw
            .remove_source
            .or(config.remove_source)
            .unwrap_or(defaults.remove_source),
        hide_command: raw
            .hide_command
            .or(config.hide_command)
            .unwrap_or(defaults.hide_command),
        log_format: raw
            .log_format
            .or(config.log_format)
            .unwrap_or(defaults.log_format),
        quiet: raw.quiet.or(config.quiet).unwrap_or(defaults.quiet),
    }
}

/// Loads the config file the CLI points at (or finds one) and merges it
/// with the raw CLI options.
pub fn resolve_config(raw: &RawCliOptions, cwd: &Path) -> Result<ProcessingOptions, AppError> {
    let explicit = raw.config.as_deref().map(Path::new);
    let user_dir = user_config_dir();
    let loaded = load_config(explicit, cwd, user_dir.as_deref())?;
    Ok(combine_options(raw, &loaded.options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_config() -> ConfigFileOptions {
        ConfigFileOptions {
            out_dir: Some("config-out".into()),
            header: Some("config header".into()),
            footer: Some("config footer".into()),
            remove_source: Some(true),
            hide_command: Some(true),
            log_format: Some(LogFormat::Json),
            quiet: Some(true),
        }
    }

    #[test]
    fn empty_sources_give_defaults() {
        let options = combine_options(&RawCliOptions::default(), &ConfigFileOptions::default());
        assert_eq!(
            options,
            ProcessingOptions {
                out_dir: None,
                header: String::new(),
                footer: String::new(),
                remove_source: false,
                hide_command: false,
                log_format: LogFormat::Text,
                quiet: false,
            }
        );
    }

    #[test]
    fn config_fills_missing_cli_values() {
        let options = combine_options(&RawCliOptions::default(), &full_config());
        assert_eq!(options.out_dir, Some(PathBuf::from("config-out")));
        assert_eq!(options.header, "config header");
        assert!(options.remove_source);
        assert!(options.hide_command);
        assert_eq!(options.log_format, LogFormat::Json);
        assert!(options.quiet);
    }

    #[test]
    fn cli_values_win_even_when_false_or_empty() {
        let raw = RawCliOptions {
            out_dir: Some("cli-out".into()),
            header: Some(String::new()),
            footer: Some("cli footer".into()),
            remove_source: Some(false),
            hide_command: Some(false),
            log_format: Some(LogFormat::Text),
            quiet: Some(false),
            config: None,
        };
        let options = combine_options(&raw, &full_config());
        assert_eq!(options.out_dir, Some(PathBuf::from("cli-out")));
        assert_eq!(options.header, "");
        assert_eq!(options.footer, "cli footer");
        assert!(!options.remove_source);
        assert!(!options.hide_command);
        assert_eq!(options.log_format, LogFormat::Text);
        assert!(!options.quiet);
    }

    #[test]
    fn validates_well_formed_config() {
        let value = json!({
            "$schema": "https://example.invalid/schema.json",
            "outDir": "docs",
            "removeSource": true,
            "logFormat": "json"
        });
        let options = validate_config(&value).unwrap();
        assert_eq!(options.out_dir.as_deref(), Some("docs"));
        assert_eq!(options.remove_source, Some(true));
        assert_eq!(options.log_format, Some(LogFormat::Json));
        assert_eq!(options.header, None);
    }

    #[test]
    fn reports_every_bad_field() {
        let value = json!({ "header": 42, "quiet": "yes", "logFormat": "xml" });
        let issues = validate_config(&value).unwrap_err();
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["header", "logFormat", "quiet"]);
        assert_eq!(issues[0].message, "Invalid type: Expected string but received 42");
    }

    #[test]
    fn rejects_non_object_root() {
        let issues = validate_config(&json!(["a"])).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::new("root", "Invalid type: Expected Object but received Array")]);
    }

    #[test]
    fn empty_document_is_empty_config() {
        assert_eq!(validate_config(&Value::Null), Ok(ConfigFileOptions::default()));
    }

    #[test]
    fn loads_each_data_format() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("c.json", r##"{"header": "# H", "quiet": true}"##),
            ("c.yaml", "header: '# H'\nquiet: true\n"),
            ("c.toml", "header = \"# H\"\nquiet = true\n"),
        ];

        for (name, text) in files {
            let path = dir.path().join(name);
            fs::write(&path, text).unwrap();
            let loaded = load_config(Some(&path), dir.path(), None).unwrap();
            assert_eq!(loaded.options.header.as_deref(), Some("# H"), "{}", name);
            assert_eq!(loaded.options.quiet, Some(true), "{}", name);
        }
    }

    #[test]
    fn explicit_script_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrap.config.js");
        fs::write(&path, "module.exports = {};").unwrap();

        let err = load_config(Some(&path), dir.path(), None).unwrap_err();
        assert!(matches!(err, AppError::ConfigLoad { .. }));
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn explicit_missing_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(matches!(
            load_config(Some(&path), dir.path(), None),
            Err(AppError::ConfigLoad { .. })
        ));
    }

    #[test]
    fn explicit_invalid_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"removeSource": "no"}"#).unwrap();
        assert!(matches!(
            load_config(Some(&path), dir.path(), None),
            Err(AppError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn discovered_invalid_config_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".mermaid-markdown-wraprc.json"), "{ not json").unwrap();

        let loaded = load_config(None, dir.path(), None).unwrap();
        assert_eq!(loaded, LoadedConfig::default());
    }

    #[test]
    fn discovers_rc_file_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".mermaid-markdown-wraprc.yaml"), "outDir: docs\n").unwrap();

        let loaded = load_config(None, dir.path(), None).unwrap();
        assert_eq!(loaded.options.out_dir.as_deref(), Some("docs"));
        assert_eq!(
            loaded.source,
            Some(dir.path().join(".mermaid-markdown-wraprc.yaml"))
        );
    }

    #[test]
    fn package_json_key_takes_priority() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "demo", "mermaid-markdown-wrap": {"footer": "from package"}}"#,
        )
        .unwrap();
        fs::write(dir.path().join(".mermaid-markdown-wraprc"), "footer: from rc\n").unwrap();

        let loaded = load_config(None, dir.path(), None).unwrap();
        assert_eq!(loaded.options.footer.as_deref(), Some("from package"));
    }

    #[test]
    fn package_json_without_key_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "demo"}"#).unwrap();
        fs::write(dir.path().join(".mermaid-markdown-wraprc"), "footer: from rc\n").unwrap();

        let loaded = load_config(None, dir.path(), None).unwrap();
        assert_eq!(loaded.options.footer.as_deref(), Some("from rc"));
    }

    #[test]
    fn user_dir_is_last_resort() {
        let cwd = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        fs::write(user.path().join("config.toml"), "hideCommand = true\n").unwrap();

        let loaded = load_config(None, cwd.path(), Some(user.path())).unwrap();
        assert_eq!(loaded.options.hide_command, Some(true));

        fs::write(cwd.path().join(".mermaid-markdown-wraprc.json"), "{}").unwrap();
        let loaded = load_config(None, cwd.path(), Some(user.path())).unwrap();
        assert_eq!(loaded.options.hide_command, None);
    }
}
