// DeployScribe - platform/config.rs
//
// Config directory resolution and config.toml loading with validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::OutputFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for DeployScribe configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/deployscribe/ or %APPDATA%\DeployScribe\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are ignored so a newer config file still loads.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub discovery: DiscoverySection,
    pub extraction: ExtractionSection,
    pub report: ReportSection,
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Directory scanned for deployment logs.
    pub log_dir: Option<String>,
    pub max_depth: Option<usize>,
    pub max_files: Option<usize>,
    /// Include glob for log file names.
    pub include_pattern: Option<String>,
}

/// `[extraction]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    pub max_log_bytes: Option<usize>,
    /// Characters inspected on each side of an object id by the full-text scan.
    pub context_window_chars: Option<usize>,
    /// Pattern table replacing the built-in one.
    pub pattern_file: Option<String>,
}

/// `[report]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub output_path: Option<String>,
    /// "markdown", "json" or "csv".
    pub format: Option<String>,
    pub title: Option<String>,
    pub network_label: Option<String>,
    /// Must contain `{digest}`.
    pub explorer_url: Option<String>,
    pub subject_order: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Discovery --
    pub log_dir: PathBuf,
    pub max_depth: usize,
    pub max_files: usize,
    pub include_pattern: String,

    // -- Extraction --
    pub max_log_bytes: usize,
    pub context_window_chars: usize,
    pub pattern_file: Option<PathBuf>,

    // -- Report --
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub title: String,
    pub network_label: String,
    pub explorer_url: String,
    pub subject_order: Vec<String>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(constants::DEFAULT_LOG_DIR),
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_pattern: constants::DEFAULT_INCLUDE_PATTERN.to_string(),
            max_log_bytes: constants::DEFAULT_MAX_LOG_BYTES,
            context_window_chars: constants::DEFAULT_CONTEXT_WINDOW_CHARS,
            pattern_file: None,
            output_path: PathBuf::from(constants::DEFAULT_OUTPUT_PATH),
            format: OutputFormat::default(),
            title: constants::DEFAULT_REPORT_TITLE.to_string(),
            network_label: constants::DEFAULT_NETWORK_LABEL.to_string(),
            explorer_url: constants::DEFAULT_EXPLORER_URL.to_string(),
            subject_order: constants::DEFAULT_SUBJECT_ORDER
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            log_level: None,
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load and validate config.toml.
///
/// With `explicit`, that file must exist and parse; failures are errors.
/// Without it, the platform config file is used if present: a missing file
/// yields defaults, an unreadable or unparseable one yields defaults plus a
/// warning.
///
/// Called before logging is initialised (the file may set the level), so
/// warnings are returned for the caller to log once tracing is up.
pub fn load_config(explicit: Option<&Path>) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let mut warnings: Vec<String> = Vec::new();

    let (config_path, content) = match explicit {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            (path.to_path_buf(), content)
        }
        None => {
            let path = PlatformPaths::resolve().config_file();
            if !path.exists() {
                return Ok((AppConfig::default(), warnings));
            }
            match std::fs::read_to_string(&path) {
                Ok(c) => (path, c),
                Err(e) => {
                    warnings.push(format!(
                        "Could not read config file '{}': {e}. Using defaults.",
                        path.display()
                    ));
                    return Ok((AppConfig::default(), warnings));
                }
            }
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) if explicit.is_some() => {
            return Err(ConfigError::TomlParse {
                path: config_path,
                source: e,
            })
        }
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return Ok((AppConfig::default(), warnings));
        }
    };

    let config = validate(raw, &mut warnings);
    Ok((config, warnings))
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Discovery --
    if let Some(dir) = raw.discovery.log_dir.filter(|d| !d.trim().is_empty()) {
        config.log_dir = PathBuf::from(dir);
    }

    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }

    if let Some(files) = raw.discovery.max_files {
        if (constants::MIN_MAX_FILES..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(format!(
                "[discovery] max_files = {files} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_FILES,
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }

    if let Some(pattern) = raw.discovery.include_pattern {
        match glob::Pattern::new(&pattern) {
            Ok(_) if !pattern.trim().is_empty() => config.include_pattern = pattern,
            _ => warnings.push(format!(
                "[discovery] include_pattern = \"{pattern}\" is not a valid glob. Using default ({}).",
                constants::DEFAULT_INCLUDE_PATTERN,
            )),
        }
    }

    // -- Extraction --
    if let Some(bytes) = raw.extraction.max_log_bytes {
        if (constants::MIN_MAX_LOG_BYTES..=constants::ABSOLUTE_MAX_LOG_BYTES).contains(&bytes) {
            config.max_log_bytes = bytes;
        } else {
            warnings.push(format!(
                "[extraction] max_log_bytes = {bytes} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_LOG_BYTES,
                constants::ABSOLUTE_MAX_LOG_BYTES,
                constants::DEFAULT_MAX_LOG_BYTES,
            ));
        }
    }

    if let Some(chars) = raw.extraction.context_window_chars {
        if (constants::MIN_CONTEXT_WINDOW_CHARS..=constants::MAX_CONTEXT_WINDOW_CHARS)
            .contains(&chars)
        {
            config.context_window_chars = chars;
        } else {
            warnings.push(format!(
                "[extraction] context_window_chars = {chars} is out of range ({}-{}). Using default ({}).",
                constants::MIN_CONTEXT_WINDOW_CHARS,
                constants::MAX_CONTEXT_WINDOW_CHARS,
                constants::DEFAULT_CONTEXT_WINDOW_CHARS,
            ));
        }
    }

    if let Some(file) = raw.extraction.pattern_file.filter(|f| !f.trim().is_empty()) {
        config.pattern_file = Some(PathBuf::from(file));
    }

    // -- Report --
    if let Some(path) = raw.report.output_path.filter(|p| !p.trim().is_empty()) {
        config.output_path = PathBuf::from(path);
    }

    if let Some(format) = raw.report.format {
        match format.parse::<OutputFormat>() {
            Ok(f) => config.format = f,
            Err(e) => warnings.push(format!("[report] format: {e}. Using default (markdown).")),
        }
    }

    if let Some(title) = raw.report.title.filter(|t| !t.trim().is_empty()) {
        config.title = title;
    }

    if let Some(label) = raw.report.network_label.filter(|l| !l.trim().is_empty()) {
        config.network_label = label;
    }

    if let Some(url) = raw.report.explorer_url {
        if url.contains(constants::DIGEST_PLACEHOLDER) {
            config.explorer_url = url;
        } else {
            warnings.push(format!(
                "[report] explorer_url = \"{url}\" has no {} placeholder. Using default ({}).",
                constants::DIGEST_PLACEHOLDER,
                constants::DEFAULT_EXPLORER_URL,
            ));
        }
    }

    if let Some(order) = raw.report.subject_order {
        if !order.is_empty() && order.iter().all(|s| !s.trim().is_empty()) {
            config.subject_order = order;
        } else {
            warnings.push(
                "[report] subject_order must be a non-empty list of names. Using default."
                    .to_string(),
            );
        }
    }

    // -- Logging --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    config
}
