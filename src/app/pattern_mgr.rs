// DeployScribe - app/pattern_mgr.rs
//
// Chooses the pattern table for a run: the table embedded in the binary, or
// a user-supplied TOML file that replaces it.

use crate::core::patterns::{self, PatternTable};
use crate::util::constants;
use crate::util::error::PatternError;
use std::path::Path;

/// Load the user table at `user_file` if given, else the built-in table.
///
/// A user file that fails any check is an error rather than a silent
/// fallback, so a typo in a custom table never goes unnoticed.
pub fn load_pattern_table(user_file: Option<&Path>) -> Result<PatternTable, PatternError> {
    match user_file {
        Some(path) => {
            let table = load_user_table(path)?;
            tracing::info!(
                table_id = %table.id,
                path = %path.display(),
                subjects = table.subjects.len(),
                "Loaded user pattern table"
            );
            Ok(table)
        }
        None => patterns::load_builtin_table(),
    }
}

fn load_user_table(path: &Path) -> Result<PatternTable, PatternError> {
    let io_err = |e| PatternError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let metadata = std::fs::metadata(path).map_err(io_err)?;
    if metadata.len() > constants::MAX_PATTERN_FILE_SIZE {
        return Err(PatternError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_PATTERN_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(io_err)?;
    patterns::parse_pattern_toml(&content, path)
        .and_then(|def| patterns::validate_and_compile(def, false))
}
