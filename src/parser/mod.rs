use crate::errors::ExtractError;
use std::path::Path;

const DIRECTIVE: &str = "#include";
const STRIPPED: [char; 4] = ['"', '\'', '<', '>'];

/// Line-based `#include` scanner.
///
/// This is a token scan, not a preprocessor: comments, conditionals and
/// line continuations are not interpreted.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncludeExtractor;

impl IncludeExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract include arguments from raw source text, in line order, duplicates kept.
    #[must_use]
    pub fn extract(&self, content: &str) -> Vec<String> {
        content.split(is_line_break).filter_map(include_argument).collect()
    }

    /// Read and scan a file, surfacing read and decoding failures.
    ///
    /// # Errors
    /// Returns `ExtractError` when the file cannot be read or is not valid UTF-8.
    pub fn try_extract_file(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        self.try_extract_bytes(path, std::fs::read(path)?)
    }

    /// Scan already-read file content; `path` only labels the error.
    ///
    /// # Errors
    /// Returns `ExtractError::InvalidUtf8` when `bytes` is not valid UTF-8.
    pub fn try_extract_bytes(&self, path: &Path, bytes: Vec<u8>) -> Result<Vec<String>, ExtractError> {
        let content = String::from_utf8(bytes)
            .map_err(|_| ExtractError::InvalidUtf8 { file: path.to_path_buf() })?;
        Ok(self.extract(&content))
    }

    /// Best-effort variant of `try_extract_file`: any failure yields no includes.
    #[must_use]
    pub fn extract_file(&self, path: &Path) -> Vec<String> {
        match self.try_extract_file(path) {
            Ok(includes) => includes,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                Vec::new()
            }
        }
    }
}

// Same separators as universal-newline line splitting, `\r\n` included (its empty
// middle piece never carries a directive).
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn include_argument(line: &str) -> Option<String> {
    if !line.contains(DIRECTIVE) {
        return None;
    }
    let token = line.split_whitespace().nth(1)?;
    let name: String = token.chars().filter(|c| !STRIPPED.contains(c)).collect();
    (name != DIRECTIVE).then_some(name)
}

/// Reduce an include argument to its header identity (text after the last `/`).
#[must_use]
pub fn base_name(include: &str) -> &str {
    include.rsplit('/').next().unwrap_or(include)
}
