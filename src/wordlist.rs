use crate::config::DEFAULT_WORDLIST;
use eyre::{Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

/// Picked up from the working directory when no wordlist is given
pub const AUTO_WORDLIST: &str = "wordlist.txt";

#[derive(Debug, Clone, PartialEq)]
pub enum WordlistSource {
    File(PathBuf),
    AutoDetected(PathBuf),
    BuiltIn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wordlist {
    pub labels: Vec<String>,
    pub source: WordlistSource,
}

impl Wordlist {
    pub fn builtin() -> Self {
        Self {
            labels: DEFAULT_WORDLIST.iter().map(|s| s.to_string()).collect(),
            source: WordlistSource::BuiltIn,
        }
    }

    /// Explicit path, else `wordlist.txt` in `dir`, else the built-in labels.
    /// An explicit path that cannot be read is an error.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            let labels = load(path)?;
            log::info!("[wordlist] loaded: path={} labels={}", path.display(), labels.len());
            return Ok(Self {
                labels,
                source: WordlistSource::File(path.to_path_buf()),
            });
        }

        let auto = dir.join(AUTO_WORDLIST);
        if auto.is_file() {
            let labels = load(&auto)?;
            log::info!("[wordlist] auto_detected: path={} labels={}", auto.display(), labels.len());
            return Ok(Self {
                labels,
                source: WordlistSource::AutoDetected(auto),
            });
        }

        log::info!("[wordlist] builtin: labels={}", DEFAULT_WORDLIST.len());
        Ok(Self::builtin())
    }
}

/// One label per line; surrounding whitespace trimmed, blank lines skipped
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Wordlist file not found or unreadable: {}", path.display()))?;
    Ok(parse(&content))
}

pub fn parse(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
