//! Data files on disk: RON, JSON or TOML, picked by extension.
//!
//! A game directory holds a few named files (`parts`, `upgrades`,
//! `settings`), each in exactly one format, plus any number of documents
//! under `GameData/`. Named files are strict and a parse error fails the
//! load. Documents come from many independent authors, so one that does not
//! parse is skipped with a warning and only the trees it held go missing.

use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required named file is absent in every format.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same named file exists in two formats.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Two catalog records share a name.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Lookup order for named files.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    pub fn of(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    Format::of(path).ok_or_else(|| DataLoadError::UnsupportedFormat {
        file: path.to_path_buf(),
    })
}

// ===========================================================================
// Named files
// ===========================================================================

/// Find `{base_name}.{ron,toml,json}` in `dir`. More than one match is an
/// error.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn read(path: &Path) -> Result<(Format, String), DataLoadError> {
    let format = detect_format(path)?;
    Ok((format, std::fs::read_to_string(path)?))
}

fn parse_error(path: &Path, detail: String) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    }
}

pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let (format, content) = read(path)?;
    format.parse(&content).map_err(|detail| parse_error(path, detail))
}

/// Deserialize a list of records. TOML has no top-level arrays, so a TOML
/// file keeps the list under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let (format, content) = read(path)?;
    let parsed = match format {
        Format::Toml => format
            .parse::<toml::Table>(&content)
            .and_then(|mut table| {
                table
                    .remove(toml_key)
                    .ok_or_else(|| format!("missing key '{toml_key}' in TOML file"))
            })
            .and_then(|value| value.try_into().map_err(|e: toml::de::Error| e.to_string())),
        other => other.parse(&content),
    };
    parsed.map_err(|detail| parse_error(path, detail))
}

/// Deserialize a `GameData/` document. A document that does not parse is
/// logged and yields `None`; I/O failures are still errors.
pub fn deserialize_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DataLoadError> {
    match deserialize_file(path) {
        Ok(doc) => Ok(Some(doc)),
        Err(DataLoadError::Parse { file, detail }) => {
            tracing::warn!(file = %file.display(), %detail, "skipping unparsable document");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// ===========================================================================
// Catalog records
// ===========================================================================

/// Reject a record list in which two records share a name.
pub fn ensure_unique_names<T>(
    records: &[T],
    name: impl Fn(&T) -> &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    let mut seen = HashSet::new();
    for record in records {
        let n = name(record);
        if !seen.insert(n) {
            return Err(DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: n.to_string(),
            });
        }
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
