//! This module provides the `TableLoader` struct, responsible for loading transition tables
//! from various sources, including files and strings.

use crate::parser::parse;
use crate::types::{PdaError, Table};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of transition table files.
pub const TABLE_EXTENSION: &str = "csv";

/// `TableLoader` is a utility struct for loading transition tables.
/// It provides methods to load tables from individual files, from string content,
/// and to discover and load all `.csv` files within a specified directory.
pub struct TableLoader;

impl TableLoader {
    /// Loads a single transition table from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Table)` if the file is successfully read, parsed and validated.
    /// * `Err(PdaError::FileError)` if the file cannot be read.
    /// * `Err(PdaError::ParseError)` or `Err(PdaError::Config)` if the content is not a
    ///   valid table.
    pub fn load_table(path: &Path) -> Result<Table, PdaError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PdaError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "loading transition table");
        parse(&content)
    }

    /// Loads a single transition table from the provided string content.
    pub fn load_table_from_string(content: &str) -> Result<Table, PdaError> {
        parse(content)
    }

    /// Loads all table files (`.csv` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Results are sorted by path so
    /// the order does not depend on the file system.
    pub fn load_tables(directory: &Path) -> Vec<Result<(PathBuf, Table), PdaError>> {
        if !directory.exists() {
            return vec![Err(PdaError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(PdaError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(PdaError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }
        paths.sort();

        results.extend(
            paths
                .into_iter()
                // Skip directories and non-table files
                .filter(|path| {
                    !path.is_dir() && path.extension().is_some_and(|ext| ext == TABLE_EXTENSION)
                })
                .map(|path| match Self::load_table(&path) {
                    Ok(table) => Ok((path, table)),
                    Err(e) => Err(PdaError::FileError(format!(
                        "Failed to load table from {}: {}",
                        path.display(),
                        e
                    ))),
                }),
        );

        results
    }
}
