use crate::automaton::Automaton;
use crate::parser::parse;
use crate::types::{PdaError, Table};

// Default embedded tables
const TABLE_TEXTS: [(&str, &str); 4] = [
    (
        "balanced-parentheses",
        include_str!("../programs/balanced-parentheses.csv"),
    ),
    ("anbn", include_str!("../programs/anbn.csv")),
    ("palindrome", include_str!("../programs/palindrome.csv")),
    ("equal-ab", include_str!("../programs/equal-ab.csv")),
];

/// A transition table shipped with the crate.
#[derive(Debug, Clone)]
pub struct NamedTable {
    pub name: &'static str,
    pub text: &'static str,
    pub table: Table,
}

lazy_static::lazy_static! {
    pub static ref TABLES: Vec<NamedTable> = TABLE_TEXTS
        .iter()
        .filter_map(|&(name, text)| match parse(text) {
            Ok(table) => Some(NamedTable { name, text, table }),
            Err(e) => {
                tracing::error!(name, error = %e, "failed to parse embedded table");
                None
            }
        })
        .collect();
}

pub struct TableLibrary;

impl TableLibrary {
    /// Get the number of available tables
    pub fn count() -> usize {
        TABLES.len()
    }

    /// Get a table by its index
    pub fn get_by_index(index: usize) -> Result<&'static NamedTable, PdaError> {
        TABLES
            .get(index)
            .ok_or_else(|| PdaError::FileError(format!("Table index {} out of range", index)))
    }

    /// Get a table by its name
    pub fn get_by_name(name: &str) -> Result<&'static NamedTable, PdaError> {
        TABLES
            .iter()
            .find(|table| table.name == name)
            .ok_or_else(|| PdaError::FileError(format!("Table '{}' not found", name)))
    }

    /// List all table names
    pub fn list_names() -> Vec<&'static str> {
        TABLES.iter().map(|table| table.name).collect()
    }

    /// Get information about a table by its index
    pub fn info(index: usize) -> Result<TableInfo, PdaError> {
        let named = Self::get_by_index(index)?;
        let automaton = Automaton::from_table(&named.table)?;

        Ok(TableInfo {
            index,
            name: named.name.to_string(),
            start: automaton.name(automaton.start()).to_string(),
            accept: automaton.accept_states().to_vec(),
            state_count: automaton.states().len(),
            rule_count: automaton.rules().len(),
        })
    }

    /// Search for tables by name
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        TABLES
            .iter()
            .enumerate()
            .filter(|(_, table)| table.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub index: usize,
    pub name: String,
    pub start: String,
    pub accept: Vec<String>,
    pub state_count: usize,
    pub rule_count: usize,
}
