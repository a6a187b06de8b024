//! This module provides the parser for transition tables, utilizing the `pest` crate.
//! It defines the grammar for table files and functions to parse the input into a `Table` struct.

use crate::{
    analyzer::analyze,
    types::{ConfigError, PdaError, Symbol, Table, TableRule, EPSILON, EPSILON_DISPLAY},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Number of fields in every rule record: `from, input, pop, push, to`.
const RULE_FIELDS: usize = 5;

/// Derives a `PestParser` for the table grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TableParser;

/// Parses the given input string into a `Table` struct.
///
/// The first record holds the accept-state names, every following non-blank record is a
/// rule. The parsed table is validated before being returned, so a successful result can
/// always be turned into an `Automaton`.
///
/// # Returns
///
/// * `Ok(Table)` if the input is successfully parsed and validated.
/// * `Err(PdaError::ParseError)` if there are any syntax errors or malformed records.
/// * `Err(PdaError::Config)` if the table fails validation.
pub fn parse(input: &str) -> Result<Table, PdaError> {
    let root = TableParser::parse(Rule::table, input.trim())
        .map_err(|e| PdaError::ParseError(e.into()))?
        .next()
        .ok_or(ConfigError::EmptyTable)?;

    let table = parse_table(root)?;

    analyze(&table.rules, &table.accept)?;

    Ok(table)
}

/// Parses the top-level structure of a table from a `Pair<Rule::table>`.
fn parse_table(pair: Pair<Rule>) -> Result<Table, PdaError> {
    let mut records = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::record);

    let accept = match records.next() {
        Some(header) => parse_fields(header)
            .into_iter()
            .filter(|name| !name.is_empty())
            .collect(),
        None => Vec::new(),
    };

    let mut rules = Vec::new();
    for record in records {
        let span = record.as_span();
        let fields = parse_fields(record);

        // Skip blank lines
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }

        rules.push(parse_rule(fields, span)?);
    }

    Ok(Table { accept, rules })
}

/// Builds a `TableRule` out of the fields of a single record.
fn parse_rule(fields: Vec<String>, span: Span) -> Result<TableRule, PdaError> {
    let [from, input, pop, push, to]: [String; RULE_FIELDS] =
        fields.try_into().map_err(|fields: Vec<String>| {
            parse_error(
                &format!(
                    "Expected {} fields (from, input, pop, push, to) but found {}",
                    RULE_FIELDS,
                    fields.len()
                ),
                span,
            )
        })?;

    if from.is_empty() || to.is_empty() {
        return Err(parse_error("State names must not be empty", span));
    }

    Ok(TableRule {
        from,
        input: parse_symbol(input),
        pop: parse_symbol(pop),
        push: parse_symbol(push),
        to,
    })
}

/// Extracts the trimmed text of every field in a record.
fn parse_fields(pair: Pair<Rule>) -> Vec<String> {
    // Rule: record > field > (quoted > inner | bare)
    pair.into_inner()
        .filter_map(|field| field.into_inner().next())
        .map(|value| match value.as_rule() {
            Rule::quoted => value
                .into_inner()
                .next()
                .map(|inner| inner.as_str().replace("\"\"", "\""))
                .unwrap_or_default(),
            _ => value.as_str().trim().to_string(),
        })
        .collect()
}

/// Normalizes a symbol field, accepting `ε` as a spelling of the empty symbol.
fn parse_symbol(field: String) -> Symbol {
    if field == EPSILON_DISPLAY {
        EPSILON.to_string()
    } else {
        field
    }
}

/// Creates a `PdaError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> PdaError {
    PdaError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}
