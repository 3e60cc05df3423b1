//! Syntactic check for generated view statements.
//!
//! Only confirms that compiler output parses as a single
//! `CREATE OR REPLACE VIEW`; it does not look at arbitrary user SQL.

use crate::error::{Result, SemanticError};
use sqlparser::ast::Statement;
use sqlparser::dialect::BigQueryDialect;
use sqlparser::parser::Parser;

pub fn check_view_statement(sql: &str) -> Result<()> {
    let dialect = BigQueryDialect {};
    let statements = Parser::parse_sql(&dialect, sql)
        .map_err(|e| SemanticError::Validation(format!("Generated SQL does not parse: {}", e)))?;

    match statements.as_slice() {
        [Statement::CreateView { or_replace: true, .. }] => Ok(()),
        [Statement::CreateView { .. }] => Err(SemanticError::Validation(
            "Expected CREATE OR REPLACE VIEW, found plain CREATE VIEW".to_string(),
        )),
        [_] => Err(SemanticError::Validation(
            "Generated SQL is not a CREATE VIEW statement".to_string(),
        )),
        other => Err(SemanticError::Validation(format!(
            "Expected exactly one statement, found {}",
            other.len()
        ))),
    }
}
