//! Parse a query and describe it without touching any documents

use std::fmt;

use crate::{QueryService, Source};
use super::CliError;

/// What a query would do, as reported by `dataview check`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub view_type: String,
    pub sources: Vec<Source>,
    pub columns: Vec<String>,
    /// Normalized `WHERE` condition, empty when absent
    pub condition: String,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "view:    {}", self.view_type)?;

        let sources: Vec<String> = self.sources.iter().map(Source::to_string).collect();
        writeln!(f, "from:    {}", sources.join(" AND "))?;
        writeln!(f, "columns: {}", self.columns.join(", "))?;
        write!(f, "where:   {}", self.condition)
    }
}

/// Execute a dataview check operation
pub fn execute_check(query: &str) -> Result<CheckReport, CliError> {
    let service = QueryService::new(query)?;

    Ok(CheckReport {
        view_type: service.render_type().to_string(),
        sources: service.sources()?,
        columns: service.columns(),
        condition: service.where_expression(),
    })
}
