//! Parameterized query construction.
//!
//! A [`BoundQuery`] separates structure from data: the column name comes
//! from a [`Verified<Identifier>`], the compared value is carried as a bound
//! parameter and never spliced into the SQL text.

use std::fmt;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::sink::{QueryEngine, SinkError, SinkErrorKind};
use crate::{Identifier, Tainted, Verified};

/// One result row, column name to value.
pub type Row = Map<String, Value>;

/// A `SELECT` with a verified column and a bound value.
///
/// # Examples
///
/// ```
/// use input_guard::{BoundQuery, Guard, IdentifierGuard, IdentifierPolicy, Tainted};
///
/// let columns = IdentifierGuard::new(IdentifierPolicy::new(["name"]).unwrap());
/// let column = columns.check(Tainted::new("name".to_string())).unwrap();
///
/// let value = Tainted::new("x' OR '1'='1".to_string());
/// let query = BoundQuery::select_where("beers", &column, value);
/// assert_eq!(query.sql(), "SELECT * FROM beers WHERE name = $1");
/// assert_eq!(query.params(), ["x' OR '1'='1"]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BoundQuery {
    table: &'static str,
    column: Identifier,
    sql: String,
    params: Vec<String>,
}

impl BoundQuery {
    /// Builds `SELECT * FROM <table> WHERE <column> = $1`.
    ///
    /// `table` is fixed by the caller's code. `value` stays untrusted and is
    /// only ever handed to the engine as parameter `$1`.
    pub fn select_where(
        table: &'static str,
        column: &Verified<Identifier>,
        value: Tainted<String>,
    ) -> Self {
        let column = column.as_ref().clone();
        let sql = format!("SELECT * FROM {table} WHERE {column} = $1");
        Self {
            table,
            column,
            sql,
            params: vec![value.into_inner()],
        }
    }

    /// Table name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Filtered column.
    pub fn column(&self) -> &Identifier {
        &self.column
    }

    /// SQL text with `$n` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters to bind, in placeholder order.
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Debug for BoundQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundQuery")
            .field("sql", &self.sql)
            .field("params", &self.params.len())
            .finish()
    }
}

/// In-memory [`QueryEngine`] over a single table.
///
/// Compares the filtered column with the bound value as text. Records every
/// SQL text it was asked to run.
#[derive(Debug, Default)]
pub struct MemoryTable {
    name: &'static str,
    rows: Vec<Row>,
    executed: Mutex<Vec<String>>,
}

impl MemoryTable {
    /// Creates a table with the given rows.
    pub fn new(name: &'static str, rows: Vec<Row>) -> Self {
        Self {
            name,
            rows,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// SQL texts received so far.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl QueryEngine for MemoryTable {
    fn select(&self, query: &BoundQuery) -> Result<Vec<Row>, SinkError> {
        self.executed.lock().push(query.sql().to_string());

        if query.table() != self.name {
            return Err(SinkError::with_message(
                SinkErrorKind::Upstream,
                "no such table",
            ));
        }
        let wanted = query.params().first().ok_or_else(|| {
            SinkError::with_message(SinkErrorKind::Upstream, "missing bound parameter")
        })?;

        Ok(self
            .rows
            .iter()
            .filter(|row| {
                row.get(query.column().as_str())
                    .is_some_and(|v| as_text(v) == *wanted)
            })
            .cloned()
            .collect())
    }
}
