//! Minimal driver contract shared by every SQL backend
//!
//! The version store only needs to run a handful of single-value queries,
//! DDL/DML statements, and one multi-statement script, all inside an explicit
//! transaction. Each backend adapts its native driver to these traits.

use crate::dialect::Dialect;
use crate::error::DbResult;

/// A single scalar read from the first column of the first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

/// Anything that can answer a scalar query: a connection or an open
/// transaction.
pub trait Queryable {
    /// Run `sql` with positional text parameters and return the first column
    /// of the first row, or `None` when the query produced no rows.
    fn query_value(&mut self, sql: &str, params: &[&str]) -> DbResult<Option<Value>>;
}

/// An open driver connection.
pub trait Connection: Queryable {
    /// SQL dialect spoken by this connection
    fn dialect(&self) -> Dialect;

    /// Start an explicit transaction.
    ///
    /// Dropping the returned handle without calling
    /// [`Transaction::commit`] rolls it back.
    fn begin(&mut self) -> DbResult<Box<dyn Transaction + '_>>;
}

/// An open transaction.
pub trait Transaction: Queryable {
    /// Execute one statement with positional text parameters.
    fn execute(&mut self, sql: &str, params: &[&str]) -> DbResult<()>;

    /// Execute a script that may contain several statements.
    fn execute_batch(&mut self, sql: &str) -> DbResult<()>;

    fn commit(self: Box<Self>) -> DbResult<()>;

    fn rollback(self: Box<Self>) -> DbResult<()>;
}
