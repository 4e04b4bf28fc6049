use crate::model::{ExecutionResult, Row};

pub mod sqlite;

pub use sqlite::SqliteEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    View,
    Trigger,
}

/// A user-owned catalog object the isolation reset must remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogObject {
    pub kind: ObjectKind,
    pub name: String,
    /// Lives in the connection's temporary namespace and may shadow a persistent object.
    pub temporary: bool,
}

/// The execution capability grading relies on.
///
/// `execute` runs one statement; on success `columns` and `rows` describe its
/// output (both empty for statements that return nothing). The catalog hooks
/// let the isolation reset clear the schema without knowing the dialect.
pub trait SqlEngine {
    fn execute(&mut self, stmt: &str) -> anyhow::Result<()>;
    fn columns(&self) -> &[String];
    fn rows(&self) -> &[Row];

    /// User tables, views and triggers in creation order, persistent ones first.
    fn user_objects(&mut self) -> anyhow::Result<Vec<CatalogObject>>;
    fn drop_object(&mut self, obj: &CatalogObject) -> anyhow::Result<()>;

    /// Roll back a transaction left open by a previous statement.
    fn abort_transaction(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Compile `stmt` without running it. Engines that cannot do this accept everything.
    fn check_syntax(&mut self, _stmt: &str) -> anyhow::Result<()> {
        Ok(())
    }

    /// Execute and take a copy of the output.
    fn fetch(&mut self, stmt: &str) -> anyhow::Result<ExecutionResult> {
        self.execute(stmt)?;
        Ok(ExecutionResult {
            columns: self.columns().to_vec(),
            rows: self.rows().to_vec(),
        })
    }
}
