//! Fresh-schema-per-query isolation.
//!
//! [`Schema::reset`] clears every user object and replays the schema script.
//! It hands back a [`FreshSchema`], and running a graded query consumes that
//! handle, so each graded query needs its own reset.

use crate::db::SqlEngine;
use crate::model::ExecutionResult;
use anyhow::Context;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Schema {
    statements: Vec<String>,
}

/// Split a script on `;`. Terminators inside string literals are not recognised.
pub fn split_statements(script: &str) -> Vec<String> {
    script
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Schema {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let script = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file {}", path.display()))?;
        Ok(Self::from_script(&script))
    }

    pub fn from_script(script: &str) -> Self {
        Self {
            statements: split_statements(script),
        }
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Drop all user objects, then rebuild from the script.
    pub fn reset<'e, E: SqlEngine + ?Sized>(
        &self,
        engine: &'e mut E,
    ) -> anyhow::Result<FreshSchema<'e, E>> {
        engine.abort_transaction()?;
        drop_all(engine)?;
        for (i, stmt) in self.statements.iter().enumerate() {
            engine
                .execute(stmt)
                .with_context(|| format!("schema statement {} failed", i + 1))?;
        }
        Ok(FreshSchema { engine })
    }
}

/// Remove user objects newest first, so dependents go before what they reference
/// and temporary objects go before the persistent ones they may shadow.
fn drop_all<E: SqlEngine + ?Sized>(engine: &mut E) -> anyhow::Result<()> {
    let objects = engine.user_objects()?;
    for obj in objects.iter().rev() {
        if let Err(e) = engine.drop_object(obj) {
            tracing::debug!(event = "drop_ignored", object = %obj.name, error = %e);
        }
    }
    Ok(())
}

/// An engine whose schema was just rebuilt and has not yet run a graded query.
pub struct FreshSchema<'e, E: SqlEngine + ?Sized> {
    engine: &'e mut E,
}

impl<'e, E: SqlEngine + ?Sized> FreshSchema<'e, E> {
    pub fn run(self, query: &str) -> anyhow::Result<ExecutionResult> {
        self.engine.fetch(query)
    }
}
