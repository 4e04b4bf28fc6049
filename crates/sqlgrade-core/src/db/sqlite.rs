use super::{CatalogObject, ObjectKind, SqlEngine};
use crate::model::{Cell, Row};
use anyhow::Context;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::Path;

/// [`SqlEngine`] backed by a single SQLite connection.
pub struct SqliteEngine {
    conn: Connection,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl SqliteEngine {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path.display()))?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Drop one trailing `;` so a terminated statement prepares as a single statement.
fn strip_terminator(stmt: &str) -> &str {
    let s = stmt.trim();
    s.strip_suffix(';').map(str::trim_end).unwrap_or(s)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_cell(v: ValueRef<'_>) -> Cell {
    match v {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(i) => Cell::Integer(i),
        ValueRef::Real(f) => Cell::Real(f),
        ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
    }
}

fn list_catalog(
    conn: &Connection,
    catalog: &str,
    temporary: bool,
) -> anyhow::Result<Vec<CatalogObject>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT type, name FROM {}
         WHERE type IN ('table', 'view', 'trigger') AND name NOT LIKE 'sqlite_%'
         ORDER BY rowid",
        catalog
    ))?;
    let objects = stmt
        .query_map([], |row| {
            let kind: String = row.get(0)?;
            let name: String = row.get(1)?;
            Ok(CatalogObject {
                kind: match kind.as_str() {
                    "view" => ObjectKind::View,
                    "trigger" => ObjectKind::Trigger,
                    _ => ObjectKind::Table,
                },
                name,
                temporary,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(objects)
}

impl SqlEngine for SqliteEngine {
    fn execute(&mut self, stmt: &str) -> anyhow::Result<()> {
        self.columns.clear();
        self.rows.clear();

        let mut prepared = self.conn.prepare(strip_terminator(stmt))?;
        let columns: Vec<String> = prepared
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut out = Vec::new();
        let mut rows = prepared.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(to_cell(row.get_ref(i)?));
            }
            out.push(Row(cells));
        }

        self.columns = columns;
        self.rows = out;
        Ok(())
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn user_objects(&mut self) -> anyhow::Result<Vec<CatalogObject>> {
        let mut objects = list_catalog(&self.conn, "sqlite_master", false)?;
        objects.extend(list_catalog(&self.conn, "sqlite_temp_master", true)?);
        Ok(objects)
    }

    fn drop_object(&mut self, obj: &CatalogObject) -> anyhow::Result<()> {
        let kind = match obj.kind {
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
            ObjectKind::Trigger => "TRIGGER",
        };
        let namespace = if obj.temporary { "temp" } else { "main" };
        self.conn.execute_batch(&format!(
            "DROP {} IF EXISTS {}.{}",
            kind,
            namespace,
            quote_ident(&obj.name)
        ))?;
        Ok(())
    }

    fn abort_transaction(&mut self) -> anyhow::Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn check_syntax(&mut self, stmt: &str) -> anyhow::Result<()> {
        self.conn.prepare(strip_terminator(stmt))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_select_collects_columns_and_rows() -> anyhow::Result<()> {
        let mut db = SqliteEngine::open_in_memory()?;
        db.execute("CREATE TABLE t (id INTEGER, name TEXT, score REAL, pic BLOB);")?;
        db.execute("INSERT INTO t VALUES (1, 'A', 2.5, NULL)")?;
        db.execute("SELECT id, name, score, pic FROM t;")?;
        assert_eq!(db.columns(), ["id", "name", "score", "pic"]);
        assert_eq!(
            db.rows(),
            [Row(vec![
                Cell::Integer(1),
                Cell::Text("A".into()),
                Cell::Real(2.5),
                Cell::Null
            ])]
        );
        Ok(())
    }

    #[test]
    fn test_error_clears_previous_output() -> anyhow::Result<()> {
        let mut db = SqliteEngine::open_in_memory()?;
        db.execute("SELECT 1 AS one")?;
        assert_eq!(db.rows().len(), 1);
        assert!(db.execute("SELECT * FROM missing_table").is_err());
        assert!(db.columns().is_empty());
        assert!(db.rows().is_empty());
        Ok(())
    }

    #[test]
    fn test_user_objects_in_creation_order() -> anyhow::Result<()> {
        let mut db = SqliteEngine::open_in_memory()?;
        db.execute("CREATE TABLE b (x INTEGER)")?;
        db.execute("CREATE TABLE a (x INTEGER)")?;
        db.execute("CREATE VIEW v AS SELECT x FROM a")?;
        let names: Vec<_> = db.user_objects()?.into_iter().map(|o| o.name).collect();
        assert_eq!(names, ["b", "a", "v"]);
        Ok(())
    }

    #[test]
    fn test_user_objects_lists_temp_objects_last() -> anyhow::Result<()> {
        let mut db = SqliteEngine::open_in_memory()?;
        db.execute("CREATE TABLE Student (id INTEGER)")?;
        db.execute("CREATE TEMP TABLE Student AS SELECT 2 AS id")?;
        db.execute("CREATE TEMP VIEW ids AS SELECT id FROM Student")?;
        let objects = db.user_objects()?;
        let listed: Vec<_> = objects
            .iter()
            .map(|o| (o.name.as_str(), o.temporary))
            .collect();
        assert_eq!(listed, [("Student", false), ("Student", true), ("ids", true)]);
        Ok(())
    }

    #[test]
    fn test_drop_object_targets_its_namespace() -> anyhow::Result<()> {
        let mut db = SqliteEngine::open_in_memory()?;
        db.execute("CREATE TABLE Student (id INTEGER)")?;
        db.execute("CREATE TEMP TABLE Student AS SELECT 2 AS id")?;
        db.drop_object(&CatalogObject {
            kind: ObjectKind::Table,
            name: "Student".into(),
            temporary: false,
        })?;
        let left = db.user_objects()?;
        assert_eq!(left.len(), 1);
        assert!(left[0].temporary);
        Ok(())
    }

    #[test]
    fn test_abort_transaction_rolls_back() -> anyhow::Result<()> {
        let mut db = SqliteEngine::open_in_memory()?;
        db.execute("CREATE TABLE t (x INTEGER)")?;
        db.execute("BEGIN")?;
        db.execute("INSERT INTO t VALUES (1)")?;
        db.abort_transaction()?;
        db.execute("SELECT COUNT(*) FROM t")?;
        assert_eq!(db.rows(), [Row(vec![Cell::Integer(0)])]);
        Ok(())
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("  SELECT 1 ;  \n"), "SELECT 1");
        assert_eq!(strip_terminator("SELECT 1"), "SELECT 1");
    }
}
