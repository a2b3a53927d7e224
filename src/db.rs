use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "college.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    // Workspaces created before write stamps existed lack updated_at.
    ensure_kv_updated_at(&conn)?;

    Ok(conn)
}

pub fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(value)
}

pub fn kv_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv_store(key, value, updated_at)
         VALUES(?, ?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        (key, value),
    )?;
    Ok(())
}

pub fn kv_delete(conn: &Connection, key: &str) -> anyhow::Result<()> {
    conn.execute("DELETE FROM kv_store WHERE key = ?", [key])?;
    Ok(())
}

fn ensure_kv_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "kv_store", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE kv_store ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let conn = open_db(dir.path()).expect("open db");

        assert_eq!(kv_get(&conn, "students").expect("get"), None);
        kv_set(&conn, "students", "[]").expect("set");
        kv_set(&conn, "students", "[{\"id\":\"STU1\"}]").expect("overwrite");
        assert_eq!(
            kv_get(&conn, "students").expect("get").as_deref(),
            Some("[{\"id\":\"STU1\"}]")
        );

        kv_delete(&conn, "students").expect("delete");
        assert_eq!(kv_get(&conn, "students").expect("get"), None);
    }

    #[test]
    fn reopen_keeps_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let conn = open_db(dir.path()).expect("open db");
            kv_set(&conn, "darkMode", "true").expect("set");
        }
        let conn = open_db(dir.path()).expect("reopen db");
        assert!(table_has_column(&conn, "kv_store", "updated_at").expect("pragma"));
        assert_eq!(kv_get(&conn, "darkMode").expect("get").as_deref(), Some("true"));
    }
}
