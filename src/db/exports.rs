use crate::errors::ServerError;
use rusqlite::{params, Connection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEvent {
    pub id: i64,
    pub tab: String,
    pub row_count: i64,
    pub outcome: String,
    pub message: Option<String>,
    pub artifact_path: Option<String>,
    pub created_at: i64,
}

/// Records one export invocation.
pub fn record_export(
    conn: &Connection,
    tab: &str,
    row_count: usize,
    outcome: &str,
    message: Option<&str>,
    artifact_path: Option<&str>,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into export_events (tab, row_count, outcome, message, artifact_path, created_at)
         values (?, ?, ?, ?, ?, ?)",
        params![tab, row_count as i64, outcome, message, artifact_path, now],
    )
    .map_err(|e| ServerError::DbError(format!("record export failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

/// Most recent exports first.
pub fn list_recent_exports(conn: &Connection, limit: usize) -> Result<Vec<ExportEvent>, ServerError> {
    let mut stmt = conn
        .prepare(
            "select id, tab, row_count, outcome, message, artifact_path, created_at
             from export_events
             order by created_at desc, id desc
             limit ?",
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(ExportEvent {
                id: row.get(0)?,
                tab: row.get(1)?,
                row_count: row.get(2)?,
                outcome: row.get(3)?,
                message: row.get(4)?,
                artifact_path: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}
