use crate::errors::ServerError;
use rusqlite::{params, Connection};

pub fn insert_asset(
    conn: &Connection,
    album: &str,
    file_name: &str,
    path: &str,
    sha256: &str,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into media_assets (album, file_name, path, sha256, created_at) values (?, ?, ?, ?, ?)",
        params![album, file_name, path, sha256, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert asset failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn count_assets_in_album(conn: &Connection, album: &str) -> Result<i64, ServerError> {
    conn.query_row(
        "select count(*) from media_assets where album = ?",
        params![album],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count assets failed: {e}")))
}
