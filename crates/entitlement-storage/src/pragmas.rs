//! Connection PRAGMAs. Applied to every connection right after opening.

use rusqlite::Connection;

/// WAL journaling with a busy timeout so a reader never blocks the writer.
pub fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -2000;
        PRAGMA temp_store = MEMORY;
        ",
    )
}
