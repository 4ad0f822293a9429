//! Cache database schema
//!
//! One database holds the snapshot of a single (seed, max-depth) crawl. Every
//! save writes a complete new database, so there are no migrations: a file
//! whose `schema_version` differs from `SCHEMA_VERSION` is treated as corrupt.

/// Version stored in the `meta` table
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the cache database
pub const SCHEMA_SQL: &str = r#"
-- Snapshot metadata (schema_version, strategy, saved_at)
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- One row per crawled URL, seq preserves discovery order
CREATE TABLE IF NOT EXISTS pages (
    seq INTEGER PRIMARY KEY,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    parent_url TEXT,
    depth INTEGER NOT NULL,
    is_html INTEGER NOT NULL,
    outcome TEXT NOT NULL,
    status_code INTEGER
);

-- Discovery path of each page, seed hop first
CREATE TABLE IF NOT EXISTS path_hops (
    page_url TEXT NOT NULL REFERENCES pages(url),
    seq INTEGER NOT NULL,
    hop_url TEXT NOT NULL,
    anchor_text TEXT NOT NULL,
    PRIMARY KEY (page_url, seq)
);

-- In-scope outbound links of each page, in extraction order
CREATE TABLE IF NOT EXISTS page_links (
    page_url TEXT NOT NULL REFERENCES pages(url),
    seq INTEGER NOT NULL,
    target TEXT NOT NULL,
    anchor_text TEXT NOT NULL,
    PRIMARY KEY (page_url, seq)
);

CREATE TABLE IF NOT EXISTS visited (
    url TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS stats_counters (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pages_per_depth (
    depth INTEGER PRIMARY KEY,
    count INTEGER NOT NULL
);
"#;

/// Tables a readable cache must contain
pub const REQUIRED_TABLES: &[&str] = &[
    "meta",
    "pages",
    "path_hops",
    "page_links",
    "visited",
    "stats_counters",
    "pages_per_depth",
];

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Returns the required tables missing from a database
pub fn missing_tables(conn: &rusqlite::Connection) -> Result<Vec<&'static str>, rusqlite::Error> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let mut missing = Vec::new();
    for table in REQUIRED_TABLES {
        let count: i64 = stmt.query_row([table], |row| row.get(0))?;
        if count == 0 {
            missing.push(*table);
        }
    }
    Ok(missing)
}
