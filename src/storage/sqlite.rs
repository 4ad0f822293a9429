//! SQLite cache implementation
//!
//! Saves go to a sibling `<file>.tmp` database which is renamed over the
//! cache file only after the transaction commits.

use crate::crawler::Strategy;
use crate::state::{CrawlStats, FetchOutcome, PageLink, PageRecord, PageStore, PathHop, VisitedSet};
use crate::storage::schema::{initialize_schema, missing_tables, SCHEMA_VERSION};
use crate::storage::traits::{CacheStore, StorageError, StorageResult};
use crate::storage::CrawlSnapshot;
use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Transaction};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Cache backed by one SQLite file
#[derive(Debug, Clone)]
pub struct SqliteCache {
    path: PathBuf,
}

impl SqliteCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl CacheStore for SqliteCache {
    fn save(
        &self,
        pages: &PageStore,
        visited: &VisitedSet,
        stats: &CrawlStats,
        strategy: Strategy,
    ) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        if temp.exists() {
            fs::remove_file(&temp)?;
        }

        let result = write_snapshot(&temp, pages, visited, stats, strategy)
            .and_then(|()| fs::rename(&temp, &self.path).map_err(StorageError::from));

        if result.is_err() && temp.exists() {
            if let Err(e) = fs::remove_file(&temp) {
                tracing::warn!("Failed to remove temporary cache {}: {}", temp.display(), e);
            }
        }

        if result.is_ok() {
            tracing::debug!(
                "Saved {} pages and {} visited URLs to {}",
                pages.len(),
                visited.len(),
                self.path.display()
            );
        }
        result
    }

    fn load(&self) -> StorageResult<Option<CrawlSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        read_snapshot(&conn).map(Some)
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

fn write_snapshot(
    path: &Path,
    pages: &PageStore,
    visited: &VisitedSet,
    stats: &CrawlStats,
    strategy: Strategy,
) -> StorageResult<()> {
    let mut conn = Connection::open(path)?;
    initialize_schema(&conn)?;

    let tx = conn.transaction()?;
    write_meta(&tx, strategy)?;
    write_pages(&tx, pages)?;
    write_visited(&tx, visited)?;
    write_stats(&tx, stats)?;
    tx.commit()?;

    conn.close().map_err(|(_, e)| StorageError::Sqlite(e))?;
    Ok(())
}

fn write_meta(tx: &Transaction<'_>, strategy: Strategy) -> StorageResult<()> {
    let mut stmt = tx.prepare("INSERT INTO meta (key, value) VALUES (?1, ?2)")?;
    stmt.execute(params!["schema_version", SCHEMA_VERSION.to_string()])?;
    stmt.execute(params!["strategy", strategy.label()])?;
    stmt.execute(params!["saved_at", Utc::now().to_rfc3339()])?;
    Ok(())
}

fn write_pages(tx: &Transaction<'_>, pages: &PageStore) -> StorageResult<()> {
    let mut page_stmt = tx.prepare(
        "INSERT INTO pages (seq, url, title, body, parent_url, depth, is_html, outcome, status_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    let mut hop_stmt = tx.prepare(
        "INSERT INTO path_hops (page_url, seq, hop_url, anchor_text) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut link_stmt = tx.prepare(
        "INSERT INTO page_links (page_url, seq, target, anchor_text) VALUES (?1, ?2, ?3, ?4)",
    )?;

    for (seq, page) in pages.iter().enumerate() {
        page_stmt.execute(params![
            seq as i64,
            page.url,
            page.title,
            page.body,
            page.parent_url,
            page.depth as i64,
            page.is_html,
            page.outcome.to_db_string(),
            page.status_code.map(i64::from),
        ])?;

        for (i, hop) in page.path_info.iter().enumerate() {
            hop_stmt.execute(params![page.url, i as i64, hop.url, hop.anchor_text])?;
        }
        for (i, link) in page.links.iter().enumerate() {
            link_stmt.execute(params![page.url, i as i64, link.url, link.anchor_text])?;
        }
    }
    Ok(())
}

fn write_visited(tx: &Transaction<'_>, visited: &VisitedSet) -> StorageResult<()> {
    let mut stmt = tx.prepare("INSERT INTO visited (url) VALUES (?1)")?;
    for url in visited.iter() {
        stmt.execute(params![url])?;
    }
    Ok(())
}

fn write_stats(tx: &Transaction<'_>, stats: &CrawlStats) -> StorageResult<()> {
    let mut stmt = tx.prepare("INSERT INTO stats_counters (name, value) VALUES (?1, ?2)")?;
    for (name, value) in counters(stats) {
        stmt.execute(params![name, value as i64])?;
    }

    let mut stmt = tx.prepare("INSERT INTO pages_per_depth (depth, count) VALUES (?1, ?2)")?;
    for (depth, count) in &stats.pages_per_depth {
        stmt.execute(params![*depth as i64, *count as i64])?;
    }
    Ok(())
}

fn counters(stats: &CrawlStats) -> [(&'static str, u64); 6] {
    [
        ("links_extracted", stats.links_extracted),
        ("links_admitted", stats.links_admitted),
        ("http_errors", stats.http_errors),
        ("transport_errors", stats.transport_errors),
        ("non_html_pages", stats.non_html_pages),
        ("parse_errors", stats.parse_errors),
    ]
}

fn read_snapshot(conn: &Connection) -> StorageResult<CrawlSnapshot> {
    let missing = missing_tables(conn)?;
    if !missing.is_empty() {
        return Err(StorageError::Corrupt(format!(
            "missing tables: {}",
            missing.join(", ")
        )));
    }

    let version = read_meta(conn, "schema_version")?;
    if version != SCHEMA_VERSION.to_string() {
        return Err(StorageError::Corrupt(format!(
            "unsupported schema version {}",
            version
        )));
    }

    let label = read_meta(conn, "strategy")?;
    let strategy = label
        .parse::<Strategy>()
        .map_err(|_| StorageError::Corrupt(format!("unknown strategy '{}'", label)))?;

    Ok(CrawlSnapshot {
        pages: read_pages(conn)?,
        visited: read_visited(conn)?,
        stats: read_stats(conn)?,
        strategy,
    })
}

fn read_meta(conn: &Connection, key: &str) -> StorageResult<String> {
    conn.query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
        row.get(0)
    })
    .optional()?
    .ok_or_else(|| StorageError::Corrupt(format!("missing meta key '{}'", key)))
}

/// Reads (page_url, url, anchor_text) rows grouped by page, in seq order
fn read_grouped(conn: &Connection, sql: &str) -> StorageResult<HashMap<String, Vec<(String, String)>>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut grouped: HashMap<String, Vec<(String, String)>> = HashMap::new();
    for row in rows {
        let (page_url, url, anchor_text) = row?;
        grouped.entry(page_url).or_default().push((url, anchor_text));
    }
    Ok(grouped)
}

fn read_pages(conn: &Connection) -> StorageResult<PageStore> {
    let mut paths = read_grouped(
        conn,
        "SELECT page_url, hop_url, anchor_text FROM path_hops ORDER BY page_url, seq",
    )?;
    let mut links = read_grouped(
        conn,
        "SELECT page_url, target, anchor_text FROM page_links ORDER BY page_url, seq",
    )?;

    let mut stmt = conn.prepare(
        "SELECT url, title, body, parent_url, depth, is_html, outcome, status_code
         FROM pages ORDER BY seq",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, bool>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, Option<i64>>(7)?,
        ))
    })?;

    let mut store = PageStore::new();
    for row in rows {
        let (url, title, body, parent_url, depth, is_html, outcome, status_code) = row?;

        let depth = u32::try_from(depth)
            .map_err(|_| StorageError::Corrupt(format!("invalid depth {} for {}", depth, url)))?;
        let outcome = FetchOutcome::from_db_string(&outcome).ok_or_else(|| {
            StorageError::Corrupt(format!("unknown outcome '{}' for {}", outcome, url))
        })?;
        let status_code = status_code
            .map(u16::try_from)
            .transpose()
            .map_err(|_| StorageError::Corrupt(format!("invalid status code for {}", url)))?;

        let path_info = paths
            .remove(&url)
            .unwrap_or_default()
            .into_iter()
            .map(|(hop_url, anchor_text)| PathHop::new(hop_url, anchor_text))
            .collect();
        let page_links = links
            .remove(&url)
            .unwrap_or_default()
            .into_iter()
            .map(|(url, anchor_text)| PageLink { url, anchor_text })
            .collect();

        let record = PageRecord {
            url,
            title,
            body,
            parent_url,
            path_info,
            depth,
            is_html,
            outcome,
            status_code,
            links: page_links,
        };
        if !record.path_is_consistent() {
            return Err(StorageError::Corrupt(format!(
                "discovery path of {} does not match its depth",
                record.url
            )));
        }
        store.insert(record);
    }
    Ok(store)
}

fn read_visited(conn: &Connection) -> StorageResult<VisitedSet> {
    let mut stmt = conn.prepare("SELECT url FROM visited")?;
    let urls = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<VisitedSet, _>>()?;
    Ok(urls)
}

fn read_stats(conn: &Connection) -> StorageResult<CrawlStats> {
    let mut stats = CrawlStats::new();

    let mut stmt = conn.prepare("SELECT name, value FROM stats_counters")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (name, value) = row?;
        let value = value.max(0) as u64;
        match name.as_str() {
            "links_extracted" => stats.links_extracted = value,
            "links_admitted" => stats.links_admitted = value,
            "http_errors" => stats.http_errors = value,
            "transport_errors" => stats.transport_errors = value,
            "non_html_pages" => stats.non_html_pages = value,
            "parse_errors" => stats.parse_errors = value,
            other => tracing::debug!("Ignoring unknown cached counter '{}'", other),
        }
    }

    let mut stmt = conn.prepare("SELECT depth, count FROM pages_per_depth")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;
    for row in rows {
        let (depth, count) = row?;
        let depth = u32::try_from(depth)
            .map_err(|_| StorageError::Corrupt(format!("invalid histogram depth {}", depth)))?;
        stats.pages_per_depth.insert(depth, count.max(0) as u64);
    }

    Ok(stats)
}
