use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::generate::{GenerationSession, Level};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sessions (
            id            INTEGER PRIMARY KEY,
            course_name   TEXT NOT NULL,
            level         TEXT,
            num_classes   INTEGER NOT NULL,
            syllabus_link TEXT,
            outline_link  TEXT,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS class_documents (
            id          INTEGER PRIMARY KEY,
            session_id  INTEGER NOT NULL REFERENCES sessions(id),
            part        INTEGER NOT NULL,
            link        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(session_id, part)
        );
        CREATE INDEX IF NOT EXISTS idx_class_docs_session ON class_documents(session_id);

        -- Generator responses keyed by the exact prompt
        CREATE TABLE IF NOT EXISTS prompt_cache (
            prompt     TEXT PRIMARY KEY,
            response   TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Sessions ──

/// Insert or update `session`; returns its id.
pub fn save_session(conn: &Connection, session: &GenerationSession) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let level = session.level.map(Level::as_str);
    let id = match session.id {
        Some(id) => {
            tx.execute(
                "UPDATE sessions SET course_name = ?1, level = ?2, num_classes = ?3,
                 syllabus_link = ?4, outline_link = ?5 WHERE id = ?6",
                params![
                    session.course_name,
                    level,
                    session.num_classes,
                    session.syllabus_link,
                    session.outline_link,
                    id
                ],
            )?;
            id
        }
        None => {
            tx.execute(
                "INSERT INTO sessions (course_name, level, num_classes, syllabus_link, outline_link)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session.course_name,
                    level,
                    session.num_classes,
                    session.syllabus_link,
                    session.outline_link
                ],
            )?;
            tx.last_insert_rowid()
        }
    };

    tx.execute("DELETE FROM class_documents WHERE session_id = ?1", params![id])?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO class_documents (session_id, part, link) VALUES (?1, ?2, ?3)")?;
        for (i, link) in session.class_links.iter().enumerate() {
            stmt.execute(params![id, (i + 1) as i64, link])?;
        }
    }
    tx.commit()?;
    Ok(id)
}

/// The session with `id`, or the most recent one when `id` is `None`.
pub fn load_session(conn: &Connection, id: Option<i64>) -> Result<Option<GenerationSession>> {
    let sql = match id {
        Some(_) => {
            "SELECT id, course_name, level, num_classes, syllabus_link, outline_link, created_at
             FROM sessions WHERE id = ?1"
        }
        None => {
            "SELECT id, course_name, level, num_classes, syllabus_link, outline_link, created_at
             FROM sessions WHERE ?1 IS NULL ORDER BY id DESC LIMIT 1"
        }
    };
    let session = conn
        .query_row(sql, params![id], |row| {
            let level: Option<String> = row.get(2)?;
            Ok(GenerationSession {
                id: Some(row.get(0)?),
                course_name: row.get(1)?,
                level: level.as_deref().and_then(Level::parse),
                num_classes: row.get(3)?,
                syllabus_link: row.get(4)?,
                outline_link: row.get(5)?,
                class_links: Vec::new(),
                created_at: row.get(6)?,
            })
        })
        .optional()?;

    let Some(mut session) = session else {
        return Ok(None);
    };
    if let Some(id) = session.id {
        session.class_links = fetch_class_links(conn, id)?;
    }
    Ok(Some(session))
}

fn fetch_class_links(conn: &Connection, session_id: i64) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT link FROM class_documents WHERE session_id = ?1 ORDER BY part")?;
    let rows = stmt
        .query_map(params![session_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(rows)
}

pub fn list_sessions(conn: &Connection, limit: usize) -> Result<Vec<GenerationSession>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM sessions ORDER BY id DESC LIMIT ?1",
    )?;
    let ids = stmt
        .query_map(params![limit as i64], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    let mut sessions = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(s) = load_session(conn, Some(id))? {
            sessions.push(s);
        }
    }
    Ok(sessions)
}

// ── Prompt cache ──

pub fn cached_response(conn: &Connection, prompt: &str) -> Result<Option<String>> {
    let hit = conn
        .query_row(
            "SELECT response FROM prompt_cache WHERE prompt = ?1",
            params![prompt],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit)
}

pub fn store_response(conn: &Connection, prompt: &str, response: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO prompt_cache (prompt, response) VALUES (?1, ?2)",
        params![prompt, response],
    )?;
    Ok(())
}

pub fn forget_response(conn: &Connection, prompt: &str) -> Result<bool> {
    let n = conn.execute("DELETE FROM prompt_cache WHERE prompt = ?1", params![prompt])?;
    Ok(n > 0)
}
