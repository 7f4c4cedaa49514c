use action_extractor_schemas::{ActionItem, ActionItemId, Note, NoteId};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::info;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database and ensure the schema exists
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let db = Self { conn };
        db.init_schema()?;

        info!("Database initialized");
        Ok(db)
    }

    /// Create tables and indexes
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS action_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                note_id INTEGER,
                text TEXT NOT NULL,
                done INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_action_items_note_id
             ON action_items(note_id)",
            [],
        )?;

        Ok(())
    }

    // ========== NOTES ==========

    pub fn insert_note(&self, content: &str) -> Result<Note> {
        let created_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO notes (content, created_at) VALUES (?1, ?2)",
            params![content, created_at],
        )?;

        Ok(Note {
            id: NoteId(self.conn.last_insert_rowid()),
            content: content.to_string(),
            created_at,
        })
    }

    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                "SELECT id, content, created_at FROM notes WHERE id = ?1",
                params![id.0],
                Self::row_to_note,
            )
            .optional()?;

        Ok(note)
    }

    pub fn list_notes(&self) -> Result<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, content, created_at FROM notes ORDER BY id DESC")?;

        let notes = stmt
            .query_map([], Self::row_to_note)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    pub fn count_notes(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========== ACTION ITEMS ==========

    /// Insert a batch of extracted items in one transaction, all linked to
    /// the same (optional) note. Returns the assigned ids in input order.
    pub fn insert_action_items(
        &mut self,
        texts: &[String],
        note_id: Option<NoteId>,
    ) -> Result<Vec<ActionItemId>> {
        let created_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        let mut ids = Vec::with_capacity(texts.len());
        for text in texts {
            tx.execute(
                "INSERT INTO action_items (note_id, text, done, created_at)
                 VALUES (?1, ?2, 0, ?3)",
                params![note_id.map(|n| n.0), text, created_at],
            )?;
            ids.push(ActionItemId(tx.last_insert_rowid()));
        }

        tx.commit()?;
        Ok(ids)
    }

    pub fn list_action_items(&self, note_id: Option<NoteId>) -> Result<Vec<ActionItem>> {
        let items = match note_id {
            Some(note_id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, note_id, text, done, created_at FROM action_items
                     WHERE note_id = ?1 ORDER BY id DESC",
                )?;
                let items = stmt
                    .query_map(params![note_id.0], Self::row_to_action_item)?
                    .collect::<Result<Vec<_>, _>>()?;
                items
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, note_id, text, done, created_at FROM action_items
                     ORDER BY id DESC",
                )?;
                let items = stmt
                    .query_map([], Self::row_to_action_item)?
                    .collect::<Result<Vec<_>, _>>()?;
                items
            }
        };

        Ok(items)
    }

    pub fn get_action_item(&self, id: ActionItemId) -> Result<Option<ActionItem>> {
        let item = self
            .conn
            .query_row(
                "SELECT id, note_id, text, done, created_at FROM action_items WHERE id = ?1",
                params![id.0],
                Self::row_to_action_item,
            )
            .optional()?;

        Ok(item)
    }

    /// Set the done flag. Returns false when no row has that id.
    pub fn mark_action_item_done(&self, id: ActionItemId, done: bool) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE action_items SET done = ?1 WHERE id = ?2",
            params![done, id.0],
        )?;

        Ok(rows > 0)
    }

    pub fn count_action_items(&self) -> Result<i64> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM action_items", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========== ROW MAPPERS ==========

    fn row_to_note(row: &Row) -> rusqlite::Result<Note> {
        Ok(Note {
            id: NoteId(row.get(0)?),
            content: row.get(1)?,
            created_at: row.get(2)?,
        })
    }

    fn row_to_action_item(row: &Row) -> rusqlite::Result<ActionItem> {
        Ok(ActionItem {
            id: ActionItemId(row.get(0)?),
            note_id: row.get::<_, Option<i64>>(1)?.map(NoteId),
            text: row.get(2)?,
            done: row.get::<_, i64>(3)? != 0,
            created_at: row.get(4)?,
        })
    }
}
