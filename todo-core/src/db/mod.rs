mod schema;
mod tree;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{Result, TodoError};
use crate::id::{ItemId, ListId};
use crate::models::*;
use crate::store::TreeStore;

/// SQLite-backed [`TreeStore`].
///
/// Cloning is cheap and shares the underlying connection. Each operation holds
/// the connection for its full duration, which serializes all mutations and
/// gives every read a consistent view.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "hierarchical-todo")
            .ok_or(TodoError::NoDataDir)?;
        let db_path = dirs.data_dir().join("todo.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.lock()?;
        schema::run_migrations(&mut conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| TodoError::Poisoned)
    }
}

impl TreeStore for Database {
    // ============================================================
    // List operations
    // ============================================================

    fn create_list(&self, title: Option<String>) -> Result<List> {
        let conn = self.lock()?;
        let id = ListId::generate();
        let now = Utc::now();
        let title = title.unwrap_or_else(|| DEFAULT_LIST_TITLE.to_string());

        conn.execute(
            "INSERT INTO lists (id, title, created_at, updated_at) VALUES (?, ?, ?, ?)",
            (id.as_str(), &title, now.to_rfc3339(), now.to_rfc3339()),
        )?;
        tracing::debug!(list_id = %id, "Created list");

        Ok(List {
            id,
            title,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_list(&self, id: &ListId) -> Result<List> {
        let conn = self.lock()?;
        fetch_list(&conn, id)?.ok_or_else(|| TodoError::ListNotFound(id.clone()))
    }

    fn list_all(&self) -> Result<Vec<List>> {
        let conn = self.lock()?;
        all_lists(&conn)
    }

    fn update_list_title(&self, id: &ListId, title: String) -> Result<List> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let existing = fetch_list(&tx, id)?.ok_or_else(|| TodoError::ListNotFound(id.clone()))?;
        let now = Utc::now();

        tx.execute(
            "UPDATE lists SET title = ?, updated_at = ? WHERE id = ?",
            (&title, now.to_rfc3339(), id.as_str()),
        )?;
        tx.commit()?;

        Ok(List {
            title,
            updated_at: now,
            ..existing
        })
    }

    fn delete_list(&self, id: &ListId) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if fetch_list(&tx, id)?.is_none() {
            return Err(TodoError::ListNotFound(id.clone()));
        }

        let doomed = tree::descendants(&tx, &ParentRef::List(id.clone()))?;
        let removed = tree::delete_items(&tx, &doomed)?;
        tx.execute("DELETE FROM lists WHERE id = ?", [id.as_str()])?;
        tx.commit()?;

        tracing::debug!(list_id = %id, items_removed = removed, "Deleted list");
        Ok(())
    }

    // ============================================================
    // Item operations
    // ============================================================

    fn create_item(&self, parent: &ParentRef, content: String) -> Result<Item> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        ensure_parent_exists(&tx, parent)?;

        let id = ItemId::generate();
        let now = Utc::now();
        tx.execute(
            "INSERT INTO items (id, content, parent_list_id, parent_item_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.as_str(),
                &content,
                parent.list_id().map(ListId::as_str),
                parent.item_id().map(ItemId::as_str),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        tx.commit()?;
        tracing::debug!(item_id = %id, parent = ?parent, "Created item");

        Ok(Item {
            id,
            content,
            parent: parent.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_item(&self, id: &ItemId) -> Result<Item> {
        let conn = self.lock()?;
        fetch_item(&conn, id)?.ok_or_else(|| TodoError::ItemNotFound(id.clone()))
    }

    fn update_item_content(&self, id: &ItemId, content: String) -> Result<Item> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let existing = fetch_item(&tx, id)?.ok_or_else(|| TodoError::ItemNotFound(id.clone()))?;
        let now = Utc::now();

        tx.execute(
            "UPDATE items SET content = ?, updated_at = ? WHERE id = ?",
            (&content, now.to_rfc3339(), id.as_str()),
        )?;
        tx.commit()?;

        Ok(Item {
            content,
            updated_at: now,
            ..existing
        })
    }

    fn delete_item(&self, id: &ItemId) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let item = fetch_item(&tx, id)?.ok_or_else(|| TodoError::ItemNotFound(id.clone()))?;

        let mut doomed = vec![item];
        doomed.extend(tree::descendants(&tx, &ParentRef::Item(id.clone()))?);
        let removed = tree::delete_items(&tx, &doomed)?;
        tx.commit()?;

        tracing::debug!(item_id = %id, items_removed = removed, "Deleted item");
        Ok(())
    }

    fn move_item(&self, id: &ItemId, target: &ParentRef) -> Result<Item> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let existing = fetch_item(&tx, id)?.ok_or_else(|| TodoError::ItemNotFound(id.clone()))?;
        ensure_parent_exists(&tx, target)?;

        if let ParentRef::Item(target_id) = target {
            if tree::is_within(&tx, id, target_id)? {
                tracing::warn!(item_id = %id, target = %target_id, "Rejected move into own subtree");
                return Err(TodoError::Cycle {
                    item: id.clone(),
                    target: target_id.clone(),
                });
            }
        }

        let now = Utc::now();
        tx.execute(
            "UPDATE items SET parent_list_id = ?, parent_item_id = ?, updated_at = ? WHERE id = ?",
            (
                target.list_id().map(ListId::as_str),
                target.item_id().map(ItemId::as_str),
                now.to_rfc3339(),
                id.as_str(),
            ),
        )?;
        tx.commit()?;
        tracing::debug!(item_id = %id, from = ?existing.parent, to = ?target, "Moved item");

        Ok(Item {
            parent: target.clone(),
            updated_at: now,
            ..existing
        })
    }

    // ============================================================
    // Snapshots
    // ============================================================

    fn snapshot_list(&self, id: &ListId) -> Result<ListSnapshot> {
        let conn = self.lock()?;
        let list = fetch_list(&conn, id)?.ok_or_else(|| TodoError::ListNotFound(id.clone()))?;
        let items = tree::descendants(&conn, &ParentRef::List(list.id.clone()))?;
        Ok(ListSnapshot { list, items })
    }

    fn snapshot_all(&self) -> Result<Vec<ListSnapshot>> {
        let conn = self.lock()?;
        all_lists(&conn)?
            .into_iter()
            .map(|list| -> Result<ListSnapshot> {
                let items = tree::descendants(&conn, &ParentRef::List(list.id.clone()))?;
                Ok(ListSnapshot { list, items })
            })
            .collect()
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn fetch_list(conn: &Connection, id: &ListId) -> Result<Option<List>> {
    let list = conn
        .query_row(
            "SELECT id, title, created_at, updated_at FROM lists WHERE id = ?",
            [id.as_str()],
            list_from_row,
        )
        .optional()?;
    Ok(list)
}

fn all_lists(conn: &Connection) -> Result<Vec<List>> {
    let mut stmt =
        conn.prepare("SELECT id, title, created_at, updated_at FROM lists ORDER BY rowid")?;
    let lists = stmt
        .query_map([], list_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lists)
}

fn fetch_item(conn: &Connection, id: &ItemId) -> Result<Option<Item>> {
    let item = conn
        .query_row(
            "SELECT id, content, parent_list_id, parent_item_id, created_at, updated_at
             FROM items WHERE id = ?",
            [id.as_str()],
            item_from_row,
        )
        .optional()?;
    Ok(item)
}

fn ensure_parent_exists(conn: &Connection, parent: &ParentRef) -> Result<()> {
    match parent {
        ParentRef::List(list_id) => {
            if fetch_list(conn, list_id)?.is_none() {
                return Err(TodoError::ListNotFound(list_id.clone()));
            }
        }
        ParentRef::Item(item_id) => {
            if fetch_item(conn, item_id)?.is_none() {
                return Err(TodoError::ItemNotFound(item_id.clone()));
            }
        }
    }
    Ok(())
}

fn list_from_row(row: &Row<'_>) -> rusqlite::Result<List> {
    Ok(List {
        id: ListId::from(row.get::<_, String>(0)?),
        title: row.get(1)?,
        created_at: parse_datetime(row.get::<_, String>(2)?),
        updated_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

pub(crate) fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let parent_list = row.get::<_, Option<String>>(2)?;
    let parent_item = row.get::<_, Option<String>>(3)?;
    let parent = match (parent_list, parent_item) {
        (Some(list_id), None) => ParentRef::List(ListId::from(list_id)),
        (None, Some(item_id)) => ParentRef::Item(ItemId::from(item_id)),
        _ => {
            return Err(rusqlite::Error::InvalidColumnType(
                2,
                "parent_list_id".to_string(),
                rusqlite::types::Type::Null,
            ))
        }
    };

    Ok(Item {
        id: ItemId::from(row.get::<_, String>(0)?),
        content: row.get(1)?,
        parent,
        created_at: parse_datetime(row.get::<_, String>(4)?),
        updated_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
