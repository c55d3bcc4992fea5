//! SQLite-backed persistence for the menu catalog.
//!
//! The catalog is logically append-only: hydration inserts records, reset
//! drops everything. There is no per-record update path. Every operation
//! runs its blocking SQLite work on the tokio blocking pool and is
//! transactional - a failed call leaves the store as it was.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::{params, params_from_iter, Connection};
use tracing::debug;

use crate::models::{MenuItem, NewMenuItem};

use super::StoreError;

const CREATE_MENU_TABLE_SQL: &str = "
CREATE TABLE IF NOT EXISTS menu (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price NUMERIC NOT NULL,
    description TEXT NOT NULL,
    image TEXT NOT NULL,
    category TEXT NOT NULL
)";

const SELECT_ALL_SQL: &str =
    "SELECT id, name, price, description, image, category FROM menu ORDER BY id";

/// Durable storage for the menu catalog.
/// Clone is cheap - the underlying connection is shared behind an Arc.
#[derive(Clone)]
pub struct MenuStore {
    conn: Arc<Mutex<Connection>>,
}

impl MenuStore {
    /// Open (creating if necessary) the catalog database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "menu database opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            // A poisoned lock still holds a usable connection.
            let mut conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut conn)
        })
        .await?
    }

    /// Create the catalog table if it does not exist. Idempotent; the other
    /// operations also run this first, so reads on a fresh database see an
    /// empty catalog rather than a missing-table error.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(CREATE_MENU_TABLE_SQL, [])?;
            Ok(())
        })
        .await
    }

    /// Persist a catalog record, assigning it a fresh id, and return the
    /// stored record. Malformed input is rejected before any write.
    pub async fn insert(&self, item: NewMenuItem) -> Result<MenuItem, StoreError> {
        validate(&item)?;
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(CREATE_MENU_TABLE_SQL, [])?;
            tx.execute(
                "INSERT INTO menu (name, price, description, image, category)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.name,
                    item.price,
                    item.description,
                    item.image,
                    item.category
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            debug!(id, name = %item.name, "menu item inserted");
            Ok(MenuItem {
                id,
                name: item.name,
                price: item.price,
                description: item.description,
                image: item.image,
                category: item.category,
            })
        })
        .await
    }

    /// Every record in insertion order. An empty store yields an empty vec,
    /// not an error.
    pub async fn select_all(&self) -> Result<Vec<MenuItem>, StoreError> {
        self.with_conn(|conn| {
            conn.execute(CREATE_MENU_TABLE_SQL, [])?;
            let mut stmt = conn.prepare(SELECT_ALL_SQL)?;
            let rows = stmt.query_map([], row_to_item)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    /// Records whose name contains `query` as a case-insensitive substring
    /// and, when `categories` is non-empty, whose category is in the set.
    ///
    /// Category values come from the UI and are treated as untrusted: they
    /// are bound as parameters, never spliced into the SQL text. Each is
    /// lowercased before binding; stored categories are already canonical
    /// lowercase.
    pub async fn filter(
        &self,
        categories: &[String],
        query: &str,
    ) -> Result<Vec<MenuItem>, StoreError> {
        let pattern = format!("%{}%", escape_like(query));
        let categories: Vec<String> = categories.iter().map(|c| c.to_lowercase()).collect();
        self.with_conn(move |conn| {
            conn.execute(CREATE_MENU_TABLE_SQL, [])?;

            let mut sql = String::from(
                "SELECT id, name, price, description, image, category FROM menu \
                 WHERE name LIKE ? ESCAPE '\\'",
            );
            let mut bindings: Vec<String> = Vec::with_capacity(1 + categories.len());
            bindings.push(pattern);
            if !categories.is_empty() {
                let placeholders = vec!["?"; categories.len()].join(", ");
                sql.push_str(&format!(" AND category IN ({placeholders})"));
                bindings.extend(categories);
            }
            sql.push_str(" ORDER BY id");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(bindings.iter()), row_to_item)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    /// Drop the catalog wholesale. Irreversible; the next operation
    /// recreates an empty, valid store.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DROP TABLE IF EXISTS menu", [])?;
            tx.commit()?;
            debug!("menu catalog dropped");
            Ok(())
        })
        .await
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<MenuItem> {
    Ok(MenuItem {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        description: row.get(3)?,
        image: row.get(4)?,
        category: row.get(5)?,
    })
}

/// Reject records that would violate the catalog invariants before any
/// write happens.
fn validate(item: &NewMenuItem) -> Result<(), StoreError> {
    if item.name.trim().is_empty() {
        return Err(StoreError::InvalidItem("name must not be empty".into()));
    }
    if !item.price.is_finite() || item.price < 0.0 {
        return Err(StoreError::InvalidItem(format!(
            "price must be a non-negative number, got {}",
            item.price
        )));
    }
    if item.image.is_empty() {
        return Err(StoreError::InvalidItem("image URL must not be empty".into()));
    }
    if item.category.is_empty() {
        return Err(StoreError::InvalidItem("category must not be empty".into()));
    }
    Ok(())
}

/// Escape LIKE wildcards so the search term matches as a literal substring.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, category: &str) -> NewMenuItem {
        NewMenuItem {
            name: name.to_string(),
            price: 10.0,
            description: format!("{name}, as served in the restaurant"),
            image: "https://example.com/dish.jpg".to_string(),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn select_all_on_fresh_store_is_empty() {
        let store = MenuStore::open_in_memory().unwrap();
        assert!(store.select_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MenuStore::open_in_memory().unwrap();
        let first = store.insert(item("Greek Salad", "starters")).await.unwrap();
        let second = store.insert(item("Lemon Cake", "desserts")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.name, "Greek Salad");
        assert_eq!(first.category, "starters");
    }

    #[tokio::test]
    async fn insert_rejects_malformed_items() {
        let store = MenuStore::open_in_memory().unwrap();

        let blank_name = NewMenuItem {
            name: "   ".into(),
            ..item("x", "starters")
        };
        assert!(matches!(
            store.insert(blank_name).await,
            Err(StoreError::InvalidItem(_))
        ));

        let negative_price = NewMenuItem {
            price: -1.0,
            ..item("Bruschetta", "starters")
        };
        assert!(matches!(
            store.insert(negative_price).await,
            Err(StoreError::InvalidItem(_))
        ));

        let nan_price = NewMenuItem {
            price: f64::NAN,
            ..item("Bruschetta", "starters")
        };
        assert!(matches!(
            store.insert(nan_price).await,
            Err(StoreError::InvalidItem(_))
        ));

        // Nothing was committed by the failed attempts.
        assert!(store.select_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn select_all_preserves_insertion_order() {
        let store = MenuStore::open_in_memory().unwrap();
        for name in ["Hummus", "Greek Salad", "Lemon Cake", "Pasta"] {
            store.insert(item(name, "mains")).await.unwrap();
        }
        let names: Vec<String> = store
            .select_all()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, ["Hummus", "Greek Salad", "Lemon Cake", "Pasta"]);
    }

    #[tokio::test]
    async fn filter_without_criteria_returns_everything_in_order() {
        let store = MenuStore::open_in_memory().unwrap();
        store.insert(item("Greek Salad", "starters")).await.unwrap();
        store.insert(item("Lemon Cake", "desserts")).await.unwrap();

        let all = store.filter(&[], "").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Greek Salad");
        assert_eq!(all[1].name, "Lemon Cake");
    }

    #[tokio::test]
    async fn filter_matches_category_and_term_together() {
        let store = MenuStore::open_in_memory().unwrap();
        store.insert(item("Greek Salad", "starters")).await.unwrap();
        store.insert(item("Lemon Cake", "desserts")).await.unwrap();

        // The category set arrives display-cased from the UI.
        let desserts = vec!["Desserts".to_string()];

        let hits = store.filter(&desserts, "cake").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Lemon Cake");

        let misses = store.filter(&desserts, "salad").await.unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn filter_term_is_case_insensitive() {
        let store = MenuStore::open_in_memory().unwrap();
        store.insert(item("Greek Salad", "starters")).await.unwrap();

        let hits = store.filter(&[], "GREEK").await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn hostile_category_value_is_harmless() {
        let store = MenuStore::open_in_memory().unwrap();
        store.insert(item("Greek Salad", "starters")).await.unwrap();
        store.insert(item("Lemon Cake", "desserts")).await.unwrap();

        let hostile = vec!["desserts'); DROP TABLE menu; --".to_string()];
        let hits = store.filter(&hostile, "").await.unwrap();
        assert!(hits.is_empty());

        // The catalog survived untouched.
        assert_eq!(store.select_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn like_wildcards_in_the_term_match_literally() {
        let store = MenuStore::open_in_memory().unwrap();
        store.insert(item("100% Rye Bread", "mains")).await.unwrap();
        store.insert(item("Regular Rye Bread", "mains")).await.unwrap();

        let hits = store.filter(&[], "100%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% Rye Bread");

        // A bare wildcard is just a character that appears in one name.
        let hits = store.filter(&[], "%").await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = store.filter(&[], "_").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn reset_clears_the_catalog_and_store_stays_usable() {
        let store = MenuStore::open_in_memory().unwrap();
        store.insert(item("Greek Salad", "starters")).await.unwrap();

        store.reset().await.unwrap();
        assert!(store.select_all().await.unwrap().is_empty());

        // The store recreates itself on the next write.
        store.insert(item("Lemon Cake", "desserts")).await.unwrap();
        assert_eq!(store.select_all().await.unwrap().len(), 1);
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\now"), "50\\%\\_off\\\\now");
        assert_eq!(escape_like("plain"), "plain");
    }
}
