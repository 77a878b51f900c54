use crate::config::Config;
use crate::model::{Book, BookId};
use anyhow::{Context, Result};
use libsql::{Builder, Connection, Database as LibsqlDatabase, Row};

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[("001_books.sql", include_str!("migrations/001_books.sql"))];

const REMOTE_SCHEMES: &[&str] = &["libsql://", "http://", "https://", "ws://", "wss://"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    Remote(String),
    Memory,
    Local(String),
}

impl StorageTarget {
    pub fn parse(connection_string: &str) -> Self {
        let s = connection_string.trim();
        if REMOTE_SCHEMES.iter().any(|scheme| s.starts_with(scheme)) {
            return StorageTarget::Remote(s.to_string());
        }
        if s == ":memory:" {
            return StorageTarget::Memory;
        }
        StorageTarget::Local(s.strip_prefix("file:").unwrap_or(s).to_string())
    }
}

/// The single storage handle shared by every request.
pub struct Database {
    // keeps the underlying database open for as long as `conn` is in use
    _db: LibsqlDatabase,
    conn: Connection,
}

impl Database {
    pub async fn new(cfg: &Config) -> Result<Self> {
        let db = match StorageTarget::parse(cfg.app.get_database()) {
            StorageTarget::Remote(url) => {
                tracing::info!("[db] connecting to remote database");
                let token = cfg.app.get_auth_token().unwrap_or_default().to_string();
                Builder::new_remote(url, token).build().await?
            }
            StorageTarget::Memory => {
                tracing::info!("[db] using in-memory database");
                Builder::new_local(":memory:").build().await?
            }
            StorageTarget::Local(path) => {
                tracing::info!(path = %path, "[db] opening local database");
                Builder::new_local(&path).build().await?
            }
        };

        let conn = db.connect()?;
        conn.query("SELECT 1", ())
            .await
            .context("database did not answer a ping")?;

        for (filename, sql) in SYSTEM_MIGRATIONS.iter().chain(MIGRATIONS) {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database { _db: db, conn })
    }

    /// Before the system migration has run there is no `_migrations` table;
    /// that is the only error read as "not applied".
    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        match conn
            .query("SELECT 1 FROM _migrations WHERE name = ?", libsql::params![name])
            .await
        {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) if e.to_string().contains("no such table") => Ok(false),
            Err(e) => Err(e).context("failed to read applied migrations"),
        }
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .with_context(|| format!("failed to execute migration {name}"))?;

        conn.execute(
            "INSERT OR IGNORE INTO _migrations (name, applied_at) VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
            libsql::params![name],
        )
        .await?;
        Ok(())
    }

    fn row_to_book(row: &Row) -> Result<Book> {
        let raw_comments: String = row.get(2)?;
        let comments = serde_json::from_str(&raw_comments)
            .with_context(|| format!("malformed comments column: {raw_comments}"))?;

        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            comments,
        })
    }

    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let mut rows = self
            .conn
            .query("SELECT id, title, comments FROM books", ())
            .await?;

        let mut books = vec![];
        while let Some(row) = rows.next().await? {
            books.push(Self::row_to_book(&row)?);
        }
        Ok(books)
    }

    pub async fn create_book(&self, title: &str) -> Result<Book> {
        let query = r#"
            INSERT INTO books (title, comments)
            VALUES (?, '[]')
            RETURNING id, title, comments
        "#;

        let mut rows = self.conn.query(query, libsql::params![title]).await?;
        match rows.next().await? {
            Some(row) => Self::row_to_book(&row),
            None => anyhow::bail!("insert returned no row"),
        }
    }

    pub async fn get_book(&self, id: BookId) -> Result<Option<Book>> {
        let mut rows = self
            .conn
            .query("SELECT id, title, comments FROM books WHERE id = ?", libsql::params![id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_book(&row)?)),
            None => Ok(None),
        }
    }

    /// Appends in a single statement so concurrent comments never overwrite each other.
    pub async fn add_comment(&self, id: BookId, comment: &str) -> Result<Option<Book>> {
        let query = r#"
            UPDATE books
            SET comments = json_insert(comments, '$[#]', ?)
            WHERE id = ?
            RETURNING id, title, comments
        "#;

        let mut rows = self.conn.query(query, libsql::params![comment, id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_book(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn delete_book(&self, id: BookId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM books WHERE id = ?", libsql::params![id])
            .await?;
        Ok(deleted > 0)
    }

    pub async fn delete_all_books(&self) -> Result<u64> {
        Ok(self.conn.execute("DELETE FROM books", ()).await?)
    }
}
