use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nt_core::{ArticleStorage, CuratedArticle, CuratedArticleSubmission, Error, Result};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS curated_articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        url TEXT NOT NULL,
        image_url TEXT NOT NULL DEFAULT '',
        published_at TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display()))
            .await
            .map_err(|e| Error::Persistence(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Persistence(format!("Failed to run migration {}: {}", i, e)))?;
        }

        tracing::info!("Opened curated article store at {}", db_path.display());
        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

fn row_to_article(row: &SqliteRow) -> Result<CuratedArticle> {
    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Parse(format!("created_at {:?}: {}", created_at, e)))?
        .with_timezone(&Utc);

    Ok(CuratedArticle {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        url: row.get("url"),
        image_url: row.get("image_url"),
        published_at: row.get("published_at"),
        created_at,
    })
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn list_curated(&self) -> Result<Vec<CuratedArticle>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, url, image_url, published_at, created_at
            FROM curated_articles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Persistence(format!("Failed to list curated articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn store_curated(&self, submission: &CuratedArticleSubmission) -> Result<CuratedArticle> {
        let record = CuratedArticle {
            id: Uuid::new_v4().to_string(),
            title: submission.title.trim().to_string(),
            description: submission.description.clone().unwrap_or_default(),
            url: submission.url.trim().to_string(),
            image_url: submission.image_url.clone().unwrap_or_default(),
            published_at: submission.published_at.trim().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO curated_articles
            (id, title, description, url, image_url, published_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.url)
        .bind(&record.image_url)
        .bind(&record.published_at)
        .bind(record.created_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Persistence(format!("Failed to store curated article: {}", e)))?;

        Ok(record)
    }

    async fn update_image(&self, id: &str, image_url: &str) -> Result<()> {
        let result = sqlx::query("UPDATE curated_articles SET image_url = ? WHERE id = ?")
            .bind(image_url)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::Persistence(format!("Failed to update image: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(Error::Persistence(format!("No curated article with id {}", id)));
        }
        Ok(())
    }
}
