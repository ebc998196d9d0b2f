//! News repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::News;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Insert an article, returning it with its assigned id
    async fn create(&self, news: &News) -> Result<News>;

    async fn get_by_id(&self, id: i64) -> Result<Option<News>>;

    /// Every article in insertion order
    async fn list(&self) -> Result<Vec<News>>;

    /// Delete an article; `false` if no row had that id
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based news repository
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_NEWS: &str = "INSERT INTO news (title, content, date) VALUES (?, ?, ?)";
const SELECT_NEWS_BY_ID: &str = "SELECT id, title, content, date FROM news WHERE id = ?";
const SELECT_ALL_NEWS: &str = "SELECT id, title, content, date FROM news ORDER BY id";
const DELETE_NEWS: &str = "DELETE FROM news WHERE id = ?";

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, news: &News) -> Result<News> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, news).await?,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, news).await?,
        };
        Ok(News {
            id,
            ..news.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<News>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(DELETE_NEWS)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to delete news")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(DELETE_NEWS)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to delete news")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, news: &News) -> Result<i64> {
    let result = sqlx::query(INSERT_NEWS)
        .bind(&news.title)
        .bind(&news.content)
        .bind(news.date)
        .execute(pool)
        .await
        .context("Failed to create news")?;
    Ok(result.last_insert_rowid())
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<News>> {
    let row = sqlx::query(SELECT_NEWS_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news")?;
    row.as_ref().map(row_to_news_sqlite).transpose()
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<News>> {
    let rows = sqlx::query(SELECT_ALL_NEWS)
        .fetch_all(pool)
        .await
        .context("Failed to list news")?;
    rows.iter().map(row_to_news_sqlite).collect()
}

fn row_to_news_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<News> {
    Ok(News {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        date: row.try_get("date")?,
    })
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, news: &News) -> Result<i64> {
    let result = sqlx::query(INSERT_NEWS)
        .bind(&news.title)
        .bind(&news.content)
        .bind(news.date)
        .execute(pool)
        .await
        .context("Failed to create news")?;
    Ok(result.last_insert_id() as i64)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<News>> {
    let row = sqlx::query(SELECT_NEWS_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news")?;
    row.as_ref().map(row_to_news_mysql).transpose()
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<News>> {
    let rows = sqlx::query(SELECT_ALL_NEWS)
        .fetch_all(pool)
        .await
        .context("Failed to list news")?;
    rows.iter().map(row_to_news_mysql).collect()
}

fn row_to_news_mysql(row: &sqlx::mysql::MySqlRow) -> Result<News> {
    Ok(News {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        date: row.try_get("date")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::NaiveDate;

    async fn setup() -> SqlxNewsRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.unwrap();
        SqlxNewsRepository::new(pool)
    }

    fn article(title: &str, day: u32) -> News {
        News::new(
            title,
            format!("{} body", title),
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup().await;
        let created = repo.create(&article("Manifesto", 1)).await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().expect("News should exist");
        assert_eq!(fetched.title, "Manifesto");
        assert_eq!(fetched.content, "Manifesto body");
        assert_eq!(fetched.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = setup().await;
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let repo = setup().await;
        // Dates deliberately out of order: listing follows insertion.
        repo.create(&article("First", 20)).await.unwrap();
        repo.create(&article("Second", 3)).await.unwrap();
        repo.create(&article("Third", 11)).await.unwrap();

        let titles: Vec<String> = repo.list().await.unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup().await;
        let created = repo.create(&article("Gone", 1)).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
