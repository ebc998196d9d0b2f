//! News service

use crate::db::repositories::NewsRepository;
use crate::models::{News, NEWS_TITLE_MAX_LENGTH};
use anyhow::Context;
use chrono::NaiveDate;
use std::sync::Arc;

/// Error types for news operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("News not found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// News service
pub struct NewsService {
    repo: Arc<dyn NewsRepository>,
}

impl NewsService {
    pub fn new(repo: Arc<dyn NewsRepository>) -> Self {
        Self { repo }
    }

    /// All articles, oldest insert first
    pub async fn list_all(&self) -> Result<Vec<News>, NewsServiceError> {
        Ok(self.repo.list().await.context("Failed to list news")?)
    }

    pub async fn get(&self, id: i64) -> Result<Option<News>, NewsServiceError> {
        Ok(self.repo.get_by_id(id).await.context("Failed to get news")?)
    }

    /// Publish an article. The title must be non-blank and at most 200 characters.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        date: NaiveDate,
    ) -> Result<News, NewsServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NewsServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        let len = title.chars().count();
        if len > NEWS_TITLE_MAX_LENGTH {
            return Err(NewsServiceError::ValidationError(format!(
                "Title is too long ({} characters, at most {})",
                len, NEWS_TITLE_MAX_LENGTH
            )));
        }

        let news = self
            .repo
            .create(&News::new(title, content, date))
            .await
            .context("Failed to create news")?;
        tracing::info!(news_id = news.id, "News published");
        Ok(news)
    }

    pub async fn delete(&self, id: i64) -> Result<(), NewsServiceError> {
        if self.repo.delete(id).await.context("Failed to delete news")? {
            tracing::info!(news_id = id, "News deleted");
            Ok(())
        } else {
            Err(NewsServiceError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxNewsRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> NewsService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.unwrap();
        NewsService::new(SqlxNewsRepository::boxed(pool))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 22).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = setup_service().await;
        let news = service
            .create("  Earth Day rally  ", "Meet at the square.", today())
            .await
            .unwrap();
        assert_eq!(news.title, "Earth Day rally");

        let fetched = service.get(news.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "Meet at the square.");
        assert!(service.get(news.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_title_validation() {
        let service = setup_service().await;

        let blank = service.create("   ", "x", today()).await;
        assert!(matches!(blank, Err(NewsServiceError::ValidationError(_))));

        let long = service.create(&"a".repeat(201), "x", today()).await;
        assert!(matches!(long, Err(NewsServiceError::ValidationError(_))));

        assert!(service.create(&"a".repeat(200), "x", today()).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_all_ordered() {
        let service = setup_service().await;
        for title in ["one", "two", "three"] {
            service.create(title, "body", today()).await.unwrap();
        }
        let titles: Vec<_> = service.list_all().await.unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = setup_service().await;
        let news = service.create("temp", "body", today()).await.unwrap();
        service.delete(news.id).await.unwrap();
        assert!(matches!(service.delete(news.id).await, Err(NewsServiceError::NotFound)));
    }
}
