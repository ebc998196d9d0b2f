//! Account repository
//!
//! - `UserRepository` trait defining account data access
//! - `SqlxUserRepository` implementing it for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Account repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, returning it with its assigned id
    async fn create(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Exact (case-sensitive) username lookup
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn exists_by_username(&self, username: &str) -> Result<bool>;

    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()>;
}

/// SQLx-based account repository
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for injection into services
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, email, first_name, surname, id_number, gender, is_active, date_joined, last_login";

const INSERT_USER: &str = "INSERT INTO users (username, password_hash, email, first_name, surname, id_number, gender, is_active, date_joined) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, user).await?,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, user).await?,
        };
        Ok(User {
            id,
            ..user.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get user by id")?;
                row.as_ref().map(row_to_user_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get user by id")?;
                row.as_ref().map(row_to_user_mysql).transpose()
            }
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(username)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get user by username")?;
                row.as_ref().map(row_to_user_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                // `users.username` is utf8mb4_bin, so this compares exactly
                let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
                let row = sqlx::query(&sql)
                    .bind(username)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get user by username")?;
                row.as_ref().map(row_to_user_mysql).transpose()
            }
        }
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        const SQL: &str = "UPDATE users SET last_login = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(SQL)
                    .bind(at)
                    .bind(id)
                    .execute(self.pool.sqlite()?)
                    .await
                    .context("Failed to update last login")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(SQL)
                    .bind(at)
                    .bind(id)
                    .execute(self.pool.mysql()?)
                    .await
                    .context("Failed to update last login")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, user: &User) -> Result<i64> {
    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.surname)
        .bind(&user.id_number)
        .bind(user.gender.code())
        .bind(user.is_active)
        .bind(user.date_joined)
        .execute(pool)
        .await
        .context("Failed to create user")?;
    Ok(result.last_insert_rowid())
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let gender: String = row.try_get("gender")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        surname: row.try_get("surname")?,
        id_number: row.try_get("id_number")?,
        gender: gender.parse()?,
        is_active: row.try_get("is_active")?,
        date_joined: row.try_get("date_joined")?,
        last_login: row.try_get("last_login")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, user: &User) -> Result<i64> {
    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.surname)
        .bind(&user.id_number)
        .bind(user.gender.code())
        .bind(user.is_active)
        .bind(user.date_joined)
        .execute(pool)
        .await
        .context("Failed to create user")?;
    Ok(result.last_insert_id() as i64)
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let gender: String = row.try_get("gender")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        surname: row.try_get("surname")?,
        id_number: row.try_get("id_number")?,
        gender: gender.parse()?,
        is_active: row.try_get("is_active")?,
        date_joined: row.try_get("date_joined")?,
        last_login: row.try_get("last_login")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::Gender;

    async fn setup() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn member(username: &str) -> User {
        User::new(
            username.to_string(),
            "$argon2id$fake".to_string(),
            format!("{}@example.org", username),
            "Grace".to_string(),
            "Hopper".to_string(),
            "ID-42".to_string(),
            Gender::Female,
        )
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let repo = setup().await;

        let created = repo.create(&member("grace")).await.expect("Failed to create");
        assert!(created.id > 0);

        let fetched = repo
            .get_by_id(created.id)
            .await
            .unwrap()
            .expect("User should exist");
        assert_eq!(fetched.username, "grace");
        assert_eq!(fetched.surname, "Hopper");
        assert_eq!(fetched.id_number, "ID-42");
        assert_eq!(fetched.gender, Gender::Female);
        assert!(fetched.is_active);
        assert!(fetched.last_login.is_none());
    }

    #[tokio::test]
    async fn test_get_by_username_is_exact() {
        let repo = setup().await;
        repo.create(&member("grace")).await.unwrap();

        assert!(repo.get_by_username("grace").await.unwrap().is_some());
        assert!(repo.get_by_username("Grace").await.unwrap().is_none());
        assert!(!repo.exists_by_username("nobody").await.unwrap());

        // A different case is a different account
        repo.create(&member("Grace")).await.unwrap();
        assert!(repo.get_by_username("Grace").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = setup().await;
        let first = repo.create(&member("grace")).await.unwrap();
        assert!(repo.create(&member("grace")).await.is_err());
        let stored = repo.get_by_username("grace").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let repo = setup().await;
        let user = repo.create(&member("grace")).await.unwrap();

        let now = Utc::now();
        repo.update_last_login(user.id, now).await.unwrap();

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        let last_login = fetched.last_login.expect("last_login should be set");
        assert_eq!(last_login.timestamp(), now.timestamp());
    }
}
