//! News administration tool
//!
//! Usage:
//!   dfa-news list
//!   dfa-news add 2024-05-01 "Title" "Body text"
//!   dfa-news delete 3
//!
//! Reads the same `config.yml` (and `DFA_*` overrides) as the server.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use dfa::config::Config;
use dfa::db::{self, repositories::SqlxNewsRepository};
use dfa::services::{NewsService, NewsServiceError};

#[derive(Parser)]
#[command(name = "dfa-news")]
#[command(about = "Publish and remove news articles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, default_value = "config.yml", value_name = "PATH")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List all articles
    List,

    /// Publish an article
    Add {
        /// Publication date (YYYY-MM-DD)
        #[arg(value_name = "DATE")]
        date: NaiveDate,

        #[arg(value_name = "TITLE")]
        title: String,

        #[arg(value_name = "CONTENT")]
        content: String,
    },

    /// Delete an article by id
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dfa=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_with_env(&cli.config)?;
    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;
    let news = NewsService::new(SqlxNewsRepository::boxed(pool.clone()));

    let result = match cli.command {
        Commands::List => list(&news).await,
        Commands::Add {
            date,
            title,
            content,
        } => news.create(&title, &content, date).await.map(|created| {
            println!("Published #{}: {}", created.id, created.title);
        }),
        Commands::Delete { id } => news.delete(id).await.map(|()| {
            println!("Deleted #{}", id);
        }),
    };

    pool.close().await;
    result.map_err(|e| match e {
        NewsServiceError::NotFound => anyhow::anyhow!("no news article with that id"),
        other => other.into(),
    })
}

async fn list(news: &NewsService) -> Result<(), NewsServiceError> {
    let items = news.list_all().await?;
    if items.is_empty() {
        println!("No news.");
    }
    for item in items {
        println!("{:>4}  {}  {}", item.id, item.date, item.title);
    }
    Ok(())
}
