//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `conduit_core` wiring against a real database file.
//! - Print the known tags and the newest articles.
//!
//! Usage: `conduit_cli [DB_PATH]`, falling back to `$CONDUIT_DB`, then to a
//! throwaway in-memory database.

use conduit_core::{
    open_db, open_db_in_memory, ArticleFilter, ArticleRepository, CancelToken, DbConfig,
    SqliteArticleRepository, SqliteTagRepository, TagFilter, TagRepository,
};
use std::process::ExitCode;

const RECENT_ARTICLES: i64 = 10;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("conduit_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("conduit_core version={}", conduit_core::core_version());

    let db = match std::env::args().nth(1).or_else(|| std::env::var("CONDUIT_DB").ok()) {
        Some(path) => open_db(&DbConfig::new(path))?,
        None => open_db_in_memory()?,
    };
    let cancel = CancelToken::new();

    let tags = SqliteTagRepository::new(db.clone()).list(&cancel, &TagFilter::default())?;
    let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
    println!("tags={}", names.join(","));

    let filter = ArticleFilter {
        limit: RECENT_ARTICLES,
        ..ArticleFilter::default()
    };
    let articles = SqliteArticleRepository::new(db).find(&cancel, &filter)?;
    for article in &articles {
        println!(
            "{} by {} [{}] favorites={}",
            article.slug,
            article.author.username,
            article.tag_names().join(","),
            article.favorites_count
        );
    }
    Ok(())
}
