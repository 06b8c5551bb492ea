use clap::{Args, Subcommand};
use nt_core::{CuratedArticleSubmission, Provenance, Result};

use crate::manager::NewsManager;

#[derive(Args, Debug, Clone)]
pub struct NewsArgs {
    #[command(subcommand)]
    pub command: NewsCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NewsCommands {
    /// List the merged news feed, newest first
    List {
        /// Free-text query passed to the upstream feed (bypasses the cache)
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Add a curated article
    Curate {
        #[arg(long)]
        title: String,
        /// Source URL of the article
        #[arg(long)]
        url: String,
        /// Publication date, e.g. 2024-05-01 or 2024-05-01T09:30:00Z
        #[arg(long)]
        published_at: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Show stored curated articles
    Curated,
}

pub async fn handle_command(args: NewsArgs, manager: &NewsManager) -> Result<()> {
    match args.command {
        NewsCommands::List { query } => {
            let articles = manager.list_news(query.as_deref()).await;
            println!("Found {} articles", articles.len());
            for article in articles {
                let marker = match article.provenance {
                    Provenance::Curated => "📌",
                    Provenance::Upstream => "📰",
                };
                println!("{} {} - {} ({})", marker, article.display_date(), article.title, article.url);
            }
        }
        NewsCommands::Curate {
            title,
            url,
            published_at,
            description,
            image_url,
        } => {
            let submission = CuratedArticleSubmission {
                title,
                url,
                published_at,
                description,
                image_url,
            };
            let record = manager.curate(&submission).await?;
            println!("🆕 {} - {}", record.id, record.title);
        }
        NewsCommands::Curated => {
            for record in manager.curated_articles().await? {
                let image = if record.image_url.is_empty() { "no image yet" } else { record.image_url.as_str() };
                println!("{} {} - {} [{}]", record.id, record.published_at, record.title, image);
            }
        }
    }
    Ok(())
}
