use clap::{Args, Subcommand};
use na_core::{Article, Result};

use crate::manager::ScraperManager;

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Scrape every source of one category (e.g. singapore, technology)
    Category {
        category: String,
        /// Print the articles as JSON instead of one line each
        #[arg(long)]
        json: bool,
    },
    /// Scrape all categories
    All {
        #[arg(long)]
        json: bool,
    },
    /// Scrape all categories and keep articles whose title or source matches
    Search {
        keyword: String,
        #[arg(long)]
        json: bool,
    },
    /// List configured sources
    List,
}

pub async fn handle_command(args: &ScraperArgs, manager: &ScraperManager) -> Result<()> {
    match &args.command {
        ScraperCommands::Category { category, json } => {
            let articles = manager.get_category_news(category).await?;
            print_articles(&articles, *json)?;
        }
        ScraperCommands::All { json } => {
            let articles = manager.get_all_news().await?;
            print_articles(&articles, *json)?;
        }
        ScraperCommands::Search { keyword, json } => {
            let articles = manager.search_news(keyword).await?;
            print_articles(&articles, *json)?;
        }
        ScraperCommands::List => {
            println!("Available sources:");
            for line in source_lines(manager) {
                println!("  {}", line);
            }
        }
    }
    Ok(())
}

fn print_articles(articles: &[Article], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(articles)?);
        return Ok(());
    }
    for article in articles {
        println!("{}", article_line(article));
    }
    println!("Found {} articles", articles.len());
    Ok(())
}

fn article_line(article: &Article) -> String {
    format!(
        "📰 [{}] {} - {} ({}) {}",
        article.category, article.source, article.title, article.display_date, article.link
    )
}

fn source_lines(manager: &ScraperManager) -> Vec<String> {
    manager
        .sources()
        .map(|(category, source)| format!("{}/{} {}", category, source.name, source.base_url))
        .collect()
}
