// Podcast Catalog - podcast metadata storage
// Copyright (C) 2025 Podcast Catalog contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::Context;
use clap::{Parser, Subcommand};
use podcast_catalog::config::CatalogConfig;
use podcast_catalog::storage::{
    queries, Author, Database, Explicit, MediaOrder, MediaStatus, NewMedia, NewPodcast,
};
use podcast_catalog::{logger, CatalogError};
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "podcast-cli")]
#[command(about = "Podcast Catalog CLI - manage podcast metadata", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and apply migrations
    Init,
    /// Create a podcast
    Create {
        title: String,
        #[arg(long)]
        author_name: String,
        #[arg(long)]
        author_email: String,
        /// Slug seed; defaults to the title
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
        /// iTunes category, e.g. "Arts > Design"
        #[arg(long)]
        category: Option<String>,
        /// yes, no or clean
        #[arg(long, default_value = "no")]
        explicit: Explicit,
        #[arg(long)]
        feedburner_url: Option<String>,
    },
    /// Show one podcast with its episode counts
    Show { slug: String },
    /// List podcasts
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Add an episode to a podcast
    AddEpisode {
        podcast: String,
        title: String,
        #[arg(long)]
        slug: Option<String>,
        /// Comma-separated flags, e.g. "publish"
        #[arg(long)]
        status: Option<MediaStatus>,
    },
    /// Replace an episode's status flags
    SetStatus { media_id: i64, status: MediaStatus },
    /// Change a podcast's slug
    Rename { slug: String, new_slug: String },
    /// Delete a podcast; its episodes are kept and detached
    Delete { slug: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<CatalogError>() {
            Some(catalog_error) => {
                if catalog_error.is_unique_violation() {
                    warn!("Slug already taken");
                } else if catalog_error.is_check_violation() {
                    warn!("Value exceeds its column limit");
                }
                eprintln!("Error: {}", catalog_error.user_message());
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = CatalogConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    logger::init(&config.log.filter)?;

    let db = Database::from_config(&config.database)
        .await
        .with_context(|| format!("opening {}", config.database.path.display()))?;
    let pool = db.pool();

    match cli.command {
        Commands::Init => {
            println!("Database ready at {}", config.database.path.display());
        }
        Commands::Create {
            title,
            author_name,
            author_email,
            slug,
            subtitle,
            category,
            explicit,
            feedburner_url,
        } => {
            let seed = slug.unwrap_or_else(|| title.clone());
            let mut new_podcast =
                NewPodcast::new(title, Author::new(author_name, author_email), &seed);
            new_podcast.subtitle = subtitle;
            new_podcast.category = category;
            new_podcast.explicit = explicit;
            new_podcast.feedburner_url = feedburner_url;

            let podcast = queries::insert_podcast(pool, &new_podcast).await?;
            println!("{}", serde_json::to_string_pretty(&podcast)?);
        }
        Commands::Show { slug } => {
            let podcast = find_podcast(pool, &slug).await?;
            let media_count = podcast.media_count(pool).await?;
            let published_media_count = podcast.published_media_count(pool).await?;
            let latest = podcast
                .media()
                .not_trashed()
                .order_by(MediaOrder::NewestFirst)
                .limit(10)
                .fetch_all(pool)
                .await?;

            let output = json!({
                "podcast": podcast,
                "category": podcast.category_path(),
                "media_count": media_count,
                "published_media_count": published_media_count,
                "latest": latest,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::List { limit, offset } => {
            let podcasts = queries::list_podcasts_with_counts(pool, limit, offset).await?;
            let total = queries::count_podcasts(pool).await?;
            println!("{} podcast(s)", total);
            for podcast in &podcasts {
                let (all, published) = podcast.loaded_counts();
                println!(
                    "  {:<50} {:<40} {}/{} published",
                    podcast.slug().as_str(),
                    podcast.title,
                    published.unwrap_or(0),
                    all.unwrap_or(0)
                );
            }
        }
        Commands::AddEpisode {
            podcast,
            title,
            slug,
            status,
        } => {
            let podcast = find_podcast(pool, &podcast).await?;
            let seed = slug.unwrap_or_else(|| title.clone());
            let mut new_media = NewMedia::new(title, &seed).in_podcast(podcast.id());
            if let Some(status) = status {
                new_media = new_media.with_status(status);
            }

            let media = queries::insert_media(pool, &new_media).await?;
            println!("{}", serde_json::to_string_pretty(&media)?);
        }
        Commands::SetStatus { media_id, status } => {
            queries::update_media_status(pool, media_id, status).await?;
            println!("Media {} status: {}", media_id, status);
        }
        Commands::Rename { slug, new_slug } => {
            let mut podcast = find_podcast(pool, &slug).await?;
            podcast.set_slug(&new_slug);
            queries::update_podcast(pool, &mut podcast).await?;
            println!("Renamed to {}", podcast.slug());
        }
        Commands::Delete { slug } => {
            let podcast = find_podcast(pool, &slug).await?;
            queries::delete_podcast(pool, podcast.id()).await?;
            println!("Deleted {}", podcast);
        }
    }

    db.close().await?;
    Ok(())
}

async fn find_podcast(
    pool: &sqlx::SqlitePool,
    slug: &str,
) -> podcast_catalog::Result<podcast_catalog::storage::Podcast> {
    queries::find_podcast_by_slug(pool, slug)
        .await?
        .ok_or_else(|| CatalogError::not_found(format!("podcast '{}'", slug)))
}
