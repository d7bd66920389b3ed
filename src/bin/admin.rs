//! CLI administration tool for linkshelf.
//!
//! Issues owner tokens, prints analytics and checks the database without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Issue a bearer token for an owner (prompts when the id is omitted)
//! cargo run --bin admin -- token issue 6f1c0c3e-8d5b-4a7e-9c1d-2f9a8b7c6d5e
//!
//! # Check which owner a token belongs to
//! cargo run --bin admin -- token verify "<token>"
//!
//! # Global counts, or one owner's summary
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- stats 6f1c0c3e-8d5b-4a7e-9c1d-2f9a8b7c6d5e --range 7d
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `TOKEN_SIGNING_SECRET`: required by `token` commands
//! - `DATABASE_URL`: required by `stats` and `db` commands

use linkshelf::application::QueryFacade;
use linkshelf::application::services::{
    AnalyticsSettings, AuthService, Caller, DEFAULT_DEDUP_WINDOW_SECONDS,
};
use linkshelf::domain::analytics::{SummaryOptions, TimeRange};
use linkshelf::infrastructure::persistence::{PgClickRepository, PgLinkRepository};

use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// CLI tool for managing linkshelf.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage owner bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics, globally or for one owner
    Stats {
        /// Owner to summarize; global counts when omitted
        owner_id: Option<Uuid>,

        /// Reporting range: 7d, 30d, 90d or 1y
        #[arg(short, long, default_value = "30d")]
        range: String,

        /// Number of top links to show
        #[arg(short, long, default_value_t = 5)]
        top: usize,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Issue a token for an owner
    Issue {
        /// Owner id (prompted when omitted)
        owner_id: Option<Uuid>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Verify a token and print its owner
    Verify {
        token: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Token { action } => handle_token_action(action)?,
        Commands::Stats {
            owner_id,
            range,
            top,
        } => {
            let pool = connect().await?;
            match owner_id {
                Some(owner_id) => handle_owner_stats(pool, owner_id, &range, top).await?,
                None => handle_global_stats(&pool).await?,
            }
        }
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

fn auth_service() -> Result<AuthService> {
    let secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;
    anyhow::ensure!(!secret.is_empty(), "TOKEN_SIGNING_SECRET must not be empty");
    Ok(AuthService::new(secret))
}

/// Dispatches token management commands.
fn handle_token_action(action: TokenAction) -> Result<()> {
    let auth = auth_service()?;

    match action {
        TokenAction::Issue { owner_id, yes } => issue_token(&auth, owner_id, yes),
        TokenAction::Verify { token } => verify_token(&auth, &token),
    }
}

/// Issues a bearer token for an owner.
///
/// Tokens are derived from the owner id and the signing secret, so issuing
/// the same owner twice yields the same token and nothing is stored.
/// Rotating `TOKEN_SIGNING_SECRET` invalidates every token.
fn issue_token(auth: &AuthService, owner_id: Option<Uuid>, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔑 Issue Owner Token".bright_blue().bold());
    println!();

    let owner_id = match owner_id {
        Some(id) => id,
        None => {
            let raw: String = Input::new()
                .with_prompt("Owner id (empty for a new owner)")
                .allow_empty(true)
                .interact_text()?;
            if raw.trim().is_empty() {
                let generated = Uuid::new_v4();
                println!("{} {}", "✨ Generated owner id".green(), generated);
                generated
            } else {
                raw.trim().parse().context("Owner id must be a UUID")?
            }
        }
    };

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Issue a token for {owner_id}?"))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token = auth.issue_token(owner_id);

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Owner: {}", owner_id.to_string().cyan());
    println!("  Token: {}", token.bright_yellow().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token.bright_yellow()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/links",
        token.bright_yellow()
    );
    println!();

    Ok(())
}

fn verify_token(auth: &AuthService, token: &str) -> Result<()> {
    match auth.authenticate(token) {
        Ok(caller) => {
            println!("{}", "✅ Token is valid".green().bold());
            println!("  Owner: {}", caller.owner_id.to_string().cyan());
            Ok(())
        }
        Err(e) => {
            println!("{}", "❌ Token is invalid".red().bold());
            anyhow::bail!("{}", e.message())
        }
    }
}

/// Displays global counts.
async fn handle_global_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let owners_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_collections")
        .fetch_one(pool)
        .await?;

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(pool)
        .await?;

    println!(
        "  Owners: {}",
        owners_count.to_string().bright_green().bold()
    );
    println!(
        "  Links:  {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks: {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Prints one owner's click summary using the same aggregation as the API.
async fn handle_owner_stats(pool: PgPool, owner_id: Uuid, range: &str, top: usize) -> Result<()> {
    let range: TimeRange = range.parse().map_err(|e| anyhow::anyhow!("{e}"))?;

    let pool = Arc::new(pool);
    let facade = QueryFacade::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgClickRepository::new(pool)),
        TimeDelta::seconds(DEFAULT_DEDUP_WINDOW_SECONDS),
        AnalyticsSettings::default(),
    );

    let caller = Caller { owner_id };
    let summary = facade
        .analytics(
            &caller,
            owner_id,
            range,
            SummaryOptions {
                top,
                ..Default::default()
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to summarize: {e}"))?;

    println!(
        "{} {} ({})",
        "📊 Analytics for".bright_blue().bold(),
        owner_id.to_string().cyan(),
        range
    );
    println!();
    println!(
        "  Window:          {} .. {}",
        summary.window.first_day,
        summary.window.last_day()
    );
    println!(
        "  Clicks:          {}",
        summary.total_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Lifetime clicks: {}",
        summary.lifetime_clicks.to_string().bright_green()
    );
    println!(
        "  Links:           {} ({} active)",
        summary.total_links, summary.active_links
    );
    println!("  Clicks per link: {:.1}", summary.clicks_per_link);
    println!();

    if summary.top_links.is_empty() {
        println!("{}", "  No links yet".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<4} {:<40} {:>8}",
        "#".bright_white().bold(),
        "Title".bright_white().bold(),
        "Clicks".bright_white().bold()
    );
    println!("  {}", "─".repeat(54).bright_black());

    for (rank, link) in summary.top_links.iter().enumerate() {
        let title = format!("{} {}", link.icon, link.title);
        let title = if link.is_active {
            title.cyan()
        } else {
            title.bright_black()
        };
        println!("  {:<4} {:<40} {:>8}", rank + 1, title, link.clicks);
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", applied.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
