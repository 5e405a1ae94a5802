mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod state;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::HttpServer;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use application::group_service::GroupService;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::media::FsMediaStore;
use infrastructure::security::JwtKeys;
use presentation::routes;
use state::{AppState, Repositories};

#[derive(Parser, Debug)]
#[clap(name = "yatube-server", about = "Yatube blog server")]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create a post group.
    CreateGroup {
        #[clap(long)]
        title: String,
        #[clap(long)]
        slug: String,
        #[clap(long, default_value = "")]
        description: String,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = AppConfig::from_env()?;
    init_logging(config.log_format);

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    let repos = Repositories::postgres(&pool);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, repos).await,
        Command::CreateGroup {
            title,
            slug,
            description,
        } => {
            let group = GroupService::new(repos.groups)
                .create_group(title, slug, description)
                .await?;
            info!(group_id = %group.id, slug = %group.slug, "group created");
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, repos: Repositories) -> anyhow::Result<()> {
    let state = AppState::new(
        repos,
        Arc::new(FsMediaStore::new(config.media_root.clone())),
        JwtKeys::new(config.jwt_secret.clone(), config.session_ttl_hours),
        config.index_cache_ttl,
        config.max_upload_bytes,
    );

    info!(host = %config.host, port = config.port, "HTTP server starting");

    let config_data = config.clone();
    HttpServer::new(move || routes::build_app(state.clone()).wrap(build_cors(&config_data)))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
