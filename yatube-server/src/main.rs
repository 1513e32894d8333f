use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use data::group_repository::NewGroup;
use domain::error::DomainError;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "yatube-server", version, about = "Yatube blog server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Group to make sure exists before serving, as `slug:Title`.
        /// Repeatable; existing slugs are left alone.
        #[arg(long = "group", value_parser = parse_group_arg)]
        groups: Vec<NewGroup>,
    },
    /// Create a post group and exit.
    CreateGroup {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let state = server::build_state(&settings).await?;

    match cli.command.unwrap_or(Command::Serve { groups: Vec::new() }) {
        Command::Serve { groups } => {
            for group in groups {
                match state.blog_service.create_group(group).await {
                    Ok(_) | Err(DomainError::AlreadyExists(_)) => {}
                    Err(err) => return Err(err).context("failed to seed group"),
                }
            }
            server::run_http(&settings, state).await
        }
        Command::CreateGroup {
            slug,
            title,
            description,
        } => {
            if settings.database_url.is_none() {
                return Err(anyhow!(
                    "create-group needs DATABASE_URL; use `serve --group` for the in-memory store"
                ));
            }
            let group = state
                .blog_service
                .create_group(NewGroup {
                    title,
                    slug,
                    description,
                })
                .await?;
            info!(group_id = group.id, "group {} is ready", group.slug);
            Ok(())
        }
    }
}

fn parse_group_arg(raw: &str) -> Result<NewGroup, String> {
    let (slug, title) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected slug:Title, got {raw:?}"))?;
    Ok(NewGroup {
        title: title.trim().to_string(),
        slug: slug.trim().to_string(),
        description: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::parse_group_arg;

    #[test]
    fn group_arg_is_split_on_first_colon() {
        let group = parse_group_arg("leo: Лев Толстой: классик").expect("valid arg");
        assert_eq!(group.slug, "leo");
        assert_eq!(group.title, "Лев Толстой: классик");
        assert!(parse_group_arg("no-title").is_err());
    }
}
