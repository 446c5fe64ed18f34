use anyhow::{Context, Result};
use catalog_client::HttpCatalog;
use catalog_core::{FormMode, Route, Screen};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod form_tui;
mod listing_cmd;
mod product_cmd;
mod state;

use product_cmd::ProductFields;

#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CATALOG_BUILD_SHA"), ")"),
    about = "Catalog admin: products, categories and stores"
)]
struct Cli {
    /// Backend base URL (overrides config and CATALOG_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.catalog-admin/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Category reference list
    Categories {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Store reference list
    Stores {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Products: list, create, edit
    Products {
        #[command(subcommand)]
        command: ProductsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    List,
}

#[derive(Subcommand, Debug)]
enum ProductsCommand {
    List,

    /// Create a product. Without field flags, opens the form screen.
    New {
        #[command(flatten)]
        fields: ProductFields,
    },

    /// Edit a product. Without field flags, opens the form screen.
    Edit {
        id: u64,
        #[command(flatten)]
        fields: ProductFields,
    },
}

fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn opens_form(command: &Command) -> bool {
    matches!(
        command,
        Command::Products {
            command: ProductsCommand::New { fields } | ProductsCommand::Edit { fields, .. }
        } if fields.is_empty()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(if opens_form(&cli.command) {
        "catalog=warn"
    } else {
        "catalog=info"
    });

    let cfg = config::resolve_config(cli.api_url)?;

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config(&cfg)?,
        },

        Command::Categories {
            command: ListCommand::List,
        } => {
            listing_cmd::show_screen(&connect(&cfg)?, Route::to(Screen::Categories)).await?;
        }

        Command::Stores {
            command: ListCommand::List,
        } => {
            listing_cmd::show_screen(&connect(&cfg)?, Route::to(Screen::Stores)).await?;
        }

        Command::Products { command } => {
            let api = connect(&cfg)?;
            match command {
                ProductsCommand::List => {
                    listing_cmd::show_screen(&api, Route::to(Screen::Products)).await?;
                }
                ProductsCommand::New { fields } => {
                    product_screen(&cfg, api, FormMode::Create, &fields).await?;
                }
                ProductsCommand::Edit { id, fields } => {
                    product_screen(&cfg, api, FormMode::Edit(Some(id)), &fields).await?;
                }
            }
        }
    }

    Ok(())
}

fn connect(cfg: &config::Config) -> Result<HttpCatalog> {
    HttpCatalog::new(&cfg.api.base_url, cfg.timeout())
        .with_context(|| format!("connect to {}", cfg.api.base_url))
}

async fn product_screen(
    cfg: &config::Config,
    api: HttpCatalog,
    mode: FormMode,
    fields: &ProductFields,
) -> Result<()> {
    if !fields.is_empty() {
        return product_cmd::run_batch(cfg, api, mode, fields).await;
    }
    if let Some(route) = form_tui::run_form(cfg, api.clone(), mode).await? {
        listing_cmd::show_screen(&api, route).await?;
    }
    Ok(())
}
