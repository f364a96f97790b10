//! Bazaar CLI - storefront and admin console in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Landing page, optionally adding to the cart as a logged-in user
//! bazaar home
//! bazaar home --user sara --add 3 --add 3
//!
//! # Products
//! bazaar products list
//! bazaar products add --name Runner --price 49.99 --category Shoes \
//!     --brand Fleet --description "Road shoe" --image "/img/runner.png, /img/runner-2.png"
//! bazaar products edit 3 --price 39.99
//! bazaar --yes products delete 3
//!
//! # Categories
//! bazaar categories list
//! bazaar categories add --name Shoes --image /img/shoes.png
//!
//! # Customers
//! bazaar customers list
//! bazaar customers show 1
//! bazaar customers add --username sara --email sara@x.com --phone 0100 --password secret
//! bazaar customers edit 1 --phone 0199
//! bazaar customers delete 1
//! ```
//!
//! Update and delete ask for confirmation on the terminal unless `--yes`
//! is given.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use bazaar_console::ConsoleConfig;
use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, TerminalConfirmer};

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront and admin console")]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the storefront landing page
    Home {
        /// Log in as this user before adding to the cart
        #[arg(long)]
        user: Option<String>,

        /// Product id to add to the cart (repeatable)
        #[arg(long = "add")]
        add: Vec<String>,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all products
    List,
    /// Add a product
    Add(ProductArgs),
    /// Edit a product
    Edit {
        /// Product id
        id: String,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: String,
    },
}

/// Product field values; unset fields are left as they are.
#[derive(Args, Debug, Default)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Image URLs separated by ", "
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List all categories
    List,
    /// Add a category
    Add(CategoryArgs),
}

/// Category field values.
#[derive(Args, Debug, Default)]
pub struct CategoryArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// Image URL
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List all customers
    List,
    /// Show one customer
    Show {
        /// Customer id
        id: String,
    },
    /// Add a customer
    Add(CustomerArgs),
    /// Edit a customer
    Edit {
        /// Customer id
        id: String,
        #[command(flatten)]
        fields: CustomerArgs,
    },
    /// Delete a customer
    Delete {
        /// Customer id
        id: String,
    },
}

/// Customer field values.
#[derive(Args, Debug, Default)]
pub struct CustomerArgs {
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Only used when adding
    #[arg(long)]
    pub password: Option<String>,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ConsoleConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar=info,bazaar_console=info".into());

    let json = std::env::var_os("BAZAAR_LOG_JSON").is_some();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = ConsoleConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(CliError::from(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &ConsoleConfig) -> Result<(), CliError> {
    let mut confirmer = TerminalConfirmer::new(cli.yes);

    match cli.command {
        Commands::Home { user, add } => commands::home::show(config, user, &add).await,
        Commands::Products { action } => match action {
            ProductAction::List => commands::catalog::list_products(config).await,
            ProductAction::Add(fields) => commands::catalog::add_product(config, &fields).await,
            ProductAction::Edit { id, fields } => {
                commands::catalog::edit_product(config, &id, &fields, &mut confirmer).await
            }
            ProductAction::Delete { id } => {
                commands::catalog::delete_product(config, &id, &mut confirmer).await
            }
        },
        Commands::Categories { action } => match action {
            CategoryAction::List => commands::catalog::list_categories(config).await,
            CategoryAction::Add(fields) => commands::catalog::add_category(config, &fields).await,
        },
        Commands::Customers { action } => match action {
            CustomerAction::List => commands::customers::list(config).await,
            CustomerAction::Show { id } => commands::customers::show(config, &id).await,
            CustomerAction::Add(fields) => commands::customers::add(config, &fields).await,
            CustomerAction::Edit { id, fields } => {
                commands::customers::edit(config, &id, &fields, &mut confirmer).await
            }
            CustomerAction::Delete { id } => {
                commands::customers::delete(config, &id, &mut confirmer).await
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_yes_after_subcommand() {
        let cli = Cli::try_parse_from(["bazaar", "products", "delete", "3", "--yes"]);
        assert!(cli.is_ok_and(|c| c.yes));
    }

    #[test]
    fn test_edit_takes_field_options() {
        let cli = Cli::try_parse_from(["bazaar", "customers", "edit", "1", "--phone", "0199"]);
        let Ok(Cli {
            command: Commands::Customers {
                action: CustomerAction::Edit { id, fields },
            },
            ..
        }) = cli
        else {
            panic!("expected customers edit");
        };
        assert_eq!(id, "1");
        assert_eq!(fields.phone.as_deref(), Some("0199"));
        assert!(fields.email.is_none());
    }
}
