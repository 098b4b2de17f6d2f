//! Tienda CLI - browse the store and manage it from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from --password, TIENDA_PASSWORD, or stdin)
//! tienda login -e admin@tienda.com
//!
//! # Browse the catalog
//! tienda products list
//! tienda products show 3
//! tienda pages show sobre-nosotros
//!
//! # Price a cart: product 3 twice, product 7 once
//! tienda quote 3x2 7
//!
//! # Back office
//! tienda admin stats
//! tienda admin products create --name "Taza" --price 7.50 --category 2
//! tienda admin categories create --name "Hogar y Cocina"
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` - Session management
//! - `products`, `categories`, `pages` - Public catalog
//! - `quote` - Build a cart in memory and print its totals
//! - `admin` - Dashboard stats, product and category management
//!
//! Configuration comes from the environment; see
//! [`tienda_storefront::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tienda_core::{CategoryId, ProductId};
use tienda_storefront::ClientConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "tienda")]
#[command(author, version, about = "Tienda storefront and back-office client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the back office
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long, env = "TIENDA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the session and forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Browse categories
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
    /// Browse content pages
    Pages {
        #[command(subcommand)]
        action: PagesAction,
    },
    /// Price a cart of products, given as `ID` or `IDxQTY`
    Quote {
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Back-office operations (requires login)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List all products
    List {
        /// Only the home page selection
        #[arg(long)]
        featured: bool,
    },
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CategoriesAction {
    /// List all categories
    List,
}

#[derive(Subcommand)]
enum PagesAction {
    /// List all pages
    List,
    /// Show one page
    Show { slug: String },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Dashboard totals
    Stats,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: AdminProductsAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: AdminCategoriesAction,
    },
}

#[derive(Subcommand)]
enum AdminProductsAction {
    /// Create a product
    Create {
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Update a product; omitted fields keep their current value
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum AdminCategoriesAction {
    /// Create a category; the slug is derived from the name unless given
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        slug: Option<String>,
    },
    /// Update a category
    Update {
        id: CategoryId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        slug: Option<String>,
    },
    /// Delete a category
    Delete { id: CategoryId },
}

#[derive(Args)]
struct ProductFields {
    #[arg(short, long)]
    name: Option<String>,

    /// Price, e.g. 19.99
    #[arg(short, long)]
    price: Option<String>,

    /// Short description
    #[arg(long)]
    short: Option<String>,

    /// Long description
    #[arg(long)]
    long: Option<String>,

    /// Category id (repeatable). Updating without any clears the categories.
    #[arg(short, long = "category")]
    categories: Vec<CategoryId>,

    /// Hide the product from the storefront
    #[arg(long, conflicts_with = "active")]
    hidden: bool,

    /// Show the product on the storefront
    #[arg(long)]
    active: bool,

    /// Image file to upload
    #[arg(short, long)]
    image: Option<PathBuf>,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            commands::output::failure(&e.to_string(), None);
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr; stdout is for command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "tienda_cli=info,tienda_storefront=info,tienda_admin=info".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        let hint = e.downcast_ref::<CommandError>().and_then(CommandError::hint);
        commands::output::failure(&e.to_string(), hint);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut shop = commands::open_shop(config)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&mut shop, &email, password).await?;
        }
        Commands::Logout => commands::session::logout(&mut shop),
        Commands::Whoami => commands::session::whoami(&shop),
        Commands::Products { action } => match action {
            ProductsAction::List { featured } => {
                commands::catalog::list_products(&mut shop, featured).await?;
            }
            ProductsAction::Show { id } => commands::catalog::show_product(&mut shop, id).await?,
        },
        Commands::Categories { action } => match action {
            CategoriesAction::List => commands::catalog::list_categories(&mut shop).await?,
        },
        Commands::Pages { action } => match action {
            PagesAction::List => commands::catalog::list_pages(&mut shop).await?,
            PagesAction::Show { slug } => commands::catalog::show_page(&mut shop, &slug).await?,
        },
        Commands::Quote { items } => commands::quote::quote(&mut shop, &items).await?,
        Commands::Admin { action } => match action {
            AdminAction::Stats => commands::admin::stats(&mut shop).await?,
            AdminAction::Products { action } => match action {
                AdminProductsAction::Create { fields } => {
                    commands::admin::create_product(&mut shop, fields.into()).await?;
                }
                AdminProductsAction::Update { id, fields } => {
                    commands::admin::update_product(&mut shop, id, fields.into()).await?;
                }
                AdminProductsAction::Delete { id } => {
                    commands::admin::delete_product(&mut shop, id).await?;
                }
            },
            AdminAction::Categories { action } => match action {
                AdminCategoriesAction::Create { name, slug } => {
                    commands::admin::create_category(&mut shop, &name, slug).await?;
                }
                AdminCategoriesAction::Update { id, name, slug } => {
                    commands::admin::update_category(&mut shop, id, name, slug).await?;
                }
                AdminCategoriesAction::Delete { id } => {
                    commands::admin::delete_category(&mut shop, id).await?;
                }
            },
        },
    }
    Ok(())
}

impl From<ProductFields> for commands::admin::ProductChanges {
    fn from(fields: ProductFields) -> Self {
        let visibility = match (fields.hidden, fields.active) {
            (true, _) => Some(tienda_core::Visibility::Hidden),
            (false, true) => Some(tienda_core::Visibility::Active),
            (false, false) => None,
        };
        Self {
            name: fields.name,
            price: fields.price,
            short_description: fields.short,
            long_description: fields.long,
            categories: fields.categories,
            visibility,
            image: fields.image,
        }
    }
}
