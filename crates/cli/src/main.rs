//! Seller CLI - drive the seller dashboard from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Register, then sign in
//! seller signup --full-name "João Silva" -e joao@x.com --phone 11999990000 \
//!     --street "Rua A" --number 10 --neighborhood Centro --city "São Paulo" \
//!     --state SP --zip-code 01000-000 --opens 8 --closes 18 -p segredo
//! seller login -e joao@x.com -p segredo
//!
//! # Catalog
//! seller products list
//! seller products create -n "Botijão P13" --price 95.00 -d "13 kg"
//! seller products update 42 --price 99.90
//! seller products delete 42
//!
//! # Account
//! seller profile show
//! seller profile update --city Campinas --closes 20
//! seller password -p nova-senha
//! seller logout
//! ```
//!
//! The session (seller record and cookies) is kept under `SELLER_STATE_DIR`
//! between invocations. Passwords can also be supplied via `SELLER_PASSWORD`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use seller_dashboard::DashboardConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "seller")]
#[command(author, version, about = "Gas-cylinder seller dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new seller account
    Signup(SignupArgs),
    /// Sign in and keep the session for later commands
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "SELLER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Show or edit the seller profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Set a new password
    Password {
        /// New password
        #[arg(short, long, env = "SELLER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

/// Profile fields shared by `signup` and `profile update`.
#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(short, long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub number: Option<String>,
    #[arg(long)]
    pub complement: Option<String>,
    #[arg(long)]
    pub neighborhood: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zip_code: Option<String>,
    /// Opening hour (0-24); blank or non-numeric is sent as unset
    #[arg(long)]
    pub opens: Option<String>,
    /// Closing hour (0-24); blank or non-numeric is sent as unset
    #[arg(long)]
    pub closes: Option<String>,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Account password
    #[arg(short, long, env = "SELLER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the stored profile
    Show,
    /// Change one or more profile fields
    Update(ProfileArgs),
}

#[derive(Subcommand)]
enum ProductAction {
    /// List every product
    List,
    /// Add a product
    Create {
        #[arg(short, long)]
        name: String,

        /// Price in reais, e.g. 95.00 or 95,00
        #[arg(long)]
        price: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Change a product; omitted fields keep their value
    Update {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Remove a product
    Delete { id: String },
}

fn init_sentry(config: &DashboardConfig) -> Option<sentry::ClientInitGuard> {
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

    Some(guard)
}

/// Warnings and errors become Sentry events, info/debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let config = DashboardConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info for our crates if RUST_LOG is not set
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seller=info,seller_dashboard=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: DashboardConfig) -> Result<(), commands::CliError> {
    let dashboard = seller_dashboard::Dashboard::open(config)?;

    match cli.command {
        Commands::Signup(args) => {
            commands::session::signup(&dashboard, args.profile, SecretString::from(args.password))
                .await?;
        }
        Commands::Login { email, password } => {
            commands::session::login(&dashboard, &email, &SecretString::from(password)).await?;
        }
        Commands::Logout => commands::session::logout(&dashboard).await,
        Commands::Whoami => commands::session::whoami(&dashboard).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&dashboard).await?,
            ProfileAction::Update(args) => commands::profile::update(&dashboard, args).await?,
        },
        Commands::Password { password } => {
            commands::password::update(&dashboard, SecretString::from(password)).await?;
        }
        Commands::Products { action } => match action {
            ProductAction::List => commands::products::list(&dashboard).await?,
            ProductAction::Create {
                name,
                price,
                description,
            } => commands::products::create(&dashboard, name, price, description).await?,
            ProductAction::Update {
                id,
                name,
                price,
                description,
            } => commands::products::update(&dashboard, &id, name, price, description).await?,
            ProductAction::Delete { id } => commands::products::delete(&dashboard, &id).await?,
        },
    }
    Ok(())
}
