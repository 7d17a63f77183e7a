/// HealthShare Server - user registration, authentication and profiles
use clap::{Parser, Subcommand};
use healthshare_core::{validation, IdentityProvider, ProfileUpdate, UserId};
use healthshare_server::{config::ServerConfig, create_router, state::AppState};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "healthshare-server")]
#[command(about = "HealthShare account and profile server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "HEALTHSHARE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Register an email/password account and provision its profile
    AddUser {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Initial role (admin, user, editor, manager, viewer)
        #[arg(short, long)]
        role: Option<String>,
    },
    /// Provision the profile of an existing identity
    Provision {
        #[arg(short, long)]
        uid: String,
    },
    /// List all accounts
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "healthshare_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            email,
            password,
            name,
            role,
        } => add_user(config, &email, &password, &name, role).await?,
        Commands::Provision { uid } => provision(config, &uid).await?,
        Commands::ListUsers => list_users(config).await?,
    }

    Ok(())
}

async fn open_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let pool = healthshare_storage::create_pool(&config.storage.database_url).await?;
    healthshare_storage::run_migrations(&pool).await?;
    Ok(AppState::build(config, pool)?)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting HealthShare Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let app_state = open_state(&config).await?;
    tracing::info!("Database connected");

    if config.auth.federation_secret.is_none() {
        tracing::info!("Federated sign-in disabled");
    }

    let app = create_router(app_state, &config.web.dir);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn add_user(
    config: ServerConfig,
    email: &str,
    password: &str,
    name: &str,
    role: Option<String>,
) -> anyhow::Result<()> {
    validation::validate_sign_up(name, email, password)?;
    // Check the role before anything is written
    let role_update = role
        .map(|role| {
            let update = ProfileUpdate::default().role(role);
            update.clone().validate().map(|_| update)
        })
        .transpose()?;

    let state = open_state(&config).await?;

    let identity = state
        .identity_provider
        .create_identity(email, password, name)
        .await?;
    state
        .profile_service
        .provision(&identity.uid, &identity.display_name, &identity.email)
        .await?;

    if let Some(update) = role_update {
        state
            .profile_service
            .write(Some(identity.uid.as_str()), update)
            .await?;
    }

    println!("Created {} ({})", identity.email, identity.uid);
    Ok(())
}

async fn provision(config: ServerConfig, uid: &str) -> anyhow::Result<()> {
    let uid = UserId::parse(uid).ok_or_else(|| anyhow::anyhow!("uid must not be empty"))?;
    let state = open_state(&config).await?;

    let identity = state
        .identity_provider
        .get_identity(&uid)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no identity with uid {uid}"))?;

    let provisioned = state
        .profile_service
        .provision(&identity.uid, &identity.display_name, &identity.email)
        .await?;

    if provisioned.created {
        println!("Provisioned profile for {}", identity.email);
    } else {
        println!("Profile for {} already exists", identity.email);
    }
    Ok(())
}

async fn list_users(config: ServerConfig) -> anyhow::Result<()> {
    let state = open_state(&config).await?;
    let identities = state.identity_provider.list_identities().await?;

    println!("Users:");
    for identity in identities {
        let role = state
            .profile_service
            .read(Some(identity.uid.as_str()))
            .await?
            .map(|p| p.role.to_string())
            .unwrap_or_else(|| "no profile".to_string());
        println!(
            "  {} - {} - {} ({})",
            identity.uid, identity.email, identity.display_name, role
        );
    }

    Ok(())
}
