use anyhow::Result;
use authflow::commands::{self, Config, Settings, config::DEFAULT_API_URL};
use authflow::domain::OAuthProvider;
use authflow::http::{BACKOFF_BASE_MS, DEFAULT_MAX_RETRIES};
use authflow::runtime::RealRuntime;
use clap::Parser;
use std::time::Duration;

/// authflow - command line client for the authflow auth API
///
/// Log in, register and manage the stored session token.
///
/// A remembered login (--remember) is kept in the user data directory;
/// otherwise the token lives under the temp directory until it is cleared.
///
/// Examples:
///   authflow login --email admin@example.com --remember
///   authflow me
#[derive(Parser, Debug)]
#[command(author, version = env!("AUTHFLOW_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Auth API base URL
    #[arg(
        long = "api-url",
        env = "AUTHFLOW_API_URL",
        value_name = "URL",
        default_value = DEFAULT_API_URL,
        global = true
    )]
    pub api_url: String,

    /// Retries for failed requests (4xx responses are never retried)
    #[arg(
        long,
        env = "AUTHFLOW_RETRIES",
        value_name = "COUNT",
        default_value_t = DEFAULT_MAX_RETRIES,
        global = true
    )]
    pub retries: u32,

    /// Base backoff between retries in milliseconds, doubled on each retry
    #[arg(
        long = "backoff-ms",
        env = "AUTHFLOW_BACKOFF_MS",
        value_name = "MS",
        default_value_t = BACKOFF_BASE_MS,
        global = true,
        hide = true
    )]
    pub backoff_ms: u64,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Log in with email and password
    Login(LoginArgs),

    /// Register a new account
    Signup(SignupArgs),

    /// Print the authorization URL of an OAuth provider
    Oauth(OAuthArgs),

    /// Show the user behind the stored token
    Me,

    /// Exchange the stored refresh token for a new token
    Refresh,

    /// Remove the stored session
    Logout,

    /// Show where the session is stored and whether it is still valid
    Status,

    /// Check form input without contacting the server
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (also via AUTHFLOW_PASSWORD)
    #[arg(long, short = 'p', env = "AUTHFLOW_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Keep the session across reboots
    #[arg(long, short = 'r')]
    pub remember: bool,
}

#[derive(clap::Args, Debug)]
pub struct SignupArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (also via AUTHFLOW_PASSWORD)
    #[arg(long, short = 'p', env = "AUTHFLOW_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Password confirmation (defaults to the password)
    #[arg(long = "confirm-password")]
    pub confirm_password: Option<String>,

    /// Accept the terms and conditions
    #[arg(long = "accept-terms")]
    pub accept_terms: bool,
}

#[derive(clap::Args, Debug)]
pub struct OAuthArgs {
    /// google or github
    #[arg(value_name = "PROVIDER")]
    pub provider: OAuthProvider,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Validate as a registration form when given
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (also via AUTHFLOW_PASSWORD)
    #[arg(long, short = 'p', env = "AUTHFLOW_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long = "confirm-password")]
    pub confirm_password: Option<String>,

    /// Treat the terms and conditions as accepted (registration form)
    #[arg(long = "accept-terms")]
    pub accept_terms: bool,

    /// Also check a six digit email verification code
    #[arg(long, value_name = "CODE")]
    pub code: Option<String>,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            api_url: self.api_url.clone(),
            retries: self.retries,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let settings = cli.settings();
    run(cli.command, &settings).await
}

async fn run(command: Commands, settings: &Settings) -> Result<()> {
    let config = || Config::new(RealRuntime, settings);

    match command {
        Commands::Login(args) => {
            commands::login(&config()?, &args.email, &args.password, args.remember).await
        }
        Commands::Signup(args) => {
            let confirm_password = args.confirm_password.as_deref().unwrap_or(&args.password);
            commands::signup(
                &config()?,
                &args.name,
                &args.email,
                &args.password,
                confirm_password,
                args.accept_terms,
            )
            .await
        }
        Commands::Oauth(args) => commands::oauth(&config()?, args.provider).await,
        Commands::Me => commands::me(&config()?).await,
        Commands::Refresh => commands::refresh(&config()?).await,
        Commands::Logout => commands::logout(&config()?).await,
        Commands::Status => commands::status(&config()?),
        Commands::Validate(args) => commands::validate(&commands::ValidateOptions {
            name: args.name.as_deref(),
            email: &args.email,
            password: &args.password,
            confirm_password: args.confirm_password.as_deref(),
            accept_terms: args.accept_terms,
            code: args.code.as_deref(),
        }),
    }
}
