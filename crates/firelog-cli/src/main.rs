mod auth_cmd;
mod meldunki_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use firelog::api::{self, ApiError, Client, DEFAULT_SERVER_URL};
use firelog::session::{FileTokenStore, TokenManager};
use firelog_common::dto::profile::UpdateProfileRequest;

#[derive(Parser)]
#[command(
    name = "firelog",
    version,
    about = "FireLog: incident reports for volunteer fire departments"
)]
struct Cli {
    /// FireLog server base URL
    #[arg(long, global = true, env = "FIRELOG_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Session file (defaults to <config dir>/firelog/session.toml)
    #[arg(long, global = true, env = "FIRELOG_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign out, show the current session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Your own profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Incident reports of your department
    Meldunki {
        #[command(subcommand)]
        action: meldunki_cmd::MeldunkiAction,
    },
    /// List fire departments of a county
    Departments {
        /// County id (UUID)
        county_id: String,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in with e-mail and password
    Login {
        #[arg(long)]
        email: String,
        /// Read from the environment or prompted for when omitted
        #[arg(long, env = "FIRELOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who is signed in
    Status,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show,
    /// Change your first or last name
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

/// Everything a command needs to talk to the server.
pub struct Context {
    pub server: String,
    pub manager: TokenManager<FileTokenStore>,
}

impl Context {
    fn new(cli: &Cli) -> anyhow::Result<Self> {
        let store = match &cli.session_file {
            Some(path) => FileTokenStore::new(path),
            None => FileTokenStore::at_default_location()?,
        };
        let client = Client::new(&cli.server)?;
        Ok(Self {
            server: cli.server.clone(),
            manager: TokenManager::new(store, client),
        })
    }

    /// Client with a fresh bearer token.
    pub fn authorized(&self) -> anyhow::Result<Client> {
        self.manager.authorized_client()
    }
}

fn or_exit(r: anyhow::Result<i32>) -> i32 {
    r.unwrap_or_else(|e| {
        eprintln!("[firelog] error: {e:#}");
        if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_unauthorized) {
            eprintln!("[firelog] run `firelog auth login` to sign in again");
        }
        1
    })
}

fn main() {
    let cli = Cli::parse();
    let exit_code = or_exit(Context::new(&cli).and_then(|ctx| run(&cli.command, &ctx)));
    std::process::exit(exit_code);
}

fn run(command: &Commands, ctx: &Context) -> anyhow::Result<i32> {
    match command {
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                auth_cmd::cmd_auth_login(ctx, email, password.as_deref())
            }
            AuthAction::Logout => auth_cmd::cmd_auth_logout(ctx),
            AuthAction::Status => auth_cmd::cmd_auth_status(ctx),
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show => cmd_profile_show(ctx),
            ProfileAction::Update {
                first_name,
                last_name,
            } => cmd_profile_update(ctx, first_name.clone(), last_name.clone()),
        },
        Commands::Meldunki { action } => meldunki_cmd::run(action, ctx),
        Commands::Departments { county_id } => cmd_departments(ctx, county_id),
    }
}

fn print_profile(p: &firelog_common::dto::profile::ProfileDto) {
    println!("{} {} <{}>", p.first_name, p.last_name, p.email);
    println!("Role: {}", p.role);
    match &p.fire_department {
        Some(d) => println!("Department: {} ({})", d.name, d.id),
        None => println!("Department: none"),
    }
}

fn cmd_profile_show(ctx: &Context) -> anyhow::Result<i32> {
    let profile = api::profile_client::get_profile(&ctx.authorized()?)?;
    print_profile(&profile);
    Ok(0)
}

fn cmd_profile_update(
    ctx: &Context,
    first_name: Option<String>,
    last_name: Option<String>,
) -> anyhow::Result<i32> {
    if first_name.is_none() && last_name.is_none() {
        eprintln!("[firelog] nothing to update; pass --first-name or --last-name");
        return Ok(1);
    }
    let req = UpdateProfileRequest {
        first_name,
        last_name,
    };
    let profile = api::profile_client::update_profile(&ctx.authorized()?, &req)?;
    eprintln!("[firelog] Profile updated");
    print_profile(&profile);
    Ok(0)
}

fn cmd_departments(ctx: &Context, county_id: &str) -> anyhow::Result<i32> {
    let departments = api::dictionary_client::fire_departments(ctx.manager.client(), county_id)?;
    if departments.is_empty() {
        eprintln!("[firelog] no fire departments in county {county_id}");
        return Ok(0);
    }
    for d in departments {
        println!("{}  {}", d.id, d.name);
    }
    Ok(0)
}
