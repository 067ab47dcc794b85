use std::path::PathBuf;

use anyhow::Result;
use api::ApiError;
use clap::{Parser, Subcommand};
use store::FileStore;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod settings;

use commands::{account, posts, App};

#[derive(Parser)]
#[command(name = "blog")]
#[command(about = "Command-line client for the blog service", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/blogclient/blogclient.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where the session is kept (default: <data dir>/blogclient)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        email: String,
        name: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// List posts, newest first
    List {
        /// Only posts by this member id
        #[arg(long)]
        member: Option<i64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Show one post
    Show { id: i64 },
    /// Write a new post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Change the title or content of your post
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete your post
    Delete { id: i64 },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = settings::load(cli.config.as_deref())?;
    let storage = match cli.data_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::default_location(),
    };
    tracing::debug!("Using API at {}", config.api.base_url);
    let mut app = App::open(config, storage).await?;

    let result = match cli.command {
        Commands::Signup {
            email,
            name,
            password,
        } => account::signup(&mut app, email, name, password).await,
        Commands::Login { email, password } => account::login(&mut app, email, password).await,
        Commands::Logout => account::logout(&mut app).await,
        Commands::Whoami => {
            account::whoami(&app);
            Ok(())
        }
        Commands::List { member, page, size } => posts::list(&mut app, member, page, size).await,
        Commands::Show { id } => posts::show(&mut app, id).await,
        Commands::Create { title, content } => posts::create(&mut app, title, content).await,
        Commands::Edit { id, title, content } => posts::edit(&mut app, id, title, content).await,
        Commands::Delete { id } => posts::delete(&mut app, id).await,
    };

    if let Err(err) = &result {
        if let Some(api_err) = err.downcast_ref::<ApiError>() {
            app.explain(api_err);
        }
    }
    result
}
