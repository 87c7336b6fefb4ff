use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hierarchical_todo::{api, db, hierarchy, render, ListId};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Hierarchical to-do lists over a JSON API")]
struct Cli {
    /// SQLite database file. Defaults to the platform data directory.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Print lists as trees
    Show {
        /// Only print this list
        list_id: Option<String>,
    },
}

/// Initialize tracing with output to stderr (for printing commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(
        |_| "hierarchical_todo=debug,todo_core=debug,tower_http=debug".into(),
    ));

    if use_stderr {
        // Keep stdout clean for the rendered trees
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<db::Database> {
    let db = match path {
        Some(path) => db::Database::open(path)?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(db: db::Database, host: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting to-do server on port {}", port);

    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("To-do server listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Show { .. }));
    init_tracing(use_stderr);

    let db = open_database(cli.database)?;

    match cli.command {
        Some(Commands::Serve { port, host }) => serve(db, &host, port).await?,
        Some(Commands::Show { list_id }) => {
            let output = match list_id {
                Some(id) => render::render_tree(&hierarchy::list_tree(&db, &ListId::from(id))?),
                None => render::render_forest(&hierarchy::all_trees(&db)?),
            };
            print!("{}", output);
        }
        None => serve(db, "127.0.0.1", 5000).await?,
    }

    Ok(())
}
