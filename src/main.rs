use std::future::Future;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stickies::config::Config;
use stickies::mirror::FileMirror;
use stickies::models::{is_hex_color, NoteId, DEFAULT_COLOR};
use stickies::remote::HttpRemote;
use stickies::render::render_board;
use stickies::store::{NoteStore, StoreError};
use stickies::{api, db};

type Store = NoteStore<FileMirror, HttpRemote>;

#[derive(Parser)]
#[command(name = "stickies")]
#[command(about = "Sticky notes mirrored locally and to a remote notes service")]
struct Cli {
    /// Notes collection URL (overrides config and STICKIES_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Directory of the local mirror (overrides config and STICKIES_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the reference notes service
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },
    #[command(flatten)]
    Notes(NoteCommand),
}

/// Commands that work on the local board.
#[derive(Subcommand, Debug, PartialEq)]
enum NoteCommand {
    /// Show the board, pinned notes first
    List {
        /// Skip the remote fetch and show the local mirror only
        #[arg(long)]
        local: bool,
    },
    /// Add a note
    Add {
        text: String,
        #[arg(short, long, default_value = DEFAULT_COLOR, value_parser = parse_color)]
        color: String,
    },
    /// Delete a note
    Delete { id: NoteId },
    /// Replace a note's text
    Edit { id: NoteId, text: String },
    /// Pin or unpin a note
    Pin { id: NoteId },
    /// Change a note's color
    Color {
        id: NoteId,
        #[arg(value_parser = parse_color)]
        color: String,
    },
}

fn parse_color(value: &str) -> Result<String, String> {
    if is_hex_color(value) {
        Ok(value.to_lowercase())
    } else {
        Err(format!("expected a hex color like #ffeb3b, got `{}`", value))
    }
}

/// Initialize tracing. Output goes to stderr so stdout only carries the board.
fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            init_tracing("stickies=info,tower_http=info");
            serve(port).await
        }
        Commands::Notes(command) => {
            init_tracing("stickies=warn");

            let mut config = Config::load();
            if let Some(url) = cli.url {
                config.remote_url = url;
            }
            if let Some(dir) = cli.data_dir {
                config.data_dir = Some(dir);
            }
            run(command, &config).await
        }
    }
}

async fn run(command: NoteCommand, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;

    match command {
        NoteCommand::List { local } => {
            if local {
                store.load_local();
            } else {
                start(&store).await;
            }
        }
        NoteCommand::Add { text, color } => {
            start(&store).await;
            match interruptible(&store, store.add(&text, &color)).await? {
                Some(note) => println!("Added note {}", note.id),
                None => println!("Nothing to add: note text is blank"),
            }
        }
        NoteCommand::Delete { id } => {
            start(&store).await;
            interruptible(&store, store.delete(id)).await?;
            println!("Deleted note {}", id);
        }
        NoteCommand::Edit { id, text } => {
            start(&store).await;
            store.edit(id, text)?;
        }
        NoteCommand::Pin { id } => {
            start(&store).await;
            let note = store.toggle_pin(id)?;
            println!("{} note {}", if note.pinned { "Pinned" } else { "Unpinned" }, id);
        }
        NoteCommand::Color { id, color } => {
            start(&store).await;
            store.change_color(id, color)?;
        }
    }

    print!("{}", render_board(&store.notes()));
    Ok(())
}

async fn serve(port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting notes service on port {}", port);

    let db = db::Database::open_default()?;
    db.migrate()?;

    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    tracing::info!("Notes service listening on http://127.0.0.1:{}/notes", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    let mirror = match &config.data_dir {
        Some(dir) => FileMirror::new(dir),
        None => FileMirror::open_default()?,
    };
    tracing::debug!("Local notes at {}", mirror.dir().display());

    let remote = HttpRemote::with_timeout(&config.remote_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    Ok(NoteStore::new(mirror, remote))
}

/// Seed from the local mirror and fetch the remote list. A failed fetch
/// leaves the local notes in place.
async fn start(store: &Store) {
    // The store already logs the failure
    let _ = interruptible(store, store.initialize()).await;
}

/// Run a store operation, cancelling pending remote calls on Ctrl-C.
async fn interruptible<T>(
    store: &Store,
    op: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::pin!(op);
    tokio::select! {
        result = &mut op => result,
        _ = tokio::signal::ctrl_c() => {
            store.cancel_all();
            op.await
        }
    }
}
