//! Covert Reader
//!
//! Line-oriented driver for the reader engine. Reads a JSON record list,
//! then takes one command per line from stdin and prints the record list
//! after every command.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use covert_reader::config::Config;
use covert_reader::db;
use covert_reader::document::{ContentCache, FsSource};
use covert_reader::session::{
    ReadingSessionStore, Record, RecordId, SearchJump, SqliteProgressStore, ToggleOutcome,
};
use covert_reader::ReaderError;

const HELP: &str = "\
commands:
  toggle <id>          open a record, or advance a page if it is open
  next|prev [id]       turn one page
  goto <page> [id]     jump to a page
  first|last [id]      jump to the first or last page
  search <query>       search the open record
  snext|sprev          next or previous match
  stop [id]            stop reading
  hide                 toggle hidden mode
  stats [path]         size and line count of a text file
  clear                clear the document cache
  list                 print the records
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covert_reader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    let validation = config.validate();
    for problem in &validation.errors {
        tracing::warn!("Configuration problem: {}", problem);
    }

    tracing::info!("Starting Covert Reader v{}", env!("CARGO_PKG_VERSION"));

    // Initialize database
    let db_pool = db::create_pool(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database initialized at {}", config.database.url);

    let cache = ContentCache::new(Arc::new(FsSource), config.cache_config());
    let progress = Arc::new(SqliteProgressStore::new(db_pool.clone()));
    let store = ReadingSessionStore::new(cache, progress, config.reader.clone()).await?;

    store.set_records(load_records().await?).await;
    print_views(&store).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        match run_command(&store, line).await {
            Ok(true) => print_views(&store).await,
            Ok(false) => {}
            Err(e) => match e.downcast_ref::<ReaderError>() {
                Some(reader_error) => println!("error: {}", reader_error.user_message()),
                None => println!("error: {}", e),
            },
        }
    }

    store.shutdown().await?;
    db_pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Record list from the JSON file named by the first argument or
/// `READER_RECORDS_PATH`
async fn load_records() -> anyhow::Result<Vec<Record>> {
    let Some(path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("READER_RECORDS_PATH").ok())
    else {
        tracing::warn!("No record list given, starting empty");
        return Ok(Vec::new());
    };

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read record list {}", path))?;
    let records: Vec<Record> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse record list {}", path))?;

    tracing::info!("Loaded {} records from {}", records.len(), path);
    Ok(records)
}

/// Run one command line; returns whether the list should be reprinted
async fn run_command(store: &ReadingSessionStore, line: &str) -> anyhow::Result<bool> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "help" => {
            println!("{}", HELP);
            Ok(false)
        }
        "list" => Ok(true),
        "toggle" => {
            let id = RecordId::from(rest);
            match store.toggle_display(&id).await? {
                ToggleOutcome::Opened { page, total_pages } => {
                    println!("opened {} at page {}/{}", id, page, total_pages)
                }
                ToggleOutcome::Advanced(false) => println!("already at the last page"),
                ToggleOutcome::Advanced(true) | ToggleOutcome::Superseded => {}
            }
            Ok(true)
        }
        "next" => report_turn(store.next_page(&target(store, rest).await?).await?),
        "prev" => report_turn(store.previous_page(&target(store, rest).await?).await?),
        "first" => report_turn(store.first_page(&target(store, rest).await?).await?),
        "last" => report_turn(store.last_page(&target(store, rest).await?).await?),
        "goto" => {
            let (page, id) = rest.split_once(' ').unwrap_or((rest, ""));
            let page: usize = page
                .parse()
                .with_context(|| format!("Invalid page number: {:?}", page))?;
            report_turn(store.go_to_page(&target(store, id).await?, page).await?)
        }
        "search" => {
            let id = target(store, "").await?;
            report_jump(store.search_first(&id, rest).await?)
        }
        "snext" => {
            let id = target(store, rest).await?;
            report_jump(store.search_next(&id).await?)
        }
        "sprev" => {
            let id = target(store, rest).await?;
            report_jump(store.search_previous(&id).await?)
        }
        "stop" => {
            store.stop_reading(&target(store, rest).await?).await?;
            Ok(true)
        }
        "hide" => {
            store.toggle_hidden_mode().await;
            Ok(true)
        }
        "stats" => {
            let path = match rest {
                "" => store
                    .config()
                    .await
                    .txt_file_path
                    .context("No text file path configured")?,
                path => path.to_string(),
            };
            let stats = store.file_stats(&path).await?;
            println!("{}: {} bytes, {} lines", path, stats.size, stats.lines);
            Ok(false)
        }
        "clear" => {
            store.clear_cache().await;
            println!("document cache cleared");
            Ok(false)
        }
        other => {
            println!("unknown command {:?}, try `help`", other);
            Ok(false)
        }
    }
}

/// Record named on the command line, else the one being read
async fn target(store: &ReadingSessionStore, arg: &str) -> anyhow::Result<RecordId> {
    if !arg.is_empty() {
        return Ok(RecordId::from(arg));
    }
    store
        .current_reading_record()
        .await
        .context("No record is being read")
}

fn report_turn(moved: bool) -> anyhow::Result<bool> {
    if !moved {
        println!("page unchanged");
    }
    Ok(moved)
}

fn report_jump(jump: Option<SearchJump>) -> anyhow::Result<bool> {
    match jump {
        Some(jump) => {
            println!(
                "match {}/{} on page {}",
                jump.hit.index + 1,
                jump.hit.total,
                jump.page
            );
            Ok(true)
        }
        None => {
            println!("no matches");
            Ok(false)
        }
    }
}

async fn print_views(store: &ReadingSessionStore) {
    for view in store.views().await {
        println!("{:<12} {}  {}", view.id.as_str(), view.label, view.description);
    }
}
