// src/main.rs
mod bbmp;
mod extractors;
mod storage;
mod utils;

use clap::Parser;
use scraper::Html;

use bbmp::client;
use extractors::{locate_section_tables, normalize_table, SECTION_IDS};
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the BBMP bed status extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the bed status page
    #[arg(short, long, default_value = client::DEFAULT_STATUS_URL)]
    url: String,

    /// Output directory for extracted section documents
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Debug mode - save raw and annotated copies of the fetched page
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting bed status scrape: {:?}", args);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Fetch the status page
    let page = client::fetch_status_page(&args.url).await?;
    tracing::info!("Fetched status page ({} bytes)", page.len());

    if args.debug {
        let debug_dir = format!("{}/debug", args.output_dir);
        std::fs::create_dir_all(&debug_dir)?;

        let raw_path = format!("{}/raw_page.html", debug_dir);
        std::fs::write(&raw_path, &page)?;
        tracing::info!("Saved raw page to: {}", raw_path);

        // Highlight the section containers so a layout change is easy to
        // spot when a section stops showing up in the output.
        let patterns: Vec<(String, &str)> = SECTION_IDS
            .iter()
            .map(|id| {
                (
                    format!(r#"(?i)<div[^>]*id=["']?{}["']?[^>]*>"#, id),
                    "section",
                )
            })
            .chain(std::iter::once(("(?i)<table".to_string(), "table")))
            .collect();
        let pattern_refs: Vec<(&str, &str)> =
            patterns.iter().map(|(p, t)| (p.as_str(), *t)).collect();

        let annotated_path = format!("{}/page_annotated.html", debug_dir);
        if let Err(e) = utils::html_debug::create_debug_html(&page, &annotated_path, &pattern_refs) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        } else {
            tracing::info!("Created annotated debug HTML: {}", annotated_path);
        }
    }

    // 5. Locate the section tables
    let document = Html::parse_document(&page);
    let tables = locate_section_tables(&document)?;
    if tables.is_empty() {
        tracing::warn!("No section tables found on the page");
    }

    // 6. Normalize each table and persist its document. Any failure
    //    aborts the remaining sections; there is no partial-success mode.
    let mut saved = 0;
    for (section_id, table) in tables {
        tracing::info!("Processing section '{}'", section_id);
        let doc = normalize_table(table)?;

        match storage.save_section_document(&doc) {
            Ok(path) => {
                tracing::info!("Saved '{}' to {}", doc.category, path.display());
                saved += 1;
            }
            Err(e) => {
                tracing::error!("error in doc for {}", doc.category);
                return Err(e.into());
            }
        }
    }

    tracing::info!("Scrape finished, {} section documents saved", saved);

    Ok(())
}
