//! uxsynth: research transcript synthesis server and CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uxsynth_analyze::{Analyzer, TracingObserver};
use uxsynth_core::{AnalysisConfig, AnalysisOutcome, UxsynthConfig};
use uxsynth_server::{build_router, seed, AppState};
use uxsynth_store::SqliteStore;

fn resolve_data_dir() -> PathBuf {
    std::env::var("UXSYNTH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_help() {
    println!("uxsynth: synthesize user research transcripts into insights");
    println!();
    println!("Usage: uxsynth [command]");
    println!();
    println!("Commands:");
    println!("  (none)            Start the server");
    println!("  analyze <dir>     Analyze the transcripts in <dir> and print JSON");
    println!("  help              Show this help message");
}

/// `uxsynth analyze <dir>`: heuristic analysis without a database.
fn analyze_dir(dir: &Path) -> anyhow::Result<()> {
    let transcripts = uxsynth_ingest::transcripts_from_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", dir.display(), e))?;
    let analyzer =
        Analyzer::new(AnalysisConfig::from_env()).with_observer(Arc::new(TracingObserver));

    match analyzer.analyze(&transcripts) {
        AnalysisOutcome::NoInput => {
            println!("{}", serde_json::json!({ "status": "no_input" }));
        }
        AnalysisOutcome::Complete(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "analyze" => {
                let Some(dir) = args.get(2) else {
                    eprintln!("Usage: uxsynth analyze <transcript-dir>");
                    std::process::exit(1);
                };
                return analyze_dir(Path::new(dir));
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'uxsynth help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = UxsynthConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = SqliteStore::open(&config.data_paths.db)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    if let Err(e) = seed::import_seed(&store, &config.data_paths.seed) {
        warn!("Seed import failed: {}", e);
    }

    let state = Arc::new(AppState::new(config, store));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("uxsynth server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
