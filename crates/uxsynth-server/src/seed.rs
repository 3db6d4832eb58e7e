//! Demo study seeded from transcript files shipped with the data directory.

use std::path::Path;

use tracing::info;
use uxsynth_core::Result;
use uxsynth_ingest::{ImportReport, Ingester};
use uxsynth_store::SqliteStore;

pub const DEMO_STUDY_ID: &str = "demo";
pub const DEMO_STUDY_NAME: &str = "Demo study";

/// Import `seed_dir` into the demo study. Returns `None` when there is no
/// seed directory. Re-running only adds files not yet imported.
pub fn import_seed(store: &SqliteStore, seed_dir: &Path) -> Result<Option<ImportReport>> {
    if !seed_dir.is_dir() {
        return Ok(None);
    }
    store.ensure_study(DEMO_STUDY_ID, DEMO_STUDY_NAME)?;
    let report = Ingester::new(store).import_dir(DEMO_STUDY_ID, seed_dir)?;
    info!("Seeded demo study: {} new transcripts", report.imported);
    Ok(Some(report))
}
