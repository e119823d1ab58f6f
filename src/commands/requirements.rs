use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use tracing::info;

use crate::cli::RequirementsArgs;
use crate::commands::segment::{RequirementFilter, requirement_view, select_segments_by_batch};

/// Emits the filtered leaf-segment view of one batch as JSON on stdout:
/// index-aligned `titles` and `contents` arrays for the summarization step.
pub fn run(args: RequirementsArgs) -> Result<()> {
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("reqseg_segments.sqlite"));

    if !db_path.exists() {
        bail!(
            "segment store not found at {}; run `reqseg segment` first",
            db_path.display()
        );
    }

    let connection = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    let segments = select_segments_by_batch(&connection, &args.batch_id)?;
    if segments.is_empty() {
        bail!("no segments found for batch {}", args.batch_id);
    }

    let filter = RequirementFilter {
        skip_front_matter: !args.keep_front_matter,
        leaf_only: !args.include_parents,
    };
    let view = requirement_view(&args.batch_id, &segments, &filter);

    info!(
        batch_id = %args.batch_id,
        segments = segments.len(),
        requirement_leaves = view.titles.len(),
        "requirement view ready"
    );

    let rendered =
        serde_json::to_string_pretty(&view).context("failed to serialize requirement view")?;
    println!("{rendered}");

    Ok(())
}
