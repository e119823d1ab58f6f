use std::fs;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::segment::{
    count_batches, count_segments, decode_datacenter_id, decode_sequence,
    decode_timestamp_millis, decode_worker_id,
};
use crate::model::SegmentRunManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("reqseg_segments.sqlite"));

    info!(cache_root = %args.cache_root.display(), "status requested");

    match latest_run_manifest_path(&manifest_dir)? {
        Some(path) => {
            let raw = fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let manifest: SegmentRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                run_id = %manifest.run_id,
                batch_id = %manifest.batch_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                segments = manifest.counts.segments_inserted,
                requirement_leaves = manifest.counts.requirement_leaf_count,
                tables_dropped = manifest.counts.tables_dropped_out_of_range,
                "loaded latest segment run manifest"
            );
        }
        None => {
            warn!(path = %manifest_dir.display(), "no segment run manifest found");
        }
    }

    if db_path.exists() {
        let connection = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let batches = count_batches(&connection)?;
        let segments = count_segments(&connection)?;

        info!(
            path = %db_path.display(),
            batches = batches,
            segments = segments,
            "segment store status"
        );

        report_recent_batches(&connection)?;
    } else {
        warn!(path = %db_path.display(), "segment store missing");
    }

    Ok(())
}

fn latest_run_manifest_path(manifest_dir: &std::path::Path) -> Result<Option<std::path::PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to list {}", manifest_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("segment_run_") && name.ends_with(".json") {
            candidates.push(entry.path());
        }
    }

    // Run timestamps are embedded in the filename, so lexical max is newest.
    candidates.sort();
    Ok(candidates.pop())
}

fn report_recent_batches(connection: &Connection) -> Result<()> {
    let mut statement = connection.prepare(
        "
        SELECT batch_id, COUNT(*)
        FROM segments
        GROUP BY batch_id
        ORDER BY MIN(created_at) DESC
        LIMIT 10
        ",
    )?;

    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let batch_id: String = row.get(0)?;
        let segment_count: i64 = row.get(1)?;

        match batch_id.parse::<u64>() {
            Ok(id) => {
                let allocated_at =
                    DateTime::<Utc>::from_timestamp_millis(decode_timestamp_millis(id))
                        .map(|ts| ts.to_rfc3339())
                        .unwrap_or_default();

                info!(
                    batch_id = %batch_id,
                    segments = segment_count,
                    allocated_at = %allocated_at,
                    datacenter_id = decode_datacenter_id(id),
                    worker_id = decode_worker_id(id),
                    sequence = decode_sequence(id),
                    "batch"
                );
            }
            Err(_) => {
                info!(batch_id = %batch_id, segments = segment_count, "batch");
            }
        }
    }

    Ok(())
}
