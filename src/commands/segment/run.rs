use std::fs;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::cli::SegmentArgs;
use crate::model::{DocumentExport, SegmentCounts, SegmentPaths, SegmentRunManifest};
use crate::util::{ensure_directory, now_utc_string, source_sha256, utc_compact_string, write_json_pretty};

use super::assemble::{RequirementFilter, SegmentAssembler, requirement_view};
use super::headings::{build_tree, extract_headings, validate_headings};
use super::snowflake::SnowflakeAllocator;
use super::spans::resolve_spans;
use super::store::{
    DB_SCHEMA_VERSION, configure_connection, count_batches, count_segments, ensure_schema,
    insert_segments, select_segments_by_batch,
};

pub fn run(args: SegmentArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| cache_root.join("reqseg_segments.sqlite"));
    let run_manifest_path = args.run_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!("segment_run_{}.json", utc_compact_string(started_ts)))
    });

    info!(input = %args.input.display(), run_id = %run_id, "starting segmentation");

    let raw = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let export: DocumentExport = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    let input_sha256 = source_sha256(&args.input)?;

    let paragraphs: Vec<String> = export
        .paragraphs
        .iter()
        .map(|paragraph| paragraph.text.clone())
        .collect();

    let headings = extract_headings(&export.paragraphs)?;
    validate_headings(&headings).context("document export rejected")?;

    info!(
        paragraphs = paragraphs.len(),
        tables = export.tables.len(),
        headings = headings.len(),
        "document export loaded"
    );

    let nodes = build_tree(&headings, args.missing_level_policy);
    let resolution = resolve_spans(&nodes, &paragraphs, &export.tables);

    let allocator = SnowflakeAllocator::new(u64::from(args.datacenter_id), u64::from(args.worker_id))?;
    let assembler = SegmentAssembler::new(&allocator);
    let (batch_id, segments) = assembler.assemble(&nodes, &resolution.spans)?;

    let mut connection = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    let segments_inserted = insert_segments(&mut connection, &segments)?;

    let stored = select_segments_by_batch(&connection, &batch_id)?;
    let view = requirement_view(&batch_id, &stored, &RequirementFilter::default());

    let batches_total = count_batches(&connection)?;
    let segments_total = count_segments(&connection)?;
    let updated_at = now_utc_string();

    let manifest = SegmentRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        batch_id: batch_id.clone(),
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        updated_at,
        command: render_segment_command(&args),
        missing_level_policy: args.missing_level_policy.as_str().to_string(),
        source_filename: export.source.clone(),
        source_sha256: input_sha256,
        paths: SegmentPaths {
            cache_root: cache_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            db_path: db_path.display().to_string(),
            input_path: args.input.display().to_string(),
        },
        counts: SegmentCounts {
            paragraph_count: paragraphs.len(),
            table_count: export.tables.len(),
            heading_count: headings.len(),
            segments_inserted,
            tables_attached: resolution.tables_attached,
            tables_dropped_out_of_range: resolution.tables_dropped,
            requirement_leaf_count: view.titles.len(),
            batches_total,
            segments_total,
        },
        warnings: resolution.warnings,
        notes: vec![
            "Segment command completed against the local sqlite segment store.".to_string(),
            "Requirement leaf count uses the default filter (front matter and container headings excluded)."
                .to_string(),
        ],
    };

    write_json_pretty(&run_manifest_path, &manifest)?;

    info!(path = %run_manifest_path.display(), "wrote segment run manifest");
    info!(
        batch_id = %batch_id,
        segments = segments_inserted,
        requirement_leaves = view.titles.len(),
        "segmentation completed"
    );

    Ok(())
}

fn render_segment_command(args: &SegmentArgs) -> String {
    let mut command = format!(
        "reqseg segment --input {} --cache-root {} --datacenter-id {} --worker-id {} --missing-level-policy {}",
        args.input.display(),
        args.cache_root.display(),
        args.datacenter_id,
        args.worker_id,
        args.missing_level_policy.as_str()
    );

    if let Some(db_path) = &args.db_path {
        command.push_str(&format!(" --db-path {}", db_path.display()));
    }
    if let Some(manifest_path) = &args.run_manifest_path {
        command.push_str(&format!(" --run-manifest-path {}", manifest_path.display()));
    }

    command
}
