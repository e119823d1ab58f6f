use serde::{Deserialize, Serialize};

/// Document export handed over by the external document loader. Paragraphs
/// carry the loader's style classification; table positions are expressed in
/// the same paragraph-index space as the paragraphs themselves.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentExport {
    pub source: String,
    pub paragraphs: Vec<ParagraphBlock>,
    #[serde(default)]
    pub tables: Vec<TableBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParagraphBlock {
    pub text: String,
    pub style: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableBlock {
    pub position: usize,
    pub rows: Vec<Vec<String>>,
}

/// One document heading, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingTuple {
    pub text: String,
    pub level: u32,
    pub position: usize,
}

/// A heading with its computed outline number and resolved parent. Parent
/// linkage is stored as plain values (title and outline number), not live
/// references; nodes appear in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub text: String,
    pub level: u32,
    pub position: usize,
    pub outline_number: String,
    pub parent: Option<String>,
    pub parent_outline_number: Option<String>,
}

/// The paragraph range owned by one heading. `text` concatenates paragraphs
/// in `(start_index, end_index]`; `tables` holds every table whose position
/// falls strictly inside the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSpan {
    pub start_index: usize,
    pub end_index: usize,
    pub text: String,
    pub tables: Vec<Vec<Vec<String>>>,
}

/// Persisted segment record, keyed by (batch_id, id). Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: u64,
    pub batch_id: String,
    pub title: String,
    pub parent: Option<String>,
    pub start_index: usize,
    pub end_index: usize,
    pub content: String,
    pub outline_number: String,
    pub parent_outline_number: Option<String>,
    pub tables: Vec<Vec<Vec<String>>>,
}

/// Index-aligned leaf view consumed by the summarization collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementView {
    pub batch_id: String,
    pub titles: Vec<String>,
    pub contents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub db_path: String,
    pub input_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentCounts {
    pub paragraph_count: usize,
    pub table_count: usize,
    pub heading_count: usize,
    pub segments_inserted: usize,
    pub tables_attached: usize,
    pub tables_dropped_out_of_range: usize,
    pub requirement_leaf_count: usize,
    pub batches_total: i64,
    pub segments_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub batch_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub missing_level_policy: String,
    pub source_filename: String,
    pub source_sha256: String,
    pub paths: SegmentPaths,
    pub counts: SegmentCounts,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}
