use tracing::warn;

use crate::model::{ContentSpan, TableBlock, TreeNode};

pub struct SpanResolution {
    pub spans: Vec<ContentSpan>,
    pub tables_attached: usize,
    pub tables_dropped: usize,
    pub warnings: Vec<String>,
}

/// Resolves the paragraph range each heading owns: from the heading's own
/// position up to (and excluding) the next heading of equal or shallower
/// level, or the document end. Body text covers `(start, end]` so the heading
/// paragraph itself is never part of its own content; paragraphs before the
/// first heading belong to no span. Tables attach only when their position
/// falls strictly inside the range; a table positioned past the document end
/// is dropped with a warning instead of failing the resolution.
pub fn resolve_spans(
    nodes: &[TreeNode],
    paragraphs: &[String],
    tables: &[TableBlock],
) -> SpanResolution {
    let mut dropped = 0;
    let mut warnings = Vec::new();
    let mut usable_tables: Vec<&TableBlock> = Vec::with_capacity(tables.len());

    for table in tables {
        if table.position < paragraphs.len() {
            usable_tables.push(table);
        } else {
            warn!(
                position = table.position,
                total_paragraphs = paragraphs.len(),
                "table position beyond document end, dropping table"
            );
            warnings.push(format!(
                "dropped table at position {} beyond document end ({} paragraphs)",
                table.position,
                paragraphs.len()
            ));
            dropped += 1;
        }
    }

    let mut spans = Vec::with_capacity(nodes.len());
    let mut attached = 0;

    for (index, node) in nodes.iter().enumerate() {
        let start_index = node.position;
        let end_index = nodes[index + 1..]
            .iter()
            .find(|following| following.level <= node.level)
            .map(|following| following.position - 1)
            .unwrap_or_else(|| paragraphs.len().saturating_sub(1));

        let text = if end_index > start_index {
            paragraphs[start_index + 1..=end_index].join(" ")
        } else {
            String::new()
        };

        let span_tables: Vec<Vec<Vec<String>>> = usable_tables
            .iter()
            .filter(|table| start_index < table.position && table.position < end_index)
            .map(|table| table.rows.clone())
            .collect();
        attached += span_tables.len();

        spans.push(ContentSpan {
            start_index,
            end_index,
            text,
            tables: span_tables,
        });
    }

    SpanResolution {
        spans,
        tables_attached: attached,
        tables_dropped: dropped,
        warnings,
    }
}
