use std::collections::HashSet;

use crate::error::IdError;
use crate::model::{ContentSpan, RequirementView, Segment, TreeNode};

use super::snowflake::SnowflakeAllocator;

/// Combines numbered tree nodes and resolved spans into segment records. One
/// batch id is allocated per invocation and shared by every segment; each
/// segment additionally gets its own fresh id.
pub struct SegmentAssembler<'a> {
    allocator: &'a SnowflakeAllocator,
}

impl<'a> SegmentAssembler<'a> {
    pub fn new(allocator: &'a SnowflakeAllocator) -> Self {
        Self { allocator }
    }

    pub fn assemble(
        &self,
        nodes: &[TreeNode],
        spans: &[ContentSpan],
    ) -> Result<(String, Vec<Segment>), IdError> {
        let batch_id = self.allocator.next_id()?.to_string();

        let mut segments = Vec::with_capacity(nodes.len());
        for (node, span) in nodes.iter().zip(spans) {
            segments.push(Segment {
                id: self.allocator.next_id()?,
                batch_id: batch_id.clone(),
                title: node.text.clone(),
                parent: node.parent.clone(),
                start_index: span.start_index,
                end_index: span.end_index,
                content: span.text.clone(),
                outline_number: node.outline_number.clone(),
                parent_outline_number: node.parent_outline_number.clone(),
                tables: span.tables.clone(),
            });
        }

        Ok((batch_id, segments))
    }
}

/// Domain convention for the requirement-only read-back view, not a
/// structural rule: chapters 1-3 are boilerplate by convention, and container
/// headings merely group the leaf topics underneath them. Both exclusions can
/// be switched off.
pub struct RequirementFilter {
    pub skip_front_matter: bool,
    pub leaf_only: bool,
}

impl Default for RequirementFilter {
    fn default() -> Self {
        Self {
            skip_front_matter: true,
            leaf_only: true,
        }
    }
}

/// Reconstructs the index-aligned title/content arrays for one batch.
pub fn requirement_view(
    batch_id: &str,
    segments: &[Segment],
    filter: &RequirementFilter,
) -> RequirementView {
    let parent_numbers: HashSet<&str> = segments
        .iter()
        .filter_map(|segment| segment.parent_outline_number.as_deref())
        .collect();

    let mut titles = Vec::new();
    let mut contents = Vec::new();

    for segment in segments {
        if filter.skip_front_matter && is_front_matter(&segment.outline_number) {
            continue;
        }
        if filter.leaf_only && parent_numbers.contains(segment.outline_number.as_str()) {
            continue;
        }
        titles.push(segment.title.clone());
        contents.push(segment.content.clone());
    }

    RequirementView {
        batch_id: batch_id.to_string(),
        titles,
        contents,
    }
}

// Matches the whole first dotted component, so chapter 10 is not mistaken
// for chapter 1.
fn is_front_matter(outline_number: &str) -> bool {
    matches!(
        outline_number.split('.').next(),
        Some("1") | Some("2") | Some("3")
    )
}
