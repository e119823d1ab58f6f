use std::collections::BTreeMap;

use anyhow::{Context, Result};
use regex::Regex;

use crate::cli::MissingLevelPolicy;
use crate::error::HeadingError;
use crate::model::{HeadingTuple, ParagraphBlock, TreeNode};

/// Pulls heading tuples out of the loader's styled paragraphs. A paragraph
/// counts as a heading when its style name is `Heading <n>` (any case); all
/// other styles, including TOC entries, are body text.
pub fn extract_headings(paragraphs: &[ParagraphBlock]) -> Result<Vec<HeadingTuple>> {
    let heading_style_regex =
        Regex::new(r"(?i)^heading\s*(\d+)$").context("failed to compile heading style regex")?;

    let mut headings = Vec::new();
    for (position, paragraph) in paragraphs.iter().enumerate() {
        let Some(captures) = heading_style_regex.captures(paragraph.style.trim()) else {
            continue;
        };
        let Some(level) = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };

        headings.push(HeadingTuple {
            text: paragraph.text.trim().to_string(),
            level,
            position,
        });
    }

    Ok(headings)
}

/// Structural gate in front of the tree builder: levels start at 1 and
/// positions strictly increase in document order. Any violation rejects the
/// whole batch, since outline numbering depends on full-document consistency.
pub fn validate_headings(headings: &[HeadingTuple]) -> Result<(), HeadingError> {
    let mut previous_position: Option<usize> = None;

    for heading in headings {
        if heading.level == 0 {
            return Err(HeadingError::LevelOutOfRange {
                position: heading.position,
            });
        }
        if let Some(previous) = previous_position
            && heading.position <= previous
        {
            return Err(HeadingError::NonMonotonicPosition {
                previous,
                position: heading.position,
            });
        }
        previous_position = Some(heading.position);
    }

    Ok(())
}

struct ActiveHeading {
    text: String,
    level: u32,
    outline_number: String,
}

/// Single left-to-right pass turning the flat heading list into numbered
/// nodes with parent linkage. Headings already popped off the ancestor stack
/// are superseded and can never parent a later node; a level-1 heading
/// restarts the counters of every deeper level. Output preserves document
/// order. Input must already have passed [`validate_headings`].
pub fn build_tree(headings: &[HeadingTuple], policy: MissingLevelPolicy) -> Vec<TreeNode> {
    let mut nodes = Vec::with_capacity(headings.len());
    let mut stack: Vec<ActiveHeading> = Vec::new();
    let mut counters: BTreeMap<u32, u64> = BTreeMap::new();

    for heading in headings {
        while stack
            .last()
            .is_some_and(|active| active.level >= heading.level)
        {
            stack.pop();
        }

        *counters.entry(heading.level).or_insert(0) += 1;
        if heading.level == 1 {
            for (level, counter) in counters.iter_mut() {
                if *level > 1 {
                    *counter = 0;
                }
            }
        }

        let outline_number = compose_outline_number(&counters, heading.level, policy);
        let (parent, parent_outline_number) = match stack.last() {
            Some(active) => (
                Some(active.text.clone()),
                Some(active.outline_number.clone()),
            ),
            None => (None, None),
        };

        stack.push(ActiveHeading {
            text: heading.text.clone(),
            level: heading.level,
            outline_number: outline_number.clone(),
        });
        nodes.push(TreeNode {
            text: heading.text.clone(),
            level: heading.level,
            position: heading.position,
            outline_number,
            parent,
            parent_outline_number,
        });
    }

    nodes
}

fn compose_outline_number(
    counters: &BTreeMap<u32, u64>,
    level: u32,
    policy: MissingLevelPolicy,
) -> String {
    let mut components = Vec::with_capacity(level as usize);

    for current_level in 1..=level {
        match counters.get(&current_level).copied() {
            Some(count) if count > 0 => components.push(count.to_string()),
            _ => {
                if policy == MissingLevelPolicy::ZeroFill {
                    components.push("0".to_string());
                }
            }
        }
    }

    components.join(".")
}
