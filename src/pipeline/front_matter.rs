//! Front-matter trimming.
//!
//! Word-processor exports lead with boilerplate (cover page, internal
//! notes) separated from the real content by an explicit page break.
//! The converter encodes that break as an element styled with
//! `page-break-after: always`; everything before it is dropped.

use anyhow::Result;
use kuchiki::NodeRef;
use regex::Regex;
use std::sync::LazyLock;

use crate::config::PipelineConfig;
use crate::dom;

static PAGE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"page-break-after\s*:\s*always")
        .expect("BUG: hardcoded page-break regex is valid")
});

/// Remove every body child preceding the first page-break marker, and
/// the marker itself. Without a marker the tree is left untouched
/// unless the config opts into discarding everything. Never fails on
/// content it does not recognize.
pub fn trim_front_matter(document: &NodeRef, config: &PipelineConfig) -> Result<()> {
    let body = dom::document_body(document)?;

    let marker = body.children().find(|child| {
        child
            .as_element()
            .and_then(|el| {
                el.attributes
                    .borrow()
                    .get("style")
                    .map(|style| PAGE_BREAK_RE.is_match(style))
            })
            .unwrap_or(false)
    });

    let Some(marker) = marker else {
        if config.discard_when_no_marker() {
            log::debug!("no page-break marker; discarding body content per config");
            let children: Vec<_> = body.children().collect();
            for child in children {
                child.detach();
            }
        }
        return Ok(());
    };

    // Snapshot first: detaching while walking the sibling chain would
    // break the iteration.
    let mut to_remove = Vec::new();
    for child in body.children() {
        if child == marker {
            break;
        }
        to_remove.push(child);
    }

    log::debug!(
        "trimming {} front-matter node(s) before page-break marker",
        to_remove.len()
    );
    for node in to_remove {
        node.detach();
    }
    marker.detach();

    Ok(())
}
