//! Style canonicalization: the final normalization pass.
//!
//! Headings collapse to a two-level taxonomy (every h1 demotes to h2,
//! qualifying bold runs promote to h2), tagged citation markers become
//! bracketed plain text, and table markup is flattened to sibling flow
//! content.
//!
//! Ordering inside this pass matters: heading demotion runs before bold
//! reclassification, and table unwrapping runs last because earlier
//! stages may still read caption text from inside table cells.

use anyhow::Result;
use kuchiki::NodeRef;
use regex::Regex;
use std::sync::LazyLock;

use crate::config::PipelineConfig;
use crate::dom;

/// Tags whose markup is flattened away, children promoted in place.
const TABLE_FAMILY_SELECTOR: &str = "table, tbody, thead, tfoot, tr, th, td";

static FONT_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"font-size\s*:\s*([0-9]+(?:\.[0-9]+)?)")
        .expect("BUG: hardcoded font-size regex is valid")
});

/// Demote every level-1 heading to level 2, preserving inner content.
/// No other heading level is touched.
pub fn demote_headings(document: &NodeRef) -> Result<()> {
    for heading in dom::select_all(document, "h1")? {
        let h1 = heading.as_node();
        let h2 = dom::element_from_html("<h2></h2>")?;
        while let Some(child) = h1.first_child() {
            h2.append(child);
        }
        dom::replace_with(h1, h2);
    }
    Ok(())
}

/// Reclassify bold runs: short runs with a large resolved font size are
/// really headings, everything else normalizes to `<strong>`.
pub fn classify_bold_runs(document: &NodeRef, config: &PipelineConfig) -> Result<()> {
    for bold in dom::select_all(document, "b, strong")? {
        let node = bold.as_node();
        let font_size = resolved_font_size(node, config.default_font_size());
        let text_len = node.text_contents().trim().chars().count();

        let is_heading = font_size > config.heading_font_size_threshold()
            && text_len <= config.heading_max_text_len();

        let target_tag = if is_heading { "h2" } else { "strong" };
        if dom::tag_name(node).as_deref() == Some(target_tag) {
            continue;
        }

        let replacement = dom::element_from_html(&format!("<{target_tag}></{target_tag}>"))?;
        // Carry the attributes over: a later canonicalization pass must
        // resolve the same declared font size, or the classification
        // would not be stable.
        if let (Some(source), Some(target)) = (node.as_element(), replacement.as_element()) {
            let source_attrs = source.attributes.borrow();
            let mut target_attrs = target.attributes.borrow_mut();
            for (name, attr) in &source_attrs.map {
                target_attrs.map.insert(name.clone(), attr.clone());
            }
        }
        while let Some(child) = node.first_child() {
            replacement.append(child);
        }
        dom::replace_with(node, replacement);
    }
    Ok(())
}

/// Resolved font size for an element: the nearest `font-size`
/// declaration on its own or an ancestor `style` attribute. Units are
/// ignored; the thresholds are expressed in the same units the source
/// declares. Falls back to the configured default, standing in for the
/// browser's inherited computed style.
fn resolved_font_size(node: &NodeRef, default: f32) -> f32 {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if let Some(element) = candidate.as_element() {
            let attrs = element.attributes.borrow();
            if let Some(style) = attrs.get("style") {
                if let Some(captures) = FONT_SIZE_RE.captures(style) {
                    if let Ok(size) = captures[1].parse::<f32>() {
                        return size;
                    }
                }
            }
        }
        current = candidate.parent();
    }
    default
}

/// Replace every tagged citation marker with its terminal human-readable
/// form: a plain text node reading `[refId]`. No citation attributes
/// survive past this point.
pub fn bracket_citations(document: &NodeRef) -> Result<()> {
    for sup in dom::select_all(document, "sup[data-type=\"citation\"]")? {
        let ref_id = {
            let attrs = sup.attributes.borrow();
            match attrs.get("data-ref-id") {
                Some(id) => id.to_string(),
                // A tagged marker without a ref id should not exist;
                // fall back to its displayed digits.
                None => sup.as_node().text_contents().trim().to_string(),
            }
        };
        dom::replace_with(sup.as_node(), NodeRef::new_text(format!("[{ref_id}]")));
    }
    Ok(())
}

/// Flatten table markup: each table-family element is replaced by its
/// children spliced into its former position, repeated until none
/// remains anywhere in the tree.
pub fn unwrap_tables(document: &NodeRef) -> Result<()> {
    loop {
        let matches = dom::select_all(document, TABLE_FAMILY_SELECTOR)?;
        if matches.is_empty() {
            return Ok(());
        }
        log::debug!("unwrapping {} table-family element(s)", matches.len());
        for element in matches {
            dom::unwrap_element(element.as_node());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(html: &str, f: impl Fn(&NodeRef) -> Result<()>) -> String {
        let doc = dom::parse_document(html);
        f(&doc).unwrap();
        dom::serialize_body(&doc).unwrap()
    }

    #[test]
    fn h1_demotes_to_h2_and_other_levels_stay() {
        let out = apply("<h1>Top</h1><h3>Deep</h3>", demote_headings);
        assert_eq!(out, "<h2>Top</h2><h3>Deep</h3>");
    }

    #[test]
    fn short_large_bold_run_becomes_heading() {
        let out = apply(
            "<b style=\"font-size: 14pt\">Introduction</b>",
            |doc| classify_bold_runs(doc, &PipelineConfig::default()),
        );
        assert_eq!(out, "<h2 style=\"font-size: 14pt\">Introduction</h2>");
    }

    #[test]
    fn long_bold_run_normalizes_to_strong_even_when_large() {
        let sixty = "x".repeat(60);
        let out = apply(
            &format!("<b style=\"font-size: 14pt\">{sixty}</b>"),
            |doc| classify_bold_runs(doc, &PipelineConfig::default()),
        );
        assert_eq!(
            out,
            format!("<strong style=\"font-size: 14pt\">{sixty}</strong>")
        );
    }

    #[test]
    fn small_bold_run_normalizes_to_strong() {
        let out = apply(
            "<b style=\"font-size: 10pt\">aside</b>",
            |doc| classify_bold_runs(doc, &PipelineConfig::default()),
        );
        assert_eq!(out, "<strong style=\"font-size: 10pt\">aside</strong>");
    }

    #[test]
    fn font_size_is_inherited_from_ancestors() {
        let out = apply(
            "<div style=\"font-size: 9pt\"><p><b>footnote text</b></p></div>",
            |doc| classify_bold_runs(doc, &PipelineConfig::default()),
        );
        assert_eq!(
            out,
            "<div style=\"font-size: 9pt\"><p><strong>footnote text</strong></p></div>"
        );
    }

    #[test]
    fn undeclared_font_size_uses_the_configured_default() {
        // Default of 12.0 exceeds the 11.0 threshold, so a short
        // undeclared bold run is a heading.
        let out = apply("<b>Summary</b>", |doc| {
            classify_bold_runs(doc, &PipelineConfig::default())
        });
        assert_eq!(out, "<h2>Summary</h2>");
    }

    #[test]
    fn strong_that_already_matches_is_left_alone() {
        let html = "<p><strong style=\"font-size: 10pt\">kept</strong></p>";
        let out = apply(html, |doc| {
            classify_bold_runs(doc, &PipelineConfig::default())
        });
        assert_eq!(out, html);
    }

    #[test]
    fn tagged_citations_become_bracketed_text() {
        let out = apply(
            "<p>claim<sup class=\"reference\" data-ref-id=\"20\" data-type=\"citation\">20</sup></p>",
            bracket_citations,
        );
        assert_eq!(out, "<p>claim[20]</p>");
    }

    #[test]
    fn untagged_superscripts_survive_bracketing() {
        let html = "<p>E=mc<sup>2</sup></p>";
        assert_eq!(apply(html, bracket_citations), html);
    }

    #[test]
    fn one_row_two_cell_table_unwraps_to_sibling_paragraphs() {
        let out = apply(
            "<table><tbody><tr><td><p>left</p></td><td><p>right</p></td></tr></tbody></table>",
            unwrap_tables,
        );
        assert_eq!(out, "<p>left</p><p>right</p>");
    }

    #[test]
    fn nested_tables_fully_unwrap() {
        let out = apply(
            "<table><tbody><tr><td><table><tbody><tr><td><p>inner</p></td></tr></tbody></table></td></tr></tbody></table>",
            unwrap_tables,
        );
        assert_eq!(out, "<p>inner</p>");
    }

    #[test]
    fn no_tables_is_a_no_op() {
        let html = "<p>plain</p>";
        assert_eq!(apply(html, unwrap_tables), html);
    }
}
