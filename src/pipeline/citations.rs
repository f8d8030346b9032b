//! Citation reference normalization.
//!
//! Converters encode footnote markers two ways: a real `<sup>` element
//! holding digits, or raw Unicode superscript-digit glyphs left in the
//! text. Both are unified into one tagged representation:
//!
//! ```html
//! <sup class="reference" data-ref-id="20" data-type="citation">20</sup>
//! ```
//!
//! The explicit-element path runs first so the glyph path never
//! re-processes markers that are already tagged.

use anyhow::Result;
use kuchiki::NodeRef;
use regex::Regex;
use std::sync::LazyLock;

use crate::dom;

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("BUG: hardcoded digits regex is valid"));

/// Maximal runs of the ten Unicode superscript digit glyphs. Runs never
/// overlap by construction (maximal munch over a fixed glyph set).
static SUPERSCRIPT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[¹²³⁴⁵⁶⁷⁸⁹⁰]+").expect("BUG: hardcoded superscript-glyph regex is valid")
});

/// Tag every citation marker in the tree. No matches is a no-op, not an
/// error.
pub fn normalize_citations(document: &NodeRef) -> Result<()> {
    tag_explicit_markers(document)?;
    convert_glyph_runs(document)?;
    Ok(())
}

/// Path 1: superscript elements whose trimmed text is purely decimal
/// digits. Non-numeric superscripts (chemical formulas, ordinals) are
/// left untouched.
fn tag_explicit_markers(document: &NodeRef) -> Result<()> {
    for sup in dom::select_all(document, "sup")? {
        let text = sup.as_node().text_contents();
        let text = text.trim();
        if !DIGITS_RE.is_match(text) {
            continue;
        }

        let mut attrs = sup.attributes.borrow_mut();
        let class = match attrs.get("class") {
            Some(existing) if existing.split_whitespace().any(|c| c == "reference") => {
                existing.to_string()
            }
            Some(existing) => format!("{existing} reference"),
            None => "reference".to_string(),
        };
        attrs.insert("class", class);
        attrs.insert("data-ref-id", text.to_string());
        attrs.insert("data-type", "citation".to_string());
    }
    Ok(())
}

/// Path 2: glyph runs inside text nodes. Each run becomes a synthesized
/// tagged `<sup>` spliced in at the run's exact position; surrounding
/// text is preserved byte-for-byte. All runs in one text node are
/// converted in a single left-to-right pass.
fn convert_glyph_runs(document: &NodeRef) -> Result<()> {
    // Snapshot before splicing: replacement detaches the visited node.
    for text_node in dom::text_nodes(document) {
        let text = match text_node.as_text() {
            Some(contents) => contents.borrow().clone(),
            None => continue,
        };
        if !SUPERSCRIPT_RUN_RE.is_match(&text) {
            continue;
        }
        if text_node.parent().is_none() {
            // An orphan text node has no position to splice into; skip.
            log::debug!("superscript glyphs in a detached text node; skipping");
            continue;
        }

        let mut last_end = 0;
        for run in SUPERSCRIPT_RUN_RE.find_iter(&text) {
            if run.start() > last_end {
                text_node.insert_before(NodeRef::new_text(&text[last_end..run.start()]));
            }
            let digits = ascii_digits(run.as_str());
            text_node.insert_before(citation_marker(&digits)?);
            last_end = run.end();
        }
        if last_end < text.len() {
            text_node.insert_before(NodeRef::new_text(&text[last_end..]));
        }
        text_node.detach();

        log::debug!("converted superscript glyph run(s) in a text node");
    }
    Ok(())
}

/// Map a glyph run digit-by-digit to its ASCII decimal form. Leading
/// zeros are preserved exactly as the source glyphs had them.
fn ascii_digits(run: &str) -> String {
    run.chars()
        .map(|glyph| match glyph {
            '¹' => '1',
            '²' => '2',
            '³' => '3',
            '⁴' => '4',
            '⁵' => '5',
            '⁶' => '6',
            '⁷' => '7',
            '⁸' => '8',
            '⁹' => '9',
            '⁰' => '0',
            other => other,
        })
        .collect()
}

fn citation_marker(digits: &str) -> Result<NodeRef> {
    dom::element_from_html(&format!(
        "<sup class=\"reference\" data-ref-id=\"{digits}\" data-type=\"citation\">{digits}</sup>"
    ))
}
