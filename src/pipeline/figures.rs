//! Figure restructuring.
//!
//! Every image becomes a standardized three-part block: caption
//! paragraph, image paragraph, source-attribution placeholder. The two
//! pipeline occurrences of this rewrite differ only in how they treat
//! the image's attributes, so each is a policy over the shared pass:
//!
//! - [`PreviewFigurePolicy`] clones the original image verbatim, for
//!   the intermediate debug/preview tree;
//! - [`CanonicalFigurePolicy`] emits a fresh image keeping only the alt
//!   text and blanking `src` (a downstream publishing step fills it
//!   in), and wraps the block in an extra paragraph.

use anyhow::{Result, anyhow};
use kuchiki::NodeRef;

use crate::config::{FIGURE_LABEL, PipelineConfig};
use crate::dom;

/// One image-handling policy: which node a figure block replaces, and
/// how the block is built.
pub trait FigurePolicy {
    /// The logical unit the block replaces. `None` means this image has
    /// no replaceable position and the pass skips it.
    fn replacement_unit(&self, image: &NodeRef) -> Option<NodeRef>;

    /// Build the caption/image/source block for one image.
    fn build_block(&self, config: &PipelineConfig, image: &NodeRef, caption: &str)
    -> Result<NodeRef>;
}

/// Preview-stage policy: the unit is the enclosing `figure` if any,
/// otherwise the image's immediate parent (a body-level image has
/// neither and is skipped); the image is cloned with all
/// attributes intact so later mutations cannot reach the detached
/// original.
pub struct PreviewFigurePolicy;

impl FigurePolicy for PreviewFigurePolicy {
    fn replacement_unit(&self, image: &NodeRef) -> Option<NodeRef> {
        let unit = dom::closest_ancestor(image, "figure").or_else(|| image.parent())?;
        // A body-level image has no wrapping element to replace; the
        // body itself must never be detached.
        if dom::tag_name(&unit).as_deref() == Some("body") {
            return None;
        }
        Some(unit)
    }

    fn build_block(
        &self,
        config: &PipelineConfig,
        image: &NodeRef,
        caption: &str,
    ) -> Result<NodeRef> {
        let wrapper = block_container(config)?;
        wrapper.append(caption_paragraph(caption)?);

        let image_paragraph = dom::element_from_html("<p></p>")?;
        image_paragraph.append(clone_image(image)?);
        wrapper.append(image_paragraph);

        wrapper.append(source_paragraph(config)?);
        Ok(wrapper)
    }
}

/// Canonical-stage policy: the unit is the enclosing `figure` if any,
/// otherwise the image itself; the emitted image keeps only `alt` and
/// gets an empty `src`.
pub struct CanonicalFigurePolicy;

impl FigurePolicy for CanonicalFigurePolicy {
    fn replacement_unit(&self, image: &NodeRef) -> Option<NodeRef> {
        dom::closest_ancestor(image, "figure").or_else(|| Some(image.clone()))
    }

    fn build_block(
        &self,
        config: &PipelineConfig,
        image: &NodeRef,
        caption: &str,
    ) -> Result<NodeRef> {
        let holder = block_container(config)?;
        holder.append(caption_paragraph(caption)?);

        let fresh = dom::element_from_html("<img>")?;
        {
            let element = fresh
                .as_element()
                .ok_or_else(|| anyhow!("synthesized img fragment is not an element"))?;
            let mut attrs = element.attributes.borrow_mut();
            let alt = image
                .as_element()
                .and_then(|el| el.attributes.borrow().get("alt").map(str::to_string))
                .unwrap_or_default();
            attrs.insert("alt", alt);
            attrs.insert("src", String::new());
        }
        let image_paragraph = dom::element_from_html("<p></p>")?;
        image_paragraph.append(fresh);
        holder.append(image_paragraph);

        holder.append(source_paragraph(config)?);

        let outer = dom::element_from_html("<p></p>")?;
        outer.append(holder);
        Ok(outer)
    }
}

/// Rewrite every image in document order under `policy`. `counter` is
/// owned by the orchestrator and scoped to one pipeline invocation; it
/// advances per image visited so synthesized captions stay sequential
/// even when an image is skipped.
pub fn restructure_figures(
    document: &NodeRef,
    config: &PipelineConfig,
    policy: &dyn FigurePolicy,
    counter: &mut usize,
) -> Result<()> {
    // Snapshot: the replacements below detach nodes a live select
    // iteration would still visit.
    for image_ref in dom::select_all(document, "img")? {
        let image = image_ref.as_node();
        *counter += 1;

        let caption = explicit_caption(image)
            .unwrap_or_else(|| format!("{FIGURE_LABEL} {counter}", counter = *counter));

        let Some(unit) = policy.replacement_unit(image) else {
            log::debug!("image has no replaceable unit; skipping");
            continue;
        };
        if unit.parent().is_none() {
            // Happens when an earlier replacement already detached this
            // image's unit (two images sharing one parent).
            log::debug!("figure unit already detached; skipping image");
            continue;
        }

        let block = policy.build_block(config, image, &caption)?;
        unit.insert_before(block);
        unit.detach();
    }
    Ok(())
}

/// Caption text from a `figcaption` inside the image's enclosing
/// `figure`, if both exist. Trimmed; may legitimately be empty.
fn explicit_caption(image: &NodeRef) -> Option<String> {
    let figure = dom::closest_ancestor(image, "figure")?;
    let figcaption = figure.select_first("figcaption").ok()?;
    Some(figcaption.as_node().text_contents().trim().to_string())
}

fn block_container(config: &PipelineConfig) -> Result<NodeRef> {
    dom::element_from_html(&format!(
        "<div class=\"{}\" style=\"width: 50%\"></div>",
        config.figure_class()
    ))
}

fn caption_paragraph(caption: &str) -> Result<NodeRef> {
    let paragraph = dom::element_from_html("<p></p>")?;
    paragraph.append(NodeRef::new_text(caption));
    Ok(paragraph)
}

fn source_paragraph(config: &PipelineConfig) -> Result<NodeRef> {
    let paragraph = dom::element_from_html("<p></p>")?;
    paragraph.append(NodeRef::new_text(config.source_placeholder()));
    Ok(paragraph)
}

/// Clone an image element with its full attribute map. Images are void
/// elements, so there are no children to copy.
fn clone_image(image: &NodeRef) -> Result<NodeRef> {
    let copy = dom::element_from_html("<img>")?;
    let copy_element = copy
        .as_element()
        .ok_or_else(|| anyhow!("synthesized img fragment is not an element"))?;
    if let Some(source) = image.as_element() {
        let source_attrs = source.attributes.borrow();
        let mut copy_attrs = copy_element.attributes.borrow_mut();
        for (name, attr) in &source_attrs.map {
            copy_attrs.map.insert(name.clone(), attr.clone());
        }
    }
    Ok(copy)
}
