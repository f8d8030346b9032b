//! The document normalization pipeline.
//!
//! A fixed, ordered list of tree-rewrite stages over one parsed HTML
//! tree:
//!
//! 1. front-matter trim
//! 2. citation reference normalization
//! 3. figure restructuring (preview policy)
//! 4. style canonicalization (headings, bold heuristic, bracketed
//!    citations, canonical figure pass, table flattening)
//!
//! Stages 1–3 form the preview group, producing the intermediate tree
//! used for debug display; stage 4 produces the publication-ready tree.
//! Every stage is total: absence of its target pattern is a no-op, and
//! odd-but-well-formed shapes (orphan images, detached superscripts)
//! are skipped, never faulted on.

pub mod citations;
pub mod figures;
pub mod front_matter;
pub mod styles;

use anyhow::{Context, Result};
use kuchiki::NodeRef;

use crate::config::PipelineConfig;
use crate::dom;
use figures::{CanonicalFigurePolicy, PreviewFigurePolicy};

/// One configured pipeline. Cheap to construct; holds no per-document
/// state, so a single value can serve any number of documents. Figure
/// counters live on the stack of each call, keeping concurrent
/// documents fully isolated.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Preview stages only: trim, citation normalization,
    /// attribute-preserving figure blocks. Output feeds debug display
    /// or [`canonicalize`](Self::canonicalize).
    pub fn preview(&self, html: &str) -> Result<String> {
        let document = dom::parse_document(html);
        self.apply_preview(&document)?;
        dom::serialize_body(&document)
    }

    /// Style canonicalization over an already-restructured tree.
    pub fn canonicalize(&self, html: &str) -> Result<String> {
        let document = dom::parse_document(html);
        self.apply_canonical(&document)?;
        dom::serialize_body(&document)
    }

    /// The full pipeline over a single tree: preview stages followed by
    /// canonicalization, serialized once at the end.
    pub fn run(&self, html: &str) -> Result<String> {
        let document = dom::parse_document(html);
        self.apply_preview(&document)?;
        self.apply_canonical(&document)?;
        dom::serialize_body(&document)
    }

    fn apply_preview(&self, document: &NodeRef) -> Result<()> {
        front_matter::trim_front_matter(document, &self.config)
            .context("front-matter trim failed")?;
        citations::normalize_citations(document).context("citation normalization failed")?;

        let mut figure_counter = 0;
        figures::restructure_figures(
            document,
            &self.config,
            &PreviewFigurePolicy,
            &mut figure_counter,
        )
        .context("figure restructuring failed")?;
        log::debug!("preview stages complete; {figure_counter} image(s) seen");
        Ok(())
    }

    fn apply_canonical(&self, document: &NodeRef) -> Result<()> {
        // Headings before bold reclassification; tables strictly last
        // (the figure pass may read captions out of table cells).
        styles::demote_headings(document).context("heading demotion failed")?;
        styles::classify_bold_runs(document, &self.config)
            .context("bold classification failed")?;
        styles::bracket_citations(document).context("citation bracketing failed")?;

        let mut figure_counter = 0;
        figures::restructure_figures(
            document,
            &self.config,
            &CanonicalFigurePolicy,
            &mut figure_counter,
        )
        .context("canonical figure pass failed")?;

        styles::unwrap_tables(document).context("table unwrapping failed")?;
        log::debug!("canonical stage complete; {figure_counter} image(s) seen");
        Ok(())
    }
}
