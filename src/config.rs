//! Configuration for the normalization pipeline.
//!
//! The heading heuristic thresholds are policy decisions rather than
//! structural requirements, so they are exposed here as recognized
//! options with named constants for the defaults.

use serde::{Deserialize, Serialize};

/// Resolved font size above which a short bold run is treated as a heading.
pub const HEADING_FONT_SIZE_THRESHOLD: f32 = 11.0;

/// Maximum trimmed text length (in characters) for a bold run to qualify
/// as a heading.
pub const HEADING_MAX_TEXT_LEN: usize = 40;

/// Font size assumed when neither the element nor any ancestor declares
/// one. Sits above [`HEADING_FONT_SIZE_THRESHOLD`] so undeclared short
/// bold runs classify as headings, matching the browser-default behavior
/// of the computed-style path this heuristic substitutes for.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Structural class carried by every synthesized figure block.
pub const FIGURE_CLASS: &str = "tableHolder";

/// Placeholder text of the source-attribution paragraph. A downstream
/// publishing step fills in the actual attribution.
pub const SOURCE_PLACEHOLDER: &str = "Source: ";

/// Label prefix for synthesized captions ("Figure 1", "Figure 2", ...).
pub const FIGURE_LABEL: &str = "Figure";

/// Configuration for one [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub(crate) heading_font_size_threshold: f32,
    pub(crate) heading_max_text_len: usize,
    pub(crate) default_font_size: f32,
    pub(crate) figure_class: String,
    pub(crate) source_placeholder: String,

    /// When no front-matter page-break marker is found, discard the whole
    /// body instead of leaving it untouched.
    ///
    /// Off by default: the untouched behavior is the defined contract,
    /// and discarding must be an explicit caller decision.
    pub(crate) discard_when_no_marker: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            heading_font_size_threshold: HEADING_FONT_SIZE_THRESHOLD,
            heading_max_text_len: HEADING_MAX_TEXT_LEN,
            default_font_size: DEFAULT_FONT_SIZE,
            figure_class: FIGURE_CLASS.to_string(),
            source_placeholder: SOURCE_PLACEHOLDER.to_string(),
            discard_when_no_marker: false,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    #[must_use]
    pub fn heading_font_size_threshold(&self) -> f32 {
        self.heading_font_size_threshold
    }

    #[must_use]
    pub fn heading_max_text_len(&self) -> usize {
        self.heading_max_text_len
    }

    #[must_use]
    pub fn default_font_size(&self) -> f32 {
        self.default_font_size
    }

    #[must_use]
    pub fn figure_class(&self) -> &str {
        &self.figure_class
    }

    #[must_use]
    pub fn source_placeholder(&self) -> &str {
        &self.source_placeholder
    }

    #[must_use]
    pub fn discard_when_no_marker(&self) -> bool {
        self.discard_when_no_marker
    }
}

/// Fluent builder for [`PipelineConfig`]. Every field has a default, so
/// `build` always succeeds.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn heading_font_size_threshold(mut self, threshold: f32) -> Self {
        self.config.heading_font_size_threshold = threshold;
        self
    }

    #[must_use]
    pub fn heading_max_text_len(mut self, len: usize) -> Self {
        self.config.heading_max_text_len = len;
        self
    }

    #[must_use]
    pub fn default_font_size(mut self, size: f32) -> Self {
        self.config.default_font_size = size;
        self
    }

    #[must_use]
    pub fn figure_class(mut self, class: impl Into<String>) -> Self {
        self.config.figure_class = class.into();
        self
    }

    #[must_use]
    pub fn source_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.config.source_placeholder = placeholder.into();
        self
    }

    #[must_use]
    pub fn discard_when_no_marker(mut self, discard: bool) -> Self {
        self.config.discard_when_no_marker = discard;
        self
    }

    #[must_use]
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
