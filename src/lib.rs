//! docpress: publication-ready normalization for word-processor HTML
//! exports.
//!
//! An external converter turns a word-processor document into HTML;
//! this crate rewrites that HTML into a canonical publication form:
//! front matter trimmed, citation markers unified and bracketed,
//! figures restructured into caption/image/source blocks, headings
//! collapsed to a two-level taxonomy, and table markup flattened to
//! flow content.
//!
//! ```
//! use docpress::Pipeline;
//!
//! let pipeline = Pipeline::default();
//! let html = pipeline.run("<h1>Title</h1><p>as shown²</p>").unwrap();
//! assert_eq!(html, "<h2>Title</h2><p>as shown[2]</p>");
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod inspect;
pub mod pipeline;
pub mod server;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{InspectError, InspectResult};
pub use inspect::{InspectClient, InspectConfig};
pub use pipeline::Pipeline;
pub use pipeline::figures::{CanonicalFigurePolicy, FigurePolicy, PreviewFigurePolicy};
