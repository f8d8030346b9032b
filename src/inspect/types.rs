//! Wire types for the remote document inspection service.
//!
//! The service speaks a words-processing REST dialect: a document is a
//! list of paragraphs, each paragraph a list of runs, and every run
//! carries font attributes including a superscript flag.

use serde::{Deserialize, Serialize};

/// Response body of `GET /words/{name}/paragraphs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParagraphsResponse {
    #[serde(default)]
    pub paragraphs: Option<ParagraphLinkCollection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParagraphLinkCollection {
    #[serde(rename = "paragraphLinkList", default)]
    pub paragraph_link_list: Vec<ParagraphLink>,
}

/// A paragraph entry; only its position in the list matters for run
/// retrieval, but the preview text helps debugging.
#[derive(Debug, Clone, Deserialize)]
pub struct ParagraphLink {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "nodeId", default)]
    pub node_id: Option<String>,
}

/// Response body of `GET /words/{name}/paragraphs/{index}/runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunsResponse {
    #[serde(default)]
    pub runs: Option<RunCollection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunCollection {
    #[serde(rename = "runList", default)]
    pub run_list: Vec<Run>,
}

/// One formatted text run inside a paragraph.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub font: Option<Font>,
}

impl Run {
    /// Whether this run is rendered superscript.
    #[must_use]
    pub fn is_superscript(&self) -> bool {
        self.font
            .as_ref()
            .and_then(|font| font.superscript)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Font {
    #[serde(default)]
    pub superscript: Option<bool>,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub bold: Option<bool>,
}

/// Flattened superscript extraction result, as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperscriptReport {
    pub superscripts: Vec<String>,
}

impl SuperscriptReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.superscripts.is_empty()
    }
}
