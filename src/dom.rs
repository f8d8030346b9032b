//! Tree model adapter over the mutable kuchiki DOM.
//!
//! The rewrite stages only touch the tree through the primitives here
//! (plus kuchiki's own `insert_before`/`detach`/`append`), which keeps
//! the pipeline isolated from the concrete tree implementation.
//!
//! Query results are always collected into a `Vec` before any mutation:
//! detaching or replacing nodes during a live `select` iteration
//! invalidates the iterator.

use anyhow::{Context, Result, anyhow};
use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};

/// Parse an HTML document (or fragment). kuchiki wraps fragments in the
/// implied `html`/`head`/`body` structure, so [`document_body`] always
/// finds a body element afterwards.
#[must_use]
pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

/// The `<body>` element of a parsed document. The selector is static
/// and valid, so a miss can only mean the tree genuinely lacks a body
/// (for example a detached subtree).
pub fn document_body(document: &NodeRef) -> Result<NodeRef> {
    let body = document
        .select_first("body")
        .map_err(|()| anyhow!("document has no body element"))?;
    Ok(body.as_node().clone())
}

/// Serialize the inner HTML of `<body>`. This is the pipeline's output
/// contract: the converter input is a fragment, and the surrounding
/// `html`/`head`/`body` scaffolding the parser adds is not part of it.
pub fn serialize_body(document: &NodeRef) -> Result<String> {
    let body = document_body(document)?;
    let mut output = Vec::new();
    for child in body.children() {
        child
            .serialize(&mut output)
            .context("failed to serialize body content")?;
    }
    String::from_utf8(output).context("serialized HTML is not valid UTF-8")
}

/// Snapshot query: all elements under `root` matching `selector`, in
/// document order, collected before the caller starts mutating.
pub fn select_all(root: &NodeRef, selector: &str) -> Result<Vec<NodeDataRef<ElementData>>> {
    Ok(root
        .select(selector)
        .map_err(|()| anyhow!("invalid selector: {selector}"))?
        .collect())
}

/// Synthesize a single element by parsing an HTML fragment and taking
/// the first node the parser put in `<body>`.
pub fn element_from_html(html: &str) -> Result<NodeRef> {
    let fragment = parse_document(html);
    let body = document_body(&fragment)?;
    body.first_child()
        .ok_or_else(|| anyhow!("fragment produced no node: {html}"))
}

/// Local tag name of an element node, lowercase per the HTML parser.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element().map(|el| el.name.local.to_string())
}

/// Nearest self-or-ancestor element with the given tag name, like the
/// DOM `closest()` restricted to a type selector.
#[must_use]
pub fn closest_ancestor(node: &NodeRef, tag: &str) -> Option<NodeRef> {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if tag_name(&candidate).as_deref() == Some(tag) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// Snapshot of every text node under `root`, in document order.
#[must_use]
pub fn text_nodes(root: &NodeRef) -> Vec<NodeRef> {
    root.descendants()
        .filter(|node| node.as_text().is_some())
        .collect()
}

/// Replace `old` with `new` at the same tree position. No-op when `old`
/// is detached: a node without a parent has no position to take over.
pub fn replace_with(old: &NodeRef, new: NodeRef) {
    if old.parent().is_none() {
        log::debug!("replace_with on a detached node is a no-op");
        return;
    }
    old.insert_before(new);
    old.detach();
}

/// Splice an element's children into its former position, preserving
/// their order, and remove the element. No-op on detached nodes.
pub fn unwrap_element(node: &NodeRef) {
    if node.parent().is_none() {
        log::debug!("unwrap_element on a detached node is a no-op");
        return;
    }
    while let Some(child) = node.first_child() {
        node.insert_before(child);
    }
    node.detach();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_body_returns_inner_html() {
        let doc = parse_document("<p>one</p><p>two</p>");
        assert_eq!(serialize_body(&doc).unwrap(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn document_body_on_a_detached_subtree_says_what_is_missing() {
        let orphan = element_from_html("<p>x</p>").unwrap();
        let err = document_body(&orphan).unwrap_err();
        assert_eq!(err.to_string(), "document has no body element");
    }

    #[test]
    fn select_all_is_in_document_order() {
        let doc = parse_document("<div><p id=\"a\">x</p></div><p id=\"b\">y</p>");
        let ids: Vec<_> = select_all(&doc, "p")
            .unwrap()
            .iter()
            .map(|p| p.attributes.borrow().get("id").unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn element_from_html_builds_a_detachable_element() {
        let doc = parse_document("<p id=\"target\">x</p>");
        let target = select_all(&doc, "#target").unwrap();
        let replacement = element_from_html("<h2>heading</h2>").unwrap();
        replace_with(target[0].as_node(), replacement);
        assert_eq!(serialize_body(&doc).unwrap(), "<h2>heading</h2>");
    }

    #[test]
    fn closest_ancestor_includes_self() {
        let doc = parse_document("<figure><p><img src=\"x\"></p></figure>");
        let img = select_all(&doc, "img").unwrap();
        let figure = closest_ancestor(img[0].as_node(), "figure").unwrap();
        assert_eq!(tag_name(&figure).as_deref(), Some("figure"));

        let self_match = closest_ancestor(&figure, "figure").unwrap();
        assert_eq!(tag_name(&self_match).as_deref(), Some("figure"));
    }

    #[test]
    fn unwrap_element_promotes_children_in_order() {
        let doc = parse_document("<div id=\"w\"><p>1</p><p>2</p></div>");
        let wrapper = select_all(&doc, "#w").unwrap();
        unwrap_element(wrapper[0].as_node());
        assert_eq!(serialize_body(&doc).unwrap(), "<p>1</p><p>2</p>");
    }

    #[test]
    fn unwrap_element_on_detached_node_is_a_no_op() {
        let orphan = element_from_html("<div><p>x</p></div>").unwrap();
        orphan.detach();
        unwrap_element(&orphan);
        assert!(orphan.first_child().is_some());
    }
}
