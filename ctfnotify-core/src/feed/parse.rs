//! Feed parsing using roxmltree.

use std::collections::HashMap;

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{NotifyError, NotifyResult};
use crate::event::FeedEvent;

/// Parse an RSS 2.0 (or Atom) document into feed events.
///
/// Only a document that isn't well-formed XML is an error. Items with
/// missing or odd fields still come back as events; deciding what to do with
/// them is up to the caller.
pub fn parse_feed(xml: &str) -> NotifyResult<Vec<FeedEvent>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| NotifyError::FeedParse(e.to_string()))?;

    let root = doc.root_element();
    match root.tag_name().name() {
        "rss" | "RDF" | "feed" => {}
        other => {
            return Err(NotifyError::FeedParse(format!(
                "Unexpected root element <{other}>"
            )));
        }
    }

    let events = root
        .descendants()
        .filter(|n| n.is_element() && matches!(n.tag_name().name(), "item" | "entry"))
        .map(parse_item)
        .collect();

    Ok(events)
}

/// Convert one `<item>` / `<entry>` element into a `FeedEvent`.
fn parse_item(item: Node<'_, '_>) -> FeedEvent {
    let mut attributes: HashMap<String, String> = HashMap::new();
    let mut link = None;

    for child in item.children().filter(|n| n.is_element()) {
        let name = child.tag_name().name();

        if name == "link" {
            // RSS puts the URL in the text, Atom in the href attribute
            if link.is_none() {
                let text = element_text(child);
                link = if text.is_empty() {
                    child.attribute("href").map(str::to_string)
                } else {
                    Some(text)
                };
            }
            continue;
        }

        // First occurrence wins for repeated elements
        attributes
            .entry(name.to_string())
            .or_insert_with(|| element_text(child));
    }

    let guid = attributes
        .remove("guid")
        .or_else(|| attributes.remove("id"))
        .filter(|s| !s.is_empty());
    let title = attributes.remove("title").filter(|s| !s.is_empty());
    let link = link.filter(|s| !s.is_empty());
    let id = guid.or_else(|| link.clone());

    FeedEvent::from_attributes(id, title, link, attributes)
}

/// All text under an element, CDATA included, trimmed.
fn element_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}
