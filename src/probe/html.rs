use std::collections::HashSet;

use scraper::{Html, Selector};

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// All text a browser would render, one space between text nodes.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    for node in document.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.iter().any(|h| *h == e.name()))
        });
        let text = text.trim();
        if hidden || text.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    }
    out
}

/// Concatenated contents of every `<script>` element, where pages embed
/// their initial data.
pub fn script_text(html: &str) -> String {
    let Ok(selector) = Selector::parse("script") else {
        return String::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .flat_map(|e| e.text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lowercased text of every element matched by `selector` whose stripped,
/// space-joined text is at most `max_chars` long, deduplicated in document
/// order.
pub fn short_fragments(html: &str, selector: &str, max_chars: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        log::warn!("[html] invalid selector {selector}");
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut fragments = Vec::new();

    for element in document.select(&selector) {
        let text = element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() || text.chars().count() > max_chars {
            continue;
        }
        let text = text.to_lowercase();
        if seen.insert(text.clone()) {
            fragments.push(text);
        }
    }
    fragments
}
