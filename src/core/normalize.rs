//! Normalization of persisted or imported JSON into a valid [`Document`]
//!
//! This is the trust boundary: anything read from disk or pasted by the user
//! passes through [`normalize`] before it can be installed. Missing fields are
//! defaulted, wrong types are coerced or dropped, the legacy single-page
//! `{ "blocks": [...] }` shape is wrapped into one page, and duplicate ids are
//! replaced so the id uniqueness invariant holds on the output.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::model::{
    generate_id, Block, Command, Document, Page, DEFAULT_PAGE_NAME, SCHEMA_VERSION,
};

/// Convert an arbitrary JSON value into a valid document
///
/// Returns `None` when no usable page survives sanitization; callers must
/// fall back to a default document or reject the import.
pub fn normalize(input: &Value) -> Option<Document> {
    let root = input.as_object()?;
    let mut ids = IdRegistry::default();

    let pages: Vec<Arc<Page>> = match (root.get("pages"), root.get("blocks")) {
        (Some(Value::Array(pages)), _) => pages
            .iter()
            .filter_map(|p| p.as_object())
            .map(|p| Arc::new(sanitize_page(p, &mut ids)))
            .collect(),
        (_, Some(Value::Array(blocks))) => {
            tracing::info!("Upgrading legacy single-page document");
            vec![Arc::new(Page {
                id: ids.fresh("page"),
                name: DEFAULT_PAGE_NAME.to_string(),
                blocks: sanitize_blocks(blocks, &mut ids),
            })]
        }
        _ => return None,
    };

    if pages.is_empty() {
        return None;
    }

    let active_page_id = root
        .get("activePageId")
        .and_then(Value::as_str)
        .filter(|id| pages.iter().any(|p| p.id == *id))
        .map(str::to_string)
        .unwrap_or_else(|| pages[0].id.clone());

    Some(Document {
        version: SCHEMA_VERSION,
        pages,
        active_page_id,
    })
}

/// Parse a serialized document and normalize it
pub fn normalize_str(input: &str) -> Option<Document> {
    let value: Value = serde_json::from_str(input).ok()?;
    normalize(&value)
}

/// Tracks ids already handed out within one normalization pass
#[derive(Default)]
struct IdRegistry {
    seen: HashSet<String>,
}

impl IdRegistry {
    /// Keep `raw` when it is a usable, unseen id; otherwise mint a new one
    fn claim(&mut self, raw: Option<&Value>, prefix: &str) -> String {
        if let Some(id) = raw.and_then(coerce_string) {
            let id = id.trim().to_string();
            if !id.is_empty() && self.seen.insert(id.clone()) {
                return id;
            }
        }
        self.fresh(prefix)
    }

    fn fresh(&mut self, prefix: &str) -> String {
        loop {
            let id = generate_id(prefix);
            if self.seen.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn sanitize_page(raw: &Map<String, Value>, ids: &mut IdRegistry) -> Page {
    let id = ids.claim(raw.get("id"), "page");
    let name = raw
        .get("name")
        .and_then(coerce_string)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PAGE_NAME.to_string());
    let blocks = match raw.get("blocks") {
        Some(Value::Array(blocks)) => sanitize_blocks(blocks, ids),
        _ => Vec::new(),
    };

    Page { id, name, blocks }
}

fn sanitize_blocks(raw: &[Value], ids: &mut IdRegistry) -> Vec<Arc<Block>> {
    raw.iter()
        .filter_map(|b| b.as_object())
        .map(|b| Arc::new(sanitize_block(b, ids)))
        .collect()
}

fn sanitize_block(raw: &Map<String, Value>, ids: &mut IdRegistry) -> Block {
    let id = ids.claim(raw.get("id"), "blk");
    let title = raw
        .get("title")
        .and_then(coerce_string)
        .unwrap_or_default();
    let cmds = match raw.get("cmds") {
        Some(Value::Array(cmds)) => cmds
            .iter()
            .filter_map(|c| sanitize_command(c, ids))
            .collect(),
        _ => Vec::new(),
    };

    Block {
        id,
        title,
        cmds,
        width: raw.get("width").and_then(finite_number),
        height: raw.get("height").and_then(finite_number),
        title_color: raw
            .get("titleColor")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn sanitize_command(raw: &Value, ids: &mut IdRegistry) -> Option<Command> {
    match raw {
        // Bare strings are accepted as command text
        Value::String(text) => Some(Command {
            id: ids.fresh("cmd"),
            text: text.clone(),
            note: None,
        }),
        Value::Object(obj) => Some(Command {
            id: ids.claim(obj.get("id"), "cmd"),
            text: obj.get("text").and_then(coerce_string).unwrap_or_default(),
            note: obj.get("note").and_then(Value::as_str).map(str::to_string),
        }),
        _ => None,
    }
}

/// Strings pass through, numbers and booleans are rendered; anything else is
/// not a usable scalar.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}
