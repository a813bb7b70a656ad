//! History-backed document store
//!
//! The store owns the one live [`Document`]. Every change goes through it:
//! mutations are applied to a copy-on-write working copy, the previous state
//! is pushed onto the undo stack, invariants are re-checked, subscribers are
//! notified synchronously, and the serialized document is queued for the
//! background persister.

use serde_json::Value;

use super::events::{SubscriptionId, Subscribers};
use super::history::History;
use super::model::{Document, Page};
use super::normalize::{normalize, normalize_str};
use super::ops::{self, DropPosition, Outcome};
use crate::error::ImportError;
use crate::storage::{PersistenceGateway, Persister, RetryPolicy};

/// Marks a point in the edit history, see [`Store::undo_checkpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(u64);

/// Owner of the live document and its undo/redo history
///
/// Not reentrant: listeners only see `&Document` and cannot call back into
/// the store while a transition is running.
#[derive(Debug)]
pub struct Store {
    current: Document,
    history: History,
    subscribers: Subscribers,
    persister: Option<Persister>,
    /// Bumped by every transition that touches history
    edits: u64,
}

impl Store {
    /// Load the persisted notebook through `gateway` and start persisting
    ///
    /// Missing or unusable data installs the default notebook and saves it
    /// right away, so a first run always leaves durable state behind.
    pub fn open<G: PersistenceGateway>(mut gateway: G, policy: RetryPolicy) -> Self {
        let loaded = match gateway.load() {
            Ok(Some(raw)) => {
                let doc = normalize_str(&raw);
                if doc.is_none() {
                    tracing::warn!("Persisted notebook is unusable; starting from the default");
                }
                doc
            }
            Ok(None) => {
                tracing::info!("No persisted notebook; starting from the default");
                None
            }
            Err(e) => {
                tracing::warn!("Failed to load notebook: {}; starting from the default", e);
                None
            }
        };

        let fresh = loaded.is_none();
        let current = loaded.unwrap_or_default();
        tracing::info!(
            "Opened notebook with {} pages and {} commands",
            current.pages.len(),
            current.command_count()
        );

        let store = Self {
            current,
            history: History::default(),
            subscribers: Subscribers::default(),
            persister: Some(Persister::spawn(gateway, policy)),
            edits: 0,
        };
        if fresh {
            store.persist();
        }
        store
    }

    /// A store without persistence
    pub fn from_document(mut document: Document) -> Self {
        document.heal();
        Self {
            current: document,
            history: History::default(),
            subscribers: Subscribers::default(),
            persister: None,
            edits: 0,
        }
    }

    /// The live document; treat as read-only
    pub fn document(&self) -> &Document {
        &self.current
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.current.active_page()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Document) + Send + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Run `op` against a working copy and install the result if it changed
    ///
    /// Operations that report no change leave the document, the history and
    /// the subscribers untouched.
    pub fn apply<R, F>(&mut self, label: &str, op: F) -> R
    where
        R: Outcome,
        F: FnOnce(&mut Document) -> R,
    {
        let mut next = self.current.clone();
        let result = op(&mut next);
        if !result.changed() {
            tracing::debug!("{}: no change", label);
            return result;
        }

        let previous = std::mem::replace(&mut self.current, next);
        self.history.record(previous);
        self.edits += 1;
        tracing::debug!("{}: applied (undo depth {})", label, self.history.undo_depth());
        self.commit();
        result
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.current.clone()) {
            Some(previous) => {
                self.current = previous;
                self.edits += 1;
                tracing::debug!("Undo (undo depth {})", self.history.undo_depth());
                self.commit();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.current.clone()) {
            Some(next) => {
                self.current = next;
                self.edits += 1;
                tracing::debug!("Redo (redo depth {})", self.history.redo_depth());
                self.commit();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Remember the current point in history
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.edits)
    }

    /// Undo the edit made right before `checkpoint` was taken
    ///
    /// Refuses once anything else has changed the history since, so a late
    /// "undo delete" affordance cannot revert an unrelated edit.
    pub fn undo_checkpoint(&mut self, checkpoint: Checkpoint) -> bool {
        if checkpoint.0 != self.edits {
            tracing::debug!("Checkpoint is stale; ignoring undo");
            return false;
        }
        self.undo()
    }

    /// Install a document wholesale, discarding history
    pub fn replace(&mut self, document: Document) {
        self.current = document;
        self.history.clear();
        self.edits += 1;
        tracing::info!("Replaced notebook ({} pages)", self.current.pages.len());
        self.commit();
    }

    /// Import a JSON payload; on error nothing changes
    pub fn import_json(&mut self, raw: &str) -> Result<(), ImportError> {
        let value: Value = serde_json::from_str(raw)?;
        let document = normalize(&value).ok_or(ImportError::Structure)?;
        self.replace(document);
        Ok(())
    }

    /// The full document as pretty JSON
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.current)
    }

    /// Switch tabs; persisted and notified but not recorded in history
    pub fn set_active_page(&mut self, page_id: &str) -> bool {
        if !ops::set_active_page(&mut self.current, page_id) {
            return false;
        }
        self.commit();
        true
    }

    /// Wait for queued writes to reach the gateway
    pub fn flush(&self) {
        if let Some(persister) = &self.persister {
            persister.flush();
        }
    }

    fn commit(&mut self) {
        let repairs = self.current.heal();
        if repairs.any() {
            tracing::warn!("Repaired notebook invariants: {:?}", repairs);
        }
        self.subscribers.notify(&self.current);
        self.persist();
    }

    fn persist(&self) {
        let Some(persister) = &self.persister else {
            return;
        };
        match serde_json::to_string(&self.current) {
            Ok(data) => persister.save(data),
            Err(e) => tracing::error!("Failed to serialize notebook: {}", e),
        }
    }

    pub fn add_page(&mut self, name: Option<&str>) -> String {
        let mut id = String::new();
        self.apply("add_page", |doc| {
            id = ops::add_page(doc, name);
            true
        });
        id
    }

    pub fn rename_page(&mut self, page_id: &str, name: &str) -> bool {
        self.apply("rename_page", |doc| ops::rename_page(doc, page_id, name))
    }

    pub fn delete_page(&mut self, page_id: &str) -> bool {
        self.apply("delete_page", |doc| ops::delete_page(doc, page_id))
    }

    pub fn reorder_pages(&mut self, source_id: &str, target_id: &str, position: DropPosition) -> bool {
        self.apply("reorder_pages", |doc| {
            ops::reorder_pages(doc, source_id, target_id, position)
        })
    }

    pub fn add_block(&mut self, page_id: &str, title: Option<&str>) -> Option<String> {
        self.apply("add_block", |doc| ops::add_block(doc, page_id, title))
    }

    pub fn rename_block(&mut self, block_id: &str, title: &str) -> bool {
        self.apply("rename_block", |doc| ops::rename_block(doc, block_id, title))
    }

    pub fn delete_block(&mut self, block_id: &str) -> bool {
        self.apply("delete_block", |doc| ops::delete_block(doc, block_id))
    }

    pub fn move_block_to_end(&mut self, block_id: &str) -> bool {
        self.apply("move_block_to_end", |doc| ops::move_block_to_end(doc, block_id))
    }

    pub fn move_block_to_page(&mut self, block_id: &str, page_id: &str) -> bool {
        self.apply("move_block_to_page", |doc| {
            ops::move_block_to_page(doc, block_id, page_id)
        })
    }

    pub fn reorder_blocks(&mut self, source_id: &str, target_id: &str, position: DropPosition) -> bool {
        self.apply("reorder_blocks", |doc| {
            ops::reorder_blocks(doc, source_id, target_id, position)
        })
    }

    pub fn set_block_size(&mut self, block_id: &str, width: Option<f64>, height: Option<f64>) -> bool {
        self.apply("set_block_size", |doc| {
            ops::set_block_size(doc, block_id, width, height)
        })
    }

    pub fn set_block_title_color(&mut self, block_id: &str, color: Option<&str>) -> bool {
        self.apply("set_block_title_color", |doc| {
            ops::set_block_title_color(doc, block_id, color)
        })
    }

    pub fn add_command(&mut self, block_id: &str, text: &str, note: Option<&str>) -> Option<String> {
        self.apply("add_command", |doc| ops::add_command(doc, block_id, text, note))
    }

    pub fn update_command_text(&mut self, block_id: &str, cmd_id: &str, text: &str) -> bool {
        self.apply("update_command_text", |doc| {
            ops::update_command_text(doc, block_id, cmd_id, text)
        })
    }

    pub fn update_command_note(&mut self, block_id: &str, cmd_id: &str, note: Option<&str>) -> bool {
        self.apply("update_command_note", |doc| {
            ops::update_command_note(doc, block_id, cmd_id, note)
        })
    }

    pub fn delete_command(&mut self, block_id: &str, cmd_id: &str) -> bool {
        self.apply("delete_command", |doc| ops::delete_command(doc, block_id, cmd_id))
    }

    pub fn reorder_commands(&mut self, source_id: &str, target_id: &str, position: DropPosition) -> bool {
        self.apply("reorder_commands", |doc| {
            ops::reorder_commands(doc, source_id, target_id, position)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::HISTORY_LIMIT;
    use crate::storage::MemoryGateway;
    use std::sync::{Arc, Mutex};

    fn store() -> Store {
        Store::from_document(Document::default())
    }

    fn first_block_and_cmd(store: &Store) -> (String, String) {
        let block = &store.document().pages[0].blocks[0];
        (block.id.clone(), block.cmds[0].id.clone())
    }

    #[test]
    fn test_add_block_delete_page_undo_scenario() {
        let mut store = store();
        let home = store.document().pages[0].id.clone();

        let test = store.add_page(Some("Test"));
        assert_eq!(store.document().active_page_id, test);
        assert!(store.active_page().unwrap().blocks.is_empty());

        store.add_block(&test, Some("B1")).unwrap();
        assert_eq!(store.active_page().unwrap().blocks[0].title, "B1");

        assert!(store.delete_page(&test));
        assert_eq!(store.document().active_page_id, home);

        assert!(store.undo());
        let page = store.active_page().unwrap();
        assert_eq!(page.id, test);
        assert_eq!(page.blocks[0].title, "B1");
    }

    #[test]
    fn test_undo_all_then_redo_all() {
        let mut store = store();
        let original = store.document().clone();
        let mut states = Vec::new();

        for i in 0..5 {
            store.add_page(Some(format!("P{}", i).as_str()));
            states.push(store.document().clone());
        }

        for _ in 0..5 {
            assert!(store.undo());
        }
        assert_eq!(*store.document(), original);
        assert!(!store.undo());

        for state in &states {
            assert!(store.redo());
            assert_eq!(store.document(), state);
        }
        assert!(!store.redo());
    }

    #[test]
    fn test_apply_clears_redo() {
        let mut store = store();
        store.add_page(Some("A"));
        assert!(store.undo());
        assert!(store.can_redo());

        store.add_page(Some("B"));
        assert!(!store.redo());
    }

    #[test]
    fn test_history_is_capped() {
        let mut store = store();
        let (block, cmd) = first_block_and_cmd(&store);
        for i in 0..250 {
            assert!(store.update_command_text(&block, &cmd, &format!("echo {}", i)));
        }
        assert_eq!(store.undo_depth(), HISTORY_LIMIT);

        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, HISTORY_LIMIT);
        assert_eq!(store.document().find_command(&cmd).unwrap().1.text, "echo 49");
    }

    #[test]
    fn test_noop_operations_skip_history_and_notify() {
        let mut store = store();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        store.subscribe(move |_| *counter.lock().unwrap() += 1);

        let page = store.document().pages[0].id.clone();
        let name = store.document().pages[0].name.clone();
        assert!(!store.rename_page(&page, &name));
        assert!(!store.delete_page(&page));
        assert!(!store.reorder_pages(&page, &page, DropPosition::After));
        assert!(store.add_block("missing", None).is_none());

        assert_eq!(store.undo_depth(), 0);
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_text_update_always_records() {
        let mut store = store();
        let (block, cmd) = first_block_and_cmd(&store);
        let text = store.document().find_command(&cmd).unwrap().1.text.clone();
        assert!(store.update_command_text(&block, &cmd, &text));
        assert_eq!(store.undo_depth(), 1);
    }

    #[test]
    fn test_subscribers_see_valid_documents() {
        let mut store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |doc: &Document| {
            let active_ok = doc.page(&doc.active_page_id).is_some();
            sink.lock().unwrap().push((doc.pages.len(), active_ok));
        });

        let extra = store.add_page(None);
        store.delete_page(&extra);
        store.undo();
        store.redo();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|(pages, ok)| *pages >= 1 && *ok));
        assert_eq!(seen.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec![2, 1, 2, 1]);
    }

    #[test]
    fn test_import_rejects_without_change() {
        let mut store = store();
        store.add_page(Some("Keep"));
        let before = store.document().clone();

        assert!(matches!(store.import_json("{ broken"), Err(ImportError::Parse(_))));
        assert!(matches!(store.import_json("{}"), Err(ImportError::Structure)));
        assert!(matches!(store.import_json(r#"{"pages": []}"#), Err(ImportError::Structure)));

        assert_eq!(*store.document(), before);
        assert_eq!(store.undo_depth(), 1);
    }

    #[test]
    fn test_import_replaces_and_clears_history() {
        let mut store = store();
        store.add_page(Some("Old"));
        store
            .import_json(r#"{"blocks": [{"id": "x", "title": "T", "cmds": [{"id": "c1", "text": "ls"}]}]}"#)
            .unwrap();

        assert_eq!(store.document().pages.len(), 1);
        assert!(store.document().find_command("c1").is_some());
        assert!(!store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_export_is_normalizable() {
        let store = store();
        let exported = store.export_json().unwrap();
        assert!(exported.contains('\n'));
        assert_eq!(normalize_str(&exported).unwrap(), *store.document());
    }

    #[test]
    fn test_checkpoint_undo_only_when_latest() {
        let mut store = store();
        let page = store.add_page(Some("Doomed"));

        assert!(store.delete_page(&page));
        let checkpoint = store.checkpoint();
        assert!(store.undo_checkpoint(checkpoint));
        assert!(store.document().page(&page).is_some());

        assert!(store.delete_page(&page));
        let checkpoint = store.checkpoint();
        store.add_page(Some("Later"));
        assert!(!store.undo_checkpoint(checkpoint));
        assert!(store.document().page(&page).is_none());
    }

    #[test]
    fn test_set_active_page_is_not_undoable() {
        let mut store = store();
        let first = store.document().pages[0].id.clone();
        store.add_page(Some("Second"));
        let depth = store.undo_depth();

        assert!(store.set_active_page(&first));
        assert!(!store.set_active_page("missing"));
        assert_eq!(store.undo_depth(), depth);
        assert_eq!(store.document().active_page_id, first);
    }

    #[test]
    fn test_snapshots_share_untouched_pages() {
        let mut store = store();
        let before = store.document().clone();
        store.add_page(Some("New"));
        assert!(Arc::ptr_eq(&before.pages[0], &store.document().pages[0]));
    }

    #[test]
    fn test_open_without_data_persists_default() {
        let gateway = MemoryGateway::new();
        let store = Store::open(gateway.clone(), RetryPolicy::no_retry());
        store.flush();

        let saved = gateway.contents().unwrap();
        assert_eq!(normalize_str(&saved).unwrap(), *store.document());
        assert_eq!(store.document().pages[0].blocks.len(), 2);
    }

    #[test]
    fn test_open_with_unusable_data_falls_back() {
        let gateway = MemoryGateway::with_data("{}");
        let store = Store::open(gateway.clone(), RetryPolicy::no_retry());
        store.flush();
        assert_ne!(gateway.contents().as_deref(), Some("{}"));
        assert_eq!(store.document().pages.len(), 1);
    }

    #[test]
    fn test_open_loads_and_persists_edits() {
        let mut doc = Document::default();
        ops::add_page(&mut doc, Some("Saved"));
        let gateway = MemoryGateway::with_data(serde_json::to_string(&doc).unwrap());

        let mut store = Store::open(gateway.clone(), RetryPolicy::no_retry());
        assert_eq!(*store.document(), doc);
        assert!(!store.can_undo());
        store.flush();
        assert_eq!(gateway.save_count(), 0);

        store.add_page(Some("Another"));
        store.flush();
        let saved = normalize_str(&gateway.contents().unwrap()).unwrap();
        assert_eq!(saved, *store.document());
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let gateway = MemoryGateway::with_data(serde_json::to_string(&Document::default()).unwrap());
        let mut store = Store::open(gateway.clone(), RetryPolicy::no_retry());
        gateway.fail_next_saves(1);

        let id = store.add_page(Some("Unsaved"));
        store.flush();
        assert!(store.document().page(&id).is_some());
        assert!(!gateway.contents().unwrap().contains("Unsaved"));

        store.add_page(Some("Healed"));
        store.flush();
        assert!(gateway.contents().unwrap().contains("Unsaved"));
    }

    #[test]
    fn test_replaced_document_survives_reload() {
        let mut doc = Document::default();
        let block_id = doc.pages[0].blocks[0].id.clone();
        Arc::make_mut(&mut Arc::make_mut(&mut doc.pages[0]).blocks[0]).title = " spaced ".to_string();
        ops::set_block_size(&mut doc, &block_id, Some(924.3639072731971), Some(185.26267320089337));

        let gateway = MemoryGateway::new();
        let mut store = Store::open(gateway.clone(), RetryPolicy::no_retry());
        store.replace(doc.clone());
        store.flush();
        drop(store);

        let reloaded = Store::open(gateway, RetryPolicy::no_retry());
        assert_eq!(*reloaded.document(), doc);
        assert_eq!(reloaded.document().pages[0].blocks[0].title, " spaced ");
    }
}
