//! Structural mutation operations over a [`Document`]
//!
//! Every operation is total: a stale or unknown id makes it a no-op that
//! reports failure through its return value (`false` / `None`) instead of
//! panicking. Operations are normally dispatched by the store, which runs
//! them against a working copy and only records history when they report a
//! change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::model::{Block, Command, Document, Page, NEW_BLOCK_PREFIX, NEW_PAGE_PREFIX};

/// Where a dragged item lands relative to its drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}

/// Whether an operation's return value means the document changed
pub trait Outcome {
    fn changed(&self) -> bool;
}

impl Outcome for bool {
    fn changed(&self) -> bool {
        *self
    }
}

impl<T> Outcome for Option<T> {
    fn changed(&self) -> bool {
        self.is_some()
    }
}

fn page_mut<'a>(doc: &'a mut Document, page_id: &str) -> Option<&'a mut Page> {
    doc.pages
        .iter_mut()
        .find(|p| p.id == page_id)
        .map(Arc::make_mut)
}

/// (page index, block index)
fn locate_block(doc: &Document, block_id: &str) -> Option<(usize, usize)> {
    doc.pages
        .iter()
        .enumerate()
        .find_map(|(pi, p)| p.block_index(block_id).map(|bi| (pi, bi)))
}

/// (page index, block index, command index)
fn locate_command(doc: &Document, cmd_id: &str) -> Option<(usize, usize, usize)> {
    doc.pages.iter().enumerate().find_map(|(pi, p)| {
        p.blocks.iter().enumerate().find_map(|(bi, b)| {
            b.cmds
                .iter()
                .position(|c| c.id == cmd_id)
                .map(|ci| (pi, bi, ci))
        })
    })
}

fn block_mut<'a>(doc: &'a mut Document, block_id: &str) -> Option<&'a mut Block> {
    let (pi, bi) = locate_block(doc, block_id)?;
    let page = Arc::make_mut(&mut doc.pages[pi]);
    Some(Arc::make_mut(&mut page.blocks[bi]))
}

fn command_mut<'a>(
    doc: &'a mut Document,
    block_id: &str,
    cmd_id: &str,
) -> Option<&'a mut Command> {
    block_mut(doc, block_id)?
        .cmds
        .iter_mut()
        .find(|c| c.id == cmd_id)
}

fn insertion_index(target: usize, position: DropPosition) -> usize {
    match position {
        DropPosition::Before => target,
        DropPosition::After => target + 1,
    }
}

fn trimmed_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Append a new empty page and make it active; returns its id
///
/// A blank name becomes `"新建页 {n}"` with n = page count + 1.
pub fn add_page(doc: &mut Document, name: Option<&str>) -> String {
    let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => format!("{} {}", NEW_PAGE_PREFIX, doc.pages.len() + 1),
    };
    let page = Page::new(name);
    let id = page.id.clone();
    doc.pages.push(Arc::new(page));
    doc.active_page_id = id.clone();
    id
}

/// Rename a page; a blank or unchanged name is refused
pub fn rename_page(doc: &mut Document, page_id: &str, name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }
    match doc.page(page_id) {
        Some(page) if page.name != name => {}
        _ => return false,
    }
    match page_mut(doc, page_id) {
        Some(page) => {
            page.name = name.to_string();
            true
        }
        None => false,
    }
}

/// Delete a page with all its blocks and commands
///
/// The last remaining page cannot be deleted. When the active page goes
/// away, the page now at the same index (or the one before it) becomes
/// active.
pub fn delete_page(doc: &mut Document, page_id: &str) -> bool {
    if doc.pages.len() <= 1 {
        return false;
    }
    let Some(index) = doc.page_index(page_id) else {
        return false;
    };

    doc.pages.remove(index);
    if doc.active_page_id == page_id {
        let next = index.min(doc.pages.len() - 1);
        doc.active_page_id = doc.pages[next].id.clone();
    }
    true
}

/// Point the active page at `page_id`
pub fn set_active_page(doc: &mut Document, page_id: &str) -> bool {
    if doc.active_page_id == page_id || doc.page_index(page_id).is_none() {
        return false;
    }
    doc.active_page_id = page_id.to_string();
    true
}

/// Move a page next to another page
///
/// The source is removed first and the target is located afterwards, so the
/// insertion index reflects the shifted list. A reorder that leaves the
/// order as it was reports `false`.
pub fn reorder_pages(
    doc: &mut Document,
    source_id: &str,
    target_id: &str,
    position: DropPosition,
) -> bool {
    if source_id == target_id || doc.page_index(target_id).is_none() {
        return false;
    }
    let Some(source) = doc.page_index(source_id) else {
        return false;
    };

    let page = doc.pages.remove(source);
    match doc.page_index(target_id) {
        Some(target) => {
            let at = insertion_index(target, position);
            doc.pages.insert(at, page);
            at != source
        }
        None => {
            doc.pages.insert(source, page);
            false
        }
    }
}

/// Append a new block to a page; returns its id, or `None` for a stale page
///
/// A blank title becomes `"新建块 {n}"` with n = block count + 1.
pub fn add_block(doc: &mut Document, page_id: &str, title: Option<&str>) -> Option<String> {
    let page = page_mut(doc, page_id)?;
    let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => title.to_string(),
        None => format!("{} {}", NEW_BLOCK_PREFIX, page.blocks.len() + 1),
    };
    let block = Block::new(title);
    let id = block.id.clone();
    page.blocks.push(Arc::new(block));
    Some(id)
}

/// Rename a block; a blank or unchanged title is refused
pub fn rename_block(doc: &mut Document, block_id: &str, title: &str) -> bool {
    let title = title.trim();
    if title.is_empty() {
        return false;
    }
    match doc.find_block(block_id) {
        Some((_, block)) if block.title != title => {}
        _ => return false,
    }
    match block_mut(doc, block_id) {
        Some(block) => {
            block.title = title.to_string();
            true
        }
        None => false,
    }
}

/// Delete a block and its commands
pub fn delete_block(doc: &mut Document, block_id: &str) -> bool {
    let Some((pi, bi)) = locate_block(doc, block_id) else {
        return false;
    };
    Arc::make_mut(&mut doc.pages[pi]).blocks.remove(bi);
    true
}

/// Move a block to the end of its own page
pub fn move_block_to_end(doc: &mut Document, block_id: &str) -> bool {
    let Some((pi, bi)) = locate_block(doc, block_id) else {
        return false;
    };
    let page = Arc::make_mut(&mut doc.pages[pi]);
    let block = page.blocks.remove(bi);
    page.blocks.push(block);
    true
}

/// Move a block to the end of another page
pub fn move_block_to_page(doc: &mut Document, block_id: &str, page_id: &str) -> bool {
    let Some(dest) = doc.page_index(page_id) else {
        return false;
    };
    let Some((pi, bi)) = locate_block(doc, block_id) else {
        return false;
    };
    if pi == dest {
        return false;
    }
    let block = Arc::make_mut(&mut doc.pages[pi]).blocks.remove(bi);
    Arc::make_mut(&mut doc.pages[dest]).blocks.push(block);
    true
}

/// Move a block next to another block, possibly on a different page
pub fn reorder_blocks(
    doc: &mut Document,
    source_id: &str,
    target_id: &str,
    position: DropPosition,
) -> bool {
    if source_id == target_id || locate_block(doc, target_id).is_none() {
        return false;
    }
    let Some((src_page, src_index)) = locate_block(doc, source_id) else {
        return false;
    };

    let block = Arc::make_mut(&mut doc.pages[src_page]).blocks.remove(src_index);
    match locate_block(doc, target_id) {
        Some((dest_page, target)) => {
            let at = insertion_index(target, position);
            Arc::make_mut(&mut doc.pages[dest_page]).blocks.insert(at, block);
            dest_page != src_page || at != src_index
        }
        None => {
            Arc::make_mut(&mut doc.pages[src_page])
                .blocks
                .insert(src_index, block);
            false
        }
    }
}

/// Set a block's stored size; `None` clears a dimension
pub fn set_block_size(
    doc: &mut Document,
    block_id: &str,
    width: Option<f64>,
    height: Option<f64>,
) -> bool {
    let valid = |v: Option<f64>| v.map_or(true, |n| n.is_finite() && n > 0.0);
    if !valid(width) || !valid(height) {
        return false;
    }
    match doc.find_block(block_id) {
        Some((_, block)) if block.width != width || block.height != height => {}
        _ => return false,
    }
    match block_mut(doc, block_id) {
        Some(block) => {
            block.width = width;
            block.height = height;
            true
        }
        None => false,
    }
}

/// Set or clear a block's title color
pub fn set_block_title_color(doc: &mut Document, block_id: &str, color: Option<&str>) -> bool {
    let color = trimmed_note(color);
    match doc.find_block(block_id) {
        Some((_, block)) if block.title_color != color => {}
        _ => return false,
    }
    match block_mut(doc, block_id) {
        Some(block) => {
            block.title_color = color;
            true
        }
        None => false,
    }
}

/// Append a command to a block; returns its id, or `None` for a stale block
pub fn add_command(
    doc: &mut Document,
    block_id: &str,
    text: &str,
    note: Option<&str>,
) -> Option<String> {
    let block = block_mut(doc, block_id)?;
    let cmd = Command {
        note: trimmed_note(note),
        ..Command::new(text)
    };
    let id = cmd.id.clone();
    block.cmds.push(cmd);
    Some(id)
}

/// Overwrite a command's text
///
/// Unlike renames this always writes, even when the text is unchanged.
pub fn update_command_text(doc: &mut Document, block_id: &str, cmd_id: &str, text: &str) -> bool {
    match command_mut(doc, block_id, cmd_id) {
        Some(cmd) => {
            cmd.text = text.to_string();
            true
        }
        None => false,
    }
}

/// Overwrite a command's note; a blank note removes it
pub fn update_command_note(
    doc: &mut Document,
    block_id: &str,
    cmd_id: &str,
    note: Option<&str>,
) -> bool {
    match command_mut(doc, block_id, cmd_id) {
        Some(cmd) => {
            cmd.note = trimmed_note(note);
            true
        }
        None => false,
    }
}

pub fn delete_command(doc: &mut Document, block_id: &str, cmd_id: &str) -> bool {
    let Some(block) = block_mut(doc, block_id) else {
        return false;
    };
    match block.cmds.iter().position(|c| c.id == cmd_id) {
        Some(index) => {
            block.cmds.remove(index);
            true
        }
        None => false,
    }
}

/// Move a command next to another command, possibly in a different block
pub fn reorder_commands(
    doc: &mut Document,
    source_id: &str,
    target_id: &str,
    position: DropPosition,
) -> bool {
    if source_id == target_id || locate_command(doc, target_id).is_none() {
        return false;
    }
    let Some((sp, sb, sc)) = locate_command(doc, source_id) else {
        return false;
    };

    let cmd = Arc::make_mut(&mut Arc::make_mut(&mut doc.pages[sp]).blocks[sb])
        .cmds
        .remove(sc);
    match locate_command(doc, target_id) {
        Some((tp, tb, tc)) => {
            let at = insertion_index(tc, position);
            Arc::make_mut(&mut Arc::make_mut(&mut doc.pages[tp]).blocks[tb])
                .cmds
                .insert(at, cmd);
            (tp, tb) != (sp, sb) || at != sc
        }
        None => {
            Arc::make_mut(&mut Arc::make_mut(&mut doc.pages[sp]).blocks[sb])
                .cmds
                .insert(sc, cmd);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_ids(doc: &Document) -> Vec<String> {
        doc.pages.iter().map(|p| p.id.clone()).collect()
    }

    fn block_titles(doc: &Document, page_id: &str) -> Vec<String> {
        doc.page(page_id)
            .unwrap()
            .blocks
            .iter()
            .map(|b| b.title.clone())
            .collect()
    }

    /// Four pages named A..D
    fn four_pages() -> (Document, Vec<String>) {
        let doc = Document::with_pages(
            ["A", "B", "C", "D"].into_iter().map(Page::new).collect(),
        );
        let ids = page_ids(&doc);
        (doc, ids)
    }

    #[test]
    fn test_add_page_synthesizes_name_and_activates() {
        let mut doc = Document::default();
        let id = add_page(&mut doc, Some("   "));
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.page(&id).unwrap().name, "新建页 2");
        assert_eq!(doc.active_page_id, id);

        let id = add_page(&mut doc, Some("  Test "));
        assert_eq!(doc.page(&id).unwrap().name, "Test");
        assert!(doc.page(&id).unwrap().blocks.is_empty());
    }

    #[test]
    fn test_rename_page_refuses_blank_and_unchanged() {
        let mut doc = Document::default();
        let id = doc.pages[0].id.clone();
        let name = doc.pages[0].name.clone();

        assert!(!rename_page(&mut doc, &id, "  "));
        assert!(!rename_page(&mut doc, &id, &format!(" {} ", name)));
        assert!(!rename_page(&mut doc, "missing", "X"));
        assert!(rename_page(&mut doc, &id, "Ops"));
        assert_eq!(doc.pages[0].name, "Ops");
    }

    #[test]
    fn test_delete_last_page_is_refused() {
        let mut doc = Document::default();
        let id = doc.pages[0].id.clone();
        assert!(!delete_page(&mut doc, &id));
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn test_delete_active_page_picks_neighbour() {
        let (mut doc, ids) = four_pages();

        doc.active_page_id = ids[1].clone();
        assert!(delete_page(&mut doc, &ids[1]));
        assert_eq!(doc.active_page_id, ids[2]);

        doc.active_page_id = ids[3].clone();
        assert!(delete_page(&mut doc, &ids[3]));
        assert_eq!(doc.active_page_id, ids[2]);
        assert!(doc.page(&doc.active_page_id).is_some());

        assert!(!delete_page(&mut doc, "missing"));
    }

    #[test]
    fn test_delete_inactive_page_keeps_active() {
        let (mut doc, ids) = four_pages();
        assert_eq!(doc.active_page_id, ids[0]);
        assert!(delete_page(&mut doc, &ids[2]));
        assert_eq!(doc.active_page_id, ids[0]);
    }

    #[test]
    fn test_reorder_pages_after_later_target() {
        let (mut doc, ids) = four_pages();
        // A after C: remove A -> [B, C, D], C at 1, insert at 2
        assert!(reorder_pages(&mut doc, &ids[0], &ids[2], DropPosition::After));
        assert_eq!(
            page_ids(&doc),
            vec![ids[1].clone(), ids[2].clone(), ids[0].clone(), ids[3].clone()]
        );
    }

    #[test]
    fn test_reorder_pages_before_earlier_target() {
        let (mut doc, ids) = four_pages();
        assert!(reorder_pages(&mut doc, &ids[3], &ids[1], DropPosition::Before));
        assert_eq!(
            page_ids(&doc),
            vec![ids[0].clone(), ids[3].clone(), ids[1].clone(), ids[2].clone()]
        );
    }

    #[test]
    fn test_reorder_noops() {
        let (mut doc, ids) = four_pages();
        let before = doc.clone();

        assert!(!reorder_pages(&mut doc, &ids[0], &ids[0], DropPosition::After));
        assert!(!reorder_pages(&mut doc, "missing", &ids[0], DropPosition::After));
        assert!(!reorder_pages(&mut doc, &ids[0], "missing", DropPosition::Before));
        // Already directly before B
        assert!(!reorder_pages(&mut doc, &ids[0], &ids[1], DropPosition::Before));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_reorder_before_then_after_swaps_side() {
        let (mut doc, ids) = four_pages();
        assert!(reorder_pages(&mut doc, &ids[0], &ids[2], DropPosition::Before));
        assert_eq!(
            page_ids(&doc),
            vec![ids[1].clone(), ids[0].clone(), ids[2].clone(), ids[3].clone()]
        );
        assert!(reorder_pages(&mut doc, &ids[0], &ids[2], DropPosition::After));
        assert_eq!(
            page_ids(&doc),
            vec![ids[1].clone(), ids[2].clone(), ids[0].clone(), ids[3].clone()]
        );
    }

    #[test]
    fn test_add_rename_delete_block() {
        let mut doc = Document::default();
        let page_id = doc.pages[0].id.clone();

        let id = add_block(&mut doc, &page_id, None).unwrap();
        assert_eq!(doc.find_block(&id).unwrap().1.title, "新建块 3");
        assert!(add_block(&mut doc, "missing", Some("x")).is_none());

        assert!(!rename_block(&mut doc, &id, "新建块 3"));
        assert!(!rename_block(&mut doc, &id, ""));
        assert!(rename_block(&mut doc, &id, "Kubernetes"));
        assert_eq!(doc.find_block(&id).unwrap().1.title, "Kubernetes");

        assert!(delete_block(&mut doc, &id));
        assert!(doc.find_block(&id).is_none());
        assert!(!delete_block(&mut doc, &id));
    }

    #[test]
    fn test_delete_block_cascades_commands() {
        let mut doc = Document::default();
        let block_id = doc.pages[0].blocks[0].id.clone();
        let cmd_id = doc.pages[0].blocks[0].cmds[0].id.clone();
        assert!(delete_block(&mut doc, &block_id));
        assert!(doc.find_command(&cmd_id).is_none());
    }

    #[test]
    fn test_move_block_to_end_and_to_page() {
        let mut doc = Document::default();
        let page_id = doc.pages[0].id.clone();
        let first = doc.pages[0].blocks[0].id.clone();

        assert!(move_block_to_end(&mut doc, &first));
        assert_eq!(doc.pages[0].blocks[1].id, first);
        assert!(!move_block_to_end(&mut doc, "missing"));

        let other = add_page(&mut doc, Some("Other"));
        assert!(!move_block_to_page(&mut doc, &first, &page_id));
        assert!(move_block_to_page(&mut doc, &first, &other));
        assert_eq!(doc.page(&other).unwrap().blocks[0].id, first);
        assert_eq!(doc.page(&page_id).unwrap().blocks.len(), 1);
    }

    #[test]
    fn test_reorder_blocks_across_pages() {
        let mut doc = Document::default();
        let home = doc.pages[0].id.clone();
        let other = add_page(&mut doc, Some("Other"));
        let b1 = add_block(&mut doc, &other, Some("B1")).unwrap();
        let moved = doc.pages[0].blocks[0].id.clone();

        assert!(reorder_blocks(&mut doc, &moved, &b1, DropPosition::Before));
        assert_eq!(block_titles(&doc, &other), vec!["常用命令", "B1"]);
        assert_eq!(block_titles(&doc, &home), vec!["Docker"]);
    }

    /// A fresh page holding blocks A, B and C
    fn three_blocks() -> (Document, String, Vec<String>) {
        let mut doc = Document::default();
        let page_id = add_page(&mut doc, Some("Work"));
        let ids = ["A", "B", "C"]
            .into_iter()
            .map(|t| add_block(&mut doc, &page_id, Some(t)).unwrap())
            .collect();
        (doc, page_id, ids)
    }

    #[test]
    fn test_reorder_blocks_same_page_after_later_target() {
        let (mut doc, page_id, ids) = three_blocks();
        // A after C: remove A -> [B, C], C at 1, insert at 2
        assert!(reorder_blocks(&mut doc, &ids[0], &ids[2], DropPosition::After));
        assert_eq!(block_titles(&doc, &page_id), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_reorder_blocks_before_then_after_swaps_side() {
        let (mut doc, page_id, ids) = three_blocks();
        assert!(reorder_blocks(&mut doc, &ids[0], &ids[2], DropPosition::Before));
        assert_eq!(block_titles(&doc, &page_id), vec!["B", "A", "C"]);
        assert!(reorder_blocks(&mut doc, &ids[0], &ids[2], DropPosition::After));
        assert_eq!(block_titles(&doc, &page_id), vec!["B", "C", "A"]);

        // Already directly before C
        assert!(!reorder_blocks(&mut doc, &ids[1], &ids[2], DropPosition::Before));
        assert_eq!(block_titles(&doc, &page_id), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_block_size_and_color() {
        let mut doc = Document::default();
        let id = doc.pages[0].blocks[0].id.clone();

        assert!(set_block_size(&mut doc, &id, Some(300.0), Some(200.0)));
        assert!(!set_block_size(&mut doc, &id, Some(300.0), Some(200.0)));
        assert!(!set_block_size(&mut doc, &id, Some(f64::NAN), None));
        assert!(!set_block_size(&mut doc, &id, Some(-1.0), None));
        assert_eq!(doc.find_block(&id).unwrap().1.width, Some(300.0));

        assert!(set_block_title_color(&mut doc, &id, Some("#336699")));
        assert!(!set_block_title_color(&mut doc, &id, Some(" #336699 ")));
        assert!(set_block_title_color(&mut doc, &id, Some("")));
        assert_eq!(doc.find_block(&id).unwrap().1.title_color, None);
    }

    #[test]
    fn test_command_crud() {
        let mut doc = Document::default();
        let block_id = doc.pages[0].blocks[1].id.clone();

        let id = add_command(&mut doc, &block_id, "docker logs -f app", Some("  ")).unwrap();
        let (_, cmd) = doc.find_command(&id).unwrap();
        assert_eq!(cmd.text, "docker logs -f app");
        assert_eq!(cmd.note, None);
        assert!(add_command(&mut doc, "missing", "x", None).is_none());

        assert!(update_command_text(&mut doc, &block_id, &id, "docker logs -f app"));
        assert!(update_command_text(&mut doc, &block_id, &id, "docker logs app"));
        assert!(!update_command_text(&mut doc, "missing", &id, "x"));

        assert!(update_command_note(&mut doc, &block_id, &id, Some("tail logs")));
        assert_eq!(doc.find_command(&id).unwrap().1.note.as_deref(), Some("tail logs"));
        assert!(update_command_note(&mut doc, &block_id, &id, None));
        assert_eq!(doc.find_command(&id).unwrap().1.note, None);

        assert!(delete_command(&mut doc, &block_id, &id));
        assert!(!delete_command(&mut doc, &block_id, &id));
    }

    #[test]
    fn test_reorder_commands_within_and_across_blocks() {
        let mut doc = Document::default();
        let common: Vec<String> = doc.pages[0].blocks[0].cmds.iter().map(|c| c.id.clone()).collect();
        let docker_first = doc.pages[0].blocks[1].cmds[0].id.clone();

        assert!(reorder_commands(&mut doc, &common[0], &common[2], DropPosition::After));
        let order: Vec<&str> = doc.pages[0].blocks[0].cmds.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec![common[1].as_str(), common[2].as_str(), common[0].as_str()]);

        assert!(reorder_commands(&mut doc, &common[1], &docker_first, DropPosition::After));
        assert_eq!(doc.pages[0].blocks[0].cmds.len(), 2);
        assert_eq!(doc.pages[0].blocks[1].cmds[1].id, common[1]);

        assert!(!reorder_commands(&mut doc, &common[1], &common[1], DropPosition::Before));
        assert!(!reorder_commands(&mut doc, &common[1], "missing", DropPosition::Before));
    }

    #[test]
    fn test_reorder_commands_before_then_after_swaps_side() {
        let mut doc = Document::default();
        let block_id = doc.pages[0].blocks[1].id.clone();
        let ids: Vec<String> = ["a", "b", "c"]
            .into_iter()
            .map(|t| add_command(&mut doc, &block_id, t, None).unwrap())
            .collect();
        let texts = |doc: &Document| -> Vec<String> {
            doc.find_block(&block_id)
                .unwrap()
                .1
                .cmds
                .iter()
                .skip(2)
                .map(|c| c.text.clone())
                .collect()
        };

        assert!(reorder_commands(&mut doc, &ids[0], &ids[2], DropPosition::Before));
        assert_eq!(texts(&doc), vec!["b", "a", "c"]);
        assert!(reorder_commands(&mut doc, &ids[0], &ids[2], DropPosition::After));
        assert_eq!(texts(&doc), vec!["b", "c", "a"]);
        assert!(!reorder_commands(&mut doc, &ids[1], &ids[2], DropPosition::Before));
    }

    #[test]
    fn test_set_active_page() {
        let (mut doc, ids) = four_pages();
        assert!(set_active_page(&mut doc, &ids[2]));
        assert!(!set_active_page(&mut doc, &ids[2]));
        assert!(!set_active_page(&mut doc, "missing"));
        assert_eq!(doc.active_page_id, ids[2]);
    }
}
