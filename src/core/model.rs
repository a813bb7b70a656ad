//! Notebook document model: pages of blocks of commands

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Schema version of the in-memory document
pub const SCHEMA_VERSION: u32 = 2;

/// Name given to pages that arrive without one
pub const DEFAULT_PAGE_NAME: &str = "默认页";

/// Prefix for synthesized page names ("新建页 3")
pub const NEW_PAGE_PREFIX: &str = "新建页";

/// Prefix for synthesized block titles ("新建块 2")
pub const NEW_BLOCK_PREFIX: &str = "新建块";

/// Title shown for blocks whose title is empty
pub const UNTITLED_BLOCK: &str = "未命名";

/// Generate a fresh identifier, e.g. `page-3f2b...`
///
/// Identifiers are v4 UUIDs, so two calls never collide in practice.
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// A single command snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub text: String,
    /// Optional annotation; `None` means "no note", not an empty one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Command {
    /// Create a new command with a fresh id
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: generate_id("cmd"),
            text: text.into(),
            note: None,
        }
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A titled card holding an ordered list of commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub title: String,
    pub cmds: Vec<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(
        rename = "titleColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub title_color: Option<String>,
}

impl Block {
    /// Create an empty block with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: generate_id("blk"),
            title: title.into(),
            cmds: Vec::new(),
            width: None,
            height: None,
            title_color: None,
        }
    }

    /// Title to display, substituting a placeholder for empty titles
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_BLOCK
        } else {
            &self.title
        }
    }

    pub fn command(&self, cmd_id: &str) -> Option<&Command> {
        self.cmds.iter().find(|c| c.id == cmd_id)
    }
}

/// A named tab holding an ordered list of blocks
///
/// Blocks sit behind `Arc` so that history snapshots share untouched blocks
/// with the live document; writers go through `Arc::make_mut`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub name: String,
    pub blocks: Vec<Arc<Block>>,
}

impl Page {
    /// Create an empty page with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id("page"),
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|b| b.id == block_id)
            .map(|b| b.as_ref())
    }

    pub fn block_index(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == block_id)
    }
}

/// The notebook root: ordered pages plus the active page pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub version: u32,
    pub pages: Vec<Arc<Page>>,
    pub active_page_id: String,
}

/// What [`Document::heal`] had to repair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Repairs {
    pub synthesized_page: bool,
    pub reset_active_page: bool,
}

impl Repairs {
    pub fn any(&self) -> bool {
        self.synthesized_page || self.reset_active_page
    }
}

impl Default for Document {
    /// The notebook a fresh install starts with
    fn default() -> Self {
        let mut common = Block::new("常用命令");
        common.cmds = vec![
            Command::new("ls -la").with_note("列出目录内容"),
            Command::new("git status"),
            Command::new("git log --oneline -n 20"),
        ];

        let mut docker = Block::new("Docker");
        docker.cmds = vec![
            Command::new("docker ps -a"),
            Command::new("docker compose up -d"),
        ];

        let mut page = Page::new(DEFAULT_PAGE_NAME);
        page.blocks = vec![Arc::new(common), Arc::new(docker)];

        Self::with_pages(vec![page])
    }
}

impl Document {
    /// Build a document from pages, activating the first one
    ///
    /// An empty list gets a fallback page so the result is always valid.
    pub fn with_pages(pages: Vec<Page>) -> Self {
        let mut doc = Self {
            version: SCHEMA_VERSION,
            pages: pages.into_iter().map(Arc::new).collect(),
            active_page_id: String::new(),
        };
        doc.heal();
        doc
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages
            .iter()
            .find(|p| p.id == page_id)
            .map(|p| p.as_ref())
    }

    pub fn page_index(&self, page_id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.id == page_id)
    }

    /// The page the active pointer resolves to
    ///
    /// Falls back to the first page; a healed document always resolves.
    pub fn active_page(&self) -> Option<&Page> {
        self.page(&self.active_page_id)
            .or_else(|| self.pages.first().map(|p| p.as_ref()))
    }

    /// Find a block anywhere in the document, with its owning page
    pub fn find_block(&self, block_id: &str) -> Option<(&Page, &Block)> {
        self.pages
            .iter()
            .find_map(|p| p.block(block_id).map(|b| (p.as_ref(), b)))
    }

    /// Find a command anywhere in the document, with its owning block
    pub fn find_command(&self, cmd_id: &str) -> Option<(&Block, &Command)> {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .find_map(|b| b.command(cmd_id).map(|c| (b.as_ref(), c)))
    }

    /// Total number of commands across all pages
    pub fn command_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .map(|b| b.cmds.len())
            .sum()
    }

    /// Restore the structural invariants: at least one page, and an active
    /// page id that resolves.
    pub fn heal(&mut self) -> Repairs {
        let mut repairs = Repairs::default();

        if self.pages.is_empty() {
            self.pages.push(Arc::new(Page::new(DEFAULT_PAGE_NAME)));
            repairs.synthesized_page = true;
        }

        if self.page_index(&self.active_page_id).is_none() {
            self.active_page_id = self.pages[0].id.clone();
            repairs.reset_active_page = true;
        }

        repairs
    }

    /// Check that every page, block and command id occurs once
    pub fn ids_unique(&self) -> bool {
        let mut seen = HashSet::new();
        for page in &self.pages {
            if !seen.insert(page.id.as_str()) {
                return false;
            }
            for block in &page.blocks {
                if !seen.insert(block.id.as_str()) {
                    return false;
                }
                for cmd in &block.cmds {
                    if !seen.insert(cmd.id.as_str()) {
                        return false;
                    }
                }
            }
        }
        true
    }
}
