//! Cmd Notebook - command snippet notebook
//!
//! Command-line front end over the notebook store: inspect, edit, import
//! and export the notebook, and manage its data directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cmd_notebook::storage::backup::list_backups;
use cmd_notebook::storage::data_dir::{
    check_target_dir, data_dir_info, reset_data_dir, switch_data_dir, SwitchDirAction,
};
use cmd_notebook::storage::{FileGateway, RetryPolicy};
use cmd_notebook::{AppConfig, DropPosition, Store};

/// Organize shell command snippets into pages of blocks
#[derive(Parser, Debug)]
#[command(name = "cmd-notebook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Use this data directory instead of the configured one
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the notebook as a tree
    Show,

    /// Write the whole notebook as pretty JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the notebook with the contents of a JSON file
    Import { file: PathBuf },

    /// Add a page and make it active
    AddPage { name: Option<String> },

    /// Rename a page
    RenamePage { id: String, name: String },

    /// Delete a page and everything on it
    DeletePage { id: String },

    /// Move a page next to another page
    MovePage {
        source: String,
        target: String,
        #[arg(long, value_enum, default_value = "before")]
        position: Position,
    },

    /// Add a block to a page (the active page by default)
    AddBlock {
        #[arg(short, long)]
        page: Option<String>,
        title: Option<String>,
    },

    /// Delete a block and its commands
    DeleteBlock { id: String },

    /// Add a command to a block
    AddCmd {
        block: String,
        text: String,
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Delete a command from a block
    DeleteCmd { block: String, id: String },

    /// List backups of the data file, newest first
    Backups,

    /// Inspect or change the data directory
    Dir {
        #[command(subcommand)]
        command: DirCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DirCommand {
    /// Show the current data directory
    Info,
    /// Check whether a directory can hold the notebook
    Check { path: PathBuf },
    /// Move to another data directory
    Switch {
        path: PathBuf,
        #[arg(long, value_enum)]
        action: SwitchAction,
    },
    /// Return to the default data directory
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Position {
    Before,
    After,
}

impl From<Position> for DropPosition {
    fn from(position: Position) -> Self {
        match position {
            Position::Before => DropPosition::Before,
            Position::After => DropPosition::After,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SwitchAction {
    /// Copy the current notebook into the new directory
    Copy,
    /// Use the notebook already in the new directory
    UseExisting,
}

impl From<SwitchAction> for SwitchDirAction {
    fn from(action: SwitchAction) -> Self {
        match action {
            SwitchAction::Copy => SwitchDirAction::CopyToNew,
            SwitchAction::UseExisting => SwitchDirAction::UseExisting,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(level)
        .init();

    let config_path = AppConfig::config_path()?;
    let default_dir = AppConfig::default_data_dir()?;
    let mut config = AppConfig::load_from(&config_path, &default_dir)?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Dir { command } => run_dir(command, &mut config, &config_path, &default_dir),
        Commands::Backups => {
            for backup in list_backups(&config.backup_dir())? {
                println!("{}\t{} bytes", backup.path.display(), backup.size);
            }
            Ok(())
        }
        command => {
            let mut store = Store::open(FileGateway::from_config(&config), RetryPolicy::default());
            let result = run_notebook(command, &mut store);
            store.flush();
            result
        }
    }
}

fn run_notebook(command: Commands, store: &mut Store) -> Result<()> {
    match command {
        Commands::Show => print_tree(store),
        Commands::Export { output } => {
            let json = store.export_json()?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            store
                .import_json(&raw)
                .with_context(|| format!("Rejected import from {}", file.display()))?;
            println!("Imported {} pages", store.document().pages.len());
        }
        Commands::AddPage { name } => println!("{}", store.add_page(name.as_deref())),
        Commands::RenamePage { id, name } => {
            if !store.rename_page(&id, &name) {
                bail!("Page {} not renamed (unknown id, blank or unchanged name)", id);
            }
        }
        Commands::DeletePage { id } => {
            if !store.delete_page(&id) {
                bail!("Page {} not deleted (unknown id or last page)", id);
            }
        }
        Commands::MovePage {
            source,
            target,
            position,
        } => {
            if !store.reorder_pages(&source, &target, position.into()) {
                bail!("Nothing to move");
            }
        }
        Commands::AddBlock { page, title } => {
            let page = match page {
                Some(page) => page,
                None => store.document().active_page_id.clone(),
            };
            match store.add_block(&page, title.as_deref()) {
                Some(id) => println!("{}", id),
                None => bail!("No page with id {}", page),
            }
        }
        Commands::DeleteBlock { id } => {
            if !store.delete_block(&id) {
                bail!("No block with id {}", id);
            }
        }
        Commands::AddCmd { block, text, note } => {
            match store.add_command(&block, &text, note.as_deref()) {
                Some(id) => println!("{}", id),
                None => bail!("No block with id {}", block),
            }
        }
        Commands::DeleteCmd { block, id } => {
            if !store.delete_command(&block, &id) {
                bail!("No command {} in block {}", id, block);
            }
        }
        Commands::Backups | Commands::Dir { .. } => {}
    }
    Ok(())
}

fn print_tree(store: &Store) {
    let doc = store.document();
    for page in &doc.pages {
        let marker = if page.id == doc.active_page_id { "*" } else { " " };
        println!("{} {} [{}]", marker, page.name, page.id);
        for block in &page.blocks {
            println!("    {} [{}]", block.display_title(), block.id);
            for cmd in &block.cmds {
                match &cmd.note {
                    Some(note) => println!("      $ {}  # {} [{}]", cmd.text, note, cmd.id),
                    None => println!("      $ {} [{}]", cmd.text, cmd.id),
                }
            }
        }
    }
}

fn run_dir(
    command: DirCommand,
    config: &mut AppConfig,
    config_path: &Path,
    default_dir: &Path,
) -> Result<()> {
    match command {
        DirCommand::Info => {
            let info = data_dir_info(config, default_dir);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        DirCommand::Check { path } => {
            println!("{}", serde_json::to_string_pretty(&check_target_dir(&path))?);
        }
        DirCommand::Switch { path, action } => {
            if switch_data_dir(config, &path, action.into())? {
                config.save_to(config_path)?;
                println!("Data directory is now {}", config.data_dir.display());
            }
        }
        DirCommand::Reset => {
            reset_data_dir(config, default_dir)?;
            config.save_to(config_path)?;
            println!("Data directory is now {}", config.data_dir.display());
        }
    }
    Ok(())
}
