use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use link_hub_lib::commands::{self, CreateLinkInput};
use link_hub_lib::links::tree;
use link_hub_lib::links::url::favicon_url;
use link_hub_lib::links::{Folder, LinkUpdate, LinkWithFolder};
use link_hub_lib::storage::{AppSettings, ViewMode};
use link_hub_lib::{AppState, Config};

#[derive(Parser)]
#[command(name = "link-hub", about = "Organize bookmarks in nested, color-tagged folders")]
struct Cli {
    /// Database file (defaults to $LINK_HUB_DB, then the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the folder tree
    Tree {
        /// Also show collapsed folders' contents
        #[arg(long)]
        all: bool,
    },
    /// Create a folder
    AddFolder {
        name: String,
        /// Create it inside this folder
        #[arg(long)]
        parent: Option<String>,
        /// Hex color, e.g. #3b82f6
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename a folder
    RenameFolder { id: String, name: String },
    /// Delete a folder with its subfolders and links
    DeleteFolder { id: String },
    /// Change a folder's color
    Color { id: String, color: String },
    /// Expand or collapse a folder
    Toggle { id: String },
    /// Add a link to a folder
    AddLink {
        folder: String,
        title: String,
        url: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Edit a link's fields
    UpdateLink {
        folder: String,
        link: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Delete a link
    DeleteLink { folder: String, link: String },
    /// Move links from one folder to another
    MoveLinks {
        source: String,
        target: String,
        #[arg(required = true)]
        links: Vec<String>,
    },
    /// List links, optionally from one folder only
    Links {
        #[arg(long)]
        folder: Option<String>,
    },
    /// Search links by title, url or description
    Search {
        query: String,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Print the ancestor chain of a folder
    Path { id: String },
    /// Folder and link totals
    Stats,
    /// List the folder color palette
    Colors,
    /// Write all folders to a JSON backup
    Export {
        file: PathBuf,
        #[arg(long)]
        compact: bool,
    },
    /// Replace all folders with a JSON backup
    Import { file: PathBuf },
    /// Show or change display settings
    Settings {
        #[arg(long, value_enum)]
        view: Option<ViewArg>,
        /// Folder shown by default; pass an empty string to clear
        #[arg(long)]
        select: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Grid,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Grid => ViewMode::Grid,
            ViewArg::List => ViewMode::List,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.db)?;
    info!("[Startup] Database path: {:?}", config.db_path);
    let state = AppState::open(config.db_path)?;

    run(&state, cli.command)
}

fn run(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Tree { all } => {
            print_tree(&commands::get_folders(state).map_err(|e| anyhow!(e))?, all);
        }
        Command::AddFolder { name, parent, color } => {
            match commands::add_folder(state, name, parent, color).map_err(|e| anyhow!(e))? {
                Some(folder) => println!("Created folder {} ({})", folder.name, folder.id),
                None => println!("Parent folder not found; nothing created."),
            }
        }
        Command::RenameFolder { id, name } => {
            report(commands::rename_folder(state, id, name).map_err(|e| anyhow!(e))?, "Renamed.");
        }
        Command::DeleteFolder { id } => {
            report(commands::delete_folder(state, id).map_err(|e| anyhow!(e))?, "Deleted.");
        }
        Command::Color { id, color } => {
            report(
                commands::update_folder_color(state, id, color).map_err(|e| anyhow!(e))?,
                "Color updated.",
            );
        }
        Command::Toggle { id } => {
            report(commands::toggle_folder(state, id).map_err(|e| anyhow!(e))?, "Toggled.");
        }
        Command::AddLink { folder, title, url, description, comment } => {
            let input = CreateLinkInput { title, url, description, comment };
            match commands::add_link(state, folder, input).map_err(|e| anyhow!(e))? {
                Some(link) => println!("Added {} -> {} ({})", link.title, link.url, link.id),
                None => println!("Folder not found; nothing added."),
            }
        }
        Command::UpdateLink { folder, link, title, url, description, comment } => {
            let updates = LinkUpdate { title, url, description, comment, favicon: None };
            match commands::update_link(state, folder, link, updates).map_err(|e| anyhow!(e))? {
                Some(link) => println!("Updated {} -> {}", link.title, link.url),
                None => println!("Link not found; nothing changed."),
            }
        }
        Command::DeleteLink { folder, link } => {
            report(commands::delete_link(state, folder, link).map_err(|e| anyhow!(e))?, "Deleted.");
        }
        Command::MoveLinks { source, target, links } => {
            let moved = commands::move_links(state, links, source, target).map_err(|e| anyhow!(e))?;
            println!("Moved {} link{}.", moved, if moved == 1 { "" } else { "s" });
        }
        Command::Links { folder } => {
            let settings = commands::get_app_settings(state).map_err(|e| anyhow!(e))?;
            let scope = match folder {
                Some(folder) => Some(folder),
                // A saved selection that no longer resolves shows every link
                None => commands::get_selected_folder(state)
                    .map_err(|e| anyhow!(e))?
                    .map(|selected| selected.id),
            };
            let links = commands::search_links(state, String::new(), scope).map_err(|e| anyhow!(e))?;
            print_links(&links, settings.view_mode);
        }
        Command::Search { query, folder } => {
            let settings = commands::get_app_settings(state).map_err(|e| anyhow!(e))?;
            let links = commands::search_links(state, query, folder).map_err(|e| anyhow!(e))?;
            print_links(&links, settings.view_mode);
        }
        Command::Path { id } => match commands::get_folder_path(state, id).map_err(|e| anyhow!(e))? {
            Some(path) => {
                let names: Vec<&str> = path.iter().map(|entry| entry.name.as_str()).collect();
                println!("{}", names.join(" / "));
            }
            None => println!("Folder not found."),
        },
        Command::Stats => {
            let stats = commands::get_stats(state).map_err(|e| anyhow!(e))?;
            println!("{} folders, {} links", stats.folder_count, stats.link_count);
        }
        Command::Colors => {
            for color in commands::get_folder_colors() {
                println!("{:<8} {}", color.name, color.value);
            }
        }
        Command::Export { file, compact } => {
            let summary = commands::export_folders(state, file.to_string_lossy().to_string(), !compact)
                .map_err(|e| anyhow!(e))?;
            println!(
                "Exported {} folders, {} links ({} bytes)",
                summary.folder_count, summary.link_count, summary.bytes
            );
        }
        Command::Import { file } => {
            let summary = commands::import_folders(state, file.to_string_lossy().to_string())
                .map_err(|e| anyhow!(e))?;
            println!("Imported {} folders, {} links", summary.folder_count, summary.link_count);
        }
        Command::Settings { view, select } => {
            let mut settings = commands::get_app_settings(state).map_err(|e| anyhow!(e))?;
            if view.is_some() || select.is_some() {
                if let Some(view) = view {
                    settings.view_mode = view.into();
                }
                if let Some(select) = select {
                    settings.selected_folder_id = Some(select).filter(|s| !s.is_empty());
                }
                commands::update_app_settings(state, settings.clone()).map_err(|e| anyhow!(e))?;
            }
            print_settings(&settings);
        }
    }
    Ok(())
}

fn report(changed: bool, message: &str) {
    if changed {
        println!("{}", message);
    } else {
        println!("Not found; nothing changed.");
    }
}

fn print_tree(folders: &[Folder], all: bool) {
    if folders.is_empty() {
        println!("  No folders.");
        return;
    }
    for line in tree_lines(folders, all) {
        println!("{}", line);
    }
}

/// One line per visible folder; collapsed folders hide their subtree unless `all`
fn tree_lines(folders: &[Folder], all: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut hidden_below: Option<usize> = None;

    for (depth, folder) in tree::flatten_with_depth(folders) {
        if let Some(limit) = hidden_below {
            if depth > limit {
                continue;
            }
            hidden_below = None;
        }

        let marker = if folder.subfolders.is_empty() {
            " "
        } else if folder.is_expanded {
            "v"
        } else {
            ">"
        };
        lines.push(format!(
            "{}{} {} [{}] {} ({} links)",
            "  ".repeat(depth),
            marker,
            folder.name,
            folder.display_color(),
            folder.id,
            folder.links.len(),
        ));

        if !folder.is_expanded && !all {
            hidden_below = Some(depth);
        }
    }
    lines
}

fn print_links(links: &[LinkWithFolder], view: ViewMode) {
    if links.is_empty() {
        println!("  No links.");
        return;
    }
    println!("({} {})", links.len(), if links.len() > 1 { "links" } else { "link" });
    for entry in links {
        let link = &entry.link;
        match view {
            ViewMode::Grid => println!("  {}  {}  [{}]", link.title, link.url, entry.folder_name),
            ViewMode::List => {
                println!("  {} ({})", link.title, link.id);
                println!("    url:    {}", link.url);
                println!("    folder: {}", entry.folder_name);
                if let Some(description) = &link.description {
                    println!("    about:  {}", description);
                }
                if let Some(comment) = &link.comment {
                    println!("    note:   {}", comment);
                }
                if let Some(icon) = link.favicon.clone().or_else(|| favicon_url(&link.url)) {
                    println!("    icon:   {}", icon);
                }
            }
        }
    }
}

fn print_settings(settings: &AppSettings) {
    println!("view:     {}", settings.view_mode.as_str());
    println!(
        "selected: {}",
        settings.selected_folder_id.as_deref().unwrap_or("(all links)")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn folder(id: &str, expanded: bool, subfolders: Vec<Folder>) -> Folder {
        Folder {
            id: id.to_string(),
            name: id.to_uppercase(),
            color: None,
            links: Vec::new(),
            subfolders,
            is_expanded: expanded,
            created_at: 0,
            parent_id: None,
        }
    }

    #[test]
    fn move_links_requires_at_least_one_id() {
        let parsed = Cli::try_parse_from(["link-hub", "move-links", "a", "b"]);
        let err = parsed.err().expect("expected clap parse error");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn add_folder_parses_parent_and_color() {
        let cli = Cli::try_parse_from([
            "link-hub", "--db", "/tmp/x.db", "add-folder", "Rust", "--parent", "1", "--color", "#ef4444",
        ])
        .expect("add-folder should parse");
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        match cli.command {
            Command::AddFolder { name, parent, color } => {
                assert_eq!(name, "Rust");
                assert_eq!(parent.as_deref(), Some("1"));
                assert_eq!(color.as_deref(), Some("#ef4444"));
            }
            _ => panic!("expected add-folder command"),
        }
    }

    #[test]
    fn settings_rejects_unknown_view() {
        let parsed = Cli::try_parse_from(["link-hub", "settings", "--view", "masonry"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn tree_hides_collapsed_subtrees() {
        let folders = vec![
            folder("a", false, vec![folder("a1", true, vec![])]),
            folder("b", true, vec![folder("b1", false, vec![folder("b1x", true, vec![])])]),
        ];

        let lines = tree_lines(&folders, false);
        assert_eq!(
            lines,
            vec![
                "> A [#6b7280] a (0 links)".to_string(),
                "v B [#6b7280] b (0 links)".to_string(),
                "  > B1 [#6b7280] b1 (0 links)".to_string(),
            ]
        );

        assert_eq!(tree_lines(&folders, true).len(), 5);
    }
}
