//! Documentation sidebar builder.
//!
//! Walks a docs directory and mirrors it as a nested navigation tree in the
//! shape static site generators expect for their sidebar config:
//!
//! ```json
//! [
//!   { "text": "Getting Started", "link": "/getting-started" },
//!   { "text": "Chapter 1", "items": [ { "text": "Hello Openai", "link": "/chapter1/hello_openai" } ] }
//! ]
//! ```

use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while building a sidebar.
#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("Docs root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A page link or a group of nested items.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SidebarItem {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<SidebarItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

impl SidebarItem {
    pub fn page(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: Some(link.into()),
            items: Vec::new(),
            collapsed: None,
        }
    }

    pub fn group(text: impl Into<String>, items: Vec<SidebarItem>, collapsed: Option<bool>) -> Self {
        Self {
            text: text.into(),
            link: None,
            items,
            collapsed,
        }
    }
}

/// Sidebar builder options.
#[derive(Debug, Clone)]
pub struct SidebarOptions {
    /// File at the docs root that is the home page, not a sidebar entry
    pub index_file: String,

    /// Extensions (without dot) of files that become pages
    pub extensions: Vec<String>,

    /// Characters treated as word separators when building titles
    pub separators: Vec<char>,

    /// Initial collapsed state of groups; `None` leaves groups non-collapsible
    pub collapsed: Option<bool>,
}

impl Default for SidebarOptions {
    fn default() -> Self {
        Self {
            index_file: "index.md".to_string(),
            extensions: vec!["md".to_string()],
            separators: vec!['-', '_'],
            collapsed: None,
        }
    }
}

impl SidebarOptions {
    pub fn with_index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = name.into();
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }
}

/// Build the navigation tree for the docs directory at `root`.
///
/// Hidden entries and the root index file are skipped, directories without
/// any page are dropped, and siblings are ordered by file name.
pub fn build_sidebar(root: &Path, options: &SidebarOptions) -> Result<Vec<SidebarItem>, SidebarError> {
    if !root.is_dir() {
        return Err(SidebarError::NotADirectory(root.to_path_buf()));
    }
    walk(root, root, options)
}

/// Serialize a sidebar as pretty-printed JSON.
pub fn sidebar_json(items: &[SidebarItem]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(items)
}

fn walk(root: &Path, dir: &Path, options: &SidebarOptions) -> Result<Vec<SidebarItem>, SidebarError> {
    let mut items = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }

        if entry.file_type().is_dir() {
            let children = walk(root, entry.path(), options)?;
            if !children.is_empty() {
                items.push(SidebarItem::group(
                    title_case(&name, &options.separators),
                    children,
                    options.collapsed,
                ));
            }
            continue;
        }

        if dir == root && name == options.index_file.as_str() {
            continue;
        }
        if !is_page(entry.path(), options) {
            continue;
        }

        let stem = entry
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        items.push(SidebarItem::page(
            title_case(&stem, &options.separators),
            page_link(root, entry.path()),
        ));
    }

    Ok(items)
}

fn is_page(path: &Path, options: &SidebarOptions) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| options.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}

/// Site link for a page: its path below `root`, extension dropped.
fn page_link(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .join("/");
    format!("/{}", joined)
}

/// `"getting-started_guide"` → `"Getting Started Guide"`.
pub fn title_case(name: &str, separators: &[char]) -> String {
    name.split(|c: char| separators.contains(&c))
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}
