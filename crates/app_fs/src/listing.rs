//! Listing view model - rows shown for an authoritative directory listing

use crate::address::{drive_list_reachable, Address, Platform};
use crate::breadcrumb::{breadcrumbs_in, Crumb};
use ipc_proto::{DirItem, Mode};
use serde::{Deserialize, Serialize};

/// What a browse interaction may hand back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionIntent {
    #[default]
    DirectoryOnly,
    /// File rows complete the interaction when clicked
    FileOrDirectory,
}

/// A row of the browse view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingRow {
    /// Go to the parent directory
    Up,
    /// Back to the drive list from a drive root
    OtherDrives,
    Directory(DirItem),
    File { item: DirItem, selectable: bool },
    /// Placeholder so the view is never blank
    Empty,
}

/// Rows and breadcrumbs for one listing
#[derive(Debug, Clone)]
pub struct ListingView {
    current: Address,
    crumbs: Vec<Crumb>,
    rows: Vec<ListingRow>,
}

impl ListingView {
    /// Build the view; directories come first, each group in backend order
    ///
    /// Rows and crumbs leading to the drive list only appear where it is
    /// reachable.
    pub fn build(
        current: Address,
        items: Vec<DirItem>,
        mode: Mode,
        platform: Platform,
        intent: SelectionIntent,
    ) -> Self {
        let drives = drive_list_reachable(mode, platform.is_windows());
        let mut rows = Vec::with_capacity(items.len() + 2);

        if current.has_parent() && (drives || !current.is_drive_root()) {
            rows.push(ListingRow::Up);
        }

        if drives && current.is_drive_root() {
            rows.push(ListingRow::OtherDrives);
        }

        let (dirs, files): (Vec<_>, Vec<_>) = items.into_iter().partition(|item| item.is_dir);
        rows.extend(dirs.into_iter().map(ListingRow::Directory));

        let selectable = intent == SelectionIntent::FileOrDirectory;
        rows.extend(
            files
                .into_iter()
                .map(|item| ListingRow::File { item, selectable }),
        );

        if rows.is_empty() {
            rows.push(ListingRow::Empty);
        }

        let crumbs = breadcrumbs_in(&current, drives);
        Self {
            current,
            crumbs,
            rows,
        }
    }

    pub fn current(&self) -> &Address {
        &self.current
    }

    pub fn breadcrumbs(&self) -> &[Crumb] {
        &self.crumbs
    }

    pub fn rows(&self) -> &[ListingRow] {
        &self.rows
    }

    /// Look up a listed directory or file by its backend path
    pub fn find_item(&self, path: &str) -> Option<&DirItem> {
        self.rows.iter().find_map(|row| match row {
            ListingRow::Directory(item) | ListingRow::File { item, .. } if item.path == path => Some(item),
            _ => None,
        })
    }

    /// Number of directory and file rows
    pub fn item_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, ListingRow::Directory(_) | ListingRow::File { .. }))
            .count()
    }
}

/// Human readable size for file rows
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
