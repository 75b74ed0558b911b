//! Path model for the file-management client
//!
//! Provides a unified view over the two addressing schemes the backend can
//! serve:
//! - Address: POSIX paths, Windows drive paths and the synthetic drive list
//! - Breadcrumbs: navigable decomposition of an address
//! - Listing view: rows rendered for an authoritative directory listing

mod address;
mod breadcrumb;
mod listing;

pub use address::{classify, drive_list_reachable, parent_of, Address, Platform, Scheme, DRIVE_LIST_SENTINEL};
pub use breadcrumb::{breadcrumbs, breadcrumbs_in, Crumb, DRIVES_LABEL, DRIVE_LIST_LABEL, ROOT_LABEL};
pub use listing::{format_size, ListingRow, ListingView, SelectionIntent};
