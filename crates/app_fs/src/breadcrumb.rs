//! Breadcrumb decomposition of an address

use crate::address::{Address, Scheme};

pub const DRIVE_LIST_LABEL: &str = "Drive list";
pub const DRIVES_LABEL: &str = "Drives";
pub const ROOT_LABEL: &str = "root";

/// One breadcrumb; `target` is `None` for the current location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub target: Option<Address>,
}

impl Crumb {
    fn link(label: impl Into<String>, target: Address) -> Self {
        Self {
            label: label.into(),
            target: Some(target),
        }
    }

    fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: None,
        }
    }

    pub fn is_navigable(&self) -> bool {
        self.target.is_some()
    }
}

/// Breadcrumb chain for an address; never empty
pub fn breadcrumbs(address: &Address) -> Vec<Crumb> {
    breadcrumbs_in(address, true)
}

/// Breadcrumb chain where the drive list may be unreachable
///
/// Without the drive list a drive path starts at its drive crumb.
pub fn breadcrumbs_in(address: &Address, drive_list_reachable: bool) -> Vec<Crumb> {
    let segments = address.segments();

    let (mut crumbs, first_path_segment) = match address.scheme() {
        Scheme::WindowsRoot => return vec![Crumb::current(DRIVE_LIST_LABEL)],
        Scheme::WindowsDrive => {
            let drive = address.prefix(1);
            let label = segments.first().cloned().unwrap_or_default();
            let mut crumbs = Vec::with_capacity(segments.len() + 1);
            if drive_list_reachable {
                crumbs.push(Crumb::link(DRIVES_LABEL, Address::drive_list()));
            }
            if segments.len() == 1 && !drive_list_reachable {
                crumbs.push(Crumb::current(label));
            } else {
                crumbs.push(Crumb::link(label, drive));
            }
            (crumbs, 1)
        }
        Scheme::Posix => (vec![Crumb::link(ROOT_LABEL, Address::posix_root())], 0),
    };

    for index in first_path_segment..segments.len() {
        let label = segments[index].clone();
        if index + 1 == segments.len() {
            crumbs.push(Crumb::current(label));
        } else {
            crumbs.push(Crumb::link(label, address.prefix(index + 1)));
        }
    }

    crumbs
}
