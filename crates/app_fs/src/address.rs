//! Address - scheme-tagged path handling for POSIX and Windows drive targets

use ipc_proto::Mode;
use serde::{Deserialize, Serialize};

/// Sentinel the listing backend understands as "list the drives"
pub const DRIVE_LIST_SENTINEL: &str = "drives";

/// Path syntax family of an [`Address`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    /// `/`-rooted absolute path (remote targets, Unix hosts)
    Posix,
    /// `X:`-rooted path on a Windows host
    WindowsDrive,
    /// Synthetic list of available drives; not a real location
    WindowsRoot,
}

/// Client platform, decides whether the drive list is reachable in local mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// Platform this client was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

/// A normalized filesystem location
///
/// Equality ignores `raw`: two inputs that normalize to the same segments in
/// the same scheme are the same address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    scheme: Scheme,
    /// Input this address was classified from
    raw: String,
    /// Path components; segment 0 is the drive (`C:`) for `WindowsDrive`
    segments: Vec<String>,
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme && self.segments == other.segments
    }
}

impl Eq for Address {}

impl Address {
    /// The synthetic drive list
    pub fn drive_list() -> Self {
        Self {
            scheme: Scheme::WindowsRoot,
            raw: DRIVE_LIST_SENTINEL.to_string(),
            segments: Vec::new(),
        }
    }

    /// POSIX `/`
    pub fn posix_root() -> Self {
        Self {
            scheme: Scheme::Posix,
            raw: "/".to_string(),
            segments: Vec::new(),
        }
    }

    /// Build from already normalized segments
    fn from_segments(scheme: Scheme, segments: Vec<String>) -> Self {
        let mut address = Self {
            scheme,
            raw: String::new(),
            segments,
        };
        address.raw = address.to_path_string();
        address
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last path component, if any
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// True for the drive list
    pub fn is_drive_list(&self) -> bool {
        self.scheme == Scheme::WindowsRoot
    }

    /// True for `X:/`
    pub fn is_drive_root(&self) -> bool {
        self.scheme == Scheme::WindowsDrive && self.segments.len() == 1
    }

    /// Whether going up leads somewhere else
    pub fn has_parent(&self) -> bool {
        match self.scheme {
            Scheme::WindowsRoot => false,
            Scheme::WindowsDrive => true,
            Scheme::Posix => !self.segments.is_empty(),
        }
    }

    /// Serialized form sent to the backend and written into input fields
    pub fn to_path_string(&self) -> String {
        match self.scheme {
            Scheme::WindowsRoot => DRIVE_LIST_SENTINEL.to_string(),
            Scheme::WindowsDrive => {
                let joined = self.segments.join("/");
                if self.segments.len() == 1 {
                    format!("{}/", joined)
                } else {
                    joined
                }
            }
            Scheme::Posix => format!("/{}", self.segments.join("/")),
        }
    }

    /// Parent address, see [`parent_of`]
    pub fn parent(&self) -> Self {
        parent_of(self)
    }

    /// Address of the first `len` segments in this scheme
    pub(crate) fn prefix(&self, len: usize) -> Self {
        let len = len.min(self.segments.len());
        Self::from_segments(self.scheme, self.segments[..len].to_vec())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_path_string())
    }
}

/// Drive letter of a `X:` prefixed input, uppercased
fn drive_letter(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    let letter = chars.next()?;
    if letter.is_ascii_alphabetic() && chars.next() == Some(':') {
        Some(letter.to_ascii_uppercase())
    } else {
        None
    }
}

fn split_components<'a>(path: &'a str, separators: &'a [char]) -> impl Iterator<Item = String> + 'a {
    path.split(separators)
        .filter(|part| !part.is_empty() && *part != ".")
        .map(str::to_string)
}

/// The drive list only exists for local access on a Windows client
pub fn drive_list_reachable(mode: Mode, platform_is_windows: bool) -> bool {
    mode == Mode::Local && platform_is_windows
}

/// Classify a path string into an [`Address`]
pub fn classify(raw: &str, mode: Mode, platform_is_windows: bool) -> Address {
    let trimmed = raw.trim();

    if drive_list_reachable(mode, platform_is_windows) && matches!(trimmed, "" | "." | "/" | DRIVE_LIST_SENTINEL) {
        return Address {
            scheme: Scheme::WindowsRoot,
            raw: raw.to_string(),
            segments: Vec::new(),
        };
    }

    if let Some(letter) = drive_letter(trimmed) {
        let rest = &trimmed[2..];
        let mut segments = vec![format!("{}:", letter)];
        segments.extend(split_components(rest, &['/', '\\']));
        return Address {
            scheme: Scheme::WindowsDrive,
            raw: raw.to_string(),
            segments,
        };
    }

    Address {
        scheme: Scheme::Posix,
        raw: raw.to_string(),
        segments: split_components(trimmed, &['/']).collect(),
    }
}

/// Parent of an address
///
/// The drive list and POSIX `/` are their own parents; a drive root goes up to
/// the drive list.
pub fn parent_of(address: &Address) -> Address {
    match address.scheme {
        Scheme::WindowsRoot => address.clone(),
        Scheme::WindowsDrive if address.segments.len() <= 1 => Address::drive_list(),
        Scheme::WindowsDrive | Scheme::Posix => {
            if address.segments.is_empty() {
                return Address::posix_root();
            }
            address.prefix(address.segments.len() - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_win(raw: &str) -> Address {
        classify(raw, Mode::Local, true)
    }

    #[test]
    fn test_drive_list_inputs() {
        for raw in ["", ".", "/", "drives", "  "] {
            let address = local_win(raw);
            assert_eq!(address.scheme(), Scheme::WindowsRoot, "input {:?}", raw);
            assert!(address.segments().is_empty());
            assert_eq!(address.raw(), raw);
        }
    }

    #[test]
    fn test_drive_list_unreachable_outside_local_windows() {
        assert_eq!(classify("", Mode::Remote, true).scheme(), Scheme::Posix);
        assert_eq!(classify("/", Mode::Local, false).scheme(), Scheme::Posix);
        assert_eq!(classify("drives", Mode::Remote, true).to_path_string(), "/drives");
    }

    #[test]
    fn test_windows_drive_segments() {
        let address = local_win("C:/Users/me");
        assert_eq!(address.scheme(), Scheme::WindowsDrive);
        assert_eq!(address.segments(), ["C:", "Users", "me"]);

        let address = local_win("d:\\Data\\\\photos\\");
        assert_eq!(address.segments(), ["D:", "Data", "photos"]);
        assert_eq!(address.to_path_string(), "D:/Data/photos");

        let address = classify("e:", Mode::Remote, false);
        assert_eq!(address.scheme(), Scheme::WindowsDrive);
        assert_eq!(address.to_path_string(), "E:/");
    }

    #[test]
    fn test_posix_normalization() {
        let address = classify("//home//user/./docs/", Mode::Remote, false);
        assert_eq!(address.scheme(), Scheme::Posix);
        assert_eq!(address.segments(), ["home", "user", "docs"]);
        assert_eq!(address.to_path_string(), "/home/user/docs");

        // Relative input still serializes absolute
        assert_eq!(classify("var/log", Mode::Remote, false).to_path_string(), "/var/log");
    }

    #[test]
    fn test_posix_root_is_its_own_parent() {
        let root = classify("/", Mode::Remote, false);
        assert_eq!(parent_of(&root), root);
        assert!(!root.has_parent());
    }

    #[test]
    fn test_posix_parent() {
        let address = classify("/home/user", Mode::Remote, false);
        assert_eq!(parent_of(&address).to_path_string(), "/home");
        assert_eq!(parent_of(&parent_of(&address)), Address::posix_root());
    }

    #[test]
    fn test_drive_root_parent_is_drive_list() {
        for raw in ["C:", "C:/", "c:\\"] {
            let parent = parent_of(&local_win(raw));
            assert_eq!(parent.scheme(), Scheme::WindowsRoot);
            assert_eq!(local_win(&parent.to_path_string()).scheme(), Scheme::WindowsRoot);
        }
    }

    #[test]
    fn test_drive_parent_keeps_trailing_separator() {
        let parent = parent_of(&local_win("C:/Users"));
        assert_eq!(parent.to_path_string(), "C:/");
        assert!(local_win(parent.raw()).is_drive_root());

        let parent = parent_of(&local_win("C:/Users/me"));
        assert_eq!(parent.to_path_string(), "C:/Users");
    }

    #[test]
    fn test_drive_list_is_its_own_parent() {
        let root = local_win("");
        assert_eq!(parent_of(&root), root);
        assert!(!root.has_parent());
        assert_eq!(root.to_path_string(), DRIVE_LIST_SENTINEL);
    }

    #[test]
    fn test_equality_ignores_raw() {
        assert_eq!(classify("/a//b/", Mode::Remote, false), classify("/a/b", Mode::Remote, false));
        assert_ne!(classify("/a", Mode::Remote, false), classify("A:", Mode::Remote, false));
    }
}
