//! Browse session - the stateful controller behind the path picker
//!
//! Navigation is request/response: a request never changes what is displayed.
//! Only an authoritative listing does, and only if it answers the newest
//! request of the session that is still open.

use crate::backend::Backend;
use crate::config::BrowseConfig;
use crate::error::{BackendError, BrowseError};
use crate::events::{EventSink, UiEvent};
use app_fs::{
    classify, drive_list_reachable, parent_of, Address, ListingView, Platform, SelectionIntent, DRIVE_LIST_SENTINEL,
};
use ipc_proto::{ListingResponse, Mode};
use std::sync::Arc;

/// Where to navigate
#[derive(Debug, Clone)]
pub enum NavTarget {
    Address(Address),
    /// Typed or backend supplied path, classified in the session's mode
    Raw(String),
}

impl From<Address> for NavTarget {
    fn from(address: Address) -> Self {
        NavTarget::Address(address)
    }
}

impl From<&str> for NavTarget {
    fn from(raw: &str) -> Self {
        NavTarget::Raw(raw.to_string())
    }
}

impl From<String> for NavTarget {
    fn from(raw: String) -> Self {
        NavTarget::Raw(raw)
    }
}

/// Parameters of a browse action
#[derive(Debug, Clone)]
pub struct OpenRequest {
    /// Input that receives the selection
    pub target_field_id: String,
    pub mode: Mode,
    /// Current value of the target input; empty means "use the default"
    pub current_field_value: String,
    pub intent: SelectionIntent,
}

/// An issued listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTicket {
    pub seq: u64,
    pub path: String,
}

/// What happened to a listing response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    /// The view now shows this listing
    Displayed,
    /// Superseded, answered a closed session, or nothing to do
    Ignored,
}

/// The value handed back to the invoking input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub target_field_id: String,
    pub value: String,
}

#[derive(Debug, Clone)]
struct PendingListing {
    seq: u64,
    requested: Address,
}

/// State of one open browse interaction
#[derive(Debug, Clone)]
pub struct BrowseSession {
    target_field_id: String,
    mode: Mode,
    platform: Platform,
    intent: SelectionIntent,
    current: Address,
    listing: Option<ListingView>,
    pending: Option<PendingListing>,
}

impl BrowseSession {
    fn new(request: OpenRequest, platform: Platform, start: Address) -> Self {
        Self {
            target_field_id: request.target_field_id,
            mode: request.mode,
            platform,
            intent: request.intent,
            current: start,
            listing: None,
            pending: None,
        }
    }

    pub fn target_field_id(&self) -> &str {
        &self.target_field_id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn intent(&self) -> SelectionIntent {
        self.intent
    }

    /// Displayed location
    pub fn current(&self) -> &Address {
        &self.current
    }

    /// Last authoritative listing
    pub fn listing(&self) -> Option<&ListingView> {
        self.listing.as_ref()
    }

    /// Is a listing request in flight?
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Can this session show the drive list?
    pub fn drive_list_reachable(&self) -> bool {
        drive_list_reachable(self.mode, self.platform.is_windows())
    }

    /// Classify a path in this session's mode
    pub fn classify(&self, raw: &str) -> Address {
        classify(raw, self.mode, self.platform.is_windows())
    }
}

/// Owns the single live browse session
pub struct BrowseController<B> {
    backend: Arc<B>,
    events: EventSink,
    platform: Platform,
    config: BrowseConfig,
    session: Option<BrowseSession>,
    next_seq: u64,
}

impl<B: Backend> BrowseController<B> {
    pub fn new(backend: Arc<B>, events: EventSink, platform: Platform, config: BrowseConfig) -> Self {
        Self {
            backend,
            events,
            platform,
            config,
            session: None,
            next_seq: 0,
        }
    }

    pub fn session(&self) -> Option<&BrowseSession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Start location when the target input is empty
    fn default_start(&self, mode: Mode) -> &str {
        if drive_list_reachable(mode, self.platform.is_windows()) {
            DRIVE_LIST_SENTINEL
        } else {
            self.config.default_path.as_str()
        }
    }

    /// Open a browse session and load its starting directory
    ///
    /// In remote mode the backend must report a live connection first;
    /// otherwise nothing opens and no listing is requested.
    pub async fn open(&mut self, request: OpenRequest) -> Result<ListingOutcome, BrowseError> {
        if request.target_field_id.trim().is_empty() {
            return Err(BrowseError::EmptyTargetField);
        }

        if request.mode == Mode::Remote {
            match self.backend.connection_status().await {
                Ok(status) if !status.connected => {
                    tracing::warn!("Browse refused: remote mode without a connection");
                    self.events.warning("Please connect to the SSH server first");
                    self.events.emit(UiEvent::ConnectionChanged {
                        connected: false,
                        mode: status.mode,
                    });
                    return Err(BrowseError::ConnectionRequired);
                }
                Ok(_) => {}
                Err(e) => {
                    self.events.error(format!("Failed to check connection status: {}", e));
                    return Err(e.into());
                }
            }
        }

        let start_raw = if request.current_field_value.trim().is_empty() {
            self.default_start(request.mode).to_string()
        } else {
            request.current_field_value.clone()
        };
        let start = classify(&start_raw, request.mode, self.platform.is_windows());

        if let Some(previous) = self.session.take() {
            tracing::debug!(field = %previous.target_field_id, "Discarding previous browse session");
        }
        tracing::info!(field = %request.target_field_id, mode = %request.mode, start = %start, "Browse session opened");
        self.session = Some(BrowseSession::new(request, self.platform, start.clone()));

        self.navigate(start).await
    }

    /// Request a listing and display it once it arrives
    pub async fn navigate(&mut self, target: impl Into<NavTarget>) -> Result<ListingOutcome, BrowseError> {
        let ticket = self.begin_navigate(target)?;
        let response = self.backend.list_directory(&ticket.path).await;
        self.apply_listing(ticket.seq, response)
    }

    /// Issue a listing request; the displayed location stays as it is
    ///
    /// Any earlier request of this session becomes stale.
    pub fn begin_navigate(&mut self, target: impl Into<NavTarget>) -> Result<ListingTicket, BrowseError> {
        let session = self.session.as_mut().ok_or(BrowseError::NoSession)?;

        let requested = match target.into() {
            NavTarget::Address(address) => address,
            NavTarget::Raw(raw) => session.classify(&raw),
        };

        self.next_seq += 1;
        let seq = self.next_seq;
        let path = requested.to_path_string();
        tracing::debug!(seq, path = %path, "Listing requested");

        session.pending = Some(PendingListing { seq, requested });
        Ok(ListingTicket { seq, path })
    }

    /// Apply the response to request `seq`
    ///
    /// Responses to superseded requests, or arriving after the session closed,
    /// are ignored.
    pub fn apply_listing(
        &mut self,
        seq: u64,
        response: Result<ListingResponse, BackendError>,
    ) -> Result<ListingOutcome, BrowseError> {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(seq, "Listing arrived after the browse session closed");
            return Ok(ListingOutcome::Ignored);
        };

        let pending = match session.pending.take() {
            Some(pending) if pending.seq == seq => pending,
            other => {
                tracing::debug!(seq, "Discarding stale listing response");
                session.pending = other;
                return Ok(ListingOutcome::Ignored);
            }
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                self.events.error(format!("Failed to browse directory: {}", e));
                return Err(e.into());
            }
        };

        match response.into_result() {
            Ok(listing) => {
                let current = if listing.current_path.is_empty() {
                    pending.requested
                } else {
                    session.classify(&listing.current_path)
                };
                tracing::debug!(seq, current = %current, items = listing.items.len(), "Listing displayed");

                session.listing = Some(ListingView::build(
                    current.clone(),
                    listing.items,
                    session.mode,
                    session.platform,
                    session.intent,
                ));
                session.current = current;
                Ok(ListingOutcome::Displayed)
            }
            Err(message) => {
                let mode = session.mode;
                self.events.error(message.clone());

                if self.config.is_connection_required(&message) {
                    tracing::warn!(%mode, "Listing requires a connection, closing browse view");
                    self.events.emit(UiEvent::ConnectionChanged {
                        connected: false,
                        mode,
                    });
                    self.end_session("connection lost");
                }
                Err(BrowseError::ListingFailed(message))
            }
        }
    }

    /// Navigate to a path typed into the path input
    pub async fn submit_path_input(&mut self, text: &str) -> Result<ListingOutcome, BrowseError> {
        if !self.is_open() {
            return Err(BrowseError::NoSession);
        }

        let text = text.trim();
        if text.is_empty() {
            self.events.warning("Please enter a valid path");
            return Err(BrowseError::EmptyPath);
        }
        self.navigate(text).await
    }

    /// Drill into a listed directory
    pub async fn enter(&mut self, item_path: &str) -> Result<ListingOutcome, BrowseError> {
        let session = self.session.as_ref().ok_or(BrowseError::NoSession)?;
        let is_file = session
            .listing
            .as_ref()
            .and_then(|listing| listing.find_item(item_path))
            .map_or(false, |item| !item.is_dir);
        if is_file {
            return Err(BrowseError::InvalidSelection(format!("{} is not a directory", item_path)));
        }
        self.navigate(item_path).await
    }

    /// Navigate to the parent of the displayed location
    pub async fn go_up(&mut self) -> Result<ListingOutcome, BrowseError> {
        let session = self.session.as_ref().ok_or(BrowseError::NoSession)?;
        if !session.current.has_parent() {
            return Ok(ListingOutcome::Ignored);
        }
        let parent = parent_of(&session.current);
        // a drive root is the top when the drive list is out of reach
        if parent.is_drive_list() && !session.drive_list_reachable() {
            return Ok(ListingOutcome::Ignored);
        }
        self.navigate(parent).await
    }

    /// Jump to a breadcrumb of the displayed listing
    pub async fn jump_to_crumb(&mut self, index: usize) -> Result<ListingOutcome, BrowseError> {
        let session = self.session.as_ref().ok_or(BrowseError::NoSession)?;
        let target = session
            .listing
            .as_ref()
            .and_then(|listing| listing.breadcrumbs().get(index))
            .and_then(|crumb| crumb.target.clone());

        match target {
            Some(address) => self.navigate(address).await,
            None => Ok(ListingOutcome::Ignored),
        }
    }

    /// Show the drive list (local Windows only)
    pub async fn show_drives(&mut self) -> Result<ListingOutcome, BrowseError> {
        let session = self.session.as_ref().ok_or(BrowseError::NoSession)?;
        if !session.drive_list_reachable() {
            return Ok(ListingOutcome::Ignored);
        }
        self.navigate(Address::drive_list()).await
    }

    /// Complete the session with a listed file
    pub fn confirm_selection(&mut self, item_path: &str) -> Result<Selection, BrowseError> {
        let session = self.session.as_ref().ok_or(BrowseError::NoSession)?;

        if session.intent != SelectionIntent::FileOrDirectory {
            return Err(BrowseError::InvalidSelection(format!(
                "{} (this field only accepts directories)",
                item_path
            )));
        }

        let is_listed_file = session
            .listing
            .as_ref()
            .and_then(|listing| listing.find_item(item_path))
            .map_or(false, |item| !item.is_dir);
        if !is_listed_file {
            return Err(BrowseError::InvalidSelection(format!("{} is not a listed file", item_path)));
        }

        let selection = Selection {
            target_field_id: session.target_field_id.clone(),
            value: item_path.to_string(),
        };
        self.end_session("file selected");
        Ok(selection)
    }

    /// Complete the session with the displayed directory
    pub fn confirm_current_directory(&mut self) -> Result<Selection, BrowseError> {
        let session = self.session.as_ref().ok_or(BrowseError::NoSession)?;

        if session.current.is_drive_list() {
            return Err(BrowseError::SyntheticLocation);
        }

        let selection = Selection {
            target_field_id: session.target_field_id.clone(),
            value: session.current.to_path_string(),
        };
        self.end_session("directory selected");
        Ok(selection)
    }

    /// Close without a selection
    pub fn cancel(&mut self) {
        self.end_session("cancelled");
    }

    fn end_session(&mut self, reason: &str) {
        if let Some(session) = self.session.take() {
            tracing::info!(field = %session.target_field_id, reason, "Browse session closed");
            self.events.emit(UiEvent::BrowseClosed);
        }
    }
}
