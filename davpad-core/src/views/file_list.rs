//! Breadcrumb-navigable directory listing with a create-file workflow.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use shared_types::{
    breadcrumbs, humanize_size, join_path, normalize_path, Breadcrumb, EditFile, Entry,
    EntryAction, EntryIcon,
};

use super::{Notice, Sequencer, Ticket, WRITE_FAILED_MESSAGE};
use crate::error::StoreResult;
use crate::store::{FileContents, ReadMode, SharedStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStatus {
    Loading,
    Loaded,
    /// The last fetch failed; the view offers a retry.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameValidity {
    Valid,
    Empty,
    InvalidCharacters,
    Duplicate,
}

impl NameValidity {
    pub fn is_valid(&self) -> bool {
        *self == NameValidity::Valid
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            NameValidity::Valid => None,
            NameValidity::Empty => Some("Please enter a file name."),
            NameValidity::InvalidCharacters => {
                Some("Please only use letters, numbers, underscores, dashes and dots.")
            }
            NameValidity::Duplicate => Some("This filename already exists."),
        }
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("valid file name pattern"))
}

/// Check a proposed file name against the allowed characters and the
/// basenames already present in the listing.
pub fn validate_new_name(name: &str, entries: &[Entry]) -> NameValidity {
    if name.is_empty() {
        NameValidity::Empty
    } else if !name_pattern().is_match(name) {
        NameValidity::InvalidCharacters
    } else if entries.iter().any(|entry| entry.basename == name) {
        NameValidity::Duplicate
    } else {
        NameValidity::Valid
    }
}

/// `idle -> naming -> submitting -> idle`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateFileState {
    Idle,
    Naming { name: String, validity: NameValidity },
    Submitting { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub path: String,
}

/// Result of clicking an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Navigate(String),
    Open(EditFile),
    Download(String),
}

/// Binary payload ready to be handed to the browser as a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub entry: Entry,
    pub icon: EntryIcon,
    pub action: EntryAction,
    pub size_label: Option<String>,
    pub size_title: Option<String>,
    pub last_modified: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateControls {
    pub action_label: &'static str,
    pub action_enabled: bool,
    pub input_visible: bool,
    pub input_enabled: bool,
    pub input_value: String,
    pub validation_message: Option<&'static str>,
    pub in_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListViewModel {
    pub directory: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub rows: Vec<EntryRow>,
    pub loading: bool,
    pub listing_error: Option<String>,
    pub create: CreateControls,
    pub notice: Option<Notice>,
}

pub struct FileListView {
    store: SharedStore,
    root_label: String,
    directory: String,
    entries: Vec<Entry>,
    listing: ListingStatus,
    create: CreateFileState,
    notice: Option<Notice>,
    listing_seq: Sequencer,
}

impl fmt::Debug for FileListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileListView")
            .field("root_label", &self.root_label)
            .field("directory", &self.directory)
            .field("entries", &self.entries.len())
            .field("listing", &self.listing)
            .field("create", &self.create)
            .finish_non_exhaustive()
    }
}

impl FileListView {
    /// A view at `/` that has not fetched anything yet; call [`Self::update`].
    pub fn new(store: SharedStore, root_label: impl Into<String>) -> Self {
        Self {
            store,
            root_label: root_label.into(),
            directory: "/".to_string(),
            entries: Vec::new(),
            listing: ListingStatus::Loading,
            create: CreateFileState::Idle,
            notice: None,
            listing_seq: Sequencer::default(),
        }
    }

    /// Construct and fetch the root listing.
    pub async fn open(store: SharedStore, root_label: impl Into<String>) -> Self {
        let mut view = Self::new(store, root_label);
        // Failures are recorded in the view and rendered with a retry.
        let _ = view.update().await;
        view
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn listing(&self) -> &ListingStatus {
        &self.listing
    }

    pub fn create_state(&self) -> &CreateFileState {
        &self.create
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    // ------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------

    /// Start a refresh of the current directory.
    pub fn begin_update(&mut self) -> (Ticket, String) {
        self.listing = ListingStatus::Loading;
        (self.listing_seq.issue(), self.directory.clone())
    }

    /// Apply a listing result. Results for superseded requests are dropped
    /// and `false` is returned.
    pub fn finish_update(&mut self, ticket: Ticket, result: StoreResult<Vec<Entry>>) -> bool {
        if !self.listing_seq.is_current(ticket) {
            tracing::debug!(directory = %self.directory, "Dropping stale directory listing");
            return false;
        }

        self.create = CreateFileState::Idle;
        match result {
            Ok(entries) => {
                tracing::debug!(directory = %self.directory, count = entries.len(), "Directory listed");
                self.entries = entries;
                self.listing = ListingStatus::Loaded;
            }
            Err(error) => {
                tracing::warn!(directory = %self.directory, error = %error, "Failed to list directory");
                self.entries.clear();
                self.listing = ListingStatus::Failed(error.to_string());
            }
        }
        true
    }

    /// Re-fetch the current directory and reset the view from scratch.
    pub async fn update(&mut self) -> StoreResult<()> {
        let (ticket, directory) = self.begin_update();
        let store = Arc::clone(&self.store);
        let result = store.list_directory(&directory).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.finish_update(ticket, result);
        outcome
    }

    /// Change directory; follow with [`Self::begin_update`].
    pub fn navigate(&mut self, path: &str) {
        self.directory = normalize_path(path);
        self.listing_seq.bump();
    }

    pub async fn navigate_to(&mut self, path: &str) -> StoreResult<()> {
        self.navigate(path);
        self.update().await
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    pub fn activate(&self, entry: &Entry) -> Activation {
        match entry.action() {
            EntryAction::Navigate => Activation::Navigate(entry.path.clone()),
            EntryAction::Edit => Activation::Open(EditFile {
                filename: entry.path.clone(),
            }),
            EntryAction::Download => Activation::Download(entry.path.clone()),
        }
    }

    pub fn finish_download(
        &mut self,
        path: &str,
        result: StoreResult<FileContents>,
    ) -> Option<Download> {
        match result {
            Ok(contents) => Some(Download {
                filename: shared_types::basename(path).to_string(),
                bytes: contents.into_bytes(),
            }),
            Err(error) => {
                tracing::warn!(path = %path, error = %error, "Failed to download file");
                self.notice = Some(Notice::error(super::READ_FAILED_MESSAGE));
                None
            }
        }
    }

    /// Fetch a non-editable file's bytes when its link is clicked.
    pub async fn download(&mut self, path: &str) -> Option<Download> {
        let store = Arc::clone(&self.store);
        let result = store.read_file(path, ReadMode::Binary).await;
        self.finish_download(path, result)
    }

    // ------------------------------------------------------------------
    // Create-file workflow
    // ------------------------------------------------------------------

    /// `idle -> naming`. Only possible once the listing is loaded, since
    /// duplicate detection needs it.
    pub fn begin_create(&mut self) -> bool {
        if self.create != CreateFileState::Idle || self.listing != ListingStatus::Loaded {
            return false;
        }
        self.create = CreateFileState::Naming {
            name: String::new(),
            validity: NameValidity::Empty,
        };
        true
    }

    /// Validate the name input on every keystroke while naming.
    pub fn set_new_name(&mut self, name: &str) -> Option<NameValidity> {
        let validity = validate_new_name(name, &self.entries);
        match &mut self.create {
            CreateFileState::Naming {
                name: current,
                validity: current_validity,
            } => {
                *current = name.to_string();
                *current_validity = validity;
                Some(validity)
            }
            _ => None,
        }
    }

    /// `naming -> submitting` for a valid name.
    pub fn confirm_create(&mut self) -> Option<CreateRequest> {
        let CreateFileState::Naming { name, .. } = &self.create else {
            return None;
        };
        if !validate_new_name(name, &self.entries).is_valid() {
            return None;
        }

        let name = name.clone();
        let path = join_path(&self.directory, &name);
        self.create = CreateFileState::Submitting { name: name.clone() };
        Some(CreateRequest { name, path })
    }

    /// The single action button: opens the name input when idle and
    /// confirms when naming; does nothing while submitting.
    pub fn press_create_action(&mut self) -> Option<CreateRequest> {
        match self.create {
            CreateFileState::Idle => {
                self.begin_create();
                None
            }
            CreateFileState::Naming { .. } => self.confirm_create(),
            CreateFileState::Submitting { .. } => None,
        }
    }

    pub fn cancel_create(&mut self) {
        if matches!(self.create, CreateFileState::Naming { .. }) {
            self.create = CreateFileState::Idle;
        }
    }

    /// `submitting -> idle`. Returns `true` when the listing should be refreshed.
    ///
    /// The request is settled even if a refresh or navigation already reset
    /// the workflow while the write was in flight.
    pub fn finish_create(&mut self, request: &CreateRequest, result: StoreResult<()>) -> bool {
        if matches!(&self.create, CreateFileState::Submitting { name } if *name == request.name) {
            self.create = CreateFileState::Idle;
        }

        match result {
            Ok(()) => {
                tracing::info!(path = %request.path, "Created file");
                true
            }
            Err(error) => {
                tracing::warn!(path = %request.path, error = %error, "Error while creating file");
                self.notice = Some(Notice::error(WRITE_FAILED_MESSAGE));
                false
            }
        }
    }

    /// Submit the named file as an empty file and refresh on success.
    ///
    /// Returns `None` if the workflow was not in a confirmable state.
    pub async fn create_file(&mut self) -> Option<StoreResult<()>> {
        let request = self.confirm_create()?;
        let store = Arc::clone(&self.store);
        let result = store.write_file(&request.path, b"").await;
        let outcome = result.clone();
        if self.finish_create(&request, result) {
            let _ = self.update().await;
        }
        Some(outcome)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn view_model(&self) -> FileListViewModel {
        let rows = self
            .entries
            .iter()
            .map(|entry| EntryRow {
                icon: entry.icon(),
                action: entry.action(),
                size_label: entry
                    .is_file()
                    .then(|| humanize_size(entry.size.unwrap_or(0))),
                size_title: entry
                    .is_file()
                    .then(|| format!("{} bytes", entry.size.unwrap_or(0))),
                last_modified: entry.last_modified.clone().unwrap_or_default(),
                entry: entry.clone(),
            })
            .collect();

        let create = match &self.create {
            CreateFileState::Idle => CreateControls {
                action_label: "Create new file",
                action_enabled: self.listing == ListingStatus::Loaded,
                input_visible: false,
                input_enabled: false,
                input_value: String::new(),
                validation_message: None,
                in_progress: false,
            },
            CreateFileState::Naming { name, validity } => CreateControls {
                action_label: "Create new file",
                action_enabled: validity.is_valid(),
                input_visible: true,
                input_enabled: true,
                input_value: name.clone(),
                validation_message: if name.is_empty() { None } else { validity.message() },
                in_progress: false,
            },
            CreateFileState::Submitting { name } => CreateControls {
                action_label: "Creating new file",
                action_enabled: false,
                input_visible: true,
                input_enabled: false,
                input_value: name.clone(),
                validation_message: None,
                in_progress: true,
            },
        };

        FileListViewModel {
            directory: self.directory.clone(),
            breadcrumbs: breadcrumbs(&self.directory, &self.root_label),
            rows,
            loading: self.listing == ListingStatus::Loading,
            listing_error: match &self.listing {
                ListingStatus::Failed(message) => Some(message.clone()),
                _ => None,
            },
            create,
            notice: self.notice.clone(),
        }
    }
}
