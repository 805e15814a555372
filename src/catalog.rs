use std::fmt::Display;

use url::Url;

use crate::api::{ApiError, BooksApi};
use crate::book::{Book, BookId, DraftField, FileType, NewBook};
use crate::opener::LinkOpener;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailModal {
    #[default]
    Closed,
    Viewing {
        book_id: BookId,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AddModal {
    #[default]
    Closed,
    Drafting {
        draft: NewBook,
        session: u64,
    },
}

/// Remote operations that are guarded against running twice at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Delete,
    Create,
}

/// What the detail modal should show, re-derived from the current collection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    None,
    Found(&'a Book),
    /// The viewed id is no longer in the collection
    Missing(&'a BookId),
}

/// View state of the catalog window.
///
/// `books` only ever changes through [`CatalogState::apply_loaded`]; deletes and
/// creates never patch it locally, they ask for a reload instead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogState {
    books: Vec<Book>,
    detail: DetailModal,
    add: AddModal,
    file_type: FileType,
    latest_load: u64,
    add_sessions: u64,
    load_pending: bool,
    delete_pending: bool,
    create_pending: bool,
    last_error: Option<String>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn detail(&self) -> &DetailModal {
        &self.detail
    }

    pub fn add(&self) -> &AddModal {
        &self.add
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_pending(&self, action: Action) -> bool {
        match action {
            Action::Load => self.load_pending,
            Action::Delete => self.delete_pending,
            Action::Create => self.create_pending,
        }
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    fn record_failure(&mut self, context: &str, error: &dyn Display) {
        log::error!("{}: {}", context, error);
        self.last_error = Some(format!("{}: {}", context, error));
    }

    // -- Collection --

    /// Issue a load ticket. A user refresh is refused while another load is
    /// pending; a `forced` load (after a mutation) supersedes it instead.
    pub fn begin_load(&mut self, forced: bool) -> Option<u64> {
        if self.load_pending && !forced {
            log::warn!("Load already in progress, ignoring request");
            return None;
        }
        self.latest_load += 1;
        self.load_pending = true;
        Some(self.latest_load)
    }

    /// Apply the outcome of load `ticket`. Results of superseded loads are dropped.
    pub fn apply_loaded(&mut self, ticket: u64, result: Result<Vec<Book>, ApiError>) {
        if ticket != self.latest_load {
            log::info!("Discarding result of superseded load #{}", ticket);
            return;
        }
        self.load_pending = false;

        match result {
            Ok(books) => {
                log::info!("Collection replaced with {} books", books.len());
                self.books = books;
                self.last_error = None;
            }
            Err(e) => self.record_failure("Error fetching books", &e),
        }
    }

    // -- Detail modal --

    pub fn open_detail(&mut self, book_id: BookId) {
        self.detail = DetailModal::Viewing { book_id };
    }

    pub fn close_detail(&mut self) {
        self.detail = DetailModal::Closed;
    }

    pub fn selection(&self) -> Selection<'_> {
        match &self.detail {
            DetailModal::Closed => Selection::None,
            DetailModal::Viewing { book_id } => self
                .books
                .iter()
                .find(|book| &book.id == book_id)
                .map(Selection::Found)
                .unwrap_or(Selection::Missing(book_id)),
        }
    }

    pub fn set_file_type(&mut self, file_type: FileType) {
        self.file_type = file_type;
    }

    /// Book and format to download, if the detail modal shows a known book
    pub fn download_target(&self) -> Option<(BookId, FileType)> {
        match self.selection() {
            Selection::Found(book) => Some((book.id.clone(), self.file_type)),
            _ => None,
        }
    }

    pub fn record_download_failure(&mut self, error: &dyn Display) {
        self.record_failure("Error opening download", error);
    }

    pub fn begin_delete(&mut self) -> Option<BookId> {
        let DetailModal::Viewing { book_id } = &self.detail else {
            return None;
        };
        if self.delete_pending {
            log::warn!("Delete already in progress, ignoring request");
            return None;
        }
        self.delete_pending = true;
        Some(book_id.clone())
    }

    /// Returns true when the collection should be reloaded.
    pub fn finish_delete(&mut self, book_id: &BookId, result: Result<(), ApiError>) -> bool {
        self.delete_pending = false;

        match result {
            Ok(()) => {
                log::info!("Book with ID {} deleted successfully", book_id);
                if matches!(&self.detail, DetailModal::Viewing { book_id: viewing } if viewing == book_id)
                {
                    self.close_detail();
                }
                self.last_error = None;
                true
            }
            Err(e) => {
                self.record_failure("Error deleting book", &e);
                false
            }
        }
    }

    // -- Add modal --

    /// Start a fresh draft. Every opening gets its own session number so a
    /// late submit completion cannot close a newer draft.
    pub fn open_add(&mut self) {
        self.add_sessions += 1;
        self.add = AddModal::Drafting {
            draft: NewBook::default(),
            session: self.add_sessions,
        };
    }

    pub fn close_add(&mut self) {
        self.add = AddModal::Closed;
    }

    pub fn draft(&self) -> Option<&NewBook> {
        match &self.add {
            AddModal::Closed => None,
            AddModal::Drafting { draft, .. } => Some(draft),
        }
    }

    pub fn edit_draft(&mut self, field: DraftField, value: String) {
        if let AddModal::Drafting { draft, .. } = &mut self.add {
            draft.set(field, value);
        }
    }

    /// Draft to send and the add session it belongs to
    pub fn begin_submit(&mut self) -> Option<(u64, NewBook)> {
        let AddModal::Drafting { draft, session } = &self.add else {
            return None;
        };
        if self.create_pending {
            log::warn!("Create already in progress, ignoring request");
            return None;
        }
        self.create_pending = true;
        Some((*session, draft.clone()))
    }

    /// Returns true when the collection should be reloaded.
    pub fn finish_submit(&mut self, session: u64, result: Result<(), ApiError>) -> bool {
        self.create_pending = false;

        match result {
            Ok(()) => {
                log::info!("Book created successfully");
                if matches!(&self.add, AddModal::Drafting { session: current, .. } if *current == session)
                {
                    self.close_add();
                }
                self.last_error = None;
                true
            }
            Err(e) => {
                self.record_failure("Error adding book", &e);
                false
            }
        }
    }
}

/// Somewhere a [`CatalogState`] lives. Updates are short synchronous closures so
/// no borrow of the state is held across an `.await`.
pub trait ViewStore {
    fn update<R>(&mut self, f: impl FnOnce(&mut CatalogState) -> R) -> R;
}

impl ViewStore for CatalogState {
    fn update<R>(&mut self, f: impl FnOnce(&mut CatalogState) -> R) -> R {
        f(self)
    }
}

/// Async drivers for the remote side of each user action.
pub mod actions {
    use super::*;

    async fn run_load<S: ViewStore>(store: &mut S, api: &dyn BooksApi, forced: bool) {
        let Some(ticket) = store.update(|state| state.begin_load(forced)) else {
            return;
        };
        let result = api.list_books().await;
        store.update(|state| state.apply_loaded(ticket, result));
    }

    /// Fetch the whole collection (mount and manual refresh)
    pub async fn load<S: ViewStore>(store: &mut S, api: &dyn BooksApi) {
        run_load(store, api, false).await;
    }

    pub async fn delete_selected<S: ViewStore>(store: &mut S, api: &dyn BooksApi) {
        let Some(book_id) = store.update(|state| state.begin_delete()) else {
            return;
        };
        let result = api.delete_book(&book_id).await;
        if store.update(|state| state.finish_delete(&book_id, result)) {
            run_load(store, api, true).await;
        }
    }

    pub async fn submit_draft<S: ViewStore>(store: &mut S, api: &dyn BooksApi) {
        let Some((session, draft)) = store.update(|state| state.begin_submit()) else {
            return;
        };
        let result = api.create_book(&draft).await;
        if store.update(|state| state.finish_submit(session, result)) {
            run_load(store, api, true).await;
        }
    }

    /// Open the download URL of the viewed book in the requested format
    pub fn request_download<S: ViewStore>(
        store: &mut S,
        api: &dyn BooksApi,
        opener: &dyn LinkOpener,
    ) -> Option<Url> {
        let (book_id, file_type) = store.update(|state| state.download_target())?;

        let url = match api.download_url(&book_id, file_type) {
            Ok(url) => url,
            Err(e) => {
                store.update(|state| state.record_download_failure(&e));
                return None;
            }
        };

        match opener.open(&url) {
            Ok(()) => Some(url),
            Err(e) => {
                store.update(|state| state.record_download_failure(&e));
                None
            }
        }
    }
}
