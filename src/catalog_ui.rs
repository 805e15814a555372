use crate::api::BooksApi;
use crate::book::{Book, BookId, DraftField, FileType, NewBook};
use crate::catalog::{actions, Action, AddModal, CatalogState, Selection, ViewStore};
use crate::opener::LinkOpener;
use dioxus::prelude::*;
use std::sync::Arc;

/// Capabilities the hosting shell builds once and provides to the catalog view
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn BooksApi>,
    pub opener: Arc<dyn LinkOpener>,
}

impl ViewStore for Signal<CatalogState> {
    fn update<R>(&mut self, f: impl FnOnce(&mut CatalogState) -> R) -> R {
        self.with_mut(f)
    }
}

#[component]
pub fn CatalogScreen() -> Element {
    let services = use_context::<Services>();
    let mut state = use_signal(CatalogState::new);

    // Initial fetch, once per mount
    let api = services.api.clone();
    use_hook(move || {
        spawn(async move {
            let mut store = state;
            actions::load(&mut store, api.as_ref()).await;
        })
    });

    let refresh = {
        let api = services.api.clone();
        move |_| {
            let api = api.clone();
            spawn(async move {
                let mut store = state;
                actions::load(&mut store, api.as_ref()).await;
            });
        }
    };

    let delete = {
        let api = services.api.clone();
        move |_| {
            let api = api.clone();
            spawn(async move {
                let mut store = state;
                actions::delete_selected(&mut store, api.as_ref()).await;
            });
        }
    };

    let submit = {
        let api = services.api.clone();
        move |_| {
            let api = api.clone();
            spawn(async move {
                let mut store = state;
                actions::submit_draft(&mut store, api.as_ref()).await;
            });
        }
    };

    let download = {
        let api = services.api.clone();
        let opener = services.opener.clone();
        move |_| {
            let mut store = state;
            actions::request_download(&mut store, api.as_ref(), opener.as_ref());
        }
    };

    let books = state.read().books().to_vec();
    let loading = state.read().is_pending(Action::Load);
    let last_error = state.read().last_error().map(str::to_string);
    let (detail_open, detail_book, missing_id) = match state.read().selection() {
        Selection::None => (false, None, None),
        Selection::Found(book) => (true, Some(book.clone()), None),
        Selection::Missing(book_id) => (true, None, Some(book_id.clone())),
    };
    let draft = match state.read().add() {
        AddModal::Closed => None,
        AddModal::Drafting { draft, .. } => Some(draft.clone()),
    };

    rsx! {
        div {
            class: "min-h-screen bg-gray-100 relative",

            header {
                class: "bg-white shadow-sm border-b",
                div {
                    class: "px-4 sm:px-6 lg:px-8 flex justify-between items-center py-4",
                    h1 {
                        class: "text-2xl font-bold text-gray-900",
                        "📚 Librarium"
                    }
                    button {
                        onclick: refresh,
                        disabled: loading,
                        class: format!(
                            "px-3 py-1 text-sm font-medium rounded-md {}",
                            if loading {
                                "bg-gray-200 text-gray-400 cursor-not-allowed"
                            } else {
                                "bg-gray-100 text-gray-700 hover:bg-gray-200"
                            }
                        ),
                        if loading { "Loading..." } else { "Refresh" }
                    }
                }
            }

            if let Some(message) = last_error {
                ErrorBanner {
                    message: message,
                    on_dismiss: move |_| state.write().dismiss_error(),
                }
            }

            main {
                class: "p-4",
                if books.is_empty() && !loading {
                    div {
                        class: "text-center py-12 text-gray-500",
                        "No books yet"
                    }
                }
                div {
                    class: "grid grid-cols-2 sm:grid-cols-3 md:grid-cols-4 lg:grid-cols-5 gap-4",
                    for book in books {
                        BookTile {
                            key: "{book.id}",
                            book: book.clone(),
                            on_open: move |book_id: BookId| state.write().open_detail(book_id),
                        }
                    }
                }
            }

            button {
                onclick: move |_| state.write().open_add(),
                title: "Add book",
                class: "fixed bottom-5 right-5 bg-green-500 text-white rounded-full w-10 h-10 flex items-center justify-center shadow-md hover:bg-green-600 transition",
                span { class: "text-2xl", style: "margin-bottom: 2px;", "+" }
            }

            if detail_open {
                BookDetailModal {
                    book: detail_book,
                    missing_id: missing_id,
                    file_type: state.read().file_type(),
                    deleting: state.read().is_pending(Action::Delete),
                    on_file_type: move |file_type: FileType| state.write().set_file_type(file_type),
                    on_download: download,
                    on_delete: delete,
                    on_close: move |_| state.write().close_detail(),
                }
            }

            if let Some(draft) = draft {
                AddBookModal {
                    draft: draft,
                    submitting: state.read().is_pending(Action::Create),
                    on_edit: move |(field, value): (DraftField, String)| state.write().edit_draft(field, value),
                    on_submit: submit,
                    on_close: move |_| state.write().close_add(),
                }
            }
        }
    }
}

#[component]
fn BookTile(book: Book, on_open: EventHandler<BookId>) -> Element {
    let book_id = book.id.clone();
    let author = book.author_or_blank().to_string();

    rsx! {
        div {
            class: "flex flex-col items-center",
            div {
                class: "cursor-pointer",
                onclick: move |_| on_open.call(book_id.clone()),
                if let Some(url) = book.cover() {
                    img {
                        src: "{url}",
                        alt: "{book.title}",
                        class: "h-48 w-32 object-cover mb-2 rounded shadow-md",
                    }
                } else {
                    div {
                        class: "h-48 w-32 bg-gray-200 mb-2 flex items-center justify-center rounded shadow-md",
                        span { class: "text-gray-500 text-sm", "No Image" }
                    }
                }
            }
            h2 { class: "font-medium text-sm text-center", "{book.title}" }
            p { class: "text-gray-500 text-xs text-center", "{author}" }
        }
    }
}

/// Overlay + dialog box shared by both modals. Clicking the backdrop or
/// pressing Escape requests a close.
#[component]
fn ModalFrame(title: String, on_close: EventHandler<()>, children: Element) -> Element {
    rsx! {
        div {
            class: "fixed inset-0 bg-gray-600 bg-opacity-50 overflow-y-auto h-full w-full z-50 flex items-center justify-center",
            tabindex: "0",
            autofocus: true,
            onmounted: move |evt| async move {
                if let Err(e) = evt.set_focus(true).await {
                    log::warn!("Could not focus dialog: {:?}", e);
                }
            },
            onclick: move |_| on_close.call(()),
            onkeydown: move |event| {
                if event.key() == Key::Escape {
                    on_close.call(());
                }
            },

            div {
                class: "bg-white rounded-lg shadow-xl max-w-md w-full mx-4",
                onclick: |e| e.stop_propagation(),

                div {
                    class: "flex items-center justify-between p-4 border-b border-gray-200",
                    h3 {
                        class: "text-lg font-medium text-gray-900",
                        "{title}"
                    }
                    button {
                        onclick: move |_| on_close.call(()),
                        class: "text-gray-400 hover:text-gray-600",
                        "✕"
                    }
                }

                div {
                    class: "p-4",
                    {children}
                }
            }
        }
    }
}

#[component]
fn BookDetailModal(
    #[props(!optional)] book: Option<Book>,
    #[props(!optional)] missing_id: Option<BookId>,
    file_type: FileType,
    deleting: bool,
    on_file_type: EventHandler<FileType>,
    on_download: EventHandler<()>,
    on_delete: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    let Some(book) = book else {
        let missing = missing_id.map(|id| id.to_string()).unwrap_or_default();
        return rsx! {
            ModalFrame {
                title: "Book not found".to_string(),
                on_close: on_close,
                p {
                    class: "text-sm text-gray-600",
                    "Book {missing} is no longer in the catalog."
                }
            }
        };
    };

    let author = book.author_or_blank().to_string();

    rsx! {
        ModalFrame {
            title: book.title.clone(),
            on_close: on_close,

            p { class: "text-sm text-gray-600 mb-4", "{author}" }

            if let Some(url) = book.cover() {
                img {
                    src: "{url}",
                    alt: "{book.title}",
                    class: "h-60 w-40 object-cover mb-4 rounded shadow-md",
                }
            }

            div {
                class: "mb-4",
                label {
                    r#for: "fileType",
                    class: "block text-gray-600 mb-1",
                    "File type"
                }
                select {
                    id: "fileType",
                    value: file_type.as_str(),
                    onchange: move |evt| match evt.value().parse::<FileType>() {
                        Ok(file_type) => on_file_type.call(file_type),
                        Err(e) => log::warn!("{}", e),
                    },
                    class: "w-full p-2 border rounded",
                    for option_type in FileType::ALL {
                        option {
                            value: option_type.as_str(),
                            selected: option_type == file_type,
                            {option_type.label()}
                        }
                    }
                }
            }

            div {
                class: "flex justify-between",
                button {
                    class: "bg-green-500 text-white px-4 py-2 rounded",
                    onclick: move |_| on_download.call(()),
                    "Download"
                }
                button {
                    class: format!(
                        "text-white px-4 py-2 rounded {}",
                        if deleting { "bg-red-300 cursor-not-allowed" } else { "bg-red-500" }
                    ),
                    disabled: deleting,
                    onclick: move |_| on_delete.call(()),
                    if deleting { "Deleting..." } else { "Delete" }
                }
            }
        }
    }
}

#[component]
fn DraftInput(
    label: String,
    field: DraftField,
    draft: NewBook,
    placeholder: String,
    on_edit: EventHandler<(DraftField, String)>,
) -> Element {
    let value = draft.get(field).to_string();

    rsx! {
        div {
            label {
                class: "block text-sm font-medium text-gray-700",
                "{label}"
            }
            input {
                r#type: "text",
                value: "{value}",
                oninput: move |evt| on_edit.call((field, evt.value())),
                class: "mt-1 block w-full border border-gray-300 rounded-md shadow-sm p-2",
                placeholder: "{placeholder}",
            }
        }
    }
}

#[component]
fn AddBookModal(
    draft: NewBook,
    submitting: bool,
    on_edit: EventHandler<(DraftField, String)>,
    on_submit: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    rsx! {
        ModalFrame {
            title: "Add book".to_string(),
            on_close: on_close,

            div {
                class: "space-y-4",
                DraftInput {
                    label: "Title".to_string(),
                    field: DraftField::Title,
                    draft: draft.clone(),
                    placeholder: "Dune".to_string(),
                    on_edit: on_edit,
                }
                DraftInput {
                    label: "Author".to_string(),
                    field: DraftField::Author,
                    draft: draft.clone(),
                    placeholder: "Frank Herbert".to_string(),
                    on_edit: on_edit,
                }
                DraftInput {
                    label: "Cover image URL".to_string(),
                    field: DraftField::CoverImageUrl,
                    draft: draft.clone(),
                    placeholder: "https://example.com/cover.jpg".to_string(),
                    on_edit: on_edit,
                }
            }

            div {
                class: "flex justify-end space-x-3 pt-4",
                button {
                    onclick: move |_| on_close.call(()),
                    class: "px-4 py-2 text-sm font-medium text-gray-700 bg-gray-100 hover:bg-gray-200 rounded-md transition-colors",
                    "Cancel"
                }
                button {
                    onclick: move |_| on_submit.call(()),
                    disabled: submitting,
                    class: format!(
                        "px-4 py-2 text-sm font-medium text-white rounded-md transition-colors {}",
                        if submitting { "bg-gray-400 cursor-not-allowed" } else { "bg-green-600 hover:bg-green-700" }
                    ),
                    if submitting { "Saving..." } else { "Save" }
                }
            }
        }
    }
}

#[component]
fn ErrorBanner(message: String, on_dismiss: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "fixed top-4 right-4 z-40 bg-red-50 border border-red-200 rounded-md p-4 max-w-md",
            div {
                class: "flex",
                div {
                    class: "ml-3",
                    p {
                        class: "text-sm font-medium text-red-800",
                        "Error"
                    }
                    p {
                        class: "text-sm text-red-700",
                        "{message}"
                    }
                }
                div {
                    class: "ml-auto pl-3",
                    button {
                        onclick: move |_| on_dismiss.call(()),
                        class: "inline-flex text-red-400 hover:text-red-600",
                        "✕"
                    }
                }
            }
        }
    }
}
