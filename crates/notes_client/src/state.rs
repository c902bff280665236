//! crates/notes_client/src/state.rs
//!
//! The client's application state as an immutable value, and the pure reducer
//! that derives the next state from the current one and an `Action`.

use notes_core::domain::{Note, NoteDraft};
use uuid::Uuid;

/// The save-status indicator.
///
/// `Saved -> Unsaved` on edit, `Unsaved -> Saving` on a save attempt,
/// `Saving -> Saved | Error` on the result; any edit goes back to `Unsaved`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Saved,
    Unsaved,
    Saving,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A transient notification. `id` grows with every toast shown, so a repeated
/// message is still recognisable as a new toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// The text currently in the editor pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    pub title: String,
    pub content: String,
}

impl Editor {
    /// The draft sent to the server: both fields trimmed.
    pub fn draft(&self) -> NoteDraft {
        NoteDraft::new(self.title.trim(), self.content.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    /// The last fetched list, replaced wholesale on every reload.
    pub notes: Vec<Note>,
    /// The note open in the editor; `None` for a fresh, never-saved note.
    pub current: Option<Uuid>,
    pub editor: Editor,
    pub search: String,
    pub has_changes: bool,
    /// Incremented on every edit; lets a save result tell whether the editor moved on.
    pub revision: u64,
    pub status: SaveStatus,
    pub loading: bool,
    pub toast: Option<Toast>,
    toasts_shown: u64,
    /// Set while the delete confirmation is showing.
    pub pending_delete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadStarted,
    NotesLoaded(Vec<Note>),
    LoadFailed,
    SearchChanged(String),
    NoteSelected(Uuid),
    /// Reset the editor to a fresh, unsaved note.
    EditorCleared,
    TitleEdited(String),
    ContentEdited(String),
    /// A line added at the end of the content.
    LineAppended(String),
    /// No note at this 1-based position of the filtered list.
    OpenFailed(usize),
    /// Both fields were blank; nothing was sent.
    SaveRejected,
    SaveStarted,
    /// `revision` is the editor revision the save was issued for.
    SaveSucceeded {
        note: Note,
        revision: u64,
        created: bool,
    },
    SaveFailed(String),
    DeleteRequested,
    DeleteCancelled,
    DeleteSucceeded,
    DeleteFailed,
    ToastDismissed,
}

impl ClientState {
    fn show_toast(mut self, kind: ToastKind, message: impl Into<String>) -> Self {
        self.toasts_shown += 1;
        self.toast = Some(Toast {
            id: self.toasts_shown,
            kind,
            message: message.into(),
        });
        self
    }

    fn cleared(mut self) -> Self {
        self.current = None;
        self.editor = Editor::default();
        self.has_changes = false;
        self.status = SaveStatus::Saved;
        self.pending_delete = false;
        self
    }

    fn edited(mut self) -> Self {
        self.has_changes = true;
        self.revision += 1;
        self.status = SaveStatus::Unsaved;
        self
    }
}

/// Computes the next state. Pure: no I/O, no clocks.
pub fn reduce(state: ClientState, action: Action) -> ClientState {
    match action {
        Action::LoadStarted => ClientState {
            loading: true,
            ..state
        },
        Action::NotesLoaded(notes) => ClientState {
            notes,
            loading: false,
            ..state
        },
        // The previous list stays on screen, stale.
        Action::LoadFailed => ClientState {
            loading: false,
            ..state
        }
        .show_toast(ToastKind::Error, "Failed to load notes"),
        Action::SearchChanged(search) => ClientState { search, ..state },
        Action::NoteSelected(id) => {
            let Some(note) = state.notes.iter().find(|n| n.id == id).cloned() else {
                return state;
            };
            ClientState {
                current: Some(note.id),
                editor: Editor {
                    title: note.title,
                    content: note.content,
                },
                has_changes: false,
                status: SaveStatus::Saved,
                pending_delete: false,
                ..state
            }
        }
        Action::EditorCleared => state.cleared(),
        Action::TitleEdited(title) => {
            let mut state = state.edited();
            state.editor.title = title;
            state
        }
        Action::ContentEdited(content) => {
            let mut state = state.edited();
            state.editor.content = content;
            state
        }
        Action::LineAppended(line) => {
            let mut state = state.edited();
            if !state.editor.content.is_empty() {
                state.editor.content.push('\n');
            }
            state.editor.content.push_str(&line);
            state
        }
        Action::OpenFailed(position) => state.show_toast(
            ToastKind::Error,
            format!("No note number {} in the list", position),
        ),
        Action::SaveRejected => state.show_toast(ToastKind::Error, "Note cannot be empty"),
        Action::SaveStarted => ClientState {
            status: SaveStatus::Saving,
            ..state
        },
        Action::SaveSucceeded {
            note,
            revision,
            created,
        } => {
            let mut state = state;
            let still_current = match state.current {
                Some(id) => id == note.id,
                None => created,
            };
            if let Some(existing) = state.notes.iter_mut().find(|n| n.id == note.id) {
                *existing = note.clone();
            } else {
                state.notes.insert(0, note.clone());
            }
            if still_current {
                state.current = Some(note.id);
                // An edit made after the save was issued keeps the editor dirty.
                state.has_changes = state.revision != revision;
                if !state.has_changes {
                    state.editor = Editor {
                        title: note.title,
                        content: note.content,
                    };
                }
                state.status = if state.has_changes {
                    SaveStatus::Unsaved
                } else {
                    SaveStatus::Saved
                };
            }
            let message = if created {
                "Note created successfully"
            } else {
                "Note updated successfully"
            };
            state.show_toast(ToastKind::Success, message)
        }
        Action::SaveFailed(message) => ClientState {
            status: SaveStatus::Error,
            ..state
        }
        .show_toast(ToastKind::Error, message),
        Action::DeleteRequested => ClientState {
            pending_delete: state.current.is_some(),
            ..state
        },
        Action::DeleteCancelled => ClientState {
            pending_delete: false,
            ..state
        },
        Action::DeleteSucceeded => {
            let deleted = state.current;
            let mut state = state.cleared();
            if let Some(id) = deleted {
                state.notes.retain(|n| n.id != id);
            }
            state.show_toast(ToastKind::Success, "Note deleted successfully")
        }
        Action::DeleteFailed => ClientState {
            pending_delete: false,
            ..state
        }
        .show_toast(ToastKind::Error, "Failed to delete note"),
        Action::ToastDismissed => ClientState {
            toast: None,
            ..state
        },
    }
}
