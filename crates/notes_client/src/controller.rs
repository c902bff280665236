//! crates/notes_client/src/controller.rs
//!
//! The controller owns the single `ClientState` value and is the only place that
//! talks to the API. Front ends send it `Command`s; it runs one event loop over
//! those commands, the auto-save debounce timer and the toast timer.
//!
//! Because the loop handles one thing at a time, saves are strictly sequenced:
//! a save never overlaps another, and commands that arrive while a request is in
//! flight are queued in the channel until it resolves.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::NotesApi;
use crate::state::{reduce, Action, ClientState};
use crate::view::filter_notes;

/// Quiet period after the last edit before an automatic save.
pub const AUTOSAVE_DELAY: Duration = Duration::from_secs(3);
/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// User intents, as produced by a front end.
///
/// Commands that depend on what is on screen (`Open`, `AppendLine`) are resolved
/// against the controller's state when they are handled, not when they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reload,
    Search(String),
    Select(Uuid),
    /// Opens the N-th note (1-based) of the filtered list.
    Open(usize),
    New,
    EditTitle(String),
    EditContent(String),
    /// Appends a line to the content. While a delete confirmation is showing,
    /// the line answers it instead: `y` or `yes` confirms, anything else cancels.
    AppendLine(String),
    Save,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    DismissToast,
}

pub struct Controller<A> {
    api: A,
    state: ClientState,
    updates: watch::Sender<ClientState>,
    autosave_at: Option<Instant>,
    toast_until: Option<Instant>,
}

impl<A: NotesApi> Controller<A> {
    /// Creates a controller and a receiver that observes every state change.
    pub fn new(api: A) -> (Self, watch::Receiver<ClientState>) {
        let (updates, receiver) = watch::channel(ClientState::default());
        let controller = Self {
            api,
            state: ClientState::default(),
            updates,
            autosave_at: None,
            toast_until: None,
        };
        (controller, receiver)
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// The pending auto-save deadline, if an edit is waiting for its quiet period.
    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave_at
    }

    fn dispatch(&mut self, action: Action) {
        debug!(?action, "dispatch");
        let previous_toast = self.state.toast.as_ref().map(|t| t.id);
        self.state = reduce(std::mem::take(&mut self.state), action);

        match self.state.toast.as_ref().map(|t| t.id) {
            None => self.toast_until = None,
            Some(id) if Some(id) != previous_toast => {
                self.toast_until = Some(Instant::now() + TOAST_DURATION)
            }
            Some(_) => {}
        }
        self.updates.send_replace(self.state.clone());
    }

    /// True when the editor holds edits worth keeping.
    fn has_savable_changes(&self) -> bool {
        self.state.has_changes && !self.state.editor.draft().is_blank()
    }

    //=====================================================================================
    // Operations
    //=====================================================================================

    /// Fetches the full list. On failure the previous list stays, stale.
    pub async fn load(&mut self) {
        self.dispatch(Action::LoadStarted);
        match self.api.list().await {
            Ok(notes) => {
                debug!(count = notes.len(), "Notes loaded");
                self.dispatch(Action::NotesLoaded(notes));
            }
            Err(e) => {
                warn!("Error loading notes: {}", e);
                self.dispatch(Action::LoadFailed);
            }
        }
    }

    pub fn search(&mut self, search: String) {
        self.dispatch(Action::SearchChanged(search));
    }

    /// Saves pending edits before the editor is replaced. False if that save failed,
    /// in which case the editor must keep its content.
    async fn save_pending(&mut self) -> bool {
        !self.has_savable_changes() || self.save().await
    }

    /// Opens a note, saving pending edits of the previous one first.
    /// Stays on the current note if that save fails.
    pub async fn select(&mut self, id: Uuid) {
        if self.state.current == Some(id) || !self.save_pending().await {
            return;
        }
        self.autosave_at = None;
        self.dispatch(Action::NoteSelected(id));
    }

    /// Opens the N-th note (1-based) of the list as currently filtered.
    pub async fn open(&mut self, position: usize) {
        let id = position
            .checked_sub(1)
            .and_then(|i| filter_notes(&self.state.notes, &self.state.search).get(i).map(|n| n.id));
        match id {
            Some(id) => self.select(id).await,
            None => self.dispatch(Action::OpenFailed(position)),
        }
    }

    /// Clears the editor for a fresh note, saving pending edits first.
    pub async fn new_note(&mut self) {
        if !self.save_pending().await {
            return;
        }
        self.autosave_at = None;
        self.dispatch(Action::EditorCleared);
    }

    pub fn edit_title(&mut self, title: String) {
        self.dispatch(Action::TitleEdited(title));
        self.autosave_at = Some(Instant::now() + AUTOSAVE_DELAY);
    }

    pub fn edit_content(&mut self, content: String) {
        self.dispatch(Action::ContentEdited(content));
        self.autosave_at = Some(Instant::now() + AUTOSAVE_DELAY);
    }

    pub async fn append_line(&mut self, line: String) {
        if self.state.pending_delete {
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => self.confirm_delete().await,
                _ => self.cancel_delete(),
            }
            return;
        }
        self.dispatch(Action::LineAppended(line));
        self.autosave_at = Some(Instant::now() + AUTOSAVE_DELAY);
    }

    /// Creates or updates the open note. Blank notes are rejected locally.
    /// Returns whether the note was saved.
    pub async fn save(&mut self) -> bool {
        self.autosave_at = None;
        let draft = self.state.editor.draft();
        if draft.is_blank() {
            self.dispatch(Action::SaveRejected);
            return false;
        }

        let revision = self.state.revision;
        let current = self.state.current;
        self.dispatch(Action::SaveStarted);

        let result = match current {
            Some(id) => self.api.update(id, draft).await,
            None => self.api.create(draft).await,
        };
        match result {
            Ok(note) => {
                info!(note_id = %note.id, "Note saved");
                self.dispatch(Action::SaveSucceeded {
                    note,
                    revision,
                    created: current.is_none(),
                });
                self.load().await;
                true
            }
            Err(e) => {
                warn!("Error saving note: {}", e);
                self.dispatch(Action::SaveFailed(e.to_string()));
                false
            }
        }
    }

    pub fn request_delete(&mut self) {
        self.dispatch(Action::DeleteRequested);
    }

    pub fn cancel_delete(&mut self) {
        self.dispatch(Action::DeleteCancelled);
    }

    /// Deletes the open note, but only after `request_delete` was confirmed.
    pub async fn confirm_delete(&mut self) {
        let Some(id) = self.state.current.filter(|_| self.state.pending_delete) else {
            return;
        };
        match self.api.delete(id).await {
            Ok(()) => {
                info!(note_id = %id, "Note deleted");
                self.autosave_at = None;
                self.dispatch(Action::DeleteSucceeded);
                self.load().await;
            }
            Err(e) => {
                warn!("Error deleting note: {}", e);
                self.dispatch(Action::DeleteFailed);
            }
        }
    }

    pub fn dismiss_toast(&mut self) {
        self.dispatch(Action::ToastDismissed);
    }

    //=====================================================================================
    // Event Loop
    //=====================================================================================

    pub async fn handle(&mut self, command: Command) {
        // Anything but an answer dismisses a showing delete confirmation.
        if self.state.pending_delete
            && !matches!(
                command,
                Command::AppendLine(_)
                    | Command::ConfirmDelete
                    | Command::CancelDelete
                    | Command::DismissToast
            )
        {
            self.cancel_delete();
        }

        match command {
            Command::Reload => self.load().await,
            Command::Search(search) => self.search(search),
            Command::Select(id) => self.select(id).await,
            Command::Open(position) => self.open(position).await,
            Command::New => self.new_note().await,
            Command::EditTitle(title) => self.edit_title(title),
            Command::EditContent(content) => self.edit_content(content),
            Command::AppendLine(line) => self.append_line(line).await,
            Command::Save => {
                self.save().await;
            }
            Command::RequestDelete => self.request_delete(),
            Command::ConfirmDelete => self.confirm_delete().await,
            Command::CancelDelete => self.cancel_delete(),
            Command::DismissToast => self.dismiss_toast(),
        }
    }

    /// Loads the list, then processes commands and timers until `shutdown` is
    /// cancelled or every command sender is dropped. When the senders are gone,
    /// pending edits are saved before returning.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>, shutdown: CancellationToken) {
        self.load().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => {
                        self.save_pending().await;
                        break;
                    }
                },
                _ = sleep_until_opt(self.autosave_at) => {
                    self.autosave_at = None;
                    if self.state.has_changes {
                        self.save().await;
                    }
                }
                _ = sleep_until_opt(self.toast_until) => {
                    self.toast_until = None;
                    self.dispatch(Action::ToastDismissed);
                }
            }
        }
        debug!("Controller stopped");
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
