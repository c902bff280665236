//! crates/notes_client/src/view.rs
//!
//! Rendering is a pure function of `ClientState`: `render` derives everything the
//! user sees, and `View` prints itself for the terminal front end.

use std::fmt;

use notes_core::domain::Note;
use uuid::Uuid;

use crate::state::{ClientState, SaveStatus, Toast, ToastKind};

/// Characters of content shown in a list item before it is cut off.
pub const PREVIEW_CHARS: usize = 100;

pub const UNTITLED: &str = "Untitled Note";
pub const EMPTY_LIST: &str = "No notes found";
pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this note? This action cannot be undone.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: Uuid,
    pub title: String,
    pub preview: String,
    pub updated: String,
    pub word_count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub items: Vec<ListItem>,
    /// True when the filtered list is empty; the front end offers to create a note.
    pub empty_state: bool,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub char_count: usize,
    pub status_label: &'static str,
    pub delete_enabled: bool,
    pub confirm_prompt: Option<&'static str>,
    pub loading: bool,
    pub toast: Option<Toast>,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive substring match of `search` over title and content.
pub fn filter_notes<'a>(notes: &'a [Note], search: &str) -> Vec<&'a Note> {
    let needle = search.to_lowercase();
    notes
        .iter()
        .filter(|note| {
            note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
        })
        .collect()
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub fn status_label(status: SaveStatus) -> &'static str {
    match status {
        SaveStatus::Saved => "All changes saved",
        SaveStatus::Unsaved => "Unsaved changes",
        SaveStatus::Saving => "Saving...",
        SaveStatus::Error => "Error saving",
    }
}

pub fn render(state: &ClientState) -> View {
    let items: Vec<ListItem> = filter_notes(&state.notes, &state.search)
        .into_iter()
        .map(|note| ListItem {
            id: note.id,
            title: if note.title.is_empty() {
                UNTITLED.to_string()
            } else {
                note.title.clone()
            },
            preview: preview(&note.content),
            updated: note.updated_at.format("%Y-%m-%d").to_string(),
            word_count: word_count(&note.content),
            active: state.current == Some(note.id),
        })
        .collect();

    View {
        empty_state: items.is_empty(),
        items,
        title: state.editor.title.clone(),
        content: state.editor.content.clone(),
        word_count: word_count(&state.editor.content),
        char_count: state.editor.content.chars().count(),
        status_label: status_label(state.status),
        delete_enabled: state.current.is_some(),
        confirm_prompt: state.pending_delete.then_some(DELETE_PROMPT),
        loading: state.loading,
        toast: state.toast.clone(),
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loading {
            writeln!(f, "(loading...)")?;
        }
        if self.empty_state {
            writeln!(f, "  {} (type :new to create your first note)", EMPTY_LIST)?;
        }
        for (index, item) in self.items.iter().enumerate() {
            let marker = if item.active { '*' } else { ' ' };
            writeln!(
                f,
                "{}{:>3}. {}  [{} | {} words]",
                marker,
                index + 1,
                item.title,
                item.updated,
                item.word_count
            )?;
            if !item.preview.is_empty() {
                writeln!(f, "       {}", item.preview.replace('\n', " "))?;
            }
        }
        writeln!(f, "----")?;
        let title = if self.title.is_empty() { UNTITLED } else { self.title.as_str() };
        writeln!(f, "# {}", title)?;
        if !self.content.is_empty() {
            writeln!(f, "{}", self.content)?;
        }
        writeln!(
            f,
            "[{} words | {} characters | {}]",
            self.word_count, self.char_count, self.status_label
        )?;
        if let Some(prompt) = self.confirm_prompt {
            writeln!(f, "{} [y/N]", prompt)?;
        }
        if let Some(toast) = &self.toast {
            let tag = match toast.kind {
                ToastKind::Success => "ok",
                ToastKind::Error => "error",
            };
            writeln!(f, "({}) {}", tag, toast.message)?;
        }
        Ok(())
    }
}
