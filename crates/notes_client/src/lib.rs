pub mod api;
pub mod controller;
pub mod error;
pub mod state;
pub mod view;

pub use api::{HttpNotesApi, NotesApi};
pub use controller::{Command, Controller, AUTOSAVE_DELAY, TOAST_DURATION};
pub use error::{ClientError, ClientResult};
pub use state::{reduce, Action, ClientState, SaveStatus};
pub use view::{render, View};
