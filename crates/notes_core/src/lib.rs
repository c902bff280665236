pub mod domain;
pub mod ports;
pub mod protocol;

pub use domain::{Note, NoteDraft};
pub use ports::{NoteStore, PortError, PortResult, RateLimitDecision, RateLimiter};
pub use protocol::{HealthBody, MessageBody, NoteEnvelope, NotePayload};
