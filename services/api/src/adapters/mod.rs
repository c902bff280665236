pub mod db;
pub mod memory;
pub mod upstash;
pub mod window;

pub use db::DbAdapter;
pub use memory::InMemoryNoteStore;
pub use upstash::UpstashRateLimiter;
pub use window::FixedWindowLimiter;
