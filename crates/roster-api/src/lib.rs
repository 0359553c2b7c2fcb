// roster-api: Async Rust client for the student roster REST resource

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DEFAULT_RESOURCE_PATH, StudentsClient};
pub use error::Error;
pub use models::{ResourceId, Student, StudentBody};
pub use transport::{TlsMode, TransportConfig};
