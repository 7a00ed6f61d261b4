pub mod client;
pub mod error;
pub(crate) mod retry;

pub use client::StudyClient;
pub use error::StudyError;
