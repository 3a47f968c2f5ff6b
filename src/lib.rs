mod utils;

pub mod config;
pub mod docx;
pub mod input;
pub mod session;
pub mod submission;
pub mod time;
pub mod verifier;

pub use crate::config::Settings;
pub use crate::session::{Session, SessionError, Submission, View};
