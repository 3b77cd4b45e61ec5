pub mod attempts;
pub mod mastery;
pub mod messages;
pub mod progress;
pub mod questions;
pub mod sessions;
pub mod topics;
pub mod videos;
