//! issuetrack front end: command-line arguments, application state and
//! terminal rendering on top of `issuetrack-core`.

pub mod app;
pub mod cli;
pub mod render;

pub use app::{App, Notice, NoticeLevel, Screen};
