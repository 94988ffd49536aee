//! Bridge between the terminal front end and the navigation worker thread.

pub mod commands;
pub mod runtime;
