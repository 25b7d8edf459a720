//! The Elm Architecture (TEA) implementation for the datapipe dashboard.
//!
//! - `Model`: pure application state
//! - `Message`: inputs to the update function
//! - `Command`: side effects requested by the update function
//! - `update`: the only place state changes

pub mod command;
pub mod message;
pub mod model;
pub mod update;

pub use command::Command;
pub use message::Message;
pub use model::{Model, Notification, NotificationLevel, View};
pub use update::update;
