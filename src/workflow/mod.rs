//! Session state and step workflow
//!
//! - [`Session`]: the active editing context and its transient flags
//! - [`Workflow`]: the controller enforcing step guards and in-flight rules
//! - [`ProjectCatalog`]: saved projects, persisted through a `ProjectStore`

pub mod catalog;
pub mod controller;
pub mod session;

pub use catalog::ProjectCatalog;
pub use controller::{select_scene_characters, Completion, Workflow};
pub use session::{CharacterDraft, InFlight, Session, Target};
