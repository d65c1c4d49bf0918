//! Domain model for MV Director
//!
//! Plain data types shared by the workflow, the generation gateway and the
//! persistence layer. Nothing in here performs I/O.

pub mod character;
pub mod ids;
pub mod image;
pub mod project;
pub mod purpose;
pub mod story;

pub use character::{Character, CharacterOutline};
pub use ids::{CharacterId, ProjectId};
pub use image::{ImageData, ReferenceImage};
pub use project::{AspectRatio, Project, WizardStep};
pub use purpose::Purpose;
pub use story::{Concept, Scene};
