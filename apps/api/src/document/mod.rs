// Resume Document Model: canonical in-memory shape plus the pure edit operations over it.

pub mod editor;
pub mod model;

pub use editor::{EditError, EditOp, ResumeEditor};
pub use model::{ResumeDocument, ScalarSection, Section, TemplateId};
