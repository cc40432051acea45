// Session layer: the explicit identity/theme context plus per-document editor sessions.
// This is where store, identity and export failures become user-visible status text.

pub mod context;
pub mod editor;
pub mod handlers;

pub use context::AppContext;
pub use editor::{EditorSession, OpenOutcome, SaveStatus, SessionError};
