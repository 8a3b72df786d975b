mod model;
mod reducer;
mod routes;
mod store;

pub use model::{Note, NoteDraft, NoteId, NoteIdPath, RenderedNote};
pub use reducer::ValidationError;
pub use routes::router;
pub use store::NoteStore;
