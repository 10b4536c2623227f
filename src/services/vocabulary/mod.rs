pub mod classifier;
pub mod editor;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod store;

pub use model::{LookupResult, SimilarEntry};
pub use store::ContextStore;
