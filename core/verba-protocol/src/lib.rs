pub mod error;
pub mod ids;
pub mod morphology;

// Re-export core types for convenience
pub use error::UnknownToken;
pub use ids::{Ident, IdentifierInfo};
pub use morphology::*;

pub mod model;
pub use model::*;
