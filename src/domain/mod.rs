//! Domain layer - value objects, entities and the use-case outcome type.

pub mod entities;
pub mod outcome;
pub mod value_objects;
pub mod verification;

pub use entities::*;
pub use outcome::*;
pub use value_objects::*;
pub use verification::*;
