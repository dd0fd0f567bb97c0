pub mod collection;
pub mod packed;

pub use collection::{Collection, Record};
pub use packed::PackedCollection;
