pub mod compare;
pub mod normalize;

pub use compare::{compare, HeadToHead, Outcome};
pub use normalize::{coerce_position, normalize, DerivedResultRow, Normalized};
