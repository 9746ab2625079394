//! Value objects - immutable types that represent domain concepts

mod normalize;
mod user_id;

pub use normalize::{normalize_email, normalize_text};
pub use user_id::{UserId, UserIdParseError};
