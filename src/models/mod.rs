pub mod user;
pub mod ingredient;
pub mod tag;
pub mod recipe;
pub mod relation;

pub use user::User;
pub use ingredient::Ingredient;
pub use tag::Tag;
pub use recipe::{Recipe, RecipeIngredient};
pub use relation::RelationRecord;

use chrono::{SecondsFormat, Utc};

/// Current time as a fixed-width RFC 3339 string, so stored timestamps sort
/// lexicographically.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
