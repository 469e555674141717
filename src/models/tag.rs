use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: String, color: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            color: color.trim().to_uppercase(),
            slug: slug.trim().to_lowercase(),
        }
    }
}

/// `#RRGGBB`
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#E26C2D"));
        assert!(is_hex_color("#49b64e"));
        assert!(!is_hex_color("E26C2D"));
        assert!(!is_hex_color("#E26C2"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[test]
    fn slugs() {
        assert!(is_slug("breakfast"));
        assert!(is_slug("late-dinner_2"));
        assert!(!is_slug(""));
        assert!(!is_slug("with space"));
    }

    #[test]
    fn new_tag_normalizes_fields() {
        let tag = Tag::new(" Lunch ".into(), "#abcdef".into(), " Lunch".into());
        assert_eq!(tag.name, "Lunch");
        assert_eq!(tag.color, "#ABCDEF");
        assert_eq!(tag.slug, "lunch");
    }
}
