//! Query-string driven recipe filtering.
//!
//! `tags` may repeat (`?tags=breakfast&tags=lunch`), which axum's `Query`
//! cannot express, so the raw query string is parsed here.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::AppError;
use crate::models::{Recipe, User};
use crate::pagination::{PageParams, Window};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<String>,
    /// Slugs; a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[derive(Debug, Default, Clone)]
pub struct RecipeQuery {
    pub filter: RecipeFilter,
    pub page: PageParams,
}

impl RecipeQuery {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let mut query = RecipeQuery::default();

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "author" if !value.is_empty() => query.filter.author = Some(value.into_owned()),
                "tags" if !value.is_empty() => {
                    if !query.filter.tags.iter().any(|t| *t == value) {
                        query.filter.tags.push(value.into_owned());
                    }
                }
                "is_favorited" => query.filter.is_favorited = parse_bool(&key, &value)?,
                "is_in_shopping_cart" => {
                    query.filter.is_in_shopping_cart = parse_bool(&key, &value)?
                }
                "page" => query.page.page = Some(parse_int(&key, &value)?),
                "limit" => query.page.limit = Some(parse_int(&key, &value)?),
                _ => {}
            }
        }

        Ok(query)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value {
        "1" | "true" | "True" => Ok(true),
        "" | "0" | "false" | "False" => Ok(false),
        other => Err(AppError::Validation(format!(
            "{key}: expected a boolean, got '{other}'"
        ))),
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64, AppError> {
    value
        .parse()
        .map_err(|_| AppError::Validation(format!("{key}: expected an integer, got '{value}'")))
}

impl RecipeFilter {
    /// Append the WHERE clause for this filter to a query selecting from
    /// `recipes r`.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>, viewer: Option<&User>) {
        qb.push(" WHERE 1 = 1");

        if let Some(author) = &self.author {
            qb.push(" AND r.author_id = ").push_bind(author.clone());
        }

        if !self.tags.is_empty() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = r.id AND t.slug IN (",
            );
            {
                let mut slugs = qb.separated(", ");
                for slug in &self.tags {
                    slugs.push_bind(slug.clone());
                }
            }
            qb.push("))");
        }

        for (enabled, table) in [
            (self.is_favorited, "favorites"),
            (self.is_in_shopping_cart, "shopping_cart"),
        ] {
            if !enabled {
                continue;
            }
            match viewer {
                Some(viewer) => {
                    qb.push(format!(
                        " AND EXISTS (SELECT 1 FROM {table} x WHERE x.recipe_id = r.id AND x.user_id = "
                    ))
                    .push_bind(viewer.id.clone())
                    .push(")");
                }
                // Anonymous callers have no favorites and no cart.
                None => {
                    qb.push(" AND 0");
                }
            }
        }
    }

    pub async fn count(&self, db: &SqlitePool, viewer: Option<&User>) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM recipes r");
        self.push_where(&mut qb, viewer);
        let (count,): (i64,) = qb.build_query_as().fetch_one(db).await?;
        Ok(count)
    }

    /// One page of matching recipes, newest first.
    pub async fn fetch(
        &self,
        db: &SqlitePool,
        viewer: Option<&User>,
        window: Window,
    ) -> Result<Vec<Recipe>, sqlx::Error> {
        let mut qb = QueryBuilder::new("SELECT r.* FROM recipes r");
        self.push_where(&mut qb, viewer);
        qb.push(" ORDER BY r.created_at DESC, r.rowid DESC LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset());
        qb.build_query_as().fetch_all(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> User {
        User::new(
            "viewer".into(),
            "viewer@example.com".into(),
            "View".into(),
            "Er".into(),
        )
    }

    fn where_sql(filter: &RecipeFilter, viewer: Option<&User>) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT r.* FROM recipes r");
        filter.push_where(&mut qb, viewer);
        qb.sql().to_string()
    }

    #[test]
    fn parses_repeated_tags_and_flags() {
        let query = RecipeQuery::parse(Some(
            "tags=breakfast&tags=lunch&tags=breakfast&author=abc&is_favorited=1&is_in_shopping_cart=false&page=2&limit=3",
        ))
        .unwrap();

        assert_eq!(query.filter.tags, vec!["breakfast", "lunch"]);
        assert_eq!(query.filter.author.as_deref(), Some("abc"));
        assert!(query.filter.is_favorited);
        assert!(!query.filter.is_in_shopping_cart);
        assert_eq!(query.page.page, Some(2));
        assert_eq!(query.page.limit, Some(3));
    }

    #[test]
    fn empty_query_means_no_filter() {
        let query = RecipeQuery::parse(None).unwrap();
        assert_eq!(query.filter, RecipeFilter::default());

        let query = RecipeQuery::parse(Some("author=&tags=")).unwrap();
        assert_eq!(query.filter, RecipeFilter::default());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(RecipeQuery::parse(Some("is_favorited=maybe")).is_err());
        assert!(RecipeQuery::parse(Some("page=first")).is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let query = RecipeQuery::parse(Some("ordering=name&is_favorited=True")).unwrap();
        assert!(query.filter.is_favorited);
    }

    #[test]
    fn tag_filter_is_a_single_disjunction() {
        let filter = RecipeFilter {
            tags: vec!["breakfast".into(), "lunch".into()],
            ..Default::default()
        };
        let sql = where_sql(&filter, None);
        assert!(sql.contains("t.slug IN (?, ?)"));
        assert_eq!(sql.matches("EXISTS").count(), 1);
    }

    #[test]
    fn relation_flags_need_a_viewer() {
        let filter = RecipeFilter {
            is_favorited: true,
            is_in_shopping_cart: true,
            ..Default::default()
        };

        let anonymous = where_sql(&filter, None);
        assert!(anonymous.ends_with(" AND 0 AND 0"));

        let user = viewer();
        let signed_in = where_sql(&filter, Some(&user));
        assert!(signed_in.contains("FROM favorites x"));
        assert!(signed_in.contains("FROM shopping_cart x"));
        assert!(!signed_in.contains("AND 0"));
    }
}
