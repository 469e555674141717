#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use foodgram::cli::{create_user, NewUser};
use foodgram::config::Config;
use foodgram::models::User;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = foodgram::build_app(pool.clone(), Config::default())
            .await
            .expect("Failed to build app");

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Create a regular user directly in the database.
    pub async fn create_user(&self, username: &str) -> User {
        self.insert_user(username, false).await
    }

    /// Create a staff (admin) user directly in the database.
    pub async fn create_staff(&self, username: &str) -> User {
        self.insert_user(username, true).await
    }

    async fn insert_user(&self, username: &str, is_staff: bool) -> User {
        create_user(
            &self.db,
            NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "First".to_string(),
                last_name: "Last".to_string(),
                is_staff,
            },
        )
        .await
        .expect("Failed to create test user")
    }

    /// Log in as the given user and return the session cookie string.
    pub async fn login(&self, user: &User) -> String {
        let resp = self
            .post_json(
                "/api/auth/login",
                json!({ "invite_code": user.invite_code }),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        resp.headers()
            .get("set-cookie")
            .expect("Login should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    /// Create a user and log in as them.
    pub async fn signed_in(&self, username: &str) -> (User, String) {
        let user = self.create_user(username).await;
        let cookie = self.login(&user).await;
        (user, cookie)
    }

    pub async fn create_tag(&self, name: &str, color: &str, slug: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO tags (id, name, color, slug) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(color)
            .bind(slug)
            .execute(&self.db)
            .await
            .expect("Failed to create test tag");
        id
    }

    pub async fn create_ingredient(&self, name: &str, unit: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO ingredients (id, name, measurement_unit) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(unit)
            .execute(&self.db)
            .await
            .expect("Failed to create test ingredient");
        id
    }

    /// Publish a recipe through the API and return its JSON representation.
    pub async fn create_recipe(
        &self,
        cookie: &str,
        name: &str,
        tags: &[&str],
        ingredients: &[(&str, i64)],
    ) -> Value {
        let body = recipe_body(name, tags, ingredients, 15);
        let resp = self.post_json("/api/recipes", body, Some(cookie)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.send("GET", uri, None, cookie).await
    }

    /// Send a POST JSON request with an optional session cookie.
    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> Response {
        self.send("POST", uri, Some(body), cookie).await
    }

    /// Send a PATCH JSON request with an optional session cookie.
    pub async fn patch_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> Response {
        self.send("PATCH", uri, Some(body), cookie).await
    }

    /// Send a DELETE request with an optional session cookie.
    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.send("DELETE", uri, None, cookie).await
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.request(req).await
    }

    pub async fn count(&self, sql: &str, bind: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(sql)
            .bind(bind)
            .fetch_one(&self.db)
            .await
            .unwrap();
        count
    }
}

pub fn recipe_body(name: &str, tags: &[&str], ingredients: &[(&str, i64)], cooking_time: i64) -> Value {
    json!({
        "name": name,
        "image": format!("recipes/{}.png", name.to_lowercase().replace(' ', "-")),
        "text": format!("How to make {name}."),
        "cooking_time": cooking_time,
        "tags": tags,
        "ingredients": ingredients
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect::<Vec<_>>(),
    })
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

/// Assert an error response carries the expected status and error code.
pub async fn assert_error(resp: Response, status: StatusCode, code: &str) {
    assert_eq!(resp.status(), status);
    let json = body_json(resp).await;
    assert_eq!(json["code"], code);
    assert!(json["detail"].is_string());
}

/// Names of the recipes in a paginated listing, in order.
pub fn result_names(page: &Value) -> Vec<String> {
    page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}
