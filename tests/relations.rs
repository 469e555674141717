mod common;

use axum::http::StatusCode;
use common::{assert_error, body_json, TestApp};
use serde_json::json;

async fn recipe_fixture(app: &TestApp, cookie: &str) -> String {
    let flour = app.create_ingredient("Flour", "g").await;
    let recipe = app.create_recipe(cookie, "Bread", &[], &[(&flour, 500)]).await;
    recipe["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn favorite_returns_minified_recipe() {
    let app = TestApp::new().await;
    let (_user, cookie) = app.signed_in("baker").await;
    let id = recipe_fixture(&app, &cookie).await;

    let resp = app
        .post_json(&format!("/api/recipes/{id}/favorite"), json!({}), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let json = body_json(resp).await;
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["name"], "Bread");
    assert_eq!(json["image"], "recipes/bread.png");
    assert_eq!(json["cooking_time"], 15);
    assert!(json.get("author").is_none());
}

#[tokio::test]
async fn favoriting_twice_is_a_conflict_and_stores_one_row() {
    let app = TestApp::new().await;
    let (user, cookie) = app.signed_in("baker").await;
    let id = recipe_fixture(&app, &cookie).await;
    let uri = format!("/api/recipes/{id}/favorite");

    let resp = app.post_json(&uri, json!({}), Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.get(&uri, Some(&cookie)).await;
    assert_error(resp, StatusCode::CONFLICT, "ALREADY_EXISTS").await;

    assert_eq!(
        app.count("SELECT COUNT(*) FROM favorites WHERE user_id = ?", &user.id).await,
        1
    );
}

#[tokio::test]
async fn unfavorite_then_unfavorite_again() {
    let app = TestApp::new().await;
    let (_user, cookie) = app.signed_in("baker").await;
    let id = recipe_fixture(&app, &cookie).await;
    let uri = format!("/api/recipes/{id}/favorite");

    app.post_json(&uri, json!({}), Some(&cookie)).await;

    let resp = app.delete(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.delete(&uri, Some(&cookie)).await;
    assert_error(resp, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[tokio::test]
async fn relations_on_missing_recipe_are_not_found() {
    let app = TestApp::new().await;
    let (_user, cookie) = app.signed_in("baker").await;

    for action in ["favorite", "shopping_cart"] {
        let uri = format!("/api/recipes/no-such-recipe/{action}");
        let resp = app.post_json(&uri, json!({}), Some(&cookie)).await;
        assert_error(resp, StatusCode::NOT_FOUND, "NOT_FOUND").await;

        let resp = app.delete(&uri, Some(&cookie)).await;
        assert_error(resp, StatusCode::NOT_FOUND, "NOT_FOUND").await;
    }
}

#[tokio::test]
async fn relations_require_authentication() {
    let app = TestApp::new().await;
    let (_user, cookie) = app.signed_in("baker").await;
    let id = recipe_fixture(&app, &cookie).await;

    for action in ["favorite", "shopping_cart"] {
        let uri = format!("/api/recipes/{id}/{action}");
        let resp = app.post_json(&uri, json!({}), None).await;
        assert_error(resp, StatusCode::UNAUTHORIZED, "UNAUTHENTICATED").await;
    }
}

#[tokio::test]
async fn shopping_cart_add_and_remove() {
    let app = TestApp::new().await;
    let (user, cookie) = app.signed_in("baker").await;
    let id = recipe_fixture(&app, &cookie).await;
    let uri = format!("/api/recipes/{id}/shopping_cart");

    let resp = app.post_json(&uri, json!({}), Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.post_json(&uri, json!({}), Some(&cookie)).await;
    assert_error(resp, StatusCode::CONFLICT, "ALREADY_EXISTS").await;

    let resp = app.delete(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        app.count("SELECT COUNT(*) FROM shopping_cart WHERE user_id = ?", &user.id).await,
        0
    );
}

#[tokio::test]
async fn flags_are_computed_per_requester() {
    let app = TestApp::new().await;
    let (_author, author_cookie) = app.signed_in("baker").await;
    let (_fan, fan_cookie) = app.signed_in("fan").await;
    let id = recipe_fixture(&app, &author_cookie).await;

    app.post_json(&format!("/api/recipes/{id}/favorite"), json!({}), Some(&fan_cookie))
        .await;
    app.post_json(&format!("/api/recipes/{id}/shopping_cart"), json!({}), Some(&fan_cookie))
        .await;

    let json = body_json(app.get(&format!("/api/recipes/{id}"), Some(&fan_cookie)).await).await;
    assert_eq!(json["is_favorited"], true);
    assert_eq!(json["is_in_shopping_cart"], true);

    let json = body_json(app.get(&format!("/api/recipes/{id}"), Some(&author_cookie)).await).await;
    assert_eq!(json["is_favorited"], false);
    assert_eq!(json["is_in_shopping_cart"], false);

    let json = body_json(app.get(&format!("/api/recipes/{id}"), None).await).await;
    assert_eq!(json["is_favorited"], false);
    assert_eq!(json["is_in_shopping_cart"], false);
}
