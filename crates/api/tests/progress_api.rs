//! HTTP-level tests for save-progress and achievements.

mod common;

use axum::http::StatusCode;
use common::{body_json, login, post_json_auth};
use serde_json::json;

/// Absent fields keep their stored value; present ones are replaced.
#[tokio::test]
async fn test_save_progress_partial_update() {
    let (app, _store) = common::build_test_app();
    let (token, user) = login(app.clone(), "abc", "alice").await;

    let response = post_json_auth(
        app,
        "/api/save-progress",
        json!({ "batons": 1234.5, "currentLeague": "silver" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["batons"], 1234.5);
    assert_eq!(updated["currentLeague"], "silver");
    assert_eq!(updated["batonsPerClick"], user["batonsPerClick"]);
    assert_eq!(updated["skins"], user["skins"]);
    assert_eq!(updated["createdAt"], user["createdAt"]);
}

/// A full snapshot push replaces cards and skins wholesale.
#[tokio::test]
async fn test_save_progress_full_snapshot() {
    let (app, store) = common::build_test_app();
    let (token, _) = login(app.clone(), "abc", "alice").await;

    let body = json!({
        "batons": 10.0,
        "batonsPerClick": 2.0,
        "passiveIncome": 1.5,
        "currentLeague": "bronze",
        "currentSkin": "common",
        "cards": [{
            "id": "baker",
            "name": "Baker",
            "level": 2,
            "passiveIncome": 1.5,
            "cooldown": 10,
            "lastCollected": 1700000000000_i64
        }],
        "skins": [
            {
                "id": "common",
                "name": "Classic baton",
                "rarity": "common",
                "price": 0.0,
                "owned": true
            },
            {
                "id": "rare",
                "name": "French baguette",
                "rarity": "rare",
                "price": 1000.0,
                "owned": true
            }
        ]
    });
    let response = post_json_auth(app, "/api/save-progress", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    use batoners_db::store::PlayerStore;
    let player = store.find("abc").await.unwrap().unwrap();
    assert_eq!(player.cards.len(), 1);
    assert_eq!(player.cards[0].level, 2);
    assert_eq!(player.skins.len(), 2);
    assert_eq!(player.passive_income, 1.5);
}

/// Negative balances are rejected before touching the store.
#[tokio::test]
async fn test_save_progress_rejects_negative_balance() {
    let (app, _store) = common::build_test_app();
    let (token, _) = login(app.clone(), "abc", "alice").await;

    let response =
        post_json_auth(app, "/api/save-progress", json!({ "batons": -1.0 }), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A card list naming the same card twice is rejected.
#[tokio::test]
async fn test_save_progress_rejects_repeated_card() {
    let (app, store) = common::build_test_app();
    let (token, _) = login(app.clone(), "abc", "alice").await;

    let card = json!({
        "id": "baker",
        "name": "Baker",
        "level": 1,
        "passiveIncome": 1.0,
        "cooldown": 10,
        "lastCollected": 1700000000000_i64
    });
    let body = json!({ "batons": 5.0, "cards": [card.clone(), card] });
    let response = post_json_auth(app, "/api/save-progress", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    use batoners_db::store::PlayerStore;
    let player = store.find("abc").await.unwrap().unwrap();
    assert!(player.cards.is_empty());
    assert_eq!(player.batons, 0.0);
}

/// Saving for a player with no document is a 404.
#[tokio::test]
async fn test_save_progress_unknown_player() {
    let (app, _store) = common::build_test_app();
    let token = batoners_api::auth::jwt::generate_token(
        "ghost",
        &common::test_config().jwt,
    )
    .unwrap();

    let response =
        post_json_auth(app, "/api/save-progress", json!({ "batons": 1.0 }), &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

/// Achievements merge by id and stamp the first completion.
#[tokio::test]
async fn test_achievements_merge() {
    let (app, _store) = common::build_test_app();
    let (token, _) = login(app.clone(), "abc", "alice").await;

    let first = post_json_auth(
        app.clone(),
        "/api/achievements",
        json!({ "achievements": [{ "id": "clicker", "completed": false, "progress": 3.0 }] }),
        &token,
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let list = body_json(first).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let second = post_json_auth(
        app,
        "/api/achievements",
        json!({ "achievements": [
            { "id": "clicker", "completed": true, "progress": 5.0 },
            { "id": "collector", "completed": false, "progress": 1.0 }
        ] }),
        &token,
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);
    let list = body_json(second).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], "clicker");
    assert_eq!(list[0]["completed"], true);
    assert_eq!(list[0]["progress"], 5.0);
    assert!(list[0]["completedAt"].is_string());
    assert_eq!(list[1]["id"], "collector");
}
