// End-to-end plantation write path against a live database.

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{Session, World};

fn id_of(body: &Value) -> i64 {
    body["data"]["id"].as_i64().expect("response carries an id")
}

#[tokio::test]
async fn area_sum_invariant_rejects_without_side_effects() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let session = Session::login(&world.inspector_a).await?;

    let (status, body) = session.post("/plantations/create", world.plantation(world.district_a, 10.0)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = id_of(&body);
    // 10 - 2 irrigation - 1 not usable - 3 fruit
    assert_eq!(body["data"]["empty_area"], json!(4.0));

    let mut oversized = world.plantation(world.district_a, 10.0);
    oversized["fruit_areas"][0]["area"] = json!(20.0);
    let (status, body) = session.put(&format!("/plantations/{}", id), oversized).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["total_area"].is_array(), "{}", body);

    let (status, body) = session.get(&format!("/plantations/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_area"], json!(10.0));
    assert_eq!(body["data"]["fruit_areas"][0]["area"], json!(3.0));

    let (status, body) = session.patch(&format!("/plantations/{}", id), json!({ "total_area": 2.5 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    // Barely over the total is a field error, not a constraint failure
    let (status, body) = session
        .patch(&format!("/plantations/{}", id), json!({ "irrigation_area": 10.0000000001 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert!(body["field_errors"]["irrigation_area"].is_array(), "{}", body);

    let (status, body) = session.get("/plantations/abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn review_flag_follows_changes_and_approval() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let session = Session::login(&world.inspector_a).await?;

    let mut input = world.plantation(world.district_a, 10.0);
    input["is_checked"] = json!(true);
    let (status, body) = session.post("/plantations/create", input).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = id_of(&body);
    assert_eq!(body["data"]["is_checked"], false);
    assert_eq!(body["data"]["prev_data"], json!({}));

    let path = format!("/plantations/{}", id);
    let (_, body) = session.patch(&path, json!({ "is_checked": true })).await?;
    assert_eq!(body["data"]["is_checked"], true);
    assert_eq!(body["data"]["prev_data"], json!({}));

    let (_, body) = session.patch(&path, json!({ "total_area": 12.0 })).await?;
    assert_eq!(body["data"]["is_checked"], false);
    assert_eq!(body["data"]["prev_data"], json!({ "total_area": { "old": 10.0, "new": 12.0 } }));

    // Approval in the same request as a change wins
    let (_, body) = session.patch(&path, json!({ "is_checked": true, "fenced": true })).await?;
    assert_eq!(body["data"]["is_checked"], true);
    assert_eq!(body["data"]["prev_data"], json!({}));

    // Saving identical values keeps the flag
    let (_, body) = session.patch(&path, json!({ "fenced": true })).await?;
    assert_eq!(body["data"]["is_checked"], true);
    Ok(())
}

#[tokio::test]
async fn district_users_only_see_their_district() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let inspector_a = Session::login(&world.inspector_a).await?;
    let inspector_b = Session::login(&world.inspector_b).await?;
    let admin = Session::login(&world.admin).await?;

    let (status, body) = inspector_a.post("/plantations/create", world.plantation(world.district_a, 10.0)).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = id_of(&body);

    let (status, _) = inspector_a.post("/plantations/create", world.plantation(world.district_b, 10.0)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let path = format!("/plantations/{}", id);
    let (status, _) = inspector_b.get(&path).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = inspector_b.patch(&path, json!({ "fenced": true })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Scope is decided before the body is validated
    let (status, body) = inspector_b.patch(&path, json!({ "fertility_score": 150 })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
    let mut invalid = world.plantation(world.district_a, 10.0);
    invalid["fruit_areas"][0]["area"] = json!(20.0);
    let (status, _) = inspector_b.put(&path, invalid).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = inspector_b.get(&format!("/plantations?district={}", world.district_a)).await?;
    assert_eq!(body["data"], json!([]));

    let (_, body) = admin.get(&format!("/plantations?district={}", world.district_a)).await?;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![id]);

    // Moving a plantation out of the caller's district is refused
    let (status, _) = inspector_a.patch(&path, json!({ "district": world.district_b })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn references_must_exist_and_belong_to_the_fruit() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let session = Session::login(&world.admin).await?;

    let mut wrong_variety = world.plantation(world.district_a, 10.0);
    wrong_variety["fruit_areas"][0]["variety"] = json!(world.other_variety);
    let (status, body) = session.post("/plantations/create", wrong_variety).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["fruit_areas[0].variety"].is_array(), "{}", body);

    let (status, _) = session.post("/plantations/create", world.plantation(i64::MAX, 10.0)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_cascades_to_owned_rows() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let session = Session::login(&world.inspector_a).await?;

    let mut input = world.plantation(world.district_a, 10.0);
    input["investment"] = json!({ "invest_type": "махаллий", "investment_amount": "1500.50" });
    let (status, body) = session.post("/plantations/create", input).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = id_of(&body);
    assert_eq!(body["data"]["investment"]["invest_type"], "махаллий");

    let (status, body) = session
        .post(
            "/subsidies",
            json!({
                "plantation": id,
                "year": 2023,
                "contract_number": "C-17",
                "direction": "drip irrigation",
                "amount": "25000",
                "efficiency": true
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let subsidy = id_of(&body);

    // One investment per plantation
    let (status, _) = session
        .post("/investments", json!({ "plantation": id, "invest_type": "махаллий" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = session.get(&format!("/plantations/{}", id)).await?;
    assert_eq!(body["data"]["subsidies"][0]["efficiency"], "Самарали");

    let (status, _) = session.delete(&format!("/plantations/{}", id)).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = session.get(&format!("/plantations/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = session.get(&format!("/subsidies/{}", subsidy)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = session.get(&format!("/subsidies?plantation={}", id)).await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn replace_recreates_nested_collections() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let session = Session::login(&world.inspector_a).await?;

    let (_, body) = session.post("/plantations/create", world.plantation(world.district_a, 10.0)).await?;
    let id = id_of(&body);
    let old_coordinate = body["data"]["coordinates"][0]["id"].as_i64();

    let mut replacement = world.plantation(world.district_a, 10.0);
    replacement["coordinates"] = json!([
        { "latitude": 40.1, "longitude": 72.1 },
        { "latitude": 40.2, "longitude": 72.2 }
    ]);
    replacement["images"] = json!([]);
    let (status, body) = session.put(&format!("/plantations/{}", id), replacement).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let coordinates = body["data"]["coordinates"].as_array().cloned().unwrap_or_default();
    assert_eq!(coordinates.len(), 2);
    assert!(coordinates.iter().all(|c| c["id"].as_i64() != old_coordinate));
    assert_eq!(body["data"]["images"], json!([]));

    let (_, body) = session.get(&format!("/plantations/map?district={}", world.district_a)).await?;
    assert_eq!(body["data"][0]["coordinates"].as_array().map(Vec::len), Some(2));
    assert!(body["data"][0].get("total_area").is_none());
    Ok(())
}

#[tokio::test]
async fn dropped_server_stops_listening() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let server = common::TestServer::spawn()?;
    server.wait_ready(std::time::Duration::from_secs(15)).await?;
    let health = format!("{}/health", server.base_url);

    drop(server);
    assert!(reqwest::get(&health).await.is_err(), "server still answering on {}", health);
    Ok(())
}
