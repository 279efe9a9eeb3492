// Reference data, farmers and superuser endpoints against a live database.

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{Session, World};
use plantation_registry::services::reference_service::{self, ReferenceFixture, RegionFixture, SeedReport};

fn farmer(name: &str) -> Value {
    json!({
        "name": name,
        "founder_name": "Founder",
        "director_name": "Director",
        "phone_number": "+998901234567",
        "email": "farm@example.com",
        "address": "Main street 1",
        "inn": "123456789",
        "established_year": 2001
    })
}

#[tokio::test]
async fn seeding_is_idempotent() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let pool = common::pool().await?;
    let fixture = ReferenceFixture {
        regions: vec![RegionFixture {
            name: format!("Seed region {}", uuid::Uuid::new_v4()),
            districts: vec!["North".into(), "South".into()],
        }],
        fruits: vec![],
    };

    let first = reference_service::seed(&pool, &fixture).await?;
    assert_eq!(first.regions, 1);
    assert_eq!(first.districts, 2);

    let second = reference_service::seed(&pool, &fixture).await?;
    assert_eq!(second, SeedReport::default());
    Ok(())
}

#[tokio::test]
async fn reference_lists_are_available_to_any_user() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let session = Session::login(&world.inspector_a).await?;

    let (status, body) = session.get(&format!("/districts?region={}", world.region)).await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|d| d["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"A") && names.contains(&"B"));

    let (_, body) = session.get("/fruits").await?;
    let fruit = body["data"]
        .as_array()
        .and_then(|rows| rows.iter().find(|f| f["id"].as_i64() == Some(world.fruit)))
        .cloned()
        .unwrap_or(Value::Null);
    assert_eq!(fruit["varieties"][0]["id"].as_i64(), Some(world.variety));
    assert_eq!(fruit["rootstocks"][0]["name"], "M9");

    let (status, _) = session.get("/districts?region=abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn rootstock_crud() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let session = Session::login(&world.inspector_a).await?;

    let (status, body) = session
        .post("/rootstocks", json!({ "fruit": world.fruit, "name": "MM106" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["data"]["id"].as_i64().unwrap_or_default();

    let (_, body) = session.get(&format!("/rootstocks?fruit={}", world.fruit)).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (status, body) = session
        .put(&format!("/rootstocks/{}", id), json!({ "fruit": world.fruit, "name": "MM111" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "MM111");

    let (status, _) = session.delete(&format!("/rootstocks/{}", id)).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = session.get(&format!("/rootstocks/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn linked_farmers_follow_plantation_visibility() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let inspector_a = Session::login(&world.inspector_a).await?;
    let inspector_b = Session::login(&world.inspector_b).await?;

    let (status, body) = inspector_a.post("/farmers", farmer("Orchard LLC")).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let farmer_id = body["data"]["id"].as_i64().unwrap_or_default();

    // Unlinked farmers are visible to everyone
    let (status, _) = inspector_b.get(&format!("/farmers/{}", farmer_id)).await?;
    assert_eq!(status, StatusCode::OK);

    let mut plantation = world.plantation(world.district_a, 10.0);
    plantation["farmer"] = json!(farmer_id);
    let (status, body) = inspector_a.post("/plantations/create", plantation.clone()).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["farmer"]["id"].as_i64(), Some(farmer_id));

    let (status, _) = inspector_b.get(&format!("/farmers/{}", farmer_id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = inspector_a.get(&format!("/farmers/{}", farmer_id)).await?;
    assert_eq!(status, StatusCode::OK);

    // A farmer runs one plantation
    let (status, body) = inspector_a.post("/plantations/create", plantation).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["farmer"].is_array(), "{}", body);

    let (status, body) = inspector_a.post("/farmers", json!({ "name": "" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    Ok(())
}

#[tokio::test]
async fn administration_requires_superuser() -> Result<()> {
    if common::skip_without_database() {
        return Ok(());
    }
    let world = World::build().await?;
    let inspector = Session::login(&world.inspector_a).await?;
    let admin = Session::login(&world.admin).await?;

    for path in ["/users", "/statistics"] {
        let (status, body) = inspector.get(path).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", path);
        assert_eq!(body["error"], "FORBIDDEN");
    }
    let (status, _) = inspector
        .post("/districts/create", json!({ "region": world.region, "name": "C" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = admin
        .post("/districts/create", json!({ "region": world.region, "name": "C" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["region"].as_i64(), Some(world.region));

    let username = format!("{}-extra", world.admin);
    let request = json!({ "username": username, "password": "another-pass", "district": world.district_b });
    let (status, body) = admin.post("/users", request.clone()).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert!(body["data"].get("password_hash").is_none());
    let user_id = body["data"]["id"].as_i64().unwrap_or_default();

    let (status, _) = admin.post("/users", request).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = admin.get(&format!("/users/{}", user_id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["district"].as_i64(), Some(world.district_b));

    let (status, body) = admin.get("/statistics").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["plantations"]["total"].is_number(), "{}", body);
    Ok(())
}
