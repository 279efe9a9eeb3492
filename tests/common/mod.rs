#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;

use plantation_registry::config::config;
use plantation_registry::database::DatabaseManager;
use plantation_registry::services::reference_service::{self, FruitFixture, ReferenceFixture, RegionFixture};
use plantation_registry::services::user_service::{self, CreateUserRequest};

// Shared while any session holds it; the last holder's drop stops the binary
static SERVER: Mutex<Weak<TestServer>> = Mutex::new(Weak::new());

pub const PASSWORD: &str = "integration-pass";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/plantation-registry");
        cmd.env("API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherits DATABASE_URL and JWT_SECRET from the test environment
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// End-to-end tests need a reachable PostgreSQL; without DATABASE_URL they are skipped
pub fn skip_without_database() -> bool {
    if std::env::var("DATABASE_URL").map(|v| v.is_empty()).unwrap_or(true) {
        eprintln!("DATABASE_URL not set; skipping end-to-end test");
        return true;
    }
    false
}

pub async fn ensure_server() -> Result<Arc<TestServer>> {
    let server = {
        let mut slot = SERVER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.upgrade() {
            Some(server) => server,
            None => {
                let server = Arc::new(TestServer::spawn()?);
                *slot = Arc::downgrade(&server);
                server
            }
        }
    };
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Direct pool for arranging fixtures, migrated before use
pub async fn pool() -> Result<PgPool> {
    let pool = DatabaseManager::connect(&config().database).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(pool)
}

/// Reference rows and accounts unique to one test
pub struct World {
    pub pool: PgPool,
    pub region: i64,
    pub district_a: i64,
    pub district_b: i64,
    pub fruit: i64,
    pub variety: i64,
    pub other_fruit: i64,
    pub other_variety: i64,
    pub admin: String,
    pub inspector_a: String,
    pub inspector_b: String,
}

impl World {
    pub async fn build() -> Result<Self> {
        let pool = pool().await?;
        let tag = uuid::Uuid::new_v4().simple().to_string();

        let region_name = format!("Region {}", tag);
        let fruit_name = format!("Apple {}", tag);
        let other_fruit_name = format!("Pear {}", tag);
        let fixture = ReferenceFixture {
            regions: vec![RegionFixture {
                name: region_name.clone(),
                districts: vec!["A".into(), "B".into()],
            }],
            fruits: vec![
                FruitFixture {
                    name: fruit_name.clone(),
                    varieties: vec!["Golden".into()],
                    rootstocks: vec!["M9".into()],
                },
                FruitFixture {
                    name: other_fruit_name.clone(),
                    varieties: vec!["Conference".into()],
                    rootstocks: vec![],
                },
            ],
        };
        reference_service::seed(&pool, &fixture).await?;

        let region = reference_service::regions(&pool)
            .await?
            .into_iter()
            .find(|r| r.name == region_name)
            .context("seeded region missing")?
            .id;
        let districts = reference_service::districts(&pool, Some(region)).await?;
        let district = |name: &str| districts.iter().find(|d| d.name == name).map(|d| d.id);

        let catalog = reference_service::fruits(&pool).await?;
        let fruit = catalog.iter().find(|f| f.name == fruit_name).context("seeded fruit missing")?;
        let other = catalog
            .iter()
            .find(|f| f.name == other_fruit_name)
            .context("seeded fruit missing")?;

        let world = Self {
            region,
            district_a: district("A").context("district A missing")?,
            district_b: district("B").context("district B missing")?,
            fruit: fruit.id,
            variety: fruit.varieties.first().context("variety missing")?.id,
            other_fruit: other.id,
            other_variety: other.varieties.first().context("variety missing")?.id,
            admin: format!("admin-{}", tag),
            inspector_a: format!("inspector-a-{}", tag),
            inspector_b: format!("inspector-b-{}", tag),
            pool,
        };

        world.user(&world.admin, None, true).await?;
        world.user(&world.inspector_a, Some(world.district_a), false).await?;
        world.user(&world.inspector_b, Some(world.district_b), false).await?;
        Ok(world)
    }

    async fn user(&self, username: &str, district: Option<i64>, is_superuser: bool) -> Result<()> {
        let request = CreateUserRequest {
            username: username.to_string(),
            password: PASSWORD.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            district,
            is_superuser,
        };
        user_service::create(&self.pool, &request).await?;
        Ok(())
    }

    /// Minimal valid plantation in `district`
    pub fn plantation(&self, district: i64, total_area: f64) -> Value {
        json!({
            "district": district,
            "garden_established_year": 2015,
            "total_area": total_area,
            "irrigation_area": 2.0,
            "not_usable_area": 1.0,
            "land_type": "адир",
            "coordinates": [{"latitude": 40.78, "longitude": 72.34}],
            "images": ["plantations/front.jpg"],
            "fruit_areas": [{
                "fruit": self.fruit,
                "variety": self.variety,
                "planted_year": 2016,
                "area": 3.0
            }]
        })
    }
}

/// Authenticated HTTP client bound to the spawned server
pub struct Session {
    client: reqwest::Client,
    base_url: String,
    token: String,
    _server: Arc<TestServer>,
}

impl Session {
    pub async fn login(username: &str) -> Result<Self> {
        let server = ensure_server().await?;
        let client = reqwest::Client::new();
        let res = client
            .post(format!("{}/login", server.base_url))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        let token = body["data"]["access"].as_str().context("access token missing")?.to_string();
        Ok(Self {
            client,
            base_url: server.base_url.clone(),
            token,
            _server: server,
        })
    }

    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let res = request.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, None).await
    }
}
