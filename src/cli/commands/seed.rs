use anyhow::Context;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

use crate::cli::{connect, utils::output_success, OutputFormat};
use crate::services::reference_service::{self, ReferenceFixture};

pub async fn handle(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let content = fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    let fixture: ReferenceFixture =
        serde_yaml::from_str(&content).with_context(|| format!("Invalid fixture {}", file.display()))?;

    let pool = connect().await?;
    let report = reference_service::seed(&pool, &fixture).await?;

    output_success(
        &output_format,
        &format!(
            "Seeded {} regions, {} districts, {} fruits, {} varieties, {} rootstocks",
            report.regions, report.districts, report.fruits, report.varieties, report.rootstocks
        ),
        Some(json!({ "inserted": report })),
    )
}
