use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{ensure_valid, ServiceError};
use crate::database::models::{District, DistrictInput, FruitVariety, Region, Rootstock, RootstockInput};
use crate::database::repository::reference;
use crate::error::FieldErrors;

/// Fruit with the varieties and rootstocks that may be planted under it
#[derive(Debug, Clone, Serialize)]
pub struct FruitCatalogEntry {
    pub id: i64,
    pub name: String,
    pub varieties: Vec<FruitVariety>,
    pub rootstocks: Vec<Rootstock>,
}

pub async fn regions(pool: &PgPool) -> Result<Vec<Region>, ServiceError> {
    Ok(reference::regions(pool).await?)
}

pub async fn districts(pool: &PgPool, region: Option<i64>) -> Result<Vec<District>, ServiceError> {
    Ok(reference::districts(pool, region).await?)
}

fn name_errors(name: &str, max: usize) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if name.trim().is_empty() {
        errors.entry("name".into()).or_default().push("Name is required".into());
    } else if name.chars().count() > max {
        errors
            .entry("name".into())
            .or_default()
            .push(format!("Ensure this field has no more than {} characters", max));
    }
    errors
}

pub async fn create_district(pool: &PgPool, input: &DistrictInput) -> Result<District, ServiceError> {
    ensure_valid(name_errors(&input.name, 100))?;
    if !reference::region_exists(pool, input.region).await? {
        return Err(ServiceError::NotFound(format!("Region {} not found", input.region)));
    }

    let id = reference::insert_district(pool, input.region, input.name.trim()).await?;
    tracing::info!("Created district {} ({}) in region {}", id, input.name, input.region);

    reference::district(pool, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("District {} not found", id)))
}

pub async fn fruits(pool: &PgPool) -> Result<Vec<FruitCatalogEntry>, ServiceError> {
    let (fruits, varieties, rootstocks) = futures::try_join!(
        reference::fruits(pool),
        reference::varieties(pool),
        reference::rootstocks(pool, None),
    )?;

    Ok(fruits
        .into_iter()
        .map(|fruit| FruitCatalogEntry {
            varieties: varieties.iter().filter(|v| v.fruit_id == fruit.id).cloned().collect(),
            rootstocks: rootstocks.iter().filter(|r| r.fruit_id == fruit.id).cloned().collect(),
            id: fruit.id,
            name: fruit.name,
        })
        .collect())
}

pub async fn rootstocks(pool: &PgPool, fruit: Option<i64>) -> Result<Vec<Rootstock>, ServiceError> {
    Ok(reference::rootstocks(pool, fruit).await?)
}

pub async fn rootstock(pool: &PgPool, id: i64) -> Result<Rootstock, ServiceError> {
    reference::rootstock(pool, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Rootstock {} not found", id)))
}

async fn check_rootstock_input(pool: &PgPool, input: &RootstockInput) -> Result<(), ServiceError> {
    ensure_valid(name_errors(&input.name, 250))?;
    if !reference::fruit_exists(pool, input.fruit).await? {
        return Err(ServiceError::NotFound(format!("Fruit {} not found", input.fruit)));
    }
    Ok(())
}

pub async fn create_rootstock(pool: &PgPool, input: &RootstockInput) -> Result<Rootstock, ServiceError> {
    check_rootstock_input(pool, input).await?;
    let rootstock = reference::insert_rootstock(pool, input.fruit, input.name.trim()).await?;
    tracing::info!("Created rootstock {} for fruit {}", rootstock.id, rootstock.fruit_id);
    Ok(rootstock)
}

pub async fn update_rootstock(pool: &PgPool, id: i64, input: &RootstockInput) -> Result<Rootstock, ServiceError> {
    check_rootstock_input(pool, input).await?;
    Ok(reference::update_rootstock(pool, id, input.fruit, input.name.trim()).await?)
}

pub async fn delete_rootstock(pool: &PgPool, id: i64) -> Result<(), ServiceError> {
    reference::delete_rootstock(pool, id).await?;
    tracing::info!("Deleted rootstock {}", id);
    Ok(())
}

/// Reference data loaded by `plantation-admin seed`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceFixture {
    #[serde(default)]
    pub regions: Vec<RegionFixture>,
    #[serde(default)]
    pub fruits: Vec<FruitFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionFixture {
    pub name: String,
    #[serde(default)]
    pub districts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FruitFixture {
    pub name: String,
    #[serde(default)]
    pub varieties: Vec<String>,
    #[serde(default)]
    pub rootstocks: Vec<String>,
}

/// Rows inserted by a seed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub regions: usize,
    pub districts: usize,
    pub fruits: usize,
    pub varieties: usize,
    pub rootstocks: usize,
}

/// Insert missing reference rows, matched by name. Running it twice inserts nothing new.
pub async fn seed(pool: &PgPool, fixture: &ReferenceFixture) -> Result<SeedReport, ServiceError> {
    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();

    for region in &fixture.regions {
        let region_id = match reference::region_id_by_name(&mut *tx, &region.name).await? {
            Some(id) => id,
            None => {
                report.regions += 1;
                reference::insert_region(&mut *tx, &region.name).await?
            }
        };

        for district in &region.districts {
            if reference::district_id_by_name(&mut *tx, region_id, district).await?.is_none() {
                reference::insert_district(&mut *tx, region_id, district).await?;
                report.districts += 1;
            }
        }
    }

    for fruit in &fixture.fruits {
        let fruit_id = match reference::fruit_id_by_name(&mut *tx, &fruit.name).await? {
            Some(id) => id,
            None => {
                report.fruits += 1;
                reference::insert_fruit(&mut *tx, &fruit.name).await?
            }
        };

        for variety in &fruit.varieties {
            if reference::insert_variety_if_missing(&mut *tx, fruit_id, variety).await? {
                report.varieties += 1;
            }
        }
        for rootstock in &fruit.rootstocks {
            if reference::insert_rootstock_if_missing(&mut *tx, fruit_id, rootstock).await? {
                report.rootstocks += 1;
            }
        }
    }

    tx.commit().await?;
    tracing::info!("Seeded reference data: {:?}", report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_fixture() {
        let yaml = r#"
regions:
  - name: Тошкент вилояти
    districts: [Чирчиқ, Бўстонлиқ]
fruits:
  - name: Олма
    varieties: [Голден]
    rootstocks: [M9]
  - name: Гилос
"#;
        let fixture: ReferenceFixture = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(fixture.regions[0].districts.len(), 2);
        assert_eq!(fixture.fruits[0].rootstocks, vec!["M9"]);
        assert!(fixture.fruits[1].varieties.is_empty());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(name_errors("  ", 100).contains_key("name"));
        assert!(name_errors("Чирчиқ", 100).is_empty());
        assert!(name_errors(&"x".repeat(101), 100).contains_key("name"));
    }
}
