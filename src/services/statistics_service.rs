use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::ServiceError;
use crate::api::format::empty_area;
use crate::database::DatabaseError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlantationCounts {
    pub total: i64,
    pub checked: i64,
    pub pending_review: i64,
    pub deleting: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaTotals {
    pub total: f64,
    pub irrigation: f64,
    pub not_usable: f64,
    pub fruit: f64,
    pub empty: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegionStatistics {
    pub region_id: i64,
    pub region: String,
    pub plantations: i64,
    pub total_area: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FruitStatistics {
    pub fruit_id: i64,
    pub fruit: String,
    pub area: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubsidyStatistics {
    pub count: i64,
    pub amount: Decimal,
    pub effective: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub plantations: PlantationCounts,
    pub areas: AreaTotals,
    pub regions: Vec<RegionStatistics>,
    pub fruits: Vec<FruitStatistics>,
    pub subsidies: SubsidyStatistics,
}

#[derive(FromRow)]
struct AreaRow {
    total: f64,
    irrigation: f64,
    not_usable: f64,
    fruit: f64,
}

async fn plantation_counts(pool: &PgPool) -> Result<PlantationCounts, DatabaseError> {
    Ok(sqlx::query_as::<_, PlantationCounts>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE is_checked) AS checked,
               COUNT(*) FILTER (WHERE NOT is_checked AND prev_data <> '{}'::jsonb) AS pending_review,
               COUNT(*) FILTER (WHERE is_deleting) AS deleting
        FROM plantations
        "#,
    )
    .fetch_one(pool)
    .await?)
}

async fn area_totals(pool: &PgPool) -> Result<AreaTotals, DatabaseError> {
    let row = sqlx::query_as::<_, AreaRow>(
        r#"
        SELECT COALESCE(SUM(total_area), 0)::float8 AS total,
               COALESCE(SUM(irrigation_area), 0)::float8 AS irrigation,
               COALESCE(SUM(not_usable_area), 0)::float8 AS not_usable,
               (SELECT COALESCE(SUM(area), 0)::float8 FROM plantation_fruit_areas) AS fruit
        FROM plantations
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(AreaTotals {
        empty: empty_area(row.total, row.irrigation, row.not_usable, row.fruit),
        total: row.total,
        irrigation: row.irrigation,
        not_usable: row.not_usable,
        fruit: row.fruit,
    })
}

async fn by_region(pool: &PgPool) -> Result<Vec<RegionStatistics>, DatabaseError> {
    Ok(sqlx::query_as::<_, RegionStatistics>(
        r#"
        SELECT r.id AS region_id, r.name AS region,
               COUNT(p.id) AS plantations,
               COALESCE(SUM(p.total_area), 0)::float8 AS total_area
        FROM regions r
        LEFT JOIN districts d ON d.region_id = r.id
        LEFT JOIN plantations p ON p.district_id = d.id
        GROUP BY r.id, r.name
        ORDER BY r.name, r.id
        "#,
    )
    .fetch_all(pool)
    .await?)
}

async fn by_fruit(pool: &PgPool) -> Result<Vec<FruitStatistics>, DatabaseError> {
    Ok(sqlx::query_as::<_, FruitStatistics>(
        r#"
        SELECT f.id AS fruit_id, f.name AS fruit, COALESCE(SUM(fa.area), 0)::float8 AS area
        FROM fruits f
        LEFT JOIN plantation_fruit_areas fa ON fa.fruit_id = f.id
        GROUP BY f.id, f.name
        ORDER BY f.name, f.id
        "#,
    )
    .fetch_all(pool)
    .await?)
}

async fn subsidy_totals(pool: &PgPool) -> Result<SubsidyStatistics, DatabaseError> {
    Ok(sqlx::query_as::<_, SubsidyStatistics>(
        r#"
        SELECT COUNT(*) AS count,
               COALESCE(SUM(amount), 0) AS amount,
               COUNT(*) FILTER (WHERE efficiency) AS effective
        FROM subsidies
        "#,
    )
    .fetch_one(pool)
    .await?)
}

/// Registry-wide aggregates, one query per section run concurrently
pub async fn collect(pool: &PgPool) -> Result<Statistics, ServiceError> {
    let (plantations, areas, regions, fruits, subsidies) = futures::try_join!(
        plantation_counts(pool),
        area_totals(pool),
        by_region(pool),
        by_fruit(pool),
        subsidy_totals(pool),
    )?;

    Ok(Statistics {
        plantations,
        areas,
        regions,
        fruits,
        subsidies,
    })
}
