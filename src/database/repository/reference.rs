use sqlx::{PgExecutor, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{District, Fruit, FruitVariety, Region, Rootstock};

const DISTRICT_SELECT: &str =
    "SELECT d.id, d.region_id, r.name AS region_name, d.name FROM districts d JOIN regions r ON r.id = d.region_id";

pub async fn regions<'c, E: PgExecutor<'c>>(executor: E) -> Result<Vec<Region>, DatabaseError> {
    Ok(sqlx::query_as::<_, Region>("SELECT id, name FROM regions ORDER BY name, id")
        .fetch_all(executor)
        .await?)
}

pub async fn region_exists<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<bool, DatabaseError> {
    Ok(sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM regions WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await?)
}

pub async fn districts<'c, E: PgExecutor<'c>>(executor: E, region: Option<i64>) -> Result<Vec<District>, DatabaseError> {
    let mut qb = QueryBuilder::<Postgres>::new(DISTRICT_SELECT);
    if let Some(region) = region {
        qb.push(" WHERE d.region_id = ").push_bind(region);
    }
    qb.push(" ORDER BY d.name, d.id");
    Ok(qb.build_query_as::<District>().fetch_all(executor).await?)
}

pub async fn district<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<Option<District>, DatabaseError> {
    let sql = format!("{} WHERE d.id = $1", DISTRICT_SELECT);
    Ok(sqlx::query_as::<_, District>(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn insert_district<'c, E: PgExecutor<'c>>(executor: E, region: i64, name: &str) -> Result<i64, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("INSERT INTO districts (region_id, name) VALUES ($1, $2) RETURNING id")
        .bind(region)
        .bind(name)
        .fetch_one(executor)
        .await?)
}

pub async fn insert_region<'c, E: PgExecutor<'c>>(executor: E, name: &str) -> Result<i64, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("INSERT INTO regions (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(executor)
        .await?)
}

pub async fn region_id_by_name<'c, E: PgExecutor<'c>>(executor: E, name: &str) -> Result<Option<i64>, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT id FROM regions WHERE name = $1 ORDER BY id LIMIT 1")
        .bind(name)
        .fetch_optional(executor)
        .await?)
}

pub async fn district_id_by_name<'c, E: PgExecutor<'c>>(
    executor: E,
    region: i64,
    name: &str,
) -> Result<Option<i64>, DatabaseError> {
    Ok(
        sqlx::query_scalar::<_, i64>("SELECT id FROM districts WHERE region_id = $1 AND name = $2 ORDER BY id LIMIT 1")
            .bind(region)
            .bind(name)
            .fetch_optional(executor)
            .await?,
    )
}

pub async fn fruits<'c, E: PgExecutor<'c>>(executor: E) -> Result<Vec<Fruit>, DatabaseError> {
    Ok(sqlx::query_as::<_, Fruit>("SELECT id, name FROM fruits ORDER BY name, id")
        .fetch_all(executor)
        .await?)
}

pub async fn varieties<'c, E: PgExecutor<'c>>(executor: E) -> Result<Vec<FruitVariety>, DatabaseError> {
    Ok(sqlx::query_as::<_, FruitVariety>("SELECT id, fruit_id, name FROM fruit_varieties ORDER BY name, id")
        .fetch_all(executor)
        .await?)
}

pub async fn fruit_exists<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<bool, DatabaseError> {
    Ok(sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM fruits WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await?)
}

pub async fn fruit_id_by_name<'c, E: PgExecutor<'c>>(executor: E, name: &str) -> Result<Option<i64>, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT id FROM fruits WHERE name = $1 ORDER BY id LIMIT 1")
        .bind(name)
        .fetch_optional(executor)
        .await?)
}

pub async fn insert_fruit<'c, E: PgExecutor<'c>>(executor: E, name: &str) -> Result<i64, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("INSERT INTO fruits (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(executor)
        .await?)
}

/// Fruit the variety belongs to, if the variety exists
pub async fn variety_fruit<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<Option<i64>, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT fruit_id FROM fruit_varieties WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn insert_variety_if_missing<'c, E: PgExecutor<'c>>(
    executor: E,
    fruit: i64,
    name: &str,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO fruit_varieties (fruit_id, name) SELECT $1, $2 \
         WHERE NOT EXISTS (SELECT 1 FROM fruit_varieties WHERE fruit_id = $1 AND name = $2)",
    )
    .bind(fruit)
    .bind(name)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn rootstocks<'c, E: PgExecutor<'c>>(executor: E, fruit: Option<i64>) -> Result<Vec<Rootstock>, DatabaseError> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT id, fruit_id, name FROM rootstocks");
    if let Some(fruit) = fruit {
        qb.push(" WHERE fruit_id = ").push_bind(fruit);
    }
    qb.push(" ORDER BY name, id");
    Ok(qb.build_query_as::<Rootstock>().fetch_all(executor).await?)
}

pub async fn rootstock<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<Option<Rootstock>, DatabaseError> {
    Ok(sqlx::query_as::<_, Rootstock>("SELECT id, fruit_id, name FROM rootstocks WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn rootstock_fruit<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<Option<i64>, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT fruit_id FROM rootstocks WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn insert_rootstock<'c, E: PgExecutor<'c>>(executor: E, fruit: i64, name: &str) -> Result<Rootstock, DatabaseError> {
    Ok(sqlx::query_as::<_, Rootstock>(
        "INSERT INTO rootstocks (fruit_id, name) VALUES ($1, $2) RETURNING id, fruit_id, name",
    )
    .bind(fruit)
    .bind(name)
    .fetch_one(executor)
    .await?)
}

pub async fn insert_rootstock_if_missing<'c, E: PgExecutor<'c>>(
    executor: E,
    fruit: i64,
    name: &str,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO rootstocks (fruit_id, name) SELECT $1, $2 \
         WHERE NOT EXISTS (SELECT 1 FROM rootstocks WHERE fruit_id = $1 AND name = $2)",
    )
    .bind(fruit)
    .bind(name)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_rootstock<'c, E: PgExecutor<'c>>(
    executor: E,
    id: i64,
    fruit: i64,
    name: &str,
) -> Result<Rootstock, DatabaseError> {
    sqlx::query_as::<_, Rootstock>(
        "UPDATE rootstocks SET fruit_id = $1, name = $2 WHERE id = $3 RETURNING id, fruit_id, name",
    )
    .bind(fruit)
    .bind(name)
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Rootstock {} not found", id)))
}

pub async fn delete_rootstock<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM rootstocks WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Rootstock {} not found", id)));
    }
    Ok(())
}
