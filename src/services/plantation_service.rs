use sqlx::{PgConnection, PgPool};

use super::ServiceError;
use crate::api::format::{self, MapItem, PlantationChildren, PlantationDetail};
use crate::config::config;
use crate::database::models::{Plantation, PlantationInput, PlantationPatch, PlantationSummary};
use crate::database::repository::plantation as plantations;
use crate::filter::{Filter, ListParams, Visibility};
use crate::middleware::AuthUser;
use crate::observer::{plantation_writes, ObserverContext, Operation, Submission};

fn list_filter(params: ListParams) -> Result<Filter, ServiceError> {
    Ok(Filter::new(params, plantations::ORDER_COLUMNS, config().api.max_list_limit)?)
}

pub async fn list(pool: &PgPool, caller: &AuthUser, params: ListParams) -> Result<Vec<PlantationSummary>, ServiceError> {
    let filter = list_filter(params)?;
    let mut conn = pool.acquire().await?;
    Ok(plantations::list_summaries(&mut conn, Visibility::for_caller(caller), &filter).await?)
}

pub async fn list_full(
    pool: &PgPool,
    caller: &AuthUser,
    params: ListParams,
) -> Result<Vec<PlantationDetail>, ServiceError> {
    let filter = list_filter(params)?;
    let mut conn = pool.acquire().await?;
    let rows = plantations::list_rows(&mut conn, Visibility::for_caller(caller), &filter).await?;
    load_details(&mut conn, rows).await
}

pub async fn map(pool: &PgPool, caller: &AuthUser, params: ListParams) -> Result<Vec<MapItem>, ServiceError> {
    let filter = list_filter(params)?;
    let mut conn = pool.acquire().await?;
    let rows = plantations::list_rows(&mut conn, Visibility::for_caller(caller), &filter).await?;
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let coordinates = plantations::coordinates_for(&mut conn, &ids).await?;
    Ok(format::map_items(rows, coordinates))
}

pub async fn get(pool: &PgPool, caller: &AuthUser, id: i64) -> Result<PlantationDetail, ServiceError> {
    let mut conn = pool.acquire().await?;
    detail(&mut conn, caller, id).await
}

pub async fn create(pool: &PgPool, caller: &AuthUser, input: PlantationInput) -> Result<PlantationDetail, ServiceError> {
    let id = run_write(pool, caller, Operation::Create, None, Submission::Full(Box::new(input))).await?;
    get(pool, caller, id).await
}

/// Full replacement: every collection is recreated from the submission
pub async fn replace(
    pool: &PgPool,
    caller: &AuthUser,
    id: i64,
    input: PlantationInput,
) -> Result<PlantationDetail, ServiceError> {
    run_write(pool, caller, Operation::Update, Some(id), Submission::Full(Box::new(input))).await?;
    get(pool, caller, id).await
}

pub async fn patch(
    pool: &PgPool,
    caller: &AuthUser,
    id: i64,
    patch: PlantationPatch,
) -> Result<PlantationDetail, ServiceError> {
    run_write(pool, caller, Operation::Update, Some(id), Submission::Partial(Box::new(patch))).await?;
    get(pool, caller, id).await
}

/// Delete the plantation and every row it owns in one transaction
pub async fn delete(pool: &PgPool, caller: &AuthUser, id: i64) -> Result<(), ServiceError> {
    run_write(pool, caller, Operation::Delete, Some(id), Submission::Empty).await?;
    Ok(())
}

async fn run_write(
    pool: &PgPool,
    caller: &AuthUser,
    operation: Operation,
    id: Option<i64>,
    submission: Submission,
) -> Result<i64, ServiceError> {
    let tx = pool.begin().await?;
    let ctx = ObserverContext::new(operation, caller.clone(), id, submission, tx);

    let ctx = plantation_writes().execute(ctx).await?;
    let saved_id = ctx.saved_id;
    ctx.tx.commit().await?;

    saved_id.ok_or_else(|| ServiceError::NotFound("Plantation was not saved".to_string()))
}

async fn detail(conn: &mut PgConnection, caller: &AuthUser, id: i64) -> Result<PlantationDetail, ServiceError> {
    let row = plantations::fetch(conn, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Plantation {} not found", id)))?;

    if !Visibility::for_caller(caller).allows(row.district_id) {
        return Err(ServiceError::PermissionDenied(format!(
            "Plantation {} belongs to another district",
            id
        )));
    }

    load_details(conn, vec![row])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::NotFound(format!("Plantation {} not found", id)))
}

async fn load_details(conn: &mut PgConnection, rows: Vec<Plantation>) -> Result<Vec<PlantationDetail>, ServiceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut district_ids: Vec<i64> = rows.iter().map(|row| row.district_id).collect();
    district_ids.sort_unstable();
    district_ids.dedup();
    let farmer_ids: Vec<i64> = rows.iter().filter_map(|row| row.farmer_id).collect();

    let children = PlantationChildren {
        districts: plantations::districts_by_ids(conn, &district_ids).await?,
        farmers: plantations::farmers_by_ids(conn, &farmer_ids).await?,
        coordinates: plantations::coordinates_for(conn, &ids).await?,
        images: plantations::images_for(conn, &ids).await?,
        fruit_areas: plantations::fruit_areas_for(conn, &ids).await?,
        subsidies: plantations::subsidies_for(conn, &ids).await?,
        investments: plantations::investments_for(conn, &ids).await?,
        reservoirs: plantations::reservoirs_for(conn, &ids).await?,
        trellises: plantations::trellises_for(conn, &ids).await?,
    };

    Ok(format::plantation_details(rows, children, &config().media.base_url))
}
