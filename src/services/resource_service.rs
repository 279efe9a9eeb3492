use sqlx::PgPool;

use super::{ensure_valid, ServiceError};
use crate::config::config;
use crate::database::repository::{plantation as plantations, ChildResource, Repository};
use crate::filter::{Filter, ListParams, Visibility};
use crate::middleware::AuthUser;

/// Caller must be able to see the plantation that owns the row
async fn check_owner(pool: &PgPool, caller: &AuthUser, plantation_id: i64) -> Result<(), ServiceError> {
    let mut conn = pool.acquire().await?;
    let district_id = plantations::district_of(&mut conn, plantation_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Plantation {} not found", plantation_id)))?;

    if !Visibility::for_caller(caller).allows(district_id) {
        return Err(ServiceError::PermissionDenied(format!(
            "Plantation {} belongs to another district",
            plantation_id
        )));
    }
    Ok(())
}

pub async fn list<T: ChildResource>(
    pool: &PgPool,
    caller: &AuthUser,
    params: ListParams,
) -> Result<Vec<T>, ServiceError> {
    let plantation = params.plantation;
    let filter = Filter::new(params, &[], config().api.max_list_limit)?;
    Ok(Repository::<T>::new(pool.clone())
        .select_any(Visibility::for_caller(caller), plantation, filter.pagination)
        .await?)
}

pub async fn get<T: ChildResource>(pool: &PgPool, caller: &AuthUser, id: i64) -> Result<T, ServiceError> {
    let row = Repository::<T>::new(pool.clone()).select_404(id).await?;
    check_owner(pool, caller, row.owner()).await?;
    Ok(row)
}

pub async fn create<T: ChildResource>(pool: &PgPool, caller: &AuthUser, input: T::Input) -> Result<T, ServiceError> {
    ensure_valid(T::validate(&input))?;
    check_owner(pool, caller, T::input_owner(&input)).await?;

    let row = Repository::<T>::new(pool.clone()).insert(&input).await?;
    tracing::info!("Created {} for plantation {}", T::LABEL, row.owner());
    Ok(row)
}

/// Replace a row; both the current and the new owner must be visible
pub async fn update<T: ChildResource>(
    pool: &PgPool,
    caller: &AuthUser,
    id: i64,
    input: T::Input,
) -> Result<T, ServiceError> {
    ensure_valid(T::validate(&input))?;

    let repository = Repository::<T>::new(pool.clone());
    let current = repository.select_404(id).await?;
    check_owner(pool, caller, current.owner()).await?;
    if T::input_owner(&input) != current.owner() {
        check_owner(pool, caller, T::input_owner(&input)).await?;
    }

    let row = repository.update(id, &input).await?;
    tracing::info!("Updated {} {}", T::LABEL, id);
    Ok(row)
}

pub async fn delete<T: ChildResource>(pool: &PgPool, caller: &AuthUser, id: i64) -> Result<(), ServiceError> {
    let repository = Repository::<T>::new(pool.clone());
    let current = repository.select_404(id).await?;
    check_owner(pool, caller, current.owner()).await?;

    repository.delete(id).await?;
    tracing::info!("Deleted {} {}", T::LABEL, id);
    Ok(())
}
