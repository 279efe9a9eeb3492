use sqlx::{PgExecutor, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{Farmer, FarmerInput};
use crate::filter::{Pagination, Visibility};

const FARMER_COLUMNS: &str =
    "f.id, f.name, f.founder_name, f.director_name, f.phone_number, f.email, f.address, f.inn, f.established_year";

/// Push the farmer scope: unlinked farmers plus those whose plantation is visible
fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, visibility: Visibility) {
    match visibility {
        Visibility::All => {}
        Visibility::District(district_id) => {
            qb.push(
                " AND (NOT EXISTS (SELECT 1 FROM plantations p WHERE p.farmer_id = f.id) \
                 OR EXISTS (SELECT 1 FROM plantations p WHERE p.farmer_id = f.id AND p.district_id = ",
            )
            .push_bind(district_id)
            .push("))");
        }
        Visibility::Nothing => {
            qb.push(" AND NOT EXISTS (SELECT 1 FROM plantations p WHERE p.farmer_id = f.id)");
        }
    }
}

pub async fn list<'c, E: PgExecutor<'c>>(
    executor: E,
    visibility: Visibility,
    pagination: Pagination,
) -> Result<Vec<Farmer>, DatabaseError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM farmers f WHERE TRUE", FARMER_COLUMNS));
    push_scope(&mut qb, visibility);
    qb.push(" ORDER BY f.id ASC LIMIT ").push_bind(pagination.limit);
    qb.push(" OFFSET ").push_bind(pagination.offset);
    Ok(qb.build_query_as::<Farmer>().fetch_all(executor).await?)
}

/// Fetch a farmer only if it falls inside the caller's scope
pub async fn fetch_scoped<'c, E: PgExecutor<'c>>(
    executor: E,
    id: i64,
    visibility: Visibility,
) -> Result<Option<Farmer>, DatabaseError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM farmers f WHERE f.id = ", FARMER_COLUMNS));
    qb.push_bind(id);
    push_scope(&mut qb, visibility);
    Ok(qb.build_query_as::<Farmer>().fetch_optional(executor).await?)
}

pub async fn exists<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<bool, DatabaseError> {
    Ok(sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM farmers WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await?)
}

/// Plantation the farmer is already linked to, if any
pub async fn linked_plantation<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<Option<i64>, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT id FROM plantations WHERE farmer_id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn insert<'c, E: PgExecutor<'c>>(executor: E, input: &FarmerInput) -> Result<Farmer, DatabaseError> {
    Ok(sqlx::query_as::<_, Farmer>(
        r#"
        INSERT INTO farmers (name, founder_name, director_name, phone_number, email, address, inn, established_year)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, name, founder_name, director_name, phone_number, email, address, inn, established_year
        "#,
    )
    .bind(&input.name)
    .bind(&input.founder_name)
    .bind(&input.director_name)
    .bind(&input.phone_number)
    .bind(&input.email)
    .bind(&input.address)
    .bind(&input.inn)
    .bind(input.established_year)
    .fetch_one(executor)
    .await?)
}

pub async fn update<'c, E: PgExecutor<'c>>(executor: E, id: i64, input: &FarmerInput) -> Result<Farmer, DatabaseError> {
    sqlx::query_as::<_, Farmer>(
        r#"
        UPDATE farmers SET
            name = $1, founder_name = $2, director_name = $3, phone_number = $4,
            email = $5, address = $6, inn = $7, established_year = $8
        WHERE id = $9
        RETURNING id, name, founder_name, director_name, phone_number, email, address, inn, established_year
        "#,
    )
    .bind(&input.name)
    .bind(&input.founder_name)
    .bind(&input.director_name)
    .bind(&input.phone_number)
    .bind(&input.email)
    .bind(&input.address)
    .bind(&input.inn)
    .bind(input.established_year)
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Farmer {} not found", id)))
}

pub async fn delete<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM farmers WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Farmer {} not found", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn district_scope_includes_unlinked_farmers() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT f.id FROM farmers f WHERE TRUE");
        push_scope(&mut qb, Visibility::District(5));
        let sql = qb.sql();
        assert!(sql.contains("NOT EXISTS"));
        assert!(sql.ends_with("p.district_id = $1))"));
    }

    #[test]
    fn superuser_scope_adds_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT f.id FROM farmers f WHERE TRUE");
        push_scope(&mut qb, Visibility::All);
        assert_eq!(qb.sql(), "SELECT f.id FROM farmers f WHERE TRUE");
    }
}
