use sqlx::PgExecutor;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

const USER_COLUMNS: &str = "id, username, password_hash, first_name, last_name, phone_number, district_id, \
     is_superuser, is_active, date_joined";

/// Fields of a new account; the password is already hashed
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: &'a str,
    pub district_id: Option<i64>,
    pub is_superuser: bool,
}

pub async fn by_id<'c, E: PgExecutor<'c>>(executor: E, id: i64) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn by_username<'c, E: PgExecutor<'c>>(executor: E, username: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).bind(username).fetch_optional(executor).await?)
}

pub async fn list<'c, E: PgExecutor<'c>>(executor: E) -> Result<Vec<User>, DatabaseError> {
    let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(executor).await?)
}

pub async fn insert<'c, E: PgExecutor<'c>>(executor: E, user: &NewUser<'_>) -> Result<User, DatabaseError> {
    let sql = format!(
        "INSERT INTO users (username, password_hash, first_name, last_name, phone_number, district_id, is_superuser) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
        USER_COLUMNS
    );
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.phone_number)
        .bind(user.district_id)
        .bind(user.is_superuser)
        .fetch_one(executor)
        .await?)
}
