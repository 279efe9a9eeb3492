use sqlx::PgPool;

use super::{ensure_valid, ServiceError};
use crate::config::config;
use crate::database::models::{Farmer, FarmerInput};
use crate::database::repository::farmer as farmers;
use crate::error::FieldErrors;
use crate::filter::{Filter, ListParams, Visibility};
use crate::middleware::AuthUser;

fn validate(input: &FarmerInput) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let mut check = |field: &str, value: &str, max: usize| {
        if value.trim().is_empty() {
            errors.entry(field.to_string()).or_default().push("This field is required".into());
        } else if value.chars().count() > max {
            errors
                .entry(field.to_string())
                .or_default()
                .push(format!("Ensure this field has no more than {} characters", max));
        }
    };

    check("name", &input.name, 100);
    check("founder_name", &input.founder_name, 100);
    check("director_name", &input.director_name, 100);
    check("phone_number", &input.phone_number, 20);
    check("address", &input.address, 10_000);
    check("inn", &input.inn, 20);

    if let Some(email) = &input.email {
        if !email.is_empty() && !email.contains('@') {
            errors.entry("email".into()).or_default().push("Enter a valid email address".into());
        }
    }
    if input.established_year < 1900 {
        errors
            .entry("established_year".into())
            .or_default()
            .push("Year must not be before 1900".into());
    }
    errors
}

pub async fn list(pool: &PgPool, caller: &AuthUser, params: ListParams) -> Result<Vec<Farmer>, ServiceError> {
    let filter = Filter::new(params, &[], config().api.max_list_limit)?;
    Ok(farmers::list(pool, Visibility::for_caller(caller), filter.pagination).await?)
}

/// Farmer within the caller's scope; one linked to another district reads as missing
pub async fn get(pool: &PgPool, caller: &AuthUser, id: i64) -> Result<Farmer, ServiceError> {
    farmers::fetch_scoped(pool, id, Visibility::for_caller(caller))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Farmer {} not found", id)))
}

pub async fn create(pool: &PgPool, input: &FarmerInput) -> Result<Farmer, ServiceError> {
    ensure_valid(validate(input))?;
    let farmer = farmers::insert(pool, input).await?;
    tracing::info!("Created farmer {} ({})", farmer.id, farmer.name);
    Ok(farmer)
}

pub async fn update(pool: &PgPool, caller: &AuthUser, id: i64, input: &FarmerInput) -> Result<Farmer, ServiceError> {
    ensure_valid(validate(input))?;
    get(pool, caller, id).await?;
    let farmer = farmers::update(pool, id, input).await?;
    tracing::info!("Updated farmer {}", id);
    Ok(farmer)
}

pub async fn delete(pool: &PgPool, caller: &AuthUser, id: i64) -> Result<(), ServiceError> {
    get(pool, caller, id).await?;
    farmers::delete(pool, id).await?;
    tracing::info!("Deleted farmer {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(overrides: serde_json::Value) -> FarmerInput {
        let mut body = json!({
            "name": "Боғбон",
            "founder_name": "Алиев",
            "director_name": "Алиев",
            "phone_number": "+998901234567",
            "address": "Чирчиқ",
            "inn": "301234567",
            "established_year": 2004
        });
        if let (Some(body), Some(overrides)) = (body.as_object_mut(), overrides.as_object()) {
            for (k, v) in overrides {
                body.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn complete_farmer_is_valid() {
        assert!(validate(&input(json!({}))).is_empty());
    }

    #[test]
    fn flags_blank_and_oversized_fields() {
        let errors = validate(&input(json!({
            "name": "",
            "inn": "1234567890123456789012",
            "email": "not-an-email"
        })));
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("inn"));
        assert!(errors.contains_key("email"));
    }
}
