use std::marker::PhantomData;

use serde::Serialize;
use sqlx::{
    postgres::PgRow,
    query_builder::Separated,
    FromRow, PgPool, Postgres, QueryBuilder,
};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Investment, InvestmentInput, Reservoir, ReservoirInput, Subsidy, SubsidyInput, Trellis, TrellisInput,
};
use crate::error::FieldErrors;
use crate::filter::{Pagination, Visibility};

/// A table of rows owned by one plantation, managed through its own endpoints
pub trait ChildResource: for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static {
    type Input: Send + Sync;

    const TABLE: &'static str;
    const LABEL: &'static str;
    /// Writable columns, in the order `push_values` binds them (excluding `plantation_id`)
    const COLUMNS: &'static [&'static str];

    fn owner(&self) -> i64;

    fn input_owner(input: &Self::Input) -> i64;

    fn push_values(input: &Self::Input, row: &mut Separated<'_, '_, Postgres, &'static str>);

    fn validate(_input: &Self::Input) -> FieldErrors {
        FieldErrors::new()
    }
}

fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

impl ChildResource for Subsidy {
    type Input = SubsidyInput;

    const TABLE: &'static str = "subsidies";
    const LABEL: &'static str = "Subsidy";
    const COLUMNS: &'static [&'static str] = &["year", "contract_number", "direction", "amount", "efficiency"];

    fn owner(&self) -> i64 {
        self.plantation_id
    }

    fn input_owner(input: &SubsidyInput) -> i64 {
        input.plantation
    }

    fn push_values(input: &SubsidyInput, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(input.year)
            .push_bind(input.contract_number.clone())
            .push_bind(input.direction.clone())
            .push_bind(input.amount)
            .push_bind(input.efficiency);
    }

    fn validate(input: &SubsidyInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if input.contract_number.trim().is_empty() {
            push_error(&mut errors, "contract_number", "Contract number is required");
        }
        if input.contract_number.chars().count() > 50 {
            push_error(&mut errors, "contract_number", "Ensure this field has no more than 50 characters");
        }
        if input.direction.trim().is_empty() {
            push_error(&mut errors, "direction", "Direction is required");
        }
        if input.direction.chars().count() > 100 {
            push_error(&mut errors, "direction", "Ensure this field has no more than 100 characters");
        }
        if input.amount.is_sign_negative() {
            push_error(&mut errors, "amount", "Amount must not be negative");
        }
        errors
    }
}

impl ChildResource for Investment {
    type Input = InvestmentInput;

    const TABLE: &'static str = "investments";
    const LABEL: &'static str = "Investment";
    const COLUMNS: &'static [&'static str] = &["invest_type", "investment_amount"];

    fn owner(&self) -> i64 {
        self.plantation_id
    }

    fn input_owner(input: &InvestmentInput) -> i64 {
        input.plantation
    }

    fn push_values(input: &InvestmentInput, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(input.fields.invest_type)
            .push_bind(input.fields.investment_amount);
    }

    fn validate(input: &InvestmentInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if input.fields.investment_amount.is_sign_negative() {
            push_error(&mut errors, "investment_amount", "Investment amount must not be negative");
        }
        errors
    }
}

impl ChildResource for Reservoir {
    type Input = ReservoirInput;

    const TABLE: &'static str = "reservoirs";
    const LABEL: &'static str = "Reservoir";
    const COLUMNS: &'static [&'static str] = &["reservoir_type", "reservoir_volume"];

    fn owner(&self) -> i64 {
        self.plantation_id
    }

    fn input_owner(input: &ReservoirInput) -> i64 {
        input.plantation
    }

    fn push_values(input: &ReservoirInput, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(input.fields.reservoir_type)
            .push_bind(input.fields.reservoir_volume);
    }

    fn validate(input: &ReservoirInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if matches!(input.fields.reservoir_volume, Some(v) if v < 0.0) {
            push_error(&mut errors, "reservoir_volume", "Reservoir volume must not be negative");
        }
        errors
    }
}

impl ChildResource for Trellis {
    type Input = TrellisInput;

    const TABLE: &'static str = "trellises";
    const LABEL: &'static str = "Trellis";
    const COLUMNS: &'static [&'static str] = &["trellis_installed_area", "trellis_type", "trellis_count"];

    fn owner(&self) -> i64 {
        self.plantation_id
    }

    fn input_owner(input: &TrellisInput) -> i64 {
        input.plantation
    }

    fn push_values(input: &TrellisInput, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(input.fields.trellis_installed_area)
            .push_bind(input.fields.trellis_type)
            .push_bind(input.fields.trellis_count);
    }

    fn validate(input: &TrellisInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if input.fields.trellis_installed_area < 0.0 {
            push_error(&mut errors, "trellis_installed_area", "Installed area must not be negative");
        }
        if input.fields.trellis_count < 0 {
            push_error(&mut errors, "trellis_count", "Trellis count must not be negative");
        }
        errors
    }
}

/// Generic CRUD over a `ChildResource` table, scoped through the owning plantation
pub struct Repository<T> {
    pool: PgPool,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: ChildResource> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    pub async fn select_any(
        &self,
        visibility: Visibility,
        plantation: Option<i64>,
        pagination: Pagination,
    ) -> Result<Vec<T>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT t.* FROM {} t JOIN plantations p ON p.id = t.plantation_id WHERE TRUE",
            T::TABLE
        ));
        visibility.push_condition(&mut qb, "p.district_id");
        if let Some(plantation) = plantation {
            qb.push(" AND t.plantation_id = ").push_bind(plantation);
        }
        qb.push(" ORDER BY t.id ASC LIMIT ").push_bind(pagination.limit);
        qb.push(" OFFSET ").push_bind(pagination.offset);

        Ok(qb.build_query_as::<T>().fetch_all(&self.pool).await?)
    }

    pub async fn select_one(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    pub async fn select_404(&self, id: i64) -> Result<T, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", T::LABEL, id)))
    }

    pub async fn insert(&self, input: &T::Input) -> Result<T, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} (plantation_id, {}) VALUES (",
            T::TABLE,
            T::COLUMNS.join(", ")
        ));
        {
            let mut row = qb.separated(", ");
            row.push_bind(T::input_owner(input));
            T::push_values(input, &mut row);
        }
        qb.push(") RETURNING *");

        Ok(qb.build_query_as::<T>().fetch_one(&self.pool).await?)
    }

    pub async fn update(&self, id: i64, input: &T::Input) -> Result<T, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "UPDATE {} SET (plantation_id, {}) = ROW(",
            T::TABLE,
            T::COLUMNS.join(", ")
        ));
        {
            let mut row = qb.separated(", ");
            row.push_bind(T::input_owner(input));
            T::push_values(input, &mut row);
        }
        qb.push(") WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", T::LABEL, id)))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} {} not found", T::LABEL, id)));
        }
        Ok(())
    }
}
