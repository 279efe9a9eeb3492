use sqlx::{
    postgres::PgArguments,
    query::Query,
    PgConnection, Postgres, QueryBuilder, Row,
};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Coordinate, CoordinateInput, District, Farmer, FruitArea, FruitAreaInput, Investment, InvestmentFields,
    Plantation, PlantationImage, PlantationSummary, Reservoir, ReservoirFields, Subsidy, Trellis, TrellisFields,
};
use crate::database::record::{PlantationRecord, ReviewState};
use crate::filter::{Filter, OrderColumns, Visibility};

const PLANTATION_COLUMNS: &str = "p.id, p.district_id, p.farmer_id, p.garden_established_year, \
     p.total_area, p.irrigation_area, p.not_usable_area, p.fertility_score, p.land_type, \
     p.is_fertile, p.fenced, p.irrigation_systems_count, p.pump_station_count, p.reservoir_count, \
     p.is_checked, p.is_deleting, p.prev_data, p.updated_at";

/// Columns a plantation list may be ordered by
pub const ORDER_COLUMNS: OrderColumns = &[
    ("id", "p.id"),
    ("garden_established_year", "p.garden_established_year"),
    ("total_area", "p.total_area"),
    ("irrigation_area", "p.irrigation_area"),
    ("fertility_score", "p.fertility_score"),
    ("district", "p.district_id"),
    ("is_checked", "p.is_checked"),
    ("is_deleting", "p.is_deleting"),
    ("updated_at", "p.updated_at"),
];

pub async fn fetch(conn: &mut PgConnection, id: i64) -> Result<Option<Plantation>, DatabaseError> {
    let sql = format!("SELECT {} FROM plantations p WHERE p.id = $1", PLANTATION_COLUMNS);
    Ok(sqlx::query_as::<_, Plantation>(&sql).bind(id).fetch_optional(conn).await?)
}

/// Load and lock the row for the rest of the transaction
pub async fn fetch_for_update(conn: &mut PgConnection, id: i64) -> Result<Option<Plantation>, DatabaseError> {
    let sql = format!("SELECT {} FROM plantations p WHERE p.id = $1 FOR UPDATE", PLANTATION_COLUMNS);
    Ok(sqlx::query_as::<_, Plantation>(&sql).bind(id).fetch_optional(conn).await?)
}

pub async fn district_of(conn: &mut PgConnection, id: i64) -> Result<Option<i64>, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT district_id FROM plantations WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?)
}

fn bind_record<'q>(
    query: Query<'q, Postgres, PgArguments>,
    record: &PlantationRecord,
    review: &ReviewState,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(record.district_id)
        .bind(record.farmer_id)
        .bind(record.garden_established_year)
        .bind(record.total_area)
        .bind(record.irrigation_area)
        .bind(record.not_usable_area)
        .bind(record.fertility_score)
        .bind(record.land_type)
        .bind(record.is_fertile)
        .bind(record.fenced)
        .bind(record.irrigation_systems_count)
        .bind(record.pump_station_count)
        .bind(record.reservoir_count)
        .bind(record.is_deleting)
        .bind(review.is_checked)
        .bind(review.prev_data.clone())
}

pub async fn insert(
    conn: &mut PgConnection,
    record: &PlantationRecord,
    review: &ReviewState,
) -> Result<i64, DatabaseError> {
    let query = sqlx::query(
        r#"
        INSERT INTO plantations (
            district_id, farmer_id, garden_established_year, total_area, irrigation_area,
            not_usable_area, fertility_score, land_type, is_fertile, fenced,
            irrigation_systems_count, pump_station_count, reservoir_count, is_deleting,
            is_checked, prev_data, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, now())
        RETURNING id
        "#,
    );

    let row = bind_record(query, record, review).fetch_one(conn).await?;
    Ok(row.try_get("id")?)
}

pub async fn update(
    conn: &mut PgConnection,
    id: i64,
    record: &PlantationRecord,
    review: &ReviewState,
) -> Result<(), DatabaseError> {
    let query = sqlx::query(
        r#"
        UPDATE plantations SET
            district_id = $1, farmer_id = $2, garden_established_year = $3, total_area = $4,
            irrigation_area = $5, not_usable_area = $6, fertility_score = $7, land_type = $8,
            is_fertile = $9, fenced = $10, irrigation_systems_count = $11, pump_station_count = $12,
            reservoir_count = $13, is_deleting = $14, is_checked = $15, prev_data = $16,
            updated_at = now()
        WHERE id = $17
        "#,
    );

    let result = bind_record(query, record, review).bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Plantation {} not found", id)));
    }
    Ok(())
}

pub async fn replace_coordinates(
    conn: &mut PgConnection,
    plantation_id: i64,
    coordinates: &[CoordinateInput],
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM plantation_coordinates WHERE plantation_id = $1")
        .bind(plantation_id)
        .execute(&mut *conn)
        .await?;

    if coordinates.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO plantation_coordinates (plantation_id, latitude, longitude) ");
    qb.push_values(coordinates, |mut b, c| {
        b.push_bind(plantation_id).push_bind(c.latitude).push_bind(c.longitude);
    });
    qb.build().execute(conn).await?;
    Ok(())
}

pub async fn replace_fruit_areas(
    conn: &mut PgConnection,
    plantation_id: i64,
    fruit_areas: &[FruitAreaInput],
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM plantation_fruit_areas WHERE plantation_id = $1")
        .bind(plantation_id)
        .execute(&mut *conn)
        .await?;

    if fruit_areas.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO plantation_fruit_areas (plantation_id, fruit_id, variety_id, rootstock_id, planted_year, area) ",
    );
    qb.push_values(fruit_areas, |mut b, fa| {
        b.push_bind(plantation_id)
            .push_bind(fa.fruit)
            .push_bind(fa.variety)
            .push_bind(fa.rootstock)
            .push_bind(fa.planted_year)
            .push_bind(fa.area);
    });
    qb.build().execute(conn).await?;
    Ok(())
}

pub async fn replace_images(conn: &mut PgConnection, plantation_id: i64, images: &[String]) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM plantation_images WHERE plantation_id = $1")
        .bind(plantation_id)
        .execute(&mut *conn)
        .await?;

    if images.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO plantation_images (plantation_id, image) ");
    qb.push_values(images, |mut b, image| {
        b.push_bind(plantation_id).push_bind(image.clone());
    });
    qb.build().execute(conn).await?;
    Ok(())
}

pub async fn insert_investment(
    conn: &mut PgConnection,
    plantation_id: i64,
    fields: &InvestmentFields,
) -> Result<(), DatabaseError> {
    sqlx::query("INSERT INTO investments (plantation_id, invest_type, investment_amount) VALUES ($1, $2, $3)")
        .bind(plantation_id)
        .bind(fields.invest_type)
        .bind(fields.investment_amount)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_reservoir(
    conn: &mut PgConnection,
    plantation_id: i64,
    fields: &ReservoirFields,
) -> Result<(), DatabaseError> {
    sqlx::query("INSERT INTO reservoirs (plantation_id, reservoir_type, reservoir_volume) VALUES ($1, $2, $3)")
        .bind(plantation_id)
        .bind(fields.reservoir_type)
        .bind(fields.reservoir_volume)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_trellis(
    conn: &mut PgConnection,
    plantation_id: i64,
    fields: &TrellisFields,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO trellises (plantation_id, trellis_installed_area, trellis_type, trellis_count) VALUES ($1, $2, $3, $4)",
    )
    .bind(plantation_id)
    .bind(fields.trellis_installed_area)
    .bind(fields.trellis_type)
    .bind(fields.trellis_count)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fruit_area_total(conn: &mut PgConnection, plantation_id: i64) -> Result<f64, DatabaseError> {
    Ok(sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(area), 0)::float8 FROM plantation_fruit_areas WHERE plantation_id = $1",
    )
    .bind(plantation_id)
    .fetch_one(conn)
    .await?)
}

/// Delete owned rows first, then the plantation itself. Foreign keys are
/// RESTRICT, so the order matters.
pub async fn delete_cascade(conn: &mut PgConnection, plantation_id: i64) -> Result<(), DatabaseError> {
    const CHILD_TABLES: [&str; 7] = [
        "plantation_coordinates",
        "plantation_images",
        "plantation_fruit_areas",
        "subsidies",
        "investments",
        "reservoirs",
        "trellises",
    ];

    for table in CHILD_TABLES {
        sqlx::query(&format!("DELETE FROM {} WHERE plantation_id = $1", table))
            .bind(plantation_id)
            .execute(&mut *conn)
            .await?;
    }

    let result = sqlx::query("DELETE FROM plantations WHERE id = $1")
        .bind(plantation_id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Plantation {} not found", plantation_id)));
    }
    Ok(())
}

fn scoped_query<'a>(select: &str, visibility: Visibility, filter: &Filter) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM plantations p \
         JOIN districts d ON d.id = p.district_id \
         JOIN regions r ON r.id = d.region_id \
         WHERE TRUE",
        select
    ));
    visibility.push_condition(&mut qb, "p.district_id");
    filter.push_plantation_conditions(&mut qb);
    filter.push_order_and_page(&mut qb, "p.id");
    qb
}

pub async fn list_summaries(
    conn: &mut PgConnection,
    visibility: Visibility,
    filter: &Filter,
) -> Result<Vec<PlantationSummary>, DatabaseError> {
    let select = "p.id, p.garden_established_year, d.name AS district_name, r.name AS region_name, \
                  p.total_area, p.is_deleting, p.is_checked, p.prev_data";
    let mut qb = scoped_query(select, visibility, filter);
    Ok(qb.build_query_as::<PlantationSummary>().fetch_all(conn).await?)
}

pub async fn list_rows(
    conn: &mut PgConnection,
    visibility: Visibility,
    filter: &Filter,
) -> Result<Vec<Plantation>, DatabaseError> {
    let mut qb = scoped_query(PLANTATION_COLUMNS, visibility, filter);
    Ok(qb.build_query_as::<Plantation>().fetch_all(conn).await?)
}

// Batch loaders keyed by plantation id, one query per child table

pub async fn coordinates_for(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Coordinate>, DatabaseError> {
    Ok(sqlx::query_as::<_, Coordinate>(
        "SELECT id, plantation_id, latitude, longitude FROM plantation_coordinates \
         WHERE plantation_id = ANY($1) ORDER BY id",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}

pub async fn images_for(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<PlantationImage>, DatabaseError> {
    Ok(sqlx::query_as::<_, PlantationImage>(
        "SELECT id, plantation_id, image FROM plantation_images WHERE plantation_id = ANY($1) ORDER BY id",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}

pub async fn fruit_areas_for(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<FruitArea>, DatabaseError> {
    Ok(sqlx::query_as::<_, FruitArea>(
        r#"
        SELECT fa.id, fa.plantation_id, fa.fruit_id, f.name AS fruit_name,
               fa.variety_id, v.name AS variety_name,
               fa.rootstock_id, rs.name AS rootstock_name,
               fa.planted_year, fa.area
        FROM plantation_fruit_areas fa
        JOIN fruits f ON f.id = fa.fruit_id
        LEFT JOIN fruit_varieties v ON v.id = fa.variety_id
        LEFT JOIN rootstocks rs ON rs.id = fa.rootstock_id
        WHERE fa.plantation_id = ANY($1)
        ORDER BY fa.id
        "#,
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}

pub async fn subsidies_for(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Subsidy>, DatabaseError> {
    Ok(sqlx::query_as::<_, Subsidy>(
        "SELECT id, plantation_id, year, contract_number, direction, amount, efficiency \
         FROM subsidies WHERE plantation_id = ANY($1) ORDER BY year, id",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}

pub async fn investments_for(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Investment>, DatabaseError> {
    Ok(sqlx::query_as::<_, Investment>(
        "SELECT id, plantation_id, invest_type, investment_amount FROM investments WHERE plantation_id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}

pub async fn reservoirs_for(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Reservoir>, DatabaseError> {
    Ok(sqlx::query_as::<_, Reservoir>(
        "SELECT id, plantation_id, reservoir_type, reservoir_volume FROM reservoirs WHERE plantation_id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}

pub async fn trellises_for(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Trellis>, DatabaseError> {
    Ok(sqlx::query_as::<_, Trellis>(
        "SELECT id, plantation_id, trellis_installed_area, trellis_type, trellis_count \
         FROM trellises WHERE plantation_id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}

pub async fn districts_by_ids(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<District>, DatabaseError> {
    Ok(sqlx::query_as::<_, District>(
        "SELECT d.id, d.region_id, r.name AS region_name, d.name \
         FROM districts d JOIN regions r ON r.id = d.region_id WHERE d.id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}

pub async fn farmers_by_ids(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Farmer>, DatabaseError> {
    Ok(sqlx::query_as::<_, Farmer>(
        "SELECT id, name, founder_name, director_name, phone_number, email, address, inn, established_year \
         FROM farmers WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?)
}
