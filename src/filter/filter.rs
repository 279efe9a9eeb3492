use sqlx::{Postgres, QueryBuilder};

use super::error::FilterError;
use super::filter_order::{FilterOrder, OrderColumns};
use super::types::{FilterOrderInfo, ListParams, Pagination};

/// Validated list query: filters, ordering and paging ready to push into SQL
#[derive(Debug, Clone)]
pub struct Filter {
    pub params: ListParams,
    pub order: Vec<FilterOrderInfo>,
    pub pagination: Pagination,
}

impl Filter {
    pub fn new(params: ListParams, columns: OrderColumns, max_limit: i64) -> Result<Self, FilterError> {
        let order = match params.order.as_deref() {
            Some(order) => FilterOrder::parse(order, columns)?,
            None => Vec::new(),
        };
        let pagination = Self::pagination(params.limit, params.offset, max_limit)?;

        Ok(Self { params, order, pagination })
    }

    fn pagination(limit: Option<i64>, offset: Option<i64>, max_limit: i64) -> Result<Pagination, FilterError> {
        let limit = match limit {
            None => max_limit,
            Some(l) if l < 1 => return Err(FilterError::InvalidLimit(format!("{} is below 1", l))),
            Some(l) if l > max_limit => {
                return Err(FilterError::InvalidLimit(format!("{} exceeds maximum {}", l, max_limit)))
            }
            Some(l) => l,
        };
        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => return Err(FilterError::InvalidOffset(format!("{} is negative", o))),
            Some(o) => o,
        };
        Ok(Pagination { limit, offset })
    }

    /// Plantation attribute filters, assuming aliases `p` (plantations) and `d` (districts)
    pub fn push_plantation_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(district) = self.params.district {
            qb.push(" AND p.district_id = ").push_bind(district);
        }
        if let Some(region) = self.params.region {
            qb.push(" AND d.region_id = ").push_bind(region);
        }
        if let Some(is_checked) = self.params.is_checked {
            qb.push(" AND p.is_checked = ").push_bind(is_checked);
        }
        if let Some(is_deleting) = self.params.is_deleting {
            qb.push(" AND p.is_deleting = ").push_bind(is_deleting);
        }
        if let Some(land_type) = self.params.land_type {
            qb.push(" AND p.land_type = ").push_bind(land_type);
        }
    }

    pub fn push_order_and_page(&self, qb: &mut QueryBuilder<'_, Postgres>, tiebreak: &str) {
        qb.push(FilterOrder::generate(&self.order, tiebreak));
        qb.push(" LIMIT ").push_bind(self.pagination.limit);
        qb.push(" OFFSET ").push_bind(self.pagination.offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: OrderColumns = &[("id", "p.id"), ("total_area", "p.total_area")];

    #[test]
    fn defaults_to_max_limit() {
        let filter = Filter::new(ListParams::default(), COLUMNS, 500).unwrap();
        assert_eq!(filter.pagination, Pagination { limit: 500, offset: 0 });
    }

    #[test]
    fn rejects_out_of_range_paging() {
        let params = ListParams { limit: Some(0), ..Default::default() };
        assert!(matches!(Filter::new(params, COLUMNS, 500), Err(FilterError::InvalidLimit(_))));

        let params = ListParams { limit: Some(501), ..Default::default() };
        assert!(matches!(Filter::new(params, COLUMNS, 500), Err(FilterError::InvalidLimit(_))));

        let params = ListParams { offset: Some(-1), ..Default::default() };
        assert!(matches!(Filter::new(params, COLUMNS, 500), Err(FilterError::InvalidOffset(_))));
    }

    #[test]
    fn builds_conditions_in_order() {
        let params = ListParams {
            district: Some(2),
            is_checked: Some(false),
            order: Some("total_area desc".into()),
            limit: Some(10),
            ..Default::default()
        };
        let filter = Filter::new(params, COLUMNS, 500).unwrap();

        let mut qb = QueryBuilder::<Postgres>::new("SELECT p.id FROM plantations p WHERE TRUE");
        filter.push_plantation_conditions(&mut qb);
        filter.push_order_and_page(&mut qb, "p.id");

        assert_eq!(
            qb.sql(),
            "SELECT p.id FROM plantations p WHERE TRUE AND p.district_id = $1 AND p.is_checked = $2 \
             ORDER BY p.total_area DESC, p.id ASC LIMIT $3 OFFSET $4"
        );
    }
}
