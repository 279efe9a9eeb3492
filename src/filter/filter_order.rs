use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

/// Maps an API column name to the SQL expression it sorts by
pub type OrderColumns = &'static [(&'static str, &'static str)];

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"total_area desc, id"` against a whitelist of sortable columns
    pub fn parse(order: &str, allowed: OrderColumns) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut it = trimmed.split_whitespace();
            let Some(name) = it.next() else { continue };
            let column = allowed
                .iter()
                .find(|(api, _)| *api == name)
                .map(|(_, sql)| *sql)
                .ok_or_else(|| FilterError::InvalidColumn(name.to_string()))?;

            let sort = match it.next() {
                None => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(dir) => return Err(FilterError::InvalidDirection(dir.to_string())),
            };

            out.push(FilterOrderInfo { column, sort });
        }
        Ok(out)
    }

    /// ORDER BY clause; `tiebreak` keeps paging stable
    pub fn generate(infos: &[FilterOrderInfo], tiebreak: &str) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", i.column, i.sort.to_sql()))
            .collect();
        if !infos.iter().any(|i| i.column == tiebreak) {
            parts.push(format!("{} ASC", tiebreak));
        }
        format!(" ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: OrderColumns = &[("id", "p.id"), ("total_area", "p.total_area")];

    #[test]
    fn parses_column_and_direction() {
        let infos = FilterOrder::parse("total_area desc", COLUMNS).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].column, "p.total_area");
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(FilterOrder::generate(&infos, "p.id"), " ORDER BY p.total_area DESC, p.id ASC");
    }

    #[test]
    fn direction_defaults_to_ascending() {
        let infos = FilterOrder::parse("id", COLUMNS).unwrap();
        assert_eq!(FilterOrder::generate(&infos, "p.id"), " ORDER BY p.id ASC");
    }

    #[test]
    fn rejects_unknown_columns() {
        assert!(matches!(
            FilterOrder::parse("password_hash", COLUMNS),
            Err(FilterError::InvalidColumn(_))
        ));
        assert!(matches!(
            FilterOrder::parse("id; DROP TABLE plantations", COLUMNS),
            Err(FilterError::InvalidColumn(_))
        ));
    }

    #[test]
    fn rejects_bad_direction() {
        assert!(matches!(
            FilterOrder::parse("id sideways", COLUMNS),
            Err(FilterError::InvalidDirection(_))
        ));
    }
}
