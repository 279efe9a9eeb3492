use sqlx::{Postgres, QueryBuilder};

use crate::middleware::AuthUser;

/// Which plantation districts a caller may read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    All,
    District(i64),
    Nothing,
}

impl Visibility {
    pub fn for_caller(caller: &AuthUser) -> Self {
        if caller.is_superuser {
            Visibility::All
        } else {
            match caller.district_id {
                Some(district_id) => Visibility::District(district_id),
                None => Visibility::Nothing,
            }
        }
    }

    pub fn allows(&self, district_id: i64) -> bool {
        match self {
            Visibility::All => true,
            Visibility::District(own) => *own == district_id,
            Visibility::Nothing => false,
        }
    }

    /// Append ` AND <condition>` on the given district column
    pub fn push_condition(&self, qb: &mut QueryBuilder<'_, Postgres>, district_column: &str) {
        match self {
            Visibility::All => {}
            Visibility::District(district_id) => {
                qb.push(format!(" AND {} = ", district_column)).push_bind(*district_id);
            }
            Visibility::Nothing => {
                qb.push(" AND FALSE");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(district_id: Option<i64>, is_superuser: bool) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "u".to_string(),
            district_id,
            is_superuser,
        }
    }

    #[test]
    fn superuser_sees_everything() {
        let v = Visibility::for_caller(&caller(Some(3), true));
        assert_eq!(v, Visibility::All);
        assert!(v.allows(99));
    }

    #[test]
    fn district_user_sees_own_district() {
        let v = Visibility::for_caller(&caller(Some(3), false));
        assert!(v.allows(3));
        assert!(!v.allows(4));
    }

    #[test]
    fn user_without_district_sees_nothing() {
        let v = Visibility::for_caller(&caller(None, false));
        assert_eq!(v, Visibility::Nothing);
        assert!(!v.allows(1));
    }

    #[test]
    fn pushes_sql_condition() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM plantations p WHERE TRUE");
        Visibility::District(7).push_condition(&mut qb, "p.district_id");
        assert_eq!(qb.sql(), "SELECT 1 FROM plantations p WHERE TRUE AND p.district_id = $1");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 WHERE TRUE");
        Visibility::Nothing.push_condition(&mut qb, "p.district_id");
        assert_eq!(qb.sql(), "SELECT 1 WHERE TRUE AND FALSE");
    }
}
