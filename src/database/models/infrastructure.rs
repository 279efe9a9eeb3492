use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invest_type")]
pub enum InvestType {
    #[serde(rename = "махаллий")]
    #[sqlx(rename = "махаллий")]
    Local,
    #[serde(rename = "xорожий")]
    #[sqlx(rename = "xорожий")]
    Foreign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservoir_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservoirType {
    Beton,
    Qoplama,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "trellis_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrellisType {
    Beton,
    Temir,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Investment {
    pub id: i64,
    #[serde(rename = "plantation")]
    pub plantation_id: i64,
    pub invest_type: InvestType,
    pub investment_amount: Decimal,
}

/// Investment attributes as submitted inside a plantation
#[derive(Debug, Clone, Deserialize)]
pub struct InvestmentFields {
    pub invest_type: InvestType,
    #[serde(default)]
    pub investment_amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvestmentInput {
    pub plantation: i64,
    #[serde(flatten)]
    pub fields: InvestmentFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservoir {
    pub id: i64,
    #[serde(rename = "plantation")]
    pub plantation_id: i64,
    pub reservoir_type: Option<ReservoirType>,
    pub reservoir_volume: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservoirFields {
    #[serde(default)]
    pub reservoir_type: Option<ReservoirType>,
    #[serde(default)]
    pub reservoir_volume: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservoirInput {
    pub plantation: i64,
    #[serde(flatten)]
    pub fields: ReservoirFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trellis {
    pub id: i64,
    #[serde(rename = "plantation")]
    pub plantation_id: i64,
    pub trellis_installed_area: f64,
    pub trellis_type: Option<TrellisType>,
    pub trellis_count: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrellisFields {
    #[serde(default)]
    pub trellis_installed_area: f64,
    #[serde(default)]
    pub trellis_type: Option<TrellisType>,
    #[serde(default)]
    pub trellis_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrellisInput {
    pub plantation: i64,
    #[serde(flatten)]
    pub fields: TrellisFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subsidy {
    pub id: i64,
    #[serde(rename = "plantation")]
    pub plantation_id: i64,
    pub year: i32,
    pub contract_number: String,
    pub direction: String,
    pub amount: Decimal,
    pub efficiency: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubsidyInput {
    pub plantation: i64,
    pub year: i32,
    pub contract_number: String,
    pub direction: String,
    pub amount: Decimal,
    #[serde(default)]
    pub efficiency: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invest_type_uses_stored_labels() {
        assert_eq!(serde_json::to_value(InvestType::Local).unwrap(), json!("махаллий"));
        let foreign: InvestType = serde_json::from_value(json!("xорожий")).unwrap();
        assert_eq!(foreign, InvestType::Foreign);
    }

    #[test]
    fn investment_input_flattens_fields() {
        let input: InvestmentInput = serde_json::from_value(json!({
            "plantation": 4,
            "invest_type": "махаллий",
            "investment_amount": 1500000
        }))
        .unwrap();
        assert_eq!(input.plantation, 4);
        assert_eq!(input.fields.investment_amount, Decimal::new(1500000, 0));
    }

    #[test]
    fn unknown_trellis_type_is_rejected() {
        assert!(serde_json::from_value::<TrellisFields>(json!({"trellis_type": "wood"})).is_err());
    }
}
