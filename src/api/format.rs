use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::database::models::{
    Coordinate, District, Farmer, FruitArea, InvestType, Investment, LandType, Plantation, PlantationImage,
    Reservoir, ReservoirType, Subsidy, Trellis, TrellisType,
};

pub const EFFECTIVE: &str = "Самарали";
pub const INEFFECTIVE: &str = "Самарасиз";

/// Area left after irrigation, unusable land and planted fruit. Derived on
/// every read, never stored.
pub fn empty_area(total_area: f64, irrigation_area: f64, not_usable_area: f64, fruit_area_total: f64) -> f64 {
    total_area - (irrigation_area + not_usable_area + fruit_area_total)
}

pub fn efficiency_label(efficiency: bool) -> &'static str {
    if efficiency {
        EFFECTIVE
    } else {
        INEFFECTIVE
    }
}

/// Resolve a stored image reference against the media base URL. Absolute
/// references pass through; a base that fails to parse leaves the reference as is.
pub fn image_url(media_base: &str, image: &str) -> String {
    if Url::parse(image).is_ok() {
        return image.to_string();
    }

    let base = if media_base.ends_with('/') {
        media_base.to_string()
    } else {
        format!("{}/", media_base)
    };

    match Url::parse(&base).and_then(|base| base.join(image.trim_start_matches('/'))) {
        Ok(url) => url.to_string(),
        Err(_) => image.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DistrictView {
    pub id: i64,
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestmentView {
    pub id: i64,
    pub invest_type: InvestType,
    pub investment_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservoirView {
    pub id: i64,
    pub reservoir_type: Option<ReservoirType>,
    pub reservoir_volume: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrellisView {
    pub id: i64,
    pub trellis_installed_area: f64,
    pub trellis_type: Option<TrellisType>,
    pub trellis_count: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    pub id: i64,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubsidyView {
    pub id: i64,
    pub year: i32,
    pub contract_number: String,
    pub direction: String,
    pub amount: Decimal,
    pub efficiency: &'static str,
}

/// Full plantation payload with every owned row nested
#[derive(Debug, Clone, Serialize)]
pub struct PlantationDetail {
    pub id: i64,
    pub district: Option<DistrictView>,
    pub farmer: Option<Farmer>,
    pub garden_established_year: Option<i32>,
    pub total_area: f64,
    pub irrigation_area: f64,
    pub not_usable_area: f64,
    pub empty_area: f64,
    pub fertility_score: Option<f64>,
    pub land_type: LandType,
    pub is_fertile: bool,
    pub fenced: bool,
    pub irrigation_systems_count: i32,
    pub pump_station_count: i32,
    pub reservoir_count: i32,
    pub investment: Option<InvestmentView>,
    pub reservoir: Option<ReservoirView>,
    pub trellis: Option<TrellisView>,
    pub fruit_areas: Vec<FruitArea>,
    pub images: Vec<ImageView>,
    pub coordinates: Vec<Coordinate>,
    pub subsidies: Vec<SubsidyView>,
    pub is_checked: bool,
    pub is_deleting: bool,
    pub prev_data: Value,
    pub updated_at: DateTime<Utc>,
}

/// Map marker: just enough to draw the polygon
#[derive(Debug, Clone, Serialize)]
pub struct MapItem {
    pub id: i64,
    pub garden_established_year: Option<i32>,
    pub is_fertile: bool,
    pub coordinates: Vec<Coordinate>,
}

/// Owned rows of a batch of plantations, loaded one query per table
#[derive(Debug, Default)]
pub struct PlantationChildren {
    pub districts: Vec<District>,
    pub farmers: Vec<Farmer>,
    pub coordinates: Vec<Coordinate>,
    pub images: Vec<PlantationImage>,
    pub fruit_areas: Vec<FruitArea>,
    pub subsidies: Vec<Subsidy>,
    pub investments: Vec<Investment>,
    pub reservoirs: Vec<Reservoir>,
    pub trellises: Vec<Trellis>,
}

fn group_by<T>(rows: Vec<T>, key: impl Fn(&T) -> i64) -> HashMap<i64, Vec<T>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

fn index_by<T>(rows: Vec<T>, key: impl Fn(&T) -> i64) -> HashMap<i64, T> {
    rows.into_iter().map(|row| (key(&row), row)).collect()
}

/// Assemble detail payloads, preserving the order of `rows`
pub fn plantation_details(
    rows: Vec<Plantation>,
    children: PlantationChildren,
    media_base: &str,
) -> Vec<PlantationDetail> {
    let districts = index_by(children.districts, |d| d.id);
    let farmers = index_by(children.farmers, |f| f.id);
    let mut coordinates = group_by(children.coordinates, |c| c.plantation_id);
    let mut images = group_by(children.images, |i| i.plantation_id);
    let mut fruit_areas = group_by(children.fruit_areas, |fa| fa.plantation_id);
    let mut subsidies = group_by(children.subsidies, |s| s.plantation_id);
    let mut investments = index_by(children.investments, |i| i.plantation_id);
    let mut reservoirs = index_by(children.reservoirs, |r| r.plantation_id);
    let mut trellises = index_by(children.trellises, |t| t.plantation_id);

    rows.into_iter()
        .map(|row| {
            let fruit_areas = fruit_areas.remove(&row.id).unwrap_or_default();
            let fruit_area_total: f64 = fruit_areas.iter().map(|fa| fa.area).sum();

            PlantationDetail {
                id: row.id,
                district: districts.get(&row.district_id).map(|d| DistrictView {
                    id: d.id,
                    name: d.name.clone(),
                    region: d.region_name.clone(),
                }),
                farmer: row.farmer_id.and_then(|id| farmers.get(&id).cloned()),
                garden_established_year: row.garden_established_year,
                total_area: row.total_area,
                irrigation_area: row.irrigation_area,
                not_usable_area: row.not_usable_area,
                empty_area: empty_area(row.total_area, row.irrigation_area, row.not_usable_area, fruit_area_total),
                fertility_score: row.fertility_score,
                land_type: row.land_type,
                is_fertile: row.is_fertile,
                fenced: row.fenced,
                irrigation_systems_count: row.irrigation_systems_count,
                pump_station_count: row.pump_station_count,
                reservoir_count: row.reservoir_count,
                investment: investments.remove(&row.id).map(|i| InvestmentView {
                    id: i.id,
                    invest_type: i.invest_type,
                    investment_amount: i.investment_amount,
                }),
                reservoir: reservoirs.remove(&row.id).map(|r| ReservoirView {
                    id: r.id,
                    reservoir_type: r.reservoir_type,
                    reservoir_volume: r.reservoir_volume,
                }),
                trellis: trellises.remove(&row.id).map(|t| TrellisView {
                    id: t.id,
                    trellis_installed_area: t.trellis_installed_area,
                    trellis_type: t.trellis_type,
                    trellis_count: t.trellis_count,
                }),
                fruit_areas,
                images: images
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|i| ImageView {
                        id: i.id,
                        image: image_url(media_base, &i.image),
                    })
                    .collect(),
                coordinates: coordinates.remove(&row.id).unwrap_or_default(),
                subsidies: subsidies
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|s| SubsidyView {
                        id: s.id,
                        year: s.year,
                        contract_number: s.contract_number,
                        direction: s.direction,
                        amount: s.amount,
                        efficiency: efficiency_label(s.efficiency),
                    })
                    .collect(),
                is_checked: row.is_checked,
                is_deleting: row.is_deleting,
                prev_data: row.prev_data,
                updated_at: row.updated_at,
            }
        })
        .collect()
}

pub fn map_items(rows: Vec<Plantation>, coordinates: Vec<Coordinate>) -> Vec<MapItem> {
    let mut coordinates = group_by(coordinates, |c| c.plantation_id);
    rows.into_iter()
        .map(|row| MapItem {
            id: row.id,
            garden_established_year: row.garden_established_year,
            is_fertile: row.is_fertile,
            coordinates: coordinates.remove(&row.id).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plantation(id: i64) -> Plantation {
        Plantation {
            id,
            district_id: 3,
            farmer_id: None,
            garden_established_year: Some(2019),
            total_area: 10.0,
            irrigation_area: 3.0,
            not_usable_area: 1.0,
            fertility_score: None,
            land_type: LandType::Irrigated,
            is_fertile: true,
            fenced: true,
            irrigation_systems_count: 0,
            pump_station_count: 0,
            reservoir_count: 0,
            is_checked: false,
            is_deleting: false,
            prev_data: json!({}),
            updated_at: Utc::now(),
        }
    }

    fn fruit_area(plantation_id: i64, area: f64) -> FruitArea {
        FruitArea {
            id: 1,
            plantation_id,
            fruit_id: 1,
            fruit_name: "Олма".into(),
            variety_id: None,
            variety_name: None,
            rootstock_id: None,
            rootstock_name: None,
            planted_year: 2020,
            area,
        }
    }

    #[test]
    fn empty_area_subtracts_everything() {
        assert_eq!(empty_area(10.0, 3.0, 1.0, 4.0), 2.0);
    }

    #[test]
    fn efficiency_labels() {
        assert_eq!(efficiency_label(true), "Самарали");
        assert_eq!(efficiency_label(false), "Самарасиз");
    }

    #[test]
    fn image_urls_resolve_against_base() {
        assert_eq!(
            image_url("https://media.example.org/media", "plantations/a.jpg"),
            "https://media.example.org/media/plantations/a.jpg"
        );
        assert_eq!(
            image_url("https://media.example.org/media/", "/plantations/a.jpg"),
            "https://media.example.org/media/plantations/a.jpg"
        );
        assert_eq!(
            image_url("https://media.example.org/media/", "https://cdn.example.org/b.png"),
            "https://cdn.example.org/b.png"
        );
    }

    #[test]
    fn details_nest_children_under_their_plantation() {
        let children = PlantationChildren {
            districts: vec![District {
                id: 3,
                region_id: 1,
                region_name: "Тошкент".into(),
                name: "Чирчиқ".into(),
            }],
            fruit_areas: vec![fruit_area(1, 4.0), fruit_area(2, 1.0)],
            subsidies: vec![Subsidy {
                id: 5,
                plantation_id: 1,
                year: 2023,
                contract_number: "A-1".into(),
                direction: "drip".into(),
                amount: Decimal::new(1000, 0),
                efficiency: true,
            }],
            ..Default::default()
        };

        let details = plantation_details(vec![plantation(1), plantation(2)], children, "http://localhost/media/");
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].empty_area, 2.0);
        assert_eq!(details[0].subsidies[0].efficiency, EFFECTIVE);
        assert_eq!(details[1].empty_area, 5.0);
        assert!(details[1].subsidies.is_empty());
        assert!(details[0].investment.is_none());

        let body = serde_json::to_value(&details[0]).unwrap();
        assert_eq!(body["district"]["region"], "Тошкент");
        assert_eq!(body["fruit_areas"][0]["fruit"], 1);
        assert!(body["farmer"].is_null());
    }

    #[test]
    fn map_items_carry_only_marker_fields() {
        let coords = vec![Coordinate {
            id: 1,
            plantation_id: 7,
            latitude: 41.3,
            longitude: 69.2,
        }];
        let items = map_items(vec![plantation(7)], coords);
        let body = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(body.as_object().unwrap().len(), 4);
        assert_eq!(body["coordinates"][0]["latitude"], 41.3);
    }
}
