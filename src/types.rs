use geo::MultiPolygon;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryAggregate {
    pub country_code: String,
    pub total: u32,
}

#[derive(Debug, Clone)]
pub struct CountryFeature {
    pub code: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}
