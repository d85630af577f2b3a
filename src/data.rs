use crate::config::InputConfig;
use crate::types::{CountryFeature, StoreRecord};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use shapefile::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Datasets {
    pub countries: Vec<CountryFeature>,
    pub stores: Vec<StoreRecord>,
}

/// Load both datasets. Either one failing aborts the whole load.
pub fn load_datasets(input: &InputConfig) -> Result<Datasets> {
    let stores = load_stores(input)?;
    info!("Loaded {} stores from {:?}", stores.len(), input.stores_csv);

    let countries = load_countries(input)?;
    info!("Loaded {} countries from {:?}", countries.len(), input.countries);

    Ok(Datasets { countries, stores })
}

pub fn load_stores(input: &InputConfig) -> Result<Vec<StoreRecord>> {
    let file = File::open(&input.stores_csv)
        .with_context(|| format!("Failed to open CSV file: {:?}", input.stores_csv))?;
    read_stores(file, input)
}

fn read_stores<R: Read>(reader: R, input: &InputConfig) -> Result<Vec<StoreRecord>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Column '{}' not found in store CSV", name))
    };
    let code_idx = column(&input.country_column)?;
    let lat_idx = column(&input.latitude_column)?;
    let lon_idx = column(&input.longitude_column)?;

    let mut stores = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read store row {}", row + 1))?;
        let number = |idx: usize, what: &str| -> Result<f64> {
            let raw = record.get(idx).unwrap_or("").trim();
            raw.parse::<f64>()
                .with_context(|| format!("Invalid {} '{}' in store row {}", what, raw, row + 1))
        };

        stores.push(StoreRecord {
            // Blank codes are kept and grouped as-is.
            country_code: record.get(code_idx).unwrap_or("").to_string(),
            latitude: number(lat_idx, "latitude")?,
            longitude: number(lon_idx, "longitude")?,
        });
    }

    Ok(stores)
}

pub fn load_countries(input: &InputConfig) -> Result<Vec<CountryFeature>> {
    let extension = input
        .countries
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Input geometry file has no extension"))?;

    match extension.as_str() {
        "shp" => load_shapefile(&input.countries, input),
        "json" | "geojson" => {
            let file = File::open(&input.countries)
                .with_context(|| format!("Failed to open GeoJSON file: {:?}", input.countries))?;
            read_geojson(file, input)
        }
        _ => Err(anyhow!("Unsupported geometry format: {}", extension)),
    }
}

fn read_geojson<R: Read>(reader: R, input: &InputConfig) -> Result<Vec<CountryFeature>> {
    use geojson::GeoJson;
    use std::io::BufReader;

    let geojson = GeoJson::from_reader(BufReader::new(reader)).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let mut countries = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        let property = |key: &str| match feature.properties.as_ref().and_then(|p| p.get(key)) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let code = property(&input.code_property).ok_or_else(|| {
            anyhow!("Feature {} has no '{}' property", index, input.code_property)
        })?;
        let name = property(&input.name_property).unwrap_or_else(|| code.clone());

        let geometry = match feature.geometry {
            Some(geom) => {
                let value: geo::Geometry<f64> = geom
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geometry of feature {}: {:?}", index, e))?;
                match value {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => return Err(anyhow!("Feature {} ({}) is not a polygon", index, code)),
                }
            }
            None => return Err(anyhow!("Feature {} ({}) has no geometry", index, code)),
        };

        countries.push(CountryFeature { code, name, geometry });
    }

    Ok(countries)
}

fn load_shapefile(path: &Path, input: &InputConfig) -> Result<Vec<CountryFeature>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut countries = Vec::new();

    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;

        let text = |key: &str| match record.get(key) {
            Some(shapefile::dbase::FieldValue::Character(Some(s))) => Some(s.trim().to_string()),
            _ => None,
        };

        let code = text(&input.code_property).ok_or_else(|| {
            anyhow!("Shape {} has no '{}' attribute", index, input.code_property)
        })?;
        let name = text(&input.name_property).unwrap_or_else(|| code.clone());

        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygon of shape {}: {:?}", index, e))?,
            shapefile::Shape::PolygonM(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM of shape {}: {:?}", index, e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ of shape {}: {:?}", index, e))?,
            _ => return Err(anyhow!("Shape {} ({}) is not a polygon", index, code)),
        };

        countries.push(CountryFeature { code, name, geometry });
    }

    Ok(countries)
}
