use crate::aggregate::CountryTotals;
use crate::config::MapConfig;
use crate::data::Datasets;
use crate::render;
use crate::scale::{build_scale, Scale, ScaleError};
use crate::surface::SvgSurface;
use crate::types::{CountryFeature, StoreRecord};
use tracing::info;

/// Loaded datasets together with everything derived from them once per load.
#[derive(Debug, Clone)]
pub struct Atlas {
    pub countries: Vec<CountryFeature>,
    pub stores: Vec<StoreRecord>,
    pub totals: CountryTotals,
    pub scale: Scale,
}

impl Atlas {
    pub fn build(map: &MapConfig, datasets: Datasets) -> Result<Self, ScaleError> {
        let Datasets { countries, stores } = datasets;

        let totals = CountryTotals::from_stores(&stores);
        info!(
            "Aggregated {} stores into {} countries",
            totals.grand_total(),
            totals.len()
        );

        let scale = build_scale(&totals, map.scale, (map.bubble_min, map.bubble_max))?;

        Ok(Self {
            countries,
            stores,
            totals,
            scale,
        })
    }

    pub fn render_world(&self, map: &MapConfig) -> Result<SvgSurface, ScaleError> {
        render::render_world(map, &self.countries, &self.totals, &self.scale)
    }

    pub fn country(&self, index: usize) -> Option<&CountryFeature> {
        self.countries.get(index)
    }

    /// First country feature carrying `code`.
    pub fn find_country(&self, code: &str) -> Option<&CountryFeature> {
        self.countries.iter().find(|c| c.code.eq_ignore_ascii_case(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn datasets() -> Datasets {
        let square = |lon: f64, lat: f64| {
            MultiPolygon::new(vec![polygon![
                (x: lon, y: lat),
                (x: lon + 3.0, y: lat),
                (x: lon + 3.0, y: lat + 3.0),
                (x: lon, y: lat),
            ]])
        };
        let store = |code: &str| StoreRecord {
            country_code: code.to_string(),
            latitude: 1.0,
            longitude: 1.0,
        };

        Datasets {
            countries: vec![
                CountryFeature { code: "US".into(), name: "United States".into(), geometry: square(-100.0, 35.0) },
                CountryFeature { code: "FR".into(), name: "France".into(), geometry: square(0.0, 45.0) },
            ],
            stores: vec![store("US"), store("US"), store("FR")],
        }
    }

    #[test]
    fn builds_totals_and_scale_from_datasets() {
        let atlas = Atlas::build(&MapConfig::default(), datasets()).unwrap();
        assert_eq!(atlas.totals.get("US"), Some(2));
        assert_eq!(atlas.scale.domain(), (1.0, 2.0));
        assert_eq!(atlas.scale.range(), (1.0, 20.0));
        assert_eq!(atlas.render_world(&MapConfig::default()).unwrap().name(), "vis1");
    }

    #[test]
    fn no_stores_means_no_scale() {
        let mut data = datasets();
        data.stores.clear();
        assert_eq!(
            Atlas::build(&MapConfig::default(), data).unwrap_err(),
            ScaleError::EmptyDomain
        );
    }

    #[test]
    fn finds_countries_by_code_or_index() {
        let atlas = Atlas::build(&MapConfig::default(), datasets()).unwrap();
        assert_eq!(atlas.find_country("fr").map(|c| c.name.as_str()), Some("France"));
        assert!(atlas.find_country("DE").is_none());
        assert_eq!(atlas.country(0).map(|c| c.code.as_str()), Some("US"));
        assert!(atlas.country(2).is_none());
    }
}
