use crate::config::DetailConfig;
use crate::projection::{self, Projection};
use crate::surface::{escape_attr, SvgSurface};
use crate::types::{CountryFeature, StoreRecord};
use tracing::debug;

/// Draw one country and its stores onto `surface`, with the projection fitted
/// to that country alone. Returns the number of store points drawn.
///
/// The surface is drawn into as-is; callers clear it first when redrawing.
pub fn draw_country(
    surface: &mut SvgSurface,
    config: &DetailConfig,
    country: &CountryFeature,
    stores: &[StoreRecord],
) -> usize {
    let projection = Projection::fit_size(
        config.projection,
        surface.width(),
        surface.height(),
        std::iter::once(&country.geometry),
    );
    let shape = projection.project_geometry(&country.geometry);

    surface.push(format!(
        r#"<g id="countryMap"><path d="{}" data-code="{}" fill="{}" opacity="0.6" stroke="black"/></g>"#,
        projection::svg_path(&shape),
        escape_attr(&country.code),
        escape_attr(&config.country_fill),
    ));

    let mut points = String::from(r#"<g id="topCountryPoints">"#);
    let mut drawn = 0;
    for store in stores.iter().filter(|s| s.country_code == country.code) {
        let p = projection.project(store.longitude, store.latitude);
        points.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}" opacity="0.6" stroke="black"/>"#,
            p.x,
            p.y,
            config.point_radius,
            escape_attr(&config.point_fill),
        ));
        drawn += 1;
    }
    points.push_str("</g>");
    surface.push(points);

    debug!("Drew {} ({}) with {} stores on {}", country.name, country.code, drawn, surface.name());
    drawn
}
