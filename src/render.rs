use crate::aggregate::CountryTotals;
use crate::config::MapConfig;
use crate::projection::{self, Projection};
use crate::scale::{Scale, ScaleError};
use crate::surface::{escape_attr, SvgSurface};
use crate::types::CountryFeature;
use rayon::prelude::*;
use tracing::{debug, info};

/// Draw the world map: one group per country with its outline, plus a bubble
/// sized by `scale` for every country that has stores.
///
/// Each group carries `data-index`, `data-code` and `data-name` so the page
/// can route a click on it back to the country selector.
pub fn render_world(
    config: &MapConfig,
    countries: &[CountryFeature],
    totals: &CountryTotals,
    scale: &Scale,
) -> Result<SvgSurface, ScaleError> {
    let width = config.inner_width();
    let height = config.inner_height();
    let projection = Projection::fit_size(
        config.projection,
        width,
        height,
        countries.iter().map(|c| &c.geometry),
    );

    let groups = countries
        .par_iter()
        .enumerate()
        .map(|(index, country)| country_group(config, &projection, index, country, totals, scale))
        .collect::<Result<Vec<String>, ScaleError>>()?;

    let bubbles = countries.iter().filter(|c| totals.contains(&c.code)).count();
    info!(
        "Rendered world map with {} countries and {} bubbles",
        countries.len(),
        bubbles
    );

    let mut surface = SvgSurface::new(config.panel.clone(), config.width, config.height);
    surface.push(format!(
        r#"<g id="map" transform="translate({}, {})">"#,
        config.margin.left, config.margin.top
    ));
    surface.push(r#"<g id="countries">"#.to_string());
    surface.extend(groups);
    surface.push("</g>".to_string());
    surface.push(format!(
        r#"<rect id="bounding-rect" width="{}" height="{}" fill="none" stroke="black"/>"#,
        width, height
    ));
    surface.push("</g>".to_string());
    Ok(surface)
}

fn country_group(
    config: &MapConfig,
    projection: &Projection,
    index: usize,
    country: &CountryFeature,
    totals: &CountryTotals,
    scale: &Scale,
) -> Result<String, ScaleError> {
    let shape = projection.project_geometry(&country.geometry);

    let mut group = format!(
        r#"<g class="country" data-index="{}" data-code="{}" data-name="{}"><path d="{}" fill="{}" opacity="0.6" stroke="black"/>"#,
        index,
        escape_attr(&country.code),
        escape_attr(&country.name),
        projection::svg_path(&shape),
        escape_attr(&config.country_fill),
    );

    if let Some(total) = totals.get(&country.code) {
        match projection::centroid(&shape) {
            Some(center) => {
                let radius = scale.apply(total as f64)?;
                group.push_str(&format!(
                    r#"<circle id="{}" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" opacity="0.5"><title>{}: {}</title></circle>"#,
                    escape_attr(&country.code),
                    center.x(),
                    center.y(),
                    radius,
                    escape_attr(&config.bubble_fill),
                    escape_attr(&country.name),
                    total
                ));
            }
            None => debug!("Country {} has no centroid, skipping bubble", country.code),
        }
    }

    group.push_str("</g>");
    Ok(group)
}
