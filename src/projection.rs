use geo::{Centroid, Coord, CoordsIter, MapCoords, MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt::Write;

/// Latitude limit of Web Mercator; beyond it y grows without bound.
const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    Mercator,
    WinkelTripel,
}

/// A projection from lon/lat degrees to screen coordinates, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    kind: ProjectionKind,
    scale: f64,
    translate: (f64, f64),
}

impl Projection {
    pub fn new(kind: ProjectionKind) -> Self {
        Self {
            kind,
            scale: 1.0,
            translate: (0.0, 0.0),
        }
    }

    /// Scale and centre the projection so the geometries fill a
    /// `width` x `height` area.
    pub fn fit_size<'a, I>(kind: ProjectionKind, width: f64, height: f64, geometries: I) -> Self
    where
        I: IntoIterator<Item = &'a MultiPolygon<f64>>,
    {
        let unit = Self::new(kind);

        let mut min = Coord { x: f64::INFINITY, y: f64::INFINITY };
        let mut max = Coord { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };
        for geometry in geometries {
            for c in geometry.coords_iter() {
                let p = unit.project(c.x, c.y);
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                max.x = max.x.max(p.x);
                max.y = max.y.max(p.y);
            }
        }

        if !min.x.is_finite() || !max.x.is_finite() {
            return unit;
        }

        let dx = max.x - min.x;
        let dy = max.y - min.y;
        let scale = match (dx > 0.0, dy > 0.0) {
            (true, true) => (width / dx).min(height / dy),
            (true, false) => width / dx,
            (false, true) => height / dy,
            (false, false) => 1.0,
        };

        Self {
            kind,
            scale,
            translate: (
                (width - scale * (min.x + max.x)) / 2.0,
                (height - scale * (min.y + max.y)) / 2.0,
            ),
        }
    }

    pub fn project(&self, lon: f64, lat: f64) -> Coord<f64> {
        let (x, y) = self.raw(lon.to_radians(), lat.to_radians());
        Coord {
            x: self.translate.0 + self.scale * x,
            y: self.translate.1 - self.scale * y,
        }
    }

    pub fn project_geometry(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        geometry.map_coords(|c| self.project(c.x, c.y))
    }

    fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        match self.kind {
            ProjectionKind::Mercator => {
                let phi = phi.clamp(-MERCATOR_MAX_LAT.to_radians(), MERCATOR_MAX_LAT.to_radians());
                (lambda, (FRAC_PI_4 + phi / 2.0).tan().ln())
            }
            ProjectionKind::WinkelTripel => {
                // Average of Aitoff and equirectangular with standard parallel acos(2/pi).
                let (ax, ay) = aitoff(lambda, phi);
                ((ax + lambda / FRAC_PI_2) / 2.0, (ay + phi) / 2.0)
            }
        }
    }
}

fn aitoff(lambda: f64, phi: f64) -> (f64, f64) {
    let half = lambda / 2.0;
    let cos_phi = phi.cos();
    let alpha = (cos_phi * half.cos()).clamp(-1.0, 1.0).acos();
    let sinc_inv = if alpha == 0.0 { 1.0 } else { alpha / alpha.sin() };
    (2.0 * cos_phi * half.sin() * sinc_inv, phi.sin() * sinc_inv)
}

/// SVG path data for an already projected shape.
pub fn svg_path(shape: &MultiPolygon<f64>) -> String {
    let mut d = String::new();
    for polygon in shape {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let mut coords = ring.coords();
            let Some(first) = coords.next() else { continue };
            let _ = write!(d, "M{:.2},{:.2}", first.x, first.y);
            for c in coords {
                let _ = write!(d, "L{:.2},{:.2}", c.x, c.y);
            }
            d.push('Z');
        }
    }
    d
}

/// Area-weighted centroid of an already projected shape.
pub fn centroid(shape: &MultiPolygon<f64>) -> Option<Point<f64>> {
    shape.centroid()
}
