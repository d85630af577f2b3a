use crate::aggregate::CountryTotals;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Log,
    Linear,
    Sqrt,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    #[error("cannot build a scale over an empty set of totals")]
    EmptyDomain,
    #[error("log scale domain includes non-positive total {total} for country '{code}'")]
    NonPositiveDomain { code: String, total: u32 },
    #[error("log scale is undefined for non-positive value {0}")]
    NonPositiveValue(f64),
}

/// Continuous scale mapping a store total onto a size range.
///
/// Values are transformed (ln, identity or sqrt), normalised against the
/// transformed domain ends and interpolated into the range. Values outside
/// the domain are extrapolated, not clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    kind: ScaleKind,
    domain: (f64, f64),
    range: (f64, f64),
}

pub fn build_scale(
    totals: &CountryTotals,
    kind: ScaleKind,
    range: (f64, f64),
) -> Result<Scale, ScaleError> {
    let (lo, hi) = totals.extent().ok_or(ScaleError::EmptyDomain)?;

    if kind == ScaleKind::Log && lo == 0 {
        // Report the first offending country rather than nudging the domain.
        if let Some(bad) = totals.iter().find(|a| a.total == 0) {
            return Err(ScaleError::NonPositiveDomain {
                code: bad.country_code.clone(),
                total: bad.total,
            });
        }
    }

    Ok(Scale {
        kind,
        domain: (lo as f64, hi as f64),
        range,
    })
}

impl Scale {
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn apply(&self, value: f64) -> Result<f64, ScaleError> {
        if self.kind == ScaleKind::Log && value <= 0.0 {
            return Err(ScaleError::NonPositiveValue(value));
        }

        let t0 = self.transform(self.domain.0);
        let t1 = self.transform(self.domain.1);
        let t = if t1 != t0 {
            (self.transform(value) - t0) / (t1 - t0)
        } else {
            // Degenerate domain maps to the middle of the range.
            0.5
        };

        let (r0, r1) = self.range;
        Ok(r0 + t * (r1 - r0))
    }

    fn transform(&self, value: f64) -> f64 {
        match self.kind {
            ScaleKind::Log => value.ln(),
            ScaleKind::Linear => value,
            ScaleKind::Sqrt => value.signum() * value.abs().sqrt(),
        }
    }
}
