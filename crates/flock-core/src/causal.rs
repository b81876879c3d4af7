//! Causal advisory model over the four controllable house factors.
//!
//! Curves are synthetic: uplift is a noisy quadratic valley around a week-dependent optimum,
//! and "support" is a Gaussian kernel on the distance to that optimum rather than a sample
//! density. Every curve is seeded from its `(factor, week)` label, so the same question always
//! gets the same answer.

use contracts::{
    DoseResponse, Factor, FactorValues, PairwiseSurface, Recommendation, WeekSupport, CYCLE_WEEKS,
};

use crate::rng::SeededStream;
use crate::{ensure_week, round_to, EngineResult};

pub const DOSE_POINTS: usize = 20;
pub const SURFACE_GRID_SIZE: usize = 15;
pub const PROFIT_PER_PEF_POINT: f64 = 75.0;
pub const SUPPORT_GATE: f64 = 0.5;
pub const RISK_NOTE_THRESHOLD: f64 = 0.7;
pub const SAFE_ZONE_THRESHOLD: f64 = 0.3;
pub const RISK_NOTE: &str = "Limited data support - proceed with caution";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorRange {
    pub min: f64,
    pub max: f64,
}

impl FactorRange {
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    /// Kernel width used for support: a quarter of the range.
    pub fn sigma(self) -> f64 {
        self.span() / 4.0
    }

    /// `points` evenly spaced doses, both ends included.
    pub fn sample(self, points: usize) -> Vec<f64> {
        let last = points.saturating_sub(1).max(1) as f64;
        (0..points)
            .map(|idx| self.min + idx as f64 / last * self.span())
            .collect()
    }
}

pub fn factor_range(factor: Factor) -> FactorRange {
    match factor {
        Factor::Light => FactorRange { min: 8.0, max: 24.0 },
        Factor::Temperature => FactorRange { min: 18.0, max: 32.0 },
        Factor::Ventilation => FactorRange { min: 20.0, max: 100.0 },
        Factor::Protein => FactorRange { min: 16.0, max: 24.0 },
    }
}

pub fn optimal(factor: Factor, week: u32) -> f64 {
    let week = f64::from(week);
    match factor {
        Factor::Light => 18.0,
        Factor::Temperature => 26.0 - week,
        Factor::Ventilation => 50.0 + week * 5.0,
        Factor::Protein => 22.0 - week * 0.5,
    }
}

pub fn gaussian_support(x: f64, mean: f64, sigma: f64) -> f64 {
    (-(x - mean).powi(2) / (2.0 * sigma * sigma)).exp()
}

/// PEF uplift curve for `factor` in `week`, sampled at 20 doses across the factor range.
pub fn dose_response(factor: Factor, week: u32, current: f64) -> EngineResult<DoseResponse> {
    ensure_week(week)?;
    let mut stream = SeededStream::new(format!("{}-w{week}", factor.key()));
    let range = factor_range(factor);
    let optimal = optimal(factor, week);
    let doses = range.sample(DOSE_POINTS);

    let mut pef_uplift = Vec::with_capacity(DOSE_POINTS);
    let mut profit_delta = Vec::with_capacity(DOSE_POINTS);
    let mut ci_lower = Vec::with_capacity(DOSE_POINTS);
    let mut ci_upper = Vec::with_capacity(DOSE_POINTS);
    let mut support = Vec::with_capacity(DOSE_POINTS);

    for &dose in &doses {
        let distance = (dose - optimal).abs();
        let uplift = (15.0 - 0.5 * distance.powi(2)).max(0.0) + stream.range(-1.0, 1.0);
        let half_width = 2.0 + distance * 0.3;

        pef_uplift.push(round_to(uplift, 1));
        profit_delta.push(round_to(uplift * PROFIT_PER_PEF_POINT, 0));
        ci_lower.push(round_to(uplift - half_width, 1));
        ci_upper.push(round_to(uplift + half_width, 1));
        support.push(round_to(
            gaussian_support(dose, optimal, range.sigma()),
            2,
        ));
    }

    Ok(DoseResponse {
        factor,
        week,
        current,
        optimal,
        doses,
        pef_uplift,
        profit_delta,
        ci_lower,
        ci_upper,
        support,
    })
}

/// 15×15 joint uplift grid for two factors, with a cross term for their interaction.
pub fn pairwise_surface(
    factor1: Factor,
    factor2: Factor,
    week: u32,
) -> EngineResult<PairwiseSurface> {
    ensure_week(week)?;
    let mut stream = SeededStream::new(format!("{}-{}-w{week}", factor1.key(), factor2.key()));
    let (range1, range2) = (factor_range(factor1), factor_range(factor2));
    let (optimal1, optimal2) = (optimal(factor1, week), optimal(factor2, week));
    let doses1 = range1.sample(SURFACE_GRID_SIZE);
    let doses2 = range2.sample(SURFACE_GRID_SIZE);

    let mut pef_uplift = Vec::with_capacity(SURFACE_GRID_SIZE);
    let mut safe = Vec::with_capacity(SURFACE_GRID_SIZE);

    for &d1 in &doses1 {
        let mut uplift_row = Vec::with_capacity(SURFACE_GRID_SIZE);
        let mut safe_row = Vec::with_capacity(SURFACE_GRID_SIZE);
        for &d2 in &doses2 {
            let dist1 = d1 - optimal1;
            let dist2 = d2 - optimal2;
            let base = 15.0 - 0.3 * (dist1 * dist1 + dist2 * dist2) - 0.05 * dist1 * dist2;
            let noise = stream.range(-0.5, 0.5);
            uplift_row.push(round_to((base + noise).max(0.0), 1));

            let joint = gaussian_support(d1, optimal1, range1.sigma())
                * gaussian_support(d2, optimal2, range2.sigma());
            safe_row.push(joint > SAFE_ZONE_THRESHOLD);
        }
        pef_uplift.push(uplift_row);
        safe.push(safe_row);
    }

    Ok(PairwiseSurface {
        factor1,
        factor2,
        week,
        doses1,
        doses2,
        pef_uplift,
        safe,
    })
}

/// One recommendation per factor, best uplift first. Ties keep factor order.
pub fn recommend(week: u32, current: &FactorValues) -> EngineResult<Vec<Recommendation>> {
    let mut recommendations = Factor::ALL
        .iter()
        .map(|&factor| {
            let curve = dose_response(factor, week, current.get(factor))?;
            let idx = select_supported_dose(&curve);
            Ok(recommendation_at(&curve, idx))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    recommendations.sort_by(|a, b| b.pef_uplift.total_cmp(&a.pef_uplift));
    Ok(recommendations)
}

/// Index of the highest-uplift dose with support above the gate.
///
/// Starts from index 0, so a curve with no supported dose falls back to the range minimum.
pub fn select_supported_dose(curve: &DoseResponse) -> usize {
    let mut best_idx = 0;
    let mut best_uplift = f64::NEG_INFINITY;
    for (idx, (&support, &uplift)) in curve.support.iter().zip(&curve.pef_uplift).enumerate() {
        if support > SUPPORT_GATE && uplift > best_uplift {
            best_uplift = uplift;
            best_idx = idx;
        }
    }
    best_idx
}

fn recommendation_at(curve: &DoseResponse, idx: usize) -> Recommendation {
    let value_at = |values: &[f64]| values.get(idx).copied().unwrap_or_default();
    let support = value_at(&curve.support);

    Recommendation {
        factor: curve.factor,
        week: curve.week,
        current_value: curve.current,
        recommended_value: round_to(value_at(&curve.doses), 1),
        pef_uplift: round_to(value_at(&curve.pef_uplift), 1),
        profit_delta: value_at(&curve.profit_delta),
        confidence: (value_at(&curve.ci_lower), value_at(&curve.ci_upper)),
        support,
        risk_note: (support < RISK_NOTE_THRESHOLD).then(|| RISK_NOTE.to_string()),
    }
}

/// Assumed operating point for `week`: each factor's optimum plus bounded noise.
pub fn current_factor_values(week: u32) -> EngineResult<FactorValues> {
    ensure_week(week)?;
    let mut stream = SeededStream::new(format!("current-w{week}"));
    Ok(FactorValues {
        light: optimal(Factor::Light, week) + stream.range(-2.0, 2.0),
        temperature: optimal(Factor::Temperature, week) + stream.range(-1.5, 1.5),
        ventilation: optimal(Factor::Ventilation, week) + stream.range(-8.0, 8.0),
        protein: optimal(Factor::Protein, week) + stream.range(-0.8, 0.8),
    })
}

/// Mean dose-response support per week, averaged across factors at the week's current values.
pub fn week_support() -> EngineResult<Vec<WeekSupport>> {
    (1..=CYCLE_WEEKS)
        .map(|week| {
            let current = current_factor_values(week)?;
            let mut total = 0.0;
            for factor in Factor::ALL {
                total += dose_response(factor, week, current.get(factor))?.mean_support();
            }
            Ok(WeekSupport {
                week,
                support: round_to(total / Factor::ALL.len() as f64, 2),
            })
        })
        .collect()
}
