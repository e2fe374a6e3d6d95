//! Synthetic boom/bust series generation.
//!
//! Produces a permit-count-like series: a base level with a slow trend, two
//! superposed cycles (a long construction cycle and a shorter business cycle)
//! and Gaussian noise. The output is fully determined by the seed.

use std::f64::consts::PI;

use chrono::{Months, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{Cadence, Series, SeriesPoint};
use crate::error::AppError;

/// Shape parameters for the generated series.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub cadence: Cadence,
    /// Number of observations.
    pub periods: usize,
    pub seed: u64,
    pub start: NaiveDate,
    /// Level at the start of the series.
    pub base: f64,
    /// Growth per year, as a fraction of `base`.
    pub trend: f64,
    /// Length of the long cycle, in years.
    pub long_cycle_years: f64,
    /// Relative amplitude of the long cycle.
    pub long_amplitude: f64,
    /// Length of the short cycle, in years.
    pub short_cycle_years: f64,
    /// Relative amplitude of the short cycle.
    pub short_amplitude: f64,
    /// Noise standard deviation, as a fraction of `base`.
    pub noise: f64,
}

impl SyntheticSpec {
    pub fn new(cadence: Cadence, periods: usize, seed: u64) -> Self {
        Self {
            cadence,
            periods,
            seed,
            start: NaiveDate::from_ymd_opt(1960, 1, 1).unwrap_or_default(),
            base: 1200.0,
            trend: 0.005,
            long_cycle_years: 18.0,
            long_amplitude: 0.35,
            short_cycle_years: 7.0,
            short_amplitude: 0.12,
            noise: 0.04,
        }
    }

    fn periods_per_year(&self) -> f64 {
        match self.cadence {
            Cadence::Monthly => 12.0,
            Cadence::Annual => 1.0,
        }
    }

    fn months_per_step(&self) -> u32 {
        match self.cadence {
            Cadence::Monthly => 1,
            Cadence::Annual => 12,
        }
    }
}

/// Generate a synthetic series.
pub fn generate_synthetic(spec: &SyntheticSpec) -> Result<Series, AppError> {
    if spec.periods == 0 {
        return Err(AppError::new(2, "Synthetic series needs at least one period."));
    }
    if !(spec.long_cycle_years > 0.0 && spec.short_cycle_years > 0.0) {
        return Err(AppError::new(2, "Cycle lengths must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.noise.max(0.0) * spec.base)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let per_year = spec.periods_per_year();
    let step = spec.months_per_step();

    let mut points = Vec::with_capacity(spec.periods);
    for i in 0..spec.periods {
        let years = i as f64 / per_year;
        let level = spec.base * (1.0 + spec.trend * years);
        let long = spec.long_amplitude * (2.0 * PI * years / spec.long_cycle_years).sin();
        let short = spec.short_amplitude * (2.0 * PI * years / spec.short_cycle_years).sin();

        // Permit counts never go negative.
        let value = (level * (1.0 + long + short) + normal.sample(&mut rng)).max(0.0);

        let date = spec
            .start
            .checked_add_months(Months::new(i as u32 * step))
            .ok_or_else(|| AppError::new(2, "Synthetic series runs past the calendar range."))?;
        points.push(SeriesPoint { date, raw_value: value });
    }

    Ok(Series::new(points)?)
}
