use super::tester::TrialCount;
use crate::engine::BoxSize;
use serde::Serialize;
use tracing::info;

/// Turn raw counts into frequencies: `out[idx] = counts[idx] / trials`.
pub fn normalize(counts: &[u64], trials: TrialCount) -> Vec<f64> {
    let trials = trials.get() as f64;
    counts.iter().map(|&c| c as f64 / trials).collect()
}

/// Mean of a probability curve next to the value a uniform curve would have.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Average {
    pub obtained: f64,
    pub expected: f64,
}

/// Arithmetic mean of `probabilities`, with `1/len` as the uniform
/// expectation. `None` for an empty slice.
pub fn average(probabilities: &[f64]) -> Option<Average> {
    if probabilities.is_empty() {
        return None;
    }

    let len = probabilities.len() as f64;
    let avg = Average {
        obtained: probabilities.iter().sum::<f64>() / len,
        expected: 1.0 / len,
    };
    info!(obtained = avg.obtained, expected = avg.expected, "average probability");
    Some(avg)
}

/// Probability that position `idx` keeps the value set by its own
/// scheduling swap through the remaining `n - idx` swaps, assuming each
/// later swap target is uniform and independent: `(1 - 1/n)^(n - idx)`.
pub fn theoretical_persistence(n: BoxSize, idx: usize) -> f64 {
    let size = n.get() as f64;
    let remaining = n.get().saturating_sub(idx) as f64;
    (1.0 - 1.0 / size).powf(remaining)
}

pub fn theoretical_curve(n: BoxSize) -> Vec<f64> {
    (0..n.get()).map(|idx| theoretical_persistence(n, idx)).collect()
}

/// Chi-square goodness of fit against a uniform distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquare {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
}

/// Chi-square statistic of `counts` against equal expected counts.
/// Needs at least two outcomes and one observation.
pub fn chi_square_uniform(counts: &[u64]) -> Option<ChiSquare> {
    let total: u64 = counts.iter().sum();
    if counts.len() < 2 || total == 0 {
        return None;
    }

    let expected = total as f64 / counts.len() as f64;
    let statistic: f64 = counts
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let degrees_of_freedom = counts.len() - 1;

    Some(ChiSquare {
        statistic,
        degrees_of_freedom,
        p_value: chi_square_p_value(statistic, degrees_of_freedom),
    })
}

/// Upper-tail p-value via Fisher's approximation
/// `sqrt(2x) - sqrt(2df - 1) ~ N(0, 1)`.
fn chi_square_p_value(chi_square: f64, df: usize) -> f64 {
    let z = (2.0 * chi_square).sqrt() - (2.0 * df as f64 - 1.0).sqrt();
    0.5 * (1.0 - erf(z / std::f64::consts::SQRT_2))
}

/// Abramowitz-Stegun 7.1.26 coefficients, lowest order first
const ERF_COEFFS: [f64; 5] = [0.254829592, -0.284496736, 1.421413741, -1.453152027, 1.061405429];
const ERF_P: f64 = 0.3275911;

/// Error function, absolute error below 1.5e-7
fn erf(x: f64) -> f64 {
    let t = 1.0 / (1.0 + ERF_P * x.abs());
    let poly = ERF_COEFFS.iter().rev().fold(0.0, |acc, c| acc * t + c) * t;
    (1.0 - poly * (-x * x).exp()).copysign(x)
}

/// How a p-value reads against a uniform hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Uniform,
    Marginal,
    Suspect,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uniform => write!(f, "PASS - consistent with uniform output"),
            Self::Marginal => write!(f, "Marginal - slight deviation from uniform"),
            Self::Suspect => write!(f, "SUSPECT - significant deviation from uniform"),
        }
    }
}

impl ChiSquare {
    /// Two-sided: both a poor fit and a suspiciously perfect fit stand out.
    pub fn verdict(&self) -> Verdict {
        let tail = self.p_value.min(1.0 - self.p_value);
        if tail < 0.01 {
            Verdict::Suspect
        } else if tail < 0.05 {
            Verdict::Marginal
        } else {
            Verdict::Uniform
        }
    }

    /// P-value rounded to three places, clamped at the ends.
    pub fn p_value_label(&self) -> String {
        match self.p_value {
            p if p < 0.001 => "< 0.001".to_string(),
            p if p > 0.999 => "> 0.999".to_string(),
            p => format!("{:.3}", p),
        }
    }
}

/// How far an empirical curve sits from its reference curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deviation {
    pub max_abs: f64,
    pub max_index: usize,
    pub mean_abs: f64,
}

/// Compare two curves position by position. `None` when they differ in
/// length or are empty.
pub fn deviation(empirical: &[f64], reference: &[f64]) -> Option<Deviation> {
    if empirical.is_empty() || empirical.len() != reference.len() {
        return None;
    }

    let mut max_abs = 0.0;
    let mut max_index = 0;
    let mut sum = 0.0;
    for (idx, (e, r)) in empirical.iter().zip(reference).enumerate() {
        let diff = (e - r).abs();
        sum += diff;
        if diff > max_abs {
            max_abs = diff;
            max_index = idx;
        }
    }

    Some(Deviation {
        max_abs,
        max_index,
        mean_abs: sum / empirical.len() as f64,
    })
}
