//! Similarity metrics.
//!
//! Every metric maps a pair of equal-length vectors to a score where higher
//! means closer, so ranking code never needs to know which one is active.
//! Sums are accumulated in `f64` in index order and the final score is
//! narrowed to `f32`, saturating at `f32::MAX`. Finite inputs therefore
//! always give finite, bit-reproducible scores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::VectorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// `1 / (1 + euclidean_distance)`, in (0, 1]
    #[default]
    L2,
    /// Cosine of the angle; 0 when either side has zero magnitude
    Cosine,
    /// Raw inner product
    Dot,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::L2, Metric::Cosine, Metric::Dot];

    pub fn tag(&self) -> &'static str {
        match self {
            Metric::L2 => "l2",
            Metric::Cosine => "cosine",
            Metric::Dot => "dot",
        }
    }

    /// Callers guarantee `a.len() == b.len()`.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let score = match self {
            Metric::L2 => 1.0 / (1.0 + euclidean_distance(a, b)),
            Metric::Cosine => cosine_similarity(a, b),
            Metric::Dot => dot(a, b),
        };
        narrow(score)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Metric {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Metric::L2),
            "cosine" => Ok(Metric::Cosine),
            "dot" | "ip" | "dot_product" => Ok(Metric::Dot),
            _ => {
                let supported: Vec<_> = Metric::ALL.iter().map(Metric::tag).collect();
                Err(VectorError::Validation(format!(
                    "unknown measure_type '{}', supported: {}",
                    s,
                    supported.join(", ")
                )))
            }
        }
    }
}

fn narrow(score: f64) -> f32 {
    score.clamp(f32::MIN as f64, f32::MAX as f64) as f32
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .fold(0.0, |acc, (&x, &y)| acc + f64::from(x) * f64::from(y))
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .fold(0.0, |acc, (&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            acc + d * d
        })
        .sqrt()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
