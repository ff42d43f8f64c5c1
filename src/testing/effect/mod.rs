use serde::Serialize;

/// Untied normal approximation of a U statistic and the effect size derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UApproximation {
    pub mean_u: f64,
    pub std_u: f64,
    pub z: f64,
    /// `z / sqrt(n1 + n2)`
    pub effect_size_r: f64,
}

/// Standardize `u` against its null mean `n1*n2/2` and standard deviation
/// `sqrt(n1*n2*(n+1)/12)`, then scale by `sqrt(n)` to get the effect size r.
///
/// No tie correction is applied here. When the standard deviation is zero
/// (an empty sample) both `z` and `r` are defined as 0.
pub fn u_effect_size(u: f64, n1: usize, n2: usize) -> UApproximation {
    let n = (n1 + n2) as f64;
    let n1n2 = (n1 * n2) as f64;

    let mean_u = n1n2 / 2.0;
    let std_u = (n1n2 * (n + 1.0) / 12.0).sqrt();

    if std_u == 0.0 || !std_u.is_finite() {
        return UApproximation {
            mean_u,
            std_u,
            z: 0.0,
            effect_size_r: 0.0,
        };
    }

    let z = (u - mean_u) / std_u;
    let effect_size_r = z / n.sqrt();

    UApproximation {
        mean_u,
        std_u,
        z,
        effect_size_r,
    }
}
