use crate::testing::effect::u_effect_size;
use crate::testing::inference::MannWhitneyMethod;
use crate::testing::{Alternative, TestResult};
use num_traits::{Float, NumCast};
use single_utilities::traits::FloatOps;
use statrs::function::erf::erfc;

/// Ranks of the pooled samples with ties averaged.
#[derive(Debug, Clone)]
pub struct PooledRanks<T> {
    /// Sum of the ranks belonging to the first sample
    pub rank_sum_x: T,
    /// `sum(t^3 - t)` over every group of tied values
    pub tie_term: T,
}

impl<T> PooledRanks<T>
where
    T: FloatOps,
{
    pub fn has_ties(&self) -> bool {
        self.tie_term > T::zero()
    }
}

fn cast<T: FloatOps, N: num_traits::ToPrimitive>(value: N) -> T {
    <T as NumCast>::from(value).unwrap_or_else(<T as Float>::nan)
}

/// Pool `x` and `y`, rank them with average ranks for ties, and return the rank
/// sum of `x` together with the tie correction term.
pub fn pooled_ranks<T>(x: &[T], y: &[T]) -> PooledRanks<T>
where
    T: FloatOps,
{
    // Combine samples and assign group labels (0 for x, 1 for y)
    let mut combined: Vec<(T, usize)> = Vec::with_capacity(x.len() + y.len());
    combined.extend(x.iter().map(|&v| (v, 0)));
    combined.extend(y.iter().map(|&v| (v, 1)));

    // NaN sorts after every number and ties only with NaN
    combined.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or_else(|| Float::is_nan(a.0).cmp(&Float::is_nan(b.0)))
    });

    let two: T = cast(2.0);
    let mut rank_sum_x = T::zero();
    let mut tie_term = T::zero();
    let mut i = 0;
    while i < combined.len() {
        let val = combined[i].0;
        let mut j = i + 1;

        while j < combined.len()
            && (combined[j].0 == val || (Float::is_nan(combined[j].0) && Float::is_nan(val)))
        {
            j += 1;
        }

        // ranks are 1-based: positions i..j share (i+1 + j) / 2
        let rank: T = cast::<T, _>(i + j + 1) / two;
        for item in &combined[i..j] {
            if item.1 == 0 {
                rank_sum_x += rank;
            }
        }

        let t: T = cast(j - i);
        tie_term += t * t * t - t;

        i = j;
    }

    PooledRanks {
        rank_sum_x,
        tie_term,
    }
}

/// Number of arrangements of two samples of sizes `n1` and `n2` giving each value
/// of U, indexed by U in `0..=n1*n2`.
///
/// The counts are the coefficients of the Gaussian binomial `[n1 + n2 choose n1]_q`,
/// built in place from
/// `[n + i choose i]_q = [n + i - 1 choose i - 1]_q * (1 - q^(n+i)) / (1 - q^i)`.
/// Memory is `O(n1 * n2)` and time `O(min(n1, n2)^2 * max(n1, n2))`.
pub fn exact_u_counts(n1: usize, n2: usize) -> Vec<f64> {
    // The distribution is symmetric in the sample sizes; iterate over the smaller one.
    let (m, n) = if n1 <= n2 { (n1, n2) } else { (n2, n1) };

    let mut counts = vec![0.0; m * n + 1];
    counts[0] = 1.0;
    let len = counts.len();
    for i in 1..=m {
        let shift = n + i;
        for u in (shift..len).rev() {
            counts[u] -= counts[u - shift];
        }
        for u in i..len {
            counts[u] += counts[u - i];
        }
    }

    counts
}

/// `P(U >= u)` under the exact null distribution.
pub fn exact_u_sf(u: usize, n1: usize, n2: usize) -> f64 {
    let counts = exact_u_counts(n1, n2);
    let total: f64 = counts.iter().sum();
    if u >= counts.len() {
        return 0.0;
    }
    counts[u..].iter().sum::<f64>() / total
}

/// Upper tail of the standard normal distribution.
pub fn standard_normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Mann-Whitney U test.
///
/// The reported statistic is U of the first sample, `R1 - n1(n1+1)/2`. For the
/// two-sided alternative the p-value is evaluated at `max(U1, U2)` and doubled;
/// `Greater` tests U1 and `Less` tests U2. The asymptotic variant applies tie and
/// continuity corrections; if every value is tied the p-value is 1.
///
/// Empty input yields a NaN statistic with p-value 1. Any NaN in the input yields a
/// NaN statistic and a NaN p-value.
pub fn mann_whitney<T>(
    x: &[T],
    y: &[T],
    alternative: Alternative,
    method: MannWhitneyMethod,
) -> TestResult<T>
where
    T: FloatOps,
{
    let nx = x.len();
    let ny = y.len();

    if nx == 0 || ny == 0 {
        return TestResult::new(<T as Float>::nan(), T::one()); // Insufficient data
    }

    if x.iter().chain(y).any(|v| Float::is_nan(*v)) {
        return TestResult::new(<T as Float>::nan(), <T as Float>::nan())
            .with_metadata("nx", cast(nx))
            .with_metadata("ny", cast(ny));
    }

    let ranks = pooled_ranks(x, y);
    let rank_sum_x = ranks.rank_sum_x.to_f64().unwrap_or(f64::NAN);
    let tie_term = ranks.tie_term.to_f64().unwrap_or(0.0);

    let n1 = nx as f64;
    let n2 = ny as f64;
    let n = n1 + n2;

    let u_x = rank_sum_x - n1 * (n1 + 1.0) / 2.0;
    let u_y = n1 * n2 - u_x;

    let (u, sides) = match alternative {
        Alternative::TwoSided => (u_x.max(u_y), 2.0),
        Alternative::Greater => (u_x, 1.0),
        Alternative::Less => (u_y, 1.0),
    };

    let mean_u = n1 * n2 / 2.0;
    let var_u = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    let sd_u = var_u.max(0.0).sqrt();

    let method = method.resolve(nx, ny, ranks.has_ties());
    let (p_value, z) = match method {
        MannWhitneyMethod::Exact => {
            let tail = exact_u_sf(u.round() as usize, nx, ny);
            let z = if sd_u > 0.0 { (u - mean_u) / sd_u } else { 0.0 };
            (tail * sides, z)
        }
        _ => {
            let numerator = u - mean_u - 0.5;
            if sd_u > 0.0 {
                let z = numerator / sd_u;
                (standard_normal_sf(z) * sides, z)
            } else {
                (1.0, 0.0)
            }
        }
    };
    let p_value = p_value.clamp(0.0, 1.0);

    let effect = u_effect_size(u_x, nx, ny);

    TestResult::with_effect_size(cast(u_x), cast(p_value), cast(effect.effect_size_r))
        .with_standard_error(cast(sd_u))
        .with_metadata("u_x", cast(u_x))
        .with_metadata("u_y", cast(u_y))
        .with_metadata("z_score", cast(z))
        .with_metadata("effect_z", cast(effect.z))
        .with_metadata("mean_u", cast(mean_u))
        .with_metadata("var_u", cast(var_u))
        .with_metadata("exact", cast(if method == MannWhitneyMethod::Exact { 1.0 } else { 0.0 }))
        .with_metadata("nx", cast(nx))
        .with_metadata("ny", cast(ny))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_pooled_ranks_average_ties() {
        // pooled: 1 2 2 3 -> ranks 1, 2.5, 2.5, 4
        let ranks = pooled_ranks(&[1.0, 2.0], &[2.0, 3.0]);
        assert_abs_diff_eq!(ranks.rank_sum_x, 3.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ranks.tie_term, 6.0, epsilon = 1e-12);
        assert!(ranks.has_ties());
    }

    #[test]
    fn test_exact_counts_small() {
        assert_eq!(exact_u_counts(1, 1), vec![1.0, 1.0]);
        assert_eq!(
            exact_u_counts(3, 3),
            vec![1.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 2.0, 1.0, 1.0]
        );
        // C(7, 2) arrangements
        let counts = exact_u_counts(2, 5);
        assert_eq!(counts.len(), 11);
        assert_abs_diff_eq!(counts.iter().sum::<f64>(), 21.0, epsilon = 1e-12);
        assert_eq!(counts, exact_u_counts(5, 2));
    }

    #[test]
    fn test_exact_sf() {
        assert_abs_diff_eq!(exact_u_sf(0, 3, 3), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(exact_u_sf(6, 3, 3), 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(exact_u_sf(9, 3, 3), 0.05, epsilon = 1e-12);
        assert_eq!(exact_u_sf(10, 3, 3), 0.0);
    }

    #[test]
    fn test_standard_normal_sf() {
        assert_abs_diff_eq!(standard_normal_sf(0.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(standard_normal_sf(1.959963984540054), 0.025, epsilon = 1e-9);
        assert_abs_diff_eq!(standard_normal_sf(-1.0), 0.8413447460685429, epsilon = 1e-9);
    }

    #[test]
    fn test_exact_interleaved() {
        let result = mann_whitney(
            &[10.0, 20.0, 30.0],
            &[15.0, 25.0, 35.0],
            Alternative::TwoSided,
            MannWhitneyMethod::Auto,
        );
        assert_abs_diff_eq!(result.statistic, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.p_value, 0.7, epsilon = 1e-12);
        assert_eq!(result.metadata_value("exact"), Some(1.0));
    }

    #[test]
    fn test_asymptotic_interleaved() {
        // z = (6 - 4.5 - 0.5) / sqrt(5.25)
        let result = mann_whitney(
            &[10.0, 20.0, 30.0],
            &[15.0, 25.0, 35.0],
            Alternative::TwoSided,
            MannWhitneyMethod::Asymptotic,
        );
        let z = 1.0 / 5.25_f64.sqrt();
        assert_abs_diff_eq!(result.statistic, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.p_value, 2.0 * standard_normal_sf(z), epsilon = 1e-12);
        assert_abs_diff_eq!(result.p_value, 0.6625205835, epsilon = 1e-6);
    }

    #[test]
    fn test_all_ties() {
        let result = mann_whitney(
            &[5.0, 5.0, 5.0],
            &[5.0, 5.0, 5.0],
            Alternative::TwoSided,
            MannWhitneyMethod::Auto,
        );
        assert_abs_diff_eq!(result.statistic, 4.5, epsilon = 1e-12);
        assert_eq!(result.p_value, 1.0);
        assert_eq!(result.effect_size, Some(0.0));
    }

    #[test]
    fn test_one_sided_alternatives() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [5.0, 6.0, 7.0, 8.0];
        let less = mann_whitney(&x, &y, Alternative::Less, MannWhitneyMethod::Exact);
        let greater = mann_whitney(&x, &y, Alternative::Greater, MannWhitneyMethod::Exact);
        // 1 / C(8, 4)
        assert_abs_diff_eq!(less.p_value, 1.0 / 70.0, epsilon = 1e-12);
        assert_abs_diff_eq!(greater.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let result =
            mann_whitney::<f64>(&[], &[1.0], Alternative::TwoSided, MannWhitneyMethod::Auto);
        assert!(result.statistic.is_nan());
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_nan_input_propagates() {
        let x = [1.0, f64::NAN, 3.0, 4.0];
        let y = [5.0, 6.0, 7.0, 8.0];
        let result = mann_whitney(&x, &y, Alternative::TwoSided, MannWhitneyMethod::Auto);
        assert!(result.statistic.is_nan());
        assert!(result.p_value.is_nan());
        assert_eq!(result.metadata_value("nx"), Some(4.0));
    }

    #[test]
    fn test_pooled_ranks_nan_sorts_last() {
        // 1 2 NaN NaN -> x holds ranks 1 and 3.5
        let ranks = pooled_ranks(&[1.0, f64::NAN], &[f64::NAN, 2.0]);
        assert_abs_diff_eq!(ranks.rank_sum_x, 4.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ranks.tie_term, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_counts_lopsided() {
        // 5 vs 4000 values: C(4005, 5) arrangements, symmetric around n1*n2/2
        let (m, n) = (5usize, 4000usize);
        let counts = exact_u_counts(m, n);
        assert_eq!(counts.len(), m * n + 1);

        let total: f64 = (1..=m).map(|k| (n + k) as f64 / k as f64).product();
        assert_relative_eq!(counts.iter().sum::<f64>(), total, max_relative = 1e-9);
        assert_relative_eq!(counts[8000], counts[m * n - 8000], max_relative = 1e-9);
        assert!(counts.iter().all(|&c| c > -1e-3 * total.sqrt()));
    }

    #[test]
    fn test_exact_lopsided_separated_groups() {
        let x: Vec<f64> = (0..5).map(|v| v as f64 + 0.5).collect();
        let y: Vec<f64> = (10..3010).map(|v| v as f64).collect();
        let result = mann_whitney(&x, &y, Alternative::TwoSided, MannWhitneyMethod::Auto);

        assert_eq!(result.metadata_value("exact"), Some(1.0));
        assert_abs_diff_eq!(result.statistic, 0.0, epsilon = 1e-12);
        // 2 / C(3005, 5) is about 1e-15
        assert!(result.p_value >= 0.0 && result.p_value < 1e-12);
    }
}
