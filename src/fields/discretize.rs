//! Binning of numeric metadata fields.
//!
//! Columns with fewer than [`MAX_BINS`] distinct values get one bin per value
//! (`raw`). Everything else is cut into ten decile-style bins whose bounds are
//! taken from the *distinct* values sorted ascending, so heavily repeated
//! values do not pull every bound onto themselves.

use std::cmp::Ordering;

use super::types::BinMethod;

/// Number of bins for quantile binning, and the raw-binning threshold
pub const MAX_BINS: usize = 10;

/// Bin layout chosen for a column
#[derive(Debug, Clone, PartialEq)]
pub enum BinScheme<T> {
    /// One bin per distinct value, ascending
    Raw {
        /// The distinct values
        values: Vec<T>,
    },
    /// Ten bins described by eleven ascending bounds
    Quantiles {
        /// Minimum, nine inner bounds and the maximum
        breaks: Vec<T>,
    },
}

/// A discretized column: the scheme, per-bin counts and one bin per row
#[derive(Debug, Clone, PartialEq)]
pub struct Discretized<T> {
    /// Bin layout
    pub scheme: BinScheme<T>,
    /// Rows per bin; sums to the row count
    pub bin_counts: Vec<u64>,
    /// Bin index of every row, in row order
    pub bins: Vec<u8>,
}

impl<T> Discretized<T> {
    /// Method name recorded in the schema
    pub fn method(&self) -> BinMethod {
        match self.scheme {
            BinScheme::Raw { .. } => BinMethod::Raw,
            BinScheme::Quantiles { .. } => BinMethod::Quantiles,
        }
    }
}

fn compare<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Distinct values with their counts, ascending by value.
fn value_counts<T: Copy + PartialOrd>(values: &[T]) -> Vec<(T, u64)> {
    let mut sorted = values.to_vec();
    sorted.sort_by(compare);

    let mut counts: Vec<(T, u64)> = Vec::new();
    for value in sorted {
        match counts.last_mut() {
            Some((last, count)) if compare(last, &value) == Ordering::Equal => *count += 1,
            _ => counts.push((value, 1)),
        }
    }
    counts
}

/// Ranks into the distinct-value list used as quantile bounds.
///
/// Rank `i` is `round(i * distinct / 10)` for `i` in `0..10` (halves round
/// up), followed by the rank of the maximum.
pub fn quantile_ranks(distinct: usize) -> Vec<usize> {
    let mut ranks: Vec<usize> = (0..MAX_BINS)
        .map(|i| (i * distinct * 2 + MAX_BINS) / (MAX_BINS * 2))
        .collect();
    ranks.push(distinct.saturating_sub(1));
    ranks
}

/// Bin every value of a numeric column.
pub fn discretize<T: Copy + PartialOrd>(values: &[T]) -> Discretized<T> {
    let counts = value_counts(values);
    let distinct: Vec<T> = counts.iter().map(|(v, _)| *v).collect();

    if distinct.len() < MAX_BINS {
        let bins = values
            .iter()
            .map(|x| distinct.partition_point(|v| compare(v, x) == Ordering::Less) as u8)
            .collect();
        return Discretized {
            bin_counts: counts.iter().map(|(_, c)| *c).collect(),
            scheme: BinScheme::Raw { values: distinct },
            bins,
        };
    }

    let breaks: Vec<T> = quantile_ranks(distinct.len())
        .into_iter()
        .map(|rank| distinct[rank])
        .collect();
    debug_assert!(
        breaks.windows(2).all(|w| compare(&w[0], &w[1]) != Ordering::Greater),
        "quantile breaks must be ascending"
    );

    // the first break is the minimum and bounds nothing
    let upper_bounds = &breaks[1..];
    let mut bin_counts = vec![0u64; MAX_BINS];
    let bins = values
        .iter()
        .map(|x| {
            let bin = upper_bounds.partition_point(|b| compare(b, x) == Ordering::Less);
            debug_assert!(bin < MAX_BINS);
            bin_counts[bin] += 1;
            bin as u8
        })
        .collect();

    Discretized {
        scheme: BinScheme::Quantiles { breaks },
        bin_counts,
        bins,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_bins_follow_value_order() {
        let result = discretize(&[3i64, 1, 2, 3, 3]);
        assert_eq!(result.method(), BinMethod::Raw);
        assert_eq!(
            result.scheme,
            BinScheme::Raw {
                values: vec![1, 2, 3]
            }
        );
        assert_eq!(result.bin_counts, vec![1, 1, 3]);
        assert_eq!(result.bins, vec![2, 0, 1, 2, 2]);
    }

    #[test]
    fn test_nine_distinct_values_stay_raw() {
        let values: Vec<i64> = (0..9).collect();
        let result = discretize(&values);
        assert_eq!(result.method(), BinMethod::Raw);
        assert_eq!(result.bin_counts.len(), 9);
    }

    #[test]
    fn test_ten_distinct_values_are_quantiles() {
        let values: Vec<i64> = (0..10).collect();
        let result = discretize(&values);
        assert_eq!(result.method(), BinMethod::Quantiles);
        match &result.scheme {
            BinScheme::Quantiles { breaks } => {
                assert_eq!(breaks, &vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9]);
            }
            _ => unreachable!(),
        }
        // 0 and 1 share the first bin; the last two bounds coincide so bin 9 stays empty
        assert_eq!(result.bin_counts, vec![2, 1, 1, 1, 1, 1, 1, 1, 1, 0]);
        assert_eq!(result.bin_counts.iter().sum::<u64>(), 10);
    }

    #[test]
    fn test_quantile_ranks() {
        assert_eq!(quantile_ranks(10), vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9]);
        assert_eq!(quantile_ranks(15), vec![0, 2, 3, 5, 6, 8, 9, 11, 12, 14, 14]);
        assert_eq!(
            quantile_ranks(100),
            vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 99]
        );
    }

    #[test]
    fn test_duplicates_do_not_skew_ranks() {
        // 1000 zeros and 20 distinct positive values
        let mut values = vec![0.0f64; 1000];
        values.extend((1..=20).map(|i| i as f64));
        let result = discretize(&values);
        match &result.scheme {
            BinScheme::Quantiles { breaks } => {
                assert_eq!(breaks[0], 0.0);
                assert_eq!(breaks[1], 2.0);
                assert_eq!(breaks[10], 20.0);
            }
            _ => unreachable!(),
        }
        assert_eq!(result.bin_counts[0], 1002);
        assert_eq!(result.bin_counts.iter().sum::<u64>(), 1020);
    }

    #[test]
    fn test_empty_column() {
        let result = discretize::<i64>(&[]);
        assert_eq!(result.method(), BinMethod::Raw);
        assert!(result.bins.is_empty());
        assert!(result.bin_counts.is_empty());
    }
}
