//! Median helpers.
//!
//! The band filter compares prices against fractional medians, so medians are
//! carried doubled (sum of the two middle values) to stay in exact integers.

/// Twice the statistical median of an ascending slice.
pub(crate) fn doubled_median(sorted: &[u64]) -> Option<u64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }

    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid] * 2)
    } else {
        Some(sorted[mid - 1] + sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubled_median_odd() {
        assert_eq!(doubled_median(&[1, 2, 3]), Some(4));
        assert_eq!(doubled_median(&[7]), Some(14));
    }

    #[test]
    fn test_doubled_median_even() {
        assert_eq!(doubled_median(&[100_000, 105_000, 110_000, 990_000]), Some(215_000));
        assert_eq!(doubled_median(&[1, 2]), Some(3));
    }

    #[test]
    fn test_doubled_median_empty() {
        assert_eq!(doubled_median(&[]), None);
    }
}
