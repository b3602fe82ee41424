//! Income and expense stream aggregation

use crate::model::CashFlowStream;

/// Sum of every stream active in `year`. Overlapping streams add independently.
#[must_use]
pub fn total_for_year(year: i32, streams: &[CashFlowStream]) -> f64 {
    streams
        .iter()
        .filter(|s| s.is_active(year))
        .map(|s| s.annual_amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_streams_contribute_nothing() {
        assert_eq!(total_for_year(2030, &[]), 0.0);
    }

    #[test]
    fn test_stream_bounds_are_half_open() {
        let s = [CashFlowStream::new(2030, 3, 10_000.0)];
        assert_eq!(total_for_year(2029, &s), 0.0);
        assert_eq!(total_for_year(2030, &s), 10_000.0);
        assert_eq!(total_for_year(2032, &s), 10_000.0);
        assert_eq!(total_for_year(2033, &s), 0.0);
    }

    #[test]
    fn test_open_ended_stream_stays_active() {
        let s = [CashFlowStream::new(2030, i32::MAX, 10_000.0)];
        assert_eq!(total_for_year(2029, &s), 0.0);
        assert_eq!(total_for_year(2030, &s), 10_000.0);
        assert_eq!(total_for_year(i32::MAX, &s), 10_000.0);
    }

    #[test]
    fn test_zero_duration_never_active() {
        let s = [CashFlowStream::new(2030, 0, 10_000.0)];
        assert_eq!(total_for_year(2030, &s), 0.0);
    }
}
