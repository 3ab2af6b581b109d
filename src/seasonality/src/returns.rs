use crate::series::TimeSeries;

/// Simple percentage returns, `(p[i] - p[i-1]) / p[i-1]`.
///
/// The output has the input's dates. Element 0 is NaN, as is any element whose
/// prior price is zero or non-finite; NaN flows on into aggregation rather
/// than raising.
pub fn pct_change(prices: &TimeSeries) -> TimeSeries {
    prices.map_values(|prev, price| match prev {
        Some(p) if p != 0.0 && p.is_finite() => {
            let r = (price - p) / p;
            if r.is_finite() { r } else { f64::NAN }
        }
        _ => f64::NAN,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        TimeSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (start + chrono::Days::new(i as u64), v))
                .collect(),
        )
        .unwrap()
    }

    fn values(s: &TimeSeries) -> Vec<f64> {
        s.iter().map(|p| p.1).collect()
    }

    #[test]
    fn first_is_undefined_and_rest_are_simple_returns() {
        let r = values(&pct_change(&series(&[100.0, 110.0, 99.0])));
        assert!(r[0].is_nan());
        assert!((r[1] - 0.1).abs() < 1e-12);
        assert!((r[2] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn zero_or_missing_prior_price_yields_nan() {
        let r = values(&pct_change(&series(&[0.0, 5.0, f64::NAN, 6.0, 3.0])));
        assert!(r[1].is_nan(), "zero denominator");
        assert!(r[2].is_nan(), "missing price");
        assert!(r[3].is_nan(), "missing prior price");
        assert!((r[4] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn keeps_dates_and_length() {
        let prices = series(&[1.0, 2.0, 3.0, 4.0]);
        let returns = pct_change(&prices);
        assert_eq!(returns.len(), prices.len());
        let dates: Vec<_> = returns.iter().map(|p| p.0).collect();
        let expected: Vec<_> = prices.iter().map(|p| p.0).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(pct_change(&TimeSeries::empty()).is_empty());
    }
}
