//! Order-invariant properties of the statistics engine

use peruse_stats::{pearson, Histogram, SummaryStats};
use proptest::prelude::*;

proptest! {
    #[test]
    fn quartiles_are_ordered(values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
        let stats = SummaryStats::from_values(&values, 10).unwrap();
        prop_assert!(stats.min <= stats.quartile1);
        prop_assert!(stats.quartile1 <= stats.median);
        prop_assert!(stats.median <= stats.quartile3);
        prop_assert!(stats.quartile3 <= stats.max);
        prop_assert!(stats.variance >= 0.0);
    }

    #[test]
    fn histogram_conserves_mass(
        values in prop::collection::vec(-1e6f64..1e6, 0..200),
        bins in 1usize..32,
    ) {
        let hist = Histogram::from_values(&values, bins);
        prop_assert_eq!(hist.total(), values.len());
        prop_assert_eq!(hist.counts().len(), bins);
    }

    #[test]
    fn correlation_is_symmetric(
        pairs in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 2..100),
    ) {
        let x: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let y: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        let ab = pearson(&x, &y);
        let ba = pearson(&y, &x);
        prop_assert!(ab.is_nan() == ba.is_nan());
        if !ab.is_nan() {
            prop_assert!((ab - ba).abs() < 1e-12);
            prop_assert!((-1.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn summary_is_order_independent(values in prop::collection::vec(-1e6f64..1e6, 1..100)) {
        let forward = SummaryStats::from_values(&values, 8).unwrap();
        let mut reversed = values.clone();
        reversed.reverse();
        let backward = SummaryStats::from_values(&reversed, 8).unwrap();
        prop_assert_eq!(forward.median, backward.median);
        prop_assert_eq!(forward.min, backward.min);
        prop_assert_eq!(forward.max, backward.max);
        prop_assert_eq!(forward.histogram.counts(), backward.histogram.counts());
    }
}
