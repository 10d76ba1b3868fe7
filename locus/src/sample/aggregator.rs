//! Batch mean smoothing.
//!
//! Each delivery batch is reduced independently: samples with a non-positive
//! horizontal accuracy are discarded and every numeric field of the rest is
//! averaged. There is no smoothing across batches and no outlier rejection
//! beyond the accuracy check. A batch with no valid samples produces no
//! update, so a good estimate is never replaced by garbage.

use chrono::{DateTime, Utc};

use super::types::{LocationEstimate, RawSample};

/// Result of reducing one batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// The batch produced a new estimate.
    Updated(LocationEstimate),
    /// The batch held no valid samples; keep the previous estimate.
    NoUpdate,
}

impl Aggregation {
    /// The new estimate, if any.
    pub fn into_estimate(self) -> Option<LocationEstimate> {
        match self {
            Self::Updated(estimate) => Some(estimate),
            Self::NoUpdate => None,
        }
    }
}

/// Running sums over the valid samples of a batch.
#[derive(Debug, Default)]
struct Sums {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    horizontal_accuracy: f64,
    vertical_accuracy: f64,
    course: f64,
    speed: f64,
    count: usize,
}

impl Sums {
    fn add(&mut self, sample: &RawSample) {
        self.latitude += sample.latitude;
        self.longitude += sample.longitude;
        self.altitude += sample.altitude;
        self.horizontal_accuracy += sample.horizontal_accuracy;
        self.vertical_accuracy += sample.vertical_accuracy;
        self.course += sample.course;
        self.speed += sample.speed;
        self.count += 1;
    }

    fn mean(&self, timestamp: DateTime<Utc>) -> Option<LocationEstimate> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(LocationEstimate {
            latitude: self.latitude / n,
            longitude: self.longitude / n,
            altitude: self.altitude / n,
            horizontal_accuracy: self.horizontal_accuracy / n,
            vertical_accuracy: self.vertical_accuracy / n,
            course: self.course / n,
            speed: self.speed / n,
            timestamp,
            sample_count: self.count,
        })
    }
}

/// Reduces a batch of raw samples into one estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleAggregator;

impl SampleAggregator {
    /// Create an aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Reduce `samples`, stamping the estimate with the current time.
    pub fn aggregate(&self, samples: &[RawSample]) -> Aggregation {
        self.aggregate_at(samples, Utc::now())
    }

    /// Reduce `samples`, stamping the estimate with `now`.
    pub fn aggregate_at(&self, samples: &[RawSample], now: DateTime<Utc>) -> Aggregation {
        let mut sums = Sums::default();
        for sample in samples.iter().filter(|s| s.is_valid()) {
            sums.add(sample);
        }

        let discarded = samples.len() - sums.count;
        if discarded > 0 {
            tracing::trace!(discarded, total = samples.len(), "Discarded invalid samples");
        }

        match sums.mean(now) {
            Some(estimate) => Aggregation::Updated(estimate),
            None => Aggregation::NoUpdate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(lat: f64, acc: f64) -> RawSample {
        RawSample::new(lat, 0.0, acc)
    }

    #[test]
    fn test_invalid_samples_excluded_from_mean() {
        let batch = vec![sample(10.0, 5.0), sample(20.0, -1.0), sample(30.0, 3.0)];

        let estimate = SampleAggregator::new()
            .aggregate(&batch)
            .into_estimate()
            .expect("two valid samples");

        assert_eq!(estimate.latitude, 20.0);
        assert_eq!(estimate.horizontal_accuracy, 4.0);
        assert_eq!(estimate.sample_count, 2);
    }

    #[test]
    fn test_empty_batch_is_no_update() {
        assert_eq!(SampleAggregator::new().aggregate(&[]), Aggregation::NoUpdate);
    }

    #[test]
    fn test_all_invalid_is_no_update() {
        let batch = vec![sample(10.0, 0.0), sample(20.0, -5.0)];
        assert_eq!(
            SampleAggregator::new().aggregate(&batch),
            Aggregation::NoUpdate
        );
    }

    #[test]
    fn test_every_field_is_averaged() {
        let batch = vec![
            RawSample::new(1.0, 2.0, 4.0)
                .with_altitude(100.0, 10.0)
                .with_motion(90.0, 3.0),
            RawSample::new(3.0, 4.0, 8.0)
                .with_altitude(200.0, 20.0)
                .with_motion(270.0, 5.0),
        ];

        let estimate = SampleAggregator::new()
            .aggregate(&batch)
            .into_estimate()
            .expect("valid batch");

        assert_eq!(estimate.latitude, 2.0);
        assert_eq!(estimate.longitude, 3.0);
        assert_eq!(estimate.altitude, 150.0);
        assert_eq!(estimate.horizontal_accuracy, 6.0);
        assert_eq!(estimate.vertical_accuracy, 15.0);
        assert_eq!(estimate.course, 180.0);
        assert_eq!(estimate.speed, 4.0);
    }

    #[test]
    fn test_estimate_stamped_with_aggregation_time() {
        let now = Utc::now();
        let mut old = sample(1.0, 1.0);
        old.timestamp = now - chrono::Duration::seconds(30);

        let estimate = SampleAggregator::new()
            .aggregate_at(&[old], now)
            .into_estimate()
            .expect("valid batch");

        assert_eq!(estimate.timestamp, now);
    }

    proptest! {
        #[test]
        fn prop_latitude_is_mean_of_valid_samples(
            batch in prop::collection::vec((-90.0f64..90.0, -10.0f64..50.0), 0..32)
        ) {
            let samples: Vec<RawSample> =
                batch.iter().map(|&(lat, acc)| sample(lat, acc)).collect();
            let valid: Vec<f64> =
                batch.iter().filter(|&&(_, acc)| acc > 0.0).map(|&(lat, _)| lat).collect();

            match SampleAggregator::new().aggregate(&samples) {
                Aggregation::Updated(estimate) => {
                    prop_assert!(!valid.is_empty());
                    let expected = valid.iter().sum::<f64>() / valid.len() as f64;
                    prop_assert!((estimate.latitude - expected).abs() < 1e-9);
                    prop_assert_eq!(estimate.sample_count, valid.len());
                }
                Aggregation::NoUpdate => prop_assert!(valid.is_empty()),
            }
        }
    }
}
