use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Descriptive statistics for one batch: a single (service, input, mode) combination.
///
/// Latency fields are in milliseconds and only cover successful samples. `success_rate` is taken
/// against the number of requests issued, so failures drag it down without skewing the latency
/// figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
    pub success_rate: f64,
}

impl BatchStats {
    /// Summarize the successful latencies (in ms) of a batch of `requested` samples.
    ///
    /// Returns `None` when nothing succeeded, since none of the statistics are defined then.
    pub fn from_latencies(latencies: &[f64], requested: usize) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }
        debug_assert!(latencies.len() <= requested);

        let min = latencies.iter().copied().fold(f64::INFINITY, f64::min);
        let max = latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // NOTE: Float summation can land an ulp outside the observed range.
        let mean = statistical::mean(latencies).clamp(min, max);
        let median = statistical::median(latencies);
        let stdev = if latencies.len() > 1 {
            statistical::standard_deviation(latencies, None)
        } else {
            0.
        };

        Some(Self {
            mean,
            median,
            stdev,
            min,
            max,
            success_rate: latencies.len() as f64 / requested as f64,
        })
    }

    pub fn from_durations(latencies: &[Duration], requested: usize) -> Option<Self> {
        let millis: Vec<f64> = latencies.iter().map(as_millis_f64).collect();
        Self::from_latencies(&millis, requested)
    }

    /// Requests per second a single client would see at the mean latency.
    pub fn throughput(&self) -> f64 {
        throughput(self.mean)
    }
}

pub fn throughput(latency_ms: f64) -> f64 {
    if latency_ms > 0. {
        1000. / latency_ms
    } else {
        0.
    }
}

pub fn as_millis_f64(dur: &Duration) -> f64 {
    dur.as_secs_f64() * 1000.
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn constant_latency() {
        let stats = BatchStats::from_latencies(&[50.; 5], 5).unwrap();
        assert_eq!(
            stats,
            BatchStats {
                mean: 50.,
                median: 50.,
                stdev: 0.,
                min: 50.,
                max: 50.,
                success_rate: 1.0,
            }
        );
    }

    #[test]
    fn partial_success() {
        let stats = BatchStats::from_latencies(&[10., 20., 60.], 5).unwrap();
        assert!(approx_eq(stats.success_rate, 0.6));
        assert!(approx_eq(stats.mean, 30.));
        assert!(approx_eq(stats.median, 20.));
        assert_eq!(stats.min, 10.);
        assert_eq!(stats.max, 60.);
    }

    #[test]
    fn empty_batch_has_no_stats() {
        assert!(BatchStats::from_latencies(&[], 5).is_none());
        assert!(BatchStats::from_durations(&[], 0).is_none());
    }

    #[test]
    fn single_sample_has_zero_stdev() {
        let stats = BatchStats::from_latencies(&[12.5], 3).unwrap();
        assert_eq!(stats.stdev, 0.);
        assert_eq!(stats.median, 12.5);
        assert!(approx_eq(stats.success_rate, 1. / 3.));
    }

    #[test]
    fn sample_stdev_and_even_median() {
        let stats = BatchStats::from_latencies(&[2., 4., 4., 4., 5., 5., 7., 9.], 8).unwrap();
        assert!(approx_eq(stats.mean, 5.));
        assert!(approx_eq(stats.median, 4.5));
        assert!(approx_eq(stats.stdev, (32f64 / 7.).sqrt()));
    }

    #[test]
    fn durations_are_converted_to_millis() {
        let latencies = [Duration::from_millis(40), Duration::from_micros(60_000)];
        let stats = BatchStats::from_durations(&latencies, 2).unwrap();
        assert!(approx_eq(stats.mean, 50.));
        assert!(approx_eq(stats.min, 40.));
        assert!(approx_eq(stats.max, 60.));
    }

    #[test]
    fn throughput_from_mean() {
        let stats = BatchStats::from_latencies(&[4.], 1).unwrap();
        assert!(approx_eq(stats.throughput(), 250.));
        assert_eq!(throughput(0.), 0.);
    }

    #[test]
    fn random_batches_stay_ordered() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let requested = rng.gen_range(1..64);
            let successes = rng.gen_range(1..=requested);
            let latencies: Vec<f64> = (0..successes)
                .map(|_| rng.gen_range(0.05..500.))
                .collect();

            let stats = BatchStats::from_latencies(&latencies, requested).unwrap();
            assert!(stats.min <= stats.median && stats.median <= stats.max);
            assert!(stats.min <= stats.mean && stats.mean <= stats.max);
            assert!(stats.stdev >= 0.);
            assert_eq!(stats.success_rate, successes as f64 / requested as f64);
        }
    }
}
