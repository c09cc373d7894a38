use std::time::Duration;

/// Requests issued per phase when none is configured.
pub const DEFAULT_NUM_REQUESTS: usize = 500;

/// Size of the worker pool used for the concurrent phase.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Fibonacci inputs benchmarked against every service, in order.
pub const DEFAULT_INPUTS: [u32; 4] = [10, 20, 30, 40];

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// The service every other service is compared against in speedup reports.
pub const DEFAULT_BASELINE: &str = "python";

/// Largest input the compute services accept. Anything above is answered with a 400.
pub const MAX_FIBONACCI_INPUT: u32 = 90;
