use super::{ChartError, ChartResult};
use serde::Serialize;

pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// One histogram bar covering `[lower, upper)`; the last bar also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub buckets: Vec<Bucket>,
}

impl Histogram {
    /// Sum of all bucket counts; equals the number of binned values.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.count).max().unwrap_or(0)
    }
}

/// Bins `values` into `bucket_count` equal-width buckets spanning `[min, max]`.
///
/// When every value is equal the range widens around it so the buckets keep a
/// non-zero width. Non-finite values are ignored.
///
/// # Errors
/// - `EmptyInput` when there is no finite value.
/// - `InvalidBucketCount` when `bucket_count == 0`.
pub fn histogram(values: &[f64], bucket_count: usize) -> ChartResult<Histogram> {
    if bucket_count == 0 {
        return Err(ChartError::InvalidBucketCount);
    }

    let mut finite = values.iter().copied().filter(|value| value.is_finite());
    let first = finite.next().ok_or(ChartError::EmptyInput)?;
    let (mut min, mut max) = (first, first);
    for value in finite {
        min = min.min(value);
        max = max.max(value);
    }
    if min == max {
        let pad = SINGLE_VALUE_PAD.max(min.abs() * SINGLE_VALUE_PAD_RATIO);
        min -= pad;
        max += pad;
    }

    let range = Range::new(min, max, bucket_count);
    let mut buckets = (0..bucket_count)
        .map(|index| Bucket {
            lower: range.edge(index),
            upper: range.edge(index + 1),
            count: 0,
        })
        .collect::<Vec<_>>();

    for value in values.iter().copied().filter(|value| value.is_finite()) {
        let offset = range.position(value).floor();
        // Values at `max` land on the right edge of the last bucket.
        let index = if offset.is_nan() || offset < 0.0 {
            0
        } else {
            (offset as usize).min(bucket_count - 1)
        };
        buckets[index].count += 1;
    }

    Ok(Histogram { buckets })
}

/// Half-width used around a single distinct value.
const SINGLE_VALUE_PAD: f64 = 0.5;
/// Relative half-width for single values too large for `SINGLE_VALUE_PAD` to move.
const SINGLE_VALUE_PAD_RATIO: f64 = 1e-9;

/// `[min, max]` split into `buckets` parts.
///
/// `max - min` overflows for finite values of opposite sign near `f64::MAX`;
/// in that case edges and positions are computed without forming the span.
struct Range {
    min: f64,
    max: f64,
    buckets: usize,
    span: f64,
}

impl Range {
    fn new(min: f64, max: f64, buckets: usize) -> Self {
        Self {
            min,
            max,
            buckets,
            span: max - min,
        }
    }

    fn edge(&self, index: usize) -> f64 {
        if index == 0 {
            return self.min;
        }
        if index >= self.buckets {
            return self.max;
        }
        if self.span.is_finite() {
            self.min + self.span / self.buckets as f64 * index as f64
        } else {
            let fraction = index as f64 / self.buckets as f64;
            self.min * (1.0 - fraction) + self.max * fraction
        }
    }

    /// Bucket position of `value`; `buckets` at `max`.
    fn position(&self, value: f64) -> f64 {
        if self.span.is_finite() {
            return (value - self.min) / (self.span / self.buckets as f64);
        }
        let scale = self.min.abs().max(self.max.abs());
        let scaled_min = self.min / scale;
        (value / scale - scaled_min) / (self.max / scale - scaled_min) * self.buckets as f64
    }
}
