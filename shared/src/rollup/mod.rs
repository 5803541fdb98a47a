//! Granularity-aware bucketing and metric reduction.
//!
//! Every chart in the dashboard is produced the same way: partition the
//! resolved reporting window into buckets of the requested granularity,
//! assign each stored row to the bucket containing its `record_date`, and
//! fold each configured metric column with its reduction rule. The
//! bucketing lives here, in one place, so week and month boundary handling
//! cannot drift between metric families.
//!
//! Buckets are ephemeral: computed on read, never persisted.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use shared::models::KpiRecord;
//! use shared::period::Granularity;
//! use shared::rollup::{rollup, ColumnSpec, Reduction};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
//! let rows = vec![KpiRecord::new(start, 100, 2.0, 40, 500.0)];
//!
//! let columns = [ColumnSpec::new("ai_interactions", Reduction::Sum, |r: &KpiRecord| {
//!     Some(r.ai_interactions as f64)
//! })];
//! let buckets = rollup(&rows, start, end, Granularity::Daily, &columns);
//!
//! assert_eq!(buckets.len(), 7);
//! assert_eq!(buckets[0].value(0), 40.0);
//! assert_eq!(buckets[1].value(0), 0.0);
//! ```

use crate::models::Dated;
use crate::period::Granularity;
use chrono::{Datelike, Days, NaiveDate};

/// The fold operation applied to a metric column within a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Sum of values; an empty bucket reduces to zero.
    Sum,
    /// Arithmetic mean; an empty bucket reduces to zero.
    Avg,
    /// Value of the latest row in the bucket; an empty bucket carries the
    /// value forward from the nearest prior non-empty bucket.
    Last,
}

/// One contiguous sub-range of a reporting window, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRange {
    /// First day of the bucket.
    pub start: NaiveDate,
    /// Last day of the bucket.
    pub end: NaiveDate,
}

impl BucketRange {
    /// Number of calendar days covered by the bucket.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether the given date falls inside the bucket.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// A metric column to reduce: response field name, reduction rule, and the
/// extractor pulling the value out of a record.
///
/// The extractor returns `None` for a malformed (null/non-numeric) source
/// value; such rows reduce as zero rather than aborting the response.
pub struct ColumnSpec<R> {
    /// Field name the reduced value is emitted under.
    pub name: &'static str,
    /// Reduction rule for the column.
    pub reduction: Reduction,
    /// Extracts the column value from a record.
    pub value: fn(&R) -> Option<f64>,
}

impl<R> ColumnSpec<R> {
    /// Creates a new column spec.
    #[must_use]
    pub const fn new(
        name: &'static str,
        reduction: Reduction,
        value: fn(&R) -> Option<f64>,
    ) -> Self {
        Self {
            name,
            reduction,
            value,
        }
    }
}

/// One reduced bucket: a date range plus one value per configured column.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// First day of the bucket.
    pub start: NaiveDate,
    /// Last day of the bucket.
    pub end: NaiveDate,
    /// Reduced values, aligned with the column specs passed to [`rollup`].
    pub values: Vec<f64>,
}

impl Bucket {
    /// The x-axis label for the bucket: its start date in ISO form.
    #[must_use]
    pub fn label(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// The reduced value of the column at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the configured columns.
    #[must_use]
    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }
}

/// Partitions `[start, end]` into contiguous, non-overlapping bucket
/// ranges of the given granularity, earliest first.
///
/// Weekly buckets align to calendar weeks (Monday start) and monthly
/// buckets to calendar months; boundary buckets are clamped to the window,
/// so the ranges always tile the window exactly. Returns an empty vector
/// when `start > end`.
#[must_use]
pub fn bucket_ranges(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<BucketRange> {
    let mut ranges = Vec::new();
    let mut cursor = start;

    while cursor <= end {
        let aligned_end = match granularity {
            Granularity::Daily => cursor,
            Granularity::Weekly => week_end(cursor),
            Granularity::Monthly => month_end(cursor),
        };
        let bucket_end = aligned_end.min(end);
        ranges.push(BucketRange {
            start: cursor,
            end: bucket_end,
        });

        match bucket_end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    ranges
}

/// Last day (Sunday) of the calendar week containing `date`.
fn week_end(date: NaiveDate) -> NaiveDate {
    let into_week = u64::from(date.weekday().num_days_from_monday());
    date.checked_add_days(Days::new(6 - into_week)).unwrap_or(date)
}

/// Last day of the calendar month containing `date`.
fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Per-bucket, per-column accumulator state.
#[derive(Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
    last: Option<(NaiveDate, f64)>,
}

impl Accumulator {
    const EMPTY: Self = Self {
        sum: 0.0,
        count: 0,
        last: None,
    };

    fn push(&mut self, date: NaiveDate, value: f64) {
        self.sum += value;
        self.count += 1;
        // Latest record date wins; on a date tie the later row wins.
        if self.last.is_none_or(|(seen, _)| date >= seen) {
            self.last = Some((date, value));
        }
    }
}

/// Rolls `rows` up into one [`Bucket`] per granularity sub-range of
/// `[start, end]`, reducing each column per its rule.
///
/// Rows dated outside the window are ignored. Once any row lands in the
/// window, buckets with no rows still appear in the output (zero for
/// `Sum`/`Avg`, carried forward for `Last`); a gap would render as a
/// broken line on a chart. A window with no rows at all yields an empty
/// sequence instead, which callers surface as a "no data" state. Rows are
/// not deduplicated: two rows with the same date both contribute to `Sum`.
#[must_use]
pub fn rollup<R: Dated>(
    rows: &[R],
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
    columns: &[ColumnSpec<R>],
) -> Vec<Bucket> {
    let ranges = bucket_ranges(start, end, granularity);
    let mut accumulators = vec![vec![Accumulator::EMPTY; columns.len()]; ranges.len()];
    let mut assigned = 0_usize;

    for row in rows {
        let date = row.record_date();
        if date < start || date > end {
            continue;
        }
        // Ranges tile the window, so the first range ending on or after
        // the date is the one containing it.
        let index = ranges.partition_point(|r| r.end < date);
        for (acc, column) in accumulators[index].iter_mut().zip(columns) {
            let value = (column.value)(row).unwrap_or(0.0);
            acc.push(date, value);
        }
        assigned += 1;
    }

    if assigned == 0 {
        return Vec::new();
    }

    let mut carried = vec![0.0_f64; columns.len()];
    ranges
        .iter()
        .zip(accumulators)
        .map(|(range, accs)| {
            let values = accs
                .iter()
                .zip(columns)
                .enumerate()
                .map(|(col, (acc, column))| {
                    let reduced = reduce_accumulator(acc, column.reduction, carried[col]);
                    carried[col] = reduced;
                    reduced
                })
                .collect();
            Bucket {
                start: range.start,
                end: range.end,
                values,
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn reduce_accumulator(acc: &Accumulator, reduction: Reduction, carried: f64) -> f64 {
    match reduction {
        Reduction::Sum => acc.sum,
        Reduction::Avg => {
            if acc.count == 0 {
                0.0
            } else {
                acc.sum / acc.count as f64
            }
        }
        Reduction::Last => acc.last.map_or(carried, |(_, value)| value),
    }
}

/// Reduces a single metric column across a whole window, without
/// bucketing. Used for KPI totals and period-over-period deltas.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reduce_window<R: Dated>(
    rows: &[R],
    start: NaiveDate,
    end: NaiveDate,
    reduction: Reduction,
    value: fn(&R) -> Option<f64>,
) -> f64 {
    let mut acc = Accumulator::EMPTY;
    for row in rows {
        let date = row.record_date();
        if date < start || date > end {
            continue;
        }
        acc.push(date, value(row).unwrap_or(0.0));
    }
    reduce_accumulator(&acc, reduction, 0.0)
}

/// Period-over-period percentage change.
///
/// `((current - previous) / previous) * 100` when `previous > 0`, else
/// `0.0`. The result is always finite.
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        let change = ((current - previous) / previous) * 100.0;
        if change.is_finite() {
            change
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// A percentage ratio that is safe against a zero or missing denominator.
///
/// `(numerator / denominator) * 100` when `denominator > 0`, else `0.0`.
/// Never emits `NaN` or infinity.
#[must_use]
pub fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let ratio = (numerator / denominator) * 100.0;
        if ratio.is_finite() {
            ratio
        } else {
            0.0
        }
    } else {
        0.0
    }
}
