use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::{
    models::{ReportData, Transaction},
    observable::{Observable, Subscription},
};

/// Inclusive timestamp range for a report, built from calendar dates. The
/// end date covers its whole day, so a same-day range spans one full day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: day_start(start),
            end: day_end(end),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn day_end(date: NaiveDate) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(last_second))
}

/// Pure aggregation over a transaction list. An empty match yields a
/// zero-valued report, never an error.
pub fn aggregate(transactions: &[Transaction], range: &ReportRange) -> ReportData {
    let filtered: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| range.contains(t.timestamp))
        .collect();

    if filtered.is_empty() {
        return ReportData::default();
    }

    let total_revenue: Decimal = filtered.iter().map(|t| t.total_amount).sum();
    let transaction_count = filtered.len();

    // Group line items by product name, keeping first-appearance order so
    // the stable sort below preserves it among equal counts.
    let mut sales: Vec<(String, i64)> = Vec::new();
    for item in filtered.iter().flat_map(|t| &t.items) {
        match sales.iter_mut().find(|(name, _)| *name == item.product_name) {
            Some((_, sold)) => *sold += i64::from(item.quantity),
            None => sales.push((item.product_name.clone(), i64::from(item.quantity))),
        }
    }
    sales.sort_by(|a, b| b.1.cmp(&a.1));
    sales.truncate(5);

    ReportData {
        total_revenue,
        transaction_count,
        best_selling_products: sales,
    }
}

/// Holds the latest generated report and the transient in-progress flag the
/// UI layer observes.
#[derive(Debug, Clone, Default)]
pub struct ReportService {
    report: Observable<Option<ReportData>>,
    generating: Observable<bool>,
}

impl ReportService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> Option<ReportData> {
        self.report.get()
    }

    pub fn watch_report(&self) -> Subscription<Option<ReportData>> {
        self.report.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.get()
    }

    pub fn watch_generating(&self) -> Subscription<bool> {
        self.generating.subscribe()
    }

    /// Recompute and publish the report for `range`. The in-progress flag is
    /// raised for the duration of the call and always lowered again.
    pub fn generate(&self, transactions: &[Transaction], range: &ReportRange) -> ReportData {
        self.generating.set(true);
        // Drop the stale result while recomputing.
        self.report.set(None);

        let data = aggregate(transactions, range);
        self.report.set(Some(data.clone()));
        self.generating.set(false);
        data
    }
}
