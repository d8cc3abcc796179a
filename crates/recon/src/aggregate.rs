use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::model::{MonthlyAggregate, ReconciliationRecord, YearMonth};

/// Group records by (month, location) and sum gains.
///
/// Output is ordered by month, then location.
pub fn monthly_aggregates(records: &[ReconciliationRecord]) -> Vec<MonthlyAggregate> {
    let mut groups: BTreeMap<(YearMonth, String), (Decimal, usize)> = BTreeMap::new();

    for record in records {
        let key = (record.year_month(), record.location.clone());
        let entry = groups.entry(key).or_insert((Decimal::ZERO, 0));
        entry.0 += record.gain;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((year_month, location), (gain, record_count))| MonthlyAggregate {
            year_month,
            location,
            gain,
            record_count,
        })
        .collect()
}

/// Total gain per location across the whole history.
pub fn location_totals(records: &[ReconciliationRecord]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for record in records {
        *totals.entry(record.location.clone()).or_insert(Decimal::ZERO) += record.gain;
    }
    totals
}
