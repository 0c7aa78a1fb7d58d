//! Group-by aggregations.
//!
//! Groups are emitted in the order their key first appears in the table.
//! Rankings sort with a stable sort, so keys with equal totals keep that
//! first-seen order in both the descending and the ascending view.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::domain::{SalesRecord, SalesTable};
use crate::error::AppError;

/// One key of a grouped metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: f64,
}

/// A per-key metric with highest/lowest selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    /// Entries in first-seen key order.
    pub entries: Vec<RankedEntry>,
}

impl Ranking {
    /// Entries sorted by value, largest first; ties keep first-seen order.
    pub fn descending(&self) -> Vec<RankedEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
        sorted
    }

    /// Entries sorted by value, smallest first; ties keep first-seen order.
    pub fn ascending(&self) -> Vec<RankedEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
        sorted
    }

    /// First entry of the descending view.
    pub fn highest(&self) -> Option<&RankedEntry> {
        self.entries.iter().fold(None, |best: Option<&RankedEntry>, e| match best {
            Some(b) if b.value >= e.value => Some(b),
            _ => Some(e),
        })
    }

    /// First entry of the ascending view.
    pub fn lowest(&self) -> Option<&RankedEntry> {
        self.entries.iter().fold(None, |best: Option<&RankedEntry>, e| match best {
            Some(b) if b.value <= e.value => Some(b),
            _ => Some(e),
        })
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.value)
    }
}

/// Mean Sales of one (State, Group) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateGroupMean {
    pub state: String,
    pub group: String,
    pub mean_sales: f64,
    pub rows: usize,
}

/// Per-Group totals, ranked independently per metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotals {
    pub sales: Ranking,
    pub units: Ranking,
}

/// State × Group matrix of summed Sales (heatmap input).
///
/// `cells[i][j]` is the total for `states[i]` and `groups[j]`; pairs with no
/// rows are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
    pub states: Vec<String>,
    pub groups: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

/// Insertion-ordered accumulator map.
struct OrderedGroups<K, A> {
    index: HashMap<K, usize>,
    entries: Vec<(K, A)>,
}

impl<K: Hash + Eq + Clone, A: Default> OrderedGroups<K, A> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: K) -> &mut A {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(key.clone(), idx);
                self.entries.push((key, A::default()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    fn into_entries(self) -> Vec<(K, A)> {
        self.entries
    }
}

fn sum_by<F, V>(table: &SalesTable, key: F, value: V) -> Ranking
where
    F: Fn(&SalesRecord) -> &str,
    V: Fn(&SalesRecord) -> f64,
{
    let mut groups: OrderedGroups<&str, f64> = OrderedGroups::new();
    for r in table.iter() {
        *groups.entry(key(r)) += value(r);
    }
    Ranking {
        entries: groups
            .into_entries()
            .into_iter()
            .map(|(k, v)| RankedEntry { key: k.to_string(), value: v })
            .collect(),
    }
}

/// Average Sales for each (State, Group) combination.
pub fn mean_sales_by_state_group(table: &SalesTable) -> Result<Vec<StateGroupMean>, AppError> {
    table.require_rows("mean Sales by State and Group")?;

    let mut groups: OrderedGroups<(&str, &str), (f64, usize)> = OrderedGroups::new();
    for r in table.iter() {
        let acc = groups.entry((r.state.as_str(), r.group.as_str()));
        acc.0 += r.sales;
        acc.1 += 1;
    }

    Ok(groups
        .into_entries()
        .into_iter()
        .map(|((state, group), (sum, n))| StateGroupMean {
            state: state.to_string(),
            group: group.to_string(),
            mean_sales: sum / n as f64,
            rows: n,
        })
        .collect())
}

/// Total Sales per State.
pub fn state_revenue(table: &SalesTable) -> Result<Ranking, AppError> {
    table.require_rows("State revenue")?;
    Ok(sum_by(table, |r| r.state.as_str(), |r| r.sales))
}

/// Total Sales and total Units per Group.
pub fn group_totals(table: &SalesTable) -> Result<GroupTotals, AppError> {
    table.require_rows("Group totals")?;
    Ok(GroupTotals {
        sales: sum_by(table, |r| r.group.as_str(), |r| r.sales),
        units: sum_by(table, |r| r.group.as_str(), |r| r.unit as f64),
    })
}

/// Total Sales per time-of-day bucket.
pub fn time_of_day_sales(table: &SalesTable) -> Result<Ranking, AppError> {
    table.require_rows("time-of-day Sales")?;
    Ok(sum_by(table, |r| r.time.as_str(), |r| r.sales))
}

/// Summed Sales for every State × Group pair.
pub fn state_group_pivot(table: &SalesTable) -> Result<Pivot, AppError> {
    table.require_rows("State × Group pivot")?;

    let states = sum_by(table, |r| r.state.as_str(), |_| 0.0);
    let groups = sum_by(table, |r| r.group.as_str(), |_| 0.0);
    let state_idx: HashMap<&str, usize> = states.entries.iter().enumerate().map(|(i, e)| (e.key.as_str(), i)).collect();
    let group_idx: HashMap<&str, usize> = groups.entries.iter().enumerate().map(|(i, e)| (e.key.as_str(), i)).collect();

    let mut cells = vec![vec![None; groups.entries.len()]; states.entries.len()];
    for r in table.iter() {
        let (Some(&i), Some(&j)) = (state_idx.get(r.state.as_str()), group_idx.get(r.group.as_str())) else {
            continue;
        };
        let cell: &mut Option<f64> = &mut cells[i][j];
        *cell = Some(cell.unwrap_or(0.0) + r.sales);
    }

    Ok(Pivot {
        states: states.entries.into_iter().map(|e| e.key).collect(),
        groups: groups.entries.into_iter().map(|e| e.key).collect(),
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn rec(state: &str, group: &str, time: &str, sales: f64, unit: u64) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2020, 10, 1).unwrap(),
            state: state.to_string(),
            group: group.to_string(),
            time: time.to_string(),
            sales,
            unit,
            sales_normalized: None,
        }
    }

    fn sample() -> SalesTable {
        SalesTable::new(vec![
            rec("WA", "Kids", "Morning", 10.0, 1),
            rec("NSW", "Men", "Evening", 40.0, 4),
            rec("WA", "Men", "Morning", 30.0, 3),
            rec("VIC", "Kids", "Afternoon", 20.0, 9),
            rec("NSW", "Men", "Morning", 20.0, 2),
        ])
    }

    #[test]
    fn state_group_means_in_first_seen_order() {
        let means = mean_sales_by_state_group(&sample()).unwrap();
        let keys: Vec<(&str, &str, f64)> = means
            .iter()
            .map(|m| (m.state.as_str(), m.group.as_str(), m.mean_sales))
            .collect();
        assert_eq!(
            keys,
            vec![("WA", "Kids", 10.0), ("NSW", "Men", 30.0), ("WA", "Men", 30.0), ("VIC", "Kids", 20.0)]
        );
    }

    #[test]
    fn state_revenue_orderings() {
        let ranking = state_revenue(&sample()).unwrap();
        let desc: Vec<String> = ranking.descending().into_iter().map(|e| e.key).collect();
        assert_eq!(desc, vec!["NSW", "WA", "VIC"]);
        assert_eq!(ranking.ascending()[0].key, "VIC");
        assert_eq!(ranking.highest().unwrap().key, "NSW");
        assert_eq!(ranking.lowest().unwrap().key, "VIC");
    }

    #[test]
    fn equal_totals_keep_first_seen_order() {
        let table = SalesTable::new(vec![
            rec("TAS", "Kids", "Morning", 50.0, 1),
            rec("SA", "Kids", "Morning", 50.0, 1),
            rec("QLD", "Kids", "Morning", 10.0, 1),
            rec("NT", "Kids", "Morning", 50.0, 1),
        ]);
        let ranking = state_revenue(&table).unwrap();

        let desc: Vec<String> = ranking.descending().into_iter().map(|e| e.key).collect();
        assert_eq!(desc, vec!["TAS", "SA", "NT", "QLD"]);
        let asc: Vec<String> = ranking.ascending().into_iter().map(|e| e.key).collect();
        assert_eq!(asc, vec!["QLD", "TAS", "SA", "NT"]);

        assert_eq!(ranking.highest().unwrap().key, "TAS");
        assert_eq!(ranking.lowest().unwrap().key, "QLD");
    }

    #[test]
    fn group_totals_rank_sales_and_units_independently() {
        let totals = group_totals(&sample()).unwrap();
        assert_eq!(totals.sales.get("Men"), Some(90.0));
        assert_eq!(totals.sales.get("Kids"), Some(30.0));
        assert_eq!(totals.units.get("Kids"), Some(10.0));
        assert_eq!(totals.units.get("Men"), Some(9.0));
        assert_eq!(totals.sales.highest().unwrap().key, "Men");
        assert_eq!(totals.units.highest().unwrap().key, "Kids");
    }

    #[test]
    fn state_sums_partition_the_grand_total() {
        let table = sample();
        let ranking = state_revenue(&table).unwrap();
        assert!((ranking.total() - table.total_sales()).abs() < 1e-9);
    }

    #[test]
    fn pivot_fills_missing_pairs_with_none() {
        let pivot = state_group_pivot(&sample()).unwrap();
        assert_eq!(pivot.states, vec!["WA", "NSW", "VIC"]);
        assert_eq!(pivot.groups, vec!["Kids", "Men"]);
        assert_eq!(pivot.cells[0], vec![Some(10.0), Some(30.0)]);
        assert_eq!(pivot.cells[1], vec![None, Some(60.0)]);
        assert_eq!(pivot.cells[2], vec![Some(20.0), None]);
    }

    #[test]
    fn time_of_day_totals() {
        let ranking = time_of_day_sales(&sample()).unwrap();
        assert_eq!(ranking.get("Morning"), Some(60.0));
        assert_eq!(ranking.highest().unwrap().key, "Morning");
        assert_eq!(ranking.lowest().unwrap().key, "Afternoon");
    }

    #[test]
    fn every_aggregation_rejects_empty_tables() {
        let empty = SalesTable::default();
        assert_eq!(mean_sales_by_state_group(&empty).unwrap_err().kind(), ErrorKind::EmptyTable);
        assert_eq!(state_revenue(&empty).unwrap_err().kind(), ErrorKind::EmptyTable);
        assert_eq!(group_totals(&empty).unwrap_err().kind(), ErrorKind::EmptyTable);
        assert_eq!(time_of_day_sales(&empty).unwrap_err().kind(), ErrorKind::EmptyTable);
        assert_eq!(state_group_pivot(&empty).unwrap_err().kind(), ErrorKind::EmptyTable);
    }
}
