//! Reporting utilities: data-driven recommendations.
//!
//! Formatting lives in `format`; this module only decides *what* to say.

pub mod format;

use crate::analysis::Pivot;
use crate::app::pipeline::RunOutput;

/// One recommendation section of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub heading: String,
    pub lines: Vec<String>,
}

/// Build recommendations from the computed rankings.
///
/// Every line names the concrete state/group/time it refers to, so the text
/// follows the data instead of a fixed script.
pub fn build_recommendations(run: &RunOutput) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    let states = &run.state_revenue;
    if let (Some(hi), Some(lo)) = (states.highest(), states.lowest()) {
        let mut lines = Vec::new();
        let focus = best_group_in_state(&run.pivot, &hi.key)
            .map(|g| format!(", especially the {g} group"))
            .unwrap_or_default();
        lines.push(format!(
            "{} leads revenue with {:.2} ({:.1}% of total): keep the current strategy and expand presence{focus}.",
            hi.key,
            hi.value,
            share(hi.value, states.total())
        ));
        if hi.key != lo.key {
            lines.push(format!(
                "{} trails with {:.2} ({:.1}% of total): target it with marketing campaigns, promotions and local deals.",
                lo.key,
                lo.value,
                share(lo.value, states.total())
            ));
        }
        recs.push(Recommendation {
            heading: "States with the highest and lowest revenue".to_string(),
            lines,
        });
    }

    let groups = &run.group_totals.sales;
    if let (Some(hi), Some(lo)) = (groups.highest(), groups.lowest()) {
        let mut lines = vec![format!(
            "{} has the highest sales ({:.2}): increase focus with personalized offerings and exclusive launches.",
            hi.key, hi.value
        )];
        if hi.key != lo.key {
            lines.push(format!(
                "{} has the lowest sales ({:.2}): support it with tailored products, discounts and targeted advertising.",
                lo.key, lo.value
            ));
        }
        if let Some(unit_leader) = run.group_totals.units.highest().filter(|u| u.key != hi.key) {
            lines.push(format!(
                "{} moves the most units ({:.0}) despite lower revenue: review its pricing.",
                unit_leader.key, unit_leader.value
            ));
        }
        recs.push(Recommendation {
            heading: "Group analysis".to_string(),
            lines,
        });
    }

    let times = &run.time_of_day;
    if let (Some(peak), Some(quiet)) = (times.highest(), times.lowest()) {
        let mut lines = vec![format!(
            "Peak period is {} ({:.2}): run flash sales and real-time offers then.",
            peak.key, peak.value
        )];
        if peak.key != quiet.key {
            lines.push(format!(
                "Off-peak period is {} ({:.2}): use discounted offers to drive traffic.",
                quiet.key, quiet.value
            ));
        }
        recs.push(Recommendation {
            heading: "Time-of-day sales".to_string(),
            lines,
        });
    }

    let mut general = Vec::new();
    if let Some(lo) = states.lowest() {
        general.push(format!(
            "Expansion: research local preferences in {} and deploy targeted marketing there.",
            lo.key
        ));
    }
    if let Some(growth) = monthly_growth(run) {
        let direction = if growth >= 0.0 { "grew" } else { "fell" };
        general.push(format!(
            "Trend: monthly sales {direction} {:.1}% from the first to the last month; \
             broaden product lines or add seasonal collections to keep engagement up.",
            growth.abs()
        ));
    } else {
        general.push(
            "Diversification: broaden product lines or add seasonal collections to keep engagement up.".to_string(),
        );
    }
    recs.push(Recommendation {
        heading: "General".to_string(),
        lines: general,
    });

    recs
}

fn share(value: f64, total: f64) -> f64 {
    if total > 0.0 { value / total * 100.0 } else { 0.0 }
}

fn best_group_in_state(pivot: &Pivot, state: &str) -> Option<String> {
    let row = pivot.states.iter().position(|s| s == state)?;
    let mut best: Option<(usize, f64)> = None;
    for (col, cell) in pivot.cells.get(row)?.iter().enumerate() {
        let Some(v) = *cell else { continue };
        // Strict `>` keeps the first-seen group on ties.
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((col, v));
        }
    }
    best.and_then(|(col, _)| pivot.groups.get(col).cloned())
}

/// Percent change between the first and last monthly bucket.
fn monthly_growth(run: &RunOutput) -> Option<f64> {
    let series = run.series(crate::domain::Frequency::Monthly)?;
    if series.buckets.len() < 2 {
        return None;
    }
    let first = series.buckets.first()?.sales;
    let last = series.buckets.last()?.sales;
    if first <= 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_analysis_on;
    use crate::domain::{AnalysisConfig, DegeneratePolicy, WeekEnd};
    use crate::io::ingest::load_sales_reader;

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            csv_path: "<memory>".into(),
            week_end: WeekEnd::Sun,
            degenerate: DegeneratePolicy::Error,
            head_rows: 5,
            preview_buckets: 5,
            plot: false,
            plot_width: 60,
            plot_height: 12,
            export_dir: None,
        }
    }

    fn run(csv: &str) -> RunOutput {
        let raw = load_sales_reader(csv.as_bytes(), "<memory>").unwrap();
        run_analysis_on(raw, &config()).unwrap()
    }

    #[test]
    fn recommendations_name_the_leaders() {
        let out = run("Date,State,Group,Time,Sales,Unit\n\
             1-Oct-2020,VIC,Men,Evening,900,36\n\
             1-Oct-2020,VIC,Women,Morning,300,12\n\
             2-Oct-2020,WA,Kids,Morning,100,40\n\
             1-Nov-2020,WA,Men,Afternoon,200,8\n");
        let recs = build_recommendations(&out);
        assert_eq!(recs.len(), 4);

        let states = recs[0].lines.join("\n");
        assert!(states.starts_with("VIC leads revenue with 1200.00 (80.0% of total)"), "{states}");
        assert!(states.contains("especially the Men group"), "{states}");
        assert!(states.contains("WA trails with 300.00"), "{states}");

        let groups = recs[1].lines.join("\n");
        assert!(groups.contains("Men has the highest sales (1100.00)"), "{groups}");
        assert!(groups.contains("Kids has the lowest sales (100.00)"), "{groups}");

        let times = recs[2].lines.join("\n");
        assert!(times.contains("Peak period is Evening"), "{times}");
        assert!(times.contains("Off-peak period is Afternoon"), "{times}");

        let general = recs[3].lines.join("\n");
        assert!(general.contains("monthly sales fell"), "{general}");
    }

    #[test]
    fn single_state_gets_no_trailing_line() {
        let out = run("Date,State,Group,Time,Sales,Unit\n\
             1-Oct-2020,WA,Men,Morning,10,1\n\
             2-Oct-2020,WA,Men,Morning,20,1\n");
        let recs = build_recommendations(&out);
        assert_eq!(recs[0].lines.len(), 1);
        assert!(recs[3].lines[0].starts_with("Expansion: research local preferences in WA"));
        assert!(recs[3].lines[1].starts_with("Diversification"));
    }
}
