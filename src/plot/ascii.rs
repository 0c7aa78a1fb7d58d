//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - resampled buckets: `o`, joined by a `-` line
//! - rankings: horizontal `#` bars
//! - pivot cells: shade characters from `SHADES`

use crate::analysis::{Pivot, Ranking, Resampled};

/// Low-to-high intensity ramp used by the heatmap.
const SHADES: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const HEAT_CELL: usize = 6;

/// Line chart of bucket sales over time.
pub fn render_line_chart(series: &Resampled, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let values: Vec<f64> = series.buckets.iter().map(|b| b.sales).collect();
    let (y_min, y_max) = y_range(&values).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let last = values.len().saturating_sub(1);

    let cells: Vec<(usize, usize)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (map_x(i, last, width), map_y(v, y_min, y_max, height)))
        .collect();

    // Line first so bucket markers overlay it.
    for pair in cells.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        draw_line(&mut grid, x0, y0, x1, y1, '-');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    let span = match (series.buckets.first(), series.buckets.last()) {
        (Some(first), Some(last)) => format!("{}..{}", first.end, last.end),
        _ => "no buckets".to_string(),
    };
    out.push_str(&format!(
        "Plot: {} sales | {span} ({} buckets) | y=[{y_min:.2}, {y_max:.2}]\n",
        series.frequency.label(),
        series.buckets.len()
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

/// Horizontal bar chart of a ranking, highest first.
pub fn render_bar_chart(title: &str, ranking: &Ranking, width: usize) -> String {
    let bar_width = width.max(10);
    let entries = ranking.descending();
    let max = entries.iter().map(|e| e.value).fold(0.0_f64, f64::max);
    let label_width = entries
        .iter()
        .map(|e| e.key.chars().count())
        .max()
        .unwrap_or(0)
        .min(12);

    let mut out = format!("{title}:\n");
    for e in &entries {
        let len = if max > 0.0 {
            ((e.value / max) * bar_width as f64).round() as usize
        } else {
            0
        };
        let label: String = e.key.chars().take(label_width).collect();
        out.push_str(&format!(
            "{label:<label_width$} |{:<bar_width$} {:.2}\n",
            "#".repeat(len.min(bar_width)),
            e.value
        ));
    }
    out
}

/// State x Group grid shaded by summed Sales relative to the largest cell.
pub fn render_heatmap(pivot: &Pivot) -> String {
    let max = pivot
        .cells
        .iter()
        .flatten()
        .flatten()
        .fold(0.0_f64, |acc, &v| acc.max(v));
    let label_width = pivot
        .states
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(5, 8);

    let mut out = String::from("Heatmap: Sales by State x Group\n");

    let mut header = " ".repeat(label_width + 1);
    for g in &pivot.groups {
        let name: String = g.chars().take(HEAT_CELL).collect();
        header.push_str(&format!("{name:^HEAT_CELL$}"));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (state, row) in pivot.states.iter().zip(&pivot.cells) {
        let name: String = state.chars().take(label_width).collect();
        let mut line = format!("{name:<label_width$} ");
        for cell in row {
            match cell {
                Some(v) => line.push_str(&shade(*v, max).to_string().repeat(HEAT_CELL)),
                None => line.push_str(&format!("{:^HEAT_CELL$}", "--")),
            }
        }
        out.push_str(&line);
        out.push('\n');
    }

    let ramp: String = SHADES.iter().collect();
    out.push_str(&format!("scale: '{ramp}' low -> high | max={max:.2}\n"));
    out
}

/// Sales distribution as horizontal bars, one row per equal-width bin.
pub fn render_histogram(values: &[f64], bins: usize, width: usize) -> String {
    let bar_width = width.max(10);
    let mut out = String::from("Histogram of Sales:\n");

    let Some((min, max)) = value_bounds(values) else {
        out.push_str("(no values)\n");
        return out;
    };

    // A constant column collapses into one bin.
    let bins = if max > min { bins.max(1) } else { 1 };
    let step = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = if step > 0.0 {
            (((v - min) / step) as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    let peak = counts.iter().copied().max().unwrap_or(0);
    for (i, &count) in counts.iter().enumerate() {
        let lo = min + step * i as f64;
        let hi = if i + 1 == bins { max } else { min + step * (i + 1) as f64 };
        let close = if i + 1 == bins { ']' } else { ')' };
        let len = if peak > 0 {
            ((count as f64 / peak as f64) * bar_width as f64).round() as usize
        } else {
            0
        };
        let line = format!("[{lo:>12.2}, {hi:>12.2}{close} {count:>6} |{}", "#".repeat(len));
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn shade(value: f64, max: f64) -> char {
    if max <= 0.0 {
        return SHADES[0];
    }
    let u = (value / max).clamp(0.0, 1.0);
    SHADES[(u * (SHADES.len() - 1) as f64).round() as usize]
}

fn value_bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

fn y_range(values: &[f64]) -> Option<(f64, f64)> {
    let (min, max) = value_bounds(values)?;
    if max > min {
        Some((min, max))
    } else {
        Some((min - 1.0, max + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, last: usize, width: usize) -> usize {
    if last == 0 {
        return 0;
    }
    let u = i as f64 / last as f64;
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Bucket, RankedEntry};
    use crate::domain::Frequency;
    use chrono::NaiveDate;

    fn bucket(day: u32, sales: f64) -> Bucket {
        let d = NaiveDate::from_ymd_opt(2020, 10, day).unwrap();
        Bucket {
            start: d,
            end: d,
            sales,
            units: 1,
            records: 1,
        }
    }

    #[test]
    fn line_chart_golden_snapshot_small() {
        let series = Resampled {
            frequency: Frequency::Daily,
            buckets: vec![bucket(1, 100.0), bucket(2, 110.0)],
        };
        let txt = render_line_chart(&series, 10, 5);
        let expected = concat!(
            "Plot: daily sales | 2020-10-01..2020-10-02 (2 buckets) | y=[99.50, 110.50]\n",
            "        -o\n",
            "      --\n",
            "    --\n",
            "  --\n",
            "o-\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn bar_chart_scales_to_the_leader() {
        let ranking = Ranking {
            entries: vec![
                RankedEntry { key: "WA".to_string(), value: 50.0 },
                RankedEntry { key: "VIC".to_string(), value: 100.0 },
            ],
        };
        let txt = render_bar_chart("Sales by State", &ranking, 10);
        let expected = concat!(
            "Sales by State:\n",
            "VIC |########## 100.00\n",
            "WA  |#####      50.00\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn heatmap_shades_relative_to_max_and_marks_gaps() {
        let pivot = Pivot {
            states: vec!["WA".to_string(), "VIC".to_string()],
            groups: vec!["Kids".to_string(), "Men".to_string()],
            cells: vec![vec![Some(90.0), None], vec![Some(0.0), Some(45.0)]],
        };
        let txt = render_heatmap(&pivot);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[1], "       Kids  Men");
        assert_eq!(lines[2], "WA    @@@@@@  --  ");
        assert_eq!(lines[3], "VIC         ++++++");
        assert!(lines[4].ends_with("max=90.00"));
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0];
        let txt = render_histogram(&values, 5, 10);
        let total: usize = txt
            .lines()
            .skip(1)
            .map(|l| l.split(['|']).next().unwrap().split_whitespace().last().unwrap().parse::<usize>().unwrap())
            .sum();
        assert_eq!(total, values.len());
        assert!(txt.lines().last().unwrap().contains("10.00]"));
    }

    #[test]
    fn constant_values_fall_into_one_bin() {
        let txt = render_histogram(&[5.0, 5.0, 5.0], 10, 10);
        assert_eq!(txt.lines().count(), 2);
        assert!(txt.contains("     3 |##########"), "{txt}");
    }
}
