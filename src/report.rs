use prettytable::{Cell, Row, Table};

use crate::model::RunSummary;
use crate::stats::{statistics_from_ints, Statistics};

pub fn build_table_title(first: &str, extra: Option<&str>) -> Table {
    let mut table = Table::new();
    let mut titles = vec![
        Cell::new(first),
        Cell::new("Min"),
        Cell::new("Avg"),
        Cell::new("P10"),
        Cell::new("P50"),
        Cell::new("P90"),
        Cell::new("P99"),
        Cell::new("Max"),
        Cell::new("Cnt"),
    ];
    if let Some(extra) = extra {
        titles.push(Cell::new(extra));
    }
    table.set_titles(Row::new(titles));
    table
}

/// Describes freshly computed metric columns, one row each.
pub fn metric_table(columns: &[(&str, Vec<i64>)]) -> Table {
    let mut table = build_table_title("metric", None);
    for (name, values) in columns {
        table.add_row(row_from_stats(name.to_string(), statistics_from_ints(values), None));
    }
    table
}

pub fn summary_table(summaries: &[RunSummary]) -> Table {
    let with_tps = summaries.iter().any(|s| s.throughput.is_some());
    let mut table = build_table_title("run", with_tps.then_some("blocks/s"));
    for s in summaries {
        let stats = Statistics {
            min: s.min,
            avg: s.avg,
            p10: s.p10,
            p50: s.median,
            p90: s.p90,
            p99: s.p99,
            max: s.max,
            cnt: s.count,
        };
        let extra = match (with_tps, s.throughput) {
            (true, Some(tps)) => Some(format!("{:.2}", tps)),
            (true, None) => Some("nan".to_string()),
            (false, _) => None,
        };
        table.add_row(row_from_stats(s.label.clone(), stats, extra));
    }
    table
}

pub fn throughput_table(throughputs: &[(String, f64)]) -> Table {
    let mut table = Table::new();
    table.set_titles(Row::new(vec![Cell::new("run"), Cell::new("blocks/s")]));
    for (label, tps) in throughputs {
        table.add_row(Row::new(vec![
            Cell::new(label),
            Cell::new(&format!("{:.2}", tps)),
        ]));
    }
    table
}

fn row_from_stats(name: String, s: Statistics, extra: Option<String>) -> Row {
    let f = |v: f64| -> String {
        if v.is_nan() {
            return "nan".to_string();
        }
        if (v - v.round()).abs() < 1e-9 {
            format!("{}", v as i64)
        } else {
            format!("{:.2}", v)
        }
    };

    let mut cells = vec![
        Cell::new(&name),
        Cell::new(&f(s.min)),
        Cell::new(&f(s.avg)),
        Cell::new(&f(s.p10)),
        Cell::new(&f(s.p50)),
        Cell::new(&f(s.p90)),
        Cell::new(&f(s.p99)),
        Cell::new(&f(s.max)),
        Cell::new(&format!("{}", s.cnt)),
    ];
    if let Some(extra) = extra {
        cells.push(Cell::new(&extra));
    }
    Row::new(cells)
}
