use std::fmt::Write;

use fx_arb_core::evaluator::ArbitrageReport;
use fx_arb_core::pipeline::DistanceTable;
use fx_arb_core::{Analysis, Report};

/// Plain-text rendering of a finished analysis, as printed on stdout.
pub fn render_analysis(analysis: &Analysis) -> String {
    match &analysis.outcome {
        Ok(report) => render_report(report),
        Err(e) => format!("Analysis aborted: {}\n", e),
    }
}

pub fn render_report(report: &Report) -> String {
    match report {
        Report::NoArbitrage(table) => render_distances(table),
        Report::Arbitrage(arb) => render_arbitrage(arb),
    }
}

fn render_distances(table: &DistanceTable) -> String {
    let mut out = String::from("Vertex Distance from Source\n");
    for row in &table.rows {
        let _ = writeln!(out, "{}\t\t{}", row.symbol, row.distance);
    }
    out
}

fn render_arbitrage(report: &ArbitrageReport) -> String {
    let mut out = String::new();
    let start = report.start_symbol().unwrap_or_default();

    let _ = writeln!(
        out,
        "Negative weight cycle found: {}",
        report.path_symbols().join(" -> ")
    );
    let _ = writeln!(out, "Weight of the cycle: {}", report.total_log_weight);
    let _ = writeln!(out, "Exchange rates and value progression for the negative cycle:");

    for step in &report.steps {
        let _ = writeln!(
            out,
            "{} -> {}: 1 {} = {:.6} {} | Value now: {:.6} {}",
            step.from, step.to, step.from, step.rate, step.to, step.running_value, step.to
        );
    }

    let _ = writeln!(
        out,
        "\nStarting with 1 {}, after completing the cycle, we end up with: {:.6} {}",
        start, report.value_multiplier, start
    );
    out
}
