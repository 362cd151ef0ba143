use super::{Chart, ChartBody, Histogram, PieChart};
use std::fmt::Write;

const BAR_WIDTH: u64 = 40;

/// Renders a chart as plain text for terminal output.
pub fn render_text(chart: &Chart) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", chart.title);
    match &chart.body {
        ChartBody::Histogram(histogram) => {
            let (x_label, y_label) = chart.kind.axis_labels().unwrap_or(("value", "count"));
            let _ = writeln!(out, "{x_label} vs {y_label}");
            render_histogram(&mut out, histogram);
        }
        ChartBody::Pie(pie) => render_pie(&mut out, pie),
    }
    out
}

fn render_histogram(out: &mut String, histogram: &Histogram) {
    let max = histogram.max_count().max(1);
    for bucket in &histogram.buckets {
        let filled = (bucket.count * BAR_WIDTH).div_ceil(max) as usize;
        let _ = writeln!(
            out,
            "{:>9.2} - {:<9.2} | {:<width$} {}",
            bucket.lower,
            bucket.upper,
            "#".repeat(filled),
            bucket.count,
            width = BAR_WIDTH as usize
        );
    }
}

fn render_pie(out: &mut String, pie: &PieChart) {
    let label_width = pie
        .wedges
        .iter()
        .map(|wedge| wedge.label.chars().count())
        .max()
        .unwrap_or(0);
    for wedge in &pie.wedges {
        let filled = (wedge.fraction * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{:<label_width$} | {:<width$} {:>6} ({})",
            wedge.label,
            "*".repeat(filled),
            wedge.percent_label,
            wedge.count,
            width = BAR_WIDTH as usize
        );
    }
}
