//! Console tables, speedup ratios, charts and the JSON artifact for a finished run.
mod style;

pub use style::{ChartStyle, Marker, SeriesStyle};

use fibbench_core::{throughput, AggregateResult, BenchConfig, Mode, DEFAULT_BASELINE};
use plotters::coord::ranged1d::{AsRangedCoord, Ranged, ValueFormatter};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

const PANEL_SIZE: (u32, u32) = (640, 440);
const MARKER_SIZE: i32 = 4;
const RULE_WIDTH: usize = 80;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to draw chart: {0}")]
    Chart(#[from] DrawingAreaErrorKind<std::io::Error>),
}

/// Presentation settings, fixed for the lifetime of a [`Reporter`].
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub baseline: String,
    pub style: ChartStyle,
    pub output_dir: PathBuf,
    pub results_file: String,
    pub latency_chart_file: String,
    pub throughput_chart_file: String,
    pub charts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE.to_string(),
            style: ChartStyle::default(),
            output_dir: PathBuf::from("."),
            results_file: "benchmark_results_all.json".to_string(),
            latency_chart_file: "benchmark_results_all.svg".to_string(),
            throughput_chart_file: "throughput_comparison.svg".to_string(),
            charts: true,
        }
    }
}

impl From<&BenchConfig> for ReportConfig {
    fn from(config: &BenchConfig) -> Self {
        Self {
            baseline: config.baseline.clone(),
            ..Self::default()
        }
    }
}

/// `baseline / service` mean latency for one input. `None` if the service's mean is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Speedup {
    pub service: String,
    pub baseline: String,
    pub input: u32,
    pub ratio: Option<f64>,
}

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio {
            Some(ratio) => write!(
                f,
                "n={}: {} is {ratio:.2}x faster than {}",
                self.input,
                self.service.to_uppercase(),
                self.baseline.to_uppercase()
            ),
            None => write!(f, "n={}: cannot compute speedup", self.input),
        }
    }
}

pub fn speedup(baseline_ms: f64, service_ms: f64) -> Option<f64> {
    if service_ms > 0. {
        Some(baseline_ms / service_ms)
    } else {
        None
    }
}

/// Files a report run managed to write.
#[derive(Debug, Default)]
pub struct Artifacts {
    pub results: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
}

pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Write every artifact and print the console report.
    ///
    /// Failing to write the JSON or a chart is logged and otherwise ignored; it never affects the
    /// console output.
    pub fn report(&self, results: &AggregateResult) -> Artifacts {
        let mut artifacts = Artifacts::default();

        match self.write_json(results) {
            Ok(path) => artifacts.results = Some(path),
            Err(err) => error!("Could not save results: {err}"),
        }

        if self.config.charts && results.len() > 1 {
            match self.write_charts(results) {
                Ok(paths) => artifacts.charts = paths,
                Err(err) => error!("Could not draw charts: {err}"),
            }
        }

        println!("{}", self.summary_table(results));

        if let Some(table) = self.speedup_table(results) {
            println!("{table}");
        }

        if let Some(path) = &artifacts.results {
            println!("\nResults saved to {}", path.display());
        }
        for path in &artifacts.charts {
            println!("Chart saved to {}", path.display());
        }

        artifacts
    }

    /// Mean concurrent latency, derived throughput and success rate per service and input.
    pub fn summary_table(&self, results: &AggregateResult) -> String {
        let mut out = String::new();
        out.push_str(&format!("\n{}\n", "=".repeat(RULE_WIDTH)));
        out.push_str("BENCHMARK SUMMARY\n");
        out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
        out.push_str(&format!(
            "\n{:<10} {:<4} {:<18} {:<22} {:<10}\n",
            "Service", "n", "Latency (ms)", "Throughput (req/s)", "Success"
        ));
        out.push_str(&format!("{}\n", "-".repeat(70)));

        for (service, service_result) in results.services() {
            for (input, res) in service_result.iter() {
                let stats = res.stats(Mode::Concurrent);
                out.push_str(&format!(
                    "{:<10} {:<4} {:<18.3} {:<22.0} {:<10}\n",
                    service,
                    input,
                    stats.mean,
                    throughput(stats.mean),
                    format!("{:.1}%", stats.success_rate * 100.)
                ));
            }
        }

        out
    }

    /// Speedup of every non-baseline service against the baseline, for each shared input.
    ///
    /// Empty when the baseline has no results.
    pub fn speedups(&self, results: &AggregateResult) -> Vec<Speedup> {
        let baseline = self.config.baseline.as_str();
        let Some(baseline_result) = results.get(baseline) else {
            return vec![];
        };

        results
            .services()
            .filter(|(service, _)| *service != baseline)
            .flat_map(|(service, service_result)| {
                service_result.iter().filter_map(move |(input, res)| {
                    let base = baseline_result.get(input)?;
                    Some(Speedup {
                        service: service.to_string(),
                        baseline: baseline.to_string(),
                        input,
                        ratio: speedup(base.concurrent.mean, res.concurrent.mean),
                    })
                })
            })
            .collect()
    }

    pub fn speedup_table(&self, results: &AggregateResult) -> Option<String> {
        if results.len() < 2 {
            return None;
        }

        let speedups = self.speedups(results);
        if speedups.is_empty() {
            warn!(
                "No speedups to report against baseline {}.",
                self.config.baseline
            );
            return None;
        }

        let baseline = self.config.baseline.to_uppercase();
        let mut out = String::new();
        out.push_str(&format!("\n{}\n", "=".repeat(RULE_WIDTH)));
        out.push_str(&format!("PERFORMANCE RELATIVE TO {baseline}\n"));
        out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));

        let mut current: Option<&str> = None;
        for speedup in &speedups {
            if current != Some(speedup.service.as_str()) {
                current = Some(speedup.service.as_str());
                out.push_str(&format!(
                    "\n--- {} vs {baseline} ---\n",
                    speedup.service.to_uppercase()
                ));
            }
            out.push_str(&format!("{speedup}\n"));
        }

        Some(out)
    }

    pub fn write_json(&self, results: &AggregateResult) -> Result<PathBuf, ReportError> {
        let json = serde_json::to_string_pretty(results)?;
        let path = self.config.output_dir.join(&self.config.results_file);
        write(&path, json)?;
        info!("Results saved to {}", path.display());
        Ok(path)
    }

    /// Mean latency vs input, sequential and concurrent side by side.
    pub fn latency_chart(&self, results: &AggregateResult) -> Result<String, ReportError> {
        let concurrency = results.config().concurrent_requests;
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (PANEL_SIZE.0 * 2, PANEL_SIZE.1))
                .into_drawing_area();
            root.fill(&WHITE)?;

            let panels = root.split_evenly((1, 2));
            for (mode, panel) in Mode::ALL.into_iter().zip(panels.iter()) {
                let title = match mode {
                    Mode::Sequential => "Sequential requests".to_string(),
                    Mode::Concurrent => format!("Concurrent requests ({concurrency} workers)"),
                };
                let series = self.series(results, |res| res.stats(mode).mean);
                let (_, hi) = value_bounds(&series);
                let top = if hi > 0. { hi * 1.1 } else { 1. };
                draw_panel(panel, &title, "Time (ms)", 0.0..top, &series)?;
            }

            root.present()?;
        }
        Ok(svg)
    }

    /// Concurrent throughput vs input on a log scale. Zero throughput has no place on the axis and
    /// is left out.
    pub fn throughput_chart(&self, results: &AggregateResult) -> Result<String, ReportError> {
        let mut series = self.series(results, |res| throughput(res.concurrent.mean));
        for s in &mut series {
            s.points.retain(|&(_, y)| y > 0.);
        }

        let (lo, hi) = value_bounds(&series);
        let (lo, hi) = if lo > 0. {
            let lo = 10f64.powf(lo.log10().floor());
            let hi = 10f64.powf(hi.log10().ceil());
            (lo, if hi > lo { hi } else { lo * 10. })
        } else {
            (1., 10.)
        };

        let mut svg = String::new();
        {
            let size = (PANEL_SIZE.0 * 5 / 4, PANEL_SIZE.1 * 5 / 4);
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE)?;
            draw_panel(
                &root,
                "Service throughput comparison",
                "Throughput (requests/second)",
                (lo..hi).log_scale(),
                &series,
            )?;
            root.present()?;
        }
        Ok(svg)
    }

    pub fn write_charts(&self, results: &AggregateResult) -> Result<Vec<PathBuf>, ReportError> {
        let latency = self.config.output_dir.join(&self.config.latency_chart_file);
        write(&latency, self.latency_chart(results)?)?;

        let throughput = self.config.output_dir.join(&self.config.throughput_chart_file);
        write(&throughput, self.throughput_chart(results)?)?;

        Ok(vec![latency, throughput])
    }

    fn series<F>(&self, results: &AggregateResult, value: F) -> Vec<Series>
    where
        F: Fn(&fibbench_core::InputResult) -> f64,
    {
        results
            .services()
            .map(|(service, service_result)| {
                let mut points: Vec<(f64, f64)> = service_result
                    .iter()
                    .map(|(input, res)| (input as f64, value(res)))
                    .collect();
                points.sort_by(|a, b| a.0.total_cmp(&b.0));

                Series {
                    label: capitalize(service),
                    style: self.config.style.get(service).clone(),
                    points,
                }
            })
            .collect()
    }
}

/// One line of a chart: a service's values by Fibonacci input.
struct Series {
    label: String,
    style: SeriesStyle,
    points: Vec<(f64, f64)>,
}

fn draw_panel<Y>(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    y_desc: &str,
    y_range: Y,
    series: &[Series],
) -> Result<(), ReportError>
where
    Y: AsRangedCoord<Value = f64>,
    Y::CoordDescType: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(input_bounds(series), y_range)?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.2))
        .x_desc("Fibonacci number (n)")
        .y_desc(y_desc)
        .x_label_formatter(&|x: &f64| format!("{x:.0}"))
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for s in series.iter().filter(|s| !s.points.is_empty()) {
        let color = s.style.rgb();
        let points = &s.points;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(s.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });

        let style = color.filled();
        match s.style.marker {
            Marker::Circle => {
                chart.draw_series(points.iter().map(|&p| Circle::new(p, MARKER_SIZE, style)))?;
            }
            Marker::Square => {
                let d = MARKER_SIZE;
                chart.draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p) + Rectangle::new([(-d, -d), (d, d)], style)
                }))?;
            }
            Marker::Triangle => {
                chart.draw_series(
                    points.iter().map(|&p| TriangleMarker::new(p, MARKER_SIZE + 1, style)),
                )?;
            }
            Marker::Diamond => {
                let d = MARKER_SIZE + 1;
                let diamond = [(0, -d), (d, 0), (0, d), (-d, 0)];
                chart.draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p) + Polygon::new(diamond.to_vec(), style)
                }))?;
            }
        }
    }

    if series.iter().all(|s| s.points.is_empty()) {
        return Ok(());
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .draw()?;

    Ok(())
}

/// Input range covering every series, padded so the end points don't sit on the axes.
fn input_bounds(series: &[Series]) -> Range<f64> {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(x, _)| x))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));

    if !lo.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(1.);
    (lo - pad)..(hi + pad)
}

/// Smallest and largest value over every series; `(0, 0)` when there are none.
fn value_bounds(series: &[Series]) -> (f64, f64) {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(_, y)| y))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));

    if lo.is_finite() {
        (lo, hi)
    } else {
        (0., 0.)
    }
}

fn write(path: &Path, contents: String) -> Result<(), ReportError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| ReportError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
    }
    fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
