//! Static line plots of a finished simulation
//!
//! One image per quantity, written with `plotters`:
//!
//! - unabsorbed drug concentration (the forcing function)
//! - blood drug concentration
//! - tissue drug concentration
//! - bound fraction of the target
//! - bound complex concentration
//!
//! ```rust,ignore
//! let output = config.validate()?.run()?;
//! let written = Reporter::new(config.report.clone()).render(&output)?;
//! ```

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::simulator::SimulationOutput;
use crate::PkbindError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            other => Err(format!("unknown image format '{other}', expected png or svg")),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// File stems of the five plots; the extension follows [ImageFormat]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlotFiles {
    pub unabsorbed: String,
    pub iblood: String,
    pub itissue: String,
    pub bound_fraction: String,
    pub bound_complex: String,
}

impl Default for PlotFiles {
    fn default() -> Self {
        PlotFiles {
            unabsorbed: "I_of_t".to_string(),
            iblood: "Iblood".to_string(),
            itissue: "Itissue".to_string(),
            bound_fraction: "frac_bound".to_string(),
            bound_complex: "bound".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory the images are written to; created when missing
    pub output_dir: PathBuf,
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Line width in pixels
    pub line_width: u32,
    pub files: PlotFiles,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_dir: PathBuf::from("."),
            format: ImageFormat::Png,
            width: 1024,
            height: 768,
            line_width: 2,
            files: PlotFiles::default(),
        }
    }
}

/// One line plot: what is drawn and how it is labelled
struct Plot<'a> {
    stem: &'a str,
    title: &'static str,
    ylabel: &'static str,
    color: RGBColor,
    values: Vec<f64>,
}

/// Renders [SimulationOutput]s to image files
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Reporter { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Path of the image with the given file stem
    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}.{}", stem, self.config.format.extension()))
    }

    /// Write the five plots and return their paths, in the order listed in
    /// the module documentation
    pub fn render(&self, output: &SimulationOutput) -> Result<Vec<PathBuf>, PkbindError> {
        let trajectory = &output.trajectory;
        let times = trajectory.times().to_vec();
        let files = &self.config.files;

        let plots = [
            Plot {
                stem: &files.unabsorbed,
                title: "Unabsorbed drug",
                ylabel: "Unabsorbed drug concentration (M)",
                color: BLUE,
                values: output.forcing.to_vec(),
            },
            Plot {
                stem: &files.iblood,
                title: "Blood",
                ylabel: "I_blood (M)",
                color: RED,
                values: trajectory.iblood().to_vec(),
            },
            Plot {
                stem: &files.itissue,
                title: "Tissue",
                ylabel: "I_tissue (M)",
                color: BLUE,
                values: trajectory.itissue().to_vec(),
            },
            Plot {
                stem: &files.bound_fraction,
                title: "Target engagement",
                ylabel: "Fraction of complex bound",
                color: GREEN,
                values: trajectory.bound_fraction().to_vec(),
            },
            Plot {
                stem: &files.bound_complex,
                title: "Bound complex",
                ylabel: "Bound complex concentration (M)",
                color: RGBColor(0, 100, 0),
                values: trajectory.bound_complex().to_vec(),
            },
        ];

        std::fs::create_dir_all(&self.config.output_dir)?;
        let mut written = Vec::with_capacity(plots.len());
        for plot in &plots {
            let path = self.path_for(plot.stem);
            self.render_series(&path, &times, plot)?;
            tracing::info!(path = %path.display(), "wrote {}", plot.title);
            written.push(path);
        }
        Ok(written)
    }

    fn render_series(&self, path: &Path, times: &[f64], plot: &Plot) -> Result<(), PkbindError> {
        let report_error = |message: String| PkbindError::Report {
            path: path.to_path_buf(),
            message,
        };
        check_series(times, &plot.values).map_err(report_error)?;

        let size = (self.config.width, self.config.height);
        let result = match self.config.format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                draw_on_area(&root, times, plot, self.config.line_width)
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                draw_on_area(&root, times, plot, self.config.line_width)
            }
        };
        result.map_err(|e| report_error(e.to_string()))
    }
}

/// Series must be non-empty, finite and as long as the time axis
fn check_series(times: &[f64], values: &[f64]) -> Result<(), String> {
    if times.is_empty() {
        return Err("nothing to plot".to_string());
    }
    if times.len() != values.len() {
        return Err(format!(
            "{} time points but {} values",
            times.len(),
            values.len()
        ));
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(format!("value {index} is not finite"));
    }
    Ok(())
}

/// Axis range with 10% headroom; flat or single-point data gets a unit window
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let span = max - min;
    if span > 0.0 {
        (min - 0.1 * span, max + 0.1 * span)
    } else if max != 0.0 {
        let pad = 0.1 * max.abs();
        (min - pad, max + pad)
    } else {
        (-1.0, 1.0)
    }
}

fn draw_on_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    times: &[f64],
    plot: &Plot,
    line_width: u32,
) -> Result<(), Box<dyn Error>>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    let (t0, t1) = if times.len() > 1 {
        (times[0], times[times.len() - 1])
    } else {
        (times[0] - 1.0, times[0] + 1.0)
    };
    let (y0, y1) = padded_range(plot.values.iter().cloned());

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(plot.title, ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(t0..t1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc(plot.ylabel)
        .y_label_formatter(&|v| format!("{:.2e}", v))
        .draw()?;

    chart.draw_series(LineSeries::new(
        times.iter().zip(plot.values.iter()).map(|(t, v)| (*t, *v)),
        plot.color.stroke_width(line_width),
    ))?;

    root.present()?;
    Ok(())
}
