use std::collections::BTreeMap;

use super::model::{CellValue, RecordTable};
use super::schema::{KnownColumn, Schema};
use super::summary::median_sorted;

// ---------------------------------------------------------------------------
// Plot style
// ---------------------------------------------------------------------------

/// Geometry and stroke settings for the age-by-colony plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    /// Widest violin, as a fraction of one category slot.
    pub violin_width: f64,
    /// Number of KDE evaluation points per violin.
    pub kde_grid: usize,
    /// How many bandwidths the violin extends past the extreme observations.
    pub kde_cut: f64,
    /// Share of the slot split between dodged groups.
    pub dodge_width: f64,
    /// Jitter half-extent before dodging.
    pub jitter: f64,
    /// Median tick spans `position ± median_half_width`.
    pub median_half_width: f64,
    pub median_line_width: f32,
    pub violin_line_width: f32,
    pub marker_radius: f32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            violin_width: 0.1,
            kde_grid: 100,
            kde_cut: 2.0,
            dodge_width: 0.8,
            jitter: 0.1,
            median_half_width: 0.1,
            median_line_width: 2.0,
            violin_line_width: 1.0,
            marker_radius: 4.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Everything drawn for one colony.
#[derive(Debug, Clone, PartialEq)]
pub struct ColonyGroup {
    pub colony: CellValue,
    /// Slot centre on the x axis (0, 1, 2, ... in sorted colony order).
    pub position: f64,
    /// Closed violin outline, or a flat segment when the ages have no spread.
    pub outline: Vec<[f64; 2]>,
    /// One jittered, dodged point per mouse.
    pub points: Vec<[f64; 2]>,
    pub median: f64,
    pub median_tick: [[f64; 2]; 2],
}

impl ColonyGroup {
    pub fn name(&self) -> String {
        self.colony.to_string()
    }
}

/// Renderer-independent description of the violin + strip plot.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionPlot {
    pub groups: Vec<ColonyGroup>,
    pub y_max: f64,
    pub style: PlotStyle,
}

impl DistributionPlot {
    /// `None` when the columns are missing or no row has both a colony and
    /// a numeric age. The y axis spans `0..=y_max`.
    pub fn build(
        table: &RecordTable,
        schema: &Schema,
        rows: &[usize],
        style: &PlotStyle,
        y_max: f64,
    ) -> Option<Self> {
        let colony_col = schema.index(KnownColumn::ColonyName)?;
        let age_col = schema.index(KnownColumn::AgeWeeks)?;

        // Sorted colony order keeps slot positions reproducible.
        let mut by_colony: BTreeMap<&CellValue, Vec<(usize, f64)>> = BTreeMap::new();
        for &r in rows {
            let colony = table.cell(r, colony_col);
            if colony.is_null() {
                continue;
            }
            if let Some(age) = table.cell(r, age_col).as_f64() {
                by_colony.entry(colony).or_default().push((r, age));
            }
        }
        if by_colony.is_empty() {
            return None;
        }

        let k = by_colony.len();
        let densities: Vec<Option<Kde>> = by_colony
            .values()
            .map(|obs| {
                let ages: Vec<f64> = obs.iter().map(|&(_, a)| a).collect();
                Kde::fit(&ages, style)
            })
            .collect();
        let peak = densities
            .iter()
            .flatten()
            .map(|d| d.peak())
            .fold(0.0_f64, f64::max);

        let groups = by_colony
            .into_iter()
            .zip(densities)
            .enumerate()
            .map(|(i, ((colony, obs), kde))| {
                let position = i as f64;
                let mut ages: Vec<f64> = obs.iter().map(|&(_, a)| a).collect();
                ages.sort_by(f64::total_cmp);

                let outline = match kde {
                    Some(kde) if peak > 0.0 => kde.outline(position, style.violin_width / 2.0 / peak),
                    _ => {
                        let half = style.violin_width / 2.0;
                        vec![[position - half, ages[0]], [position + half, ages[0]]]
                    }
                };

                let dodge = -style.dodge_width / 2.0 + (i as f64 + 0.5) * style.dodge_width / k as f64;
                let jitter = style.jitter / k as f64;
                let points = obs
                    .iter()
                    .map(|&(row, age)| {
                        let u = unit_jitter(row) * 2.0 - 1.0;
                        [position + dodge + u * jitter, age]
                    })
                    .collect();

                let median = median_sorted(&ages).unwrap_or(ages[0]);
                let median_tick = [
                    [position - style.median_half_width, median],
                    [position + style.median_half_width, median],
                ];

                ColonyGroup {
                    colony: colony.clone(),
                    position,
                    outline,
                    points,
                    median,
                    median_tick,
                }
            })
            .collect();

        Some(DistributionPlot {
            groups,
            y_max,
            style: style.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Gaussian KDE sampled on a regular grid.
#[derive(Debug, Clone)]
struct Kde {
    grid: Vec<f64>,
    density: Vec<f64>,
}

impl Kde {
    /// Scott's rule bandwidth. `None` for fewer than two observations or
    /// zero spread.
    fn fit(ages: &[f64], style: &PlotStyle) -> Option<Self> {
        let n = ages.len();
        if n < 2 {
            return None;
        }
        let mean = ages.iter().sum::<f64>() / n as f64;
        let var = ages.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std = var.sqrt();
        if !std.is_finite() || std <= 0.0 {
            return None;
        }
        let bw = std * (n as f64).powf(-0.2);

        let lo = ages.iter().copied().fold(f64::INFINITY, f64::min) - style.kde_cut * bw;
        let hi = ages.iter().copied().fold(f64::NEG_INFINITY, f64::max) + style.kde_cut * bw;
        let steps = style.kde_grid.max(2);
        let norm = 1.0 / (n as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());

        let grid: Vec<f64> = (0..steps)
            .map(|i| lo + (hi - lo) * i as f64 / (steps - 1) as f64)
            .collect();
        let density = grid
            .iter()
            .map(|&y| {
                norm * ages
                    .iter()
                    .map(|&a| (-0.5 * ((y - a) / bw).powi(2)).exp())
                    .sum::<f64>()
            })
            .collect();

        Some(Kde { grid, density })
    }

    fn peak(&self) -> f64 {
        self.density.iter().copied().fold(0.0, f64::max)
    }

    /// Mirror the density around `x`, up the right side and down the left.
    fn outline(&self, x: f64, scale: f64) -> Vec<[f64; 2]> {
        let right = self
            .grid
            .iter()
            .zip(&self.density)
            .map(|(&y, &d)| [x + d * scale, y]);
        let left = self
            .grid
            .iter()
            .zip(&self.density)
            .rev()
            .map(|(&y, &d)| [x - d * scale, y]);
        let mut pts: Vec<[f64; 2]> = right.chain(left).collect();
        if let Some(&first) = pts.first() {
            pts.push(first);
        }
        pts
    }
}

/// Stable pseudo-random value in `[0, 1)` for a row (splitmix64).
fn unit_jitter(row: usize) -> f64 {
    let mut z = (row as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}
