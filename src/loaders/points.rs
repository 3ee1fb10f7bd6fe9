use anyhow::{bail, Context, Result};
use glam::{DVec3, Vec3};
use std::path::Path;

use crate::math::AABB;

/// One data record; the first three fields are a position
pub type Point = Vec<f32>;

/// Summary of a dataset's spatial layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataStats {
    /// Largest per-axis extent of the positions
    pub max_range: f32,
    /// Mean position
    pub mean: Vec3,
}

impl DataStats {
    /// Stats over the first three fields, `None` when no record has a position
    ///
    /// Records shorter than three fields are ignored. A zero extent (single
    /// point, or all points equal) is reported as 1.0 so scaling and framing
    /// stay finite.
    pub fn from_points(points: &[Point]) -> Option<DataStats> {
        let bounds = AABB::from_points(points.iter().filter_map(|p| position(p)))?;

        let (sum, count) = points
            .iter()
            .filter_map(|p| position(p))
            .fold((DVec3::ZERO, 0usize), |(sum, count), p| {
                (sum + p.as_dvec3(), count + 1)
            });
        let mean = (sum / count as f64).as_vec3();

        let mut max_range = bounds.max_extent();
        if max_range <= 0.0 || !max_range.is_finite() {
            log::warn!("Degenerate data extent {}, using 1.0", max_range);
            max_range = 1.0;
        }

        Some(DataStats { max_range, mean })
    }
}

/// Parsed dataset ready for the scene
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Point>,
    pub stats: DataStats,
}

/// Position of a record, `None` when it has fewer than three fields
pub fn position(point: &[f32]) -> Option<Vec3> {
    match point {
        [x, y, z, ..] => Some(Vec3::new(*x, *y, *z)),
        _ => None,
    }
}

/// Parse numeric records separated by whitespace and/or commas
///
/// Blank lines and lines starting with `#` are skipped. Every record needs at
/// least three fields.
pub fn parse_points(text: &str) -> Result<PointCloud> {
    let mut points = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<f32>()
                    .with_context(|| format!("line {}: invalid number '{}'", line_no + 1, field))
            })
            .collect::<Result<Point>>()?;

        if fields.len() < 3 {
            bail!(
                "line {}: expected at least 3 values, found {}",
                line_no + 1,
                fields.len()
            );
        }

        points.push(fields);
    }

    let Some(stats) = DataStats::from_points(&points) else {
        bail!("no data points found");
    };

    Ok(PointCloud { points, stats })
}

/// Read and parse a point file
pub fn load_points_file(path: impl AsRef<Path>) -> Result<PointCloud> {
    let path = path.as_ref();
    log::info!("Loading data file: {:?}", path);

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {:?}", path))?;
    let cloud = parse_points(&text).with_context(|| format!("Failed to parse data file: {:?}", path))?;

    log::info!(
        "Loaded {} points (max range {:.3}, mean {:?})",
        cloud.points.len(),
        cloud.stats.max_range,
        cloud.stats.mean
    );
    Ok(cloud)
}
