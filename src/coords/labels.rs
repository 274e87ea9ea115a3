//! Cluster label positions for the scatter plot.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use serde::Serialize;

use super::CoordError;
use crate::output;

/// Share of a cluster's points, closest to its centroid, used for the label
pub const CORE_FRACTION: f64 = 0.7;

/// Where to draw one cluster label. Serialized as `[x, y, label]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "(f64, f64, String)")]
pub struct LabelPosition {
    /// Label x
    pub x: f64,
    /// Label y
    pub y: f64,
    /// Cluster name
    pub label: String,
}

impl From<LabelPosition> for (f64, f64, String) {
    fn from(p: LabelPosition) -> Self {
        (p.x, p.y, p.label)
    }
}

fn mean(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    (sx / n, sy / n)
}

/// Label position per distinct label, in order of first appearance.
///
/// The position is the mean of the 70% of the cluster's points closest to
/// its centroid (at least one point), so stray cells do not drag the label
/// away from the bulk of the cluster.
pub fn cluster_midpoints(
    xs: &[f64],
    ys: &[f64],
    labels: &[String],
) -> Result<Vec<LabelPosition>, CoordError> {
    if xs.len() != labels.len() || ys.len() != labels.len() {
        return Err(CoordError::LabelCount {
            labels: labels.len(),
            points: xs.len().min(ys.len()),
        });
    }

    let mut order: Vec<&str> = Vec::new();
    let mut clusters: HashMap<&str, Vec<(f64, f64)>> = HashMap::new();
    for ((x, y), label) in xs.iter().zip(ys).zip(labels) {
        clusters
            .entry(label.as_str())
            .or_insert_with(|| {
                order.push(label.as_str());
                Vec::new()
            })
            .push((*x, *y));
    }

    let positions = order
        .into_iter()
        .map(|label| {
            let points = &clusters[label];
            let (cx, cy) = mean(points);
            let mut by_distance: Vec<(f64, (f64, f64))> = points
                .iter()
                .map(|&(x, y)| (((x - cx).powi(2) + (y - cy).powi(2)).sqrt(), (x, y)))
                .collect();
            by_distance.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let keep = ((CORE_FRACTION * points.len() as f64) as usize).max(1);
            let core: Vec<(f64, f64)> = by_distance[..keep].iter().map(|(_, p)| *p).collect();
            let (x, y) = mean(&core);
            LabelPosition {
                x,
                y,
                label: label.to_string(),
            }
        })
        .collect();
    Ok(positions)
}

/// Compute label positions and write them as JSON to `path`.
pub fn write_cluster_labels<P: AsRef<Path>>(
    xs: &[f64],
    ys: &[f64],
    labels: &[String],
    path: P,
) -> Result<usize, CoordError> {
    let positions = cluster_midpoints(xs, ys, labels)?;
    output::write_json(path.as_ref(), &positions, true)?;
    info!(
        "Wrote {} cluster labels and midpoints to {}",
        positions.len(),
        path.as_ref().display()
    );
    Ok(positions.len())
}
