//! Baseline vectorization.
//!
//! Turns the network's raster output into baseline polylines:
//!
//! 1. Build a baseline heat map, suppressed where line separators fire, and
//!    threshold it.
//! 2. Thin the binary map to a one pixel wide skeleton.
//! 3. Label 8-connected skeleton components and trace the longest geodesic
//!    path through each one. Whatever remains after removing a path is traced
//!    again, so branching components yield several lines.
//! 4. Drop short traces, simplify the rest and orient them so that they start
//!    where the line starts.

use crate::core::{OCRError, Tensor2D, Tensor4D};
use crate::impl_config_validator;
use crate::processors::geometry::{Point, polyline_length, simplify_polyline};
use crate::processors::skeleton::thin;
use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use ndarray::{Array2, s};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Roles of the raster output channels.
///
/// Defaults follow the usual three channel layout: line-start separators,
/// line-end separators, baselines. A single channel raster is always read as
/// a bare baseline map regardless of these settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterChannels {
    /// Channel holding line-start separator probabilities.
    pub start_separator: Option<usize>,
    /// Channel holding line-end separator probabilities.
    pub end_separator: Option<usize>,
    /// Channel holding baseline probabilities.
    pub baseline: usize,
}

impl Default for RasterChannels {
    fn default() -> Self {
        Self {
            start_separator: Some(0),
            end_separator: Some(1),
            baseline: 2,
        }
    }
}

impl RasterChannels {
    /// Bare baseline map in channel 0.
    pub fn baseline_only() -> Self {
        Self {
            start_separator: None,
            end_separator: None,
            baseline: 0,
        }
    }

    /// Resolves the roles against a raster with `channels` channels.
    pub fn resolve(&self, channels: usize) -> Result<RasterChannels, OCRError> {
        if channels == 1 {
            return Ok(Self::baseline_only());
        }
        let used = [Some(self.baseline), self.start_separator, self.end_separator];
        if let Some(idx) = used.into_iter().flatten().find(|&idx| idx >= channels) {
            return Err(OCRError::tensor_operation_error(
                "raster_channels",
                &[idx + 1],
                &[channels],
                &format!(
                    "raster channel {} is configured but the model produced {} channel(s)",
                    idx, channels
                ),
                crate::core::errors::SimpleError::new("Raster channel out of range"),
            ));
        }
        Ok(*self)
    }
}

/// Configuration for [`BaselineVectorizer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Heat map threshold.
    pub threshold: f32,
    /// Minimum trace length in raster pixels.
    pub min_length: f32,
    /// Douglas-Peucker tolerance in raster pixels.
    pub simplify_epsilon: f32,
    /// Maximum number of baselines per page; longer traces are kept.
    pub max_lines: usize,
    /// Half size of the window used to read separator responses at trace ends.
    pub orientation_window: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            min_length: 5.0,
            simplify_epsilon: 1.0,
            max_lines: 4096,
            orientation_window: 3,
        }
    }
}

impl_config_validator!(VectorizerConfig {
    threshold: range(0.0, 1.0),
    min_length: range(0.0, 100000.0),
    simplify_epsilon: range(0.0, 1000.0),
    max_lines: min(1),
});

/// Extracts baselines from raster output.
#[derive(Debug, Clone, Default)]
pub struct BaselineVectorizer {
    config: VectorizerConfig,
    channels: RasterChannels,
}

impl BaselineVectorizer {
    /// Creates a vectorizer with the given settings.
    pub fn new(config: VectorizerConfig, channels: RasterChannels) -> Self {
        Self { config, channels }
    }

    /// Current configuration.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Vectorizes a `1 × K × h × w` raster into baselines in raster coordinates.
    ///
    /// A raster without any pixel above the threshold yields an empty list.
    pub fn vectorize(&self, raster: &Tensor4D) -> Result<Vec<Vec<Point>>, OCRError> {
        let (batch, channels, height, width) = raster.dim();
        if batch != 1 || channels == 0 {
            return Err(OCRError::tensor_operation_error(
                "raster_validation",
                &[1, channels.max(1), height, width],
                raster.shape(),
                "expected a single page raster with at least one channel",
                crate::core::errors::SimpleError::new("Invalid raster shape"),
            ));
        }
        let roles = self.channels.resolve(channels)?;

        let heat = self.heat_map(raster, &roles);
        let binary = GrayImage::from_fn(width as u32, height as u32, |x, y| {
            if heat[[y as usize, x as usize]] > self.config.threshold {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let foreground = binary.pixels().filter(|p| p[0] > 0).count();
        if foreground == 0 {
            debug!("no raster pixel above threshold {}", self.config.threshold);
            return Ok(Vec::new());
        }

        let skeleton = thin(&binary);
        let components = label_components(&skeleton);
        debug!(
            "{} foreground pixels thinned into {} skeleton components",
            foreground,
            components.len()
        );

        let min_length = self.config.min_length;
        let mut traces: Vec<(f32, Vec<Point>)> = components
            .into_par_iter()
            .flat_map_iter(|pixels| trace_component(pixels, min_length))
            .collect();

        traces.sort_by(|a, b| {
            b.0.total_cmp(&a.0).then_with(|| {
                let (pa, pb) = (a.1[0], b.1[0]);
                pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
            })
        });
        if traces.len() > self.config.max_lines {
            warn!(
                "{} baselines traced, keeping the {} longest",
                traces.len(),
                self.config.max_lines
            );
            traces.truncate(self.config.max_lines);
        }

        let baselines: Vec<Vec<Point>> = traces
            .into_iter()
            .map(|(_, path)| {
                let path = self.orient(path, raster, &roles);
                simplify_polyline(&path, self.config.simplify_epsilon)
            })
            .filter(|line| line.len() >= 2)
            .collect();

        debug!("vectorized {} baselines", baselines.len());
        Ok(baselines)
    }

    /// Baseline probability with separator responses subtracted.
    fn heat_map(&self, raster: &Tensor4D, roles: &RasterChannels) -> Tensor2D {
        let baseline = raster.slice(s![0, roles.baseline, .., ..]);
        let mut separators: Option<Array2<f32>> = None;
        for idx in [roles.start_separator, roles.end_separator].into_iter().flatten() {
            let channel = raster.slice(s![0, idx, .., ..]);
            separators = Some(match separators {
                Some(acc) => acc + &channel,
                None => channel.to_owned(),
            });
        }
        match separators {
            Some(sep) => {
                let mut heat = baseline.to_owned();
                heat.zip_mut_with(&sep, |b, &s| *b *= 1.0 - s.clamp(0.0, 1.0));
                heat
            }
            None => baseline.to_owned(),
        }
    }

    /// Orients a trace so that it runs in writing direction.
    fn orient(&self, mut path: Vec<Point>, raster: &Tensor4D, roles: &RasterChannels) -> Vec<Point> {
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            return path;
        };

        let window = self.config.orientation_window;
        let response = |channel: Option<usize>, p: Point| -> f32 {
            channel.map_or(0.0, |c| max_in_window(raster, c, p, window))
        };
        let keep = response(roles.start_separator, first) + response(roles.end_separator, last);
        let flip = response(roles.start_separator, last) + response(roles.end_separator, first);

        let reverse = if (keep - flip).abs() > f32::EPSILON {
            flip > keep
        } else {
            let dx = last.x - first.x;
            let dy = last.y - first.y;
            if dx.abs() >= dy.abs() { dx < 0.0 } else { dy < 0.0 }
        };
        if reverse {
            path.reverse();
        }
        path
    }
}

fn max_in_window(raster: &Tensor4D, channel: usize, p: Point, window: usize) -> f32 {
    let (_, _, height, width) = raster.dim();
    let cx = p.x.round().max(0.0) as usize;
    let cy = p.y.round().max(0.0) as usize;
    let x0 = cx.saturating_sub(window);
    let y0 = cy.saturating_sub(window);
    let x1 = (cx + window + 1).min(width);
    let y1 = (cy + window + 1).min(height);
    if x0 >= x1 || y0 >= y1 {
        return 0.0;
    }
    raster
        .slice(s![0, channel, y0..y1, x0..x1])
        .iter()
        .copied()
        .fold(0.0, f32::max)
}

/// Groups skeleton pixels by 8-connected component.
fn label_components(skeleton: &GrayImage) -> Vec<Vec<(u32, u32)>> {
    let labels = connected_components(skeleton, Connectivity::Eight, Luma([0u8]));
    let mut groups: HashMap<u32, Vec<(u32, u32)>> = HashMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        if label[0] != 0 {
            groups.entry(label[0]).or_default().push((x, y));
        }
    }
    let mut components: Vec<(u32, Vec<(u32, u32)>)> = groups.into_iter().collect();
    components.sort_by_key(|(label, _)| *label);
    components.into_iter().map(|(_, pixels)| pixels).collect()
}

/// Traces one component into paths of at least `min_length`.
///
/// The longest path is taken first; the pixels left over after removing it
/// split into pieces that are traced in turn.
fn trace_component(pixels: Vec<(u32, u32)>, min_length: f32) -> Vec<(f32, Vec<Point>)> {
    let mut traces = Vec::new();
    let mut queue = VecDeque::from([pixels]);

    while let Some(piece) = queue.pop_front() {
        if piece.len() < 2 {
            continue;
        }
        let (path, length) = longest_path(&piece);
        if length < min_length || path.len() < 2 {
            continue;
        }

        let on_path: HashSet<(u32, u32)> = path.iter().copied().collect();
        let rest: Vec<(u32, u32)> = piece.into_iter().filter(|p| !on_path.contains(p)).collect();
        queue.extend(split_pieces(rest));

        traces.push((
            length,
            path.into_iter()
                .map(|(x, y)| Point::new(x as f32, y as f32))
                .collect(),
        ));
    }
    traces
}

const NEIGHBOURS: [(i64, i64, f32); 8] = [
    (-1, -1, std::f32::consts::SQRT_2),
    (0, -1, 1.0),
    (1, -1, std::f32::consts::SQRT_2),
    (-1, 0, 1.0),
    (1, 0, 1.0),
    (-1, 1, std::f32::consts::SQRT_2),
    (0, 1, 1.0),
    (1, 1, std::f32::consts::SQRT_2),
];

fn neighbours_of(
    (x, y): (u32, u32),
    index: &HashMap<(u32, u32), usize>,
) -> impl Iterator<Item = (usize, f32)> + '_ {
    NEIGHBOURS.iter().filter_map(move |&(dx, dy, cost)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        index.get(&(nx as u32, ny as u32)).map(|&i| (i, cost))
    })
}

#[derive(Clone, Copy, PartialEq)]
struct State {
    cost: f32,
    node: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest paths over the pixel graph.
fn dijkstra(
    pixels: &[(u32, u32)],
    index: &HashMap<(u32, u32), usize>,
    source: usize,
) -> (Vec<f32>, Vec<Option<usize>>) {
    let mut dist = vec![f32::INFINITY; pixels.len()];
    let mut prev = vec![None; pixels.len()];
    let mut heap = BinaryHeap::new();
    dist[source] = 0.0;
    heap.push(State {
        cost: 0.0,
        node: source,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        for (next, step) in neighbours_of(pixels[node], index) {
            let candidate = cost + step;
            if candidate < dist[next] {
                dist[next] = candidate;
                prev[next] = Some(node);
                heap.push(State {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }
    (dist, prev)
}

fn farthest(dist: &[f32]) -> usize {
    dist.iter()
        .enumerate()
        .filter(|(_, d)| d.is_finite())
        .fold((0, f32::NEG_INFINITY), |best, (i, &d)| {
            if d > best.1 { (i, d) } else { best }
        })
        .0
}

/// Approximate longest geodesic path of a connected piece by two sweeps.
fn longest_path(pixels: &[(u32, u32)]) -> (Vec<(u32, u32)>, f32) {
    let index: HashMap<(u32, u32), usize> =
        pixels.iter().enumerate().map(|(i, &p)| (p, i)).collect();

    let (dist, _) = dijkstra(pixels, &index, 0);
    let a = farthest(&dist);
    let (dist, prev) = dijkstra(pixels, &index, a);
    let b = farthest(&dist);

    let mut path = vec![pixels[b]];
    let mut cursor = b;
    while let Some(p) = prev[cursor] {
        path.push(pixels[p]);
        cursor = p;
    }
    path.reverse();
    let length = polyline_length(
        &path
            .iter()
            .map(|&(x, y)| Point::new(x as f32, y as f32))
            .collect::<Vec<_>>(),
    );
    (path, length)
}

/// Splits loose pixels into 8-connected pieces.
fn split_pieces(pixels: Vec<(u32, u32)>) -> Vec<Vec<(u32, u32)>> {
    let index: HashMap<(u32, u32), usize> =
        pixels.iter().enumerate().map(|(i, &p)| (p, i)).collect();
    let mut seen = vec![false; pixels.len()];
    let mut pieces = Vec::new();

    for start in 0..pixels.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut piece = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            piece.push(pixels[node]);
            for (next, _) in neighbours_of(pixels[node], &index) {
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigValidator;

    fn raster_with(channels: usize, height: usize, width: usize) -> Tensor4D {
        Tensor4D::zeros((1, channels, height, width))
    }

    fn paint_row(raster: &mut Tensor4D, channel: usize, y: usize, x0: usize, x1: usize) {
        for x in x0..x1 {
            raster[[0, channel, y, x]] = 1.0;
        }
    }

    #[test]
    fn test_empty_raster_yields_no_lines() {
        let vectorizer = BaselineVectorizer::default();
        assert!(vectorizer.vectorize(&raster_with(3, 32, 32)).unwrap().is_empty());
    }

    #[test]
    fn test_single_horizontal_line() {
        let mut raster = raster_with(3, 40, 60);
        for y in 18..21 {
            paint_row(&mut raster, 2, y, 5, 55);
        }
        let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line.len() >= 2);
        assert!(line[0].x < line[line.len() - 1].x);
        assert!(line.iter().all(|p| (17.0..=21.0).contains(&p.y)));
        assert!(polyline_length(line) > 40.0);
    }

    #[test]
    fn test_single_pixel_never_survives() {
        let mut raster = raster_with(1, 16, 16);
        raster[[0, 0, 8, 8]] = 1.0;
        let config = VectorizerConfig {
            min_length: 0.0,
            ..Default::default()
        };
        let lines = BaselineVectorizer::new(config, RasterChannels::default())
            .vectorize(&raster)
            .unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_short_trace_is_dropped() {
        let mut raster = raster_with(1, 16, 16);
        paint_row(&mut raster, 0, 8, 4, 7);
        assert!(BaselineVectorizer::default().vectorize(&raster).unwrap().is_empty());
    }

    #[test]
    fn test_separators_suppress_and_orient() {
        let mut raster = raster_with(3, 30, 60);
        paint_row(&mut raster, 2, 10, 5, 55);
        paint_row(&mut raster, 2, 20, 5, 55);
        // end of one line directly followed by the start of the next
        raster[[0, 1, 20, 30]] = 1.0;
        raster[[0, 0, 20, 31]] = 1.0;
        // line start marker at the right end of the first row
        raster[[0, 0, 10, 56]] = 1.0;

        let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
        assert_eq!(lines.len(), 3);
        let top = lines.iter().find(|l| l[0].y < 15.0).unwrap();
        assert!(top[0].x > top[top.len() - 1].x, "start marker flips the trace");
        for line in lines.iter().filter(|l| l[0].y > 15.0) {
            assert!(line[0].x < line[line.len() - 1].x);
        }
    }

    #[test]
    fn test_branching_component_yields_several_lines() {
        let mut raster = raster_with(1, 60, 60);
        paint_row(&mut raster, 0, 30, 5, 55);
        for y in 5..30 {
            raster[[0, 0, y, 30]] = 1.0;
        }
        let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_max_lines_keeps_longest() {
        let mut raster = raster_with(1, 40, 60);
        paint_row(&mut raster, 0, 5, 5, 55);
        paint_row(&mut raster, 0, 15, 5, 25);
        paint_row(&mut raster, 0, 25, 5, 40);
        let config = VectorizerConfig {
            max_lines: 2,
            ..Default::default()
        };
        let lines = BaselineVectorizer::new(config, RasterChannels::baseline_only())
            .vectorize(&raster)
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l[0].y != 15.0));
    }

    fn paint_where(raster: &mut Tensor4D, channel: usize, inside: impl Fn(f32, f32) -> bool) {
        let (_, _, height, width) = raster.dim();
        for y in 0..height {
            for x in 0..width {
                if inside(x as f32, y as f32) {
                    raster[[0, channel, y, x]] = 1.0;
                }
            }
        }
    }

    #[test]
    fn test_two_pixel_diagonal_yields_one_line() {
        for channels in [1, 3] {
            let mut raster = raster_with(channels, 70, 70);
            let baseline = channels - 1;
            paint_where(&mut raster, baseline, |x, y| (5.0..60.0).contains(&y) && (y..y + 2.0).contains(&x));
            let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
            assert_eq!(lines.len(), 1, "{channels} channel raster");
            let line = &lines[0];
            let (first, last) = (line[0], line[line.len() - 1]);
            assert!(first.x < last.x && first.y < last.y);
            assert!(polyline_length(line) > 70.0);
        }
    }

    #[test]
    fn test_rising_diagonal_runs_left_to_right() {
        let mut raster = raster_with(1, 70, 70);
        paint_where(&mut raster, 0, |x, y| {
            (5.0..60.0).contains(&y) && (65.0 - y..67.0 - y).contains(&x)
        });
        let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line[0].x < line[line.len() - 1].x);
        assert!(line[0].y > line[line.len() - 1].y);
    }

    #[test]
    fn test_skewed_baseline() {
        let mut raster = raster_with(3, 60, 100);
        let ideal = |x: f32| 15.0 + 0.25 * x;
        paint_where(&mut raster, 2, |x, y| (5.0..90.0).contains(&x) && (y - ideal(x)).abs() < 1.5);
        let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line[0].x < 10.0 && line[line.len() - 1].x > 85.0);
        for p in line {
            assert!((p.y - ideal(p.x)).abs() <= 2.0, "{p:?} strays from the skewed stroke");
        }
    }

    #[test]
    fn test_curved_baseline_keeps_its_shape() {
        let mut raster = raster_with(1, 60, 100);
        let ideal = |x: f32| 30.0 + 12.0 * (x / 15.0).sin();
        paint_where(&mut raster, 0, |x, y| (5.0..90.0).contains(&x) && (y - ideal(x)).abs() < 1.5);
        let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line[0].x < line[line.len() - 1].x);
        assert!(line.len() > 4, "simplification flattened the curve to {} points", line.len());
        for p in line {
            assert!((p.y - ideal(p.x)).abs() <= 2.5);
        }
    }

    #[test]
    fn test_vertical_traces_run_top_to_bottom() {
        let mut raster = raster_with(1, 60, 60);
        paint_where(&mut raster, 0, |x, y| (29.0..32.0).contains(&x) && (5.0..55.0).contains(&y));
        let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line[0].y < line[line.len() - 1].y);
        assert!(line.iter().all(|p| (29.0..=31.0).contains(&p.x)));

        let mut raster = raster_with(1, 60, 60);
        paint_where(&mut raster, 0, |x, y| {
            (5.0..55.0).contains(&y) && (x - (20.0 + 0.3 * y)).abs() < 1.5
        });
        let lines = BaselineVectorizer::default().vectorize(&raster).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line[0].y < 10.0 && line[line.len() - 1].y > 50.0);
    }

    #[test]
    fn test_channel_roles_out_of_range() {
        assert!(RasterChannels::default().resolve(2).is_err());
        assert_eq!(RasterChannels::default().resolve(1).unwrap(), RasterChannels::baseline_only());
    }

    #[test]
    fn test_config_validation() {
        assert!(VectorizerConfig::default().validate().is_ok());
        let bad = VectorizerConfig {
            threshold: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
