//! Reading order policies for text lines.
//!
//! All policies implement [`ReadingOrder`] and return a permutation of their
//! input.
//!
//! ## Algorithms
//!
//! - **Polygonal** (default): a pairwise "precedes" relation over baseline
//!   bounding boxes followed by a depth-first topological sort.
//! - **XY-cut**: recursive projection cuts over line bounding boxes, suited to
//!   multi-column pages.
//! - **Top to bottom**: sort by top edge, ties broken horizontally.

use crate::core::traits::ReadingOrder;
use crate::domain::{LineRecord, ReadingDirection};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Axis-aligned extent `[x_min, y_min, x_max, y_max]`.
type Extent = [f32; 4];

fn baseline_extent(line: &LineRecord) -> Extent {
    let (x0, y0, x1, y1) = line.baseline_bounds();
    [x0, y0, x1, y1]
}

fn line_extent(line: &LineRecord) -> Extent {
    if line.boundary.is_empty() {
        return baseline_extent(line);
    }
    let bbox = line.boundary_bbox();
    [bbox.x_min(), bbox.y_min(), bbox.x_max(), bbox.y_max()]
}

/// Reorders `lines` by `order`, a permutation of their indices.
fn apply_order(lines: Vec<LineRecord>, order: &[usize]) -> Vec<LineRecord> {
    let mut slots: Vec<Option<LineRecord>> = lines.into_iter().map(Some).collect();
    order.iter().filter_map(|&i| slots[i].take()).collect()
}

/// Visiting order used when no relation decides: top to bottom, then in
/// reading direction.
fn scan_order(extents: &[Extent], direction: ReadingDirection) -> Vec<usize> {
    (0..extents.len())
        .sorted_by(|&a, &b| {
            let (ea, eb) = (extents[a], extents[b]);
            ea[1].total_cmp(&eb[1]).then_with(|| match direction {
                ReadingDirection::LeftToRight => ea[0].total_cmp(&eb[0]),
                ReadingDirection::RightToLeft => eb[2].total_cmp(&ea[2]),
            })
        })
        .collect()
}

/// Pairwise precedence over baseline bounding boxes with a topological sort.
///
/// Line `a` precedes `b` when their horizontal extents overlap and `a` starts
/// higher, or when they do not overlap, `a` lies before `b` in reading
/// direction and no third line separates them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonalReadingOrder;

impl PolygonalReadingOrder {
    /// Creates the policy.
    pub fn new() -> Self {
        Self
    }

    /// Ordered indices of `extents`.
    pub fn order_indices(extents: &[Extent], direction: ReadingDirection) -> Vec<usize> {
        let n = extents.len();
        if n < 2 {
            return (0..n).collect();
        }

        // predecessors[j] lists every i that must be read before j
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            for j in 0..n {
                if i != j && precedes(i, j, extents, direction) {
                    predecessors[j].push(i);
                }
            }
        }

        topsort(&predecessors, &scan_order(extents, direction))
    }
}

fn x_overlaps(a: &Extent, b: &Extent) -> bool {
    a[0] <= b[2] && a[2] >= b[0]
}

fn left_of(a: &Extent, b: &Extent) -> bool {
    a[2] < b[0]
}

/// True when `w` lies vertically within the span of `u` and `v` and covers
/// the horizontal gap between `u` on the left and `v` on the right.
fn separates(w: &Extent, u: &Extent, v: &Extent) -> bool {
    if w[3] < u[1].min(v[1]) || w[1] > u[3].max(v[3]) {
        return false;
    }
    w[0] < v[0] && w[2] > u[2]
}

fn precedes(i: usize, j: usize, all: &[Extent], direction: ReadingDirection) -> bool {
    let (a, b) = (&all[i], &all[j]);
    if x_overlaps(a, b) {
        return a[1] < b[1];
    }
    let (left, right) = match direction {
        ReadingDirection::LeftToRight => (a, b),
        ReadingDirection::RightToLeft => (b, a),
    };
    if !left_of(left, right) {
        return false;
    }
    !all
        .iter()
        .enumerate()
        .any(|(k, w)| k != i && k != j && separates(w, left, right))
}

/// Depth-first topological sort visiting predecessors first.
///
/// Every node is emitted once; cycles are broken by the visited guard.
fn topsort(predecessors: &[Vec<usize>], roots: &[usize]) -> Vec<usize> {
    let mut visited = vec![false; predecessors.len()];
    let mut out = Vec::with_capacity(predecessors.len());
    // (node, next predecessor to look at)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for &root in roots {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push((root, 0));
        while let Some((node, cursor)) = stack.pop() {
            if let Some(&pred) = predecessors[node].get(cursor) {
                stack.push((node, cursor + 1));
                if !visited[pred] {
                    visited[pred] = true;
                    stack.push((pred, 0));
                }
            } else {
                out.push(node);
            }
        }
    }
    out
}

impl ReadingOrder for PolygonalReadingOrder {
    fn order(&self, lines: Vec<LineRecord>, direction: ReadingDirection) -> Vec<LineRecord> {
        let extents: Vec<Extent> = lines.iter().map(baseline_extent).collect();
        let order = Self::order_indices(&extents, direction);
        apply_order(lines, &order)
    }

    fn name(&self) -> &str {
        "polygonal"
    }
}

/// Recursive XY-cut over line bounding boxes.
///
/// The page is split into columns at vertical gaps first; blocks that cannot
/// be split that way are cut into rows at horizontal gaps, and every part is
/// cut again. Right-to-left reading mirrors the column order.
#[derive(Debug, Clone, Copy)]
pub struct XyCutReadingOrder {
    /// Minimum gap width in pixels to consider a separation.
    pub min_gap: f32,
}

impl Default for XyCutReadingOrder {
    fn default() -> Self {
        Self { min_gap: 1.0 }
    }
}

impl XyCutReadingOrder {
    /// Creates the policy with the given minimum gap.
    pub fn new(min_gap: f32) -> Self {
        Self { min_gap }
    }

    /// Ordered indices of `extents`.
    pub fn order_indices(&self, extents: &[Extent], direction: ReadingDirection) -> Vec<usize> {
        let mut result = Vec::with_capacity(extents.len());
        let indices: Vec<usize> = (0..extents.len()).collect();
        self.recursive_cut(extents, indices, direction, &mut result);
        result
    }

    fn recursive_cut(
        &self,
        extents: &[Extent],
        indices: Vec<usize>,
        direction: ReadingDirection,
        result: &mut Vec<usize>,
    ) {
        if indices.len() <= 1 {
            result.extend(indices);
            return;
        }

        let mut columns = split_by_gaps(extents, &indices, 0, self.min_gap);
        if columns.len() > 1 {
            if direction == ReadingDirection::RightToLeft {
                columns.reverse();
            }
            for column in columns {
                self.recursive_cut(extents, column, direction, result);
            }
            return;
        }

        let rows = split_by_gaps(extents, &indices, 1, self.min_gap);
        if rows.len() > 1 {
            for row in rows {
                self.recursive_cut(extents, row, direction, result);
            }
            return;
        }

        // Overlapping in both axes, fall back to scan order
        let local: Vec<Extent> = indices.iter().map(|&i| extents[i]).collect();
        result.extend(
            scan_order(&local, direction)
                .into_iter()
                .map(|k| indices[k]),
        );
    }
}

/// Groups `indices` into runs whose extents along `axis` (0 = x, 1 = y)
/// overlap or lie closer than `min_gap`. Groups come out in ascending order.
fn split_by_gaps(extents: &[Extent], indices: &[usize], axis: usize, min_gap: f32) -> Vec<Vec<usize>> {
    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| extents[a][axis].total_cmp(&extents[b][axis]));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut reach = f32::NEG_INFINITY;
    for idx in sorted {
        let (start, end) = (extents[idx][axis], extents[idx][axis + 2]);
        match groups.last_mut() {
            Some(group) if start - reach < min_gap => {
                group.push(idx);
                reach = reach.max(end);
            }
            _ => {
                groups.push(vec![idx]);
                reach = end;
            }
        }
    }
    groups
}

impl ReadingOrder for XyCutReadingOrder {
    fn order(&self, lines: Vec<LineRecord>, direction: ReadingDirection) -> Vec<LineRecord> {
        let extents: Vec<Extent> = lines.iter().map(line_extent).collect();
        let order = self.order_indices(&extents, direction);
        apply_order(lines, &order)
    }

    fn name(&self) -> &str {
        "xy-cut"
    }
}

/// Sorts lines by the top edge of their baseline, ties broken in reading direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopToBottomReadingOrder;

impl ReadingOrder for TopToBottomReadingOrder {
    fn order(&self, lines: Vec<LineRecord>, direction: ReadingDirection) -> Vec<LineRecord> {
        let extents: Vec<Extent> = lines.iter().map(baseline_extent).collect();
        let order = scan_order(&extents, direction);
        apply_order(lines, &order)
    }

    fn name(&self) -> &str {
        "top-to-bottom"
    }
}

/// Named reading order policies, for configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingOrderKind {
    /// [`PolygonalReadingOrder`]
    #[default]
    Polygonal,
    /// [`XyCutReadingOrder`] with the default gap
    XyCut,
    /// [`TopToBottomReadingOrder`]
    TopToBottom,
}

impl ReadingOrderKind {
    /// Instantiates the policy.
    pub fn build(&self) -> Box<dyn ReadingOrder> {
        match self {
            ReadingOrderKind::Polygonal => Box::new(PolygonalReadingOrder),
            ReadingOrderKind::XyCut => Box::new(XyCutReadingOrder::default()),
            ReadingOrderKind::TopToBottom => Box::new(TopToBottomReadingOrder),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::Point;

    fn line(x0: f32, x1: f32, y: f32) -> LineRecord {
        LineRecord::new(
            vec![Point::new(x0, y), Point::new(x1, y)],
            vec![
                Point::new(x0, y - 10.0),
                Point::new(x1, y - 10.0),
                Point::new(x1, y + 3.0),
                Point::new(x0, y + 3.0),
            ],
        )
    }

    fn ys_and_xs(lines: &[LineRecord]) -> Vec<(f32, f32)> {
        lines.iter().map(|l| (l.baseline[0].x, l.baseline[0].y)).collect()
    }

    /// Two columns of three lines each, fed in scrambled order.
    fn two_columns() -> Vec<LineRecord> {
        vec![
            line(110.0, 190.0, 60.0),
            line(10.0, 90.0, 20.0),
            line(10.0, 90.0, 100.0),
            line(110.0, 190.0, 20.0),
            line(10.0, 90.0, 60.0),
            line(110.0, 190.0, 100.0),
        ]
    }

    fn assert_permutation(input: &[LineRecord], output: &[LineRecord]) {
        assert_eq!(input.len(), output.len());
        for l in input {
            assert_eq!(output.iter().filter(|o| *o == l).count(), 1);
        }
    }

    #[test]
    fn test_polygonal_column_order() {
        let input = two_columns();
        let ordered = PolygonalReadingOrder.order(input.clone(), ReadingDirection::LeftToRight);
        assert_permutation(&input, &ordered);
        assert_eq!(
            ys_and_xs(&ordered),
            vec![
                (10.0, 20.0),
                (10.0, 60.0),
                (10.0, 100.0),
                (110.0, 20.0),
                (110.0, 60.0),
                (110.0, 100.0)
            ]
        );
    }

    #[test]
    fn test_polygonal_right_to_left_columns() {
        let ordered = PolygonalReadingOrder.order(two_columns(), ReadingDirection::RightToLeft);
        let xs: Vec<f32> = ordered.iter().map(|l| l.baseline[0].x).collect();
        assert_eq!(xs, vec![110.0, 110.0, 110.0, 10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_polygonal_separator_line_blocks_column_jump() {
        // heading spanning both columns sits between the upper and lower blocks
        let input = vec![
            line(10.0, 90.0, 20.0),
            line(110.0, 190.0, 20.0),
            line(10.0, 190.0, 60.0),
            line(10.0, 90.0, 100.0),
            line(110.0, 190.0, 100.0),
        ];
        let ordered = PolygonalReadingOrder.order(input.clone(), ReadingDirection::LeftToRight);
        assert_permutation(&input, &ordered);
        assert_eq!(ordered[0], input[0]);
        assert_eq!(ordered[2], input[2]);
        assert_eq!(ordered[3], input[3]);
    }

    #[test]
    fn test_xycut_columns() {
        let input = two_columns();
        let ordered = XyCutReadingOrder::default().order(input.clone(), ReadingDirection::LeftToRight);
        assert_permutation(&input, &ordered);
        let xs: Vec<f32> = ordered.iter().map(|l| l.baseline[0].x).collect();
        assert_eq!(xs, vec![10.0, 10.0, 10.0, 110.0, 110.0, 110.0]);
        let ys: Vec<f32> = ordered.iter().map(|l| l.baseline[0].y).collect();
        assert_eq!(ys, vec![20.0, 60.0, 100.0, 20.0, 60.0, 100.0]);
    }

    #[test]
    fn test_top_to_bottom_ties() {
        let input = vec![line(110.0, 190.0, 20.0), line(10.0, 90.0, 20.0), line(10.0, 90.0, 5.0)];
        let ltr = TopToBottomReadingOrder.order(input.clone(), ReadingDirection::LeftToRight);
        assert_eq!(ys_and_xs(&ltr), vec![(10.0, 5.0), (10.0, 20.0), (110.0, 20.0)]);
        let rtl = TopToBottomReadingOrder.order(input, ReadingDirection::RightToLeft);
        assert_eq!(ys_and_xs(&rtl), vec![(10.0, 5.0), (110.0, 20.0), (10.0, 20.0)]);
    }

    #[test]
    fn test_totality_on_degenerate_input() {
        // identical lines create mutual precedence cycles
        let input = vec![line(0.0, 10.0, 5.0); 4]
            .into_iter()
            .chain([line(3.0, 4.0, 5.0), LineRecord::new(vec![Point::new(1.0, 1.0); 2], vec![])])
            .collect_vec();
        for policy in [
            Box::new(PolygonalReadingOrder) as Box<dyn ReadingOrder>,
            Box::new(XyCutReadingOrder::default()),
            Box::new(TopToBottomReadingOrder),
        ] {
            let ordered = policy.order(input.clone(), ReadingDirection::LeftToRight);
            assert_eq!(ordered.len(), input.len(), "{} lost lines", policy.name());
        }
        assert!(PolygonalReadingOrder.order(Vec::new(), ReadingDirection::LeftToRight).is_empty());
    }

    #[test]
    fn test_kind_builds_named_policy() {
        let kind: ReadingOrderKind = serde_json::from_str("\"xy-cut\"").unwrap();
        assert_eq!(kind.build().name(), "xy-cut");
        assert_eq!(ReadingOrderKind::default().build().name(), "polygonal");
    }
}
