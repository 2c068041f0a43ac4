//! Blob topology: grid cells → closed counter-clockwise outline + spring graph.
//!
//! Steps:
//! 1. keep the largest 4-connected component (disconnected input is a caller
//!    error; the remainder is dropped and logged)
//! 2. fill interior cavities so only the outer loop exists
//! 3. collect directed boundary edges (edges shared by two cells cancel)
//! 4. trace them into one loop, normalise winding to positive area
//! 5. map grid corners to pixels and emit edge, bend, and home springs

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use glam::Vec2;

use crate::api::types::GridCell;
use crate::core::blob::{Spring, SpringKind};
use crate::core::vector;

/// Stiffness multiplier of the skip-one diagonals relative to outline edges.
const BEND_STIFFNESS: f32 = 0.5;

type Corner = (i32, i32);

/// Output of the builder, consumed by [`crate::core::blob::SoftBlob::new`].
#[derive(Debug, Clone)]
pub struct BlobTopology {
    /// Home positions in physics pixels, counter-clockwise.
    pub homes: Vec<Vec2>,
    pub springs: Vec<Spring>,
    /// The cells actually used (largest component, before cavity fill).
    pub cells: Vec<GridCell>,
    /// Signed area of the home loop (always positive).
    pub area: f32,
}

/// Build the topology for a set of cells sharing one identity.
///
/// Never fails: empty input yields a single cell at the grid origin, and a
/// disconnected set yields its largest component.
pub fn build_topology(cells: &[GridCell], cell_size: f32, origin: Vec2) -> BlobTopology {
    let mut set: BTreeSet<GridCell> = cells.iter().copied().collect();
    if set.is_empty() {
        log::warn!("topology: empty cell set, using a single cell");
        set.insert(GridCell::new(0, 0));
    }

    let component = largest_component(&set);
    if component.len() < set.len() {
        log::warn!(
            "topology: disconnected cell set ({} cells), keeping largest component of {}",
            set.len(),
            component.len()
        );
    }

    let filled = fill_cavities(&component);
    let edges = boundary_edges(&filled);
    let outline = trace_outer_loop(edges);

    let mut homes: Vec<Vec2> = outline
        .iter()
        .map(|&(x, y)| origin + Vec2::new(x as f32, y as f32) * cell_size)
        .collect();
    let mut area = vector::signed_area(&homes);
    if area < 0.0 {
        homes.reverse();
        area = -area;
    }

    let springs = build_springs(&homes);
    BlobTopology {
        homes,
        springs,
        cells: component.into_iter().collect(),
        area,
    }
}

fn largest_component(set: &BTreeSet<GridCell>) -> BTreeSet<GridCell> {
    let mut seen: HashSet<GridCell> = HashSet::with_capacity(set.len());
    let mut best: BTreeSet<GridCell> = BTreeSet::new();

    // BTreeSet iteration keeps the tie-break deterministic.
    for &start in set {
        if seen.contains(&start) {
            continue;
        }
        let mut component = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(cell) = queue.pop_front() {
            component.insert(cell);
            for n in cell.neighbors() {
                if set.contains(&n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        if component.len() > best.len() {
            best = component;
        }
    }
    best
}

/// Flood the empty space from outside the bounding box; any empty cell the
/// flood cannot reach is a cavity and gets filled.
fn fill_cavities(cells: &BTreeSet<GridCell>) -> BTreeSet<GridCell> {
    let (min_x, max_x, min_y, max_y) = cells.iter().fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(x0, x1, y0, y1), c| (x0.min(c.x), x1.max(c.x), y0.min(c.y), y1.max(c.y)),
    );
    let (min_x, max_x, min_y, max_y) = (min_x - 1, max_x + 1, min_y - 1, max_y + 1);
    let in_box = |c: GridCell| c.x >= min_x && c.x <= max_x && c.y >= min_y && c.y <= max_y;

    let mut outside: HashSet<GridCell> = HashSet::new();
    let start = GridCell::new(min_x, min_y);
    let mut queue = VecDeque::from([start]);
    outside.insert(start);
    while let Some(cell) = queue.pop_front() {
        for n in cell.neighbors() {
            if in_box(n) && !cells.contains(&n) && outside.insert(n) {
                queue.push_back(n);
            }
        }
    }

    let mut filled = cells.clone();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let c = GridCell::new(x, y);
            if !outside.contains(&c) && !cells.contains(&c) {
                filled.insert(c);
            }
        }
    }
    filled
}

/// Directed unit edges not shared with another cell of the set, oriented so
/// the outer loop has positive signed area.
fn boundary_edges(cells: &BTreeSet<GridCell>) -> BTreeMap<Corner, Corner> {
    let mut edges = BTreeMap::new();
    for &c in cells {
        let (x, y) = (c.x, c.y);
        let sides = [
            (c.offset(0, -1), (x, y), (x + 1, y)),
            (c.offset(1, 0), (x + 1, y), (x + 1, y + 1)),
            (c.offset(0, 1), (x + 1, y + 1), (x, y + 1)),
            (c.offset(-1, 0), (x, y + 1), (x, y)),
        ];
        for (neighbor, from, to) in sides {
            if !cells.contains(&neighbor) {
                edges.insert(from, to);
            }
        }
    }
    edges
}

/// Trace every loop in the edge map and keep the one enclosing the most area.
fn trace_outer_loop(mut edges: BTreeMap<Corner, Corner>) -> Vec<Corner> {
    let mut best: Vec<Corner> = Vec::new();
    let mut best_area = f32::NEG_INFINITY;

    loop {
        let Some(start) = edges.keys().min_by_key(|c| (c.1, c.0)).copied() else {
            break;
        };
        let mut outline = Vec::new();
        let mut cur = start;
        let limit = edges.len();
        while let Some(next) = edges.remove(&cur) {
            outline.push(cur);
            cur = next;
            if cur == start || outline.len() > limit {
                break;
            }
        }
        let pts: Vec<Vec2> = outline.iter().map(|&(x, y)| Vec2::new(x as f32, y as f32)).collect();
        let area = vector::signed_area(&pts).abs();
        if area > best_area {
            best_area = area;
            best = outline;
        }
    }
    best
}

fn build_springs(homes: &[Vec2]) -> Vec<Spring> {
    let n = homes.len();
    let mut springs = Vec::with_capacity(n * 3);
    let mut pairs: HashSet<(usize, usize)> = HashSet::new();
    let mut push = |springs: &mut Vec<Spring>, a: usize, b: usize, stiffness: f32| {
        let key = (a.min(b), a.max(b));
        if a != b && pairs.insert(key) {
            springs.push(Spring {
                a,
                b,
                rest_length: homes[a].distance(homes[b]),
                kind: SpringKind::Structural,
                stiffness,
            });
        }
    };

    for i in 0..n {
        push(&mut springs, i, (i + 1) % n, 1.0);
    }
    if n > 3 {
        for i in 0..n {
            push(&mut springs, i, (i + 2) % n, BEND_STIFFNESS);
        }
    }
    for i in 0..n {
        springs.push(Spring {
            a: i,
            b: i,
            rest_length: 0.0,
            kind: SpringKind::Home,
            stiffness: 1.0,
        });
    }
    springs
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: f32 = 30.0;

    fn cells(list: &[(i32, i32)]) -> Vec<GridCell> {
        list.iter().map(|&(x, y)| GridCell::new(x, y)).collect()
    }

    #[test]
    fn single_cell_is_ccw_square() {
        let t = build_topology(&cells(&[(0, 0)]), S, Vec2::ZERO);
        assert_eq!(t.homes.len(), 4);
        assert!((t.area - S * S).abs() < 1e-3);
        assert!(vector::signed_area(&t.homes) > 0.0);
        for corner in [Vec2::ZERO, Vec2::new(S, 0.0), Vec2::new(S, S), Vec2::new(0.0, S)] {
            assert!(t.homes.iter().any(|h| (*h - corner).length() < 1e-4), "missing {:?}", corner);
        }
        for i in 0..4 {
            let side = t.homes[i].distance(t.homes[(i + 1) % 4]);
            assert!((side - S).abs() < 1e-4);
        }
    }

    #[test]
    fn single_cell_springs() {
        let t = build_topology(&cells(&[(0, 0)]), S, Vec2::ZERO);
        // 4 edges + 2 diagonals (the other two skip-one pairs are duplicates).
        let structural = t.springs.iter().filter(|s| s.kind == SpringKind::Structural).count();
        assert_eq!(structural, 6);
        assert_eq!(t.springs.len(), 6 + 4);
        let diag = t.springs.iter().find(|s| s.stiffness == BEND_STIFFNESS).unwrap();
        assert!((diag.rest_length - S * 2f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn l_shape_has_only_boundary_edges() {
        let t = build_topology(&cells(&[(0, 0), (0, 1), (1, 1)]), S, Vec2::ZERO);
        // 3 cells * 4 edges - 2 shared edges * 2 sides = 8.
        assert_eq!(t.homes.len(), 8);
        assert!((t.area - 3.0 * S * S).abs() < 1e-2);
        // Consecutive homes are exactly one cell apart: no internal edge leaked.
        for i in 0..t.homes.len() {
            let d = t.homes[i].distance(t.homes[(i + 1) % t.homes.len()]);
            assert!((d - S).abs() < 1e-4);
        }
    }

    #[test]
    fn winding_independent_of_enumeration_order() {
        let a = build_topology(&cells(&[(0, 0), (1, 0), (1, 1), (2, 1)]), S, Vec2::ZERO);
        let b = build_topology(&cells(&[(2, 1), (1, 1), (0, 0), (1, 0)]), S, Vec2::ZERO);
        assert!(vector::signed_area(&a.homes) > 0.0);
        assert!(vector::signed_area(&b.homes) > 0.0);
        assert_eq!(a.homes, b.homes);
    }

    #[test]
    fn origin_offset_applies() {
        let t = build_topology(&cells(&[(2, 3)]), 10.0, Vec2::new(5.0, 7.0));
        let min = t.homes.iter().fold(Vec2::splat(f32::MAX), |m, h| m.min(*h));
        assert_eq!(min, Vec2::new(25.0, 37.0));
    }

    #[test]
    fn empty_input_yields_unit_loop() {
        let t = build_topology(&[], S, Vec2::ZERO);
        assert_eq!(t.homes.len(), 4);
        assert_eq!(t.cells, cells(&[(0, 0)]));
    }

    #[test]
    fn disconnected_keeps_largest_component() {
        let t = build_topology(&cells(&[(0, 0), (5, 5), (5, 6), (6, 6)]), S, Vec2::ZERO);
        assert_eq!(t.cells.len(), 3);
        assert!(!t.cells.contains(&GridCell::new(0, 0)));
        assert_eq!(t.homes.len(), 8);
    }

    #[test]
    fn diagonal_touch_is_disconnected() {
        let t = build_topology(&cells(&[(0, 0), (1, 1)]), S, Vec2::ZERO);
        assert_eq!(t.cells.len(), 1);
        assert_eq!(t.homes.len(), 4);
    }

    #[test]
    fn ring_traces_outer_loop_only() {
        let ring: Vec<(i32, i32)> = (0..3)
            .flat_map(|y| (0..3).map(move |x| (x, y)))
            .filter(|&(x, y)| !(x == 1 && y == 1))
            .collect();
        let t = build_topology(&cells(&ring), S, Vec2::ZERO);
        assert_eq!(t.homes.len(), 12);
        assert!((t.area - 9.0 * S * S).abs() < 1e-2);
        assert_eq!(t.cells.len(), 8);
    }

    #[test]
    fn duplicate_cells_are_ignored() {
        let t = build_topology(&cells(&[(0, 0), (0, 0), (1, 0)]), S, Vec2::ZERO);
        assert_eq!(t.homes.len(), 6);
        assert_eq!(t.cells.len(), 2);
    }
}
