//! Dijkstra single-source shortest path on the occupancy grid.
//!
//! Movement is 4-connected with uniform step cost 1; diagonal steps exist
//! as robot movement primitives but are never planned. Distance and parent
//! arrays are flat `W*H` vectors allocated per invocation, and the frontier
//! is a binary min-heap with stale-entry skipping: an entry whose cost no
//! longer matches the recorded best distance is discarded on pop.

use crate::core::GridPoint;
use crate::grid::OccupancyGrid;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Observations emitted while the search runs; the navigator forwards them
/// to the event sink.
pub(crate) enum SearchStep {
    /// Node popped from the frontier. `parent` is (-1,-1) for the source.
    Expand {
        node: GridPoint,
        cost: i32,
        parent: GridPoint,
    },
    /// Neighbor relaxed to a strictly lower cost and enqueued.
    Push { node: GridPoint, cost: i32 },
}

#[derive(PartialEq, Eq)]
struct FrontierNode {
    cost: i32,
    point: GridPoint,
}

// Reversed on cost for min-heap behavior; ties ordered by coordinates so
// the heap is deterministic.
impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.point.x.cmp(&self.point.x))
            .then_with(|| other.point.y.cmp(&self.point.y))
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `start` to `goal`, inclusive of both endpoints.
///
/// `start == goal` yields the single-cell path. Returns `None` when either
/// endpoint is unusable or no path exists.
pub fn shortest_path(
    grid: &OccupancyGrid,
    start: GridPoint,
    goal: GridPoint,
) -> Option<Vec<GridPoint>> {
    search(grid, start, goal, |_| {})
}

/// Search core shared by the cost query and the navigator.
pub(crate) fn search(
    grid: &OccupancyGrid,
    start: GridPoint,
    goal: GridPoint,
    mut observe: impl FnMut(SearchStep),
) -> Option<Vec<GridPoint>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !grid.is_valid_position(goal.x, goal.y) {
        return None;
    }
    if !grid.is_accessible_point(goal) || !grid.is_accessible_point(start) {
        return None;
    }

    let width = grid.width();
    let total = grid.cell_count();
    let index_of = |p: GridPoint| p.y as usize * width + p.x as usize;
    let point_of = |idx: usize| GridPoint::new((idx % width) as i32, (idx / width) as i32);

    let mut dist = vec![i32::MAX; total];
    let mut prev = vec![-1i64; total];

    let mut frontier = BinaryHeap::new();
    dist[index_of(start)] = 0;
    frontier.push(FrontierNode { cost: 0, point: start });

    while let Some(FrontierNode { cost, point }) = frontier.pop() {
        let idx = index_of(point);
        let parent = match prev[idx] {
            -1 => GridPoint::new(-1, -1),
            p => point_of(p as usize),
        };
        observe(SearchStep::Expand { node: point, cost, parent });

        if point == goal {
            break;
        }
        if cost != dist[idx] {
            // Stale frontier entry; a cheaper route was already settled.
            continue;
        }

        for neighbor in point.neighbors_4() {
            if !grid.is_accessible_point(neighbor) {
                continue;
            }
            let n_idx = index_of(neighbor);
            let n_cost = cost + 1;
            if n_cost < dist[n_idx] {
                dist[n_idx] = n_cost;
                prev[n_idx] = idx as i64;
                frontier.push(FrontierNode { cost: n_cost, point: neighbor });
                observe(SearchStep::Push { node: neighbor, cost: n_cost });
            }
        }
    }

    // Reconstruct by walking parents back from the goal.
    let goal_idx = index_of(goal);
    if prev[goal_idx] == -1 {
        return None;
    }
    let mut path = Vec::new();
    let mut at = goal_idx as i64;
    while at != -1 {
        path.push(point_of(at as usize));
        at = prev[at as usize];
    }
    path.reverse();
    Some(path)
}
