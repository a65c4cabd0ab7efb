use fxhash::{FxBuildHasher, FxHashSet};
/// This module implements a variant of
/// [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
/// with a fully deterministic open set: entries are ordered by estimated
/// total cost, then cost so far, then cell position, so equal-cost routes
/// always resolve the same way.
use grid_util::point::Point;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct OpenEntry<C> {
    estimated_cost: C,
    cost: C,
    coord: Point,
    index: usize,
}

impl<C: PartialEq> PartialEq for OpenEntry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost.eq(&other.estimated_cost)
            && self.cost.eq(&other.cost)
            && self.coord == other.coord
    }
}

impl<C: PartialEq> Eq for OpenEntry<C> {}

impl<C: Ord> PartialOrd for OpenEntry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Ord> Ord for OpenEntry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the entry with the lowest estimated
        // total cost, breaking ties toward the lowest cost so far and finally
        // the lowest (row, column) position.
        other
            .estimated_cost
            .cmp(&self.estimated_cost)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| (other.coord.y, other.coord.x).cmp(&(self.coord.y, self.coord.x)))
    }
}

fn reverse_path<V, F>(parents: &FxIndexMap<Point, V>, mut parent: F, start: usize) -> Vec<Point>
where
    F: FnMut(&V) -> usize,
{
    let mut path: Vec<Point> = itertools::unfold(start, |i| {
        parents.get_index(*i).map(|(node, value)| {
            *i = parent(value);
            *node
        })
    })
    .collect();
    path.reverse();
    path
}

/// Searches from `start` until `success` holds for a popped cell, expanding
/// cells through `successors` and steering the open set with `heuristic`.
/// On success returns the cells from `start` through the successful cell
/// together with the accumulated cost; returns [None] once the open set runs
/// dry.
pub(crate) fn astar_search<C, FN, IN, FH, FS>(
    start: &Point,
    mut successors: FN,
    mut heuristic: FH,
    mut success: FS,
) -> Option<(Vec<Point>, C)>
where
    C: Zero + Ord + Copy,
    FN: FnMut(&Point) -> IN,
    IN: IntoIterator<Item = (Point, C)>,
    FH: FnMut(&Point) -> C,
    FS: FnMut(&Point) -> bool,
{
    let mut to_see = BinaryHeap::new();
    to_see.push(OpenEntry {
        estimated_cost: heuristic(start),
        cost: Zero::zero(),
        coord: *start,
        index: 0,
    });
    let mut parents: FxIndexMap<Point, (usize, C)> = FxIndexMap::default();
    parents.insert(*start, (usize::MAX, Zero::zero()));
    let mut closed: FxHashSet<Point> = FxHashSet::default();
    while let Some(OpenEntry {
        cost, coord, index, ..
    }) = to_see.pop()
    {
        if success(&coord) {
            let path = reverse_path(&parents, |&(p, _)| p, index);
            return Some((path, cost));
        }
        // A cell is re-pushed whenever it is relaxed, so the heap may hold
        // several entries for it; only the first pop finalizes the cell.
        if !closed.insert(coord) {
            continue;
        }
        for (successor, move_cost) in successors(&coord) {
            if closed.contains(&successor) {
                continue;
            }
            let new_cost = cost + move_cost;
            let h; // heuristic(&successor)
            let n; // index for successor
            match parents.entry(successor) {
                Vacant(e) => {
                    h = heuristic(e.key());
                    n = e.index();
                    e.insert((index, new_cost));
                }
                Occupied(mut e) => {
                    if e.get().1 > new_cost {
                        h = heuristic(e.key());
                        n = e.index();
                        e.insert((index, new_cost));
                    } else {
                        continue;
                    }
                }
            }

            to_see.push(OpenEntry {
                estimated_cost: new_cost + h,
                cost: new_cost,
                coord: successor,
                index: n,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manhattan(a: &Point, b: &Point) -> i32 {
        (a.x - b.x).abs() + (a.y - b.y).abs()
    }

    fn open_3x3_successors(node: &Point) -> Vec<(Point, i32)> {
        let mut successors = Vec::new();
        for (dx, dy) in [
            (0, -1),
            (0, 1),
            (-1, 0),
            (1, 0),
            (-1, -1),
            (1, -1),
            (-1, 1),
            (1, 1),
        ] {
            let n = Point::new(node.x + dx, node.y + dy);
            if (0..3).contains(&n.x) && (0..3).contains(&n.y) {
                successors.push((n, 1));
            }
        }
        successors
    }

    #[test]
    fn straight_line_search_is_deterministic() {
        let start = Point::new(0, 0);
        let goal = Point::new(2, 0);
        let (path, cost) = astar_search(
            &start,
            open_3x3_successors,
            |p| manhattan(p, &goal),
            |p| *p == goal,
        )
        .unwrap();
        assert_eq!(cost, 2);
        assert_eq!(
            path,
            vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)]
        );
    }

    #[test]
    fn search_from_goal_returns_the_start_alone() {
        let start = Point::new(1, 1);
        let (path, cost) = astar_search(
            &start,
            open_3x3_successors,
            |p| manhattan(p, &start),
            |p| *p == start,
        )
        .unwrap();
        assert_eq!(cost, 0);
        assert_eq!(path, vec![start]);
    }

    #[test]
    fn exhausted_open_set_returns_none() {
        let start = Point::new(0, 0);
        let result = astar_search(
            &start,
            |_: &Point| Vec::<(Point, i32)>::new(),
            |_| 0,
            |_| false,
        );
        assert!(result.is_none());
    }
}
