//! # grid_treasure_hunt
//!
//! A turn-based treasure hunt on a randomly generated occupancy grid. A
//! human explorer and a computer seeker alternate moves on an 8-connected
//! grid, racing toward a treasure cell; the seeker follows a route computed
//! once at session start by a heuristic-guided best-first search
//! ([A*](https://en.wikipedia.org/wiki/A*_search_algorithm) with a Manhattan
//! heuristic and uniform step cost). Pre-computes
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! to avoid flood-filling behaviour if no route exists.
mod astar;
pub mod game;

use grid_util::grid::{BoolGrid, Grid};
use grid_util::point::Point;
use log::info;
use petgraph::unionfind::UnionFind;
use rand::Rng;
use thiserror::Error;

use crate::astar::astar_search;
use core::fmt;

/// Dimensions and fill rate for a randomly generated [TerrainGrid]. The
/// defaults match the classic board: 10x10 with a 20% chance of rubble per
/// cell. `block_chance` must lie in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub block_chance: f64,
}

impl Default for GridConfig {
    fn default() -> GridConfig {
        GridConfig {
            width: 10,
            height: 10,
            block_chance: 0.2,
        }
    }
}

/// Errors raised for coordinates that do not lie on the grid. Coordinates
/// are never clamped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("coordinate ({x}, {y}) is out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
}

/// Expansion order for the 8-neighbourhood as `(dx, dy)` offsets: up, down,
/// left, right, then the four diagonals. Relaxation keeps the first
/// predecessor found at equal cost, so this order is part of what makes
/// routes deterministic.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Sum of the absolute row and column differences between two cells.
fn manhattan_distance(a: &Point, b: &Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// [TerrainGrid] holds the static walkability map of a session: raw [bool]
/// grid values in the [BoolGrid] determine whether a cell is blocked
/// ([true]) or open ([false]). It also maintains information about connected
/// components using a [UnionFind] structure, so that route queries between
/// cells in different components can be rejected without running a search.
/// Implements [Grid] by building on [BoolGrid].
///
/// The grid of a running session is effectively immutable: cells are drawn
/// once, the starting cells are forced open during setup, and no cell
/// changes afterwards.
#[derive(Clone, Debug)]
pub struct TerrainGrid {
    pub grid: BoolGrid,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl TerrainGrid {
    /// Draws each cell independently: blocked with probability
    /// `config.block_chance`, open otherwise. Components are left dirty and
    /// are regenerated on the first [update](Self::update).
    pub fn random<R: Rng>(config: &GridConfig, rng: &mut R) -> TerrainGrid {
        let mut terrain = TerrainGrid::new(config.width, config.height, false);
        for x in 0..config.width {
            for y in 0..config.height {
                terrain.grid.set(x, y, rng.gen_bool(config.block_chance));
            }
        }
        terrain
    }

    /// Forces the given cells open regardless of what the random draw
    /// produced. The starting cells of a session go through here so that no
    /// token ever begins inside rubble. Cells off the grid are rejected.
    pub fn force_walkable(&mut self, cells: &[Point]) -> Result<(), GridError> {
        for cell in cells {
            self.check_bounds(*cell)?;
            self.set(cell.x as usize, cell.y as usize, false);
        }
        Ok(())
    }

    /// Whether `pos` lies on the grid and is open. Out-of-bounds positions
    /// are not walkable rather than an error.
    pub fn can_move_to(&self, pos: Point) -> bool {
        self.in_bounds(pos.x, pos.y) && !self.grid.get(pos.x as usize, pos.y as usize)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && self.grid.index_in_bounds(x as usize, y as usize)
    }

    fn check_bounds(&self, p: Point) -> Result<(), GridError> {
        if self.in_bounds(p.x, p.y) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                x: p.x,
                y: p.y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    fn cell_ix(&self, point: &Point) -> usize {
        self.grid.get_ix(point.x as usize, point.y as usize)
    }

    fn pathfinding_neighborhood(&self, pos: &Point) -> Vec<(Point, i32)> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(|&(dx, dy)| Point::new(pos.x + dx, pos.y + dy))
            .filter(|&n| self.can_move_to(n))
            .map(|n| (n, 1))
            .collect::<Vec<_>>()
    }

    /// Checks if start and goal are in different components. Out-of-bounds
    /// cells belong to no component.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        if self.in_bounds(start.x, start.y) && self.in_bounds(goal.x, goal.y) {
            !self.components.equiv(self.cell_ix(start), self.cell_ix(goal))
        } else {
            true
        }
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up grid neighbours to
    /// the same components. Unions the forward half of the 8-neighbourhood
    /// so each undirected edge is visited from exactly one endpoint; corner
    /// cutting is allowed, matching the movement model.
    pub fn generate_components(&mut self) {
        info!("Generating connected components");
        let w = self.grid.width;
        let h = self.grid.height;
        self.components = UnionFind::new(w * h);
        self.components_dirty = false;
        for x in 0..w as i32 {
            for y in 0..h as i32 {
                let point = Point::new(x, y);
                if !self.can_move_to(point) {
                    continue;
                }
                let parent_ix = self.cell_ix(&point);
                for neighbour in [
                    Point::new(x + 1, y),
                    Point::new(x, y + 1),
                    Point::new(x + 1, y + 1),
                    Point::new(x + 1, y - 1),
                ] {
                    if self.can_move_to(neighbour) {
                        self.components.union(parent_ix, self.cell_ix(&neighbour));
                    }
                }
            }
        }
    }

    /// Computes the route from `start` to `goal`, moving one cell per step
    /// in any of the 8 directions with uniform step cost. The heuristic used
    /// is the Manhattan distance, which overestimates the remaining cost of
    /// diagonal movement, so the route is not always minimal in step count.
    ///
    /// On success the returned steps run strictly after `start` up to and
    /// including `goal`; when `start` equals `goal` the route is empty. A
    /// goal that cannot be reached yields `Ok(None)`, never a partial route.
    /// Endpoints off the grid are rejected with [GridError::OutOfBounds].
    pub fn find_path(&self, start: Point, goal: Point) -> Result<Option<Vec<Point>>, GridError> {
        self.check_bounds(start)?;
        self.check_bounds(goal)?;
        if start == goal {
            return Ok(Some(Vec::new()));
        }
        // The component rejection is only trusted while components are
        // clean; on a dirty map the search itself decides.
        if !self.components_dirty && self.unreachable(&start, &goal) {
            info!("{} is not reachable from {}", goal, start);
            return Ok(None);
        }
        let result = astar_search(
            &start,
            |node| self.pathfinding_neighborhood(node),
            |point| manhattan_distance(point, &goal),
            |point| *point == goal,
        );
        if result.is_none() {
            info!("Open set exhausted without reaching {}", goal);
        }
        Ok(result.map(|(nodes, _cost)| nodes.into_iter().skip(1).collect()))
    }
}

impl fmt::Display for TerrainGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.grid.height {
            for x in 0..self.grid.width {
                write!(f, "{}", if self.grid.get(x, y) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Grid<bool> for TerrainGrid {
    fn new(width: usize, height: usize, default_value: bool) -> Self {
        TerrainGrid {
            grid: BoolGrid::new(width, height, default_value),
            components: UnionFind::new(width * height),
            // A fresh UnionFind holds only singletons, which is wrong for
            // any grid with adjacent open cells, so start dirty.
            components_dirty: true,
        }
    }
    fn get(&self, x: usize, y: usize) -> bool {
        self.grid.get(x, y)
    }
    /// Updates a cell. Joins newly connected components when a cell opens
    /// and flags the components as dirty when a cell is blocked, since
    /// blocking may break a component apart.
    fn set(&mut self, x: usize, y: usize, blocked: bool) {
        if blocked {
            if !self.grid.get(x, y) {
                self.components_dirty = true;
            }
        } else {
            let p = Point::new(x as i32, y as i32);
            let p_ix = self.grid.get_ix(x, y);
            for (dx, dy) in NEIGHBOUR_OFFSETS {
                let neighbour = Point::new(p.x + dx, p.y + dy);
                if self.can_move_to(neighbour) {
                    self.components.union(p_ix, self.cell_ix(&neighbour));
                }
            }
        }
        self.grid.set(x, y, blocked);
    }
    fn width(&self) -> usize {
        self.grid.width()
    }
    fn height(&self) -> usize {
        self.grid.height()
    }
}
