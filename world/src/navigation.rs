//! A* route search over the game grid.

use star_forge_core::{CellCoord, CellKind};

use crate::grid::GridModel;

/// Searches for the shortest four-directional route from `start` to `goal`.
///
/// Only wall cells obstruct; crystals, the portal and the orb itself are
/// traversable. The returned route excludes `start` and ends with `goal`.
/// `None` is returned when the goal is a wall, lies off the board, or cannot
/// be reached.
///
/// The open list is scanned linearly and the first node with the strictly
/// smallest `f` wins, while neighbours are expanded up, right, down, left.
/// Together these fix the tie-breaking so equal-cost routes are reproducible.
#[must_use]
pub fn find_path(grid: &GridModel, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
    if is_blocked(grid, goal) {
        return None;
    }

    let mut nodes = vec![Node {
        cell: start,
        g: 0,
        f: start.manhattan_distance(goal),
        parent: None,
    }];
    let mut open: Vec<usize> = vec![0];
    let mut closed: Vec<CellCoord> = Vec::new();

    while !open.is_empty() {
        let mut best = 0;
        for (position, &candidate) in open.iter().enumerate() {
            if nodes[candidate].f < nodes[open[best]].f {
                best = position;
            }
        }

        let current = open[best];
        let current_cell = nodes[current].cell;
        if current_cell == goal {
            return Some(trace_route(&nodes, current));
        }

        let _ = open.remove(best);
        closed.push(current_cell);

        let size = grid.size();
        for neighbor in neighbors(current_cell, size, size) {
            if is_blocked(grid, neighbor) || closed.contains(&neighbor) {
                continue;
            }

            let g = nodes[current].g + 1;
            let candidate = Node {
                cell: neighbor,
                g,
                f: g + neighbor.manhattan_distance(goal),
                parent: Some(current),
            };

            let queued = open
                .iter()
                .position(|&index| nodes[index].cell == neighbor);
            match queued {
                Some(position) => {
                    if nodes[open[position]].g <= g {
                        continue;
                    }
                    nodes.push(candidate);
                    open[position] = nodes.len() - 1;
                }
                None => {
                    nodes.push(candidate);
                    open.push(nodes.len() - 1);
                }
            }
        }
    }

    None
}

/// Picks where a player on `start` should stop when walking toward the distant `target`.
///
/// The farthest empty cell on the route to `target` wins. When that route
/// only crosses tokens, the empty neighbour of `target` with the shortest
/// route is used instead, neighbours tried up, right, down, left.
pub(crate) fn approach_stop(
    grid: &GridModel,
    start: CellCoord,
    target: CellCoord,
) -> Option<CellCoord> {
    let route = find_path(grid, start, target)?;
    let on_route = route
        .iter()
        .rev()
        .skip(1)
        .copied()
        .find(|cell| is_free(grid, *cell));
    if on_route.is_some() {
        return on_route;
    }

    let size = grid.size();
    let mut best: Option<(usize, CellCoord)> = None;
    for neighbor in neighbors(target, size, size) {
        if !is_free(grid, neighbor) {
            continue;
        }
        let Some(route) = find_path(grid, start, neighbor) else {
            continue;
        };
        if best.map_or(true, |(length, _)| route.len() < length) {
            best = Some((route.len(), neighbor));
        }
    }
    best.map(|(_, cell)| cell)
}

#[derive(Clone, Copy, Debug)]
struct Node {
    cell: CellCoord,
    g: u32,
    f: u32,
    parent: Option<usize>,
}

fn trace_route(nodes: &[Node], goal: usize) -> Vec<CellCoord> {
    let mut route = Vec::new();
    let mut cursor = Some(goal);
    while let Some(index) = cursor {
        let node = nodes[index];
        if node.parent.is_none() {
            break;
        }
        route.push(node.cell);
        cursor = node.parent;
    }
    route.reverse();
    route
}

fn is_blocked(grid: &GridModel, cell: CellCoord) -> bool {
    grid.get(cell).map_or(true, |kind| kind.is_obstacle())
}

fn is_free(grid: &GridModel, cell: CellCoord) -> bool {
    grid.get(cell) == Ok(CellKind::Empty)
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_forge_core::StageDefinition;

    fn grid(rows: &[&str]) -> GridModel {
        GridModel::from_stage(
            &StageDefinition::from_rows("nav", 20, 1, rows, Vec::new()).expect("valid stage"),
        )
    }

    #[test]
    fn open_board_route_length_matches_manhattan_distance() {
        let grid = grid(&["O....", ".....", ".....", ".....", "C...P"]);
        let start = CellCoord::new(0, 0);

        for row in 0..5 {
            for column in 0..5 {
                let goal = CellCoord::new(column, row);
                let route = find_path(&grid, start, goal).expect("reachable");
                assert_eq!(
                    route.len(),
                    usize::try_from(start.manhattan_distance(goal)).expect("fits"),
                    "route to {goal} has the wrong length",
                );
                if goal != start {
                    assert_eq!(route.last(), Some(&goal));
                }
            }
        }
    }

    #[test]
    fn route_steps_are_adjacent_and_skip_start() {
        let grid = grid(&["O#.", ".CC", "..P"]);
        let start = CellCoord::new(0, 0);
        let route = find_path(&grid, start, CellCoord::new(2, 2)).expect("reachable");

        assert_ne!(route.first(), Some(&start));
        let mut previous = start;
        for step in route {
            assert!(previous.is_adjacent(step));
            previous = step;
        }
    }

    #[test]
    fn tie_breaking_is_deterministic() {
        let grid = grid(&["O#.", ".CC", "..P"]);

        assert_eq!(
            find_path(&grid, CellCoord::new(0, 0), CellCoord::new(1, 1)),
            Some(vec![CellCoord::new(0, 1), CellCoord::new(1, 1)])
        );
        assert_eq!(
            find_path(&grid, CellCoord::new(0, 1), CellCoord::new(2, 2)),
            Some(vec![
                CellCoord::new(1, 1),
                CellCoord::new(2, 1),
                CellCoord::new(2, 2)
            ])
        );
    }

    #[test]
    fn walls_and_off_board_goals_have_no_route() {
        let grid = grid(&["O#.", ".CC", "..P"]);
        let start = CellCoord::new(0, 0);

        assert_eq!(find_path(&grid, start, CellCoord::new(1, 0)), None);
        assert_eq!(find_path(&grid, start, CellCoord::new(3, 0)), None);
    }

    #[test]
    fn enclosed_goal_has_no_route() {
        let grid = grid(&["O#C", "##.", "..P"]);
        assert_eq!(
            find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 2)),
            None
        );
    }

    #[test]
    fn routes_detour_around_walls() {
        let grid = grid(&["O#.", ".#C", "..P"]);
        let route =
            find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0)).expect("reachable");
        assert_eq!(route.len(), 6);
        assert!(route.iter().all(|cell| *cell != CellCoord::new(1, 0)));
    }

    #[test]
    fn approach_stops_on_farthest_free_route_cell() {
        let grid = grid(&["O#.", ".CC", "..P"]);
        assert_eq!(
            approach_stop(&grid, CellCoord::new(0, 0), CellCoord::new(1, 1)),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn approach_falls_back_to_free_neighbour_of_target() {
        let grid = grid(&["OCC", "...", "..P"]);
        assert_eq!(
            find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0)),
            Some(vec![CellCoord::new(1, 0), CellCoord::new(2, 0)])
        );
        assert_eq!(
            approach_stop(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0)),
            Some(CellCoord::new(2, 1))
        );
    }

    #[test]
    fn approach_without_reachable_free_cell_has_no_stop() {
        let grid = grid(&["O#C", "#..", "..P"]);
        assert_eq!(
            approach_stop(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0)),
            None
        );

        let through_tokens = self::grid(&["OCC", "#C.", "..P"]);
        assert_eq!(
            approach_stop(&through_tokens, CellCoord::new(0, 0), CellCoord::new(2, 0)),
            Some(CellCoord::new(2, 1))
        );
    }

    #[test]
    fn route_to_self_is_empty() {
        let grid = grid(&["O#.", ".CC", "..P"]);
        let start = CellCoord::new(0, 0);
        assert_eq!(find_path(&grid, start, start), Some(Vec::new()));
    }
}
