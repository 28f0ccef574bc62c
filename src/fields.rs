//! Score fields for the layout search.
//!
//! A field is a 50x50 grid of f32 cost values. The building placement loop
//! layers several of them (source, mineral, controller, storage and wall
//! distance) with scalar weights and then scans for the cheapest tile that
//! still satisfies a placement predicate.
//!
//! `bfs_cost` deliberately keeps its exploration bookkeeping in a scratch
//! grid separate from the value grid: tiles the search never reaches keep
//! whatever the caller filled in, which is how untouched cells stay neutral
//! when fields are combined.

use crate::constants::*;
use crate::location::*;
use crate::terrain::*;

pub type CostField = RoomDataArray<f32>;

/// Fill `field` with 8-neighbor BFS depth from `(sx, sy)`, exploring at most
/// `max_range` steps. Walls are never entered. Unexplored tiles keep their
/// current value. Calling this repeatedly on one field accumulates several
/// seeds (later seeds overwrite overlap).
pub fn bfs_cost(field: &mut CostField, sx: u8, sy: u8, max_range: u32, terrain: &FastRoomTerrain) {
    if !xy_in_bounds(sx as i16, sy as i16) {
        return;
    }

    let mut explored = RoomDataArray::new(false);
    let mut queue: Vec<(u8, u8, u32)> = Vec::new();
    let mut head = 0;

    field.set(sx as usize, sy as usize, 0.0);
    explored.set(sx as usize, sy as usize, true);
    queue.push((sx, sy, 0));

    while head < queue.len() {
        let (x, y, depth) = queue[head];
        head += 1;

        if depth >= max_range {
            continue;
        }

        for &(dx, dy) in &NEIGHBORS_8 {
            let nx = x as i16 + dx as i16;
            let ny = y as i16 + dy as i16;

            if !xy_in_bounds(nx, ny) {
                continue;
            }

            let (nx, ny) = (nx as u8, ny as u8);

            if *explored.get(nx as usize, ny as usize) || terrain.is_wall(nx, ny) {
                continue;
            }

            explored.set(nx as usize, ny as usize, true);
            field.set(nx as usize, ny as usize, (depth + 1) as f32);

            if depth + 1 < max_range {
                queue.push((nx, ny, depth + 1));
            }
        }
    }
}

/// Elementwise sum of any number of fields, as a fresh field.
pub fn add_fields(fields: &[&CostField]) -> CostField {
    let mut result = CostField::new(0.0);

    for y in 0..ROOM_HEIGHT as usize {
        for x in 0..ROOM_WIDTH as usize {
            let sum: f32 = fields.iter().map(|field| *field.get(x, y)).sum();
            result.set(x, y, sum);
        }
    }

    result
}

/// Elementwise scalar multiple, as a fresh field.
pub fn mul_field(field: &CostField, factor: f32) -> CostField {
    let mut result = CostField::new(0.0);

    for y in 0..ROOM_HEIGHT as usize {
        for x in 0..ROOM_WIDTH as usize {
            result.set(x, y, *field.get(x, y) * factor);
        }
    }

    result
}

/// Distance-from-walls field: every wall or border tile seeds at 0, and each
/// flood step assigns `(previous + 10) * 0.75`. The recurrence converges
/// toward 30, so the field softly prefers tiles a few steps off the walls
/// without ever dominating the other score terms.
pub fn wall_field(terrain: &FastRoomTerrain) -> CostField {
    let mut field = CostField::new(0.0);
    let mut explored = RoomDataArray::new(false);
    let mut queue: Vec<(u8, u8)> = Vec::new();
    let mut head = 0;

    for y in 0..ROOM_HEIGHT {
        for x in 0..ROOM_WIDTH {
            let border =
                x == 0 || y == 0 || x == ROOM_WIDTH - 1 || y == ROOM_HEIGHT - 1;

            if border || terrain.is_wall(x, y) {
                field.set(x as usize, y as usize, 0.0);
                explored.set(x as usize, y as usize, true);
                queue.push((x, y));
            }
        }
    }

    while head < queue.len() {
        let (x, y) = queue[head];
        head += 1;

        let value = *field.get(x as usize, y as usize);

        for &(dx, dy) in &NEIGHBORS_8 {
            let nx = x as i16 + dx as i16;
            let ny = y as i16 + dy as i16;

            if !xy_in_bounds(nx, ny) {
                continue;
            }

            let (nx, ny) = (nx as u8, ny as u8);

            if *explored.get(nx as usize, ny as usize) {
                continue;
            }

            explored.set(nx as usize, ny as usize, true);
            field.set(nx as usize, ny as usize, (value + 10.0) * 0.75);
            queue.push((nx, ny));
        }
    }

    field
}

/// Cheapest tile satisfying `predicate`, scanning columns left to right and
/// each column top to bottom, keeping the first strict minimum. Cells with a
/// non-finite score never match. Returns None when no tile qualifies.
pub fn find_min<F>(field: &CostField, predicate: F) -> Option<Location>
where
    F: Fn(u8, u8) -> bool,
{
    let mut best: Option<(Location, f32)> = None;

    for x in 0..ROOM_WIDTH {
        for y in 0..ROOM_HEIGHT {
            let value = *field.get(x as usize, y as usize);

            if !value.is_finite() || !predicate(x, y) {
                continue;
            }

            if best.map(|(_, score)| value < score).unwrap_or(true) {
                best = Some((Location::from_xy(x, y), value));
            }
        }
    }

    best.map(|(pos, _)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::test_support::*;

    #[test]
    fn bfs_depth_and_radius() {
        let terrain = open_terrain();
        let mut field = CostField::new(0.0);

        bfs_cost(&mut field, 10, 10, 3, &terrain);

        assert_eq!(*field.get(10, 10), 0.0);
        assert_eq!(*field.get(11, 10), 1.0);
        assert_eq!(*field.get(12, 10), 2.0);
        assert_eq!(*field.get(13, 10), 3.0);
        // Beyond the radius the initial fill survives.
        assert_eq!(*field.get(14, 10), 0.0);
        // Diagonal steps count like cardinal ones.
        assert_eq!(*field.get(12, 12), 2.0);
    }

    #[test]
    fn bfs_routes_around_walls() {
        let terrain = terrain_with_walls(&[(11, 10)]);
        let mut field = CostField::new(0.0);

        bfs_cost(&mut field, 10, 10, 3, &terrain);

        // (12, 10) is still reached through the diagonal detour.
        assert!(*field.get(12, 10) > 0.0);
        assert_eq!(*field.get(12, 10), 2.0);
        // The wall itself keeps its initial value.
        assert_eq!(*field.get(11, 10), 0.0);
    }

    #[test]
    fn zero_radius_touches_only_the_seed() {
        let terrain = open_terrain();
        let mut field = CostField::new(7.0);

        bfs_cost(&mut field, 25, 25, 0, &terrain);

        assert_eq!(*field.get(25, 25), 0.0);
        assert_eq!(*field.get(26, 25), 7.0);
    }

    #[test]
    fn add_is_commutative_and_mul_by_one_is_identity() {
        let terrain = open_terrain();
        let mut a = CostField::new(0.0);
        let mut b = CostField::new(0.0);
        bfs_cost(&mut a, 10, 10, 4, &terrain);
        bfs_cost(&mut b, 40, 40, 4, &terrain);

        assert_eq!(add_fields(&[&a, &b]), add_fields(&[&b, &a]));
        assert_eq!(mul_field(&a, 1.0), a);
    }

    #[test]
    fn add_is_associative() {
        let terrain = open_terrain();
        let mut a = CostField::new(0.0);
        let mut b = CostField::new(0.0);
        let mut c = CostField::new(0.0);
        bfs_cost(&mut a, 5, 5, 3, &terrain);
        bfs_cost(&mut b, 25, 25, 3, &terrain);
        bfs_cost(&mut c, 45, 45, 3, &terrain);

        let left = add_fields(&[&add_fields(&[&a, &b]), &c]);
        let right = add_fields(&[&a, &add_fields(&[&b, &c])]);

        assert_eq!(left, right);
    }

    #[test]
    fn wall_field_prefers_open_ground() {
        let field = wall_field(&open_terrain());

        assert_eq!(*field.get(0, 25), 0.0);
        assert_eq!(*field.get(1, 25), 7.5);
        assert!(*field.get(25, 25) > *field.get(2, 25));
        // The recurrence converges below its fixed point.
        assert!(*field.get(25, 25) < 30.0);
    }

    #[test]
    fn find_min_breaks_ties_in_scan_order() {
        let mut field = CostField::new(5.0);
        field.set(30, 4, 1.0);
        field.set(4, 30, 1.0);

        // Columns scan left to right, so x=4 wins the tie.
        assert_eq!(
            find_min(&field, |_, _| true),
            Some(Location::from_xy(4, 30))
        );
    }

    #[test]
    fn find_min_respects_predicate_and_can_fail() {
        let field = CostField::new(1.0);

        assert_eq!(find_min(&field, |_, _| false), None);
        assert_eq!(
            find_min(&field, |x, y| x == 12 && y == 34),
            Some(Location::from_xy(12, 34))
        );
    }

    #[test]
    fn find_min_skips_non_finite_cells() {
        let mut field = CostField::new(f32::INFINITY);
        field.set(20, 20, 3.0);

        assert_eq!(
            find_min(&field, |_, _| true),
            Some(Location::from_xy(20, 20))
        );
    }
}
