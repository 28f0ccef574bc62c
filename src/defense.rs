//! Rampart placement and exposure analysis.
//!
//! `calculate` grows the requested protected tiles into a buffered region,
//! asks the min-cut solver for the cheapest rampart perimeter, and then
//! floods the room from its exits to find every tile an attacker can still
//! stand on. The result is the rampart list plus a path-finding cost matrix
//! marking exposed tiles at 0xff.

use crate::classify::*;
use crate::location::*;
use crate::mincut::*;
use crate::terrain::*;
use fnv::FnvHashSet;
use log::*;

/// Expansion depth around each protected seed. Seeds expand for three
/// steps; the fourth ring is included in the protected set but does not
/// expand further.
const PROTECT_RADIUS: u32 = 3;

/// Grow the protected set by a bounded flood around every seed, skipping
/// walls. The order of the returned list follows discovery order, so the
/// result is deterministic for a given input order.
fn expand_protected(terrain: &FastRoomTerrain, protected: &[Location]) -> Vec<Location> {
    let mut seen: FnvHashSet<Location> = protected.iter().copied().collect();
    let mut result: Vec<Location> = protected.to_vec();
    let mut queue: Vec<(Location, u32)> = protected.iter().map(|pos| (*pos, 0)).collect();
    let mut head = 0;

    while head < queue.len() {
        let (pos, depth) = queue[head];
        head += 1;

        if depth > PROTECT_RADIUS {
            continue;
        }

        for &(dx, dy) in &NEIGHBORS_8 {
            if let Some(next) = pos.checked_add(dx, dy) {
                if terrain.is_wall(next.x(), next.y()) || !seen.insert(next) {
                    continue;
                }

                result.push(next);
                queue.push((next, depth + 1));
            }
        }
    }

    result
}

/// Compute the rampart perimeter for `protected` plus the controller, and a
/// 50x50 cost matrix with 0xff on every tile still exposed to the exits.
pub fn calculate(
    terrain: &FastRoomTerrain,
    protected: &[Location],
    controller: Location,
) -> (Vec<Location>, RoomDataArray<u8>) {
    let mut region = expand_protected(terrain, protected);

    let in_region: FnvHashSet<Location> = region.iter().copied().collect();
    for &(dx, dy) in &NEIGHBORS_8 {
        if let Some(next) = controller.checked_add(dx, dy) {
            if !in_region.contains(&next) {
                region.push(next);
            }
        }
    }

    let ramparts = get_cut_tiles(terrain, &region, Bounds::full());

    debug!(
        "defense: {} protected seeds grew to {} tiles, {} ramparts",
        protected.len(),
        region.len(),
        ramparts.len()
    );

    let cost_matrix = exposure_matrix(terrain, &ramparts);

    (ramparts, cost_matrix)
}

/// Flood the room from its exits, stopping at walls and ramparts, and mark
/// every reached tile as exposed (0xff). Everything behind the perimeter
/// stays 0.
fn exposure_matrix(terrain: &FastRoomTerrain, ramparts: &[Location]) -> RoomDataArray<u8> {
    let mut tags = classify(terrain, &Bounds::full());

    for pos in ramparts {
        tags.set_loc(*pos, TileTag::RampartMin);
    }

    let mut queue: Vec<Location> = Vec::new();
    let mut head = 0;

    for ((x, y), tag) in tags.iter() {
        if *tag == TileTag::Exit {
            queue.push(Location::from_xy(x as u8, y as u8));
        }
    }
    for pos in queue.clone() {
        tags.set_loc(pos, TileTag::Exposed);
    }

    while head < queue.len() {
        let pos = queue[head];
        head += 1;

        for &(dx, dy) in &NEIGHBORS_8 {
            if let Some(next) = pos.checked_add(dx, dy) {
                match tags.get_loc(next) {
                    TileTag::Unwalkable | TileTag::RampartMin | TileTag::Exposed => {}
                    _ => {
                        tags.set_loc(next, TileTag::Exposed);
                        queue.push(next);
                    }
                }
            }
        }
    }

    let mut matrix = RoomDataArray::new(0u8);

    for ((x, y), tag) in tags.iter() {
        if *tag == TileTag::Exposed {
            matrix.set(x, y, 0xff);
        }
    }

    matrix
}
