use crate::location::*;
use crate::terrain::*;
use fnv::{FnvHashMap, FnvHashSet};
use pathfinding::directed::astar::astar;
use serde::{Deserialize, Serialize};

/// A point of interest the layout connects to: a source, the mineral, or
/// the controller. The id is the host's identifier for the object and keys
/// the memory writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub id: String,
    pub pos: Location,
}

impl TargetInfo {
    pub fn new(id: impl Into<String>, pos: Location) -> TargetInfo {
        TargetInfo {
            id: id.into(),
            pos,
        }
    }
}

/// Room data the planner consumes from the host.
/// Implementations exist for both in-game and offline use.
pub trait RoomDataSource {
    fn terrain(&self) -> &FastRoomTerrain;
    fn sources(&self) -> &[TargetInfo];
    fn mineral(&self) -> Option<&TargetInfo>;
    fn controller(&self) -> Option<&TargetInfo>;

    /// True when the host already has a structure or construction site on
    /// the tile.
    fn is_occupied(&self, pos: Location) -> bool;
}

/// Options forwarded to the host path-finder.
#[derive(Clone, Copy, Debug)]
pub struct PathOptions {
    pub ignore_creeps: bool,
    pub ignore_destructible_structures: bool,
    pub ignore_roads: bool,
    pub swamp_cost: u32,
    pub heuristic_weight: f32,
    /// Stop once within this Chebyshev distance of the goal.
    pub range: u8,
}

impl PathOptions {
    /// The option set the layout planner routes roads with.
    pub fn road(range: u8) -> PathOptions {
        PathOptions {
            ignore_creeps: true,
            ignore_destructible_structures: true,
            ignore_roads: true,
            swamp_cost: 1,
            heuristic_weight: 1.0,
            range,
        }
    }
}

/// Shortest-path provider between two room coordinates.
pub trait PathFinder {
    /// Ordered tile list from `from` to within `opts.range` of `to`,
    /// inclusive of both endpoints. Empty when no path exists.
    fn find_path(
        &self,
        terrain: &FastRoomTerrain,
        from: Location,
        to: Location,
        opts: &PathOptions,
    ) -> Vec<Location>;
}

/// Default path-finder: A* over the terrain grid with 8-neighbor movement.
/// The ignore flags are inherent here (the grid knows nothing but terrain);
/// host implementations honor them against live room state.
pub struct GridPathFinder;

impl PathFinder for GridPathFinder {
    fn find_path(
        &self,
        terrain: &FastRoomTerrain,
        from: Location,
        to: Location,
        opts: &PathOptions,
    ) -> Vec<Location> {
        let swamp_cost = opts.swamp_cost.max(1);
        let weight = opts.heuristic_weight;
        let range = opts.range;

        let result = astar(
            &from,
            |pos: &Location| {
                let pos = *pos;

                NEIGHBORS_8
                    .iter()
                    .filter_map(move |&(dx, dy)| pos.checked_add(dx, dy))
                    .filter(|next| !terrain.is_wall(next.x(), next.y()))
                    .map(|next| {
                        let cost = if terrain.is_swamp(next.x(), next.y()) {
                            swamp_cost
                        } else {
                            1
                        };
                        (next, cost)
                    })
                    .collect::<Vec<_>>()
            },
            |pos| (pos.distance_to(to) as f32 * weight) as u32,
            |pos| pos.distance_to(to) <= range,
        );

        result.map(|(path, _)| path).unwrap_or_default()
    }
}

/// Per-target layout memory the host persists: the container serving the
/// target and, for non-mineral targets, the link beside it. Coordinates are
/// encoded as `"x,y"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMemory {
    #[serde(rename = "containerPos", skip_serializing_if = "Option::is_none")]
    pub container_pos: Option<String>,
    #[serde(rename = "linkPos", skip_serializing_if = "Option::is_none")]
    pub link_pos: Option<String>,
}

/// Memory bag keyed by target id, written by the layout planner.
pub type MemoryBag = FnvHashMap<String, TargetMemory>;

pub fn encode_pos(pos: Location) -> String {
    format!("{},{}", pos.x(), pos.y())
}

/// Offline room data for tests and benches.
#[derive(Clone)]
pub struct StaticRoom {
    pub terrain: FastRoomTerrain,
    pub sources: Vec<TargetInfo>,
    pub mineral: Option<TargetInfo>,
    pub controller: Option<TargetInfo>,
    pub occupied: FnvHashSet<Location>,
}

impl StaticRoom {
    pub fn new(terrain: FastRoomTerrain) -> StaticRoom {
        StaticRoom {
            terrain,
            sources: Vec::new(),
            mineral: None,
            controller: None,
            occupied: FnvHashSet::default(),
        }
    }
}

impl RoomDataSource for StaticRoom {
    fn terrain(&self) -> &FastRoomTerrain {
        &self.terrain
    }

    fn sources(&self) -> &[TargetInfo] {
        &self.sources
    }

    fn mineral(&self) -> Option<&TargetInfo> {
        self.mineral.as_ref()
    }

    fn controller(&self) -> Option<&TargetInfo> {
        self.controller.as_ref()
    }

    fn is_occupied(&self, pos: Location) -> bool {
        self.occupied.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::test_support::*;

    #[test]
    fn astar_walks_straight_on_open_ground() {
        let terrain = open_terrain();
        let path = GridPathFinder.find_path(
            &terrain,
            Location::from_xy(10, 10),
            Location::from_xy(15, 10),
            &PathOptions::road(0),
        );

        assert_eq!(path.first(), Some(&Location::from_xy(10, 10)));
        assert_eq!(path.last(), Some(&Location::from_xy(15, 10)));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn range_stops_short_of_goal() {
        let terrain = open_terrain();
        let path = GridPathFinder.find_path(
            &terrain,
            Location::from_xy(10, 10),
            Location::from_xy(20, 10),
            &PathOptions::road(1),
        );

        let last = *path.last().unwrap();
        assert_eq!(last.distance_to(Location::from_xy(20, 10)), 1);
    }

    #[test]
    fn no_path_yields_empty() {
        // Goal sealed inside a wall ring.
        let terrain = terrain_with_walls(&[
            (24, 24),
            (25, 24),
            (26, 24),
            (24, 25),
            (26, 25),
            (24, 26),
            (25, 26),
            (26, 26),
        ]);
        let path = GridPathFinder.find_path(
            &terrain,
            Location::from_xy(10, 10),
            Location::from_xy(25, 25),
            &PathOptions::road(0),
        );

        assert!(path.is_empty());
    }

    #[test]
    fn memory_encoding() {
        assert_eq!(encode_pos(Location::from_xy(7, 42)), "7,42");
    }
}
