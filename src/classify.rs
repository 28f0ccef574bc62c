//! Terrain classification for the min-cut solver.
//!
//! Every tile is labeled with a [`TileTag`] describing its role in the flow
//! network: walls stay `Unwalkable`, open ground becomes `Normal`, tiles on
//! the requested bounds edge or adjacent to a room exit become `ToExit`
//! (walling them is disallowed by the host game), and non-wall tiles on the
//! room border itself are `Exit`.

use crate::constants::*;
use crate::error::*;
use crate::terrain::*;
use log::*;
use serde::{Deserialize, Serialize};

/// Role of a tile in the defense planning grid. The discriminants match the
/// values the host persists, so the tag round-trips through serialization
/// as a plain integer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[repr(i8)]
pub enum TileTag {
    Unwalkable = -1,
    Normal = 0,
    Protected = 1,
    ToExit = 2,
    Exit = 3,
    Exposed = 5,
    RampartMin = 9,
}

/// Inclusive rectangle of candidate tiles for wall placement.
///
/// Constructed through [`Bounds::new`], so an existing value is always valid:
/// `0 <= x1 < x2 <= 49` and `0 <= y1 < y2 <= 49`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bounds {
    x1: u8,
    y1: u8,
    x2: u8,
    y2: u8,
}

impl Bounds {
    pub fn new(x1: u8, y1: u8, x2: u8, y2: u8) -> PlanResult<Bounds> {
        if x1 >= x2 || y1 >= y2 || x2 > ROOM_WIDTH - 1 || y2 > ROOM_HEIGHT - 1 {
            warn!("rejecting bounds ({},{})..({},{})", x1, y1, x2, y2);

            return Err(PlanError::InvalidBounds { x1, y1, x2, y2 });
        }

        Ok(Bounds { x1, y1, x2, y2 })
    }

    /// The whole room.
    pub fn full() -> Bounds {
        Bounds {
            x1: 0,
            y1: 0,
            x2: ROOM_WIDTH - 1,
            y2: ROOM_HEIGHT - 1,
        }
    }

    pub fn is_full(&self) -> bool {
        *self == Bounds::full()
    }

    pub fn x1(&self) -> u8 {
        self.x1
    }

    pub fn y1(&self) -> u8 {
        self.y1
    }

    pub fn x2(&self) -> u8 {
        self.x2
    }

    pub fn y2(&self) -> u8 {
        self.y2
    }

    fn on_edge(&self, x: u8, y: u8) -> bool {
        x == self.x1 || x == self.x2 || y == self.y1 || y == self.y2
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::full()
    }
}

/// Label every tile of the room for the flow network build.
///
/// Tiles outside `bounds` stay `Unwalkable` regardless of terrain. Inside the
/// bounds, non-wall tiles become `Normal`, overridden by `ToExit` on the
/// bounds edge and by `Exit` on the room border. A second pass marks the
/// inner band next to each exit `ToExit`, using a three-tile window so that
/// diagonal approaches to an exit are covered as well.
pub fn classify(terrain: &FastRoomTerrain, bounds: &Bounds) -> RoomDataArray<TileTag> {
    let mut tags = RoomDataArray::new(TileTag::Unwalkable);

    for y in bounds.y1..=bounds.y2 {
        for x in bounds.x1..=bounds.x2 {
            if terrain.is_wall(x, y) {
                continue;
            }

            let tag = if x == 0 || y == 0 || x == ROOM_WIDTH - 1 || y == ROOM_HEIGHT - 1 {
                TileTag::Exit
            } else if bounds.on_edge(x, y) {
                TileTag::ToExit
            } else {
                TileTag::Normal
            };

            tags.set(x as usize, y as usize, tag);
        }
    }

    let is_exit = |tags: &RoomDataArray<TileTag>, x: i16, y: i16| {
        tags.try_get(x, y) == Some(&TileTag::Exit)
    };

    // Inner bands: a wall one step in from an exit is disallowed, so those
    // tiles act as sinks. The three-cell window also catches exits touching
    // the band tile diagonally.
    for y in 1..=(ROOM_HEIGHT as i16 - 2) {
        if is_exit(&tags, 0, y - 1) || is_exit(&tags, 0, y) || is_exit(&tags, 0, y + 1) {
            tags.set(1, y as usize, TileTag::ToExit);
        }
        let right = ROOM_WIDTH as i16 - 1;
        if is_exit(&tags, right, y - 1) || is_exit(&tags, right, y) || is_exit(&tags, right, y + 1)
        {
            tags.set(ROOM_WIDTH as usize - 2, y as usize, TileTag::ToExit);
        }
    }

    for x in 1..=(ROOM_WIDTH as i16 - 2) {
        if is_exit(&tags, x - 1, 0) || is_exit(&tags, x, 0) || is_exit(&tags, x + 1, 0) {
            tags.set(x as usize, 1, TileTag::ToExit);
        }
        let bottom = ROOM_HEIGHT as i16 - 1;
        if is_exit(&tags, x - 1, bottom) || is_exit(&tags, x, bottom) || is_exit(&tags, x + 1, bottom)
        {
            tags.set(x as usize, ROOM_HEIGHT as usize - 2, TileTag::ToExit);
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::test_support::*;

    #[test]
    fn bounds_validation() {
        assert!(Bounds::new(0, 0, 49, 49).is_ok());
        assert!(Bounds::new(10, 10, 20, 20).is_ok());
        assert_eq!(
            Bounds::new(20, 10, 10, 20),
            Err(PlanError::InvalidBounds {
                x1: 20,
                y1: 10,
                x2: 10,
                y2: 20
            })
        );
        assert!(Bounds::new(0, 0, 50, 49).is_err());
        assert!(Bounds::new(5, 5, 5, 10).is_err());
    }

    #[test]
    fn corners_are_exits_when_open() {
        let tags = classify(&open_terrain(), &Bounds::full());

        for &(x, y) in &[(0usize, 0usize), (0, 49), (49, 0), (49, 49)] {
            assert_eq!(*tags.get(x, y), TileTag::Exit);
        }
    }

    #[test]
    fn walls_stay_unwalkable() {
        let terrain = terrain_with_walls(&[(0, 0), (25, 25)]);
        let tags = classify(&terrain, &Bounds::full());

        assert_eq!(*tags.get(0, 0), TileTag::Unwalkable);
        assert_eq!(*tags.get(25, 25), TileTag::Normal);
    }

    #[test]
    fn exit_band_marks_inner_tiles() {
        let tags = classify(&open_terrain(), &Bounds::full());

        // One step in from each border is a sink band in an open room.
        assert_eq!(*tags.get(1, 25), TileTag::ToExit);
        assert_eq!(*tags.get(48, 25), TileTag::ToExit);
        assert_eq!(*tags.get(25, 1), TileTag::ToExit);
        assert_eq!(*tags.get(25, 48), TileTag::ToExit);
        // The diagonal corner of the band is covered by the moving window.
        assert_eq!(*tags.get(1, 1), TileTag::ToExit);
        // Two steps in is ordinary ground.
        assert_eq!(*tags.get(2, 25), TileTag::Normal);
    }

    #[test]
    fn sub_bounds_produce_edge_band_and_ignore_outside() {
        let bounds = Bounds::new(10, 10, 20, 20).unwrap();
        let tags = classify(&open_terrain(), &bounds);

        assert_eq!(*tags.get(10, 15), TileTag::ToExit);
        assert_eq!(*tags.get(20, 15), TileTag::ToExit);
        assert_eq!(*tags.get(15, 15), TileTag::Normal);
        assert_eq!(*tags.get(9, 15), TileTag::Unwalkable);
        assert_eq!(*tags.get(25, 25), TileTag::Unwalkable);
    }

    #[test]
    fn sub_bounds_touching_room_edge_still_mark_exits() {
        let bounds = Bounds::new(0, 0, 20, 20).unwrap();
        let tags = classify(&open_terrain(), &bounds);

        assert_eq!(*tags.get(0, 10), TileTag::Exit);
        assert_eq!(*tags.get(1, 10), TileTag::ToExit);
    }
}
