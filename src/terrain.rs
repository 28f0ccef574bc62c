use crate::constants::*;
use crate::location::*;
use bitflags::*;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TerrainFlags: u8 {
        const NONE = 0;
        const WALL = 1;
        const SWAMP = 2;
        const LAVA = 4;
    }
}

/// Immutable snapshot of a room's terrain, sampled once from the host's
/// terrain query so every later lookup is a plain buffer read.
#[derive(Clone)]
pub struct FastRoomTerrain {
    buffer: Vec<u8>,
}

impl FastRoomTerrain {
    pub fn new(buffer: Vec<u8>) -> FastRoomTerrain {
        assert_eq!(buffer.len(), ROOM_AREA);

        FastRoomTerrain { buffer }
    }

    /// Sample a host terrain query (bit 0 set means wall) into a snapshot.
    pub fn from_query<F>(query: F) -> FastRoomTerrain
    where
        F: Fn(u8, u8) -> u8,
    {
        let mut buffer = vec![0u8; ROOM_AREA];

        for y in 0..ROOM_HEIGHT {
            for x in 0..ROOM_WIDTH {
                buffer[(y as usize * ROOM_WIDTH as usize) + x as usize] = query(x, y);
            }
        }

        FastRoomTerrain { buffer }
    }

    pub fn get(&self, pos: &Location) -> TerrainFlags {
        self.get_xy(pos.x(), pos.y())
    }

    pub fn get_xy(&self, x: u8, y: u8) -> TerrainFlags {
        let index = (y as usize * ROOM_WIDTH as usize) + (x as usize);
        TerrainFlags::from_bits_truncate(self.buffer[index])
    }

    pub fn is_wall(&self, x: u8, y: u8) -> bool {
        self.get_xy(x, y).contains(TerrainFlags::WALL)
    }

    pub fn is_swamp(&self, x: u8, y: u8) -> bool {
        self.get_xy(x, y).contains(TerrainFlags::SWAMP)
    }

    /// All passable exit tiles (tiles on the room border that are not walls).
    pub fn get_exits(&self) -> Vec<Location> {
        let mut exits = Vec::new();
        // Top edge
        for x in 0..ROOM_WIDTH {
            if !self.is_wall(x, 0) {
                exits.push(Location::from_xy(x, 0));
            }
        }
        // Right edge
        for y in 1..ROOM_HEIGHT - 1 {
            if !self.is_wall(ROOM_WIDTH - 1, y) {
                exits.push(Location::from_xy(ROOM_WIDTH - 1, y));
            }
        }
        // Bottom edge
        for x in 0..ROOM_WIDTH {
            if !self.is_wall(x, ROOM_HEIGHT - 1) {
                exits.push(Location::from_xy(x, ROOM_HEIGHT - 1));
            }
        }
        // Left edge
        for y in 1..ROOM_HEIGHT - 1 {
            if !self.is_wall(0, y) {
                exits.push(Location::from_xy(0, y));
            }
        }
        exits
    }
}

/// A 50x50 array for room-sized data.
#[derive(Clone, PartialEq, Debug)]
pub struct RoomDataArray<T: Copy> {
    data: Vec<T>,
}

impl<T: Copy> RoomDataArray<T> {
    pub fn new(initial: T) -> Self {
        RoomDataArray {
            data: vec![initial; ROOM_AREA],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        let index = y * (ROOM_WIDTH as usize) + x;
        &self.data[index]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let index = y * (ROOM_WIDTH as usize) + x;
        &mut self.data[index]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    /// Checked read; None for coordinates outside the room.
    pub fn try_get(&self, x: i16, y: i16) -> Option<&T> {
        if xy_in_bounds(x, y) {
            Some(self.get(x as usize, y as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn get_loc(&self, loc: Location) -> &T {
        self.get(loc.x() as usize, loc.y() as usize)
    }

    #[inline]
    pub fn set_loc(&mut self, loc: Location, value: T) {
        self.set(loc.x() as usize, loc.y() as usize, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.data.iter().enumerate().map(|(i, v)| {
            let x = i % (ROOM_WIDTH as usize);
            let y = i / (ROOM_WIDTH as usize);
            ((x, y), v)
        })
    }
}

impl<T: Copy + Serialize> Serialize for RoomDataArray<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.data.serialize(serializer)
    }
}

impl<'de, T: Copy + Deserialize<'de>> Deserialize<'de> for RoomDataArray<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = Vec::<T>::deserialize(deserializer)?;
        if data.len() != ROOM_AREA {
            return Err(serde::de::Error::custom("Invalid room data array size"));
        }
        Ok(RoomDataArray { data })
    }
}

/// Neighbor offsets for 8-directional movement.
pub const NEIGHBORS_8: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// Neighbor offsets for 4-directional (cardinal) movement.
pub const NEIGHBORS_4: [(i8, i8); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Terrain with no walls at all.
    pub fn open_terrain() -> FastRoomTerrain {
        FastRoomTerrain::from_query(|_, _| 0)
    }

    /// Terrain where every listed tile is a wall.
    pub fn terrain_with_walls(walls: &[(u8, u8)]) -> FastRoomTerrain {
        let walls: Vec<(u8, u8)> = walls.to_vec();
        FastRoomTerrain::from_query(move |x, y| {
            if walls.contains(&(x, y)) {
                TerrainFlags::WALL.bits()
            } else {
                0
            }
        })
    }

    /// Terrain that is all wall except the listed tiles.
    pub fn corridor_terrain(open: &[(u8, u8)]) -> FastRoomTerrain {
        let open: Vec<(u8, u8)> = open.to_vec();
        FastRoomTerrain::from_query(move |x, y| {
            if open.contains(&(x, y)) {
                0
            } else {
                TerrainFlags::WALL.bits()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_sampling_matches_lookup() {
        let terrain = FastRoomTerrain::from_query(|x, y| if x == 3 && y == 7 { 1 } else { 0 });

        assert!(terrain.is_wall(3, 7));
        assert!(!terrain.is_wall(7, 3));
        assert_eq!(terrain.get(&Location::from_xy(3, 7)), TerrainFlags::WALL);
    }

    #[test]
    fn exits_skip_walls() {
        let terrain = FastRoomTerrain::from_query(|x, y| if y == 0 && x != 10 { 1 } else { 0 });
        let exits = terrain.get_exits();

        assert!(exits.contains(&Location::from_xy(10, 0)));
        assert!(!exits.contains(&Location::from_xy(11, 0)));
    }

    #[test]
    fn data_array_roundtrip() {
        let mut array = RoomDataArray::new(0u32);
        array.set(5, 9, 42);

        assert_eq!(*array.get(5, 9), 42);
        assert_eq!(*array.get_loc(Location::from_xy(5, 9)), 42);
        assert_eq!(array.try_get(-1, 0), None);
        assert_eq!(array.try_get(5, 9), Some(&42));
    }
}
