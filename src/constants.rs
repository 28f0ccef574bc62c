pub const ROOM_WIDTH: u8 = 50;
pub const ROOM_HEIGHT: u8 = 50;
pub const ROOM_AREA: usize = (ROOM_WIDTH as usize) * (ROOM_HEIGHT as usize);

/// Tiles closer than this to the room edge are considered "near the edge"
/// for link placement and similar build decisions.
pub const ROOM_BUILD_BORDER: u8 = 2;
