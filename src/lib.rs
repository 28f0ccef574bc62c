pub mod classify;
pub mod constants;
pub mod defense;
pub mod error;
pub mod fields;
pub mod flow;
pub mod layout;
pub mod location;
pub mod mincut;
pub mod room_data;
pub mod terrain;

pub use classify::{Bounds, TileTag};
pub use defense::calculate;
pub use error::{PlanError, PlanResult};
pub use layout::{build_layout, BuildingLayout, StructureKind};
pub use location::Location;
pub use mincut::get_cut_tiles;
pub use room_data::{
    GridPathFinder, MemoryBag, PathFinder, PathOptions, RoomDataSource, StaticRoom, TargetInfo,
};
pub use terrain::{FastRoomTerrain, RoomDataArray, TerrainFlags};
