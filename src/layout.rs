//! Building layout search.
//!
//! Buildings are placed as clusters: a named set of relative offsets around
//! an anchor tile. For each cluster the planner layers the distance fields
//! from [`crate::fields`] into a weighted score, scans for the cheapest
//! anchor that passes the collision checks, commits the placement, and
//! finally routes roads and per-target container/link infrastructure back
//! to the storage.

use crate::constants::*;
use crate::error::*;
use crate::fields::*;
use crate::location::*;
use crate::room_data::*;
use crate::terrain::*;
use log::*;
use serde::{Deserialize, Serialize};

/// Everything the host can build, named the way the host persists it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructureKind {
    Spawn,
    Extension,
    Extractor,
    Factory,
    Lab,
    Tower,
    Link,
    Nuker,
    Observer,
    PowerSpawn,
    Storage,
    Terminal,
    Container,
    Road,
}

/// One structure of a cluster, at an offset from the cluster anchor.
#[derive(Clone, Copy, Debug)]
pub struct ClusterPlacement {
    pub kind: StructureKind,
    pub dx: i8,
    pub dy: i8,
}

const fn placement(kind: StructureKind, dx: i8, dy: i8) -> ClusterPlacement {
    ClusterPlacement { kind, dx, dy }
}

const STORAGE_CLUSTER: &[ClusterPlacement] = &[
    placement(StructureKind::Storage, 0, 0),
    placement(StructureKind::Link, 0, 1),
];

const SPAWN_CLUSTER: &[ClusterPlacement] = &[
    placement(StructureKind::Spawn, -1, 0),
    placement(StructureKind::Spawn, 0, 0),
    placement(StructureKind::Spawn, 1, 0),
];

const LAB_CLUSTER: &[ClusterPlacement] = &[
    placement(StructureKind::Lab, -1, -1),
    placement(StructureKind::Lab, 0, -1),
    placement(StructureKind::Lab, 1, -1),
    placement(StructureKind::Lab, -1, 0),
    placement(StructureKind::Lab, 0, 0),
    placement(StructureKind::Lab, 1, 0),
    placement(StructureKind::Lab, -1, 1),
    placement(StructureKind::Lab, 0, 1),
    placement(StructureKind::Lab, 1, 1),
    placement(StructureKind::Lab, 0, 2),
];

const CORE_CLUSTER: &[ClusterPlacement] = &[
    placement(StructureKind::Terminal, 0, 0),
    placement(StructureKind::Factory, 1, 0),
    placement(StructureKind::PowerSpawn, -1, 0),
    placement(StructureKind::Nuker, 0, -1),
];

const TOWER_CLUSTER: &[ClusterPlacement] = &[
    placement(StructureKind::Tower, -1, -1),
    placement(StructureKind::Tower, 0, -1),
    placement(StructureKind::Tower, 1, -1),
];

const EXTENSION_CLUSTER: &[ClusterPlacement] = &[
    placement(StructureKind::Extension, -1, -1),
    placement(StructureKind::Extension, 0, -1),
    placement(StructureKind::Extension, 1, -1),
    placement(StructureKind::Extension, -1, 0),
    placement(StructureKind::Extension, 1, 0),
];

const OBSERVER_CLUSTER: &[ClusterPlacement] = &[placement(StructureKind::Observer, 0, 0)];

/// The cluster shapes the planner knows how to place.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cluster {
    Storage,
    Spawn,
    Lab,
    Core,
    Tower,
    Extension,
    Observer,
}

impl Cluster {
    pub fn placements(self) -> &'static [ClusterPlacement] {
        match self {
            Cluster::Storage => STORAGE_CLUSTER,
            Cluster::Spawn => SPAWN_CLUSTER,
            Cluster::Lab => LAB_CLUSTER,
            Cluster::Core => CORE_CLUSTER,
            Cluster::Tower => TOWER_CLUSTER,
            Cluster::Extension => EXTENSION_CLUSTER,
            Cluster::Observer => OBSERVER_CLUSTER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cluster::Storage => "storage",
            Cluster::Spawn => "spawn",
            Cluster::Lab => "lab",
            Cluster::Core => "core",
            Cluster::Tower => "tower",
            Cluster::Extension => "extension",
            Cluster::Observer => "observer",
        }
    }
}

/// Ordered placements per structure kind. Every kind is always present;
/// kinds the planner did not place hold empty lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingLayout {
    pub spawn: Vec<Location>,
    pub extension: Vec<Location>,
    pub extractor: Vec<Location>,
    pub factory: Vec<Location>,
    pub lab: Vec<Location>,
    pub tower: Vec<Location>,
    pub link: Vec<Location>,
    pub nuker: Vec<Location>,
    pub observer: Vec<Location>,
    pub power_spawn: Vec<Location>,
    pub storage: Vec<Location>,
    pub terminal: Vec<Location>,
    pub container: Vec<Location>,
    pub road: Vec<Location>,
}

impl BuildingLayout {
    pub fn get(&self, kind: StructureKind) -> &[Location] {
        match kind {
            StructureKind::Spawn => &self.spawn,
            StructureKind::Extension => &self.extension,
            StructureKind::Extractor => &self.extractor,
            StructureKind::Factory => &self.factory,
            StructureKind::Lab => &self.lab,
            StructureKind::Tower => &self.tower,
            StructureKind::Link => &self.link,
            StructureKind::Nuker => &self.nuker,
            StructureKind::Observer => &self.observer,
            StructureKind::PowerSpawn => &self.power_spawn,
            StructureKind::Storage => &self.storage,
            StructureKind::Terminal => &self.terminal,
            StructureKind::Container => &self.container,
            StructureKind::Road => &self.road,
        }
    }

    fn push(&mut self, kind: StructureKind, pos: Location) {
        let list = match kind {
            StructureKind::Spawn => &mut self.spawn,
            StructureKind::Extension => &mut self.extension,
            StructureKind::Extractor => &mut self.extractor,
            StructureKind::Factory => &mut self.factory,
            StructureKind::Lab => &mut self.lab,
            StructureKind::Tower => &mut self.tower,
            StructureKind::Link => &mut self.link,
            StructureKind::Nuker => &mut self.nuker,
            StructureKind::Observer => &mut self.observer,
            StructureKind::PowerSpawn => &mut self.power_spawn,
            StructureKind::Storage => &mut self.storage,
            StructureKind::Terminal => &mut self.terminal,
            StructureKind::Container => &mut self.container,
            StructureKind::Road => &mut self.road,
        };

        list.push(pos);
    }
}

struct LayoutState<'a, R: RoomDataSource> {
    room: &'a R,
    layout: BuildingLayout,
    /// Claimed tiles; entries only ever flip false -> true within a run.
    built: RoomDataArray<bool>,
    /// Cluster anchors to connect to the storage with roads.
    road_anchors: Vec<Location>,
}

impl<'a, R: RoomDataSource> LayoutState<'a, R> {
    fn new(room: &'a R) -> LayoutState<'a, R> {
        LayoutState {
            room,
            layout: BuildingLayout::default(),
            built: RoomDataArray::new(false),
            road_anchors: Vec::new(),
        }
    }

    /// True when every tile of `cluster`, anchored at (x, y), is inside the
    /// room, unclaimed, off walls, and free of host structures.
    fn can_put(&self, x: u8, y: u8, cluster: Cluster) -> bool {
        let anchor = Location::from_xy(x, y);

        cluster.placements().iter().all(|p| {
            anchor.checked_add(p.dx, p.dy).is_some_and(|pos| {
                !*self.built.get_loc(pos)
                    && !self.room.terrain().is_wall(pos.x(), pos.y())
                    && !self.room.is_occupied(pos)
            })
        })
    }

    /// Commit `cluster` at the anchor: record every structure and claim its
    /// tile.
    fn put(&mut self, anchor: Location, cluster: Cluster) {
        for p in cluster.placements() {
            let pos = anchor
                .checked_add(p.dx, p.dy)
                .expect("placement checked by can_put");

            self.layout.push(p.kind, pos);
            self.built.set_loc(pos, true);
        }
    }

    /// Find the cheapest valid anchor for `cluster`, commit it, and return
    /// the anchor.
    fn place(&mut self, cluster: Cluster, score: &CostField) -> PlanResult<Location> {
        let anchor = find_min(score, |x, y| self.can_put(x, y, cluster)).ok_or_else(|| {
            warn!("no valid placement for the {} cluster", cluster.name());
            PlanError::NoValidPlacement {
                cluster: cluster.name(),
            }
        })?;

        debug!("placing {} cluster at {}", cluster.name(), anchor);
        self.put(anchor, cluster);

        Ok(anchor)
    }

    fn put_road(&mut self, pos: Location) {
        if !*self.built.get_loc(pos) {
            self.layout.push(StructureKind::Road, pos);
            self.built.set_loc(pos, true);
        }
    }
}

/// True when the tile sits within the build border of the room edge or has
/// a terrain wall among its 8 neighbors.
fn near_wall_or_edge(terrain: &FastRoomTerrain, pos: Location) -> bool {
    if !pos.in_from_edge(ROOM_BUILD_BORDER) {
        return true;
    }

    terrain.is_wall(pos.x(), pos.y())
        || NEIGHBORS_8.iter().any(|&(dx, dy)| {
            pos.checked_add(dx, dy)
                .map(|next| terrain.is_wall(next.x(), next.y()))
                .unwrap_or(true)
        })
}

/// Pick a link tile beside `container`: first a tile comfortably clear of
/// walls and the room edge, then any legal tile at all. Returns None when
/// both scans fail (the link is simply skipped).
fn find_link_spot<R: RoomDataSource>(state: &LayoutState<R>, container: Location) -> Option<Location> {
    let terrain = state.room.terrain();

    for &(dx, dy) in &NEIGHBORS_8 {
        if let Some(pos) = container.checked_add(dx, dy) {
            if !near_wall_or_edge(terrain, pos) && !*state.built.get_loc(pos) {
                return Some(pos);
            }
        }
    }

    for &(dx, dy) in &NEIGHBORS_8 {
        if let Some(pos) = container.checked_add(dx, dy) {
            if !terrain.is_wall(pos.x(), pos.y())
                && pos.in_from_edge(1)
                && !*state.built.get_loc(pos)
            {
                return Some(pos);
            }
        }
    }

    None
}

/// How many tower/extension rounds the placement loop runs.
const PLACEMENT_ROUNDS: usize = 6;

/// Place the full building layout for the room.
///
/// The sequence is: storage, spawn row, lab block, core cross, six rounds of
/// tower row plus extension cross, the observer, roads from every committed
/// anchor back to the storage, and finally the container/link/extractor
/// infrastructure for the controller, each source, and the mineral. Writes
/// `containerPos`/`linkPos` for each target into `memory` under its id.
pub fn build_layout<R, P>(room: &R, path_finder: &P, memory: &mut MemoryBag) -> PlanResult<BuildingLayout>
where
    R: RoomDataSource,
    P: PathFinder,
{
    let controller = room.controller().ok_or(PlanError::ControllerNotFound)?.clone();
    let mineral = room.mineral().ok_or(PlanError::MineralNotFound)?.clone();
    let terrain = room.terrain();

    // Penalty fields around the fixed room features, plus the wall bonus.
    let mut source_field = CostField::new(0.0);
    for source in room.sources() {
        bfs_cost(&mut source_field, source.pos.x(), source.pos.y(), 3, terrain);
    }

    let mut mineral_field = CostField::new(0.0);
    bfs_cost(&mut mineral_field, mineral.pos.x(), mineral.pos.y(), 2, terrain);

    let mut controller_field = CostField::new(0.0);
    bfs_cost(
        &mut controller_field,
        controller.pos.x(),
        controller.pos.y(),
        4,
        terrain,
    );

    let wall_field = wall_field(terrain);

    let mut state = LayoutState::new(room);

    // Storage anchors the whole layout: clear of walls, clear of the
    // feature buffers.
    let storage_score = add_fields(&[
        &source_field,
        &mul_field(&mineral_field, 0.25),
        &controller_field,
        &mul_field(&wall_field, -1.0),
    ]);
    let storage_pos = state.place(Cluster::Storage, &storage_score)?;

    let mut storage_field = CostField::new(0.0);
    bfs_cost(
        &mut storage_field,
        storage_pos.x(),
        storage_pos.y(),
        ROOM_AREA as u32,
        terrain,
    );

    let tower_score = add_fields(&[
        &mul_field(&mineral_field, 0.01),
        &storage_field,
        &mul_field(&source_field, 0.01),
        &mul_field(&controller_field, 0.01),
    ]);
    let extension_score = add_fields(&[
        &mul_field(&mineral_field, 0.01),
        &mul_field(&storage_field, 4.0),
        &source_field,
        &mul_field(&controller_field, 0.01),
    ]);
    let lab_score = add_fields(&[
        &mineral_field,
        &mul_field(&storage_field, 5.0),
        &mul_field(&source_field, 0.01),
        &mul_field(&controller_field, 0.01),
    ]);

    let spawn_anchor = state.place(Cluster::Spawn, &extension_score)?;
    state.road_anchors.push(spawn_anchor);

    let lab_anchor = state.place(Cluster::Lab, &lab_score)?;
    state.road_anchors.push(lab_anchor);

    let core_anchor = state.place(Cluster::Core, &tower_score)?;
    state.road_anchors.push(core_anchor);

    for _ in 0..PLACEMENT_ROUNDS {
        let tower_anchor = state.place(Cluster::Tower, &tower_score)?;
        state.road_anchors.push(tower_anchor);

        let extension_anchor = state.place(Cluster::Extension, &extension_score)?;
        state.road_anchors.push(extension_anchor);
    }

    state.place(Cluster::Observer, &tower_score)?;

    // Roads from every committed anchor back to the storage.
    for anchor in state.road_anchors.clone() {
        let path = path_finder.find_path(terrain, anchor, storage_pos, &PathOptions::road(1));

        for pos in path {
            state.put_road(pos);
        }
    }

    // Container, link, and extractor infrastructure per target.
    let mut targets: Vec<(TargetInfo, u8)> = Vec::new();
    targets.push((controller, 3));
    for source in room.sources() {
        targets.push((source.clone(), 1));
    }
    targets.push((mineral.clone(), 1));

    for (target, range) in targets {
        let path = path_finder.find_path(terrain, storage_pos, target.pos, &PathOptions::road(range));

        if path.is_empty() {
            trace!("no route from storage to target {}", target.id);
            continue;
        }

        for pos in &path[..path.len() - 1] {
            state.put_road(*pos);
        }

        let container_pos = *path.last().expect("path checked non-empty");
        state.layout.push(StructureKind::Container, container_pos);
        state.built.set_loc(container_pos, true);

        let is_mineral = target.id == mineral.id;
        let mut link_pos = None;

        if is_mineral {
            state.layout.push(StructureKind::Extractor, mineral.pos);
            state.built.set_loc(mineral.pos, true);
        } else {
            link_pos = find_link_spot(&state, container_pos);

            match link_pos {
                Some(pos) => {
                    state.layout.push(StructureKind::Link, pos);
                    state.built.set_loc(pos, true);
                }
                None => trace!("no link spot beside container {}", container_pos),
            }
        }

        let entry = memory.entry(target.id.clone()).or_default();
        entry.container_pos = Some(encode_pos(container_pos));
        if let Some(pos) = link_pos {
            entry.link_pos = Some(encode_pos(pos));
        }
    }

    Ok(state.layout)
}
