//! Minimum defensive wall placement.
//!
//! Reduces "smallest set of rampart tiles separating the protected area from
//! the room exits" to a minimum vertex cut: the tag grid from
//! [`crate::classify`] is turned into the split-vertex flow network, Dinic
//! runs on it, and the saturated tile edges on the cut are converted back to
//! coordinates. When planning was restricted to a sub-rectangle, a flood
//! fill from the real exits then prunes cut tiles that only seal off pockets
//! no attacker can reach.

use crate::classify::*;
use crate::constants::*;
use crate::flow::*;
use crate::location::*;
use crate::terrain::*;
use log::*;

/// Build the flow network for a classified room.
///
/// Only interior tiles (1..=48 on both axes) spawn edges; border tiles are
/// exits or walls and never carry structures. The cut candidates are exactly
/// the capacity-1 TOP -> BOT edges of `Normal` tiles. `Protected` tiles keep
/// an uncuttable internal edge so the cut always lands around them, never on
/// them, and no edge leads back into a protected tile.
pub fn build_graph(tags: &RoomDataArray<TileTag>) -> FlowGraph {
    let mut graph = FlowGraph::new();

    for y in 1..=(ROOM_HEIGHT - 2) {
        for x in 1..=(ROOM_WIDTH - 2) {
            let top = pos_to_vertex(x, y);
            let bot = top + BOT_OFFSET;

            match tags.get(x as usize, y as usize) {
                TileTag::Normal => {
                    graph.add_edge(top, bot, 1);
                    add_neighbor_edges(&mut graph, tags, x, y, bot);
                }
                TileTag::Protected => {
                    graph.add_edge(SOURCE, top, INF_CAP);
                    graph.add_edge(top, bot, INF_CAP);
                    add_neighbor_edges(&mut graph, tags, x, y, bot);
                }
                TileTag::ToExit => {
                    graph.add_edge(top, SINK, INF_CAP);
                }
                _ => {}
            }
        }
    }

    graph
}

fn add_neighbor_edges(
    graph: &mut FlowGraph,
    tags: &RoomDataArray<TileTag>,
    x: u8,
    y: u8,
    bot: usize,
) {
    for &(dx, dy) in &NEIGHBORS_8 {
        let nx = x as i16 + dx as i16;
        let ny = y as i16 + dy as i16;

        match tags.try_get(nx, ny) {
            Some(&TileTag::Normal) | Some(&TileTag::ToExit) => {
                graph.add_edge(bot, pos_to_vertex(nx as u8, ny as u8), INF_CAP);
            }
            _ => {}
        }
    }
}

/// Compute the rampart tile set separating `protected` from the room exits.
///
/// Protected coordinates that are walls, outside the bounds, or already on
/// an exit band are left untouched (protecting them is a no-op). When a
/// sub-rectangle is used and a cut was found, dead-end pruning removes cut
/// tiles that only enclose unreachable pockets.
pub fn get_cut_tiles(
    terrain: &FastRoomTerrain,
    protected: &[Location],
    bounds: Bounds,
) -> Vec<Location> {
    let mut tags = classify(terrain, &bounds);

    for pos in protected {
        if *tags.get_loc(*pos) == TileTag::Normal {
            tags.set_loc(*pos, TileTag::Protected);
        }
    }

    let mut graph = build_graph(&tags);

    let flow = graph.max_flow(SOURCE, SINK);
    let mut cut: Vec<Location> = graph
        .cut_tiles(SOURCE)
        .into_iter()
        .map(vertex_to_pos)
        .collect();

    debug!(
        "min cut: flow {} over {} edges, {} tiles",
        flow,
        graph.edge_count(),
        cut.len()
    );

    if !bounds.is_full() && !cut.is_empty() {
        cut = prune_dead_ends(terrain, cut);
    }

    cut
}

/// Drop cut tiles that do not border any region still reachable from a room
/// exit once the cut is in place.
///
/// The room is reclassified over the full bounds with the cut tiles treated
/// as walls; a flood fill from the inner exit bands then retags every
/// reachable tile `ToExit`. A cut tile with no `ToExit` neighbor after the
/// fill only walls off a dead pocket and is redundant.
pub fn prune_dead_ends(terrain: &FastRoomTerrain, cut: Vec<Location>) -> Vec<Location> {
    let mut tags = classify(terrain, &Bounds::full());

    for pos in &cut {
        tags.set_loc(*pos, TileTag::Unwalkable);
    }

    let mut queue: Vec<Location> = Vec::new();
    let mut head = 0;

    let band_max = ROOM_WIDTH as usize - 2;
    for y in 0..ROOM_HEIGHT as usize {
        for x in [1usize, band_max] {
            if *tags.get(x, y) == TileTag::ToExit {
                queue.push(Location::from_xy(x as u8, y as u8));
            }
        }
    }
    for x in 0..ROOM_WIDTH as usize {
        for y in [1usize, band_max] {
            if *tags.get(x, y) == TileTag::ToExit {
                queue.push(Location::from_xy(x as u8, y as u8));
            }
        }
    }

    while head < queue.len() {
        let pos = queue[head];
        head += 1;

        for &(dx, dy) in &NEIGHBORS_8 {
            if let Some(next) = pos.checked_add(dx, dy) {
                if *tags.get_loc(next) == TileTag::Normal {
                    tags.set_loc(next, TileTag::ToExit);
                    queue.push(next);
                }
            }
        }
    }

    let before = cut.len();
    let kept: Vec<Location> = cut
        .into_iter()
        .filter(|pos| {
            NEIGHBORS_8.iter().any(|&(dx, dy)| {
                pos.checked_add(dx, dy)
                    .map(|next| *tags.get_loc(next) == TileTag::ToExit)
                    .unwrap_or(false)
            })
        })
        .collect();

    if kept.len() != before {
        debug!("dead-end pruning dropped {} tiles", before - kept.len());
    }

    kept
}
