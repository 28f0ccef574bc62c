//! Max-flow / min-cut solver on the split-vertex room graph.
//!
//! Every tile owns two vertices: TOP (`y * 50 + x`) and BOT (`TOP + 2500`),
//! joined by a capacity-1 edge for cuttable tiles. Walking between adjacent
//! tiles crosses an infinite-capacity BOT -> TOP edge, so a minimum cut of
//! the network selects whole tiles, never adjacencies. Two extra vertices
//! act as the virtual source and sink.
//!
//! The solver is Dinic's algorithm: repeated BFS layering over the residual
//! graph followed by blocking-flow DFS passes that advance a per-vertex edge
//! cursor instead of rescanning, keeping each phase at O(V*E). On this
//! unit-capacity structure the whole run is O(E*sqrt(V)), comfortably inside
//! budget for 5002 vertices.

use crate::constants::*;
use crate::location::*;
use log::*;

/// Vertex id of the virtual source.
pub const SOURCE: usize = 2 * ROOM_AREA;
/// Vertex id of the virtual sink.
pub const SINK: usize = 2 * ROOM_AREA + 1;
/// Offset from a tile's TOP vertex to its BOT vertex.
pub const BOT_OFFSET: usize = ROOM_AREA;
/// Total vertex count: two per tile plus source and sink.
pub const VERTEX_COUNT: usize = 2 * ROOM_AREA + 2;

/// Capacity sentinel for edges that must never be cut. Any real cut is at
/// most ROOM_AREA unit edges, so this can never saturate.
pub const INF_CAP: i32 = ROOM_AREA as i32 + 1;

#[inline]
pub fn pos_to_vertex(x: u8, y: u8) -> usize {
    (y as usize) * (ROOM_WIDTH as usize) + (x as usize)
}

/// Inverse of [`pos_to_vertex`] over the TOP vertex range `[0, 2500)`.
#[inline]
pub fn vertex_to_pos(vertex: usize) -> Location {
    let x = (vertex % ROOM_WIDTH as usize) as u8;
    let y = (vertex / ROOM_WIDTH as usize) as u8;
    Location::from_xy(x, y)
}

#[derive(Clone, Copy, Debug)]
struct FlowEdge {
    to: usize,
    /// Index of the reverse partner inside `edges[to]`.
    rev: usize,
    cap: i32,
    flow: i32,
}

pub struct FlowGraph {
    edges: Vec<Vec<FlowEdge>>,
    /// BFS layer per vertex; -1 means unreached in the current pass.
    level: Vec<i32>,
    /// Per-vertex cursor over `edges[u]` for the blocking-flow DFS.
    cursor: Vec<usize>,
}

impl FlowGraph {
    pub fn new() -> FlowGraph {
        FlowGraph {
            edges: vec![Vec::new(); VERTEX_COUNT],
            level: vec![-1; VERTEX_COUNT],
            cursor: vec![0; VERTEX_COUNT],
        }
    }

    /// Append the directed edge `u -> v` with capacity `cap`, plus its
    /// zero-capacity reverse partner. `edges[e.to][e.rev]` is always the
    /// reverse of `e`.
    pub fn add_edge(&mut self, u: usize, v: usize, cap: i32) {
        let rev_in_v = self.edges[v].len();
        let rev_in_u = self.edges[u].len();

        self.edges[u].push(FlowEdge {
            to: v,
            rev: rev_in_v,
            cap,
            flow: 0,
        });
        self.edges[v].push(FlowEdge {
            to: u,
            rev: rev_in_u,
            cap: 0,
            flow: 0,
        });
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|adj| adj.len()).sum::<usize>() / 2
    }

    /// Layer the residual graph from `s`. Returns true while `t` is still
    /// reachable. The queue is a growing buffer with a read index, so
    /// insertion order is the tie-break.
    fn bfs_layers(&mut self, s: usize, t: usize) -> bool {
        for level in self.level.iter_mut() {
            *level = -1;
        }

        let mut queue: Vec<usize> = Vec::with_capacity(VERTEX_COUNT);
        let mut head = 0;

        self.level[s] = 0;
        queue.push(s);

        while head < queue.len() {
            let u = queue[head];
            head += 1;

            for edge in &self.edges[u] {
                if edge.flow < edge.cap && self.level[edge.to] == -1 {
                    self.level[edge.to] = self.level[u] + 1;
                    queue.push(edge.to);
                }
            }
        }

        self.level[t] >= 0
    }

    /// Push one augmenting path of at most `limit` flow along the level
    /// graph, advancing `cursor[u]` past exhausted edges so a phase never
    /// revisits them.
    fn dfs_augment(&mut self, u: usize, t: usize, limit: i32) -> i32 {
        if u == t {
            return limit;
        }

        while self.cursor[u] < self.edges[u].len() {
            let index = self.cursor[u];
            let edge = self.edges[u][index];

            if edge.flow < edge.cap && self.level[edge.to] == self.level[u] + 1 {
                let pushed = self.dfs_augment(edge.to, t, limit.min(edge.cap - edge.flow));

                if pushed > 0 {
                    self.edges[u][index].flow += pushed;
                    self.edges[edge.to][edge.rev].flow -= pushed;
                    return pushed;
                }
            }

            self.cursor[u] += 1;
        }

        0
    }

    /// Dinic max-flow from `s` to `t`. Returns -1 when `s == t`.
    pub fn max_flow(&mut self, s: usize, t: usize) -> i32 {
        if s == t {
            return -1;
        }

        let mut total = 0;

        while self.bfs_layers(s, t) {
            for cursor in self.cursor.iter_mut() {
                *cursor = 0;
            }

            loop {
                let pushed = self.dfs_augment(s, t, i32::MAX);
                if pushed == 0 {
                    break;
                }
                total += pushed;
            }
        }

        trace!("max flow complete: {}", total);

        total
    }

    /// Source endpoints of the minimum-cut edges, found after [`max_flow`].
    ///
    /// A residual BFS from `s` marks the source side; a saturated forward
    /// edge is on a minimum cut exactly when its destination stayed
    /// unreached. For the room graph every such endpoint is a TOP vertex.
    pub fn cut_tiles(&mut self, s: usize) -> Vec<usize> {
        for level in self.level.iter_mut() {
            *level = -1;
        }

        let mut queue: Vec<usize> = Vec::with_capacity(VERTEX_COUNT);
        let mut head = 0;
        let mut saturated: Vec<(usize, usize)> = Vec::new();

        self.level[s] = 1;
        queue.push(s);

        while head < queue.len() {
            let u = queue[head];
            head += 1;

            for edge in &self.edges[u] {
                if edge.cap > 0 && edge.flow == edge.cap {
                    saturated.push((u, edge.to));
                }
                if edge.flow < edge.cap && self.level[edge.to] == -1 {
                    self.level[edge.to] = 1;
                    queue.push(edge.to);
                }
            }
        }

        saturated
            .into_iter()
            .filter(|&(_, to)| self.level[to] == -1)
            .map(|(from, _)| from)
            .collect()
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        FlowGraph::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_bijection() {
        assert_eq!(pos_to_vertex(0, 0), 0);
        assert_eq!(pos_to_vertex(1, 0), 1);
        assert_eq!(pos_to_vertex(0, 1), 50);
        assert_eq!(pos_to_vertex(49, 49), 2499);

        for vertex in [0usize, 1, 50, 2499, 1234] {
            let pos = vertex_to_pos(vertex);
            assert_eq!(pos_to_vertex(pos.x(), pos.y()), vertex);
        }
    }

    #[test]
    fn max_flow_of_self_is_sentinel() {
        let mut graph = FlowGraph::new();
        assert_eq!(graph.max_flow(SOURCE, SOURCE), -1);
    }

    #[test]
    fn unit_chain_carries_one_unit() {
        let mut graph = FlowGraph::new();
        graph.add_edge(SOURCE, 0, INF_CAP);
        graph.add_edge(0, 1, 1);
        graph.add_edge(1, 2, 1);
        graph.add_edge(2, SINK, INF_CAP);

        assert_eq!(graph.max_flow(SOURCE, SINK), 1);
    }

    #[test]
    fn parallel_paths_sum() {
        let mut graph = FlowGraph::new();
        graph.add_edge(SOURCE, 0, INF_CAP);
        graph.add_edge(0, 1, 1);
        graph.add_edge(0, 2, 1);
        graph.add_edge(1, SINK, INF_CAP);
        graph.add_edge(2, SINK, INF_CAP);

        assert_eq!(graph.max_flow(SOURCE, SINK), 2);
    }

    #[test]
    fn diamond_reaches_full_flow() {
        let mut graph = FlowGraph::new();
        graph.add_edge(SOURCE, 0, 1);
        graph.add_edge(SOURCE, 1, 1);
        graph.add_edge(0, 1, 1);
        graph.add_edge(0, SINK, 1);
        graph.add_edge(1, SINK, 1);

        assert_eq!(graph.max_flow(SOURCE, SINK), 2);
    }

    #[test]
    fn cut_matches_bottleneck() {
        // source -> a (cap 2) -> b (cap 1) -> sink: the cut is the a->b edge.
        let mut graph = FlowGraph::new();
        graph.add_edge(SOURCE, 0, 2);
        graph.add_edge(0, 1, 1);
        graph.add_edge(1, SINK, 2);

        assert_eq!(graph.max_flow(SOURCE, SINK), 1);
        assert_eq!(graph.cut_tiles(SOURCE), vec![0]);
    }

    #[test]
    fn reverse_partner_invariant() {
        let mut graph = FlowGraph::new();
        graph.add_edge(3, 7, 5);
        graph.add_edge(7, 9, 2);
        graph.add_edge(3, 9, 1);

        for u in [3usize, 7, 9] {
            for (index, edge) in graph.edges[u].iter().enumerate() {
                let partner = &graph.edges[edge.to][edge.rev];
                assert_eq!(partner.to, u);
                assert_eq!(partner.rev, index);
            }
        }
    }
}
