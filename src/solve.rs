use std::fmt;
use std::ops::Index;
use std::time::{Duration, Instant};

use log::{debug, trace};
use thiserror::Error;

use crate::frontier::{Entry, Fifo, Frontier, Priority};
use crate::heuristic::{BlockingVehicles, Heuristic, Zero};
use crate::{Board, Key, Move, MoveError};

type IndexMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

const CLOCK_CHECK_MASK: u64 = 0x3FF;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("no solution is reachable from the initial state")]
    NoSolution,
    #[error("search aborted: {reason}")]
    Aborted { reason: &'static str },
    #[error("generated an illegal move: {0}")]
    InvalidMove(#[from] MoveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    BreadthFirst,
    Informed,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::BreadthFirst => "breadth-first",
            Strategy::Informed => "informed",
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub max_nodes: Option<u64>,
    pub time_limit: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub nodes_visited: u64,
    pub states_admitted: usize,
    pub reopened: u64,
    pub stale_pops: u64,
    pub frontier_high_water: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited {}, admitted {}, reopened {}, stale {}, frontier peak {}",
            self.nodes_visited,
            self.states_admitted,
            self.reopened,
            self.stale_pops,
            self.frontier_high_water,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct SearchNode {
    pub state: Board,
    pub parent: Option<(NodeId, Move)>,
    pub depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    New(NodeId),
    Improved(NodeId),
    Rejected,
}

#[derive(Debug, Default)]
pub struct VisitedIndex {
    nodes: IndexMap<Key, SearchNode>,
}

impl Index<NodeId> for VisitedIndex {
    type Output = SearchNode;
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl VisitedIndex {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&SearchNode> {
        self.nodes.get(key)
    }

    pub fn insert_root(&mut self, state: Board) -> NodeId {
        let node = SearchNode {
            state,
            parent: None,
            depth: 0,
        };
        let (index, _) = self.nodes.insert_full(node.state.key(), node);
        NodeId(index)
    }

    /// Records `state`, reached from `parent` by `action`. A known state is
    /// only updated if `reopen` is set and the new path is strictly shorter.
    pub fn admit(&mut self, state: Board, parent: NodeId, action: Move, reopen: bool) -> Admission {
        let depth = self[parent].depth + 1;
        let key = state.key();
        match self.nodes.get_index_of(&key) {
            None => {
                let node = SearchNode {
                    state,
                    parent: Some((parent, action)),
                    depth,
                };
                let (index, _) = self.nodes.insert_full(key, node);
                Admission::New(NodeId(index))
            }
            Some(index) if reopen && depth < self.nodes[index].depth => {
                let known = &mut self.nodes[index];
                // Vehicles never pass each other, so one key is one configuration.
                debug_assert_eq!(known.state, state);
                known.parent = Some((parent, action));
                known.depth = depth;
                Admission::Improved(NodeId(index))
            }
            Some(_) => Admission::Rejected,
        }
    }

    pub fn path_to(&self, id: NodeId) -> Vec<Move> {
        let mut path = std::iter::successors(self[id].parent, |&(parent, _)| self[parent].parent)
            .map(|(_, action)| action)
            .collect::<Vec<_>>();
        path.reverse();
        path
    }
}

#[derive(Debug, Default)]
pub struct Search {
    config: SearchConfig,
    stats: Stats,
}

impl Search {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn nodes_visited(&self) -> u64 {
        self.stats.nodes_visited
    }

    pub fn solve(
        &mut self,
        strategy: Strategy,
        board: &Board,
        on_step: impl FnMut(),
    ) -> Result<Vec<Move>, SolveError> {
        match strategy {
            Strategy::BreadthFirst => self.breadth_first(board, on_step),
            Strategy::Informed => self.informed(board, on_step),
        }
    }

    pub fn breadth_first(
        &mut self,
        board: &Board,
        on_step: impl FnMut(),
    ) -> Result<Vec<Move>, SolveError> {
        self.run(board, Fifo::default(), &Zero, false, on_step)
    }

    /// Best-first on moves so far plus [`BlockingVehicles`]. Usually visits
    /// fewer nodes than breadth-first, but the solution is not guaranteed to
    /// be the shortest.
    ///
    /// A known state reached by a strictly shorter path is updated in place
    /// and pushed again under the same id, so its better depth reaches its
    /// successors. The earlier entry is skipped as stale when popped.
    pub fn informed(
        &mut self,
        board: &Board,
        on_step: impl FnMut(),
    ) -> Result<Vec<Move>, SolveError> {
        self.informed_with(board, &BlockingVehicles, on_step)
    }

    pub fn informed_with(
        &mut self,
        board: &Board,
        heuristic: &impl Heuristic,
        on_step: impl FnMut(),
    ) -> Result<Vec<Move>, SolveError> {
        self.run(board, Priority::default(), heuristic, true, on_step)
    }

    fn run(
        &mut self,
        board: &Board,
        mut frontier: impl Frontier,
        heuristic: &impl Heuristic,
        reopen: bool,
        mut on_step: impl FnMut(),
    ) -> Result<Vec<Move>, SolveError> {
        debug!(
            "Search started on a {}x{} board with {} vehicles",
            board.width(),
            board.height(),
            board.vehicles().len(),
        );
        self.stats = Stats::default();
        let started = Instant::now();

        let mut visited = VisitedIndex::default();
        let root = visited.insert_root(board.clone());
        frontier.push(Entry {
            node: root,
            depth: 0,
            score: heuristic.estimate(board),
        });
        self.stats.states_admitted = visited.len();

        while let Some(entry) = frontier.pop() {
            #[cfg(feature = "coz")]
            coz::scope!("Pop");

            let node = &visited[entry.node];
            if entry.depth > node.depth {
                self.stats.stale_pops += 1;
                continue;
            }

            self.check_budget(started)?;
            self.stats.nodes_visited += 1;
            on_step();

            #[cfg(feature = "coz")]
            coz::progress!("Goal test");

            if node.state.is_goal() {
                let path = visited.path_to(entry.node);
                debug!("Solved in {} moves: {}", path.len(), self.stats);
                return Ok(path);
            }

            let successors = node
                .state
                .moves()
                .map(|mv| node.state.apply(mv).map(|state| (mv, state)))
                .collect::<Result<Vec<_>, _>>()?;
            let depth = entry.depth + 1;
            for (mv, state) in successors {
                let id = match visited.admit(state, entry.node, mv, reopen) {
                    Admission::New(id) => id,
                    Admission::Improved(id) => {
                        trace!("Shorter path of length {depth} to node {}", id.0);
                        self.stats.reopened += 1;
                        id
                    }
                    Admission::Rejected => continue,
                };
                let score = depth + heuristic.estimate(&visited[id].state);
                frontier.push(Entry {
                    node: id,
                    depth,
                    score,
                });
            }
            self.stats.states_admitted = visited.len();
            self.stats.frontier_high_water = self.stats.frontier_high_water.max(frontier.len());
        }

        debug!("Search exhausted: {}", self.stats);
        Err(SolveError::NoSolution)
    }

    fn check_budget(&self, started: Instant) -> Result<(), SolveError> {
        let visited = self.stats.nodes_visited;
        if self.config.max_nodes.map_or(false, |max| visited >= max) {
            debug!("Node budget exhausted: {}", self.stats);
            return Err(SolveError::Aborted {
                reason: "node budget exhausted",
            });
        }
        if let Some(limit) = self.config.time_limit {
            if visited & CLOCK_CHECK_MASK == 0 && started.elapsed() >= limit {
                debug!("Time limit reached: {}", self.stats);
                return Err(SolveError::Aborted {
                    reason: "time limit reached",
                });
            }
        }
        Ok(())
    }
}

pub fn solve_breadth_first(board: &Board) -> Result<Vec<Move>, SolveError> {
    Search::default().breadth_first(board, || {})
}

pub fn solve_informed(board: &Board) -> Result<Vec<Move>, SolveError> {
    Search::default().informed(board, || {})
}
