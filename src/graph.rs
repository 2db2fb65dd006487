//! Adjacency-list graph with BFS, DFS, Dijkstra and Bellman-Ford
//!
//! Vertex ids are stored once, in insertion order, and mapped to dense
//! indices through a fast hash map (FxHash). Adjacency lists and all
//! traversal state work on those indices.
//!
//! # Traversals
//!
//! [`Graph::bfs`] and [`Graph::dfs`] return lazy iterators that borrow the
//! graph; each call starts a fresh traversal. DFS runs on an explicit stack,
//! never through recursion, so deep graphs cannot exhaust the call stack.
//!
//! # Shortest paths
//!
//! [`Graph::dijkstra`] uses this crate's [`BinaryHeap`] in MIN mode as its
//! priority frontier. Improved distances are pushed as new entries and stale
//! entries are skipped when popped, since the heap has no `decrease_key`.
//! Before the search starts, every edge reachable from the source is checked
//! for a negative weight.
//!
//! [`Graph::bellman_ford`] accepts negative weights and fails only on a
//! negative cycle reachable from the source. Both searches add path costs
//! with [`Cost::checked_add`] and report an overflowing sum as an error.
//!
//! # Example
//!
//! ```rust
//! use algoviz_core::graph::{Distance, Graph};
//!
//! let mut graph: Graph<&str> = Graph::undirected();
//! for v in ["A", "B", "C"] {
//!     graph.add_vertex(v);
//! }
//! graph.add_edge(&"A", &"B", 1).unwrap();
//! graph.add_edge(&"B", &"C", 2).unwrap();
//! graph.add_edge(&"A", &"C", 5).unwrap();
//!
//! let paths = graph.dijkstra(&"A").unwrap();
//! assert_eq!(paths.distance(&"C"), Some(Distance::Finite(3)));
//! assert_eq!(paths.path_to(&"C"), Some(vec!["A", "B", "C"]));
//! ```

use crate::binary_heap::BinaryHeap;
use crate::config::{GraphKind, VisualizerConfig};
use crate::error::{Result, StructureError};
use crate::step::{Step, StepKind, StepLog};
use crate::traits::{Animated, Applied};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::ops::Add;
use tracing::{debug, trace};

/// Trait for types that can be used as edge weights.
///
/// This requires the type to be orderable, copyable, and support addition.
/// `Default` is the zero weight and `From<u8>` provides the unit weight.
/// Path sums go through [`checked_add`](Cost::checked_add), so a sum that
/// does not fit is reported instead of wrapping.
pub trait Cost: Ord + Copy + Add<Output = Self> + Default + From<u8> + fmt::Debug {
    /// `self + rhs`, or `None` on overflow
    fn checked_add(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_cost {
    ($($t:ty),* $(,)?) => {
        $(
            impl Cost for $t {
                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_add(self, rhs)
                }
            }
        )*
    };
}

impl_cost!(u8, u16, u32, u64, u128, usize, i16, i32, i64, i128, isize);

/// Distance from the source of a shortest-path run
///
/// `Finite` orders before `Infinite`, so distances compare the usual way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance<W> {
    /// Reachable at this total weight
    Finite(W),
    /// Not reachable from the source
    Infinite,
}

impl<W: Copy> Distance<W> {
    /// The weight, if reachable
    pub fn finite(self) -> Option<W> {
        match self {
            Distance::Finite(w) => Some(w),
            Distance::Infinite => None,
        }
    }

    /// True for `Infinite`
    pub fn is_infinite(&self) -> bool {
        matches!(self, Distance::Infinite)
    }
}

impl<W> From<Option<W>> for Distance<W> {
    fn from(value: Option<W>) -> Self {
        value.map_or(Distance::Infinite, Distance::Finite)
    }
}

impl<W: Serialize> Serialize for Distance<W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Distance::Finite(w) => w.serialize(serializer),
            Distance::Infinite => serializer.serialize_str("infinity"),
        }
    }
}

/// Snapshot carried by graph steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphView<V, W> {
    /// Traversal frontier, next vertex first
    Frontier(Vec<V>),
    /// Out-edges of one vertex
    Adjacency(Vec<(V, W)>),
    /// Tentative or final distance of one vertex
    Distance(Distance<W>),
}

/// Step type recorded by [`Graph`]
pub type GraphStep<V, W> = Step<V, GraphView<V, W>>;

/// A path found by [`Graph::shortest_path`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult<V, W> {
    /// The path from start to goal (inclusive)
    pub path: Vec<V>,
    /// Total cost of the path
    pub cost: W,
}

/// Distances from one source to every vertex of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortestPaths<V: Eq + Hash, W> {
    source: V,
    distances: FxHashMap<V, Distance<W>>,
    #[serde(skip)]
    predecessors: FxHashMap<V, V>,
}

impl<V: Clone + Eq + Hash, W: Copy> ShortestPaths<V, W> {
    /// Vertex the distances are measured from
    pub fn source(&self) -> &V {
        &self.source
    }

    /// Distance to `v`, `None` only if `v` is not a vertex of the graph
    pub fn distance(&self, v: &V) -> Option<Distance<W>> {
        self.distances.get(v).copied()
    }

    /// Number of vertices covered (every vertex of the graph)
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// True for a run on an empty graph, which cannot happen
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// All `(vertex, distance)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&V, Distance<W>)> + '_ {
        self.distances.iter().map(|(v, d)| (v, *d))
    }

    /// Number of vertices with a finite distance, the source included
    pub fn reachable(&self) -> usize {
        self.distances.values().filter(|d| !d.is_infinite()).count()
    }

    /// Reconstructs the path from the source to `v`
    pub fn path_to(&self, v: &V) -> Option<Vec<V>> {
        if self.distance(v)?.is_infinite() {
            return None;
        }
        let mut path = vec![v.clone()];
        let mut current = v;
        while let Some(prev) = self.predecessors.get(current) {
            path.push(prev.clone());
            current = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// Frontier entry, ordered by distance then vertex index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Frontier<W> {
    dist: W,
    vertex: usize,
}

/// Raw result of a Dijkstra run over vertex indices
struct Relaxation<W> {
    dist: Vec<Option<W>>,
    prev: Vec<Option<usize>>,
}

/// Directed or undirected weighted graph that records its steps
#[derive(Debug, Clone)]
pub struct Graph<V, W = i64> {
    kind: GraphKind,
    vertices: Vec<V>,
    index: FxHashMap<V, usize>,
    adjacency: Vec<Vec<(usize, W)>>,
    edges: usize,
    log: StepLog<V, GraphView<V, W>>,
}

impl<V, W> Graph<V, W> {
    /// Creates an empty graph of the given kind
    pub fn new(kind: GraphKind) -> Self {
        Graph {
            kind,
            vertices: Vec::new(),
            index: FxHashMap::default(),
            adjacency: Vec::new(),
            edges: 0,
            log: StepLog::new(true),
        }
    }

    /// Creates an empty undirected graph
    pub fn undirected() -> Self {
        Self::new(GraphKind::Undirected)
    }

    /// Creates an empty directed graph
    pub fn directed() -> Self {
        Self::new(GraphKind::Directed)
    }

    /// Creates an empty graph from `config.graph_kind` and `config.capture_snapshots`
    pub fn with_config(config: &VisualizerConfig) -> Self {
        let mut graph = Self::new(config.graph_kind);
        graph.log = StepLog::new(config.capture_snapshots);
        graph
    }

    /// Directed or undirected
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of successful `add_edge` calls; an undirected edge counts once
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Vertex ids in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &V> + '_ {
        self.vertices.iter()
    }

    /// Every step recorded since construction or the last reset
    pub fn steps(&self) -> &[GraphStep<V, W>] {
        self.log.steps()
    }

    /// Removes every vertex and edge and clears the step log
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.index.clear();
        self.adjacency.clear();
        self.edges = 0;
        self.log.clear();
    }
}

impl<V, W> Graph<V, W>
where
    V: Clone + Eq + Hash + fmt::Debug,
    W: Cost,
{
    fn index_of(&self, id: &V) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| StructureError::vertex_not_found(id))
    }

    fn adjacency_view(&self, u: usize) -> GraphView<V, W> {
        GraphView::Adjacency(
            self.adjacency[u]
                .iter()
                .map(|&(v, w)| (self.vertices[v].clone(), w))
                .collect(),
        )
    }

    /// True if `id` is a vertex
    pub fn contains_vertex(&self, id: &V) -> bool {
        self.index.contains_key(id)
    }

    /// Out-edges of `id` in insertion order
    ///
    /// # Errors
    /// [`StructureError::VertexNotFound`] if `id` is absent.
    pub fn neighbors(&self, id: &V) -> Result<impl Iterator<Item = (&V, W)> + '_> {
        let u = self.index_of(id)?;
        Ok(self.adjacency[u]
            .iter()
            .map(move |&(v, w)| (&self.vertices[v], w)))
    }

    /// Adds a vertex. Adding an existing id is a no-op that records nothing.
    pub fn add_vertex(&mut self, id: V) -> Vec<GraphStep<V, W>> {
        if self.index.contains_key(&id) {
            return Vec::new();
        }
        let mark = self.log.mark();
        let u = self.vertices.len();
        self.vertices.push(id.clone());
        self.index.insert(id.clone(), u);
        self.adjacency.push(Vec::new());
        self.log.note(StepKind::AddVertex, [id]);
        self.log.since(mark)
    }

    /// Adds an edge `u -> v`, plus `v -> u` for undirected graphs
    ///
    /// A self-loop in an undirected graph is stored once.
    ///
    /// # Errors
    /// [`StructureError::VertexNotFound`] if either endpoint is absent.
    pub fn add_edge(&mut self, u: &V, v: &V, weight: W) -> Result<Vec<GraphStep<V, W>>> {
        let from = self.index_of(u)?;
        let to = self.index_of(v)?;
        let mark = self.log.mark();

        let before = self.log.capture(|| self.adjacency_view(from));
        self.adjacency[from].push((to, weight));
        if self.kind == GraphKind::Undirected && from != to {
            self.adjacency[to].push((from, weight));
        }
        self.edges += 1;
        let after = self.log.capture(|| self.adjacency_view(from));
        self.log
            .push(StepKind::AddEdge, [u.clone(), v.clone()], before, after);

        debug!(from = ?u, to = ?v, weight = ?weight, "edge added");
        Ok(self.log.since(mark))
    }

    /// Adds an edge of weight 1
    pub fn add_unit_edge(&mut self, u: &V, v: &V) -> Result<Vec<GraphStep<V, W>>> {
        self.add_edge(u, v, W::from(1))
    }

    /// Breadth-first traversal from `start`
    ///
    /// # Errors
    /// [`StructureError::VertexNotFound`] if `start` is absent.
    pub fn bfs(&self, start: &V) -> Result<Bfs<'_, V, W>> {
        let s = self.index_of(start)?;
        let mut visited = vec![false; self.vertices.len()];
        visited[s] = true;
        Ok(Bfs {
            graph: self,
            queue: VecDeque::from([s]),
            visited,
        })
    }

    /// Depth-first traversal from `start`, first-listed neighbor explored first
    ///
    /// # Errors
    /// [`StructureError::VertexNotFound`] if `start` is absent.
    pub fn dfs(&self, start: &V) -> Result<Dfs<'_, V, W>> {
        let s = self.index_of(start)?;
        Ok(Dfs {
            graph: self,
            stack: vec![s],
            visited: vec![false; self.vertices.len()],
        })
    }

    /// Shortest distances from `start` to every vertex
    ///
    /// Unreachable vertices map to [`Distance::Infinite`].
    ///
    /// # Errors
    /// - [`StructureError::VertexNotFound`] if `start` is absent
    /// - [`StructureError::NegativeWeight`] if an edge reachable from `start` is negative
    /// - [`StructureError::CostOverflow`] if a path sum does not fit in `W`
    pub fn dijkstra(&self, start: &V) -> Result<ShortestPaths<V, W>> {
        let s = self.index_of(start)?;
        let relaxation = self.relax_from(s, None, None)?;
        Ok(self.collect_paths(s, relaxation))
    }

    /// Shortest distances from `start`, allowing negative edge weights
    ///
    /// Runs at most one relaxation pass per vertex and stops early once a
    /// pass changes nothing.
    ///
    /// # Errors
    /// - [`StructureError::VertexNotFound`] if `start` is absent
    /// - [`StructureError::NegativeCycle`] if a negative cycle is reachable from `start`
    /// - [`StructureError::CostOverflow`] if a path sum does not fit in `W`
    pub fn bellman_ford(&self, start: &V) -> Result<ShortestPaths<V, W>> {
        let s = self.index_of(start)?;
        let relaxation = self.relax_all_from(s, None)?;
        Ok(self.collect_paths(s, relaxation))
    }

    /// Cheapest path from `start` to `goal`, `None` when unreachable
    ///
    /// # Errors
    /// Same as [`dijkstra`](Self::dijkstra), plus
    /// [`StructureError::VertexNotFound`] for an absent `goal`.
    pub fn shortest_path(&self, start: &V, goal: &V) -> Result<Option<PathResult<V, W>>> {
        let s = self.index_of(start)?;
        let g = self.index_of(goal)?;
        let relaxation = self.relax_from(s, Some(g), None)?;
        Ok(self.reconstruct_path(&relaxation, g))
    }

    /// Fails on the first negative edge reachable from `source`
    fn check_weights(&self, source: usize) -> Result<()> {
        let zero = W::default();
        let mut walk = Bfs {
            graph: self,
            queue: VecDeque::from([source]),
            visited: {
                let mut visited = vec![false; self.vertices.len()];
                visited[source] = true;
                visited
            },
        };
        while let Some(u) = walk.next_index() {
            if let Some(&(v, w)) = self.adjacency[u].iter().find(|&&(_, w)| w < zero) {
                return Err(StructureError::NegativeWeight {
                    from: format!("{:?}", self.vertices[u]),
                    to: format!("{:?}", self.vertices[v]),
                    weight: format!("{w:?}"),
                });
            }
        }
        Ok(())
    }

    /// Runs Dijkstra from `source`, stopping once `goal` is settled if given.
    /// Settle and relax steps go to `recorder` when present.
    fn relax_from(
        &self,
        source: usize,
        goal: Option<usize>,
        mut recorder: Option<&mut StepLog<V, GraphView<V, W>>>,
    ) -> Result<Relaxation<W>> {
        self.check_weights(source)?;

        let n = self.vertices.len();
        let mut dist: Vec<Option<W>> = vec![None; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut frontier = BinaryHeap::min();

        dist[source] = Some(W::default());
        frontier.push(Frontier {
            dist: W::default(),
            vertex: source,
        });

        while let Some(Frontier { dist: d, vertex: u }) = frontier.pop() {
            if settled[u] {
                continue;
            }
            settled[u] = true;
            if let Some(log) = recorder.as_deref_mut() {
                let after = log.capture(|| GraphView::Distance(Distance::Finite(d)));
                log.push(StepKind::Settle, [self.vertices[u].clone()], None, after);
            }
            if goal == Some(u) {
                break;
            }

            for &(v, w) in &self.adjacency[u] {
                if settled[v] {
                    continue;
                }
                let Some(candidate) = self.extend(u, v, d, w, dist[v])? else {
                    continue;
                };
                if dist[v].map_or(true, |current| candidate < current) {
                    trace!(from = u, to = v, dist = ?candidate, "relax");
                    if let Some(log) = recorder.as_deref_mut() {
                        self.record_relax(log, u, v, dist[v], candidate);
                    }
                    dist[v] = Some(candidate);
                    prev[v] = Some(u);
                    frontier.push(Frontier {
                        dist: candidate,
                        vertex: v,
                    });
                }
            }
        }

        Ok(Relaxation { dist, prev })
    }

    /// Bellman-Ford from `source`. One pass relaxes every edge leaving a
    /// reached vertex; a change during pass `n` means a negative cycle.
    fn relax_all_from(
        &self,
        source: usize,
        mut recorder: Option<&mut StepLog<V, GraphView<V, W>>>,
    ) -> Result<Relaxation<W>> {
        let n = self.vertices.len();
        let mut dist: Vec<Option<W>> = vec![None; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        dist[source] = Some(W::default());

        let mut last_changed = None;
        for pass in 0..n {
            last_changed = None;
            for u in 0..n {
                let Some(d) = dist[u] else {
                    continue;
                };
                for &(v, w) in &self.adjacency[u] {
                    let Some(candidate) = self.extend(u, v, d, w, dist[v])? else {
                        continue;
                    };
                    if dist[v].map_or(true, |current| candidate < current) {
                        trace!(pass, from = u, to = v, dist = ?candidate, "relax");
                        if let Some(log) = recorder.as_deref_mut() {
                            self.record_relax(log, u, v, dist[v], candidate);
                        }
                        dist[v] = Some(candidate);
                        prev[v] = Some(u);
                        last_changed = Some(v);
                    }
                }
            }
            if last_changed.is_none() {
                break;
            }
        }

        if let Some(v) = last_changed {
            debug!(vertex = ?self.vertices[v], "negative cycle detected");
            return Err(StructureError::NegativeCycle(format!("{:?}", self.vertices[v])));
        }

        if let Some(log) = recorder {
            for (u, d) in dist.iter().enumerate() {
                if let Some(d) = *d {
                    let after = log.capture(|| GraphView::Distance(Distance::Finite(d)));
                    log.push(StepKind::Settle, [self.vertices[u].clone()], None, after);
                }
            }
        }
        Ok(Relaxation { dist, prev })
    }

    /// `d + w` for the edge `u -> v`. An overflowing sum that could not beat
    /// the `known` distance of `v` anyway is skipped (`None`).
    fn extend(&self, u: usize, v: usize, d: W, w: W, known: Option<W>) -> Result<Option<W>> {
        match d.checked_add(w) {
            Some(sum) => Ok(Some(sum)),
            None if known.is_some() && w > W::default() => Ok(None),
            None => Err(StructureError::CostOverflow {
                from: format!("{:?}", self.vertices[u]),
                to: format!("{:?}", self.vertices[v]),
            }),
        }
    }

    fn record_relax(
        &self,
        log: &mut StepLog<V, GraphView<V, W>>,
        u: usize,
        v: usize,
        old: Option<W>,
        new: W,
    ) {
        let before = log.capture(|| GraphView::Distance(old.into()));
        let after = log.capture(|| GraphView::Distance(Distance::Finite(new)));
        log.push(
            StepKind::Relax,
            [self.vertices[v].clone(), self.vertices[u].clone()],
            before,
            after,
        );
    }

    fn collect_paths(&self, source: usize, relaxation: Relaxation<W>) -> ShortestPaths<V, W> {
        let mut distances = FxHashMap::default();
        let mut predecessors = FxHashMap::default();
        for (i, id) in self.vertices.iter().enumerate() {
            distances.insert(id.clone(), relaxation.dist[i].into());
            if let Some(p) = relaxation.prev[i] {
                predecessors.insert(id.clone(), self.vertices[p].clone());
            }
        }
        ShortestPaths {
            source: self.vertices[source].clone(),
            distances,
            predecessors,
        }
    }

    fn reconstruct_path(&self, relaxation: &Relaxation<W>, goal: usize) -> Option<PathResult<V, W>> {
        let cost = relaxation.dist[goal]?;
        let mut path = vec![self.vertices[goal].clone()];
        let mut current = goal;
        while let Some(prev) = relaxation.prev[current] {
            path.push(self.vertices[prev].clone());
            current = prev;
        }
        path.reverse();
        Some(PathResult { path, cost })
    }
}

impl<V, W> Default for Graph<V, W> {
    fn default() -> Self {
        Self::undirected()
    }
}

/// Iterator returned by [`Graph::bfs`]
pub struct Bfs<'a, V, W> {
    graph: &'a Graph<V, W>,
    queue: VecDeque<usize>,
    visited: Vec<bool>,
}

impl<'a, V, W> Bfs<'a, V, W> {
    fn next_index(&mut self) -> Option<usize> {
        let u = self.queue.pop_front()?;
        for &(v, _) in &self.graph.adjacency[u] {
            if !self.visited[v] {
                self.visited[v] = true;
                self.queue.push_back(v);
            }
        }
        Some(u)
    }

    /// Vertices waiting in the queue, next first
    pub fn frontier(&self) -> impl Iterator<Item = &'a V> + '_ {
        let vertices = &self.graph.vertices;
        self.queue.iter().map(move |&i| &vertices[i])
    }
}

impl<'a, V, W> Iterator for Bfs<'a, V, W> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        self.next_index().map(|u| &graph.vertices[u])
    }
}

impl<V, W> FusedIterator for Bfs<'_, V, W> {}

/// Iterator returned by [`Graph::dfs`]
pub struct Dfs<'a, V, W> {
    graph: &'a Graph<V, W>,
    stack: Vec<usize>,
    visited: Vec<bool>,
}

impl<'a, V, W> Dfs<'a, V, W> {
    /// Vertices waiting on the stack, next first. May include vertices that
    /// will be skipped because they were reached another way.
    pub fn frontier(&self) -> impl Iterator<Item = &'a V> + '_ {
        let vertices = &self.graph.vertices;
        self.stack.iter().rev().map(move |&i| &vertices[i])
    }
}

impl<'a, V, W> Iterator for Dfs<'a, V, W> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        loop {
            let u = self.stack.pop()?;
            if self.visited[u] {
                continue;
            }
            self.visited[u] = true;
            // reversed so the first-listed neighbor is popped first
            for &(v, _) in graph.adjacency[u].iter().rev() {
                if !self.visited[v] {
                    self.stack.push(v);
                }
            }
            return Some(&graph.vertices[u]);
        }
    }
}

impl<V, W> FusedIterator for Dfs<'_, V, W> {}

/// Arguments of the `add_edge` operation: `[u, v]` or `[u, v, weight]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EdgeArgs<V, W> {
    /// Explicit weight
    Weighted(V, V, W),
    /// Weight 1
    Unit(V, V),
}

/// Operations accepted by [`Graph::perform`](Animated::perform)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum GraphOperation<V, W> {
    /// Add a vertex
    AddVertex(V),
    /// Add an edge
    AddEdge(EdgeArgs<V, W>),
    /// Breadth-first order from a vertex
    Bfs(V),
    /// Depth-first order from a vertex
    Dfs(V),
    /// Distances from a vertex
    Dijkstra(V),
    /// Distances from a vertex, negative weights allowed
    BellmanFord(V),
    /// Cheapest path between two vertices
    ShortestPath(V, V),
}

/// Output of [`Graph::perform`](Animated::perform)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GraphOutput<V: Eq + Hash, W> {
    /// Vertex or edge added
    Updated,
    /// Visit order of a traversal
    Order(Vec<V>),
    /// Dijkstra or Bellman-Ford distances
    Distances(ShortestPaths<V, W>),
    /// Shortest path, `None` when unreachable
    Path(Option<PathResult<V, W>>),
}

impl<V, W> Animated for Graph<V, W>
where
    V: Clone + Eq + Hash + fmt::Debug + Serialize + DeserializeOwned,
    W: Cost + Serialize + DeserializeOwned,
{
    type Operation = GraphOperation<V, W>;
    type Output = GraphOutput<V, W>;
    type Id = V;
    type Snapshot = GraphView<V, W>;

    const OPERATIONS: &'static [&'static str] = &[
        "add_vertex",
        "add_edge",
        "bfs",
        "dfs",
        "dijkstra",
        "bellman_ford",
        "shortest_path",
    ];

    fn perform(
        &mut self,
        op: GraphOperation<V, W>,
    ) -> Result<Applied<GraphOutput<V, W>, V, GraphView<V, W>>> {
        let mut scratch = StepLog::new(self.log.captures_snapshots());
        let output = match op {
            GraphOperation::AddVertex(id) => {
                return Ok((GraphOutput::Updated, self.add_vertex(id)));
            }
            GraphOperation::AddEdge(EdgeArgs::Weighted(u, v, w)) => {
                return Ok((GraphOutput::Updated, self.add_edge(&u, &v, w)?));
            }
            GraphOperation::AddEdge(EdgeArgs::Unit(u, v)) => {
                return Ok((GraphOutput::Updated, self.add_unit_edge(&u, &v)?));
            }
            GraphOperation::Bfs(start) => {
                let mut walk = self.bfs(&start)?;
                let mut order = Vec::new();
                while let Some(v) = walk.next() {
                    let after = scratch.capture(|| GraphView::Frontier(walk.frontier().cloned().collect()));
                    scratch.push(StepKind::Visit, [v.clone()], None, after);
                    order.push(v.clone());
                }
                GraphOutput::Order(order)
            }
            GraphOperation::Dfs(start) => {
                let mut walk = self.dfs(&start)?;
                let mut order = Vec::new();
                while let Some(v) = walk.next() {
                    let after = scratch.capture(|| GraphView::Frontier(walk.frontier().cloned().collect()));
                    scratch.push(StepKind::Visit, [v.clone()], None, after);
                    order.push(v.clone());
                }
                GraphOutput::Order(order)
            }
            GraphOperation::Dijkstra(start) => {
                let s = self.index_of(&start)?;
                let relaxation = self.relax_from(s, None, Some(&mut scratch))?;
                GraphOutput::Distances(self.collect_paths(s, relaxation))
            }
            GraphOperation::BellmanFord(start) => {
                let s = self.index_of(&start)?;
                let relaxation = self.relax_all_from(s, Some(&mut scratch))?;
                GraphOutput::Distances(self.collect_paths(s, relaxation))
            }
            GraphOperation::ShortestPath(start, goal) => {
                let s = self.index_of(&start)?;
                let g = self.index_of(&goal)?;
                let relaxation = self.relax_from(s, Some(g), Some(&mut scratch))?;
                GraphOutput::Path(self.reconstruct_path(&relaxation, g))
            }
        };

        let mark = self.log.mark();
        self.log.absorb(scratch);
        debug!(steps = self.log.len() - mark, "traversal complete");
        Ok((output, self.log.since(mark)))
    }

    fn step_log(&self) -> &StepLog<V, GraphView<V, W>> {
        &self.log
    }

    fn step_log_mut(&mut self) -> &mut StepLog<V, GraphView<V, W>> {
        &mut self.log
    }

    fn reset(&mut self) {
        Graph::reset(self);
    }
}
