use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Structural options fixed at construction time.
#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    /// When false, parallel edges collapse onto one key and edge names are ignored.
    pub multigraph: bool,
    /// When false, edge endpoints are normalized so (v, w) and (w, v) address the same edge.
    pub directed: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            multigraph: false,
            directed: true,
        }
    }
}

/// Identity of one edge: endpoints plus an optional name distinguishing
/// parallel edges in a multigraph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }
}

/// Borrowed lookup key; hashes identically to `EdgeKey`.
#[derive(Clone, Copy, Hash)]
struct EdgeKeyRef<'a> {
    v: &'a str,
    w: &'a str,
    name: Option<&'a str>,
}

impl<'a> hashbrown::Equivalent<EdgeKey> for EdgeKeyRef<'a> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.v == self.v && key.w == self.w && key.name.as_deref() == self.name
    }
}

#[derive(Debug)]
struct NodeEntry<N> {
    id: String,
    label: N,
    /// Indices into `edges` where this node is the stored tail / head.
    out: Vec<usize>,
    in_: Vec<usize>,
}

#[derive(Debug)]
struct EdgeEntry<E> {
    key: EdgeKey,
    label: E,
}

/// A labeled graph over string node ids.
///
/// Nodes and edges are stored in insertion order, so every iteration the
/// container offers is deterministic. Each node carries eager in/out
/// adjacency lists (edge indices), kept consistent by the mutating methods,
/// which makes neighbor and incidence queries O(degree) on `&self`.
pub struct Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    options: GraphOptions,

    graph_label: G,
    default_node_label: Box<dyn Fn() -> N + Send + Sync>,
    default_edge_label: Box<dyn Fn() -> E + Send + Sync>,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            graph_label: G::default(),
            default_node_label: Box::new(N::default),
            default_edge_label: Box::new(E::default),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn is_multigraph(&self) -> bool {
        self.options.multigraph
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    /// Label produced for nodes created implicitly by `set_edge`.
    pub fn set_default_node_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> N + Send + Sync + 'static,
    {
        self.default_node_label = Box::new(f);
        self
    }

    /// Label produced for edges set without an explicit label.
    pub fn set_default_edge_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.default_edge_label = Box::new(f);
        self
    }

    fn key_ref<'a>(&self, v: &'a str, w: &'a str, name: Option<&'a str>) -> EdgeKeyRef<'a> {
        let (v, w) = if self.options.directed || v <= w {
            (v, w)
        } else {
            (w, v)
        };
        let name = if self.options.multigraph { name } else { None };
        EdgeKeyRef { v, w, name }
    }

    fn canonical_key(&self, mut key: EdgeKey) -> EdgeKey {
        if !self.options.directed && key.v > key.w {
            std::mem::swap(&mut key.v, &mut key.w);
        }
        if !self.options.multigraph {
            key.name = None;
        }
        key
    }

    // --- nodes ---

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
            out: Vec::new(),
            in_: Vec::new(),
        });
        self.node_index.insert(id, idx);
        self
    }

    /// Inserts `id` with the default node label unless it already exists.
    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        let label = (self.default_node_label)();
        self.set_node(id, label)
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &N)> {
        self.nodes.iter().map(|n| (n.id.as_str(), &n.label))
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = (&str, &mut N)> {
        self.nodes.iter_mut().map(|n| (n.id.as_str(), &mut n.label))
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn first_node(&self) -> Option<&str> {
        self.nodes.first().map(|n| n.id.as_str())
    }

    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(&idx) = self.node_index.get(id) else {
            return false;
        };
        loop {
            let eidx = {
                let n = &self.nodes[idx];
                n.out.first().or(n.in_.first()).copied()
            };
            match eidx {
                Some(eidx) => self.remove_edge_at(eidx),
                None => break,
            }
        }
        self.node_index.remove(id);
        self.nodes.remove(idx);
        for i in idx..self.nodes.len() {
            if let Some(slot) = self.node_index.get_mut(self.nodes[i].id.as_str()) {
                *slot = i;
            }
        }
        true
    }

    // --- edges ---

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &E)> {
        self.edges.iter().map(|e| (&e.key, &e.label))
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = (&EdgeKey, &mut E)> {
        self.edges.iter_mut().map(|e| (&e.key, &mut e.label))
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.iter().map(|e| e.key.clone()).collect()
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    /// Inserts or updates the edge (v, w, name), creating missing endpoints
    /// with the default node label. Passing no label keeps the existing label
    /// on update and uses the default label on insert.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let key = self.canonical_key(EdgeKey::new(v, w, name));
        self.ensure_node(key.v.clone());
        self.ensure_node(key.w.clone());

        if let Some(&idx) = self.edge_index.get(&key) {
            if let Some(label) = label {
                self.edges[idx].label = label;
            }
            return self;
        }

        let label = label.unwrap_or_else(|| (self.default_edge_label)());
        let idx = self.edges.len();
        let v_idx = self.node_index[key.v.as_str()];
        let w_idx = self.node_index[key.w.as_str()];
        self.nodes[v_idx].out.push(idx);
        self.nodes[w_idx].in_.push(idx);
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label,
        });
        self.edge_index.insert(key, idx);
        self
    }

    pub fn set_edge_key(&mut self, key: EdgeKey, label: E) -> &mut Self {
        self.set_edge_named(key.v, key.w, key.name, Some(label))
    }

    /// Adds the default-labeled edge for every consecutive pair in `nodes`.
    pub fn set_path(&mut self, nodes: &[&str]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.edge_index.contains_key(&self.key_ref(v, w, name))
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let idx = *self.edge_index.get(&self.key_ref(v, w, name))?;
        Some(&self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let idx = *self.edge_index.get(&self.key_ref(v, w, name))?;
        Some(&mut self.edges[idx].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w, key.name.as_deref())
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        let idx = *self
            .edge_index
            .get(&self.key_ref(&key.v, &key.w, key.name.as_deref()))?;
        Some(&mut self.edges[idx].label)
    }

    pub fn remove_edge(&mut self, v: &str, w: &str, name: Option<&str>) -> bool {
        let Some(&idx) = self.edge_index.get(&self.key_ref(v, w, name)) else {
            return false;
        };
        self.remove_edge_at(idx);
        true
    }

    pub fn remove_edge_key(&mut self, key: &EdgeKey) -> bool {
        self.remove_edge(&key.v, &key.w, key.name.as_deref())
    }

    fn remove_edge_at(&mut self, idx: usize) {
        let key = self.edges[idx].key.clone();
        self.edge_index.remove(&key);
        self.edges.remove(idx);
        // Entries past idx shifted down by one; repair both index structures.
        for i in idx..self.edges.len() {
            if let Some(slot) = self.edge_index.get_mut(&self.edges[i].key) {
                *slot = i;
            }
        }
        for node in &mut self.nodes {
            node.out.retain(|&e| e != idx);
            node.in_.retain(|&e| e != idx);
            for e in &mut node.out {
                if *e > idx {
                    *e -= 1;
                }
            }
            for e in &mut node.in_ {
                if *e > idx {
                    *e -= 1;
                }
            }
        }
    }

    // --- adjacency ---

    /// Targets of edges stored with `v` as tail, in insertion order. For
    /// undirected graphs this reflects the normalized orientation; use
    /// `neighbors` for orientation-free adjacency.
    pub fn successors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.incident_nodes(v);
        }
        let Some(&idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[idx]
            .out
            .iter()
            .map(|&e| self.edges[e].key.w.as_str())
            .collect()
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.incident_nodes(v);
        }
        let Some(&idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[idx]
            .in_
            .iter()
            .map(|&e| self.edges[e].key.v.as_str())
            .collect()
    }

    /// Adjacent nodes in either direction, deduplicated, first-seen order.
    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.incident_nodes(v);
        }
        let mut out: Vec<&str> = Vec::new();
        for w in self.successors(v) {
            if !out.contains(&w) {
                out.push(w);
            }
        }
        for u in self.predecessors(v) {
            if !out.contains(&u) {
                out.push(u);
            }
        }
        out
    }

    fn incident_nodes(&self, v: &str) -> Vec<&str> {
        let Some(&idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        let n = &self.nodes[idx];
        let mut out: Vec<&str> = Vec::new();
        for &e in n.out.iter().chain(n.in_.iter()) {
            let key = &self.edges[e].key;
            let other = if key.v == v {
                key.w.as_str()
            } else {
                key.v.as_str()
            };
            if !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    pub fn out_edges(&self, v: &str) -> Vec<EdgeKey> {
        if !self.options.directed {
            return self.node_edges(v);
        }
        let Some(&idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[idx]
            .out
            .iter()
            .map(|&e| self.edges[e].key.clone())
            .collect()
    }

    pub fn in_edges(&self, v: &str) -> Vec<EdgeKey> {
        if !self.options.directed {
            return self.node_edges(v);
        }
        let Some(&idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[idx]
            .in_
            .iter()
            .map(|&e| self.edges[e].key.clone())
            .collect()
    }

    /// All edges incident to `v`, out-edges first.
    pub fn node_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(&idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        let n = &self.nodes[idx];
        n.out
            .iter()
            .chain(n.in_.iter())
            .map(|&e| self.edges[e].key.clone())
            .collect()
    }

    /// Nodes with no incoming edges, in insertion order.
    pub fn sources(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.in_.is_empty())
            .map(|n| n.id.clone())
            .collect()
    }

    /// Nodes with no outgoing edges, in insertion order.
    pub fn sinks(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.out.is_empty())
            .map(|n| n.id.clone())
            .collect()
    }
}

impl<N, E, G> std::fmt::Debug for Graph<N, E, G>
where
    N: Default + std::fmt::Debug + 'static,
    E: Default + std::fmt::Debug + 'static,
    G: Default + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("options", &self.options)
            .field("graph_label", &self.graph_label)
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}
