//! Maximum-weight matching on a general graph.
//!
//! Edmonds' blossom algorithm with primal-dual updates, O(n³). Weights are integers
//! so every dual update is exact; callers with real-valued weights scale them first.
//!
//! Internally, edge `k` has two endpoints: `2k` refers to its first vertex and `2k + 1`
//! to its second. `p ^ 1` flips to the opposite end of the same edge. Vertices are
//! `0..n`, non-trivial blossoms `n..2n`. Dual variables and slacks are stored doubled.

/// Sentinel for "no vertex / no endpoint / no blossom".
const NONE: usize = usize::MAX;

const FREE: u8 = 0;
const S_LABEL: u8 = 1;
const T_LABEL: u8 = 2;
const BREADCRUMB: u8 = 5;

/// Compute a maximum-weight matching.
///
/// `edges` are `(u, v, weight)` with `u != v`; the vertex count is one more than the
/// largest index mentioned. With `max_cardinality`, the result is the maximum-weight
/// matching among the matchings of maximum size (a perfect matching when one exists).
///
/// Returns `mate[v]`: the vertex matched to `v`, or `None`.
pub fn max_weight_matching(
    edges: &[(usize, usize, i64)],
    max_cardinality: bool,
) -> Vec<Option<usize>> {
    if edges.is_empty() {
        return Vec::new();
    }
    let mut solver = Blossom::new(edges, max_cardinality);
    solver.solve();
    solver
        .mate
        .iter()
        .map(|&p| (p != NONE).then(|| solver.endpoint[p]))
        .collect()
}

/// Matched pairs `(u, v)` with `u < v`, in ascending order of `u`.
pub fn matched_pairs(mates: &[Option<usize>]) -> Vec<(usize, usize)> {
    mates
        .iter()
        .enumerate()
        .filter_map(|(u, m)| m.filter(|&v| u < v).map(|v| (u, v)))
        .collect()
}

struct Blossom<'a> {
    edges: &'a [(usize, usize, i64)],
    max_cardinality: bool,
    nvertex: usize,
    /// Vertex at each edge endpoint.
    endpoint: Vec<usize>,
    /// For each vertex, the remote endpoints of its incident edges.
    neighbend: Vec<Vec<usize>>,
    /// For each vertex, the remote endpoint of its matched edge.
    mate: Vec<usize>,
    /// Label of each vertex and top-level blossom.
    label: Vec<u8>,
    /// Endpoint through which a vertex or blossom obtained its label.
    label_end: Vec<usize>,
    /// Top-level blossom containing each vertex.
    in_blossom: Vec<usize>,
    blossom_parent: Vec<usize>,
    /// Sub-blossoms of each blossom, in cyclic order starting at the base.
    blossom_children: Vec<Vec<usize>>,
    blossom_base: Vec<usize>,
    /// Endpoints joining consecutive sub-blossoms: `blossom_endps[b][i]` connects
    /// `children[i]` to `children[i + 1]`.
    blossom_endps: Vec<Vec<usize>>,
    /// Least-slack edge to a different S-blossom (or, for free vertices, from an S-vertex).
    best_edge: Vec<usize>,
    /// Per S-blossom, the least-slack edges to neighbouring S-blossoms.
    blossom_best_edges: Vec<Option<Vec<usize>>>,
    unused_blossoms: Vec<usize>,
    dual: Vec<i64>,
    allow_edge: Vec<bool>,
    queue: Vec<usize>,
}

impl<'a> Blossom<'a> {
    fn new(edges: &'a [(usize, usize, i64)], max_cardinality: bool) -> Self {
        let nvertex = edges.iter().map(|&(i, j, _)| i.max(j) + 1).max().unwrap_or(0);
        let max_weight = edges.iter().map(|&(_, _, w)| w).max().unwrap_or(0).max(0);

        let endpoint: Vec<usize> = (0..2 * edges.len())
            .map(|p| {
                let (i, j, _) = edges[p / 2];
                if p % 2 == 0 { i } else { j }
            })
            .collect();

        let mut neighbend = vec![Vec::new(); nvertex];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            neighbend[i].push(2 * k + 1);
            neighbend[j].push(2 * k);
        }

        let mut blossom_base: Vec<usize> = (0..nvertex).collect();
        blossom_base.extend(std::iter::repeat_n(NONE, nvertex));

        let mut dual = vec![max_weight; nvertex];
        dual.extend(std::iter::repeat_n(0, nvertex));

        Self {
            edges,
            max_cardinality,
            nvertex,
            endpoint,
            neighbend,
            mate: vec![NONE; nvertex],
            label: vec![FREE; 2 * nvertex],
            label_end: vec![NONE; 2 * nvertex],
            in_blossom: (0..nvertex).collect(),
            blossom_parent: vec![NONE; 2 * nvertex],
            blossom_children: vec![Vec::new(); 2 * nvertex],
            blossom_base,
            blossom_endps: vec![Vec::new(); 2 * nvertex],
            best_edge: vec![NONE; 2 * nvertex],
            blossom_best_edges: vec![None; 2 * nvertex],
            unused_blossoms: (nvertex..2 * nvertex).collect(),
            dual,
            allow_edge: vec![false; edges.len()],
            queue: Vec::new(),
        }
    }

    fn slack(&self, k: usize) -> i64 {
        let (i, j, w) = self.edges[k];
        self.dual[i] + self.dual[j] - 2 * w
    }

    /// All vertices contained in blossom `b`.
    fn blossom_leaves(&self, b: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![b];
        while let Some(t) = stack.pop() {
            if t < self.nvertex {
                leaves.push(t);
            } else {
                stack.extend(self.blossom_children[t].iter().rev().copied());
            }
        }
        leaves
    }

    /// Child of blossom `b` at cyclic position `j` (may be negative).
    fn child_at(&self, b: usize, j: isize) -> usize {
        let children = &self.blossom_children[b];
        children[j.rem_euclid(children.len() as isize) as usize]
    }

    /// Connecting endpoint of blossom `b` at cyclic position `j` (may be negative).
    fn endp_at(&self, b: usize, j: isize) -> usize {
        let endps = &self.blossom_endps[b];
        endps[j.rem_euclid(endps.len() as isize) as usize]
    }

    /// Assign label `t` to the top-level blossom containing vertex `w`, reached
    /// through endpoint `p`.
    fn assign_label(&mut self, w: usize, t: u8, p: usize) {
        let b = self.in_blossom[w];
        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = NONE;
        self.best_edge[b] = NONE;
        if t == S_LABEL {
            let leaves = self.blossom_leaves(b);
            self.queue.extend(leaves);
        } else if t == T_LABEL {
            // The base is the only vertex of b with an external mate; it becomes S.
            let base = self.blossom_base[b];
            let mate = self.mate[base];
            self.assign_label(self.endpoint[mate], S_LABEL, mate ^ 1);
        }
    }

    /// Trace back from S-vertices `v` and `w` to find either a new blossom (returns
    /// its base) or an augmenting path (returns `None`).
    fn scan_blossom(&mut self, v: usize, w: usize) -> Option<usize> {
        let mut path = Vec::new();
        let mut base = None;
        let mut v = v;
        let mut w = w;
        while v != NONE {
            let mut b = self.in_blossom[v];
            if self.label[b] & 4 != 0 {
                base = Some(self.blossom_base[b]);
                break;
            }
            path.push(b);
            self.label[b] = BREADCRUMB;
            if self.label_end[b] == NONE {
                // The base of b is single; this path ends here.
                v = NONE;
            } else {
                v = self.endpoint[self.label_end[b]];
                b = self.in_blossom[v];
                // b is a T-blossom; step past it.
                v = self.endpoint[self.label_end[b]];
            }
            if w != NONE {
                std::mem::swap(&mut v, &mut w);
            }
        }
        for b in path {
            self.label[b] = S_LABEL;
        }
        base
    }

    /// Build a new blossom with the given base, closed by edge `k`.
    fn add_blossom(&mut self, base: usize, k: usize) {
        let (mut v, mut w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];

        let Some(b) = self.unused_blossoms.pop() else {
            return;
        };
        self.blossom_base[b] = base;
        self.blossom_parent[b] = NONE;
        self.blossom_parent[bb] = b;

        let mut path = Vec::new();
        let mut endps = Vec::new();
        // Trace back from v to the base.
        while bv != bb {
            self.blossom_parent[bv] = b;
            path.push(bv);
            endps.push(self.label_end[bv]);
            v = self.endpoint[self.label_end[bv]];
            bv = self.in_blossom[v];
        }
        path.push(bb);
        path.reverse();
        endps.reverse();
        endps.push(2 * k);
        // Trace back from w to the base.
        while bw != bb {
            self.blossom_parent[bw] = b;
            path.push(bw);
            endps.push(self.label_end[bw] ^ 1);
            w = self.endpoint[self.label_end[bw]];
            bw = self.in_blossom[w];
        }

        self.label[b] = S_LABEL;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0;

        self.blossom_children[b] = path.clone();
        self.blossom_endps[b] = endps;

        for leaf in self.blossom_leaves(b) {
            if self.label[self.in_blossom[leaf]] == T_LABEL {
                // A T-vertex inside a new S-blossom becomes an S-vertex.
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        // Least-slack edges from the new blossom to each neighbouring S-blossom.
        let mut best_edge_to = vec![NONE; 2 * self.nvertex];
        for &sub in &path {
            let candidates: Vec<usize> = match self.blossom_best_edges[sub].take() {
                Some(list) => list,
                None => self
                    .blossom_leaves(sub)
                    .into_iter()
                    .flat_map(|leaf| self.neighbend[leaf].iter().map(|p| p / 2))
                    .collect(),
            };
            for k in candidates {
                let (i, mut j, _) = self.edges[k];
                if self.in_blossom[j] == b {
                    j = i;
                }
                let bj = self.in_blossom[j];
                if bj != b
                    && self.label[bj] == S_LABEL
                    && (best_edge_to[bj] == NONE
                        || self.slack(k) < self.slack(best_edge_to[bj]))
                {
                    best_edge_to[bj] = k;
                }
            }
            self.best_edge[sub] = NONE;
        }
        let best: Vec<usize> = best_edge_to.into_iter().filter(|&k| k != NONE).collect();
        self.best_edge[b] = NONE;
        for &k in &best {
            if self.best_edge[b] == NONE || self.slack(k) < self.slack(self.best_edge[b]) {
                self.best_edge[b] = k;
            }
        }
        self.blossom_best_edges[b] = Some(best);
    }

    /// Dissolve blossom `b` into its sub-blossoms.
    fn expand_blossom(&mut self, b: usize, end_stage: bool) {
        let children = self.blossom_children[b].clone();
        for &s in &children {
            self.blossom_parent[s] = NONE;
            if s < self.nvertex {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == 0 {
                self.expand_blossom(s, end_stage);
            } else {
                for leaf in self.blossom_leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }

        // Expanding a T-blossom mid-stage: relabel its sub-blossoms.
        if !end_stage && self.label[b] == T_LABEL {
            let entry_child = self.in_blossom[self.endpoint[self.label_end[b] ^ 1]];
            let len = children.len() as isize;
            let mut j = children
                .iter()
                .position(|&c| c == entry_child)
                .unwrap_or(0) as isize;
            let (jstep, endptrick): (isize, usize) = if j & 1 == 1 {
                j -= len;
                (1, 0)
            } else {
                (-1, 1)
            };

            let mut p = self.label_end[b];
            while j != 0 {
                // Relabel the T-sub-blossom.
                let t = self.endpoint[p ^ 1];
                self.label[t] = FREE;
                let q = self.endp_at(b, j - endptrick as isize) ^ endptrick ^ 1;
                self.label[self.endpoint[q]] = FREE;
                self.assign_label(t, T_LABEL, p);
                // Step to the next S-sub-blossom.
                let k = self.endp_at(b, j - endptrick as isize) / 2;
                self.allow_edge[k] = true;
                j += jstep;
                p = self.endp_at(b, j - endptrick as isize) ^ endptrick;
                // Step to the next T-sub-blossom.
                self.allow_edge[p / 2] = true;
                j += jstep;
            }

            // Relabel the base T-sub-blossom without stepping through to its mate.
            let bv = self.child_at(b, j);
            let t = self.endpoint[p ^ 1];
            self.label[t] = T_LABEL;
            self.label[bv] = T_LABEL;
            self.label_end[t] = p;
            self.label_end[bv] = p;
            self.best_edge[bv] = NONE;

            j += jstep;
            while self.child_at(b, j) != entry_child {
                let bv = self.child_at(b, j);
                if self.label[bv] == S_LABEL {
                    j += jstep;
                    continue;
                }
                let reached = self
                    .blossom_leaves(bv)
                    .into_iter()
                    .find(|&v| self.label[v] != FREE);
                if let Some(v) = reached {
                    self.label[v] = FREE;
                    let base_mate = self.mate[self.blossom_base[bv]];
                    self.label[self.endpoint[base_mate]] = FREE;
                    self.assign_label(v, T_LABEL, self.label_end[v]);
                }
                j += jstep;
            }
        }

        // Recycle the blossom number.
        self.label[b] = FREE;
        self.label_end[b] = NONE;
        self.blossom_children[b].clear();
        self.blossom_endps[b].clear();
        self.blossom_base[b] = NONE;
        self.blossom_best_edges[b] = None;
        self.best_edge[b] = NONE;
        self.unused_blossoms.push(b);
    }

    /// Swap matched and unmatched edges along the even path inside blossom `b`
    /// from vertex `v` to the base, making `v` the new base.
    fn augment_blossom(&mut self, b: usize, v: usize) {
        let mut t = v;
        while self.blossom_parent[t] != b {
            t = self.blossom_parent[t];
        }
        if t >= self.nvertex {
            self.augment_blossom(t, v);
        }

        let len = self.blossom_children[b].len() as isize;
        let i = self.blossom_children[b]
            .iter()
            .position(|&c| c == t)
            .unwrap_or(0);
        let mut j = i as isize;
        let (jstep, endptrick): (isize, usize) = if i & 1 == 1 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += jstep;
            let t = self.child_at(b, j);
            let p = self.endp_at(b, j - endptrick as isize) ^ endptrick;
            if t >= self.nvertex {
                self.augment_blossom(t, self.endpoint[p]);
            }
            j += jstep;
            let t = self.child_at(b, j);
            if t >= self.nvertex {
                self.augment_blossom(t, self.endpoint[p ^ 1]);
            }
            self.mate[self.endpoint[p]] = p ^ 1;
            self.mate[self.endpoint[p ^ 1]] = p;
        }

        self.blossom_children[b].rotate_left(i);
        self.blossom_endps[b].rotate_left(i);
        self.blossom_base[b] = self.blossom_base[self.blossom_children[b][0]];
    }

    /// Augment the matching along the path through edge `k` between two S-vertices.
    fn augment_matching(&mut self, k: usize) {
        let (v, w, _) = self.edges[k];
        for (start, remote) in [(v, 2 * k + 1), (w, 2 * k)] {
            let mut s = start;
            let mut p = remote;
            loop {
                let bs = self.in_blossom[s];
                if bs >= self.nvertex {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = p;
                if self.label_end[bs] == NONE {
                    // Reached a single vertex.
                    break;
                }
                let t = self.endpoint[self.label_end[bs]];
                let bt = self.in_blossom[t];
                s = self.endpoint[self.label_end[bt]];
                let j = self.endpoint[self.label_end[bt] ^ 1];
                if bt >= self.nvertex {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = self.label_end[bt];
                p = self.label_end[bt] ^ 1;
            }
        }
    }

    fn is_top_level_blossom(&self, b: usize) -> bool {
        self.blossom_base[b] != NONE && self.blossom_parent[b] == NONE
    }

    fn solve(&mut self) {
        let n = self.nvertex;
        for _stage in 0..n {
            self.label.fill(FREE);
            self.best_edge.fill(NONE);
            for slot in &mut self.blossom_best_edges[n..] {
                *slot = None;
            }
            self.allow_edge.fill(false);
            self.queue.clear();

            for v in 0..n {
                if self.mate[v] == NONE && self.label[self.in_blossom[v]] == FREE {
                    self.assign_label(v, S_LABEL, NONE);
                }
            }

            let mut augmented = false;
            loop {
                while !augmented {
                    let Some(v) = self.queue.pop() else {
                        break;
                    };
                    for idx in 0..self.neighbend[v].len() {
                        let p = self.neighbend[v][idx];
                        let k = p / 2;
                        let w = self.endpoint[p];
                        if self.in_blossom[v] == self.in_blossom[w] {
                            // Internal to a blossom.
                            continue;
                        }
                        let mut kslack = 0;
                        if !self.allow_edge[k] {
                            kslack = self.slack(k);
                            if kslack <= 0 {
                                self.allow_edge[k] = true;
                            }
                        }
                        if self.allow_edge[k] {
                            let bw = self.in_blossom[w];
                            if self.label[bw] == FREE {
                                // w is free: label it T and its mate S.
                                self.assign_label(w, T_LABEL, p ^ 1);
                            } else if self.label[bw] == S_LABEL {
                                match self.scan_blossom(v, w) {
                                    Some(base) => self.add_blossom(base, k),
                                    None => {
                                        self.augment_matching(k);
                                        augmented = true;
                                        break;
                                    }
                                }
                            } else if self.label[w] == FREE {
                                // w sits inside a T-blossom but was not reached yet.
                                self.label[w] = T_LABEL;
                                self.label_end[w] = p ^ 1;
                            }
                        } else if self.label[self.in_blossom[w]] == S_LABEL {
                            let b = self.in_blossom[v];
                            if self.best_edge[b] == NONE
                                || kslack < self.slack(self.best_edge[b])
                            {
                                self.best_edge[b] = k;
                            }
                        } else if self.label[w] == FREE
                            && (self.best_edge[w] == NONE
                                || kslack < self.slack(self.best_edge[w]))
                        {
                            self.best_edge[w] = k;
                        }
                    }
                }

                if augmented {
                    break;
                }

                // No augmenting path under the current duals: compute delta.
                let mut delta_type = 0;
                let mut delta = 0_i64;
                let mut delta_edge = NONE;
                let mut delta_blossom = NONE;

                if !self.max_cardinality {
                    delta_type = 1;
                    delta = self.dual[..n].iter().copied().min().unwrap_or(0);
                }

                // delta2: least slack from an S-vertex to a free vertex.
                for v in 0..n {
                    if self.label[self.in_blossom[v]] == FREE && self.best_edge[v] != NONE {
                        let d = self.slack(self.best_edge[v]);
                        if delta_type == 0 || d < delta {
                            delta = d;
                            delta_type = 2;
                            delta_edge = self.best_edge[v];
                        }
                    }
                }

                // delta3: half the least slack between two S-blossoms.
                for b in 0..2 * n {
                    if self.blossom_parent[b] == NONE
                        && self.label[b] == S_LABEL
                        && self.best_edge[b] != NONE
                    {
                        let d = self.slack(self.best_edge[b]) / 2;
                        if delta_type == 0 || d < delta {
                            delta = d;
                            delta_type = 3;
                            delta_edge = self.best_edge[b];
                        }
                    }
                }

                // delta4: least dual of a top-level T-blossom.
                for b in n..2 * n {
                    if self.is_top_level_blossom(b)
                        && self.label[b] == T_LABEL
                        && (delta_type == 0 || self.dual[b] < delta)
                    {
                        delta = self.dual[b];
                        delta_type = 4;
                        delta_blossom = b;
                    }
                }

                if delta_type == 0 {
                    // Maximum cardinality reached; final update keeps the duals feasible.
                    delta_type = 1;
                    delta = self.dual[..n].iter().copied().min().unwrap_or(0).max(0);
                }

                for v in 0..n {
                    match self.label[self.in_blossom[v]] {
                        S_LABEL => self.dual[v] -= delta,
                        T_LABEL => self.dual[v] += delta,
                        _ => {}
                    }
                }
                for b in n..2 * n {
                    if self.is_top_level_blossom(b) {
                        match self.label[b] {
                            S_LABEL => self.dual[b] += delta,
                            T_LABEL => self.dual[b] -= delta,
                            _ => {}
                        }
                    }
                }

                match delta_type {
                    1 => break,
                    2 => {
                        self.allow_edge[delta_edge] = true;
                        let (mut i, j, _) = self.edges[delta_edge];
                        if self.label[self.in_blossom[i]] == FREE {
                            i = j;
                        }
                        self.queue.push(i);
                    }
                    3 => {
                        self.allow_edge[delta_edge] = true;
                        let (i, _, _) = self.edges[delta_edge];
                        self.queue.push(i);
                    }
                    _ => self.expand_blossom(delta_blossom, false),
                }
            }

            if !augmented {
                break;
            }

            // End of stage: expand S-blossoms whose dual dropped to zero.
            for b in n..2 * n {
                if self.is_top_level_blossom(b)
                    && self.label[b] == S_LABEL
                    && self.dual[b] == 0
                {
                    self.expand_blossom(b, true);
                }
            }
        }
    }
}
