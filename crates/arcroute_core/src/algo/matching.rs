//! Minimum-cost perfect matching on a complete weighted graph.
//!
//! The default implementation is an exact primal-dual blossom algorithm
//! (maximum-weight matching under a cost-complement transform), which the
//! CPP exactness guarantees rest on. Ties between equal-total optima are
//! canonicalized to the lexicographically smallest pairing. Building with
//! the `greedy-matching` feature swaps in a documented approximate
//! fallback that pairs cheapest candidates first.

use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostics;
use crate::{Error, Result};

const NONE: usize = usize::MAX;

/// Pairs up the index set `0..weights.len()` at minimum total weight.
///
/// `weights` is a symmetric square matrix with an even side; the diagonal
/// is ignored. Returned pairs are `(low, high)` sorted by the low index.
pub fn min_cost_pairs(
    weights: &[Vec<i64>],
    cancel: &CancelToken,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<(usize, usize)>> {
    let k = weights.len();
    if k % 2 != 0 {
        return Err(Error::invariant(format!(
            "perfect matching requested on an odd set of {k} vertices"
        )));
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    #[cfg(feature = "greedy-matching")]
    {
        let _ = cancel;
        let pairs = greedy_pairs(weights, diagnostics);
        log::debug!("matching: greedy k={k} pairs={}", pairs.len());
        Ok(pairs)
    }

    #[cfg(not(feature = "greedy-matching"))]
    {
        let _ = diagnostics;
        let pairs = blossom_pairs(weights, cancel)?;
        log::debug!("matching: blossom k={k} pairs={}", pairs.len());
        Ok(pairs)
    }
}

/// Greedy fallback: candidate pairs ascending by `(weight, low, high)`,
/// each unmatched endpoint takes the cheapest compatible partner. On a
/// complete instance nothing is ever left over; the arbitrary-pairing
/// repair still exists for robustness and announces itself.
#[cfg_attr(not(feature = "greedy-matching"), allow(dead_code))]
fn greedy_pairs(weights: &[Vec<i64>], diagnostics: &mut Diagnostics) -> Vec<(usize, usize)> {
    let k = weights.len();
    let mut candidates = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            candidates.push((weights[i][j], i, j));
        }
    }
    candidates.sort();

    let mut matched = vec![false; k];
    let mut pairs = Vec::with_capacity(k / 2);
    for (_, i, j) in candidates {
        if !matched[i] && !matched[j] {
            matched[i] = true;
            matched[j] = true;
            pairs.push((i, j));
        }
    }

    let leftover: Vec<usize> = (0..k).filter(|&v| !matched[v]).collect();
    if !leftover.is_empty() {
        diagnostics.warn(format!(
            "greedy matching left {} vertices unpaired; pairing them arbitrarily",
            leftover.len()
        ));
        for chunk in leftover.chunks(2) {
            pairs.push((chunk[0], chunk[1]));
        }
    }

    pairs.sort();
    pairs
}

/// Exact matching with a canonical answer. The blossom algorithm fixes
/// the optimal total; pairs are then fixed smallest-first, each time
/// giving the lowest remaining vertex the lowest-indexed partner that
/// still completes to that total. The result is the lexicographically
/// smallest optimal pairing, so equal weights always resolve to the
/// smaller `(low, high)` pair.
#[cfg_attr(feature = "greedy-matching", allow(dead_code))]
fn blossom_pairs(weights: &[Vec<i64>], cancel: &CancelToken) -> Result<Vec<(usize, usize)>> {
    let k = weights.len();
    let mut remaining: Vec<usize> = (0..k).collect();
    let mut target = blossom_optimal_cost(weights, &remaining, cancel)?;

    let mut pairs = Vec::with_capacity(k / 2);
    while !remaining.is_empty() {
        let first = remaining[0];
        let mut fixed = None;
        for idx in 1..remaining.len() {
            let partner = remaining[idx];
            let rest: Vec<usize> = remaining[1..]
                .iter()
                .copied()
                .filter(|&v| v != partner)
                .collect();
            let rest_cost = if rest.is_empty() {
                0
            } else {
                blossom_optimal_cost(weights, &rest, cancel)?
            };
            if weights[first][partner] + rest_cost == target {
                fixed = Some((partner, rest, rest_cost));
                break;
            }
        }
        let Some((partner, rest, rest_cost)) = fixed else {
            return Err(Error::invariant(
                "no partner choice preserves the optimal matching total",
            ));
        };
        pairs.push((first, partner));
        remaining = rest;
        target = rest_cost;
    }
    Ok(pairs)
}

/// Minimum total weight of a perfect matching over `subset`, computed by
/// the blossom algorithm on complemented weights.
#[cfg_attr(feature = "greedy-matching", allow(dead_code))]
fn blossom_optimal_cost(
    weights: &[Vec<i64>],
    subset: &[usize],
    cancel: &CancelToken,
) -> Result<i64> {
    let s = subset.len();
    if s == 0 {
        return Ok(0);
    }
    let mut max_weight = 0;
    for a in 0..s {
        for b in (a + 1)..s {
            max_weight = max_weight.max(weights[subset[a]][subset[b]]);
        }
    }

    let mut edges = Vec::with_capacity(s * (s - 1) / 2);
    for a in 0..s {
        for b in (a + 1)..s {
            // All complemented weights are >= 1, so a maximum-weight
            // matching on a complete even graph is perfect.
            edges.push((a, b, max_weight + 1 - weights[subset[a]][subset[b]]));
        }
    }

    let mate = MaxWeightMatching::new(s, edges).solve(cancel)?;

    let mut total = 0i64;
    for a in 0..s {
        let m = mate[a];
        if m == NONE {
            return Err(Error::invariant(format!(
                "blossom matching left vertex {} unmatched on a complete even graph",
                subset[a]
            )));
        }
        if a < m {
            total += weights[subset[a]][subset[m]];
        }
    }
    Ok(total)
}

/// Maximum-weight general matching, primal-dual with blossom shrinking.
///
/// State layout follows the classic dense formulation: slots `0..n` are
/// vertices, `n..2n` are blossom numbers; `endpoint[2k]`/`endpoint[2k+1]`
/// are the two ends of edge `k`, and `p ^ 1` flips an endpoint.
struct MaxWeightMatching {
    nvertex: usize,
    edges: Vec<(usize, usize, i64)>,
    endpoint: Vec<usize>,
    neighbend: Vec<Vec<usize>>,
    mate: Vec<usize>,
    label: Vec<u8>,
    labelend: Vec<usize>,
    inblossom: Vec<usize>,
    blossomparent: Vec<usize>,
    blossomchilds: Vec<Vec<usize>>,
    blossombase: Vec<usize>,
    blossomendps: Vec<Vec<usize>>,
    bestedge: Vec<usize>,
    blossombestedges: Vec<Option<Vec<usize>>>,
    unusedblossoms: Vec<usize>,
    dualvar: Vec<i64>,
    allowedge: Vec<bool>,
    queue: Vec<usize>,
}

impl MaxWeightMatching {
    fn new(nvertex: usize, edges: Vec<(usize, usize, i64)>) -> Self {
        let nedge = edges.len();
        let max_weight = edges.iter().map(|e| e.2).max().unwrap_or(0).max(0);

        let mut endpoint = Vec::with_capacity(2 * nedge);
        for &(i, j, _) in &edges {
            endpoint.push(i);
            endpoint.push(j);
        }
        let mut neighbend = vec![Vec::new(); nvertex];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            neighbend[i].push(2 * k + 1);
            neighbend[j].push(2 * k);
        }

        let mut dualvar = vec![max_weight; nvertex];
        dualvar.extend(std::iter::repeat(0).take(nvertex));

        Self {
            nvertex,
            edges,
            endpoint,
            neighbend,
            mate: vec![NONE; nvertex],
            label: vec![0; 2 * nvertex],
            labelend: vec![NONE; 2 * nvertex],
            inblossom: (0..nvertex).collect(),
            blossomparent: vec![NONE; 2 * nvertex],
            blossomchilds: vec![Vec::new(); 2 * nvertex],
            blossombase: (0..nvertex).chain(std::iter::repeat(NONE).take(nvertex)).collect(),
            blossomendps: vec![Vec::new(); 2 * nvertex],
            bestedge: vec![NONE; 2 * nvertex],
            blossombestedges: vec![None; 2 * nvertex],
            unusedblossoms: (nvertex..2 * nvertex).collect(),
            dualvar,
            allowedge: vec![false; nedge],
            queue: Vec::new(),
        }
    }

    fn slack(&self, k: usize) -> i64 {
        let (i, j, wt) = self.edges[k];
        self.dualvar[i] + self.dualvar[j] - 2 * wt
    }

    fn blossom_leaves(&self, b: usize, out: &mut Vec<usize>) {
        if b < self.nvertex {
            out.push(b);
        } else {
            for &child in &self.blossomchilds[b] {
                self.blossom_leaves(child, out);
            }
        }
    }

    fn leaves(&self, b: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.blossom_leaves(b, &mut out);
        out
    }

    fn assign_label(&mut self, w: usize, t: u8, p: usize) {
        let b = self.inblossom[w];
        debug_assert!(self.label[w] == 0 && self.label[b] == 0);
        self.label[w] = t;
        self.label[b] = t;
        self.labelend[w] = p;
        self.labelend[b] = p;
        self.bestedge[w] = NONE;
        self.bestedge[b] = NONE;
        if t == 1 {
            let leaves = self.leaves(b);
            self.queue.extend(leaves);
        } else if t == 2 {
            let base = self.blossombase[b];
            debug_assert!(self.mate[base] != NONE);
            let mate_endpoint = self.mate[base];
            self.assign_label(self.endpoint[mate_endpoint], 1, mate_endpoint ^ 1);
        }
    }

    /// Trace back from both ends of a tight S-S edge; returns the common
    /// ancestor base vertex, or NONE when the paths reach different roots
    /// (in which case the matching can be augmented).
    fn scan_blossom(&mut self, v: usize, w: usize) -> usize {
        let mut path = Vec::new();
        let mut base = NONE;
        let (mut v, mut w) = (v, w);
        while v != NONE || w != NONE {
            let mut b = self.inblossom[v];
            if self.label[b] & 4 != 0 {
                base = self.blossombase[b];
                break;
            }
            debug_assert_eq!(self.label[b], 1);
            path.push(b);
            self.label[b] = 5;
            debug_assert_eq!(self.labelend[b], self.mate[self.blossombase[b]]);
            if self.labelend[b] == NONE {
                v = NONE;
            } else {
                v = self.endpoint[self.labelend[b]];
                b = self.inblossom[v];
                debug_assert_eq!(self.label[b], 2);
                debug_assert!(self.labelend[b] != NONE);
                v = self.endpoint[self.labelend[b]];
            }
            if w != NONE {
                std::mem::swap(&mut v, &mut w);
            }
        }
        for b in path {
            self.label[b] = 1;
        }
        base
    }

    /// Shrink the odd cycle through edge `k` and base vertex `base` into a
    /// fresh blossom slot.
    fn add_blossom(&mut self, base: usize, k: usize) {
        let (mut v, mut w, _) = self.edges[k];
        let bb = self.inblossom[base];
        let mut bv = self.inblossom[v];
        let mut bw = self.inblossom[w];
        let b = self.unusedblossoms.pop().expect("a blossom slot is free");
        self.blossombase[b] = base;
        self.blossomparent[b] = NONE;
        self.blossomparent[bb] = b;

        let mut path = Vec::new();
        let mut endps = Vec::new();
        while bv != bb {
            self.blossomparent[bv] = b;
            path.push(bv);
            endps.push(self.labelend[bv]);
            debug_assert!(self.labelend[bv] != NONE);
            v = self.endpoint[self.labelend[bv]];
            bv = self.inblossom[v];
        }
        path.push(bb);
        path.reverse();
        endps.reverse();
        endps.push(2 * k);
        while bw != bb {
            self.blossomparent[bw] = b;
            path.push(bw);
            endps.push(self.labelend[bw] ^ 1);
            debug_assert!(self.labelend[bw] != NONE);
            w = self.endpoint[self.labelend[bw]];
            bw = self.inblossom[w];
        }

        debug_assert_eq!(self.label[bb], 1);
        self.label[b] = 1;
        self.labelend[b] = self.labelend[bb];
        self.dualvar[b] = 0;
        self.blossomchilds[b] = path.clone();
        self.blossomendps[b] = endps;

        for leaf in self.leaves(b) {
            if self.label[self.inblossom[leaf]] == 2 {
                self.queue.push(leaf);
            }
            self.inblossom[leaf] = b;
        }

        // Merge the least-slack edge lists of the swallowed sub-blossoms.
        let mut bestedgeto = vec![NONE; 2 * self.nvertex];
        for &bv in &path {
            let nblists: Vec<Vec<usize>> = match &self.blossombestedges[bv] {
                Some(list) => vec![list.clone()],
                None => self
                    .leaves(bv)
                    .into_iter()
                    .map(|leaf| self.neighbend[leaf].iter().map(|&p| p / 2).collect())
                    .collect(),
            };
            for nblist in nblists {
                for k in nblist {
                    let (mut i, mut j, _) = self.edges[k];
                    if self.inblossom[j] == b {
                        std::mem::swap(&mut i, &mut j);
                    }
                    let bj = self.inblossom[j];
                    if bj != b
                        && self.label[bj] == 1
                        && (bestedgeto[bj] == NONE || self.slack(k) < self.slack(bestedgeto[bj]))
                    {
                        bestedgeto[bj] = k;
                    }
                }
            }
            self.blossombestedges[bv] = None;
            self.bestedge[bv] = NONE;
        }
        let best: Vec<usize> = bestedgeto.into_iter().filter(|&k| k != NONE).collect();
        self.bestedge[b] = NONE;
        for &k in &best {
            if self.bestedge[b] == NONE || self.slack(k) < self.slack(self.bestedge[b]) {
                self.bestedge[b] = k;
            }
        }
        self.blossombestedges[b] = Some(best);
    }

    /// Dissolve blossom `b`, relabeling its children when this happens
    /// mid-stage on a T-blossom.
    fn expand_blossom(&mut self, b: usize, endstage: bool) {
        let childs = self.blossomchilds[b].clone();
        for &s in &childs {
            self.blossomparent[s] = NONE;
            if s < self.nvertex {
                self.inblossom[s] = s;
            } else if endstage && self.dualvar[s] == 0 {
                self.expand_blossom(s, endstage);
            } else {
                for leaf in self.leaves(s) {
                    self.inblossom[leaf] = s;
                }
            }
        }

        if !endstage && self.label[b] == 2 {
            debug_assert!(self.labelend[b] != NONE);
            let entrychild = self.inblossom[self.endpoint[self.labelend[b] ^ 1]];
            let childs = &self.blossomchilds[b];
            let len = childs.len() as isize;
            let mut j = childs
                .iter()
                .position(|&c| c == entrychild)
                .expect("entry child is a child of the blossom") as isize;
            let (jstep, endptrick): (isize, usize) = if j & 1 != 0 {
                j -= len;
                (1, 0)
            } else {
                (-1, 1)
            };
            let idx = |j: isize| -> usize {
                // Python-style negative indexing over the child list.
                (j.rem_euclid(len)) as usize
            };

            let mut p = self.labelend[b];
            while j != 0 {
                // Relabel the T-sub-blossom behind endpoint p.
                self.label[self.endpoint[p ^ 1]] = 0;
                let q = self.blossomendps[b][idx(j - endptrick as isize)] ^ endptrick ^ 1;
                self.label[self.endpoint[q]] = 0;
                let t_entry = self.endpoint[p ^ 1];
                self.assign_label(t_entry, 2, p);
                // Step past the next S-sub-blossom; its edges become tight.
                self.allowedge[self.blossomendps[b][idx(j - endptrick as isize)] / 2] = true;
                j += jstep;
                p = self.blossomendps[b][idx(j - endptrick as isize)] ^ endptrick;
                self.allowedge[p / 2] = true;
                j += jstep;
            }
            // Relabel the base sub-blossom without stepping to its mate.
            let bv = self.blossomchilds[b][idx(j)];
            self.label[self.endpoint[p ^ 1]] = 2;
            self.label[bv] = 2;
            self.labelend[self.endpoint[p ^ 1]] = p;
            self.labelend[bv] = p;
            self.bestedge[bv] = NONE;
            // The remaining sub-blossoms keep labels only if reachable.
            j += jstep;
            while self.blossomchilds[b][idx(j)] != entrychild {
                let bv = self.blossomchilds[b][idx(j)];
                if self.label[bv] == 1 {
                    j += jstep;
                    continue;
                }
                let mut labeled_leaf = NONE;
                for leaf in self.leaves(bv) {
                    if self.label[leaf] != 0 {
                        labeled_leaf = leaf;
                        break;
                    }
                }
                if labeled_leaf != NONE {
                    let v = labeled_leaf;
                    debug_assert_eq!(self.label[v], 2);
                    debug_assert_eq!(self.inblossom[v], bv);
                    self.label[v] = 0;
                    self.label[self.endpoint[self.mate[self.blossombase[bv]]]] = 0;
                    let le = self.labelend[v];
                    self.assign_label(v, 2, le);
                }
                j += jstep;
            }
        }

        self.label[b] = 0;
        self.labelend[b] = NONE;
        self.blossomchilds[b].clear();
        self.blossomendps[b].clear();
        self.blossombase[b] = NONE;
        self.blossombestedges[b] = None;
        self.bestedge[b] = NONE;
        self.unusedblossoms.push(b);
    }

    /// Swap matched and unmatched edges around blossom `b` so that leaf
    /// `v` becomes its base.
    fn augment_blossom(&mut self, b: usize, v: usize) {
        let mut t = v;
        while self.blossomparent[t] != b {
            t = self.blossomparent[t];
        }
        if t >= self.nvertex {
            self.augment_blossom(t, v);
        }

        let len = self.blossomchilds[b].len() as isize;
        let i = self.blossomchilds[b]
            .iter()
            .position(|&c| c == t)
            .expect("t is a child of b") as isize;
        let mut j = i;
        let (jstep, endptrick): (isize, usize) = if i & 1 != 0 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };
        let idx = |j: isize| -> usize { (j.rem_euclid(len)) as usize };

        while j != 0 {
            j += jstep;
            let t = self.blossomchilds[b][idx(j)];
            let p = self.blossomendps[b][idx(j - endptrick as isize)] ^ endptrick;
            if t >= self.nvertex {
                self.augment_blossom(t, self.endpoint[p]);
            }
            j += jstep;
            let t = self.blossomchilds[b][idx(j)];
            if t >= self.nvertex {
                self.augment_blossom(t, self.endpoint[p ^ 1]);
            }
            self.mate[self.endpoint[p]] = p ^ 1;
            self.mate[self.endpoint[p ^ 1]] = p;
        }

        let i = i as usize;
        self.blossomchilds[b].rotate_left(i);
        self.blossomendps[b].rotate_left(i);
        self.blossombase[b] = self.blossombase[self.blossomchilds[b][0]];
        debug_assert_eq!(self.blossombase[b], v);
    }

    /// Augment the matching along the alternating trees joined by tight
    /// edge `k`.
    fn augment_matching(&mut self, k: usize) {
        let (v, w, _) = self.edges[k];
        for (s0, p0) in [(v, 2 * k + 1), (w, 2 * k)] {
            let mut s = s0;
            let mut p = p0;
            loop {
                let bs = self.inblossom[s];
                debug_assert_eq!(self.label[bs], 1);
                debug_assert_eq!(self.labelend[bs], self.mate[self.blossombase[bs]]);
                if bs >= self.nvertex {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = p;
                if self.labelend[bs] == NONE {
                    break;
                }
                let t = self.endpoint[self.labelend[bs]];
                let bt = self.inblossom[t];
                debug_assert_eq!(self.label[bt], 2);
                debug_assert!(self.labelend[bt] != NONE);
                s = self.endpoint[self.labelend[bt]];
                let j = self.endpoint[self.labelend[bt] ^ 1];
                debug_assert_eq!(self.blossombase[bt], t);
                if bt >= self.nvertex {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = self.labelend[bt];
                p = self.labelend[bt] ^ 1;
            }
        }
    }

    /// Runs the stage loop to completion and returns the mate of each
    /// vertex (NONE when unmatched). Maximum cardinality is enforced, so
    /// on a complete even graph every vertex ends up matched.
    fn solve(mut self, cancel: &CancelToken) -> Result<Vec<usize>> {
        let nvertex = self.nvertex;

        for _stage in 0..nvertex {
            cancel.check()?;

            self.label.iter_mut().for_each(|l| *l = 0);
            self.bestedge.iter_mut().for_each(|e| *e = NONE);
            for slot in &mut self.blossombestedges[nvertex..] {
                *slot = None;
            }
            self.allowedge.iter_mut().for_each(|a| *a = false);
            self.queue.clear();

            for v in 0..nvertex {
                if self.mate[v] == NONE && self.label[self.inblossom[v]] == 0 {
                    self.assign_label(v, 1, NONE);
                }
            }

            let mut augmented = false;
            loop {
                while let Some(v) = self.queue.pop() {
                    debug_assert_eq!(self.label[self.inblossom[v]], 1);
                    let neighbors = self.neighbend[v].clone();
                    for p in neighbors {
                        let k = p / 2;
                        let w = self.endpoint[p];
                        if self.inblossom[v] == self.inblossom[w] {
                            continue;
                        }
                        let mut kslack = 0;
                        if !self.allowedge[k] {
                            kslack = self.slack(k);
                            if kslack <= 0 {
                                self.allowedge[k] = true;
                            }
                        }
                        if self.allowedge[k] {
                            if self.label[self.inblossom[w]] == 0 {
                                self.assign_label(w, 2, p ^ 1);
                            } else if self.label[self.inblossom[w]] == 1 {
                                let base = self.scan_blossom(v, w);
                                if base != NONE {
                                    self.add_blossom(base, k);
                                } else {
                                    self.augment_matching(k);
                                    augmented = true;
                                    break;
                                }
                            } else if self.label[w] == 0 {
                                debug_assert_eq!(self.label[self.inblossom[w]], 2);
                                self.label[w] = 2;
                                self.labelend[w] = p ^ 1;
                            }
                        } else if self.label[self.inblossom[w]] == 1 {
                            let b = self.inblossom[v];
                            if self.bestedge[b] == NONE || kslack < self.slack(self.bestedge[b]) {
                                self.bestedge[b] = k;
                            }
                        } else if self.label[w] == 0
                            && (self.bestedge[w] == NONE || kslack < self.slack(self.bestedge[w]))
                        {
                            self.bestedge[w] = k;
                        }
                    }
                    if augmented {
                        break;
                    }
                }
                if augmented {
                    break;
                }

                // Primal progress stalled; compute the dual adjustment.
                let mut deltatype = -1;
                let mut delta = 0i64;
                let mut deltaedge = NONE;
                let mut deltablossom = NONE;

                for v in 0..nvertex {
                    if self.label[self.inblossom[v]] == 0 && self.bestedge[v] != NONE {
                        let d = self.slack(self.bestedge[v]);
                        if deltatype == -1 || d < delta {
                            delta = d;
                            deltatype = 2;
                            deltaedge = self.bestedge[v];
                        }
                    }
                }
                for b in 0..2 * nvertex {
                    if self.blossomparent[b] == NONE
                        && self.label[b] == 1
                        && self.bestedge[b] != NONE
                    {
                        let d = self.slack(self.bestedge[b]) / 2;
                        if deltatype == -1 || d < delta {
                            delta = d;
                            deltatype = 3;
                            deltaedge = self.bestedge[b];
                        }
                    }
                }
                for b in nvertex..2 * nvertex {
                    if self.blossombase[b] != NONE
                        && self.blossomparent[b] == NONE
                        && self.label[b] == 2
                        && (deltatype == -1 || self.dualvar[b] < delta)
                    {
                        delta = self.dualvar[b];
                        deltatype = 4;
                        deltablossom = b;
                    }
                }
                if deltatype == -1 {
                    // No further progress possible; clamp and finish.
                    deltatype = 1;
                    delta = self.dualvar[..nvertex].iter().copied().min().unwrap_or(0).max(0);
                }

                for v in 0..nvertex {
                    match self.label[self.inblossom[v]] {
                        1 => self.dualvar[v] -= delta,
                        2 => self.dualvar[v] += delta,
                        _ => {}
                    }
                }
                for b in nvertex..2 * nvertex {
                    if self.blossombase[b] != NONE && self.blossomparent[b] == NONE {
                        match self.label[b] {
                            1 => self.dualvar[b] += delta,
                            2 => self.dualvar[b] -= delta,
                            _ => {}
                        }
                    }
                }

                match deltatype {
                    1 => break,
                    2 => {
                        self.allowedge[deltaedge] = true;
                        let (mut i, j, _) = self.edges[deltaedge];
                        if self.label[self.inblossom[i]] == 0 {
                            i = j;
                        }
                        debug_assert_eq!(self.label[self.inblossom[i]], 1);
                        self.queue.push(i);
                    }
                    3 => {
                        self.allowedge[deltaedge] = true;
                        let (i, _, _) = self.edges[deltaedge];
                        debug_assert_eq!(self.label[self.inblossom[i]], 1);
                        self.queue.push(i);
                    }
                    _ => {
                        self.expand_blossom(deltablossom, false);
                    }
                }
            }

            if !augmented {
                break;
            }

            // End of stage: expand S-blossoms whose dual reached zero.
            for b in nvertex..2 * nvertex {
                if self.blossomparent[b] == NONE
                    && self.blossombase[b] != NONE
                    && self.label[b] == 1
                    && self.dualvar[b] == 0
                {
                    self.expand_blossom(b, true);
                }
            }
        }

        let mut mate = self.mate;
        for v in 0..nvertex {
            if mate[v] != NONE {
                mate[v] = self.endpoint[mate[v]];
            }
        }
        for v in 0..nvertex {
            debug_assert!(mate[v] == NONE || mate[mate[v]] == v);
        }
        Ok(mate)
    }
}
