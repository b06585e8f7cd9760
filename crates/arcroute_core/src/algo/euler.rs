//! Eulerian circuit extraction (Hierholzer) over an augmented multigraph.
//!
//! Solvers assemble an [`EulerGraph`] holding one entry per traversal the
//! final route will make: each original link once, plus whatever copies
//! augmentation added. Extraction splices every newly found subtour
//! *forward of* the scan position, so side loops are walked when first
//! reached instead of after returning to the depot.

use crate::cancel::CancelToken;
use crate::graph::{Direction, Link, LinkId, VertexId};
use crate::{Error, Result};

/// One traversable entry of the multigraph. `forward_means` records which
/// direction of the *source* link a `from -> to` traversal realizes, so
/// oriented copies keep reporting honest directions.
#[derive(Clone, Debug)]
pub struct EulerLink {
    pub source_link: LinkId,
    pub from: VertexId,
    pub to: VertexId,
    pub cost: i64,
    pub reverse_cost: i64,
    pub directed: bool,
    pub required: bool,
    pub forward_means: Direction,
}

/// One step of the extracted circuit.
#[derive(Clone, Copy, Debug)]
pub struct Step {
    pub source_link: LinkId,
    pub from: VertexId,
    pub to: VertexId,
    pub cost: i64,
    pub direction: Direction,
}

/// Ordering applied when several unused links leave the current vertex.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraversalPreference {
    /// Lowest source link id first (deterministic classic order).
    LowestLinkId,
    /// Cheapest leaving cost first, then lowest link id; realizes the
    /// windy cheaper-direction rule at traversal time.
    CheaperDirectionFirst,
}

#[derive(Clone, Debug)]
pub struct EulerGraph {
    n: usize,
    links: Vec<EulerLink>,
    incidence: Vec<Vec<usize>>,
}

impl EulerGraph {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            links: Vec::new(),
            incidence: vec![Vec::new(); n],
        }
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[EulerLink] {
        &self.links
    }

    pub fn push(&mut self, link: EulerLink) -> usize {
        let slot = self.links.len();
        self.incidence[link.from - 1].push(slot);
        if link.to != link.from {
            self.incidence[link.to - 1].push(slot);
        }
        self.links.push(link);
        slot
    }

    /// Adds a link exactly as the host graph stores it: arcs stay arcs,
    /// edges stay two-way with their per-direction costs.
    pub fn add_original(&mut self, link: &Link) -> usize {
        self.push(EulerLink {
            source_link: link.id,
            from: link.from,
            to: link.to,
            cost: link.cost,
            reverse_cost: link.reverse_cost,
            directed: link.directed,
            required: link.required,
            forward_means: Direction::Forward,
        })
    }

    /// Adds a one-way copy realizing `direction` of the source link.
    pub fn add_oriented(&mut self, link: &Link, direction: Direction) -> usize {
        let (from, to) = match direction {
            Direction::Forward => (link.from, link.to),
            Direction::Reverse => (link.to, link.from),
        };
        let cost = link.cost_in(direction);
        self.push(EulerLink {
            source_link: link.id,
            from,
            to,
            cost,
            reverse_cost: cost,
            directed: true,
            required: link.required,
            forward_means: direction,
        })
    }

    fn degree_profile(&self) -> Result<DegreeProfile> {
        let mut any_directed = false;
        let mut any_undirected = false;
        let mut degree = vec![0usize; self.n];
        let mut balance = vec![0i64; self.n];
        for link in &self.links {
            if link.directed {
                any_directed = true;
                balance[link.from - 1] -= 1;
                balance[link.to - 1] += 1;
            } else {
                any_undirected = true;
            }
            if link.from == link.to {
                degree[link.from - 1] += 2;
            } else {
                degree[link.from - 1] += 1;
                degree[link.to - 1] += 1;
            }
        }
        if any_directed && any_undirected {
            return Err(Error::invariant(
                "euler extraction over a part-oriented multigraph",
            ));
        }
        Ok(DegreeProfile {
            directed: any_directed,
            degree,
            balance,
        })
    }

    fn check_preconditions(&self, start: VertexId) -> Result<()> {
        let profile = self.degree_profile()?;
        if profile.directed {
            for (idx, &b) in profile.balance.iter().enumerate() {
                if b != 0 {
                    return Err(Error::invariant(format!(
                        "vertex {} has in-degree != out-degree after augmentation",
                        idx + 1
                    )));
                }
            }
        } else {
            for (idx, &d) in profile.degree.iter().enumerate() {
                if d % 2 != 0 {
                    return Err(Error::invariant(format!(
                        "vertex {} has odd degree after augmentation",
                        idx + 1
                    )));
                }
            }
        }

        // Every link must sit in the start vertex's undirected component.
        let mut seen = vec![false; self.n];
        seen[start - 1] = true;
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            for &slot in &self.incidence[v - 1] {
                let link = &self.links[slot];
                let other = if link.from == v { link.to } else { link.from };
                if !seen[other - 1] {
                    seen[other - 1] = true;
                    stack.push(other);
                }
            }
        }
        for link in &self.links {
            if !seen[link.from - 1] || !seen[link.to - 1] {
                return Err(Error::invariant(format!(
                    "link {} is disconnected from the start vertex",
                    link.source_link
                )));
            }
        }
        Ok(())
    }

    fn best_unused(
        &self,
        v: VertexId,
        used: &[bool],
        preference: TraversalPreference,
    ) -> Option<usize> {
        let mut best: Option<(i64, LinkId, usize)> = None;
        for &slot in &self.incidence[v - 1] {
            if used[slot] {
                continue;
            }
            let link = &self.links[slot];
            if link.directed && link.from != v {
                continue;
            }
            let leaving_cost = if link.from == v {
                link.cost
            } else {
                link.reverse_cost
            };
            let key = match preference {
                TraversalPreference::LowestLinkId => (0, link.source_link, slot),
                TraversalPreference::CheaperDirectionFirst => {
                    (leaving_cost, link.source_link, slot)
                }
            };
            if best.map_or(true, |b| key < b) {
                best = Some(key);
            }
        }
        best.map(|(_, _, slot)| slot)
    }

    fn trail(
        &self,
        start: VertexId,
        used: &mut [bool],
        preference: TraversalPreference,
    ) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut at = start;
        while let Some(slot) = self.best_unused(at, used, preference) {
            used[slot] = true;
            let link = &self.links[slot];
            let (to, cost, direction) = if link.from == at {
                (link.to, link.cost, link.forward_means)
            } else {
                (link.from, link.reverse_cost, link.forward_means.flip())
            };
            steps.push(Step {
                source_link: link.source_link,
                from: at,
                to,
                cost,
                direction,
            });
            at = to;
        }
        debug_assert!(steps.is_empty() || at == start);
        steps
    }

    /// Extracts the full circuit from `start`. Fails with an internal
    /// invariant violation when the multigraph is not Eulerian; solvers
    /// that augmented correctly never see that error.
    pub fn extract_circuit(
        &self,
        start: VertexId,
        preference: TraversalPreference,
        cancel: &CancelToken,
    ) -> Result<Vec<Step>> {
        if self.links.is_empty() {
            return Ok(Vec::new());
        }
        self.check_preconditions(start)?;

        let mut used = vec![false; self.links.len()];
        let mut walk = self.trail(start, &mut used, preference);
        if walk.is_empty() {
            return Err(Error::invariant(
                "start vertex has no traversable link in a non-empty multigraph",
            ));
        }

        let mut pos = 0;
        while pos < walk.len() {
            cancel.check()?;
            let v = walk[pos].from;
            let subtour = self.trail(v, &mut used, preference);
            if subtour.is_empty() {
                pos += 1;
                continue;
            }
            // Splice forward: the subtour runs at the first visit of v,
            // not after the main tour returns.
            let tail = walk.split_off(pos);
            walk.extend(subtour);
            walk.extend(tail);
        }

        if let Some(missed) = used.iter().position(|&u| !u) {
            return Err(Error::invariant(format!(
                "link {} was never reached by the circuit",
                self.links[missed].source_link
            )));
        }
        Ok(walk)
    }
}

struct DegreeProfile {
    directed: bool,
    degree: Vec<usize>,
    balance: Vec<i64>,
}
