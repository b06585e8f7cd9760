//! Successive-shortest-path min-cost flow.
//!
//! Instances are small (one node per imbalanced vertex), so a
//! Bellman-Ford search per augmentation is plenty. Deterministic: arcs
//! relax in insertion order and strict improvement is required.

use crate::cancel::CancelToken;
use crate::Result;

const INF: i64 = i64::MAX / 4;

#[derive(Clone, Debug)]
struct FlowArc {
    to: usize,
    cap: i64,
    cost: i64,
    /// Index of the paired residual arc.
    rev: usize,
}

#[derive(Clone, Debug, Default)]
pub struct FlowNetwork {
    arcs: Vec<FlowArc>,
    adj: Vec<Vec<usize>>,
}

impl FlowNetwork {
    pub fn new(n: usize) -> Self {
        Self {
            arcs: Vec::new(),
            adj: vec![Vec::new(); n],
        }
    }

    /// Adds a forward arc and its zero-capacity residual. Returns the
    /// forward arc's handle for later flow queries.
    pub fn add_arc(&mut self, from: usize, to: usize, cap: i64, cost: i64) -> usize {
        let fwd = self.arcs.len();
        self.arcs.push(FlowArc {
            to,
            cap,
            cost,
            rev: fwd + 1,
        });
        self.arcs.push(FlowArc {
            to: from,
            cap: 0,
            cost: -cost,
            rev: fwd,
        });
        self.adj[from].push(fwd);
        self.adj[to].push(fwd + 1);
        fwd
    }

    /// Units pushed through the forward arc `handle`.
    pub fn flow_on(&self, handle: usize) -> i64 {
        self.arcs[self.arcs[handle].rev].cap
    }

    /// Sends as much flow as possible from `source` to `sink` at minimum
    /// total cost. Returns `(flow, cost)`.
    pub fn min_cost_flow(
        &mut self,
        source: usize,
        sink: usize,
        cancel: &CancelToken,
    ) -> Result<(i64, i64)> {
        let n = self.adj.len();
        let mut total_flow = 0;
        let mut total_cost = 0;

        loop {
            cancel.check()?;

            // Bellman-Ford over the residual network; negative residual
            // costs appear once flow has been pushed.
            let mut dist = vec![INF; n];
            let mut pred_arc = vec![usize::MAX; n];
            dist[source] = 0;
            for _ in 0..n {
                let mut changed = false;
                for v in 0..n {
                    if dist[v] >= INF {
                        continue;
                    }
                    for &a in &self.adj[v] {
                        let arc = &self.arcs[a];
                        if arc.cap > 0 && dist[v] + arc.cost < dist[arc.to] {
                            dist[arc.to] = dist[v] + arc.cost;
                            pred_arc[arc.to] = a;
                            changed = true;
                        }
                    }
                }
                if !changed {
                    break;
                }
            }

            if dist[sink] >= INF {
                break;
            }

            let mut bottleneck = INF;
            let mut at = sink;
            while at != source {
                let a = pred_arc[at];
                bottleneck = bottleneck.min(self.arcs[a].cap);
                at = self.arcs[self.arcs[a].rev].to;
            }

            let mut at = sink;
            while at != source {
                let a = pred_arc[at];
                self.arcs[a].cap -= bottleneck;
                let rev = self.arcs[a].rev;
                self.arcs[rev].cap += bottleneck;
                at = self.arcs[rev].to;
            }

            total_flow += bottleneck;
            total_cost += bottleneck * dist[sink];
        }

        Ok((total_flow, total_cost))
    }
}
