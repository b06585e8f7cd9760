use super::VertexId;

pub type LinkId = usize;

/// Traversal direction relative to a link's stored `(from, to)` endpoints.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

/// Generalized edge/arc. Endpoints are ordered for directed links and a
/// stored-but-arbitrary order for undirected ones. `reverse_cost` equals
/// `cost` except on windy links.
#[derive(Clone, Debug)]
pub struct Link {
    pub id: LinkId,
    pub from: VertexId,
    pub to: VertexId,
    pub cost: i64,
    pub reverse_cost: i64,
    pub directed: bool,
    pub required: bool,
    pub label: Option<String>,
}

impl Link {
    pub fn cost_in(&self, direction: Direction) -> i64 {
        match direction {
            Direction::Forward => self.cost,
            Direction::Reverse => self.reverse_cost,
        }
    }

    /// Cheapest traversal cost ignoring direction.
    pub fn symmetric_cost(&self) -> i64 {
        self.cost.min(self.reverse_cost)
    }

    pub fn other_end(&self, v: VertexId) -> VertexId {
        if v == self.from { self.to } else { self.from }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn is_incident_to(&self, v: VertexId) -> bool {
        self.from == v || self.to == v
    }

    /// Direction of a traversal leaving `v`. Self-loops leave forward.
    pub fn direction_from(&self, v: VertexId) -> Direction {
        if v == self.from {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Link};

    fn windy(id: usize, from: usize, to: usize, cost: i64, reverse_cost: i64) -> Link {
        Link {
            id,
            from,
            to,
            cost,
            reverse_cost,
            directed: false,
            required: true,
            label: None,
        }
    }

    #[test]
    fn cost_in_respects_direction() {
        let link = windy(1, 2, 3, 4, 8);
        assert_eq!(link.cost_in(Direction::Forward), 4);
        assert_eq!(link.cost_in(Direction::Reverse), 8);
        assert_eq!(link.symmetric_cost(), 4);
    }

    #[test]
    fn other_end_swaps_endpoints() {
        let link = windy(1, 2, 3, 1, 1);
        assert_eq!(link.other_end(2), 3);
        assert_eq!(link.other_end(3), 2);
    }

    #[test]
    fn direction_from_is_forward_at_the_from_endpoint() {
        let link = windy(1, 2, 3, 1, 1);
        assert_eq!(link.direction_from(2), Direction::Forward);
        assert_eq!(link.direction_from(3), Direction::Reverse);
    }

    #[test]
    fn self_loop_is_detected() {
        assert!(windy(1, 2, 2, 1, 1).is_self_loop());
        assert!(!windy(1, 2, 3, 1, 1).is_self_loop());
    }
}
