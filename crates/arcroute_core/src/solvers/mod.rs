//! The solver family: one module per procedure, dispatched by solver id.
//!
//! Ids follow the historical CLI: 1 DCPP, 2 UCPP, 3 MCPP/Frederickson,
//! 4 MCPP/Yaoyuenyong, 5 WPP/Win, 6 reserved, 7 WRPP/Benavent H1.

pub mod dcpp;
pub mod mcpp_frederickson;
pub mod mcpp_yaoyuenyong;
pub mod ucpp;
pub mod wpp_win;
pub mod wrpp_benavent;

use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostics;
use crate::graph::GraphKind;
use crate::problem::Problem;
use crate::route::Route;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolverId {
    DirectedCpp,
    UndirectedCpp,
    MixedFrederickson,
    MixedYaoyuenyong,
    WindyWin,
    WindyRuralBenavent,
}

impl SolverId {
    pub fn from_id(id: u32) -> Result<Self> {
        match id {
            1 => Ok(Self::DirectedCpp),
            2 => Ok(Self::UndirectedCpp),
            3 => Ok(Self::MixedFrederickson),
            4 => Ok(Self::MixedYaoyuenyong),
            5 => Ok(Self::WindyWin),
            7 => Ok(Self::WindyRuralBenavent),
            // 6 was the directed rural postman, which depended on an
            // external arborescence routine and stays reserved.
            other => Err(Error::UnsupportedSolver { id: other }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DirectedCpp => "Directed Chinese Postman (exact)",
            Self::UndirectedCpp => "Undirected Chinese Postman (exact)",
            Self::MixedFrederickson => "Mixed Chinese Postman (Frederickson)",
            Self::MixedYaoyuenyong => "Mixed Chinese Postman (Yaoyuenyong)",
            Self::WindyWin => "Windy Chinese Postman (Win)",
            Self::WindyRuralBenavent => "Windy Rural Postman (Benavent H1)",
        }
    }

    /// Graph flavor the procedure is defined over.
    pub fn expected_kind(self) -> GraphKind {
        match self {
            Self::DirectedCpp => GraphKind::Directed,
            Self::UndirectedCpp => GraphKind::Undirected,
            Self::MixedFrederickson | Self::MixedYaoyuenyong => GraphKind::Mixed,
            Self::WindyWin | Self::WindyRuralBenavent => GraphKind::Windy,
        }
    }

    /// The rural solver honors parsed required flags; the CPP family
    /// requires everything.
    pub fn is_rural(self) -> bool {
        matches!(self, Self::WindyRuralBenavent)
    }
}

/// Runs the chosen procedure on a matching problem.
pub fn solve(
    solver: SolverId,
    problem: &Problem,
    cancel: &CancelToken,
    diagnostics: &mut Diagnostics,
) -> Result<Route> {
    if problem.graph().kind() != solver.expected_kind() {
        return Err(Error::invalid_input(format!(
            "{} expects an {} instance, got {}",
            solver.name(),
            solver.expected_kind().as_str(),
            problem.graph().kind().as_str()
        )));
    }
    log::info!(
        "solver: start id={:?} n={} m={} required={}",
        solver,
        problem.graph().vertex_count(),
        problem.graph().link_count(),
        problem.required().len()
    );
    let route = match solver {
        SolverId::DirectedCpp => dcpp::solve(problem, cancel, diagnostics),
        SolverId::UndirectedCpp => ucpp::solve(problem, cancel, diagnostics),
        SolverId::MixedFrederickson => mcpp_frederickson::solve(problem, cancel, diagnostics),
        SolverId::MixedYaoyuenyong => mcpp_yaoyuenyong::solve(problem, cancel, diagnostics),
        SolverId::WindyWin => wpp_win::solve(problem, cancel, diagnostics),
        SolverId::WindyRuralBenavent => wrpp_benavent::solve(problem, cancel, diagnostics),
    }?;
    log::info!(
        "solver: done id={:?} traversals={} cost={}",
        solver,
        route.traversals().len(),
        route.total_cost()?
    );
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::SolverId;
    use crate::Error;

    #[test]
    fn known_ids_resolve() {
        assert_eq!(SolverId::from_id(1).expect("id 1"), SolverId::DirectedCpp);
        assert_eq!(SolverId::from_id(2).expect("id 2"), SolverId::UndirectedCpp);
        assert_eq!(
            SolverId::from_id(7).expect("id 7"),
            SolverId::WindyRuralBenavent
        );
    }

    #[test]
    fn reserved_and_out_of_range_ids_are_unsupported() {
        assert!(matches!(
            SolverId::from_id(6),
            Err(Error::UnsupportedSolver { id: 6 })
        ));
        assert!(matches!(
            SolverId::from_id(0),
            Err(Error::UnsupportedSolver { id: 0 })
        ));
        assert!(matches!(
            SolverId::from_id(8),
            Err(Error::UnsupportedSolver { id: 8 })
        ));
    }

    #[test]
    fn only_the_benavent_solver_is_rural() {
        for id in [1u32, 2, 3, 4, 5] {
            assert!(!SolverId::from_id(id).expect("id").is_rural());
        }
        assert!(SolverId::from_id(7).expect("id").is_rural());
    }
}
