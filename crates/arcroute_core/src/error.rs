use thiserror::Error as ThisError;

use crate::graph::LinkId;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("infeasible instance: required link {link_id} is unreachable from the depot")]
    Infeasible { link_id: LinkId },
    #[error("unsupported solver id: {id}")]
    UnsupportedSolver { id: u32 },
    #[error("cost accumulation would overflow 64-bit arithmetic")]
    CostOverflow,
    #[error("solve cancelled")]
    Cancelled,
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Exit code the CLI maps this error to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) | Self::Parse { .. } | Self::UnsupportedSolver { .. } => 1,
            Self::InvalidInput(_) => 1,
            Self::Infeasible { .. } => 2,
            Self::CostOverflow | Self::Cancelled | Self::InternalInvariant(_) => 3,
        }
    }
}
