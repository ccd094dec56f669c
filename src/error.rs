//! Error types for tabstat.
//!
//! Degenerate statistical input (empty columns, insufficient samples,
//! unknown column names) never produces an error — those cases return
//! sentinel values as documented on each operation. `StatError` is
//! reserved for the numeric routines themselves: arguments outside a
//! special function's domain, and iterative routines that hit their
//! iteration cap without converging.

use thiserror::Error;

/// All errors produced by the numeric core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    /// Argument outside the domain of a special function.
    #[error("{function}: argument out of domain: {message}")]
    Domain {
        function: &'static str,
        message: String,
    },
    /// An iterative routine hit its iteration cap without converging.
    #[error("{routine} did not converge after {iterations} iterations")]
    NonConvergence {
        routine: &'static str,
        iterations: usize,
    },
}

impl StatError {
    pub(crate) fn domain(function: &'static str, message: impl Into<String>) -> Self {
        Self::Domain {
            function,
            message: message.into(),
        }
    }
}
