use crate::Pc;

/// Malformed-input errors raised while building a transfer map.
///
/// All are fatal to the build in progress; no partial map is returned.
/// The caller decides whether to reject the function or the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// A varint or fixed-width immediate runs past the end of the body.
    TruncatedImmediate { pc: Pc },
    /// A branch selects a scope deeper than the open-scope stack.
    InvalidBranchDepth { pc: Pc, depth: u32, open: usize },
    /// An `else` outside an `if`, or a second `else` in the same `if`.
    UnmatchedElse { pc: Pc },
    /// An `end` with no open scope.
    UnmatchedEnd { pc: Pc },
    /// The body ended while a scope was still open.
    UnterminatedScope { start_pc: Pc },
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            TransferError::TruncatedImmediate { pc } => {
                write!(f, "truncated immediate at pc {pc}")
            }
            TransferError::InvalidBranchDepth { pc, depth, open } => {
                write!(f, "branch depth {depth} at pc {pc} exceeds {open} open scopes")
            }
            TransferError::UnmatchedElse { pc } => {
                write!(f, "else without matching if at pc {pc}")
            }
            TransferError::UnmatchedEnd { pc } => {
                write!(f, "end without open scope at pc {pc}")
            }
            TransferError::UnterminatedScope { start_pc } => {
                write!(f, "scope opened at pc {start_pc} is never closed")
            }
        }
    }
}

impl std::error::Error for TransferError {}
