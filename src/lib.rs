//! Control-transfer precomputation for WebAssembly function bodies:
//! one forward pass over a body yields a map from each control
//! instruction's pc to the signed delta that takes an interpreter
//! straight to its successor.

mod cursor;
mod error;
mod module;
pub mod opcode;
mod parse;
mod transfer;

pub use error::TransferError;
pub use module::Module;
pub use transfer::TransferMap;

/// Byte offset into a function body's instruction stream.
pub type Pc = usize;

/// Signed offset added to a pc to reach a transfer target.
pub type PcDiff = i64;
