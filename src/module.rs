use crate::TransferMap;
use crate::parse::{ParsedFunction, parse};

/// Precomputed control transfers for every defined function in a wasm
/// module (immutable).
///
/// Pcs in each function's map are relative to that function's first
/// instruction; `code_offset` recovers module-relative positions.
#[derive(Debug, Clone)]
pub struct Module {
    funcs: Vec<ParsedFunction>,
}

impl Module {
    /// Parse a WAT string and build transfer maps for each function.
    pub fn new(wat: &str) -> Result<Self, anyhow::Error> {
        let bytes = wat::parse_str(wat)?;
        Self::from_bytes(&bytes)
    }

    /// Build transfer maps for each function body in a binary module.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, anyhow::Error> {
        Ok(Module {
            funcs: parse(bytes)?,
        })
    }

    /// Number of defined functions (imports carry no body).
    pub fn func_count(&self) -> usize {
        self.funcs.len()
    }

    /// Transfer map for the `idx`-th defined function.
    pub fn transfers(&self, idx: usize) -> Option<&TransferMap> {
        self.funcs.get(idx).map(|f| &f.map)
    }

    /// Byte offset of the `idx`-th function's first instruction within
    /// the module.
    pub fn code_offset(&self, idx: usize) -> Option<usize> {
        self.funcs.get(idx).map(|f| f.code_offset)
    }

    /// Dump transfer entries for a function (for debugging/inspection).
    pub fn dump_func(&self, idx: usize) {
        let Some(func) = self.funcs.get(idx) else {
            return;
        };
        println!("=== Function {idx} (code @ 0x{:x}) ===", func.code_offset);
        let mut entries: Vec<_> = func.map.iter().collect();
        entries.sort_unstable_by_key(|&(pc, _)| pc);
        for (pc, delta) in entries {
            println!("  [{pc:4}] {delta:+5}  -> {}", pc as i64 + delta);
        }
    }
}
