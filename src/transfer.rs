use std::collections::HashMap;

use crate::cursor::Cursor;
use crate::error::TransferError;
use crate::opcode as op;
use crate::{Pc, PcDiff};


/// Precomputed control-transfer deltas for one function body.
///
/// Keys are the pcs of `if`, `else`, `br`, and `br_if` instructions,
/// plus one synthetic key per `br_table` case. The value is the signed
/// delta an interpreter adds to its pc when it takes that transfer, so
/// nested block structure is never re-walked at run time. Built in a
/// single forward pass; immutable afterwards, and safe to share across
/// threads executing the same function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferMap {
    entries: HashMap<Pc, PcDiff>,
}

impl TransferMap {
    /// Analyze one function body's instruction stream.
    ///
    /// `code` runs from the first instruction through the body's
    /// terminating `end`. The body is treated as one implicit scope, so
    /// a branch past the outermost `block` exits the function, landing
    /// one past that final `end`.
    pub fn compute(code: &[u8]) -> Result<Self, TransferError> {
        Builder::new(code).run()
    }

    /// Delta for the control instruction (or `br_table` case) at `pc`.
    pub fn lookup(&self, pc: Pc) -> Option<PcDiff> {
        self.entries.get(&pc).copied()
    }

    /// Number of transfer entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(pc, delta)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Pc, PcDiff)> + '_ {
        self.entries.iter().map(|(&pc, &delta)| (pc, delta))
    }
}

/// Scope kinds tracked on the control stack.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ControlKind {
    /// Implicit function-level scope, closed by the body's final `end`.
    Func,
    Block,
    Loop,
    If,
}

/// One open scope. Pushed on `block`/`loop`/`if`, popped by `end`.
#[derive(Debug)]
struct ControlEntry {
    kind: ControlKind,
    /// Pc of the opening opcode.
    start_pc: Pc,
    /// Pc of the `else`, once one is seen (`If` only).
    else_pc: Option<Pc>,
    /// Source pcs waiting on this scope's `end`; each resolves to one
    /// past it.
    pending: Vec<Pc>,
}

impl ControlEntry {
    fn new(kind: ControlKind, start_pc: Pc) -> Self {
        ControlEntry {
            kind,
            start_pc,
            else_pc: None,
            pending: Vec::new(),
        }
    }
}

/// Single-pass builder: an explicit scope stack instead of recursive
/// descent, so nesting depth is bounded by the input, not call frames.
struct Builder<'a> {
    cursor: Cursor<'a>,
    stack: Vec<ControlEntry>,
    entries: HashMap<Pc, PcDiff>,
}

impl<'a> Builder<'a> {
    fn new(code: &'a [u8]) -> Self {
        Builder {
            cursor: Cursor::new(code),
            // The body itself is one implicit scope; branches that exit
            // it resolve against its terminating `end`.
            stack: vec![ControlEntry::new(ControlKind::Func, 0)],
            entries: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<TransferMap, TransferError> {
        while let Some(opcode) = self.cursor.peek() {
            let pc = self.cursor.pos();
            self.cursor.advance(1)?;
            match opcode {
                op::BLOCK => self.open(ControlKind::Block, pc)?,
                op::LOOP => self.open(ControlKind::Loop, pc)?,
                op::IF => self.open(ControlKind::If, pc)?,
                op::ELSE => self.else_(pc)?,
                op::END => self.end(pc)?,
                op::BR | op::BR_IF => {
                    let (depth, _) = self.cursor.read_varuint()?;
                    self.branch(pc, depth)?;
                }
                op::BR_TABLE => self.branch_table(pc)?,
                _ => self.cursor.skip_immediates(opcode)?,
            }
        }
        match self.stack.last() {
            Some(open) => Err(TransferError::UnterminatedScope {
                start_pc: open.start_pc,
            }),
            None => Ok(TransferMap {
                entries: self.entries,
            }),
        }
    }

    fn open(&mut self, kind: ControlKind, pc: Pc) -> Result<(), TransferError> {
        self.cursor.skip_block_type()?;
        self.stack.push(ControlEntry::new(kind, pc));
        Ok(())
    }

    fn else_(&mut self, pc: Pc) -> Result<(), TransferError> {
        let top = match self.stack.last_mut() {
            Some(e) if e.kind == ControlKind::If && e.else_pc.is_none() => e,
            _ => return Err(TransferError::UnmatchedElse { pc }),
        };
        // The if's false branch jumps straight into the else-body,
        // skipping this opcode.
        self.entries.insert(top.start_pc, diff(top.start_pc, pc + 1));
        top.else_pc = Some(pc);
        // Reached on true-branch fallthrough; must clear the else-body
        // and the `end`, whose position is known only at scope close.
        top.pending.push(pc);
        Ok(())
    }

    fn end(&mut self, end_pc: Pc) -> Result<(), TransferError> {
        let entry = self
            .stack
            .pop()
            .ok_or(TransferError::UnmatchedEnd { pc: end_pc })?;
        if entry.kind == ControlKind::If && entry.else_pc.is_none() {
            // No else: the false branch lands on the `end` itself, a
            // plain scope pop.
            self.entries
                .insert(entry.start_pc, diff(entry.start_pc, end_pc));
        }
        for source in entry.pending {
            self.entries.insert(source, diff(source, end_pc + 1));
        }
        Ok(())
    }

    /// Resolve one branch source (a `br`/`br_if` pc or a `br_table`
    /// case key) against the scope `depth` levels out from the
    /// innermost.
    fn branch(&mut self, source: Pc, depth: u32) -> Result<(), TransferError> {
        let open = self.stack.len();
        if depth as usize >= open {
            return Err(TransferError::InvalidBranchDepth {
                pc: source,
                depth,
                open,
            });
        }
        let target = &mut self.stack[open - 1 - depth as usize];
        if target.kind == ControlKind::Loop {
            // Backward transfer: re-enter at the loop header, whose pc
            // is already known.
            self.entries.insert(source, diff(source, target.start_pc));
        } else {
            // Forward exit: resolved when the target scope closes.
            target.pending.push(source);
        }
        Ok(())
    }

    fn branch_table(&mut self, table_pc: Pc) -> Result<(), TransferError> {
        let (count, _) = self.cursor.read_varuint()?;
        // Cases 0..count-1, then the default. Each is keyed by the
        // table's pc offset by the case ordinal, not by the operand's
        // own byte offset: the interpreter's per-case scan recomputes
        // the same key without tracking varint widths.
        for case in 0..=count as Pc {
            let (depth, _) = self.cursor.read_varuint()?;
            self.branch(table_pc + case, depth)?;
        }
        Ok(())
    }
}

/// Signed distance from `from` to `to`.
fn diff(from: Pc, to: Pc) -> PcDiff {
    to as PcDiff - from as PcDiff
}
