use wasmparser::{FunctionBody, Parser, Payload};

use crate::TransferMap;

/// One defined function's precomputed transfers.
#[derive(Debug, Clone)]
pub(crate) struct ParsedFunction {
    /// Module-relative byte offset of the function's first instruction.
    pub(crate) code_offset: usize,
    pub(crate) map: TransferMap,
}

/// Walk the module's code section and run one build per function body.
/// Bodies are independent; each gets its own map.
pub(crate) fn parse(bytes: &[u8]) -> Result<Vec<ParsedFunction>, anyhow::Error> {
    let parser = Parser::new(0);
    let mut funcs = Vec::new();
    for payload in parser.parse_all(bytes) {
        if let Payload::CodeSectionEntry(body) = payload? {
            funcs.push(parse_body(bytes, &body)?);
        }
    }
    Ok(funcs)
}

fn parse_body(bytes: &[u8], body: &FunctionBody) -> Result<ParsedFunction, anyhow::Error> {
    // The instruction stream starts after the local declarations and
    // runs through the body's terminating `end`.
    let code_offset = body.get_operators_reader()?.original_position();
    let code = &bytes[code_offset..body.range().end];
    let map = TransferMap::compute(code)?;
    Ok(ParsedFunction { code_offset, map })
}
