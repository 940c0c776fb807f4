//! The textual circuit front end.
//!
//! Circuits arrive as a line-oriented ASCII dialect: tagged header lines
//! declaring the variables (`.v`), the designated inputs (`.i`) and outputs
//! (`.o`), and constant values for the remaining variables (`.c`), followed
//! by a `BEGIN` … `END` block listing gates in application order. `#`
//! starts a comment anywhere on a line.
//!
//! Parsing is strict and positioned: every failure carries the 1-based
//! line and the byte offset from the line start, rendered as
//! `line:column: message`.

use hashbrown::HashMap;
use thiserror::Error;

use crate::gate::{Gate, GateKind};

/// Upper bound for gate parameter counts and constant values.
const MAX_NUMBER: u32 = 32767;

/// A parsed circuit description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// All variable names, in declaration order; a variable's id is its
    /// position here.
    pub variables: Vec<String>,
    /// Ids of the variables designated as circuit inputs.
    pub inputs: Vec<u32>,
    /// Ids of the variables designated as circuit outputs.
    pub outputs: Vec<u32>,
    /// Constant initial values `(variable id, value)` for every variable
    /// that is not an input, in declaration order.
    pub constants: Vec<(u32, u32)>,
    /// The gate list, in application order.
    pub gates: Vec<Gate>,
}

/// A positioned parse or semantic error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {kind}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// 0-based byte offset from the line start.
    pub column: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("missing variable listing (.v)")]
    MissingVariables,
    #[error("missing input variable listing (.i)")]
    MissingInputs,
    #[error("missing output variable listing (.o)")]
    MissingOutputs,
    #[error("missing constant input listing (.c)")]
    MissingConstants,
    #[error("duplicate variable listing (.v)")]
    DuplicateVariables,
    #[error("duplicate input variable listing (.i)")]
    DuplicateInputs,
    #[error("duplicate output variable listing (.o)")]
    DuplicateOutputs,
    #[error("duplicate constant input listing (.c)")]
    DuplicateConstants,
    #[error("expected tag or BEGIN")]
    ExpectedTag,
    #[error("expected gate or END")]
    ExpectedGate,
    #[error("missing END")]
    MissingEnd,
    #[error("expected eol or comment")]
    TrailingGarbage,
    #[error("missing variable name")]
    MissingName,
    #[error("whitespace at beginning or end of variable name")]
    PaddedName,
    #[error("variable names must begin with an alpha character")]
    BadVariableName,
    #[error("duplicate variable name")]
    DuplicateVariable,
    #[error("undeclared variable")]
    UndeclaredVariable,
    #[error("duplicate input")]
    DuplicateInput,
    #[error("duplicate output")]
    DuplicateOutput,
    #[error("expected number >= 0")]
    BadConstant,
    #[error("constant value too big")]
    ConstantTooBig,
    #[error("more constants than missing inputs")]
    TooManyConstants,
    #[error("fewer constants than missing inputs")]
    TooFewConstants,
    #[error("expected parameter count")]
    BadParamCount,
    #[error("parameter count too big")]
    ParamCountTooBig,
    #[error("too few parameters for gate")]
    TooFewParams,
    #[error("too many parameters")]
    TooManyParams,
    #[error("missing parameters")]
    MissingParams,
    #[error("parameters must be in variable order")]
    UnorderedParams,
}

pub type ParseResult<T> = Result<T, ParseError>;

fn err(line: usize, column: usize, kind: ParseErrorKind) -> ParseError {
    ParseError { line, column, kind }
}

/// A cursor over one line of input.
struct Cursor<'a> {
    line: &'a str,
    bytes: &'a [u8],
    lineno: usize,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str, lineno: usize) -> Self {
        Self {
            line,
            bytes: line.as_bytes(),
            lineno,
            pos: 0,
        }
    }

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        err(self.lineno, self.pos, kind)
    }

    fn err_at(&self, column: usize, kind: ParseErrorKind) -> ParseError {
        err(self.lineno, column, kind)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_eol(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// End of meaningful content: end of line or start of a comment.
    fn at_break(&self) -> bool {
        self.at_eol() || self.bytes[self.pos] == b'#'
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    /// Consume a case-insensitive keyword followed by whitespace, a
    /// comment, or the end of the line.
    fn keyword_ci(&mut self, kw: &str) -> bool {
        let rest = &self.bytes[self.pos.min(self.bytes.len())..];
        if rest.len() < kw.len() || !rest[..kw.len()].eq_ignore_ascii_case(kw.as_bytes()) {
            return false;
        }
        match rest.get(kw.len()) {
            None => {}
            Some(c) if c.is_ascii_whitespace() || *c == b'#' => {}
            Some(_) => return false,
        }
        self.pos += kw.len();
        true
    }

    /// Consume a case-sensitive tag followed by whitespace, a comment, or
    /// the end of the line.
    fn tag(&mut self, tag: &str) -> bool {
        let rest = &self.bytes[self.pos.min(self.bytes.len())..];
        if rest.len() < tag.len() || !rest[..tag.len()].eq(tag.as_bytes()) {
            return false;
        }
        match rest.get(tag.len()) {
            None => {}
            Some(c) if c.is_ascii_whitespace() || *c == b'#' => {}
            Some(_) => return false,
        }
        self.pos += tag.len();
        true
    }

    /// Parse a comma-separated list running to the end of the line (or a
    /// comment), feeding each item and its column to the callback.
    ///
    /// Whitespace around a comma is significant (names must not be padded);
    /// whitespace between the last item and a trailing comment is not.
    fn list<F>(&mut self, mut f: F) -> ParseResult<()>
    where
        F: FnMut(usize, &'a str) -> ParseResult<()>,
    {
        while !self.at_break() {
            let start = self.pos;
            while !self.at_break() && self.bytes[self.pos] != b',' {
                self.pos += 1;
            }
            let mut end = self.pos;
            if self.at_break() {
                while end > start && self.bytes[end - 1].is_ascii_whitespace() {
                    end -= 1;
                }
            }
            if start == end {
                return Err(self.err_at(start, ParseErrorKind::MissingName));
            }
            let item = &self.line[start..end];
            let ib = item.as_bytes();
            if ib[0].is_ascii_whitespace() || ib[ib.len() - 1].is_ascii_whitespace() {
                return Err(self.err_at(start, ParseErrorKind::PaddedName));
            }
            f(start, item)?;
            if self.peek() == Some(b',') {
                self.pos += 1;
            }
        }
        Ok(())
    }

    /// Parse an unsigned decimal parameter count (>= 1, no leading zero,
    /// bounded) followed by whitespace or the end of the line.
    fn param_count(&mut self) -> ParseResult<usize> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() && c != b'0' => {}
            _ => return Err(self.err(ParseErrorKind::BadParamCount)),
        }
        let mut n: u32 = 0;
        while let Some(c) = self.peek().filter(u8::is_ascii_digit) {
            n = n * 10 + (c - b'0') as u32;
            if n > MAX_NUMBER {
                return Err(self.err(ParseErrorKind::ParamCountTooBig));
            }
            self.pos += 1;
        }
        if let Some(c) = self.peek() {
            if !c.is_ascii_whitespace() {
                return Err(self.err(ParseErrorKind::BadParamCount));
            }
        }
        Ok(n as usize)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum State {
    Tags,
    Gates,
    Done,
}

/// Parse a circuit description.
pub fn parse(text: &str) -> ParseResult<Program> {
    let mut variables: Vec<String> = Vec::new();
    let mut name_to_id: HashMap<String, u32> = HashMap::new();
    let mut is_input: Vec<bool> = Vec::new();
    let mut is_output: Vec<bool> = Vec::new();
    let mut inputs: Vec<u32> = Vec::new();
    let mut outputs: Vec<u32> = Vec::new();
    let mut constants: Vec<(u32, u32)> = Vec::new();
    let mut gates: Vec<Gate> = Vec::new();

    let mut has_variables = false;
    let mut has_inputs = false;
    let mut has_outputs = false;
    let mut has_constants = false;

    let mut state = State::Tags;
    let mut lineno = 0;

    for line in text.lines() {
        lineno += 1;
        if state == State::Done {
            break;
        }

        let mut cur = Cursor::new(line, lineno);
        cur.skip_ws();
        if cur.at_break() {
            continue;
        }
        let col = cur.pos;

        match state {
            State::Tags => {
                if cur.keyword_ci("BEGIN") {
                    if !has_variables {
                        return Err(err(lineno, col, ParseErrorKind::MissingVariables));
                    }
                    if !has_inputs {
                        return Err(err(lineno, col, ParseErrorKind::MissingInputs));
                    }
                    if !has_outputs {
                        return Err(err(lineno, col, ParseErrorKind::MissingOutputs));
                    }
                    let missing = variables.len() - inputs.len();
                    if !has_constants && missing > 0 {
                        return Err(err(lineno, col, ParseErrorKind::MissingConstants));
                    }
                    if constants.len() < missing {
                        return Err(err(lineno, col, ParseErrorKind::TooFewConstants));
                    }
                    cur.skip_ws();
                    if !cur.at_break() {
                        return Err(cur.err(ParseErrorKind::TrailingGarbage));
                    }
                    state = State::Gates;
                } else if cur.tag(".v") {
                    if has_variables {
                        return Err(err(lineno, col, ParseErrorKind::DuplicateVariables));
                    }
                    has_variables = true;
                    cur.skip_ws();
                    cur.list(|icol, item| {
                        if !item.as_bytes()[0].is_ascii_alphabetic() {
                            return Err(err(lineno, icol, ParseErrorKind::BadVariableName));
                        }
                        if name_to_id.contains_key(item) {
                            return Err(err(lineno, icol, ParseErrorKind::DuplicateVariable));
                        }
                        name_to_id.insert(item.to_string(), variables.len() as u32);
                        variables.push(item.to_string());
                        Ok(())
                    })?;
                    is_input = vec![false; variables.len()];
                    is_output = vec![false; variables.len()];
                } else if cur.tag(".i") {
                    if !has_variables {
                        return Err(err(lineno, col, ParseErrorKind::MissingVariables));
                    }
                    if has_inputs {
                        return Err(err(lineno, col, ParseErrorKind::DuplicateInputs));
                    }
                    has_inputs = true;
                    cur.skip_ws();
                    cur.list(|icol, item| {
                        if !item.as_bytes()[0].is_ascii_alphabetic() {
                            return Err(err(lineno, icol, ParseErrorKind::BadVariableName));
                        }
                        let Some(&id) = name_to_id.get(item) else {
                            return Err(err(lineno, icol, ParseErrorKind::UndeclaredVariable));
                        };
                        if is_input[id as usize] {
                            return Err(err(lineno, icol, ParseErrorKind::DuplicateInput));
                        }
                        is_input[id as usize] = true;
                        inputs.push(id);
                        Ok(())
                    })?;
                } else if cur.tag(".o") {
                    if !has_variables {
                        return Err(err(lineno, col, ParseErrorKind::MissingVariables));
                    }
                    if has_outputs {
                        return Err(err(lineno, col, ParseErrorKind::DuplicateOutputs));
                    }
                    has_outputs = true;
                    cur.skip_ws();
                    cur.list(|icol, item| {
                        if !item.as_bytes()[0].is_ascii_alphabetic() {
                            return Err(err(lineno, icol, ParseErrorKind::BadVariableName));
                        }
                        let Some(&id) = name_to_id.get(item) else {
                            return Err(err(lineno, icol, ParseErrorKind::UndeclaredVariable));
                        };
                        if is_output[id as usize] {
                            return Err(err(lineno, icol, ParseErrorKind::DuplicateOutput));
                        }
                        is_output[id as usize] = true;
                        outputs.push(id);
                        Ok(())
                    })?;
                } else if cur.tag(".c") {
                    if !has_variables {
                        return Err(err(lineno, col, ParseErrorKind::MissingVariables));
                    }
                    if !has_inputs {
                        return Err(err(lineno, col, ParseErrorKind::MissingInputs));
                    }
                    if has_constants {
                        return Err(err(lineno, col, ParseErrorKind::DuplicateConstants));
                    }
                    has_constants = true;
                    cur.skip_ws();
                    let mut next_var: usize = 0;
                    cur.list(|icol, item| {
                        let mut value: u32 = 0;
                        for c in item.bytes() {
                            if !c.is_ascii_digit() {
                                return Err(err(lineno, icol, ParseErrorKind::BadConstant));
                            }
                            value = value * 10 + (c - b'0') as u32;
                            if value > MAX_NUMBER {
                                return Err(err(lineno, icol, ParseErrorKind::ConstantTooBig));
                            }
                        }
                        // Constants fill the non-input variables in
                        // declaration order.
                        while next_var < variables.len() && is_input[next_var] {
                            next_var += 1;
                        }
                        if next_var >= variables.len() {
                            return Err(err(lineno, icol, ParseErrorKind::TooManyConstants));
                        }
                        constants.push((next_var as u32, value));
                        next_var += 1;
                        Ok(())
                    })?;
                } else {
                    return Err(cur.err_at(col, ParseErrorKind::ExpectedTag));
                }
            }
            State::Gates => {
                if cur.keyword_ci("END") {
                    cur.skip_ws();
                    if !cur.at_break() {
                        return Err(cur.err(ParseErrorKind::TrailingGarbage));
                    }
                    state = State::Done;
                    continue;
                }

                let Some(op) = cur.peek().filter(|c| c.is_ascii_alphabetic()) else {
                    return Err(cur.err(ParseErrorKind::ExpectedGate));
                };
                cur.pos += 1;
                let inverted = cur.peek() == Some(b'\'');
                if inverted {
                    cur.pos += 1;
                }
                let kind = match (op.to_ascii_lowercase(), inverted) {
                    (b't', false) => Some(GateKind::Not),
                    (b'y', false) => Some(GateKind::PauliY),
                    (b'z', false) => Some(GateKind::PauliZ),
                    (b'v', false) => Some(GateKind::SqrtNot),
                    (b'v', true) => Some(GateKind::SqrtNotInv),
                    (b'h', false) => Some(GateKind::Hadamard),
                    (b'q', false) => Some(GateKind::Quarter),
                    (b'q', true) => Some(GateKind::QuarterInv),
                    (b'f', false) => None,
                    _ => return Err(cur.err_at(col, ParseErrorKind::ExpectedGate)),
                };

                let count = cur.param_count()?;
                cur.skip_ws();

                let mut params: Vec<u32> = Vec::new();
                cur.list(|icol, item| {
                    if params.len() >= count {
                        return Err(err(lineno, icol, ParseErrorKind::TooManyParams));
                    }
                    let Some(&id) = name_to_id.get(item) else {
                        return Err(err(lineno, icol, ParseErrorKind::UndeclaredVariable));
                    };
                    params.push(id);
                    Ok(())
                })?;
                if params.len() < count {
                    return Err(cur.err(ParseErrorKind::MissingParams));
                }
                if !params.windows(2).all(|w| w[0] < w[1]) {
                    return Err(cur.err_at(col, ParseErrorKind::UnorderedParams));
                }

                match kind {
                    None => {
                        if params.len() < 2 {
                            return Err(cur.err_at(col, ParseErrorKind::TooFewParams));
                        }
                        let b = params.pop().unwrap();
                        let a = params.pop().unwrap();
                        gates.push(Gate::Fredkin {
                            controls: params,
                            targets: (a, b),
                        });
                    }
                    Some(kind) => {
                        let target = params.pop().unwrap();
                        gates.push(Gate::Unitary {
                            kind,
                            controls: params,
                            target,
                        });
                    }
                }
            }
            State::Done => unreachable!(),
        }
    }

    if state != State::Done {
        return Err(err(lineno + 1, 0, ParseErrorKind::MissingEnd));
    }

    Ok(Program {
        variables,
        inputs,
        outputs,
        constants,
        gates,
    })
}
