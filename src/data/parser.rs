//! Parser for the textual IR format.
//!
//! The format is line-oriented: one instruction per line, blocks introduced
//! by `label:` lines, functions delimited by `func @name(...) {` and `}`,
//! declarations given as `decl @name`. Comments start with `;` and run to the
//! end of the line.

use std::fmt;
use std::io::{self, BufRead};

use super::function::{BasicBlock, Function};
use super::instruction::{BinOp, Instruction, Operand};
use super::module::Module;
use super::types::{FuncName, Label, VarName};

#[derive(Debug)]
pub enum ParseError {
    Read {
        inner: io::Error,
    },
    UnexpectedEnd {
        line: u32,
    },
    Unexpected {
        line: u32,
        found: String,
        expected: &'static str,
    },
    MissingBlockLabel {
        line: u32,
    },
    MissingDest {
        line: u32,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Read { inner } => write!(f, "read error: {}", inner),
            ParseError::UnexpectedEnd { line } => {
                write!(f, "line {}: unexpected end of input", line)
            }
            ParseError::Unexpected {
                line,
                found,
                expected,
            } => write!(f, "line {}: expected {}, found `{}`", line, expected, found),
            ParseError::MissingBlockLabel { line } => {
                write!(f, "line {}: instruction outside of a basic block", line)
            }
            ParseError::MissingDest { line } => {
                write!(f, "line {}: instruction requires a destination", line)
            }
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(inner: io::Error) -> Self {
        ParseError::Read { inner }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses one module from the given source.
pub fn parse_module<R: BufRead>(source: &mut R) -> ParseResult<Module> {
    let mut module = Module::new();
    let mut current: Option<Function> = None;

    let mut line_no = 0;
    let mut buffer = String::new();

    loop {
        buffer.clear();
        if source.read_line(&mut buffer)? == 0 {
            break;
        }
        line_no += 1;

        let line = match buffer.find(';') {
            Some(pos) => buffer[..pos].trim(),
            None => buffer.trim(),
        };

        if line.is_empty() {
            continue;
        }

        if let Some(rest) = strip_keyword(line, "decl") {
            if current.is_some() {
                return Err(unexpected(line_no, line, "`}` before next declaration"));
            }
            let mut cursor = Cursor::new(rest, line_no);
            cursor.expect('@')?;
            let name = FuncName::new(cursor.ident()?);
            cursor.end()?;
            module.functions.push(Function::new(name, Vec::new()));
        } else if let Some(rest) = strip_keyword(line, "func") {
            if current.is_some() {
                return Err(unexpected(line_no, line, "`}` before next function"));
            }
            current = Some(parse_func_header(rest, line_no)?);
        } else if line == "}" {
            match current.take() {
                Some(func) => module.functions.push(func),
                None => return Err(unexpected(line_no, line, "a function body")),
            }
        } else if let Some(label) = block_label(line) {
            let func = current
                .as_mut()
                .ok_or_else(|| unexpected(line_no, line, "a `func` header"))?;
            func.blocks.push(BasicBlock::new(Label::new(label)));
        } else {
            let func = match current.as_mut() {
                Some(func) => func,
                None => return Err(unexpected(line_no, line, "a `func` header")),
            };
            let block = func
                .blocks
                .last_mut()
                .ok_or(ParseError::MissingBlockLabel { line: line_no })?;
            block.insts.push(parse_inst(line, line_no)?);
        }
    }

    if current.is_some() {
        return Err(ParseError::UnexpectedEnd { line: line_no });
    }

    Ok(module)
}

fn unexpected(line: u32, found: &str, expected: &'static str) -> ParseError {
    ParseError::Unexpected {
        line,
        found: found.to_string(),
        expected,
    }
}

// `decl @f` must not match an identifier like `declare_x`, hence the explicit
// boundary check instead of a plain prefix strip.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn block_label(line: &str) -> Option<&str> {
    let name = line.strip_suffix(':')?;
    if !name.is_empty() && name.chars().all(is_ident_char) {
        Some(name)
    } else {
        None
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$'
}

fn parse_func_header(rest: &str, line: u32) -> ParseResult<Function> {
    let mut cursor = Cursor::new(rest, line);
    cursor.expect('@')?;
    let name = FuncName::new(cursor.ident()?);

    cursor.expect('(')?;
    let mut params = Vec::new();
    if !cursor.eat(')') {
        loop {
            cursor.expect('%')?;
            params.push(VarName::new(cursor.ident()?));
            if cursor.eat(')') {
                break;
            }
            cursor.expect(',')?;
        }
    }

    cursor.expect('{')?;
    cursor.end()?;

    Ok(Function::new(name, params))
}

fn parse_inst(line: &str, line_no: u32) -> ParseResult<Instruction> {
    let (dest, body) = match line.split_once('=') {
        Some((lhs, rhs)) if lhs.trim_start().starts_with('%') => {
            let mut cursor = Cursor::new(lhs, line_no);
            cursor.expect('%')?;
            let dest = VarName::new(cursor.ident()?);
            cursor.end()?;
            (Some(dest), rhs.trim_start())
        }
        _ => (None, line),
    };

    let mut cursor = Cursor::new(body, line_no);
    let opcode = cursor.ident()?;

    let inst = match opcode.as_str() {
        "add" | "sub" | "mul" | "div" => {
            let op = match opcode.as_str() {
                "add" => BinOp::Add,
                "sub" => BinOp::Sub,
                "mul" => BinOp::Mul,
                _ => BinOp::Div,
            };
            let lhs = cursor.operand()?;
            cursor.expect(',')?;
            let rhs = cursor.operand()?;
            Instruction::Binary {
                op,
                dest: dest.ok_or(ParseError::MissingDest { line: line_no })?,
                lhs,
                rhs,
            }
        }
        "load" => Instruction::Load {
            dest: dest.ok_or(ParseError::MissingDest { line: line_no })?,
            src: cursor.operand()?,
        },
        "store" => {
            let value = cursor.operand()?;
            cursor.expect(',')?;
            let target = cursor.operand()?;
            Instruction::Store {
                dest: target,
                value,
            }
        }
        "call" => {
            let (callee, args) = parse_call_site(&mut cursor)?;
            Instruction::Call { dest, callee, args }
        }
        "invoke" => {
            let (callee, args) = parse_call_site(&mut cursor)?;
            cursor.keyword("to")?;
            let normal = Label::new(cursor.ident()?);
            cursor.keyword("unwind")?;
            let unwind = Label::new(cursor.ident()?);
            Instruction::Invoke {
                dest,
                callee,
                args,
                normal,
                unwind,
            }
        }
        "br" => {
            cursor.skip_ws();
            if cursor.peek() == Some('%') {
                let cond = cursor.operand()?;
                cursor.expect(',')?;
                let tt = Label::new(cursor.ident()?);
                cursor.expect(',')?;
                let ff = Label::new(cursor.ident()?);
                Instruction::Branch {
                    cond: Some(cond),
                    targets: vec![tt, ff],
                }
            } else {
                let target = Label::new(cursor.ident()?);
                Instruction::Branch {
                    cond: None,
                    targets: vec![target],
                }
            }
        }
        "ret" => {
            cursor.skip_ws();
            let value = if cursor.at_end() {
                None
            } else {
                Some(cursor.operand()?)
            };
            Instruction::Ret { value }
        }
        _ => return Err(unexpected(line_no, &opcode, "an opcode")),
    };

    cursor.end()?;
    Ok(inst)
}

fn parse_call_site(cursor: &mut Cursor<'_>) -> ParseResult<(Operand, Vec<Operand>)> {
    let callee = cursor.operand()?;
    cursor.expect('(')?;

    let mut args = Vec::new();
    if !cursor.eat(')') {
        loop {
            args.push(cursor.operand()?);
            if cursor.eat(')') {
                break;
            }
            cursor.expect(',')?;
        }
    }

    Ok((callee, args))
}

/// Character cursor over one line.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: u32,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, line: u32) -> Self {
        Cursor { text, pos: 0, line }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.rest().is_empty()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> ParseResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.fail(match expected {
                '@' => "`@`",
                '%' => "`%`",
                '(' => "`(`",
                ')' => "`)`",
                ',' => "`,`",
                '{' => "`{`",
                _ => "a punctuation character",
            }))
        }
    }

    fn ident(&mut self) -> ParseResult<String> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest.find(|c| !is_ident_char(c)).unwrap_or(rest.len());
        if len == 0 {
            Err(self.fail("an identifier"))
        } else {
            self.pos += len;
            Ok(rest[..len].to_string())
        }
    }

    fn keyword(&mut self, keyword: &'static str) -> ParseResult<()> {
        let ident = self.ident()?;
        if ident == keyword {
            Ok(())
        } else {
            Err(ParseError::Unexpected {
                line: self.line,
                found: ident,
                expected: keyword,
            })
        }
    }

    fn operand(&mut self) -> ParseResult<Operand> {
        self.skip_ws();
        match self.peek() {
            Some('%') => {
                self.pos += 1;
                Ok(Operand::Local(VarName::new(self.ident()?)))
            }
            Some('@') => {
                self.pos += 1;
                Ok(Operand::Func(FuncName::new(self.ident()?)))
            }
            Some(c) if c.is_ascii_digit() || c == '-' => {
                let rest = self.rest();
                let len = rest
                    .char_indices()
                    .skip(1)
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map(|(pos, _)| pos)
                    .unwrap_or(rest.len());
                let digits = &rest[..len];
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| self.fail("an integer"))?;
                self.pos += len;
                Ok(Operand::Const(value))
            }
            Some(c) if is_ident_char(c) => {
                self.keyword("bitcast")?;
                self.expect('(')?;
                let inner = self.operand()?;
                self.expect(')')?;
                Ok(Operand::Cast(Box::new(inner)))
            }
            _ => Err(self.fail("an operand")),
        }
    }

    fn end(&mut self) -> ParseResult<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.fail("end of line"))
        }
    }

    fn fail(&mut self, expected: &'static str) -> ParseError {
        self.skip_ws();
        let found = if self.rest().is_empty() {
            return ParseError::UnexpectedEnd { line: self.line };
        } else {
            self.rest().to_string()
        };
        ParseError::Unexpected {
            line: self.line,
            found,
            expected,
        }
    }
}
