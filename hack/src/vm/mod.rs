//! Stack machine instruction model.
//!
//! Commands have a one line textual form, which is what the
//! compiler writes into `.vm` files and the translator reads back.
mod translate;

use std::{fmt, str::FromStr};

use crate::error::VmError;

pub use self::translate::{translate, Translator, TranslatorConf};

/// Named memory region, addressed by a 0-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Argument => write!(f, "argument"),
            Self::Local    => write!(f, "local"),
            Self::Static   => write!(f, "static"),
            Self::This     => write!(f, "this"),
            Self::That     => write!(f, "that"),
            Self::Pointer  => write!(f, "pointer"),
            Self::Temp     => write!(f, "temp"),
        }
    }
}

impl FromStr for Segment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Self::Constant),
            "argument" => Ok(Self::Argument),
            "local" => Ok(Self::Local),
            "static" => Ok(Self::Static),
            "this" => Ok(Self::This),
            "that" => Ok(Self::That),
            "pointer" => Ok(Self::Pointer),
            "temp" => Ok(Self::Temp),
            _ => Err(()),
        }
    }
}

/// Arithmetic and logic commands, operating on the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Sub => write!(f, "sub"),
            Self::Neg => write!(f, "neg"),
            Self::Eq  => write!(f, "eq"),
            Self::Gt  => write!(f, "gt"),
            Self::Lt  => write!(f, "lt"),
            Self::And => write!(f, "and"),
            Self::Or  => write!(f, "or"),
            Self::Not => write!(f, "not"),
        }
    }
}

impl FromStr for ArithOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "sub" => Ok(Self::Sub),
            "neg" => Ok(Self::Neg),
            "eq" => Ok(Self::Eq),
            "gt" => Ok(Self::Gt),
            "lt" => Ok(Self::Lt),
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "not" => Ok(Self::Not),
            _ => Err(()),
        }
    }
}

/// Single stack machine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(ArithOp),
    Label(String),
    Goto(String),
    IfGoto(String),
    /// Function declaration with its number of local variables.
    Function(String, u16),
    /// Call with the number of arguments already pushed.
    Call(String, u16),
    Return,
}

impl fmt::Display for VmCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Push(segment, index) => write!(f, "push {segment} {index}"),
            Self::Pop(segment, index) => write!(f, "pop {segment} {index}"),
            Self::Arithmetic(op) => write!(f, "{op}"),
            Self::Label(label) => write!(f, "label {label}"),
            Self::Goto(label) => write!(f, "goto {label}"),
            Self::IfGoto(label) => write!(f, "if-goto {label}"),
            Self::Function(name, locals) => write!(f, "function {name} {locals}"),
            Self::Call(name, args) => write!(f, "call {name} {args}"),
            Self::Return => write!(f, "return"),
        }
    }
}

impl FromStr for VmCommand {
    type Err = VmError;

    /// Parse one command line, without comments.
    ///
    /// Errors carry no line number. Use [`parse_program`] to
    /// have them filled in.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| VmError::new(0, "empty command"))?;

        let command = match name {
            "push" | "pop" => {
                let segment = operand(&mut parts, name)?;
                let segment = Segment::from_str(segment)
                    .map_err(|_| VmError::new(0, format!("unknown segment '{segment}'")))?;
                let index = number(&mut parts, name)?;
                if name == "push" {
                    Self::Push(segment, index)
                } else {
                    Self::Pop(segment, index)
                }
            }
            "label" => Self::Label(operand(&mut parts, name)?.to_owned()),
            "goto" => Self::Goto(operand(&mut parts, name)?.to_owned()),
            "if-goto" => Self::IfGoto(operand(&mut parts, name)?.to_owned()),
            "function" => {
                let function = operand(&mut parts, name)?.to_owned();
                Self::Function(function, number(&mut parts, name)?)
            }
            "call" => {
                let function = operand(&mut parts, name)?.to_owned();
                Self::Call(function, number(&mut parts, name)?)
            }
            "return" => Self::Return,
            other => match ArithOp::from_str(other) {
                Ok(op) => Self::Arithmetic(op),
                Err(_) => return Err(VmError::new(0, format!("unknown command '{other}'"))),
            },
        };

        if let Some(extra) = parts.next() {
            return Err(VmError::new(
                0,
                format!("unexpected operand '{extra}' after {name}"),
            ));
        }

        Ok(command)
    }
}

fn operand<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    command: &str,
) -> Result<&'a str, VmError> {
    parts
        .next()
        .ok_or_else(|| VmError::new(0, format!("{command} is missing an operand")))
}

fn number<'a>(parts: &mut impl Iterator<Item = &'a str>, command: &str) -> Result<u16, VmError> {
    let text = operand(parts, command)?;
    text.parse::<u16>()
        .map_err(|_| VmError::new(0, format!("{command} expects a number, found '{text}'")))
}

/// Parse VM program text into commands.
///
/// Blank lines and `//` comments are skipped.
pub fn parse_program(source: &str) -> Result<Vec<VmCommand>, VmError> {
    Ok(parse_lines(source)?.into_iter().map(|(_, command)| command).collect())
}

/// Parse VM program text into commands paired with their
/// 1-based source line.
pub fn parse_lines(source: &str) -> Result<Vec<(usize, VmCommand)>, VmError> {
    let mut commands = vec![];

    for (index, line) in source.lines().enumerate() {
        let line = match line.find("//") {
            Some(comment) => &line[..comment],
            None => line,
        }
        .trim();

        if line.is_empty() {
            continue;
        }

        let command = VmCommand::from_str(line).map_err(|mut err| {
            err.line = index + 1;
            err
        })?;
        commands.push((index + 1, command));
    }

    Ok(commands)
}
