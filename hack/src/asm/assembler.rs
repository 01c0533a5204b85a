//! Assembler
use std::collections::HashMap;

use log::{debug, trace};

use crate::{
    constants::{MAX_CONSTANT, PREDEFINED_SYMBOLS, VARIABLE_START},
    error::{AsmError, HackError, HackResult},
};

use super::{lexer::Lexer, tokens::TokenKind, Addr, Token};

/// Two pass assembler.
///
/// The first pass parses instructions and records the address of
/// each label declaration. The second pass resolves symbolic
/// operands, allocating variables as they are first encountered.
pub struct Assembler<'a> {
    lexer: Lexer<'a>,
    symbols: HashMap<String, u16>,
    instructions: Vec<Instr>,
}

enum Instr {
    /// A-instruction, loads an address or constant.
    Load(Addr),
    /// C-instruction, already encoded.
    Compute(u16),
}

impl<'a> Assembler<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let symbols = PREDEFINED_SYMBOLS
            .iter()
            .map(|(name, addr)| (name.to_string(), *addr))
            .collect();

        Self {
            lexer,
            symbols,
            instructions: vec![],
        }
    }

    pub fn parse(mut self) -> HackResult<Vec<u16>> {
        loop {
            let token = self.lexer.next_token();

            match token.kind {
                TokenKind::Newline => {
                    /* Empty line */
                    continue;
                }
                TokenKind::At => self.parse_load()?,
                TokenKind::LeftParen => self.parse_label()?,
                TokenKind::Unknown => {
                    let fragment = token.span.fragment(self.lexer.source_code()).to_owned();
                    return Err(self.error(&token, format!("unknown token {:?}", fragment)));
                }
                TokenKind::EOF => {
                    if self.lexer.at_end() {
                        break;
                    }
                    return Err(self.error(&token, "unexpected null character"));
                }
                _ => self.parse_compute(token)?,
            }
        }

        debug!(
            "parsed {} instructions, {} symbols",
            self.instructions.len(),
            self.symbols.len()
        );

        Ok(self.resolve())
    }

    #[inline(never)]
    #[cold]
    fn error(&self, token: &Token, message: impl ToString) -> HackError {
        AsmError::new(self.lexer.source_code(), token, message).into()
    }

    fn next_offset(&self) -> u16 {
        self.instructions.len() as u16
    }

    fn fragment(&self, token: &Token) -> &'a str {
        token.span.fragment(self.lexer.source_code())
    }

    /// Every instruction and label declaration sits on its own line.
    fn expect_end_of_line(&mut self) -> HackResult<()> {
        let token = self.lexer.next_token();
        if !matches!(token.kind, TokenKind::Newline | TokenKind::EOF) {
            return Err(self.error(&token, "expected newline or end-of-file"));
        }
        Ok(())
    }

    /// Second pass.
    fn resolve(self) -> Vec<u16> {
        let Self {
            mut symbols,
            instructions,
            ..
        } = self;
        let mut next_variable = VARIABLE_START;

        instructions
            .into_iter()
            .map(|instr| match instr {
                Instr::Load(Addr::Num(value)) => value,
                Instr::Load(Addr::Symbol(name)) => *symbols.entry(name).or_insert_with_key(|name| {
                    let addr = next_variable;
                    trace!("variable {name} at {addr}");
                    next_variable += 1;
                    addr
                }),
                Instr::Compute(word) => word,
            })
            .collect()
    }
}

impl<'a> Assembler<'a> {
    /// `(LABEL)`
    fn parse_label(&mut self) -> HackResult<()> {
        let name = self.lexer.next_token();
        if name.kind != TokenKind::Ident {
            return Err(self.error(&name, "expected label name"));
        }

        let close = self.lexer.next_token();
        if close.kind != TokenKind::RightParen {
            return Err(self.error(&close, "expected ')'"));
        }

        self.expect_end_of_line()?;

        let label = self.fragment(&name);
        if self.symbols.contains_key(label) {
            return Err(self.error(&name, format!("duplicate symbol {label:?}")));
        }

        let offset = self.next_offset();
        trace!("label {label} at {offset}");
        self.symbols.insert(label.to_owned(), offset);

        Ok(())
    }

    /// `@value`
    fn parse_load(&mut self) -> HackResult<()> {
        let operand = self.lexer.next_token();
        let fragment = self.fragment(&operand);

        let addr = match operand.kind {
            TokenKind::Number => match fragment.parse::<u16>() {
                Ok(value) if value <= MAX_CONSTANT => Addr::Num(value),
                _ => {
                    return Err(self.error(
                        &operand,
                        format!("constant {fragment} out of range 0..={MAX_CONSTANT}"),
                    ))
                }
            },
            TokenKind::Ident => Addr::Symbol(fragment.to_owned()),
            _ => return Err(self.error(&operand, "expected constant or symbol after '@'")),
        };

        self.expect_end_of_line()?;
        self.instructions.push(Instr::Load(addr));

        Ok(())
    }

    /// `dest=comp;jump`, where either `dest=` or `;jump` may be omitted.
    fn parse_compute(&mut self, first: Token) -> HackResult<()> {
        let mut text = String::new();
        let mut last;
        let mut token = first.clone();

        loop {
            if !token.kind.is_instruction_part() {
                return Err(self.error(&token, format!("unexpected {}", token.kind)));
            }
            text.push_str(self.fragment(&token));
            last = token;

            token = self.lexer.next_token();
            if matches!(token.kind, TokenKind::Newline | TokenKind::EOF) {
                break;
            }
        }

        // Errors point at the whole instruction.
        let whole = Token {
            span: first.span + last.span,
            kind: first.kind,
        };

        let (dest, rest) = match text.split_once('=') {
            Some((dest, rest)) => (Some(dest), rest),
            None => (None, text.as_str()),
        };
        let (comp, jump) = match rest.split_once(';') {
            Some((comp, jump)) => (comp, Some(jump)),
            None => (rest, None),
        };

        let dest = match dest {
            Some(dest) => match dest_bits(dest) {
                Some(bits) => bits,
                None => return Err(self.error(&whole, format!("unknown destination {dest:?}"))),
            },
            None => 0,
        };
        let comp = match comp_bits(comp) {
            Some(bits) => bits,
            None => return Err(self.error(&whole, format!("unknown computation {comp:?}"))),
        };
        let jump = match jump {
            Some(jump) => match jump_bits(jump) {
                Some(bits) => bits,
                None => return Err(self.error(&whole, format!("unknown jump {jump:?}"))),
            },
            None => 0,
        };

        let word = 0b111 << 13 | comp << 6 | dest << 3 | jump;
        self.instructions.push(Instr::Compute(word));

        Ok(())
    }
}

/// `a` bit and the six `c` bits.
#[rustfmt::skip]
fn comp_bits(mnemonic: &str) -> Option<u16> {
    let bits = match mnemonic {
        "0"   => 0b0_101010,
        "1"   => 0b0_111111,
        "-1"  => 0b0_111010,
        "D"   => 0b0_001100,
        "A"   => 0b0_110000,
        "M"   => 0b1_110000,
        "!D"  => 0b0_001101,
        "!A"  => 0b0_110001,
        "!M"  => 0b1_110001,
        "-D"  => 0b0_001111,
        "-A"  => 0b0_110011,
        "-M"  => 0b1_110011,
        "D+1" => 0b0_011111,
        "A+1" => 0b0_110111,
        "M+1" => 0b1_110111,
        "D-1" => 0b0_001110,
        "A-1" => 0b0_110010,
        "M-1" => 0b1_110010,
        "D+A" => 0b0_000010,
        "D+M" => 0b1_000010,
        "D-A" => 0b0_010011,
        "D-M" => 0b1_010011,
        "A-D" => 0b0_000111,
        "M-D" => 0b1_000111,
        "D&A" => 0b0_000000,
        "D&M" => 0b1_000000,
        "D|A" => 0b0_010101,
        "D|M" => 0b1_010101,
        _ => return None,
    };
    Some(bits)
}

#[rustfmt::skip]
fn dest_bits(mnemonic: &str) -> Option<u16> {
    let bits = match mnemonic {
        "M"   => 0b001,
        "D"   => 0b010,
        "MD"  => 0b011,
        "A"   => 0b100,
        "AM"  => 0b101,
        "AD"  => 0b110,
        "AMD" => 0b111,
        _ => return None,
    };
    Some(bits)
}

#[rustfmt::skip]
fn jump_bits(mnemonic: &str) -> Option<u16> {
    let bits = match mnemonic {
        "JGT" => 0b001,
        "JEQ" => 0b010,
        "JGE" => 0b011,
        "JLT" => 0b100,
        "JNE" => 0b101,
        "JLE" => 0b110,
        "JMP" => 0b111,
        _ => return None,
    };
    Some(bits)
}

#[cfg(test)]
mod test {
    use crate::asm::assemble;

    #[test]
    fn test_encode_compute() {
        assert_eq!(assemble("D=M").unwrap(), vec![0b1111_1100_0001_0000]);
        assert_eq!(assemble("0;JMP").unwrap(), vec![0b1110_1010_1000_0111]);
        assert_eq!(assemble("AMD=D+1;JNE").unwrap(), vec![0b1110_0111_1111_1101]);
        // Whitespace between parts is insignificant.
        assert_eq!(assemble("M = M - 1").unwrap(), assemble("M=M-1").unwrap());
    }

    #[test]
    fn test_symbols() {
        let source = "@i\n@LOOP\n(LOOP)\n@SCREEN\n@j\n@i\n@R13\n";
        assert_eq!(
            assemble(source).unwrap(),
            vec![16, 2, 16384, 17, 16, 13],
        );
    }

    #[test]
    fn test_duplicate_label() {
        let err = assemble("(END)\n@END\n(END)\n0;JMP").unwrap_err();
        assert!(err.to_string().contains("duplicate symbol"), "{err}");
    }

    #[test]
    fn test_unknown_mnemonic() {
        let err = assemble("@2\n  D=D+Q\n").unwrap_err();
        match err {
            crate::HackError::Asm(err) => {
                assert_eq!(err.line, 2);
                assert_eq!(err.column, 3);
                assert_eq!(err.source_line, "  D=D+Q");
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn test_constant_range() {
        assert_eq!(assemble("@32767").unwrap(), vec![32767]);
        assert!(assemble("@32768").is_err());
    }
}
