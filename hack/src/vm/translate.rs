//! Lowering of stack machine commands into Hack assembly.
use std::fmt::Write;

use log::{debug, trace};

use super::{parse_lines, ArithOp, Segment, VmCommand};
use crate::{
    constants::{POINTER_SIZE, STACK_START, TEMP_BASE, TEMP_SIZE},
    error::{HackError, HackResult, VmError},
};

/// Translator Configuration Parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TranslatorConf {
    /// Emit startup code that sets the stack pointer and calls `Sys.init`.
    pub bootstrap: bool,
    /// Precede each command's assembly with the command as a comment.
    pub comments: bool,
    /// Terminate the program with an infinite loop.
    pub end_loop: bool,
}

impl Default for TranslatorConf {
    fn default() -> Self {
        Self {
            bootstrap: false,
            comments: false,
            end_loop: true,
        }
    }
}

/// Translate the VM text of a single unit into a complete assembly program.
pub fn translate(unit_name: &str, source: &str, conf: TranslatorConf) -> HackResult<String> {
    let mut translator = Translator::new(conf)?;
    translator.translate_unit(unit_name, source)?;
    translator.finish()
}

/// Accumulates the assembly of one or more units.
///
/// Label counters live in the translator rather than the unit so that
/// units translated into the same program never collide.
pub struct Translator {
    out: String,
    conf: TranslatorConf,
    /// Prefix for static variables, the unit name.
    unit: String,
    /// Enclosing function, scopes branch labels and return addresses.
    function: String,
    compare_count: usize,
    return_count: usize,
}

impl Translator {
    pub fn new(conf: TranslatorConf) -> HackResult<Self> {
        let mut translator = Self {
            out: String::new(),
            conf,
            unit: String::new(),
            function: String::new(),
            compare_count: 0,
            return_count: 0,
        };

        if translator.conf.bootstrap {
            translator.write_bootstrap()?;
        }

        Ok(translator)
    }

    /// Parse and translate the VM text of one unit.
    ///
    /// The unit name is the source file stem, used to name static variables.
    pub fn translate_unit(&mut self, unit_name: &str, source: &str) -> HackResult<()> {
        debug!("translating unit {unit_name}");
        let commands = parse_lines(source)?;
        self.begin_unit(unit_name);
        for (line, command) in &commands {
            self.write_command(command).map_err(|err| match err {
                HackError::Vm(mut err) if err.line == 0 => {
                    err.line = *line;
                    HackError::Vm(err)
                }
                err => err,
            })?;
        }
        Ok(())
    }

    /// Switch the static variable namespace.
    pub fn begin_unit(&mut self, unit_name: &str) {
        self.unit = unit_name.to_owned();
    }

    /// Consume the translator and return the assembly text.
    pub fn finish(mut self) -> HackResult<String> {
        if self.conf.end_loop {
            writeln!(self.out, "(END)")?;
            writeln!(self.out, "@END")?;
            writeln!(self.out, "0;JMP")?;
        }
        Ok(self.out)
    }

    pub fn write_command(&mut self, command: &VmCommand) -> HackResult<()> {
        trace!("{command}");

        if self.conf.comments {
            writeln!(self.out, "// {command}")?;
        }

        match command {
            VmCommand::Push(segment, index) => self.write_push(*segment, *index),
            VmCommand::Pop(segment, index) => self.write_pop(*segment, *index),
            VmCommand::Arithmetic(op) => self.write_arithmetic(*op),
            VmCommand::Label(label) => {
                let label = self.scoped_label(label);
                writeln!(self.out, "({label})")?;
                Ok(())
            }
            VmCommand::Goto(label) => {
                let label = self.scoped_label(label);
                writeln!(self.out, "@{label}")?;
                writeln!(self.out, "0;JMP")?;
                Ok(())
            }
            VmCommand::IfGoto(label) => {
                let label = self.scoped_label(label);
                self.pop_d()?;
                writeln!(self.out, "@{label}")?;
                writeln!(self.out, "D;JNE")?;
                Ok(())
            }
            VmCommand::Function(name, locals) => self.write_function(name, *locals),
            VmCommand::Call(name, args) => self.write_call(name, *args),
            VmCommand::Return => self.write_return(),
        }
    }

    fn write_bootstrap(&mut self) -> HackResult<()> {
        if self.conf.comments {
            writeln!(self.out, "// bootstrap")?;
        }
        writeln!(self.out, "@{STACK_START}")?;
        writeln!(self.out, "D=A")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "M=D")?;
        self.write_call("Sys.init", 0)
    }

    fn scoped_label(&self, label: &str) -> String {
        if self.function.is_empty() {
            label.to_owned()
        } else {
            format!("{}${}", self.function, label)
        }
    }
}

/// Stack primitives.
impl Translator {
    /// Push the D register.
    fn push_d(&mut self) -> HackResult<()> {
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "M=D")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "M=M+1")?;
        Ok(())
    }

    /// Pop into the D register.
    fn pop_d(&mut self) -> HackResult<()> {
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "AM=M-1")?;
        writeln!(self.out, "D=M")?;
        Ok(())
    }

    /// Decrement the stack pointer and address the top value with `A`.
    fn pop_addr(&mut self) -> HackResult<()> {
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "AM=M-1")?;
        Ok(())
    }
}

/// Memory access.
impl Translator {
    fn write_push(&mut self, segment: Segment, index: u16) -> HackResult<()> {
        match segment {
            Segment::Constant => {
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "D=A")?;
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                writeln!(self.out, "@{}", base_register(segment))?;
                writeln!(self.out, "D=M")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "A=D+A")?;
                writeln!(self.out, "D=M")?;
            }
            Segment::Static | Segment::Temp | Segment::Pointer => {
                let addr = self.direct_address(segment, index)?;
                writeln!(self.out, "@{addr}")?;
                writeln!(self.out, "D=M")?;
            }
        }
        self.push_d()
    }

    fn write_pop(&mut self, segment: Segment, index: u16) -> HackResult<()> {
        match segment {
            Segment::Constant => {
                return Err(VmError::new(0, format!("cannot pop into constant {index}")).into());
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                // Target address is computed before the pop clobbers D.
                writeln!(self.out, "@{}", base_register(segment))?;
                writeln!(self.out, "D=M")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "D=D+A")?;
                writeln!(self.out, "@R13")?;
                writeln!(self.out, "M=D")?;
                self.pop_d()?;
                writeln!(self.out, "@R13")?;
                writeln!(self.out, "A=M")?;
                writeln!(self.out, "M=D")?;
            }
            Segment::Static | Segment::Temp | Segment::Pointer => {
                let addr = self.direct_address(segment, index)?;
                self.pop_d()?;
                writeln!(self.out, "@{addr}")?;
                writeln!(self.out, "M=D")?;
            }
        }
        Ok(())
    }

    /// Symbol or RAM address of a directly addressed segment slot.
    fn direct_address(&self, segment: Segment, index: u16) -> HackResult<String> {
        match segment {
            Segment::Static => Ok(format!("{}.{}", self.unit, index)),
            Segment::Temp if index < TEMP_SIZE => Ok(format!("R{}", TEMP_BASE + index)),
            Segment::Pointer if index < POINTER_SIZE => {
                Ok(if index == 0 { "THIS" } else { "THAT" }.to_owned())
            }
            _ => Err(VmError::new(0, format!("{segment} index {index} out of range")).into()),
        }
    }
}

fn base_register(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        Segment::That => "THAT",
        _ => unreachable!("segment {segment} has no base register"),
    }
}

/// Arithmetic.
impl Translator {
    fn write_arithmetic(&mut self, op: ArithOp) -> HackResult<()> {
        match op {
            ArithOp::Neg | ArithOp::Not => {
                writeln!(self.out, "@SP")?;
                writeln!(self.out, "A=M-1")?;
                let comp = if op == ArithOp::Neg { "-M" } else { "!M" };
                writeln!(self.out, "M={comp}")?;
            }
            ArithOp::Add | ArithOp::Sub | ArithOp::And | ArithOp::Or => {
                self.pop_d()?;
                writeln!(self.out, "A=A-1")?;
                let comp = match op {
                    ArithOp::Add => "D+M",
                    ArithOp::Sub => "M-D",
                    ArithOp::And => "D&M",
                    _ => "D|M",
                };
                writeln!(self.out, "M={comp}")?;
            }
            ArithOp::Eq | ArithOp::Gt | ArithOp::Lt => {
                let n = self.compare_count;
                self.compare_count += 1;
                let true_label = format!("{}$CMP_TRUE_{n}", self.unit);
                let end_label = format!("{}$CMP_END_{n}", self.unit);
                let jump = match op {
                    ArithOp::Eq => "JEQ",
                    ArithOp::Gt => "JGT",
                    _ => "JLT",
                };

                self.pop_d()?;
                self.pop_addr()?;
                writeln!(self.out, "D=M-D")?;
                writeln!(self.out, "@{true_label}")?;
                writeln!(self.out, "D;{jump}")?;
                writeln!(self.out, "D=0")?;
                writeln!(self.out, "@{end_label}")?;
                writeln!(self.out, "0;JMP")?;
                writeln!(self.out, "({true_label})")?;
                writeln!(self.out, "D=-1")?;
                writeln!(self.out, "({end_label})")?;
                self.push_d()?;
            }
        }
        Ok(())
    }
}

/// Function calling convention.
impl Translator {
    fn write_function(&mut self, name: &str, locals: u16) -> HackResult<()> {
        self.function = name.to_owned();
        writeln!(self.out, "({name})")?;
        for _ in 0..locals {
            writeln!(self.out, "@SP")?;
            writeln!(self.out, "A=M")?;
            writeln!(self.out, "M=0")?;
            writeln!(self.out, "@SP")?;
            writeln!(self.out, "M=M+1")?;
        }
        Ok(())
    }

    fn write_call(&mut self, name: &str, args: u16) -> HackResult<()> {
        let caller = if self.function.is_empty() {
            "Bootstrap"
        } else {
            self.function.as_str()
        };
        let return_label = format!("{caller}$ret.{}", self.return_count);
        self.return_count += 1;

        // Return address.
        writeln!(self.out, "@{return_label}")?;
        writeln!(self.out, "D=A")?;
        self.push_d()?;

        // Caller frame.
        for register in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{register}")?;
            writeln!(self.out, "D=M")?;
            self.push_d()?;
        }

        // ARG = SP - 5 - args
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@{}", 5 + args as u32)?;
        writeln!(self.out, "D=D-A")?;
        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "M=D")?;

        // LCL = SP
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@LCL")?;
        writeln!(self.out, "M=D")?;

        writeln!(self.out, "@{name}")?;
        writeln!(self.out, "0;JMP")?;
        writeln!(self.out, "({return_label})")?;
        Ok(())
    }

    fn write_return(&mut self) -> HackResult<()> {
        // R13 = frame
        writeln!(self.out, "@LCL")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@R13")?;
        writeln!(self.out, "M=D")?;

        // R14 = return address, read before the return value
        // can overwrite it when there are no arguments.
        writeln!(self.out, "@5")?;
        writeln!(self.out, "A=D-A")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@R14")?;
        writeln!(self.out, "M=D")?;

        // *ARG = pop()
        self.pop_d()?;
        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "M=D")?;

        // SP = ARG + 1
        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "D=M+1")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "M=D")?;

        // Restore caller frame, walking down from the saved THAT.
        for register in ["THAT", "THIS", "ARG", "LCL"] {
            writeln!(self.out, "@R13")?;
            writeln!(self.out, "AM=M-1")?;
            writeln!(self.out, "D=M")?;
            writeln!(self.out, "@{register}")?;
            writeln!(self.out, "M=D")?;
        }

        writeln!(self.out, "@R14")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "0;JMP")?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::asm::assemble;

    fn conf() -> TranslatorConf {
        TranslatorConf {
            end_loop: false,
            ..TranslatorConf::default()
        }
    }

    #[test]
    fn test_push_constant() {
        let asm = translate("Main", "push constant 7", conf()).unwrap();
        assert_eq!(asm, "@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n");
    }

    #[test]
    fn test_static_and_temp() {
        let asm = translate("Foo", "pop static 3\npush temp 6\npop pointer 1", conf()).unwrap();
        assert!(asm.contains("@Foo.3\nM=D\n"));
        assert!(asm.contains("@R11\nD=M\n"));
        assert!(asm.contains("@THAT\nM=D\n"));
    }

    #[test]
    fn test_segment_errors() {
        assert!(translate("Main", "pop constant 0", conf()).is_err());
        assert!(translate("Main", "push temp 8", conf()).is_err());
        assert!(translate("Main", "push pointer 2", conf()).is_err());
    }

    #[test]
    fn test_segment_error_line() {
        let source = "push constant 1\n\n// spill\npop constant 0";
        let err = translate("X", source, conf()).unwrap_err();
        match err {
            HackError::Vm(err) => {
                assert_eq!(err.line, 4);
                assert_eq!(err.to_string(), "line 4: cannot pop into constant 0");
            }
            err => panic!("expected vm error, found {:?}", err),
        }

        let err = translate("X", "push temp 8", conf()).unwrap_err();
        assert_eq!(err.to_string(), "vm error: line 1: temp index 8 out of range");
    }

    #[test]
    fn test_compare_labels_unique() {
        let asm = translate("Main", "eq\nlt\ngt", conf()).unwrap();
        for n in 0..3 {
            assert_eq!(asm.matches(&format!("(Main$CMP_TRUE_{n})")).count(), 1);
            assert_eq!(asm.matches(&format!("(Main$CMP_END_{n})")).count(), 1);
        }
    }

    #[test]
    fn test_labels_scoped_to_function() {
        let source = "function Main.loop 0\nlabel TOP\ngoto TOP\nif-goto TOP";
        let asm = translate("Main", source, conf()).unwrap();
        assert!(asm.contains("(Main.loop$TOP)\n"));
        assert_eq!(asm.matches("@Main.loop$TOP\n").count(), 2);
    }

    #[test]
    fn test_bootstrap_and_comments() {
        let conf = TranslatorConf {
            bootstrap: true,
            comments: true,
            end_loop: true,
        };
        let asm = translate("Sys", "function Sys.init 0\nreturn", conf).unwrap();
        assert!(asm.starts_with("// bootstrap\n@256\nD=A\n@SP\nM=D\n"));
        assert!(asm.contains("@Sys.init\n0;JMP\n(Bootstrap$ret.0)\n"));
        assert!(asm.contains("// function Sys.init 0\n(Sys.init)\n"));
        assert!(asm.ends_with("(END)\n@END\n0;JMP\n"));
    }

    #[test]
    fn test_output_assembles() {
        let source = include_str!("../../tests/SimpleFunction.vm");
        let asm = translate("SimpleFunction", source, TranslatorConf::default()).unwrap();
        let words = assemble(&asm).unwrap();
        assert!(!words.is_empty());
    }
}
