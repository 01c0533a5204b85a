//! VM text emitter.
use hack::vm::{ArithOp, Segment, VmCommand};
use log::trace;
use std::io;

/// Writes one command per line to the underlying stream.
///
/// No buffering of its own and no operand validation.
pub struct VmWriter<W> {
    out: W,
}

impl<W: io::Write> VmWriter<W> {
    #[inline]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_command(&mut self, command: &VmCommand) -> io::Result<()> {
        trace!("{}", command);
        writeln!(self.out, "{}", command)
    }

    #[inline]
    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.write_command(&VmCommand::Push(segment, index))
    }

    #[inline]
    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.write_command(&VmCommand::Pop(segment, index))
    }

    #[inline]
    pub fn write_arithmetic(&mut self, op: ArithOp) -> io::Result<()> {
        self.write_command(&VmCommand::Arithmetic(op))
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        self.write_command(&VmCommand::Label(label.to_owned()))
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        self.write_command(&VmCommand::Goto(label.to_owned()))
    }

    pub fn write_if(&mut self, label: &str) -> io::Result<()> {
        self.write_command(&VmCommand::IfGoto(label.to_owned()))
    }

    pub fn write_call(&mut self, name: &str, args: u16) -> io::Result<()> {
        self.write_command(&VmCommand::Call(name.to_owned(), args))
    }

    pub fn write_function(&mut self, name: &str, locals: u16) -> io::Result<()> {
        self.write_command(&VmCommand::Function(name.to_owned(), locals))
    }

    #[inline]
    pub fn write_return(&mut self) -> io::Result<()> {
        self.write_command(&VmCommand::Return)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_line_format() {
        let mut writer = VmWriter::new(Vec::new());
        writer.write_function("Main.main", 2).unwrap();
        writer.write_push(Segment::Constant, 7).unwrap();
        writer.write_pop(Segment::Local, 1).unwrap();
        writer.write_arithmetic(ArithOp::Not).unwrap();
        writer.write_label("WHILE_EXP_0").unwrap();
        writer.write_if("WHILE_END_0").unwrap();
        writer.write_goto("WHILE_EXP_0").unwrap();
        writer.write_call("Math.multiply", 2).unwrap();
        writer.write_return().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "function Main.main 2\npush constant 7\npop local 1\nnot\nlabel WHILE_EXP_0\n\
             if-goto WHILE_END_0\ngoto WHILE_EXP_0\ncall Math.multiply 2\nreturn\n"
        );
    }
}
