pub mod asm;
pub mod constants;
mod error;
pub mod vm;

pub use self::{
    asm::{assemble, to_hack_text},
    error::{AsmError, HackError, HackResult, VmError},
    vm::translate,
};

pub mod prelude {
    pub use super::{
        asm::{Assembler, Lexer},
        error::{HackError, HackResult},
        vm::{ArithOp, Segment, Translator, TranslatorConf, VmCommand},
    };
}
