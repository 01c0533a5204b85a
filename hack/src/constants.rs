//! Constant values of the Hack platform.

/// Largest value an A-instruction can load, since the top bit
/// marks a C-instruction.
pub const MAX_CONSTANT: u16 = 0x7FFF; // 32767

/// Stack pointer register.
pub const SP: u16 = 0;
/// Base of the current function's local segment.
pub const LCL: u16 = 1;
/// Base of the current function's argument segment.
pub const ARG: u16 = 2;
/// Base of the `this` segment, also `pointer 0`.
pub const THIS: u16 = 3;
/// Base of the `that` segment, also `pointer 1`.
pub const THAT: u16 = 4;

/// The `temp` segment occupies RAM 5 through 12.
pub const TEMP_BASE: u16 = 5;
pub const TEMP_SIZE: u16 = 8;

/// The `pointer` segment aliases `THIS` and `THAT`.
pub const POINTER_BASE: u16 = THIS;
pub const POINTER_SIZE: u16 = 2;

/// First address of the global stack, set by the bootstrap code.
pub const STACK_START: u16 = 256;

/// First RAM address handed out to assembly variables.
pub const VARIABLE_START: u16 = 16;

/// Memory mapped screen, 512x256 pixels.
pub const SCREEN: u16 = 0x4000; // 16384
/// Memory mapped keyboard.
pub const KBD: u16 = 0x6000; // 24576

/// Symbols known to the assembler before any source is read.
#[rustfmt::skip]
pub const PREDEFINED_SYMBOLS: &[(&str, u16)] = &[
    ("SP", SP), ("LCL", LCL), ("ARG", ARG), ("THIS", THIS), ("THAT", THAT),
    ("R0", 0),   ("R1", 1),   ("R2", 2),   ("R3", 3),
    ("R4", 4),   ("R5", 5),   ("R6", 6),   ("R7", 7),
    ("R8", 8),   ("R9", 9),   ("R10", 10), ("R11", 11),
    ("R12", 12), ("R13", 13), ("R14", 14), ("R15", 15),
    ("SCREEN", SCREEN), ("KBD", KBD),
];
