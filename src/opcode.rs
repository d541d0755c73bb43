//! # Opcode Module
//!
//! The target instruction set: a linear, text-rendered stack-machine
//! assembly dialect executed by the ledger's transaction-approval VM.
//! Instructions are built as Rust enums during code generation for type
//! safety, then rendered line-by-line via `Display` into the final
//! listing.
//!
//! ## Design Notes
//! - The machine has an implicit evaluation stack plus addressable
//!   storage slots (`load`/`store`).
//! - Constants are never immediate: they are pushed by pool index
//!   (`intc`/`bytec`) out of the `intcblock`/`bytecblock` headers.
//! - The only branch primitive is `bnz` (branch if top of stack is
//!   nonzero); there is no unconditional jump.

use std::fmt;

use crate::ast::{BinOp, UnaryOp};

// -----------------------------------------------------------------------------
// INSTRUCTION SET
// -----------------------------------------------------------------------------

/// A single instruction of the target assembly dialect.
///
/// Each variant renders to exactly one output line.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // -- Constant Pool Headers --
    /// Integer constant pool header: `intcblock <v0> <v1> ...`.
    /// Always the first line; entries are decimal, indices implied by
    /// position.
    IntcBlock { values: Vec<u64> },
    /// Byte constant pool header: `bytecblock <hex0> <hex1> ...`.
    /// Present only when the byte pool is non-empty; entries are
    /// `0x`-prefixed lowercase hex.
    BytecBlock { values: Vec<Vec<u8>> },

    // -- Constant Push --
    /// Pushes the integer constant at pool index `idx`: `intc <idx>`.
    Intc { idx: usize },
    /// Pushes the byte constant at pool index `idx`: `bytec <idx>`.
    Bytec { idx: usize },

    // -- Storage Slots --
    /// Pushes the value in storage slot `slot`: `load <slot>`.
    Load { slot: usize },
    /// Pops the stack top into storage slot `slot`: `store <slot>`.
    Store { slot: usize },

    // -- Operators --
    /// Pops two operands, pushes the result: a bare operator line
    /// such as `+` or `==`.
    Binary { op: BinOp },
    /// Pops one operand, pushes the result: a bare operator line
    /// such as `!`.
    Unary { op: UnaryOp },

    // -- Control Flow --
    /// Aborts the program immediately: `err`. No operands, no stack
    /// effect.
    Err,
    /// Pops the stack top and branches to `label` if it is nonzero:
    /// `bnz <label>`.
    BranchNonZero { label: String },
    /// Defines a branch target: `<label>:`.
    Label { name: String },

    // -- Annotations --
    /// A non-executable annotation line: `// <text>`.
    Comment { text: String },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::IntcBlock { values } => {
                write!(f, "intcblock")?;
                for v in values {
                    write!(f, " {}", v)?;
                }
                Ok(())
            }
            Instruction::BytecBlock { values } => {
                write!(f, "bytecblock")?;
                for bytes in values {
                    write!(f, " 0x")?;
                    for b in bytes {
                        write!(f, "{:02x}", b)?;
                    }
                }
                Ok(())
            }
            Instruction::Intc { idx } => write!(f, "intc {}", idx),
            Instruction::Bytec { idx } => write!(f, "bytec {}", idx),
            Instruction::Load { slot } => write!(f, "load {}", slot),
            Instruction::Store { slot } => write!(f, "store {}", slot),
            Instruction::Binary { op } => write!(f, "{}", op.opcode()),
            Instruction::Unary { op } => write!(f, "{}", op.opcode()),
            Instruction::Err => write!(f, "err"),
            Instruction::BranchNonZero { label } => write!(f, "bnz {}", label),
            Instruction::Label { name } => write!(f, "{}:", name),
            Instruction::Comment { text } => write!(f, "// {}", text),
        }
    }
}

// -----------------------------------------------------------------------------
// OPERATOR OPCODES
// -----------------------------------------------------------------------------

impl BinOp {
    /// The opcode line this operator lowers to.
    pub fn opcode(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
        }
    }
}

impl UnaryOp {
    /// The opcode line this operator lowers to.
    pub fn opcode(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

// -----------------------------------------------------------------------------
// COMPILED PROGRAM
// -----------------------------------------------------------------------------

/// A fully assembled approval program.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    /// The complete instruction sequence: pool headers, body, epilogue
    /// label.
    pub instructions: Vec<Instruction>,
}

impl CompiledProgram {
    /// Renders the program as newline-joined assembly text.
    ///
    /// The listing always ends with a trailing newline, so the final
    /// split line is empty — consumers indexing from the end should
    /// expect it.
    pub fn source(&self) -> String {
        let mut out = String::new();
        for instr in &self.instructions {
            out.push_str(&instr.to_string());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source())
    }
}
