//! # Codegen Module
//!
//! Two-pass code generation from the program AST to the target
//! assembly listing.
//!
//! The first pass walks the whole tree collecting the constant pools
//! and binding every declared name; the second pass emits instructions
//! against those finalized indices. The split is load-bearing:
//! instruction text references pools and slots by index, so nothing
//! may be emitted before both are final. No backpatching.
//!
//! Structured control flow is lowered to the machine's only branch
//! primitive: every `return` pushes its value, pushes the sentinel
//! constant `1`, and branches (`bnz`, always taken) to the one shared
//! epilogue label defined at the very end of the listing.

use crate::ast::{Expr, Program, Stmt};
use crate::error::{SigilError, Span};
use crate::opcode::{CompiledProgram, Instruction};
use crate::pool::ConstPool;
use crate::sym::{Binding, ConstValue, SymbolTable};

/// The shared exit label all return paths branch to. Defined exactly
/// once, as the final instruction, whether or not anything targets it.
pub const EPILOGUE_LABEL: &str = "end_program";

pub struct Codegen {
    instructions: Vec<Instruction>,
    pool: ConstPool,
    symbols: SymbolTable,
    errors: Vec<SigilError>,
}

impl Codegen {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            pool: ConstPool::new(),
            symbols: SymbolTable::new(),
            errors: Vec::new(),
        }
    }

    /// Compiles a parsed program into an assembled approval program.
    ///
    /// # Errors
    /// Returns every symbol and lowering error discovered across both
    /// passes. No listing is produced once anything is reported.
    pub fn compile(mut self, program: &Program) -> Result<CompiledProgram, Vec<SigilError>> {
        self.collect(program);

        for stmt in &program.globals {
            self.compile_stmt(stmt);
        }
        for stmt in &program.entry.body {
            self.compile_stmt(stmt);
        }
        self.emit(Instruction::Label {
            name: EPILOGUE_LABEL.to_string(),
        });

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let mut instructions = self.pool.headers();
        instructions.append(&mut self.instructions);
        Ok(CompiledProgram { instructions })
    }

    // -------------------------------------------------------------------------
    // COLLECTION PASS — constants and symbols
    // -------------------------------------------------------------------------

    /// Walks the program in source order: global bindings, then the
    /// entry parameters, then the body. Literal scan order fixes pool
    /// indices; declaration order fixes slot indices.
    fn collect(&mut self, program: &Program) {
        for stmt in &program.globals {
            self.collect_stmt(stmt);
        }
        for param in &program.entry.params {
            if let Err(e) = self.symbols.declare_param(param, program.entry.span) {
                self.errors.push(e);
            }
        }
        for stmt in &program.entry.body {
            self.collect_stmt(stmt);
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { name, value, span } => {
                self.collect_expr(value);
                if let Err(e) = self.symbols.declare_let(name, *span) {
                    self.errors.push(e);
                }
            }
            Stmt::Const { name, value, span } => {
                self.collect_expr(value);
                match literal_value(value) {
                    Some(v) => {
                        if let Err(e) = self.symbols.declare_const(name, v, *span) {
                            self.errors.push(e);
                        }
                    }
                    None => self.errors.push(SigilError::internal(
                        "unsupported construct: 'const' initializer must be a literal",
                        value.span(),
                    )),
                }
            }
            Stmt::Assign { value, .. } => self.collect_expr(value),
            Stmt::Return { value, .. } => self.collect_expr(value),
            Stmt::Error { .. } => {}
            Stmt::Block { stmts, .. } => {
                for s in stmts {
                    self.collect_stmt(s);
                }
            }
        }
    }

    /// Depth-first, left-to-right: the traversal order is the pool
    /// insertion order.
    fn collect_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Int { value, .. } => {
                self.pool.add_int(*value);
            }
            Expr::Bytes { value, .. } => {
                self.pool.add_bytes(value);
            }
            Expr::Ident { .. } => {}
            Expr::Binary { left, right, .. } => {
                self.collect_expr(left);
                self.collect_expr(right);
            }
            Expr::Unary { operand, .. } => {
                self.collect_expr(operand);
            }
        }
    }

    // -------------------------------------------------------------------------
    // EMISSION PASS — statements
    // -------------------------------------------------------------------------

    fn compile_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { name, value, .. } => {
                self.compile_expr(value);
                self.store_let(name);
            }
            Stmt::Const { .. } => {
                // Compile-time binding: the value is inlined at use
                // sites, so only the marker line is emitted here.
                self.emit(Instruction::Comment {
                    text: "const".to_string(),
                });
            }
            Stmt::Assign { name, value, span } => {
                self.compile_expr(value);
                self.store_assign(name, *span);
            }
            Stmt::Return { value, span } => {
                self.compile_expr(value);
                self.push_int(1, *span);
                self.emit(Instruction::BranchNonZero {
                    label: EPILOGUE_LABEL.to_string(),
                });
            }
            Stmt::Error { .. } => self.emit(Instruction::Err),
            Stmt::Block { stmts, .. } => {
                for s in stmts {
                    self.compile_stmt(s);
                }
            }
        }
    }

    fn store_let(&mut self, name: &str) {
        // A failed declaration was already reported in the collection
        // pass; only a slot binding gets a store.
        if let Some(Binding::Slot(slot)) = self.symbols.lookup(name).cloned() {
            self.emit(Instruction::Store { slot });
        }
    }

    fn store_assign(&mut self, name: &str, span: Span) {
        match self.symbols.lookup(name).cloned() {
            Some(Binding::Slot(slot)) => self.emit(Instruction::Store { slot }),
            Some(Binding::Const(_)) => self.errors.push(SigilError::codegen(
                format!("cannot assign to constant '{}'", name),
                span,
            )),
            Some(Binding::Param) => self.errors.push(SigilError::codegen(
                format!("cannot assign to parameter '{}'", name),
                span,
            )),
            None => self.errors.push(SigilError::codegen(
                format!("undefined symbol: '{}'", name),
                span,
            )),
        }
    }

    // -------------------------------------------------------------------------
    // EMISSION PASS — expressions
    // -------------------------------------------------------------------------

    /// Postorder lowering: operands first, operator last, leaving
    /// exactly one value on the evaluation stack.
    fn compile_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Int { value, span } => self.push_int(*value, *span),
            Expr::Bytes { value, span } => self.push_bytes(value, *span),
            Expr::Ident { name, span } => self.compile_ident(name, *span),
            Expr::Binary {
                left, op, right, ..
            } => {
                // Left before right is part of the contract, even
                // though no current operand can observe the order.
                self.compile_expr(left);
                self.compile_expr(right);
                self.emit(Instruction::Binary { op: *op });
            }
            Expr::Unary { op, operand, .. } => {
                self.compile_expr(operand);
                self.emit(Instruction::Unary { op: *op });
            }
        }
    }

    fn compile_ident(&mut self, name: &str, span: Span) {
        match self.symbols.lookup(name).cloned() {
            Some(Binding::Slot(slot)) => self.emit(Instruction::Load { slot }),
            Some(Binding::Const(ConstValue::Int(value))) => self.push_int(value, span),
            Some(Binding::Const(ConstValue::Bytes(value))) => self.push_bytes(&value, span),
            Some(Binding::Param) => self.errors.push(SigilError::internal(
                format!(
                    "unsupported construct: parameter '{}' cannot be used as a value",
                    name
                ),
                span,
            )),
            None => self.errors.push(SigilError::codegen(
                format!("undefined symbol: '{}'", name),
                span,
            )),
        }
    }

    fn push_int(&mut self, value: u64, span: Span) {
        match self.pool.int_index(value) {
            Some(idx) => self.emit(Instruction::Intc { idx }),
            None => self.errors.push(SigilError::internal(
                format!("integer constant {} missing from pool", value),
                span,
            )),
        }
    }

    fn push_bytes(&mut self, value: &[u8], span: Span) {
        match self.pool.byte_index(value) {
            Some(idx) => self.emit(Instruction::Bytec { idx }),
            None => self.errors.push(SigilError::internal(
                "byte constant missing from pool",
                span,
            )),
        }
    }

    #[inline]
    fn emit(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }
}

/// Extracts the literal value of a `const` initializer, if it is one.
fn literal_value(expr: &Expr) -> Option<ConstValue> {
    match expr {
        Expr::Int { value, .. } => Some(ConstValue::Int(*value)),
        Expr::Bytes { value, .. } => Some(ConstValue::Bytes(value.clone())),
        _ => None,
    }
}
