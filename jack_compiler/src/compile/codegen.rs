use super::{
    symbol::{SymbolKind, SymbolTable},
    writer::VmWriter,
    CompileResult, LimitError, ResolutionError,
};
use crate::{
    parsing::{
        AstVisitor, BinOpKind, Class, ClassVarDec, ClassVarKind, CompilationUnit, DoStmt, Expr,
        Ident, IfStmt, LetStmt, LitValue, ReturnStmt, Statements, SubroutineCall, SubroutineDec,
        SubroutineKind, Term, UnaryOpKind, WhileStmt,
    },
    tokens::Span,
};
use hack::vm::{ArithOp, Segment};
use log::debug;
use smol_str::SmolStr;
use std::io;

/// Code generator.
///
/// Walks the tree of one compilation unit and writes stack machine
/// commands to the output. Variables are resolved through the symbol
/// table at the point of use.
pub struct CodeGen<W> {
    writer: VmWriter<W>,
    symbols: SymbolTable,
    /// Name of the class being compiled, prefix of every subroutine.
    class_name: SmolStr,
    /// Monotonic counter for control flow labels, shared by
    /// `if` and `while` statements of the unit.
    label_count: usize,
}

impl<W: io::Write> CodeGen<W> {
    #[inline]
    pub fn new(out: W) -> Self {
        Self {
            writer: VmWriter::new(out),
            symbols: SymbolTable::new(),
            class_name: SmolStr::default(),
            label_count: 0,
        }
    }

    #[inline]
    pub fn compile(&mut self, unit: &CompilationUnit) -> CompileResult<()> {
        self.comp_unit(unit)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn next_label(&mut self) -> usize {
        let n = self.label_count;
        self.label_count += 1;
        n
    }

    /// Segment and index of a variable that must exist.
    fn resolve(&self, ident: &Ident, context: &'static str) -> CompileResult<(Segment, u16)> {
        match self.symbols.lookup(&ident.name) {
            Some(symbol) => Ok((symbol.kind.segment(), symbol.index)),
            None => Err(ResolutionError {
                name: ident.name.to_string(),
                span: ident.token.span,
                context,
            }
            .into()),
        }
    }

    fn define(&mut self, name: &str, ty: &str, kind: SymbolKind, span: Span) -> CompileResult<()> {
        match self.symbols.define(name, ty, kind) {
            Some(_) => Ok(()),
            None => Err(LimitError {
                what: "variables of one kind",
                span,
            }
            .into()),
        }
    }

    fn statements(&mut self, stmts: &Statements) -> CompileResult<()> {
        for stmt in &stmts.stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_string(&mut self, text: &str, span: Span) -> CompileResult<()> {
        let units = text.encode_utf16().collect::<Vec<_>>();
        let len = u16::try_from(units.len()).map_err(|_| LimitError {
            what: "characters in string constant",
            span,
        })?;
        self.writer.write_push(Segment::Constant, len)?;
        self.writer.write_call("String.new", 1)?;
        for unit in units {
            self.writer.write_push(Segment::Constant, unit)?;
            self.writer.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    #[rustfmt::skip]
    fn emit_op(&mut self, op: BinOpKind) -> CompileResult<()> {
        match op {
            BinOpKind::Add => self.writer.write_arithmetic(ArithOp::Add)?,
            BinOpKind::Sub => self.writer.write_arithmetic(ArithOp::Sub)?,
            BinOpKind::Mul => self.writer.write_call("Math.multiply", 2)?,
            BinOpKind::Div => self.writer.write_call("Math.divide", 2)?,
            BinOpKind::And => self.writer.write_arithmetic(ArithOp::And)?,
            BinOpKind::Or  => self.writer.write_arithmetic(ArithOp::Or)?,
            BinOpKind::Lt  => self.writer.write_arithmetic(ArithOp::Lt)?,
            BinOpKind::Gt  => self.writer.write_arithmetic(ArithOp::Gt)?,
            BinOpKind::Eq  => self.writer.write_arithmetic(ArithOp::Eq)?,
        }
        Ok(())
    }

    /// Pushes the receiver when there is one, then the arguments.
    ///
    /// A bare call targets a method of the current class on `this`. A
    /// dotted call on a variable is a method call on that object, typed
    /// by the variable's declaration. Any other dotted name is taken as
    /// a class, and the call passes no receiver.
    fn emit_call(&mut self, call: &SubroutineCall) -> CompileResult<()> {
        let mut args = call.args.len();

        let name = match &call.receiver {
            None => {
                self.writer.write_push(Segment::Pointer, 0)?;
                args += 1;
                format!("{}.{}", self.class_name, call.name.name)
            }
            Some(receiver) => match self.symbols.lookup(&receiver.ident.name).cloned() {
                Some(symbol) => {
                    self.writer.write_push(symbol.kind.segment(), symbol.index)?;
                    args += 1;
                    format!("{}.{}", symbol.ty, call.name.name)
                }
                None => format!("{}.{}", receiver.ident.name, call.name.name),
            },
        };

        for arg in call.args.iter() {
            self.expr(arg)?;
        }

        let args = u16::try_from(args).map_err(|_| LimitError {
            what: "arguments",
            span: call.left_paren.span,
        })?;
        self.writer.write_call(&name, args)?;
        Ok(())
    }
}

impl<W: io::Write> AstVisitor for CodeGen<W> {
    type Output = CompileResult<()>;

    fn class(&mut self, class: &Class) -> Self::Output {
        debug!("compiling class {}", class.name.name);
        self.class_name = class.name.name.clone();

        for dec in &class.vars {
            self.class_var_dec(dec)?;
        }

        for dec in &class.subroutines {
            self.subroutine_dec(dec)?;
        }

        Ok(())
    }

    fn class_var_dec(&mut self, dec: &ClassVarDec) -> Self::Output {
        let kind = match dec.kind {
            ClassVarKind::Static => SymbolKind::Static,
            ClassVarKind::Field => SymbolKind::Field,
        };
        let ty = dec.ty.name();
        for name in dec.names.iter() {
            self.define(&name.name, &ty, kind, name.token.span)?;
        }
        Ok(())
    }

    fn subroutine_dec(&mut self, dec: &SubroutineDec) -> Self::Output {
        self.symbols.reset();

        // Methods receive their object as a hidden first argument.
        if dec.kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            self.define("this", &class_name, SymbolKind::Argument, dec.name.token.span)?;
        }

        for param in dec.params.iter() {
            let span = param.name.token.span;
            self.define(&param.name.name, &param.ty.name(), SymbolKind::Argument, span)?;
        }

        for var in &dec.body.vars {
            let ty = var.ty.name();
            for name in var.names.iter() {
                self.define(&name.name, &ty, SymbolKind::Local, name.token.span)?;
            }
        }

        let name = format!("{}.{}", self.class_name, dec.name.name);
        let locals = self.symbols.count_of(SymbolKind::Local);
        debug!("compiling subroutine {} with {} locals", name, locals);
        self.writer.write_function(&name, locals)?;

        match dec.kind {
            SubroutineKind::Constructor => {
                let fields = self.symbols.count_of(SymbolKind::Field);
                self.writer.write_push(Segment::Constant, fields)?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Function => {}
        }

        self.statements(&dec.body.stmts)
    }

    fn let_stmt(&mut self, stmt: &LetStmt) -> Self::Output {
        let (segment, index) = self.resolve(&stmt.name, "let statement")?;

        match &stmt.index {
            None => {
                self.expr(&stmt.rhs)?;
                self.writer.write_pop(segment, index)?;
            }
            Some(subscript) => {
                // Target address is computed before the right hand
                // side, which may itself move `that`.
                self.writer.write_push(segment, index)?;
                self.expr(&subscript.expr)?;
                self.writer.write_arithmetic(ArithOp::Add)?;
                self.expr(&stmt.rhs)?;
                self.writer.write_pop(Segment::Temp, 0)?;
                self.writer.write_pop(Segment::Pointer, 1)?;
                self.writer.write_push(Segment::Temp, 0)?;
                self.writer.write_pop(Segment::That, 0)?;
            }
        }

        Ok(())
    }

    fn if_stmt(&mut self, stmt: &IfStmt) -> Self::Output {
        let n = self.next_label();
        let end_label = format!("IF_END_{}", n);

        self.expr(&stmt.cond.expr)?;
        self.writer.write_arithmetic(ArithOp::Not)?;

        match &stmt.else_clause {
            None => {
                self.writer.write_if(&end_label)?;
                self.statements(&stmt.then.stmts)?;
            }
            Some(else_clause) => {
                let else_label = format!("IF_ELSE_{}", n);
                self.writer.write_if(&else_label)?;
                self.statements(&stmt.then.stmts)?;
                self.writer.write_goto(&end_label)?;
                self.writer.write_label(&else_label)?;
                self.statements(&else_clause.block.stmts)?;
            }
        }

        self.writer.write_label(&end_label)?;
        Ok(())
    }

    fn while_stmt(&mut self, stmt: &WhileStmt) -> Self::Output {
        let n = self.next_label();
        let exp_label = format!("WHILE_EXP_{}", n);
        let end_label = format!("WHILE_END_{}", n);

        self.writer.write_label(&exp_label)?;
        self.expr(&stmt.cond.expr)?;
        self.writer.write_arithmetic(ArithOp::Not)?;
        self.writer.write_if(&end_label)?;
        self.statements(&stmt.body.stmts)?;
        self.writer.write_goto(&exp_label)?;
        self.writer.write_label(&end_label)?;
        Ok(())
    }

    fn do_stmt(&mut self, stmt: &DoStmt) -> Self::Output {
        self.emit_call(&stmt.call)?;
        // Discard the return value.
        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    fn return_stmt(&mut self, stmt: &ReturnStmt) -> Self::Output {
        match &stmt.value {
            Some(expr) => self.expr(expr)?,
            None => self.writer.write_push(Segment::Constant, 0)?,
        }
        self.writer.write_return()?;
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Self::Output {
        self.term(&expr.head)?;
        for (op, term) in &expr.tail {
            self.term(term)?;
            self.emit_op(op.kind)?;
        }
        Ok(())
    }

    fn term(&mut self, term: &Term) -> Self::Output {
        match term {
            Term::Literal(literal) => match &literal.value {
                LitValue::Int(value) => self.writer.write_push(Segment::Constant, *value)?,
                LitValue::Str(text) => self.emit_string(text, literal.token.span)?,
                LitValue::True => {
                    self.writer.write_push(Segment::Constant, 0)?;
                    self.writer.write_arithmetic(ArithOp::Not)?;
                }
                LitValue::False | LitValue::Null => self.writer.write_push(Segment::Constant, 0)?,
                LitValue::This => self.writer.write_push(Segment::Pointer, 0)?,
            },
            Term::Var(ident) => {
                let (segment, index) = self.resolve(ident, "expression")?;
                self.writer.write_push(segment, index)?;
            }
            Term::Index(ident, subscript) => {
                let (segment, index) = self.resolve(ident, "array access")?;
                self.writer.write_push(segment, index)?;
                self.expr(&subscript.expr)?;
                self.writer.write_arithmetic(ArithOp::Add)?;
                self.writer.write_pop(Segment::Pointer, 1)?;
                self.writer.write_push(Segment::That, 0)?;
            }
            Term::Call(call) => self.emit_call(call)?,
            Term::Paren(paren) => self.expr(&paren.expr)?,
            Term::Unary(op, term) => {
                self.term(term)?;
                match op.kind {
                    UnaryOpKind::Neg => self.writer.write_arithmetic(ArithOp::Neg)?,
                    UnaryOpKind::Not => self.writer.write_arithmetic(ArithOp::Not)?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{compile::CompileError, compile_str};

    fn lines(source: &str) -> Vec<String> {
        compile_str(source).unwrap().lines().map(str::to_owned).collect()
    }

    #[test]
    fn test_left_to_right_evaluation() {
        let vm = lines("class Main { function int f() { return 1 + 2 * 3; } }");
        assert_eq!(
            vm,
            vec![
                "function Main.f 0",
                "push constant 1",
                "push constant 2",
                "add",
                "push constant 3",
                "call Math.multiply 2",
                "return",
            ]
        );
    }

    #[test]
    fn test_call_arity() {
        let vm = lines(
            "class Ball {
                method void move(int x) {
                    do draw();
                    do Math.abs(x);
                    return;
                }
                method void draw() { return; }
            }",
        );
        assert!(vm.contains(&"call Ball.draw 1".to_owned()));
        assert!(vm.contains(&"call Math.abs 1".to_owned()));
        // `this` is argument 0, so `x` is argument 1.
        assert!(vm.contains(&"push argument 1".to_owned()));
    }

    #[test]
    fn test_method_call_on_object() {
        let vm = lines(
            "class Main {
                function void main() {
                    var Point p;
                    let p = Point.new(1, 2);
                    do p.print();
                    return;
                }
            }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.main 1",
                "push constant 1",
                "push constant 2",
                "call Point.new 2",
                "pop local 0",
                "push local 0",
                "call Point.print 1",
                "pop temp 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn test_constructor_allocates_fields() {
        let vm = lines(
            "class Point {
                field int x, y;
                static int count;
                constructor Point new(int ax, int ay) {
                    let x = ax;
                    let y = ay;
                    let count = count + 1;
                    return this;
                }
            }",
        );
        assert_eq!(
            &vm[..6],
            &[
                "function Point.new 0",
                "push constant 2",
                "call Memory.alloc 1",
                "pop pointer 0",
                "push argument 0",
                "pop this 0",
            ]
        );
        assert!(vm.contains(&"pop static 0".to_owned()));
        assert_eq!(vm.last().map(String::as_str), Some("return"));
        assert_eq!(vm[vm.len() - 2], "push pointer 0");
    }

    #[test]
    fn test_array_store_order() {
        let vm = lines(
            "class Main {
                function void f(Array a, int i) {
                    let a[i] = a[0];
                    return;
                }
            }",
        );
        assert_eq!(
            &vm[1..14],
            &[
                "push argument 0",
                "push argument 1",
                "add",
                "push argument 0",
                "push constant 0",
                "add",
                "pop pointer 1",
                "push that 0",
                "pop temp 0",
                "pop pointer 1",
                "push temp 0",
                "pop that 0",
                "push constant 0",
            ]
        );
    }

    #[test]
    fn test_sibling_loops_use_distinct_labels() {
        let vm = lines(
            "class Main {
                function void f() {
                    var int i;
                    while (i < 3) { let i = i + 1; }
                    while (i > 0) { let i = i - 1; }
                    return;
                }
            }",
        );
        let labels = vm.iter().filter(|line| line.starts_with("label")).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec!["label WHILE_EXP_0", "label WHILE_END_0", "label WHILE_EXP_1", "label WHILE_END_1"]
        );
        assert_eq!(vm.iter().filter(|line| *line == "if-goto WHILE_END_0").count(), 1);
        assert_eq!(vm.iter().filter(|line| *line == "goto WHILE_EXP_1").count(), 1);
    }

    #[test]
    fn test_if_else_shape() {
        let vm = lines(
            "class Main {
                function int sign(int x) {
                    if (x < 0) { return -1; } else { return true; }
                }
            }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.sign 0",
                "push argument 0",
                "push constant 0",
                "lt",
                "not",
                "if-goto IF_ELSE_0",
                "push constant 1",
                "neg",
                "return",
                "goto IF_END_0",
                "label IF_ELSE_0",
                "push constant 0",
                "not",
                "return",
                "label IF_END_0",
            ]
        );
    }

    #[test]
    fn test_string_constant() {
        let vm =
            lines("class Main { function void f() { do Output.printString(\"Hi\"); return; } }");
        assert_eq!(
            &vm[1..7],
            &[
                "push constant 2",
                "call String.new 1",
                "push constant 72",
                "call String.appendChar 2",
                "push constant 105",
                "call String.appendChar 2",
            ]
        );
        assert_eq!(vm[7], "call Output.printString 1");
    }

    #[test]
    fn test_undefined_variable() {
        let err =
            compile_str("class Main {\n  function void f() {\n    let y = 1;\n    return;\n  }\n}")
                .unwrap_err();
        match err {
            CompileError::Resolution(err) => {
                assert_eq!(err.name, "y");
                assert_eq!(err.to_string(), "3:9: undefined variable 'y' in let statement");
            }
            err => panic!("expected resolution error, found {:?}", err),
        }
    }

    #[test]
    fn test_operand_limits() {
        let text = "a".repeat(u16::MAX as usize + 1);
        let source = format!(
            "class Main {{ function void f() {{ do Output.printString(\"{}\"); return; }} }}",
            text
        );
        match compile_str(&source).unwrap_err() {
            CompileError::Limit(err) => {
                assert_eq!(err.what, "characters in string constant");
                assert_eq!((err.span.line, err.span.column), (1, 56));
            }
            err => panic!("expected limit error, found {:?}", err),
        }

        // The implicit `this` pushes the count past the limit.
        let args = vec!["0"; u16::MAX as usize].join(",");
        let source = format!("class Main {{ method void f() {{ do g({}); return; }} }}", args);
        match compile_str(&source).unwrap_err() {
            CompileError::Limit(err) => assert_eq!(err.what, "arguments"),
            err => panic!("expected limit error, found {:?}", err),
        }

        let args = vec!["0"; u16::MAX as usize - 1].join(",");
        let source = format!("class Main {{ method void f() {{ do g({}); return; }} }}", args);
        assert!(compile_str(&source).unwrap().contains("call Main.g 65535\n"));
    }
}
