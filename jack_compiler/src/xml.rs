//! XML rendering of the token stream and the parse tree.
use crate::{
    parsing::{
        AstVisitor, Block, Class, ClassVarDec, Condition, Delimited, DoStmt, Expr, Ident, IfStmt,
        LetStmt, ReturnStmt, ReturnType, Statements, Subscript, SubroutineCall, SubroutineDec, Term,
        Type, WhileStmt,
    },
    tokens::{Token, TokenKind},
};
use std::fmt::{self, Write};

/// Writes the flat `<tokens>` listing. The end of source marker is
/// not listed.
pub fn write_tokens(source: &str, tokens: &[Token]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "<tokens>")?;
    for token in tokens.iter().filter(|token| token.kind != TokenKind::EOS) {
        write_terminal(&mut out, source, token)?;
    }
    writeln!(out, "</tokens>")?;
    Ok(out)
}

fn write_terminal(out: &mut String, source: &str, token: &Token) -> fmt::Result {
    let mut text = token.span.fragment(source);
    if token.kind == TokenKind::Str {
        text = &text[1..text.len() - 1];
    }
    let tag = token.kind.xml_tag();
    writeln!(out, "<{}> {} </{}>", tag, Escaped(text), tag)
}

/// Escapes the XML special characters.
struct Escaped<'a>(&'a str);

impl<'a> fmt::Display for Escaped<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '&' => f.write_str("&amp;")?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Writes the parse tree, one element per grammar rule with the
/// terminal tokens as leaves.
pub struct XmlWriter<'a> {
    source: &'a str,
    out: String,
    depth: usize,
}

impl<'a> XmlWriter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            out: String::new(),
            depth: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.out
    }

    fn indent(&mut self) -> fmt::Result {
        for _ in 0..self.depth {
            self.out.write_str("  ")?;
        }
        Ok(())
    }

    fn open(&mut self, tag: &str) -> fmt::Result {
        self.indent()?;
        writeln!(self.out, "<{}>", tag)?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, tag: &str) -> fmt::Result {
        self.depth -= 1;
        self.indent()?;
        writeln!(self.out, "</{}>", tag)
    }

    fn token(&mut self, token: &Token) -> fmt::Result {
        self.indent()?;
        write_terminal(&mut self.out, self.source, token)
    }

    #[inline]
    fn ident(&mut self, ident: &Ident) -> fmt::Result {
        self.token(&ident.token)
    }

    fn ty(&mut self, ty: &Type) -> fmt::Result {
        match ty {
            Type::Int(token) | Type::Char(token) | Type::Boolean(token) => self.token(token),
            Type::Class(ident) => self.ident(ident),
        }
    }

    fn names(&mut self, names: &Delimited<Ident>) -> fmt::Result {
        for item in &names.items {
            self.ident(&item.item)?;
            if let Some(comma) = &item.delim {
                self.token(comma)?;
            }
        }
        Ok(())
    }

    fn statements(&mut self, stmts: &Statements) -> fmt::Result {
        self.open("statements")?;
        for stmt in &stmts.stmts {
            self.stmt(stmt)?;
        }
        self.close("statements")
    }

    fn block(&mut self, block: &Block) -> fmt::Result {
        self.token(&block.left_brace)?;
        self.statements(&block.stmts)?;
        self.token(&block.right_brace)
    }

    fn condition(&mut self, cond: &Condition) -> fmt::Result {
        self.token(&cond.left_paren)?;
        self.expr(&cond.expr)?;
        self.token(&cond.right_paren)
    }

    fn subscript(&mut self, subscript: &Subscript) -> fmt::Result {
        self.token(&subscript.left_bracket)?;
        self.expr(&subscript.expr)?;
        self.token(&subscript.right_bracket)
    }

    /// Calls have no element of their own.
    fn call(&mut self, call: &SubroutineCall) -> fmt::Result {
        if let Some(receiver) = &call.receiver {
            self.ident(&receiver.ident)?;
            self.token(&receiver.dot)?;
        }
        self.ident(&call.name)?;
        self.token(&call.left_paren)?;
        self.open("expressionList")?;
        for item in &call.args.items {
            self.expr(&item.item)?;
            if let Some(comma) = &item.delim {
                self.token(comma)?;
            }
        }
        self.close("expressionList")?;
        self.token(&call.right_paren)
    }
}

impl<'a> AstVisitor for XmlWriter<'a> {
    type Output = fmt::Result;

    fn class(&mut self, class: &Class) -> Self::Output {
        self.open("class")?;
        self.token(&class.keyword)?;
        self.ident(&class.name)?;
        self.token(&class.left_brace)?;
        for dec in &class.vars {
            self.class_var_dec(dec)?;
        }
        for dec in &class.subroutines {
            self.subroutine_dec(dec)?;
        }
        self.token(&class.right_brace)?;
        self.close("class")
    }

    fn class_var_dec(&mut self, dec: &ClassVarDec) -> Self::Output {
        self.open("classVarDec")?;
        self.token(&dec.keyword)?;
        self.ty(&dec.ty)?;
        self.names(&dec.names)?;
        self.token(&dec.semicolon)?;
        self.close("classVarDec")
    }

    fn subroutine_dec(&mut self, dec: &SubroutineDec) -> Self::Output {
        self.open("subroutineDec")?;
        self.token(&dec.keyword)?;
        match &dec.ret {
            ReturnType::Void(token) => self.token(token)?,
            ReturnType::Type(ty) => self.ty(ty)?,
        }
        self.ident(&dec.name)?;
        self.token(&dec.left_paren)?;

        self.open("parameterList")?;
        for item in &dec.params.items {
            self.ty(&item.item.ty)?;
            self.ident(&item.item.name)?;
            if let Some(comma) = &item.delim {
                self.token(comma)?;
            }
        }
        self.close("parameterList")?;
        self.token(&dec.right_paren)?;

        let body = &dec.body;
        self.open("subroutineBody")?;
        self.token(&body.left_brace)?;
        for var in &body.vars {
            self.open("varDec")?;
            self.token(&var.keyword)?;
            self.ty(&var.ty)?;
            self.names(&var.names)?;
            self.token(&var.semicolon)?;
            self.close("varDec")?;
        }
        self.statements(&body.stmts)?;
        self.token(&body.right_brace)?;
        self.close("subroutineBody")?;

        self.close("subroutineDec")
    }

    fn let_stmt(&mut self, stmt: &LetStmt) -> Self::Output {
        self.open("letStatement")?;
        self.token(&stmt.keyword)?;
        self.ident(&stmt.name)?;
        if let Some(subscript) = &stmt.index {
            self.subscript(subscript)?;
        }
        self.token(&stmt.eq)?;
        self.expr(&stmt.rhs)?;
        self.token(&stmt.semicolon)?;
        self.close("letStatement")
    }

    fn if_stmt(&mut self, stmt: &IfStmt) -> Self::Output {
        self.open("ifStatement")?;
        self.token(&stmt.keyword)?;
        self.condition(&stmt.cond)?;
        self.block(&stmt.then)?;
        if let Some(else_clause) = &stmt.else_clause {
            self.token(&else_clause.keyword)?;
            self.block(&else_clause.block)?;
        }
        self.close("ifStatement")
    }

    fn while_stmt(&mut self, stmt: &WhileStmt) -> Self::Output {
        self.open("whileStatement")?;
        self.token(&stmt.keyword)?;
        self.condition(&stmt.cond)?;
        self.block(&stmt.body)?;
        self.close("whileStatement")
    }

    fn do_stmt(&mut self, stmt: &DoStmt) -> Self::Output {
        self.open("doStatement")?;
        self.token(&stmt.keyword)?;
        self.call(&stmt.call)?;
        self.token(&stmt.semicolon)?;
        self.close("doStatement")
    }

    fn return_stmt(&mut self, stmt: &ReturnStmt) -> Self::Output {
        self.open("returnStatement")?;
        self.token(&stmt.keyword)?;
        if let Some(expr) = &stmt.value {
            self.expr(expr)?;
        }
        self.token(&stmt.semicolon)?;
        self.close("returnStatement")
    }

    fn expr(&mut self, expr: &Expr) -> Self::Output {
        self.open("expression")?;
        self.term(&expr.head)?;
        for (op, term) in &expr.tail {
            self.token(&op.token)?;
            self.term(term)?;
        }
        self.close("expression")
    }

    fn term(&mut self, term: &Term) -> Self::Output {
        self.open("term")?;
        match term {
            Term::Literal(literal) => self.token(&literal.token)?,
            Term::Var(ident) => self.ident(ident)?,
            Term::Index(ident, subscript) => {
                self.ident(ident)?;
                self.subscript(subscript)?;
            }
            Term::Call(call) => self.call(call)?,
            Term::Paren(paren) => {
                self.token(&paren.left_paren)?;
                self.expr(&paren.expr)?;
                self.token(&paren.right_paren)?;
            }
            Term::Unary(op, term) => {
                self.token(&op.token)?;
                self.term(term)?;
            }
        }
        self.close("term")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokenize;

    #[test]
    fn test_token_listing() {
        let source = "if (x < \"a&b\") { }";
        let tokens = tokenize(source).unwrap();
        let xml = write_tokens(source, &tokens).unwrap();
        assert_eq!(
            xml,
            "<tokens>\n\
             <keyword> if </keyword>\n\
             <symbol> ( </symbol>\n\
             <identifier> x </identifier>\n\
             <symbol> &lt; </symbol>\n\
             <stringConstant> a&amp;b </stringConstant>\n\
             <symbol> ) </symbol>\n\
             <symbol> { </symbol>\n\
             <symbol> } </symbol>\n\
             </tokens>\n"
        );
    }

    #[test]
    fn test_escaping() {
        assert_eq!(Escaped("a<b>\"c\"&d").to_string(), "a&lt;b&gt;&quot;c&quot;&amp;d");
    }
}
