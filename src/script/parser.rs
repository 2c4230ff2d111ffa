//! Recursive-descent parser producing the statement list for one script.

use std::rc::Rc;

use crate::script::ast::{
    BinaryOp, DeclKind, Expr, ForInit, FunctionBody, FunctionDef, LogicalOp, Stmt,
    TemplateSegment, UnaryOp,
};
use crate::script::error::ScriptError;
use crate::script::lexer::{tokenize, TemplatePart, Token, TokenKind};

/// Bound on the depth of the syntax tree. Bracket nesting, nested
/// statements and the links of operator chains all count against it.
const MAX_NESTING: usize = 256;

/// Words that can never start an expression.
const RESERVED: &[&str] = &[
    "var", "let", "const", "function", "if", "else", "while", "do", "for", "return", "break",
    "continue", "new", "class", "switch", "case", "default", "try", "catch", "finally", "throw",
    "import", "export", "delete", "void", "instanceof", "in", "yield", "await", "this", "super",
];

pub fn parse_program(source: &str) -> Result<Vec<Stmt>, ScriptError> {
    let mut parser = Parser::new(tokenize(source)?);
    let mut program = Vec::new();
    while !parser.at_eof() {
        program.push(parser.statement()?);
    }
    Ok(program)
}

fn parse_standalone_expression(source: &str, depth: usize) -> Result<Expr, ScriptError> {
    let mut parser = Parser::new(tokenize(source)?);
    parser.depth = depth;
    let expr = parser.expression()?;
    if !parser.at_eof() {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // --- Token helpers ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.peek().is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, name: &str) -> bool {
        if self.peek().is_ident(name) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), ScriptError> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ScriptError {
        let token = self.peek();
        match &token.kind {
            TokenKind::Eof => ScriptError::unexpected_end(),
            TokenKind::Ident(name) if !RESERVED.contains(&name.as_str()) => {
                ScriptError::syntax(format!("Unexpected identifier '{}'", name))
            }
            TokenKind::Number(_) => ScriptError::syntax("Unexpected number"),
            TokenKind::Str(_) => ScriptError::syntax("Unexpected string"),
            TokenKind::Template(_) => ScriptError::syntax("Unexpected template string"),
            _ => ScriptError::unexpected_token(&token.describe()),
        }
    }

    fn binding_name(&mut self) -> Result<String, ScriptError> {
        match &self.peek().kind {
            TokenKind::Ident(name) if !RESERVED.contains(&name.as_str()) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn enter(&mut self) -> Result<(), ScriptError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ScriptError::range("Maximum nesting depth exceeded"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Releases the levels taken by the links of an operator chain.
    fn leave_chain(&mut self, links: usize) {
        self.depth -= links;
    }

    /// Automatic semicolon insertion: a statement may also end at a line
    /// break, a closing brace or the end of input.
    fn consume_semicolon(&mut self) -> Result<(), ScriptError> {
        if self.eat_punct(";") {
            return Ok(());
        }
        let next = self.peek();
        if next.is_punct("}") || next.newline_before || matches!(next.kind, TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    // --- Statements ---

    fn statement(&mut self) -> Result<Stmt, ScriptError> {
        self.enter()?;
        let stmt = self.statement_inner();
        self.leave();
        stmt
    }

    fn statement_inner(&mut self) -> Result<Stmt, ScriptError> {
        if self.eat_punct(";") {
            return Ok(Stmt::Empty);
        }
        if self.peek().is_punct("{") {
            return Ok(Stmt::Block(self.block()?));
        }

        let keyword = match &self.peek().kind {
            TokenKind::Ident(name) => name.clone(),
            _ => String::new(),
        };

        match keyword.as_str() {
            "var" | "let" | "const" => {
                let kind = self.decl_kind();
                let declarators = self.declarators(kind)?;
                self.consume_semicolon()?;
                Ok(Stmt::Decl(kind, declarators))
            }
            "function" if matches!(self.peek_at(1).kind, TokenKind::Ident(_)) => {
                self.advance();
                let name = self.binding_name()?;
                let def = self.function_rest(Some(name))?;
                Ok(Stmt::Function(def))
            }
            "if" => {
                self.advance();
                self.expect_punct("(")?;
                let test = self.expression()?;
                self.expect_punct(")")?;
                let consequent = Box::new(self.statement()?);
                let alternate = if self.eat_ident("else") {
                    Some(Box::new(self.statement()?))
                } else {
                    None
                };
                Ok(Stmt::If(test, consequent, alternate))
            }
            "while" => {
                self.advance();
                self.expect_punct("(")?;
                let test = self.expression()?;
                self.expect_punct(")")?;
                Ok(Stmt::While(test, Box::new(self.statement()?)))
            }
            "do" => {
                self.advance();
                let body = Box::new(self.statement()?);
                if !self.eat_ident("while") {
                    return Err(self.unexpected());
                }
                self.expect_punct("(")?;
                let test = self.expression()?;
                self.expect_punct(")")?;
                self.eat_punct(";");
                Ok(Stmt::DoWhile(body, test))
            }
            "for" => {
                self.advance();
                self.for_statement()
            }
            "return" => {
                self.advance();
                let next = self.peek();
                let value = if next.is_punct(";")
                    || next.is_punct("}")
                    || next.newline_before
                    || matches!(next.kind, TokenKind::Eof)
                {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.consume_semicolon()?;
                Ok(Stmt::Return(value))
            }
            "break" => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Stmt::Break)
            }
            "continue" => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Stmt::Continue)
            }
            _ => {
                let expr = self.expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.peek().is_punct("}") {
            if self.at_eof() {
                return Err(ScriptError::unexpected_end());
            }
            body.push(self.statement()?);
        }
        self.advance();
        Ok(body)
    }

    fn decl_kind(&mut self) -> DeclKind {
        match self.advance().kind {
            TokenKind::Ident(ref k) if k == "let" => DeclKind::Let,
            TokenKind::Ident(ref k) if k == "const" => DeclKind::Const,
            _ => DeclKind::Var,
        }
    }

    fn declarators(&mut self, kind: DeclKind) -> Result<Vec<(String, Option<Expr>)>, ScriptError> {
        let mut declarators = Vec::new();
        loop {
            let name = self.binding_name()?;
            let init = if self.eat_punct("=") {
                Some(self.assignment()?)
            } else if kind == DeclKind::Const {
                return Err(ScriptError::syntax("Missing initializer in const declaration"));
            } else {
                None
            };
            declarators.push((name, init));
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(declarators)
    }

    fn for_statement(&mut self) -> Result<Stmt, ScriptError> {
        self.expect_punct("(")?;

        let mut init = None;
        if !self.peek().is_punct(";") {
            let decl = if matches!(&self.peek().kind, TokenKind::Ident(k) if k == "var" || k == "let" || k == "const")
            {
                Some(self.decl_kind())
            } else {
                None
            };

            let is_each = matches!(self.peek().kind, TokenKind::Ident(_))
                && (self.peek_at(1).is_ident("of") || self.peek_at(1).is_ident("in"));
            if is_each {
                let name = self.binding_name()?;
                let of = self.advance().kind == TokenKind::Ident("of".to_string());
                let iterable = self.expression()?;
                self.expect_punct(")")?;
                let body = Box::new(self.statement()?);
                return Ok(Stmt::ForEach {
                    decl,
                    name,
                    of,
                    iterable,
                    body,
                });
            }

            init = Some(match decl {
                Some(kind) => ForInit::Decl(kind, self.declarators(kind)?),
                None => ForInit::Expr(self.expression()?),
            });
        }
        self.expect_punct(";")?;

        let test = if self.peek().is_punct(";") {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(";")?;

        let update = if self.peek().is_punct(")") {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(")")?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::For {
            init,
            test,
            update,
            body,
        })
    }

    /// Parameter list and body after `function name`.
    fn function_rest(&mut self, name: Option<String>) -> Result<Rc<FunctionDef>, ScriptError> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.eat_punct(")") {
            params.push(self.binding_name()?);
            if !self.eat_punct(",") {
                self.expect_punct(")")?;
                break;
            }
        }
        let body = FunctionBody::Block(self.block()?);
        Ok(Rc::new(FunctionDef { name, params, body }))
    }

    // --- Expressions ---

    fn expression(&mut self) -> Result<Expr, ScriptError> {
        self.enter()?;
        let expr = self.assignment();
        self.leave();
        expr
    }

    /// True when the tokens at the cursor form an arrow function head.
    fn at_arrow(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Ident(name) if !RESERVED.contains(&name.as_str()) => {
                self.peek_at(1).is_punct("=>")
            }
            TokenKind::Punct("(") => {
                let mut depth = 0usize;
                let mut offset = 0;
                loop {
                    let token = self.peek_at(offset);
                    match token.kind {
                        TokenKind::Eof => return false,
                        TokenKind::Punct("(") | TokenKind::Punct("[") | TokenKind::Punct("{") => {
                            depth += 1
                        }
                        TokenKind::Punct(")") | TokenKind::Punct("]") | TokenKind::Punct("}") => {
                            depth -= 1;
                            if depth == 0 {
                                return self.peek_at(offset + 1).is_punct("=>");
                            }
                        }
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => false,
        }
    }

    fn arrow_function(&mut self) -> Result<Expr, ScriptError> {
        let mut params = Vec::new();
        if self.eat_punct("(") {
            while !self.eat_punct(")") {
                params.push(self.binding_name()?);
                if !self.eat_punct(",") {
                    self.expect_punct(")")?;
                    break;
                }
            }
        } else {
            params.push(self.binding_name()?);
        }
        self.expect_punct("=>")?;

        let body = if self.peek().is_punct("{") {
            FunctionBody::Block(self.block()?)
        } else {
            self.enter()?;
            let body = self.assignment();
            self.leave();
            FunctionBody::Expr(body?)
        };
        Ok(Expr::Function(Rc::new(FunctionDef {
            name: None,
            params,
            body,
        })))
    }

    fn assignment(&mut self) -> Result<Expr, ScriptError> {
        if self.at_arrow() {
            return self.arrow_function();
        }

        let target = self.conditional()?;

        let op = match self.peek().kind {
            TokenKind::Punct("=") => None,
            TokenKind::Punct("+=") => Some(BinaryOp::Add),
            TokenKind::Punct("-=") => Some(BinaryOp::Sub),
            TokenKind::Punct("*=") => Some(BinaryOp::Mul),
            TokenKind::Punct("/=") => Some(BinaryOp::Div),
            TokenKind::Punct("%=") => Some(BinaryOp::Rem),
            TokenKind::Punct("**=") => Some(BinaryOp::Pow),
            _ => return Ok(target),
        };
        if !matches!(target, Expr::Ident(_) | Expr::Member(..) | Expr::Index(..)) {
            return Err(ScriptError::syntax("Invalid left-hand side in assignment"));
        }
        self.advance();
        self.enter()?;
        let value = self.assignment();
        self.leave();
        Ok(Expr::Assign(op, Box::new(target), Box::new(value?)))
    }

    fn conditional(&mut self) -> Result<Expr, ScriptError> {
        let test = self.logical_or()?;
        if !self.eat_punct("?") {
            return Ok(test);
        }
        self.enter()?;
        let branches = self.conditional_branches();
        self.leave();
        let (consequent, alternate) = branches?;
        Ok(Expr::Conditional(
            Box::new(test),
            Box::new(consequent),
            Box::new(alternate),
        ))
    }

    fn conditional_branches(&mut self) -> Result<(Expr, Expr), ScriptError> {
        let consequent = self.assignment()?;
        self.expect_punct(":")?;
        let alternate = self.assignment()?;
        Ok((consequent, alternate))
    }

    fn logical_or(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.logical_and()?;
        let mut links = 0;
        loop {
            let op = if self.eat_punct("||") {
                LogicalOp::Or
            } else if self.eat_punct("??") {
                LogicalOp::Nullish
            } else {
                self.leave_chain(links);
                return Ok(left);
            };
            self.enter()?;
            links += 1;
            let right = self.logical_and()?;
            left = Expr::Logical(op, Box::new(left), Box::new(right));
        }
    }

    fn logical_and(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.equality()?;
        let mut links = 0;
        while self.eat_punct("&&") {
            self.enter()?;
            links += 1;
            let right = self.equality()?;
            left = Expr::Logical(LogicalOp::And, Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn binary_level(
        &mut self,
        ops: &[(&str, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ScriptError>,
    ) -> Result<Expr, ScriptError> {
        let mut left = next(self)?;
        let mut links = 0;
        'outer: loop {
            for (punct, op) in ops {
                if self.eat_punct(punct) {
                    self.enter()?;
                    links += 1;
                    let right = next(self)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'outer;
                }
            }
            self.leave_chain(links);
            return Ok(left);
        }
    }

    fn equality(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[
                ("===", BinaryOp::StrictEq),
                ("!==", BinaryOp::StrictNotEq),
                ("==", BinaryOp::Eq),
                ("!=", BinaryOp::NotEq),
            ],
            Self::relational,
        )
    }

    fn relational(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[
                ("<=", BinaryOp::LtEq),
                (">=", BinaryOp::GtEq),
                ("<", BinaryOp::Lt),
                (">", BinaryOp::Gt),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[
                ("*", BinaryOp::Mul),
                ("/", BinaryOp::Div),
                ("%", BinaryOp::Rem),
            ],
            Self::exponent,
        )
    }

    fn exponent(&mut self) -> Result<Expr, ScriptError> {
        let base = self.unary()?;
        if self.eat_punct("**") {
            self.enter()?;
            let power = self.exponent();
            self.leave();
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(power?)));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Expr, ScriptError> {
        let op = match &self.peek().kind {
            TokenKind::Punct("!") => Some(UnaryOp::Not),
            TokenKind::Punct("-") => Some(UnaryOp::Neg),
            TokenKind::Punct("+") => Some(UnaryOp::Plus),
            TokenKind::Ident(k) if k == "typeof" => Some(UnaryOp::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            self.enter()?;
            let operand = self.unary();
            self.leave();
            return Ok(Expr::Unary(op, Box::new(operand?)));
        }

        if self.peek().is_punct("++") || self.peek().is_punct("--") {
            let increment = self.advance().is_punct("++");
            self.enter()?;
            let target = self.unary();
            self.leave();
            return self.update(increment, true, target?);
        }

        let expr = self.call_member()?;
        let next = self.peek();
        if !next.newline_before && (next.is_punct("++") || next.is_punct("--")) {
            let increment = self.advance().is_punct("++");
            return self.update(increment, false, expr);
        }
        Ok(expr)
    }

    fn update(&self, increment: bool, prefix: bool, target: Expr) -> Result<Expr, ScriptError> {
        if !matches!(target, Expr::Ident(_) | Expr::Member(..) | Expr::Index(..)) {
            return Err(ScriptError::syntax(
                "Invalid left-hand side expression in postfix operation",
            ));
        }
        Ok(Expr::Update {
            increment,
            prefix,
            target: Box::new(target),
        })
    }

    fn call_member(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.primary()?;
        let mut links = 0;
        loop {
            let next = self.peek();
            if !(next.is_punct(".") || next.is_punct("[") || next.is_punct("(")) {
                self.leave_chain(links);
                return Ok(expr);
            }
            self.enter()?;
            links += 1;

            if self.eat_punct(".") {
                let property = match &self.peek().kind {
                    TokenKind::Ident(name) => name.clone(),
                    _ => return Err(self.unexpected()),
                };
                self.advance();
                expr = Expr::Member(Box::new(expr), property);
            } else if self.eat_punct("[") {
                let index = self.expression()?;
                self.expect_punct("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                self.advance();
                let args = self.arguments()?;
                expr = Expr::Call(Box::new(expr), args);
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ScriptError> {
        let mut args = Vec::new();
        while !self.eat_punct(")") {
            args.push(self.expression()?);
            if !self.eat_punct(",") {
                self.expect_punct(")")?;
                break;
            }
        }
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::Template(parts) => {
                self.advance();
                let segments = parts
                    .into_iter()
                    .map(|part| match part {
                        TemplatePart::Text(text) => Ok(TemplateSegment::Text(text)),
                        TemplatePart::Expr(src) => {
                            parse_standalone_expression(&src, self.depth)
                                .map(TemplateSegment::Expr)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::Template(segments))
            }
            TokenKind::Ident(name) => match name.as_str() {
                "true" => {
                    self.advance();
                    Ok(Expr::Bool(true))
                }
                "false" => {
                    self.advance();
                    Ok(Expr::Bool(false))
                }
                "null" => {
                    self.advance();
                    Ok(Expr::Null)
                }
                "undefined" => {
                    self.advance();
                    Ok(Expr::Undefined)
                }
                "function" => {
                    self.advance();
                    let fn_name = match &self.peek().kind {
                        TokenKind::Ident(n) if !RESERVED.contains(&n.as_str()) => {
                            Some(self.binding_name()?)
                        }
                        _ => None,
                    };
                    Ok(Expr::Function(self.function_rest(fn_name)?))
                }
                _ if RESERVED.contains(&name.as_str()) => Err(self.unexpected()),
                _ => {
                    self.advance();
                    Ok(Expr::Ident(name))
                }
            },
            TokenKind::Punct("(") => {
                self.advance();
                let expr = self.expression()?;
                self.expect_punct(")")?;
                Ok(expr)
            }
            TokenKind::Punct("[") => {
                self.advance();
                let mut elements = Vec::new();
                while !self.eat_punct("]") {
                    elements.push(self.expression()?);
                    if !self.eat_punct(",") {
                        self.expect_punct("]")?;
                        break;
                    }
                }
                Ok(Expr::Array(elements))
            }
            TokenKind::Punct("{") => {
                self.advance();
                self.object_literal()
            }
            _ => Err(self.unexpected()),
        }
    }

    fn object_literal(&mut self) -> Result<Expr, ScriptError> {
        let mut properties = Vec::new();
        while !self.eat_punct("}") {
            let key = match &self.peek().kind {
                TokenKind::Ident(name) => name.clone(),
                TokenKind::Str(s) => s.clone(),
                TokenKind::Number(n) => crate::script::value::format_number(*n),
                _ => return Err(self.unexpected()),
            };
            self.advance();
            let value = if self.eat_punct(":") {
                self.expression()?
            } else {
                Expr::Ident(key.clone())
            };
            properties.push((key, value));
            if !self.eat_punct(",") {
                self.expect_punct("}")?;
                break;
            }
        }
        Ok(Expr::Object(properties))
    }
}
