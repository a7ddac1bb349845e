//! Recursive-descent parser producing an arena-allocated AST.
//!
//! Binding strength, loosest first: `or`, `and`, comparisons, `..`, `+ -`,
//! `* / // %`, `**` (right associative), prefix operators, postfix chains.
//! `if`, `while`, `for` and `match` are expressions and may appear anywhere
//! an operand can.

use std::borrow::Cow;

use bumpalo::Bump;
use tracing::trace;

use crate::lexer::{Lexer, SourceLoc, Span, Token, TokenKind};
use crate::parser::error::{ParseError, ParseErrorKind};
use crate::parser::parsed_expr::{Expr, ExternDecl, Item, ItemKind, Literal};
use crate::parser::{BinaryOp, StepOp};

/// Parser limits.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum expression nesting depth.
    ///
    /// Default: 500
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 500 }
    }
}

/// A fully parsed source buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Program<'a> {
    pub items: &'a [Item<'a>],
}

/// Parse a whole buffer. Any error fails the parse and all errors are returned.
pub fn parse<'a>(arena: &'a Bump, source: &'a str) -> Result<Program<'a>, Vec<ParseError>> {
    parse_with_options(arena, source, ParseOptions::default())
}

pub fn parse_with_options<'a>(
    arena: &'a Bump,
    source: &'a str,
    options: ParseOptions,
) -> Result<Program<'a>, Vec<ParseError>> {
    let mut parser = Parser::new(arena, source, options);
    let mut items = Vec::new();
    let mut errors = Vec::new();
    while let Some(item) = parser.next_item() {
        match item {
            Ok(item) => items.push(item),
            Err(errs) => errors.extend(errs),
        }
    }
    if errors.is_empty() {
        Ok(Program {
            items: arena.alloc_slice_clone(&items),
        })
    } else {
        Err(errors)
    }
}

pub struct Parser<'a> {
    arena: &'a Bump,
    lexer: Lexer<'a>,
    current: Token<'a>,
    previous_end: usize,
    options: ParseOptions,
    depth: usize,
    /// Set once the depth limit is hit; the parser then behaves as if at end of input.
    aborted: bool,
    /// Lexical errors not yet attributed to an item.
    pending: Vec<ParseError>,
    /// Syntax errors of the item being parsed. Only the first is kept.
    errors: Vec<ParseError>,
    no_struct_literal: bool,
}

fn eof_token<'a>(at: usize, loc: SourceLoc) -> Token<'a> {
    Token {
        kind: TokenKind::Eof,
        text: "",
        loc,
        span: Span::new(at, at),
    }
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, source: &'a str, options: ParseOptions) -> Self {
        Self::with_lexer(arena, Lexer::new(source), options)
    }

    fn with_lexer(arena: &'a Bump, lexer: Lexer<'a>, options: ParseOptions) -> Self {
        let mut parser = Self {
            arena,
            lexer,
            current: eof_token(0, SourceLoc::START),
            previous_end: 0,
            options,
            depth: 0,
            aborted: false,
            pending: Vec::new(),
            errors: Vec::new(),
            no_struct_literal: false,
        };
        parser.advance();
        parser.previous_end = 0;
        parser
    }

    // ---------------------------------------------------------------------
    // Token plumbing
    // ---------------------------------------------------------------------

    /// Consume the current token and return it. Lexical error tokens are
    /// recorded and skipped so the grammar never sees them.
    fn advance(&mut self) -> Token<'a> {
        if self.aborted {
            return self.current.clone();
        }
        loop {
            let token = self.lexer.next_token();
            if let TokenKind::Error(err) = &token.kind {
                self.pending.push(ParseError::new(
                    ParseErrorKind::Lex(err.clone()),
                    token.loc,
                    token.span.clone(),
                ));
                continue;
            }
            let previous = std::mem::replace(&mut self.current, token);
            self.previous_end = previous.span.0.end;
            return previous;
        }
    }

    fn check(&self, kind: &TokenKind<'a>) -> bool {
        self.current.kind == *kind
    }

    fn eat(&mut self, kind: &TokenKind<'a>) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind<'a>, expected: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.unexpected(expected);
        false
    }

    /// Like `expect`, but end of input is reported as an unclosed `open`.
    fn expect_closing(&mut self, kind: &TokenKind<'a>, open: char) -> bool {
        if self.eat(kind) {
            return true;
        }
        if self.check(&TokenKind::Eof) {
            self.error(ParseErrorKind::UnclosedDelimiter { delimiter: open });
        } else {
            let close = match open {
                '(' => "')'",
                '[' => "']'",
                _ => "'}'",
            };
            self.unexpected(close);
        }
        false
    }

    fn expect_ident(&mut self, expected: &str) -> Option<&'a str> {
        if let TokenKind::Ident(name) = self.current.kind {
            self.advance();
            Some(name)
        } else {
            self.unexpected(expected);
            None
        }
    }

    fn unexpected(&mut self, expected: &str) {
        let found = self.current.kind.describe();
        self.error(ParseErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            found,
        });
    }

    fn error(&mut self, kind: ParseErrorKind) {
        let (loc, span) = (self.current.loc, self.current.span.clone());
        self.error_at(kind, loc, span);
    }

    fn error_at(&mut self, kind: ParseErrorKind, loc: SourceLoc, span: Span) {
        // Later errors in the same item are almost always cascades of the first.
        if self.errors.is_empty() {
            self.errors.push(ParseError::new(kind, loc, span));
        }
    }

    fn alloc(&self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.arena.alloc(expr)
    }

    fn alloc_text(&self, text: Cow<'a, str>) -> &'a str {
        match text {
            Cow::Borrowed(s) => s,
            Cow::Owned(s) => self.arena.alloc_str(&s),
        }
    }

    fn placeholder(&self) -> &'a Expr<'a> {
        self.alloc(Expr::NullPtr)
    }

    fn enter(&mut self) -> bool {
        if self.depth >= self.options.max_depth {
            if !self.aborted {
                let max_depth = self.options.max_depth;
                self.error(ParseErrorKind::MaxDepthExceeded { max_depth });
                let at = self.current.span.0.start;
                self.current = eof_token(at, self.current.loc);
                self.aborted = true;
            }
            return false;
        }
        self.depth += 1;
        true
    }

    fn with_struct_literals<T>(&mut self, allowed: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.no_struct_literal, !allowed);
        let result = f(self);
        self.no_struct_literal = saved;
        result
    }

    // ---------------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------------

    /// Parse the next top-level item.
    ///
    /// Returns `None` at end of input. A malformed item yields its errors and
    /// the parser resumes after the next `;`.
    pub fn next_item(&mut self) -> Option<Result<Item<'a>, Vec<ParseError>>> {
        while self.check(&TokenKind::Semi) {
            self.advance();
        }
        if self.check(&TokenKind::Eof) {
            if self.pending.is_empty() {
                return None;
            }
            return Some(Err(std::mem::take(&mut self.pending)));
        }

        let loc = self.current.loc;
        let start = self.current.span.0.start;
        self.depth = 0;
        self.no_struct_literal = false;

        let kind = self.parse_item_kind();
        let ended_with_semi = self.eat(&TokenKind::Semi);

        let failed = !self.errors.is_empty()
            || self
                .pending
                .iter()
                .any(|err| err.span.0.start < self.previous_end);
        if failed && !ended_with_semi {
            while !self.check(&TokenKind::Semi) && !self.check(&TokenKind::Eof) {
                self.advance();
            }
            self.eat(&TokenKind::Semi);
        }

        let end = self.previous_end;
        let mut errors = std::mem::take(&mut self.errors);
        let (mine, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|err| err.span.0.start < end);
        self.pending = later;
        errors.extend(mine);

        if errors.is_empty() {
            trace!(line = loc.line, "parsed item");
            Some(Ok(Item {
                kind,
                loc,
                span: Span::new(start, end),
            }))
        } else {
            errors.sort_by_key(|err| err.span.0.start);
            Some(Err(errors))
        }
    }

    fn parse_item_kind(&mut self) -> ItemKind<'a> {
        match self.current.kind {
            TokenKind::Import => {
                self.advance();
                ItemKind::Import(self.parse_string_operand("import"))
            }
            TokenKind::Link => {
                self.advance();
                ItemKind::Link(self.parse_string_operand("link"))
            }
            TokenKind::Extern => ItemKind::Extern(self.parse_extern()),
            TokenKind::At => {
                self.error(ParseErrorKind::MisplacedDefinition {
                    message: "decorators are not supported".to_string(),
                });
                self.advance();
                ItemKind::Statement(self.placeholder())
            }
            TokenKind::Const => {
                self.advance();
                ItemKind::Statement(self.parse_statement(true, true))
            }
            _ => ItemKind::Statement(self.parse_statement(true, false)),
        }
    }

    fn parse_string_operand(&mut self, keyword: &str) -> &'a str {
        if let TokenKind::Str(_) = self.current.kind {
            let token = self.advance();
            if let TokenKind::Str(text) = token.kind {
                return self.alloc_text(text);
            }
        }
        self.unexpected(&format!("string after '{}'", keyword));
        ""
    }

    /// `extern name = symbol(type, ...): type`
    fn parse_extern(&mut self) -> ExternDecl<'a> {
        self.advance();
        let mut decl = ExternDecl {
            name: "",
            symbol: "",
            params: &[],
            ret: "void",
        };
        let Some(name) = self.expect_ident("extern function name") else {
            return decl;
        };
        decl.name = name;
        if !self.expect(&TokenKind::Assign, "'=' after extern function name") {
            return decl;
        }
        let Some(symbol) = self.expect_ident("native symbol name") else {
            return decl;
        };
        decl.symbol = symbol;
        if !self.expect(&TokenKind::LParen, "'(' for parameter types") {
            return decl;
        }

        let mut params = Vec::new();
        while let Some(ty) = self.type_name() {
            params.push(ty);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        decl.params = self.arena.alloc_slice_copy(&params);

        if !self.expect_closing(&TokenKind::RParen, '(') {
            return decl;
        }
        if !self.expect(&TokenKind::Colon, "':' before return type") {
            return decl;
        }
        match self.type_name() {
            Some(ret) => decl.ret = ret,
            None => self.unexpected("return type"),
        }
        decl
    }

    fn type_name(&mut self) -> Option<&'a str> {
        match self.current.kind {
            TokenKind::Ident(_) | TokenKind::Ptr => Some(self.advance().text),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn parse_statement(&mut self, top_level: bool, is_const: bool) -> &'a Expr<'a> {
        match self.current.kind {
            TokenKind::Ptr => return self.parse_ptr_decl(is_const),
            TokenKind::Struct => return self.parse_struct_def(),
            _ => {}
        }

        let start_loc = self.current.loc;
        let start_span = self.current.span.clone();

        let first = self.parse_expr();
        let mut targets = vec![first];
        while self.eat(&TokenKind::Comma) {
            targets.push(self.parse_expr());
        }

        if self.eat(&TokenKind::Assign) {
            if targets.len() == 1 {
                if let Some((name, params, is_variadic)) = self.function_signature(first) {
                    if !top_level {
                        let span = Span::combine(&start_span, &self.current.span);
                        self.error_at(
                            ParseErrorKind::MisplacedDefinition {
                                message: "function definitions are only allowed at top level"
                                    .to_string(),
                            },
                            start_loc,
                            span,
                        );
                    }
                    let body = self.parse_expr();
                    let lambda = self.alloc(Expr::Lambda {
                        params,
                        is_variadic,
                        body,
                    });
                    return self.alloc(Expr::Assign {
                        name,
                        value: lambda,
                        is_const,
                    });
                }
            }
            let value = self.parse_expr_list();
            return self.build_assignment(&targets, value, is_const, start_loc, start_span);
        }

        if let Some(op) = self.compound_op() {
            self.advance();
            let rhs = self.parse_expr();
            if targets.len() != 1 {
                self.invalid_target(start_loc, start_span);
                return first;
            }
            let value = self.alloc(Expr::Binary {
                op,
                left: first,
                right: rhs,
            });
            return match *first {
                Expr::Ident(name) => self.alloc(Expr::Assign {
                    name,
                    value,
                    is_const: false,
                }),
                Expr::Member { value: object, field } => self.alloc(Expr::MemberAssign {
                    object,
                    field,
                    value,
                }),
                _ => {
                    self.invalid_target(start_loc, start_span);
                    first
                }
            };
        }

        if targets.len() == 1 {
            first
        } else {
            let items = self.arena.alloc_slice_copy(&targets);
            self.alloc(Expr::Tuple(items))
        }
    }

    fn compound_op(&self) -> Option<BinaryOp> {
        match self.current.kind {
            TokenKind::PlusAssign => Some(BinaryOp::Add),
            TokenKind::MinusAssign => Some(BinaryOp::Sub),
            TokenKind::StarAssign => Some(BinaryOp::Mul),
            TokenKind::SlashAssign => Some(BinaryOp::Div),
            TokenKind::FloorDivAssign => Some(BinaryOp::FloorDiv),
            TokenKind::PercentAssign => Some(BinaryOp::Mod),
            _ => None,
        }
    }

    /// `name(a, b)` on the left of `=` is a function definition.
    fn function_signature(&mut self, target: &'a Expr<'a>) -> Option<(&'a str, &'a [&'a str], bool)> {
        let Expr::Call { callee, args } = *target else {
            return None;
        };
        let name = callee.as_ident()?;
        let mut names = Vec::with_capacity(args.len());
        for arg in args {
            names.push(arg.as_ident()?);
        }
        let (params, is_variadic) = self.finish_params(&names);
        Some((name, params, is_variadic))
    }

    /// Strip the variadic sentinel from the last parameter and reject it elsewhere.
    fn finish_params(&mut self, names: &[&'a str]) -> (&'a [&'a str], bool) {
        let mut params = Vec::with_capacity(names.len());
        let mut is_variadic = false;
        for (i, name) in names.iter().enumerate() {
            if let Some(stripped) = name.strip_prefix('$') {
                if i + 1 != names.len() {
                    self.error(ParseErrorKind::MisplacedDefinition {
                        message: format!(
                            "variadic parameter '{}' must be the last parameter",
                            name
                        ),
                    });
                }
                is_variadic = true;
                params.push(stripped);
            } else {
                params.push(*name);
            }
        }
        (self.arena.alloc_slice_copy(&params), is_variadic)
    }

    fn build_assignment(
        &mut self,
        targets: &[&'a Expr<'a>],
        value: &'a Expr<'a>,
        is_const: bool,
        loc: SourceLoc,
        span: Span,
    ) -> &'a Expr<'a> {
        let names: Option<Vec<&'a str>> = match targets {
            [single] => match **single {
                Expr::Ident(name) => {
                    return self.alloc(Expr::Assign {
                        name,
                        value,
                        is_const,
                    });
                }
                Expr::Member {
                    value: object,
                    field,
                } => {
                    return self.alloc(Expr::MemberAssign {
                        object,
                        field,
                        value,
                    });
                }
                Expr::Tuple(items) => items.iter().map(|item| item.as_ident()).collect(),
                _ => None,
            },
            many => many.iter().map(|item| item.as_ident()).collect(),
        };

        match names {
            Some(names) => {
                let targets = self.arena.alloc_slice_copy(&names);
                self.alloc(Expr::Unpack {
                    targets,
                    value,
                    is_const,
                })
            }
            None => {
                self.invalid_target(loc, span);
                value
            }
        }
    }

    fn invalid_target(&mut self, loc: SourceLoc, span: Span) {
        let span = Span::combine(&span, &Span::new(self.previous_end, self.previous_end));
        self.error_at(
            ParseErrorKind::InvalidTarget {
                message: "invalid assignment target".to_string(),
            },
            loc,
            span,
        );
    }

    /// `ptr name = expr`
    fn parse_ptr_decl(&mut self, is_const: bool) -> &'a Expr<'a> {
        self.advance();
        let Some(name) = self.expect_ident("variable name after 'ptr'") else {
            return self.placeholder();
        };
        if !self.expect(&TokenKind::Assign, "'=' after pointer name") {
            return self.placeholder();
        }
        let inner = self.parse_expr();
        let value = self.alloc(Expr::PtrCast(inner));
        self.alloc(Expr::Assign {
            name,
            value,
            is_const,
        })
    }

    /// `struct Name { field, other; method(self, x) = expr }`
    fn parse_struct_def(&mut self) -> &'a Expr<'a> {
        self.advance();
        let Some(name) = self.expect_ident("struct name") else {
            return self.placeholder();
        };
        if !self.expect(&TokenKind::LBrace, "'{' after struct name") {
            return self.placeholder();
        }

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            let Some(member) = self.expect_ident("field or method name") else {
                break;
            };
            if self.eat(&TokenKind::LParen) {
                let names = self.parse_param_names(&TokenKind::RParen);
                self.expect_closing(&TokenKind::RParen, '(');
                self.expect(&TokenKind::Assign, "'=' after method parameters");
                let (params, is_variadic) = self.finish_params(&names);
                let body = self.with_struct_literals(true, |p| p.parse_expr());
                let lambda = self.alloc(Expr::Lambda {
                    params,
                    is_variadic,
                    body,
                });
                methods.push((member, lambda));
            } else {
                fields.push(member);
            }
            while self.eat(&TokenKind::Comma) || self.eat(&TokenKind::Semi) {}
        }
        self.expect_closing(&TokenKind::RBrace, '{');

        self.alloc(Expr::StructDef {
            name,
            fields: self.arena.alloc_slice_copy(&fields),
            methods: self.arena.alloc_slice_copy(&methods),
        })
    }

    fn parse_param_names(&mut self, terminator: &TokenKind<'a>) -> Vec<&'a str> {
        let mut names = Vec::new();
        if self.check(terminator) {
            return names;
        }
        loop {
            match self.expect_ident("parameter name") {
                Some(name) => names.push(name),
                None => break,
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        names
    }

    /// `{ stmt; stmt }`, value of the last statement.
    fn parse_block(&mut self) -> &'a Expr<'a> {
        if !self.expect(&TokenKind::LBrace, "'{'") {
            return self.alloc(Expr::Block(&[]));
        }
        let stmts = self.with_struct_literals(true, |p| {
            let mut stmts = Vec::new();
            while !p.check(&TokenKind::RBrace) && !p.check(&TokenKind::Eof) {
                let before = p.current.span.0.start;
                // `const` only has meaning at top level.
                p.eat(&TokenKind::Const);
                stmts.push(p.parse_statement(false, false));
                while p.eat(&TokenKind::Semi) {}
                if p.current.span.0.start == before && !p.check(&TokenKind::Eof) {
                    p.advance();
                }
            }
            stmts
        });
        self.expect_closing(&TokenKind::RBrace, '{');
        self.alloc(Expr::Block(self.arena.alloc_slice_copy(&stmts)))
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    pub fn parse_expr(&mut self) -> &'a Expr<'a> {
        self.parse_or()
    }

    /// `a, b, c` as a tuple; a single expression stays as is.
    fn parse_expr_list(&mut self) -> &'a Expr<'a> {
        let first = self.parse_expr();
        if !self.check(&TokenKind::Comma) {
            return first;
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_expr());
        }
        self.alloc(Expr::Tuple(self.arena.alloc_slice_copy(&items)))
    }

    fn binary(&self, op: BinaryOp, left: &'a Expr<'a>, right: &'a Expr<'a>) -> &'a Expr<'a> {
        self.alloc(Expr::Binary { op, left, right })
    }

    fn parse_or(&mut self) -> &'a Expr<'a> {
        let mut left = self.parse_and();
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and();
            left = self.binary(BinaryOp::Or, left, right);
        }
        left
    }

    fn parse_and(&mut self) -> &'a Expr<'a> {
        let mut left = self.parse_comparison();
        while self.eat(&TokenKind::And) {
            let right = self.parse_comparison();
            left = self.binary(BinaryOp::And, left, right);
        }
        left
    }

    fn parse_comparison(&mut self) -> &'a Expr<'a> {
        let mut left = self.parse_range();
        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::LessEq => BinaryOp::Le,
                TokenKind::GreaterEq => BinaryOp::Ge,
                _ => return left,
            };
            self.advance();
            let right = self.parse_range();
            left = self.binary(op, left, right);
        }
    }

    fn parse_range(&mut self) -> &'a Expr<'a> {
        let start = self.parse_arith();
        if self.eat(&TokenKind::DotDot) {
            let end = self.parse_arith();
            return self.alloc(Expr::Range { start, end });
        }
        start
    }

    fn parse_arith(&mut self) -> &'a Expr<'a> {
        let mut left = self.parse_term();
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return left,
            };
            self.advance();
            let right = self.parse_term();
            left = self.binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> &'a Expr<'a> {
        let mut left = self.parse_power();
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::FloorDiv => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return left,
            };
            self.advance();
            let right = self.parse_power();
            left = self.binary(op, left, right);
        }
    }

    fn parse_power(&mut self) -> &'a Expr<'a> {
        let base = self.parse_unary();
        if self.eat(&TokenKind::StarStar) {
            let exponent = self.parse_power();
            return self.binary(BinaryOp::Pow, base, exponent);
        }
        base
    }

    fn parse_unary(&mut self) -> &'a Expr<'a> {
        if !self.enter() {
            return self.placeholder();
        }
        let expr = self.parse_prefix();
        self.depth -= 1;
        expr
    }

    fn parse_prefix(&mut self) -> &'a Expr<'a> {
        match self.current.kind {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary();
                let zero = self.alloc(Expr::Literal(Literal::Int(0)));
                self.binary(BinaryOp::Sub, zero, operand)
            }
            TokenKind::Star => {
                self.advance();
                let operand = self.parse_unary();
                self.alloc(Expr::PtrCast(operand))
            }
            TokenKind::Deref => {
                self.advance();
                let operand = self.parse_unary();
                self.alloc(Expr::Deref(operand))
            }
            TokenKind::Ampersand => {
                self.advance();
                match self.expect_ident("variable name after '&'") {
                    Some(name) => self.alloc(Expr::AddressOf(name)),
                    None => self.placeholder(),
                }
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.check(&TokenKind::PlusPlus) {
                    StepOp::Increment
                } else {
                    StepOp::Decrement
                };
                self.advance();
                match self.current.kind {
                    TokenKind::Ident(target) => {
                        self.advance();
                        self.alloc(Expr::Step {
                            op,
                            target,
                            prefix: true,
                        })
                    }
                    _ => {
                        self.error(ParseErrorKind::InvalidTarget {
                            message: "increment requires a variable".to_string(),
                        });
                        self.placeholder()
                    }
                }
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> &'a Expr<'a> {
        let mut expr = self.parse_primary();
        loop {
            match self.current.kind {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_args(&TokenKind::RParen, '(');
                    expr = self.alloc(Expr::Call { callee: expr, args });
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.with_struct_literals(true, |p| p.parse_expr());
                    self.expect_closing(&TokenKind::RBracket, '[');
                    expr = self.alloc(Expr::Index { value: expr, index });
                }
                TokenKind::Dot => {
                    self.advance();
                    let Some(name) = self.expect_ident("member name after '.'") else {
                        return expr;
                    };
                    if self.eat(&TokenKind::LParen) {
                        let args = self.parse_args(&TokenKind::RParen, '(');
                        expr = self.alloc(Expr::MethodCall {
                            receiver: expr,
                            method: name,
                            args,
                        });
                    } else {
                        expr = self.alloc(Expr::Member {
                            value: expr,
                            field: name,
                        });
                    }
                }
                _ => break,
            }
        }

        let op = match self.current.kind {
            TokenKind::PlusPlus => StepOp::Increment,
            TokenKind::MinusMinus => StepOp::Decrement,
            _ => return expr,
        };
        match *expr {
            Expr::Ident(target) => {
                self.advance();
                self.alloc(Expr::Step {
                    op,
                    target,
                    prefix: false,
                })
            }
            _ => {
                self.error(ParseErrorKind::InvalidTarget {
                    message: "increment requires a variable".to_string(),
                });
                self.advance();
                expr
            }
        }
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed.
    fn parse_args(&mut self, close: &TokenKind<'a>, open: char) -> &'a [&'a Expr<'a>] {
        let args = self.with_struct_literals(true, |p| {
            let mut args = Vec::new();
            while !p.check(close) && !p.check(&TokenKind::Eof) {
                args.push(p.parse_expr());
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            args
        });
        self.expect_closing(close, open);
        self.arena.alloc_slice_copy(&args)
    }

    fn parse_primary(&mut self) -> &'a Expr<'a> {
        match self.current.kind {
            TokenKind::Int(value) => {
                self.advance();
                self.alloc(Expr::Literal(Literal::Int(value)))
            }
            TokenKind::Double(value) => {
                self.advance();
                self.alloc(Expr::Literal(Literal::Double(value)))
            }
            TokenKind::Char(value) => {
                self.advance();
                self.alloc(Expr::Literal(Literal::Char(value)))
            }
            TokenKind::True | TokenKind::False => {
                let value = self.check(&TokenKind::True);
                self.advance();
                self.alloc(Expr::Literal(Literal::Bool(value)))
            }
            TokenKind::NullPtr => {
                self.advance();
                self.alloc(Expr::NullPtr)
            }
            TokenKind::Str(_) => {
                let token = self.advance();
                let TokenKind::Str(text) = token.kind else {
                    return self.placeholder();
                };
                let text = self.alloc_text(text);
                self.parse_format_string(text, token.loc, token.span)
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.check(&TokenKind::LBrace) && self.at_struct_literal() {
                    return self.parse_struct_init(name);
                }
                self.alloc(Expr::Ident(name))
            }
            TokenKind::Lambda => self.parse_lambda(),
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_args(&TokenKind::RBracket, '[');
                self.alloc(Expr::List(items))
            }
            TokenKind::LParen => self.parse_paren(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Return => {
                self.advance();
                if self.starts_expression() {
                    let value = self.parse_expr_list();
                    self.alloc(Expr::Return(Some(value)))
                } else {
                    self.alloc(Expr::Return(None))
                }
            }
            TokenKind::Break => {
                self.advance();
                self.alloc(Expr::Break)
            }
            TokenKind::Continue => {
                self.advance();
                self.alloc(Expr::Continue)
            }
            _ => {
                self.unexpected("expression");
                self.placeholder()
            }
        }
    }

    fn starts_expression(&self) -> bool {
        !matches!(
            self.current.kind,
            TokenKind::Semi
                | TokenKind::RBrace
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::Comma
                | TokenKind::Else
                | TokenKind::Eof
        )
    }

    /// After `Name`, decide whether `{` opens an initializer: it must be
    /// `{}` or `{ field:`.
    fn at_struct_literal(&mut self) -> bool {
        if self.no_struct_literal {
            return false;
        }
        let state = self.lexer.snapshot();
        let saved = self.current.clone();
        let previous_end = self.previous_end;
        let pending = self.pending.len();

        self.advance();
        let is_init = match self.current.kind {
            TokenKind::RBrace => true,
            TokenKind::Ident(_) => {
                self.advance();
                self.check(&TokenKind::Colon)
            }
            _ => false,
        };

        self.lexer.restore(state);
        self.current = saved;
        self.previous_end = previous_end;
        self.pending.truncate(pending);
        is_init
    }

    fn parse_struct_init(&mut self, name: &'a str) -> &'a Expr<'a> {
        self.advance();
        let fields = self.with_struct_literals(true, |p| {
            let mut fields = Vec::new();
            while !p.check(&TokenKind::RBrace) && !p.check(&TokenKind::Eof) {
                let Some(field) = p.expect_ident("field name") else {
                    break;
                };
                if !p.expect(&TokenKind::Colon, "':' after field name") {
                    break;
                }
                fields.push((field, p.parse_expr()));
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            fields
        });
        self.expect_closing(&TokenKind::RBrace, '{');
        self.alloc(Expr::StructInit {
            name,
            fields: self.arena.alloc_slice_copy(&fields),
        })
    }

    /// `lambda a, b: body`; parameters are optional.
    fn parse_lambda(&mut self) -> &'a Expr<'a> {
        self.advance();
        let names = self.parse_param_names(&TokenKind::Colon);
        let (params, is_variadic) = self.finish_params(&names);
        self.expect(&TokenKind::Colon, "':' after lambda parameters");
        let body = self.parse_expr();
        self.alloc(Expr::Lambda {
            params,
            is_variadic,
            body,
        })
    }

    /// `()`, `(expr)` or a tuple `(a, b)` / `(a,)`.
    fn parse_paren(&mut self) -> &'a Expr<'a> {
        self.advance();
        if self.eat(&TokenKind::RParen) {
            return self.alloc(Expr::Literal(Literal::Int(0)));
        }
        let (first, items) = self.with_struct_literals(true, |p| {
            let first = p.parse_expr();
            let mut items = Vec::new();
            if p.check(&TokenKind::Comma) {
                items.push(first);
                while p.eat(&TokenKind::Comma) {
                    if p.check(&TokenKind::RParen) {
                        break;
                    }
                    items.push(p.parse_expr());
                }
            }
            (first, items)
        });
        self.expect_closing(&TokenKind::RParen, '(');
        if items.is_empty() {
            first
        } else {
            self.alloc(Expr::Tuple(self.arena.alloc_slice_copy(&items)))
        }
    }

    /// Condition of `if`/`while`/`match` or the iterable of `for`.
    fn parse_head(&mut self) -> &'a Expr<'a> {
        self.with_struct_literals(false, |p| p.parse_or())
    }

    /// A block, or `: expr`.
    fn parse_branch(&mut self) -> &'a Expr<'a> {
        if self.check(&TokenKind::LBrace) {
            return self.parse_block();
        }
        if !self.expect(&TokenKind::Colon, "'{' or ':'") {
            return self.placeholder();
        }
        self.with_struct_literals(true, |p| p.parse_expr())
    }

    fn parse_if(&mut self) -> &'a Expr<'a> {
        self.advance();
        let cond = self.parse_head();
        let then_branch = self.parse_branch();
        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(self.parse_if())
            } else {
                Some(self.parse_branch())
            }
        } else {
            None
        };
        self.alloc(Expr::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> &'a Expr<'a> {
        self.advance();
        let cond = self.parse_head();
        let body = self.parse_branch();
        self.alloc(Expr::While { cond, body })
    }

    /// `for v : iterable { }` or `for i, v : iterable { }`
    fn parse_for(&mut self) -> &'a Expr<'a> {
        self.advance();
        let Some(first) = self.expect_ident("loop variable name") else {
            return self.placeholder();
        };
        let (index, var) = if self.eat(&TokenKind::Comma) {
            match self.expect_ident("second loop variable name") {
                Some(second) => (Some(first), second),
                None => return self.placeholder(),
            }
        } else {
            (None, first)
        };
        if !self.expect(&TokenKind::Colon, "':' after loop variable") {
            return self.placeholder();
        }
        let iterable = self.parse_head();
        let body = self.parse_block();
        self.alloc(Expr::For {
            index,
            var,
            iterable,
            body,
        })
    }

    /// `match value [:] { pattern: body, ... }`
    fn parse_match(&mut self) -> &'a Expr<'a> {
        self.advance();
        let scrutinee = self.parse_head();
        self.eat(&TokenKind::Colon);
        if !self.expect(&TokenKind::LBrace, "'{' to start match cases") {
            return self.placeholder();
        }
        let arms = self.with_struct_literals(true, |p| {
            let mut arms = Vec::new();
            while !p.check(&TokenKind::RBrace) && !p.check(&TokenKind::Eof) {
                let pattern = p.parse_or();
                if !p.expect(&TokenKind::Colon, "':' after match pattern") {
                    break;
                }
                arms.push((pattern, p.parse_expr()));
                while p.eat(&TokenKind::Comma) || p.eat(&TokenKind::Semi) {}
            }
            arms
        });
        self.expect_closing(&TokenKind::RBrace, '{');
        self.alloc(Expr::Match {
            scrutinee,
            arms: self.arena.alloc_slice_copy(&arms),
        })
    }

    // ---------------------------------------------------------------------
    // String interpolation
    // ---------------------------------------------------------------------

    /// Split `"a {x} b"` into literal pieces and embedded expressions.
    /// `{{` and `}}` are literal braces; an unclosed `{` is kept as text.
    fn parse_format_string(&mut self, text: &'a str, loc: SourceLoc, span: Span) -> &'a Expr<'a> {
        if !text.contains(['{', '}']) {
            return self.alloc(Expr::Literal(Literal::Str(text)));
        }

        let bytes = text.as_bytes();
        let mut strs = Vec::new();
        let mut exprs = Vec::new();
        let mut buf = String::new();
        let mut run_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match (bytes[i], bytes.get(i + 1)) {
                (b'{', Some(b'{')) | (b'}', Some(b'}')) => {
                    buf.push_str(&text[run_start..=i]);
                    i += 2;
                    run_start = i;
                }
                (b'{', _) => {
                    let Some(close) = matching_brace(bytes, i) else {
                        break;
                    };
                    buf.push_str(&text[run_start..i]);
                    let inner = text[i + 1..close].trim();
                    if inner.is_empty() {
                        self.error_at(
                            ParseErrorKind::InvalidLiteral {
                                message: "empty interpolation in string".to_string(),
                            },
                            loc,
                            span.clone(),
                        );
                    } else {
                        strs.push(&*self.arena.alloc_str(&buf));
                        buf.clear();
                        exprs.push(self.parse_embedded(inner, loc, &span));
                    }
                    i = close + 1;
                    run_start = i;
                }
                _ => i += 1,
            }
        }
        buf.push_str(&text[run_start..]);

        if exprs.is_empty() {
            return self.alloc(Expr::Literal(Literal::Str(self.arena.alloc_str(&buf))));
        }
        strs.push(self.arena.alloc_str(&buf));
        self.alloc(Expr::FormatStr {
            strs: self.arena.alloc_slice_copy(&strs),
            exprs: self.arena.alloc_slice_copy(&exprs),
        })
    }

    /// Parse one `{expr}` segment with its own lexer. Errors point at the
    /// enclosing string literal.
    fn parse_embedded(&mut self, source: &'a str, loc: SourceLoc, span: &Span) -> &'a Expr<'a> {
        let mut nested = Parser::with_lexer(
            self.arena,
            Lexer::with_location(source, loc),
            self.options.clone(),
        );
        nested.depth = self.depth;
        let expr = nested.parse_expr();
        if !nested.check(&TokenKind::Eof) {
            nested.unexpected("'}' to end interpolation");
        }
        let errors = nested.errors.into_iter().chain(nested.pending);
        for err in errors {
            self.error_at(err.kind, loc, span.clone());
        }
        expr
    }
}

/// Index of the `}` closing the `{` at `open`, honoring nesting.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
