use crate::lexer::{SourceLoc, Span};
use crate::parser::{BinaryOp, StepOp};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Literal(Literal<'a>),
    NullPtr,
    Ident(&'a str),
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Call {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    Lambda {
        // The variadic parameter, if any, is last and already stripped of `$`.
        params: &'a [&'a str],
        is_variadic: bool,
        body: &'a Expr<'a>,
    },
    Assign {
        name: &'a str,
        value: &'a Expr<'a>,
        is_const: bool,
    },
    Unpack {
        targets: &'a [&'a str],
        value: &'a Expr<'a>,
        is_const: bool,
    },
    MemberAssign {
        object: &'a Expr<'a>,
        field: &'a str,
        value: &'a Expr<'a>,
    },
    If {
        cond: &'a Expr<'a>,
        then_branch: &'a Expr<'a>,
        else_branch: Option<&'a Expr<'a>>,
    },
    While {
        cond: &'a Expr<'a>,
        body: &'a Expr<'a>,
    },
    For {
        index: Option<&'a str>,
        var: &'a str,
        iterable: &'a Expr<'a>,
        body: &'a Expr<'a>,
    },
    List(&'a [&'a Expr<'a>]),
    Tuple(&'a [&'a Expr<'a>]),
    Range {
        start: &'a Expr<'a>,
        end: &'a Expr<'a>,
    },
    Index {
        value: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },
    Member {
        value: &'a Expr<'a>,
        field: &'a str,
    },
    MethodCall {
        receiver: &'a Expr<'a>,
        method: &'a str,
        args: &'a [&'a Expr<'a>],
    },
    Block(&'a [&'a Expr<'a>]),
    Return(Option<&'a Expr<'a>>),
    Break,
    Continue,
    FormatStr {
        // REQUIRES: strs.len() == exprs.len() + 1
        strs: &'a [&'a str],
        exprs: &'a [&'a Expr<'a>],
    },
    StructDef {
        name: &'a str,
        fields: &'a [&'a str],
        // Each method body is an `Expr::Lambda` whose first parameter is the receiver.
        methods: &'a [(&'a str, &'a Expr<'a>)],
    },
    StructInit {
        name: &'a str,
        fields: &'a [(&'a str, &'a Expr<'a>)],
    },
    Match {
        scrutinee: &'a Expr<'a>,
        arms: &'a [(&'a Expr<'a>, &'a Expr<'a>)],
    },
    Step {
        op: StepOp,
        target: &'a str,
        prefix: bool,
    },
    PtrCast(&'a Expr<'a>),
    Deref(&'a Expr<'a>),
    AddressOf(&'a str),
}

impl<'a> Expr<'a> {
    pub fn as_ident(&self) -> Option<&'a str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Int(i64),
    Double(f64),
    Str(&'a str),
    Char(u8),
    Bool(bool),
}

impl<'a> core::fmt::Debug for Literal<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "Int({value})"),
            Literal::Double(value) => write!(f, "Double({value})"),
            Literal::Str(s) => write!(f, "Str({s:?})"),
            Literal::Char(c) => write!(f, "Char({:?})", *c as char),
            Literal::Bool(b) => write!(f, "Bool({b})"),
        }
    }
}

/// `extern name = symbol(types): ret`. Type names are resolved by the FFI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternDecl<'a> {
    pub name: &'a str,
    pub symbol: &'a str,
    pub params: &'a [&'a str],
    pub ret: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind<'a> {
    Import(&'a str),
    Link(&'a str),
    Extern(ExternDecl<'a>),
    Statement(&'a Expr<'a>),
}

/// One top-level item together with where it started.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<'a> {
    pub kind: ItemKind<'a>,
    pub loc: SourceLoc,
    pub span: Span,
}
