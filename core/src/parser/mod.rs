//! Parser for aoxim source text.
//!
//! [`Parser::next_item`] yields one top-level item at a time so a driver can
//! evaluate each statement before the next one is parsed.

mod parsed_expr;
#[allow(clippy::module_inception)]
pub mod parser;
mod syntax;
pub mod error;

pub use parser::{ParseOptions, Parser, Program, parse, parse_with_options};

pub use error::{ParseError, ParseErrorKind};
pub use parsed_expr::{Expr, ExternDecl, Item, ItemKind, Literal};
pub use syntax::{BinaryOp, StepOp};
