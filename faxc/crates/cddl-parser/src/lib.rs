//! A Pratt parser over the CDDL token stream: turns a `cddl_lex::Lexer`
//! into a [`Node`] tree plus a flat list of diagnostics, deferring any
//! check that needs information from later in the file (identifier
//! existence, range-bound kind agreement) to a post-pass over the
//! symbol table it builds while parsing.

pub mod ast;
pub mod parser;

pub use ast::{
    BadNode, Bits, BooleanLiteral, Cddl, Comment, CommentGroup, ComparatorOp,
    ComparatorOpControl, ControlOperator, Entry, Enumeration, FloatLiteral, Group, GroupChoice,
    Identifier, IntegerLiteral, LeafType, Node, NMOccurrence, Optional, Range, Regexp, Rule,
    SizeOperatorControl, Tag, TextLiteral, TypeChoice, UintLiteral, Unwrap, Visitor, walk,
};
pub use parser::Parser;

use cddl_util::diagnostic::Diagnostic;

/// Parses a complete CDDL source file, returning the root [`Node::Cddl`]
/// and every diagnostic collected, whether immediate or deferred.
pub fn parse(source: impl Into<String>) -> (Node, Vec<Diagnostic>) {
    Parser::new(source).parse_file()
}
