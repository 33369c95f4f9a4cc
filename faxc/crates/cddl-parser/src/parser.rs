//! A Pratt (top-down operator-precedence) parser over the CDDL token
//! stream: dispatch tables are fixed-size arrays indexed by token kind
//! rather than hash maps, built once at construction with duplicate
//! registrations rejected.

use cddl_lex::token::{Token, TOKEN_COUNT};
use cddl_lex::Lexer;
use cddl_util::diagnostic::{Diagnostic, ErrorList};
use cddl_util::env::Environment;
use cddl_util::position::{Position, PositionRange};
use cddl_sem::DeferredQueue;

use crate::ast::*;

static_assertions::const_assert_eq!(TOKEN_COUNT, 72);

type Env = Environment<Node>;
type NudFn = fn(&mut Parser) -> Node;
type LedFn = fn(&mut Parser, Node) -> Node;

#[derive(Clone)]
struct TokenInfo {
    tok: Token,
    pos: Position,
    lit: String,
}

pub struct Parser {
    lexer: Lexer,
    current: TokenInfo,
    peek: TokenInfo,
    prev_end: Position,
    pub errors: ErrorList,
    pub env: Env,
    deferred: DeferredQueue<Env>,
    nuds: [Option<NudFn>; TOKEN_COUNT],
    leds: [Option<LedFn>; TOKEN_COUNT],
}

impl Parser {
    pub fn new(source: impl Into<String>) -> Self {
        let mut lexer = Lexer::new(source);
        let current = Self::fetch(&mut lexer);
        let peek = Self::fetch(&mut lexer);
        let prev_end = current.pos;
        let mut parser = Parser {
            lexer,
            current,
            peek,
            prev_end,
            errors: ErrorList::new(),
            env: Environment::new(),
            deferred: DeferredQueue::new(),
            nuds: [None; TOKEN_COUNT],
            leds: [None; TOKEN_COUNT],
        };
        parser.register_handlers();
        parser
    }

    fn fetch(lexer: &mut Lexer) -> TokenInfo {
        let (tok, pos, lit) = lexer.scan();
        TokenInfo { tok, pos, lit }
    }

    fn next(&mut self) {
        self.prev_end = self.current.pos.to(self.current.lit.chars().count() as u32);
        let fresh = Self::fetch(&mut self.lexer);
        self.current = std::mem::replace(&mut self.peek, fresh);
    }

    fn register_nud(&mut self, tok: Token, f: NudFn) {
        let idx = tok.index();
        assert!(
            self.nuds[idx].is_none(),
            "duplicate nud registration for {tok:?}"
        );
        self.nuds[idx] = Some(f);
    }

    fn register_led(&mut self, tok: Token, f: LedFn) {
        let idx = tok.index();
        assert!(
            self.leds[idx].is_none(),
            "duplicate led registration for {tok:?}"
        );
        self.leds[idx] = Some(f);
    }

    fn register_handlers(&mut self) {
        use Token::*;
        self.register_nud(Ident, nud_identifier);
        self.register_nud(Bool, |p| nud_leaf_type(p, Node::BooleanType));
        self.register_nud(True, |p| nud_bool_literal(p, true));
        self.register_nud(False, |p| nud_bool_literal(p, false));
        self.register_nud(Int, nud_int_family);
        self.register_nud(Uint, |p| nud_leaf_type(p, Node::UintType));
        self.register_nud(Nint, |p| nud_leaf_type(p, Node::NegativeIntegerType));
        self.register_nud(Float, nud_float_family);
        self.register_nud(Float16, |p| nud_leaf_type(p, Node::FloatType));
        self.register_nud(Float32, |p| nud_leaf_type(p, Node::FloatType));
        self.register_nud(Float64, |p| nud_leaf_type(p, Node::FloatType));
        self.register_nud(Tstr, |p| nud_leaf_type(p, Node::TstrType));
        self.register_nud(Text, |p| nud_leaf_type(p, Node::TstrType));
        self.register_nud(TextLiteral, nud_text_literal);
        self.register_nud(Bytes, |p| nud_leaf_type(p, Node::BytesType));
        self.register_nud(Bstr, |p| nud_leaf_type(p, Node::BstrType));
        self.register_nud(Nil, |p| nud_leaf_type(p, Node::NullType));
        self.register_nud(Null, |p| nud_leaf_type(p, Node::NullType));
        self.register_nud(Any, |p| nud_leaf_type(p, Node::AnyType));
        self.register_nud(Minus, nud_minus);
        self.register_nud(LBrace, |p| nud_composite(p, RBrace, Node::Map));
        self.register_nud(LParen, |p| nud_composite(p, RParen, Node::Group));
        self.register_nud(LBrack, |p| nud_composite(p, RBrack, Node::Array));
        self.register_nud(Comment, nud_comment);
        self.register_nud(Hash, nud_tag);
        self.register_nud(Optional, |p| nud_prefix_occurrence(p, None, None));
        self.register_nud(ZeroOrMore, |p| {
            nud_prefix_occurrence(p, Some(0), None)
        });
        self.register_nud(OneOrMore, |p| nud_prefix_occurrence(p, Some(1), None));
        self.register_nud(Unwrap, nud_unwrap);

        self.register_led(Colon, led_entry);
        self.register_led(ArrowMap, led_entry);
        self.register_led(TypeChoice, led_type_choice);
        self.register_led(GroupChoice, led_group_choice);
        self.register_led(Size, led_size);
        self.register_led(Regexp, led_regexp);
        self.register_led(Bits, led_bits);
        self.register_led(Lt, |p, l| led_comparator(p, l, ComparatorOp::Lt));
        self.register_led(Le, |p, l| led_comparator(p, l, ComparatorOp::Le));
        self.register_led(Gt, |p, l| led_comparator(p, l, ComparatorOp::Gt));
        self.register_led(Ge, |p, l| led_comparator(p, l, ComparatorOp::Ge));
        self.register_led(Eq, |p, l| led_comparator(p, l, ComparatorOp::Eq));
        self.register_led(Ne, |p, l| led_comparator(p, l, ComparatorOp::Ne));
        self.register_led(InclusiveBound, |p, l| led_range(p, l, true));
        self.register_led(ExclusiveBound, |p, l| led_range(p, l, false));
        self.register_led(ZeroOrMore, |p, l| led_occurrence(p, l));
        self.register_led(OneOrMore, |p, l| led_occurrence(p, l));
        for op in [Cbor, Cborseq, Within, And, Default, Plus, Cat, Det, Abnf, Abnfb, Feature] {
            self.register_led(op, led_generic_control_op);
        }
    }

    fn error(&mut self, range: PositionRange, message: impl Into<String>) {
        self.errors.push(Diagnostic::error("parser", range, message));
    }

    fn bad_node(&mut self, base: Option<Node>, offending: &str, range: PositionRange) -> Node {
        Node::BadNode(BadNode {
            base: base.map(Box::new),
            offending_token: offending.to_string(),
            pos: range,
        })
    }

    fn current_range(&self) -> PositionRange {
        PositionRange::new(
            self.current.pos,
            self.current.pos.to(self.current.lit.chars().count() as u32),
        )
    }

    /// Applies the registered nud for the current token, reporting and
    /// recovering via a `BadNode` when none exists.
    fn apply_nud(&mut self) -> Node {
        while self.current.tok == Token::Comment {
            self.next();
        }
        let idx = self.current.tok.index();
        match self.nuds[idx] {
            Some(f) => f(self),
            None => {
                let range = self.current_range();
                let lit = self.current.lit.clone();
                self.error(range, format!("no prefix parse function for '{lit}'"));
                self.next();
                self.bad_node(None, &lit, range)
            }
        }
    }

    /// The Pratt core: parses one entry, absorbing infix/postfix operators
    /// whose precedence exceeds `precedence`. Each `led` handler is invoked
    /// with `self.current` still sitting on the operator token; the handler
    /// itself advances past it.
    pub fn parse_entry(&mut self, precedence: u8) -> Node {
        let mut left = self.apply_nud();
        while self.current.tok != Token::Comma && precedence < self.current.tok.precedence() {
            let idx = self.current.tok.index();
            left = match self.leds[idx] {
                Some(f) => f(self, left),
                None => break,
            };
        }
        left
    }

    /// Parses every top-level rule in the source, draining the deferred
    /// queue once the structural pass completes. If the lexer already
    /// carries errors before the first rule is parsed, parsing is skipped
    /// entirely and only the lexer's diagnostics are returned.
    pub fn parse_file(mut self) -> (Node, Vec<Diagnostic>) {
        let start = self.current.pos;
        tracing::debug!("parsing file");

        if self.lexer.has_errors() {
            let diagnostics = lexer_diagnostics(&self.lexer.errors);
            tracing::debug!(count = diagnostics.len(), "lexer errors, skipping parse");
            return (
                Node::Cddl(Cddl {
                    rules: Vec::new(),
                    pos: PositionRange::new(start, start),
                }),
                diagnostics,
            );
        }

        let mut rules = Vec::new();
        while self.current.tok != Token::Eof {
            let rule = self.parse_rule();
            rules.push(rule);
        }
        let end = self.prev_end;

        let mut diagnostics = lexer_diagnostics(&self.lexer.errors);
        diagnostics.extend(std::mem::replace(&mut self.errors, ErrorList::new()));
        let env = std::mem::replace(&mut self.env, Environment::new());
        diagnostics.extend(self.deferred.drain(&env));

        tracing::debug!(
            rule_count = rules.len(),
            diagnostic_count = diagnostics.len(),
            "parse complete"
        );
        (
            Node::Cddl(Cddl {
                rules,
                pos: PositionRange::new(start, end),
            }),
            diagnostics,
        )
    }

    fn parse_rule(&mut self) -> Node {
        if self.current.tok == Token::Comment {
            return nud_comment(self);
        }

        let start = self.current.pos;
        if self.current.tok != Token::Ident {
            let range = self.current_range();
            let lit = self.current.lit.clone();
            self.error(range, format!("expected identifier, found '{lit}'"));
            self.next();
            return self.bad_node(None, &lit, range);
        }
        let name = Identifier {
            name: self.current.lit.clone(),
            pos: self.current_range(),
        };
        self.next();

        let assign_tok = self.current.tok;
        let precedence = match assign_tok {
            Token::Assign => assign_tok.precedence(),
            Token::TypeChoiceAssign | Token::GroupChoiceAssign => cddl_lex::token::LOWEST,
            _ => {
                let range = self.current_range();
                self.error(
                    range,
                    "expected assignment operator ('=', '/=' or '//=') after identifier",
                );
                return self.bad_node(
                    Some(Node::Identifier(name)),
                    &self.current.lit.clone(),
                    range,
                );
            }
        };
        self.next();

        let value = self.parse_entry(precedence);
        let end = value.end();

        if assign_tok == Token::Assign {
            if let Err(existing) = self.env.add(&name.name, name.pos.start, value.clone()) {
                let cddl_util::error::EnvironmentError::SymbolExists(first_pos) = existing;
                self.error(
                    name.pos,
                    format!("symbol '{}' already exists, first defined at {first_pos}", name.name),
                );
            }
        }

        let trailing_comment = self.try_take_trailing_comment(end.line);

        tracing::trace!(rule = %name.name, "parsed rule");
        Node::Rule(Rule {
            name: Box::new(Node::Identifier(name)),
            value: Box::new(value),
            trailing_comment,
            pos: PositionRange::new(start, end),
        })
    }

    fn try_take_trailing_comment(&mut self, prev_line: u32) -> Option<Box<Node>> {
        if self.current.tok == Token::Comment && self.current.pos.line == prev_line {
            let comment = nud_comment(self);
            Some(Box::new(comment))
        } else {
            None
        }
    }

    fn schedule_reference_check(&mut self, name: String, pos: PositionRange) {
        self.deferred.schedule(move |env: &Env| {
            if env.exists(&name) {
                None
            } else {
                Some(Diagnostic::error(
                    "parser",
                    pos,
                    format!("identifier '{name}' referenced but never declared"),
                ))
            }
        });
    }

    fn schedule_range_kind_check(&mut self, from_name: Option<String>, to_name: Option<String>, pos: PositionRange) {
        self.deferred.schedule(move |env: &Env| {
            let resolved_kind = |n: &str, env: &Env| env.get(n).map(|node| kind_tag(node));
            let from_kind = from_name.as_deref().and_then(|n| resolved_kind(n, env));
            let to_kind = to_name.as_deref().and_then(|n| resolved_kind(n, env));
            match (from_kind, to_kind) {
                (Some(a), Some(b)) if a != b => Some(Diagnostic::error(
                    "parser",
                    pos,
                    "range endpoints resolve to incompatible kinds",
                )),
                _ => None,
            }
        });
    }
}

fn lexer_diagnostics(errors: &[cddl_lex::LexError]) -> Vec<Diagnostic> {
    errors
        .iter()
        .map(|e| {
            let pos = Position::new(0, e.offset, 0, 0);
            Diagnostic::error("lexer", PositionRange::new(pos, pos), e.message.clone())
        })
        .collect()
}

fn kind_tag(node: &Node) -> &'static str {
    match node {
        Node::IntegerLiteral(_) | Node::UintLiteral(_) => "int",
        Node::FloatLiteral(_) => "float",
        _ => "other",
    }
}

// ---------------------------------------------------------------------
// nud handlers
// ---------------------------------------------------------------------

fn nud_leaf_type(p: &mut Parser, build: fn(LeafType) -> Node) -> Node {
    let range = p.current_range();
    p.next();
    build(LeafType { pos: range })
}

fn nud_bool_literal(p: &mut Parser, value: bool) -> Node {
    let range = p.current_range();
    p.next();
    Node::BooleanLiteral(BooleanLiteral { value, pos: range })
}

fn nud_text_literal(p: &mut Parser) -> Node {
    let range = p.current_range();
    let value = p.current.lit.clone();
    p.next();
    Node::TextLiteral(TextLiteral { value, pos: range })
}

fn parse_int_literal_text(lit: &str) -> i64 {
    if let Some(hex) = lit.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).unwrap_or(0)
    } else if let Some(bin) = lit.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).unwrap_or(0)
    } else if let Some(oct) = lit.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).unwrap_or(0)
    } else {
        lit.parse().unwrap_or(0)
    }
}

fn nud_int_family(p: &mut Parser) -> Node {
    let lit = p.current.lit.clone();
    let range = p.current_range();
    if p.current.tok.is_literal(&lit) {
        p.next();
        let value = parse_int_literal_text(&lit);
        Node::IntegerLiteral(IntegerLiteral { value, pos: range })
    } else {
        nud_leaf_type(p, Node::IntegerType)
    }
}

fn nud_float_family(p: &mut Parser) -> Node {
    let lit = p.current.lit.clone();
    let range = p.current_range();
    if p.current.tok.is_literal(&lit) {
        p.next();
        let value: f64 = lit.parse().unwrap_or(0.0);
        Node::FloatLiteral(FloatLiteral { value, pos: range })
    } else {
        nud_leaf_type(p, Node::FloatType)
    }
}

fn nud_minus(p: &mut Parser) -> Node {
    let start = p.current_range().start;
    p.next();
    if p.current.tok != Token::Int || !p.current.tok.is_literal(&p.current.lit) {
        let range = p.current_range();
        let lit = p.current.lit.clone();
        p.error(range, "expected integer literal after '-'");
        return p.bad_node(None, &lit, PositionRange::new(start, range.end));
    }
    let lit = p.current.lit.clone();
    let value = -parse_int_literal_text(&lit);
    let end = p.current_range().end;
    p.next();
    Node::IntegerLiteral(IntegerLiteral {
        value,
        pos: PositionRange::new(start, end),
    })
}

fn nud_identifier(p: &mut Parser) -> Node {
    let name = p.current.lit.clone();
    let range = p.current_range();
    let followed_by_colon = p.peek.tok == Token::Colon || p.peek.tok == Token::ArrowMap;
    p.next();
    if !followed_by_colon && !name.starts_with('$') {
        p.schedule_reference_check(name.clone(), range);
    }
    Node::Identifier(Identifier { name, pos: range })
}

fn nud_composite(p: &mut Parser, closing: Token, build: fn(Group) -> Node) -> Node {
    let start = p.current_range().start;
    p.next();
    let mut entries = Vec::new();
    while p.current.tok != closing && p.current.tok != Token::Eof {
        if p.current.tok == Token::Comment {
            entries.push(nud_comment(p));
            continue;
        }
        entries.push(p.parse_entry(cddl_lex::token::LOWEST));
        if p.current.tok == Token::Comma {
            p.next();
        }
    }
    let end = p.current_range().end;
    if p.current.tok == closing {
        p.next();
    } else {
        p.error(
            PositionRange::new(start, end),
            format!("expected '{}' to close composite", closing.canonical()),
        );
    }
    build(Group {
        entries,
        pos: PositionRange::new(start, end),
    })
}

fn take_comment(p: &mut Parser) -> Node {
    let range = p.current_range();
    let text = p.current.lit.clone();
    p.next();
    Node::Comment(Comment { text, pos: range })
}

/// Consumes the current comment token, absorbing any run of immediately
/// following comments that sit on consecutive lines at the same column
/// (no blank line between them) into a single [`Node::CommentGroup`].
fn nud_comment(p: &mut Parser) -> Node {
    let mut comments = vec![take_comment(p)];
    loop {
        let (col, line) = match comments.last().unwrap() {
            Node::Comment(c) => (c.pos.start.column, c.pos.start.line),
            _ => unreachable!(),
        };
        if p.current.tok == Token::Comment
            && p.current.pos.column == col
            && p.current.pos.line == line + 1
        {
            comments.push(take_comment(p));
        } else {
            break;
        }
    }
    if comments.len() == 1 {
        comments.pop().unwrap()
    } else {
        let start = comments.first().unwrap().start();
        let end = comments.last().unwrap().end();
        Node::CommentGroup(CommentGroup {
            comments,
            pos: PositionRange::new(start, end),
        })
    }
}

fn nud_tag(p: &mut Parser) -> Node {
    let start = p.current_range().start;
    p.next();

    let mut major = None;
    let mut tag_number = None;

    if p.current.tok == Token::Float && p.current.tok.is_literal(&p.current.lit) {
        let lit = p.current.lit.clone();
        let range = p.current_range();
        let mut parts = lit.splitn(2, '.');
        let major_text = parts.next().unwrap_or("0");
        let tag_text = parts.next().unwrap_or("0");
        let major_val: u64 = major_text.parse().unwrap_or(0);
        let tag_val: u64 = tag_text.parse().unwrap_or(0);
        major = Some(Box::new(Node::UintLiteral(UintLiteral {
            value: major_val,
            pos: range,
        })));
        tag_number = Some(Box::new(Node::UintLiteral(UintLiteral {
            value: tag_val,
            pos: range,
        })));
        p.next();
    } else if p.current.tok == Token::Int && p.current.tok.is_literal(&p.current.lit) {
        let range = p.current_range();
        let value: u64 = p.current.lit.parse().unwrap_or(0);
        major = Some(Box::new(Node::UintLiteral(UintLiteral { value, pos: range })));
        p.next();
    }

    let mut item = None;
    if p.current.tok == Token::LParen {
        p.next();
        let inner = p.parse_entry(cddl_lex::token::LOWEST);
        if p.current.tok == Token::RParen {
            p.next();
        } else {
            let range = p.current_range();
            p.error(range, "expected ')' to close tag item");
        }
        item = Some(Box::new(inner));
    }

    let end = p.prev_end;
    Node::Tag(Tag {
        major,
        tag_number,
        item,
        pos: PositionRange::new(start, end),
    })
}

fn nud_prefix_occurrence(p: &mut Parser, n: Option<u64>, m: Option<u64>) -> Node {
    let start = p.current_range().start;
    p.next();
    let n_node = Box::new(Node::UintLiteral(UintLiteral {
        value: n.unwrap_or(0),
        pos: PositionRange::new(start, start),
    }));
    let m_node = m.map(|v| {
        Box::new(Node::UintLiteral(UintLiteral {
            value: v,
            pos: PositionRange::new(start, start),
        }))
    });
    let item = Box::new(p.parse_entry(Token::Optional.precedence()));
    let end = item.end();
    if n.is_some() || m.is_some() {
        Node::NMOccurrence(NMOccurrence {
            n: n_node,
            m: m_node,
            item,
            pos: PositionRange::new(start, end),
        })
    } else {
        Node::Optional(Optional {
            item,
            pos: PositionRange::new(start, end),
        })
    }
}

fn nud_unwrap(p: &mut Parser) -> Node {
    let start = p.current_range().start;
    p.next();
    let item = Box::new(p.parse_entry(Token::Unwrap.precedence()));
    let end = item.end();
    Node::Unwrap(Unwrap {
        item,
        pos: PositionRange::new(start, end),
    })
}

// ---------------------------------------------------------------------
// led handlers
// ---------------------------------------------------------------------

fn led_entry(p: &mut Parser, left: Node) -> Node {
    let op_prec = p.current.tok.precedence();
    let name = match &left {
        Node::Identifier(_) => left,
        Node::IntegerLiteral(lit) => Node::Identifier(Identifier {
            name: lit.value.to_string(),
            pos: lit.pos,
        }),
        other => {
            let range = other.range();
            p.error(range, "expected identifier or integer literal as entry name");
            other.clone()
        }
    };
    p.next();
    let value = Box::new(p.parse_entry(op_prec));
    let end = value.end();
    let start = name.start();
    let trailing_comment = p.try_take_trailing_comment(end.line);
    Node::Entry(Entry {
        name: Box::new(name),
        value,
        trailing_comment,
        pos: PositionRange::new(start, end),
    })
}

fn led_type_choice(p: &mut Parser, left: Node) -> Node {
    let prec = p.current.tok.precedence();
    p.next();
    let second = Box::new(p.parse_entry(prec));
    let start = left.start();
    let end = second.end();
    Node::TypeChoice(TypeChoice {
        first: Box::new(left),
        second,
        pos: PositionRange::new(start, end),
    })
}

fn led_group_choice(p: &mut Parser, left: Node) -> Node {
    let prec = p.current.tok.precedence();
    p.next();
    let second = Box::new(p.parse_entry(prec));
    let start = left.start();
    let end = second.end();
    Node::GroupChoice(GroupChoice {
        first: Box::new(left),
        second,
        pos: PositionRange::new(start, end),
    })
}

fn base_allows_size(node: &Node) -> bool {
    matches!(
        node,
        Node::BstrType(_) | Node::BytesType(_) | Node::UintType(_) | Node::TstrType(_)
    )
}

fn led_size(p: &mut Parser, left: Node) -> Node {
    let prec = p.current.tok.precedence();
    let mut left = left;
    if !base_allows_size(&left) {
        let range = left.range();
        p.error(range, ".size may only apply to bstr, bytes, uint or tstr");
        left = p.bad_node(Some(left), "size base", range);
    }
    p.next();
    let size = Box::new(p.parse_entry(prec));
    let start = left.start();
    let end = size.end();
    Node::SizeOperatorControl(SizeOperatorControl {
        base: Box::new(left),
        size,
        pos: PositionRange::new(start, end),
    })
}

fn led_regexp(p: &mut Parser, left: Node) -> Node {
    let prec = p.current.tok.precedence();
    let mut left = left;
    if !matches!(left, Node::TstrType(_)) {
        let range = left.range();
        p.error(range, ".regexp may only apply to tstr");
        left = p.bad_node(Some(left), "regexp base", range);
    }
    p.next();
    let mut regex = p.parse_entry(prec);
    if !matches!(regex, Node::TextLiteral(_)) {
        let range = regex.range();
        p.error(range, ".regexp argument must be a text literal");
        regex = p.bad_node(Some(regex), "regexp argument", range);
    }
    let start = left.start();
    let end = regex.end();
    Node::Regexp(Regexp {
        base: Box::new(left),
        regex: Box::new(regex),
        pos: PositionRange::new(start, end),
    })
}

fn base_allows_bits(node: &Node) -> bool {
    matches!(
        node,
        Node::UintType(_) | Node::BstrType(_) | Node::BytesType(_)
    )
}

fn led_bits(p: &mut Parser, left: Node) -> Node {
    let prec = p.current.tok.precedence();
    let mut left = left;
    if !base_allows_bits(&left) {
        let range = left.range();
        p.error(range, ".bits may only apply to uint, bstr or bytes");
        left = p.bad_node(Some(left), "bits base", range);
    }
    p.next();
    let constraint = Box::new(p.parse_entry(prec));
    let start = left.start();
    let end = constraint.end();
    Node::Bits(Bits {
        base: Box::new(left),
        constraint,
        pos: PositionRange::new(start, end),
    })
}

fn is_numeric_like(node: &Node) -> bool {
    matches!(
        node,
        Node::UintType(_)
            | Node::IntegerType(_)
            | Node::NegativeIntegerType(_)
            | Node::FloatType(_)
            | Node::IntegerLiteral(_)
            | Node::UintLiteral(_)
            | Node::FloatLiteral(_)
            | Node::Identifier(_)
    )
}

fn led_comparator(p: &mut Parser, left: Node, op: ComparatorOp) -> Node {
    let prec = p.current.tok.precedence();
    let mut left = left;
    if !is_numeric_like(&left) {
        let range = left.range();
        p.error(range, "comparator control operators require a numeric operand");
        left = p.bad_node(Some(left), "comparator left operand", range);
    }
    p.next();
    if !p.current.tok.is_numeric() {
        let range = p.current_range();
        let lit = p.current.lit.clone();
        p.error(range, format!("expected a numeric literal after comparator, found '{lit}'"));
    }
    let right = Box::new(p.parse_entry(prec));
    let start = left.start();
    let end = right.end();
    Node::ComparatorOpControl(ComparatorOpControl {
        op,
        left: Box::new(left),
        right,
        pos: PositionRange::new(start, end),
    })
}

fn led_generic_control_op(p: &mut Parser, left: Node) -> Node {
    let op_name = p.current.tok.canonical().to_string();
    let prec = p.current.tok.precedence();
    p.next();
    let arg = Box::new(p.parse_entry(prec));
    let start = left.start();
    let end = arg.end();
    Node::ControlOperator(ControlOperator {
        op: op_name,
        base: Box::new(left),
        arg,
        pos: PositionRange::new(start, end),
    })
}

fn literal_kind(node: &Node) -> Option<&'static str> {
    match node {
        Node::IntegerLiteral(_) | Node::UintLiteral(_) => Some("int"),
        Node::FloatLiteral(_) => Some("float"),
        _ => None,
    }
}

fn led_range(p: &mut Parser, left: Node, inclusive: bool) -> Node {
    let prec = p.current.tok.precedence();
    p.next();
    let mut to = p.parse_entry(prec);
    let start = left.start();

    match (literal_kind(&left), literal_kind(&to)) {
        (Some(a), Some(b)) if a != b => {
            let range = to.range();
            p.error(
                range,
                format!("cannot use {b} literal as upper bound to {a} range"),
            );
            to = p.bad_node(Some(to), "range bound", range);
        }
        _ => {}
    }

    let from_name = match &left {
        Node::Identifier(i) => Some(i.name.clone()),
        _ => None,
    };
    let to_name = match &to {
        Node::Identifier(i) => Some(i.name.clone()),
        _ => None,
    };
    if from_name.is_some() || to_name.is_some() {
        let range = PositionRange::new(start, to.end());
        p.schedule_range_kind_check(from_name, to_name, range);
    }

    let end = to.end();
    Node::Range(Range {
        from: Box::new(left),
        to: Box::new(to),
        inclusive,
        pos: PositionRange::new(start, end),
    })
}

fn led_occurrence(p: &mut Parser, left: Node) -> Node {
    let start = left.start();
    p.next();
    let m = if matches!(p.current.tok, Token::Int) && p.current.tok.is_literal(&p.current.lit) {
        let range = p.current_range();
        let value: u64 = p.current.lit.parse().unwrap_or(0);
        p.next();
        Some(Box::new(Node::UintLiteral(UintLiteral { value, pos: range })))
    } else {
        None
    };
    let item = Box::new(p.parse_entry(Token::Optional.precedence()));
    let end = item.end();

    let n_negative = matches!(&left, Node::IntegerLiteral(l) if l.value < 0);
    if n_negative {
        let range = left.range();
        p.error(range, "occurrence lower bound must not be negative");
    }

    Node::NMOccurrence(NMOccurrence {
        n: Box::new(left),
        m,
        item,
        pos: PositionRange::new(start, end),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Node, Vec<Diagnostic>) {
        Parser::new(src).parse_file()
    }

    fn rules(node: &Node) -> &[Node] {
        match node {
            Node::Cddl(c) => &c.rules,
            _ => panic!("expected Cddl"),
        }
    }

    #[test]
    fn simple_integer_rule_has_no_diagnostics() {
        let (ast, diags) = parse("min-age = 18");
        assert!(diags.is_empty());
        let rs = rules(&ast);
        assert_eq!(rs.len(), 1);
        match &rs[0] {
            Node::Rule(r) => {
                assert!(matches!(r.name.as_ref(), Node::Identifier(i) if i.name == "min-age"));
                assert!(matches!(*r.value, Node::IntegerLiteral(ref l) if l.value == 18));
            }
            _ => panic!("expected Rule"),
        }
    }

    #[test]
    fn nm_occurrence_with_defined_byte_resolves() {
        let src = "byte = uint .size 1\npublic-key = [24*24 byte]";
        let (_ast, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn duplicate_rule_name_is_reported() {
        let (_ast, diags) = parse("a = 1\na = 2");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("already exists"));
    }

    #[test]
    fn type_choice_chains_three_text_literals() {
        let (ast, diags) = parse(r#"choice = "bow tie" / "necktie" / "Internet attire""#);
        assert!(diags.is_empty());
        let rs = rules(&ast);
        match &rs[0] {
            Node::Rule(r) => assert!(matches!(*r.value, Node::TypeChoice(_))),
            _ => panic!("expected Rule"),
        }
    }

    #[test]
    fn bare_hash_is_a_wildcard_tag_with_no_diagnostics() {
        let (ast, diags) = parse("tag = #");
        assert!(diags.is_empty());
        let rs = rules(&ast);
        match &rs[0] {
            Node::Rule(r) => match r.value.as_ref() {
                Node::Tag(t) => {
                    assert!(t.major.is_none());
                    assert!(t.item.is_none());
                }
                other => panic!("expected Tag, got {other:?}"),
            },
            _ => panic!("expected Rule"),
        }
    }

    #[test]
    fn unresolved_identifier_is_a_deferred_diagnostic() {
        let (_ast, diags) = parse("thing = missing-name");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("never declared"));
    }

    #[test]
    fn adult_group_combines_unwrap_and_range_entry() {
        let src = "adult = (~person, age: min-age .. max-age)\nperson = int\nmin-age = 18\nmax-age = 120";
        let (ast, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        let rs = rules(&ast);
        match &rs[0] {
            Node::Rule(r) => match r.value.as_ref() {
                Node::Group(g) => {
                    assert_eq!(g.entries.len(), 2);
                    assert!(matches!(g.entries[0], Node::Unwrap(_)));
                    match &g.entries[1] {
                        Node::Entry(e) => assert!(matches!(*e.value, Node::Range(_))),
                        other => panic!("expected Entry, got {other:?}"),
                    }
                }
                other => panic!("expected Group, got {other:?}"),
            },
            _ => panic!("expected Rule"),
        }
    }

    #[test]
    fn range_with_mismatched_bound_kinds_is_reported() {
        let (_ast, diags) = parse("range = 0..10.0");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("cannot use float literal as upper bound"));
    }

    #[test]
    fn consecutive_same_column_comments_form_a_comment_group() {
        let src = "; first\n; second\na = 1";
        let (ast, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        let rs = rules(&ast);
        assert!(matches!(rs[0], Node::CommentGroup(ref g) if g.comments.len() == 2));
    }

    #[test]
    fn comments_separated_by_a_blank_line_stay_separate() {
        let src = "; first\n\n; second\na = 1";
        let (ast, _diags) = parse(src);
        let rs = rules(&ast);
        assert!(matches!(rs[0], Node::Comment(_)));
        assert!(matches!(rs[1], Node::Comment(_)));
    }

    #[test]
    fn never_panics_on_arbitrary_input() {
        for src in ["", "=", "}}}", "1..2..3", "\"unterminated"] {
            let _ = parse(src);
        }
    }

    proptest::proptest! {
        #[test]
        fn never_panics_on_arbitrary_bytes(bytes: Vec<u8>) {
            if let Ok(src) = String::from_utf8(bytes) {
                let _ = parse(&src);
            }
        }
    }
}
