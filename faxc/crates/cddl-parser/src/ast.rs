//! The CDDL abstract syntax tree.
//!
//! Every producible shape is a variant of the single [`Node`] enum rather
//! than an open trait object: the grammar's two membership sets —
//! `CDDLEntry` (top-level: rules and comments) and `GroupEntry` (inside a
//! group/map/array) — are enforced by which variants the parser is willing
//! to place there, not by a separate marker trait.

use cddl_util::position::PositionRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafType {
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub value: i64,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UintLiteral {
    pub value: u64,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub value: f64,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLiteral {
    pub value: String,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub pos: PositionRange,
}

impl Identifier {
    /// A socket name references a type hole meant to be plugged in by an
    /// extension file, e.g. `$my-extension-point`.
    pub fn is_socket(&self) -> bool {
        self.name.starts_with('$') && !self.name.starts_with("$$")
    }

    /// A plug supplies a value for a group socket, e.g. `$$my-plug`.
    pub fn is_plug(&self) -> bool {
        self.name.starts_with("$$")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub entries: Vec<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub value: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeChoice {
    pub first: Box<Node>,
    pub second: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupChoice {
    pub first: Box<Node>,
    pub second: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub from: Box<Node>,
    pub to: Box<Node>,
    pub inclusive: bool,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optional {
    pub item: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NMOccurrence {
    pub n: Box<Node>,
    pub m: Option<Box<Node>>,
    pub item: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unwrap {
    pub item: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub major: Option<Box<Node>>,
    pub tag_number: Option<Box<Node>>,
    pub item: Option<Box<Node>>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeOperatorControl {
    pub base: Box<Node>,
    pub size: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bits {
    pub base: Box<Node>,
    pub constraint: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Regexp {
    pub base: Box<Node>,
    pub regex: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparatorOpControl {
    pub op: ComparatorOp,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub pos: PositionRange,
}

/// Any RFC 9165 control operator without a dedicated node shape
/// (`.cbor`, `.cborseq`, `.within`, `.and`, `.default`, `.plus`, `.cat`,
/// `.det`, `.abnf`, `.abnfb`, `.feature`): the operator's canonical
/// spelling plus its base and argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlOperator {
    pub op: String,
    pub base: Box<Node>,
    pub arg: Box<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: Box<Node>,
    pub value: Box<Node>,
    pub trailing_comment: Option<Box<Node>>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: Box<Node>,
    pub value: Box<Node>,
    pub trailing_comment: Option<Box<Node>>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cddl {
    pub rules: Vec<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentGroup {
    pub comments: Vec<Node>,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadNode {
    pub base: Option<Box<Node>>,
    pub offending_token: String,
    pub pos: PositionRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    BooleanType(LeafType),
    UintType(LeafType),
    IntegerType(LeafType),
    NegativeIntegerType(LeafType),
    FloatType(LeafType),
    TstrType(LeafType),
    BstrType(LeafType),
    BytesType(LeafType),
    NullType(LeafType),
    AnyType(LeafType),

    BooleanLiteral(BooleanLiteral),
    IntegerLiteral(IntegerLiteral),
    UintLiteral(UintLiteral),
    FloatLiteral(FloatLiteral),
    TextLiteral(TextLiteral),

    Identifier(Identifier),

    Group(Group),
    Map(Group),
    Array(Group),
    Enumeration(Enumeration),

    TypeChoice(TypeChoice),
    GroupChoice(GroupChoice),
    Range(Range),
    Optional(Optional),
    NMOccurrence(NMOccurrence),
    Unwrap(Unwrap),
    Tag(Tag),

    SizeOperatorControl(SizeOperatorControl),
    Bits(Bits),
    Regexp(Regexp),
    ComparatorOpControl(ComparatorOpControl),
    ControlOperator(ControlOperator),

    Entry(Entry),
    Rule(Rule),
    Cddl(Cddl),
    Comment(Comment),
    CommentGroup(CommentGroup),
    BadNode(BadNode),
}

impl Node {
    pub fn range(&self) -> PositionRange {
        use Node::*;
        match self {
            BooleanType(n) | UintType(n) | IntegerType(n) | NegativeIntegerType(n)
            | FloatType(n) | TstrType(n) | BstrType(n) | BytesType(n) | NullType(n)
            | AnyType(n) => n.pos,
            BooleanLiteral(n) => n.pos,
            IntegerLiteral(n) => n.pos,
            UintLiteral(n) => n.pos,
            FloatLiteral(n) => n.pos,
            TextLiteral(n) => n.pos,
            Identifier(n) => n.pos,
            Group(n) | Map(n) | Array(n) => n.pos,
            Enumeration(n) => n.pos,
            TypeChoice(n) => n.pos,
            GroupChoice(n) => n.pos,
            Range(n) => n.pos,
            Optional(n) => n.pos,
            NMOccurrence(n) => n.pos,
            Unwrap(n) => n.pos,
            Tag(n) => n.pos,
            SizeOperatorControl(n) => n.pos,
            Bits(n) => n.pos,
            Regexp(n) => n.pos,
            ComparatorOpControl(n) => n.pos,
            ControlOperator(n) => n.pos,
            Entry(n) => n.pos,
            Rule(n) => n.pos,
            Cddl(n) => n.pos,
            Comment(n) => n.pos,
            CommentGroup(n) => n.pos,
            BadNode(n) => n.pos,
        }
    }

    pub fn start(&self) -> cddl_util::position::Position {
        self.range().start
    }

    pub fn end(&self) -> cddl_util::position::Position {
        self.range().end
    }

    /// The node's children in the deterministic order the visitor protocol
    /// must traverse them.
    pub fn children(&self) -> Vec<&Node> {
        use Node::*;
        match self {
            Cddl(n) => n.rules.iter().collect(),
            Rule(n) => {
                let mut v = vec![n.name.as_ref(), n.value.as_ref()];
                if let Some(c) = &n.trailing_comment {
                    v.push(c.as_ref());
                }
                v
            }
            Entry(n) => {
                let mut v = vec![n.name.as_ref(), n.value.as_ref()];
                if let Some(c) = &n.trailing_comment {
                    v.push(c.as_ref());
                }
                v
            }
            Group(n) | Map(n) | Array(n) => n.entries.iter().collect(),
            Range(n) => vec![n.from.as_ref(), n.to.as_ref()],
            TypeChoice(n) => vec![n.first.as_ref(), n.second.as_ref()],
            GroupChoice(n) => vec![n.first.as_ref(), n.second.as_ref()],
            Tag(n) => {
                let mut v = Vec::new();
                if let Some(m) = &n.major {
                    v.push(m.as_ref());
                }
                if let Some(t) = &n.tag_number {
                    v.push(t.as_ref());
                }
                if let Some(i) = &n.item {
                    v.push(i.as_ref());
                }
                v
            }
            NMOccurrence(n) => {
                let mut v = vec![n.n.as_ref()];
                if let Some(m) = &n.m {
                    v.push(m.as_ref());
                }
                v.push(n.item.as_ref());
                v
            }
            SizeOperatorControl(n) => vec![n.base.as_ref(), n.size.as_ref()],
            Regexp(n) => vec![n.base.as_ref(), n.regex.as_ref()],
            ComparatorOpControl(n) => vec![n.left.as_ref(), n.right.as_ref()],
            ControlOperator(n) => vec![n.base.as_ref(), n.arg.as_ref()],
            Optional(n) => vec![n.item.as_ref()],
            Unwrap(n) => vec![n.item.as_ref()],
            Enumeration(n) => vec![n.value.as_ref()],
            Bits(n) => vec![n.base.as_ref(), n.constraint.as_ref()],
            CommentGroup(n) => n.comments.iter().collect(),
            BadNode(n) => n.base.as_deref().into_iter().collect(),
            // Leaves: literals, identifiers, type keywords, comments.
            _ => Vec::new(),
        }
    }
}

/// The two-call visitor protocol: `visit(Some(node))` on entry (returning
/// `false` skips that node's children), then `visit(None)` once its
/// subtree has been fully walked.
pub trait Visitor {
    fn visit(&mut self, node: Option<&Node>) -> bool;
}

pub fn walk<V: Visitor>(visitor: &mut V, node: &Node) {
    if !visitor.visit(Some(node)) {
        return;
    }
    for child in node.children() {
        walk(visitor, child);
    }
    visitor.visit(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cddl_util::position::Position;

    fn p() -> PositionRange {
        PositionRange::new(Position::new(0, 0, 1, 1), Position::new(0, 1, 1, 2))
    }

    #[test]
    fn socket_and_plug_detection() {
        let socket = Identifier {
            name: "$hole".into(),
            pos: p(),
        };
        let plug = Identifier {
            name: "$$fill".into(),
            pos: p(),
        };
        assert!(socket.is_socket());
        assert!(!socket.is_plug());
        assert!(plug.is_plug());
        assert!(!plug.is_socket());
    }

    #[test]
    fn range_children_are_from_then_to() {
        let from = Node::IntegerLiteral(IntegerLiteral { value: 1, pos: p() });
        let to = Node::IntegerLiteral(IntegerLiteral { value: 2, pos: p() });
        let range = Node::Range(Range {
            from: Box::new(from),
            to: Box::new(to),
            inclusive: true,
            pos: p(),
        });
        let children = range.children();
        assert_eq!(children.len(), 2);
    }

    struct CountingVisitor {
        visits: usize,
        exits: usize,
    }

    impl Visitor for CountingVisitor {
        fn visit(&mut self, node: Option<&Node>) -> bool {
            match node {
                Some(_) => {
                    self.visits += 1;
                    true
                }
                None => {
                    self.exits += 1;
                    true
                }
            }
        }
    }

    #[test]
    fn walk_visits_every_node_and_exits_each_once() {
        let rule = Node::Rule(Rule {
            name: Box::new(Node::Identifier(Identifier {
                name: "age".into(),
                pos: p(),
            })),
            value: Box::new(Node::IntegerLiteral(IntegerLiteral { value: 1, pos: p() })),
            trailing_comment: None,
            pos: p(),
        });
        let cddl = Node::Cddl(Cddl {
            rules: vec![rule],
            pos: p(),
        });
        let mut visitor = CountingVisitor { visits: 0, exits: 0 };
        walk(&mut visitor, &cddl);
        // cddl, rule, name, value = 4 nodes
        assert_eq!(visitor.visits, 4);
        assert_eq!(visitor.exits, 4);
    }
}
