// root ::= (statement? separator)*
// statement ::= 'script' name param* body
//             | 'if' expr body ('else' 'if' expr body)* ('else' body)?
//             | 'while' body
//             | 'random' '{' (integer body)+ '}'
//             | 'break'
//             | 'return' param*
//             | target '=' super_expr
//             | super_expr
// body ::= '{' (statement? separator)* '}'
// param ::= target '=' super_expr | expr
// super_expr ::= operation | expr
// operation ::= super_expr op expr
// expr ::= '<' '...' '>' | '<' expr '>' | '-' number | '!' expr
//        | name param* | integer | float | string
//        | '(' number ',' number (',' number)? ')' | '(' super_expr ')'
//        | '[' element* ']' | '{' element* '}'
//        | expr ('.' | ':' | 'and' | 'or') expr
//        | expr ('+=' | '-=' | '*=' | '/=') super_expr
// name ::= identifier | hash

/// A node of the syntax tree. Nodes are created once by the parser and never
/// mutated afterwards; each one is owned by exactly one parent.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Root(Vec<Node>),
    Assignment {
        name: Box<Node>,
        value: Box<Node>,
    },
    /// `x += y` and friends. Lowered into `x = (x + y)` at generation.
    CompoundAssignment {
        op: CompoundOperator,
        name: Box<Node>,
        value: Box<Node>,
    },
    Invocation {
        target: Box<Node>,
        params: Vec<Node>,
    },
    Script {
        name: Box<Node>,
        defaults: Vec<Node>,
        body: Vec<Node>,
    },
    WhileLoop(Vec<Node>),
    /// `conditions[i]` guards `bodies[i]`. A trailing body without a
    /// condition is the `else` arm.
    IfStatement {
        conditions: Vec<Node>,
        bodies: Vec<Vec<Node>>,
    },
    LocalReference(Box<Node>),
    /// `<...>`, passes every argument of the enclosing script along.
    AllArguments,
    Checksum(ChecksumValue),
    Integer(String),
    Float(String),
    String(String),
    Binary {
        op: BinaryOperator,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    /// Parenthesized expression.
    UnaryExpression(Box<Node>),
    LogicalNot(Box<Node>),
    Pair(Box<Node>, Box<Node>),
    Vector(Box<Node>, Box<Node>, Box<Node>),
    Struct(Vec<Node>),
    Array(Vec<Node>),
    Random {
        weights: Vec<Node>,
        branches: Vec<Vec<Node>>,
    },
    Break,
    Return(Vec<Node>),
    Comma,
    NewLine,
}

impl Node {
    pub fn name(text: impl Into<String>) -> Node {
        Node::Checksum(ChecksumValue::Name(text.into()))
    }

    pub fn is_new_line(&self) -> bool {
        matches!(self, Node::NewLine)
    }
}

/// Either symbolic text, hashed at generation time, or a hash literal whose
/// original text is unknown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChecksumValue {
    Name(String),
    /// Little-endian bytes of a `#xxxxxxxx` literal.
    Raw([u8; 4]),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    Equals,
    /// `a.b`
    Dot,
    /// `a:b`
    Colon,
    And,
    Or,
    /// Lowered into `!(a == b)`.
    NotEquals,
    /// Lowered into `!(a > b)`.
    LessEquals,
    /// Lowered into `!(a < b)`.
    GreaterEquals,
}

impl BinaryOperator {
    /// The operator a derived comparison negates, if any.
    pub fn negated_comparison(self) -> Option<BinaryOperator> {
        match self {
            BinaryOperator::NotEquals => Some(BinaryOperator::Equals),
            BinaryOperator::LessEquals => Some(BinaryOperator::Greater),
            BinaryOperator::GreaterEquals => Some(BinaryOperator::Less),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompoundOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl From<CompoundOperator> for BinaryOperator {
    fn from(value: CompoundOperator) -> Self {
        match value {
            CompoundOperator::Add => BinaryOperator::Add,
            CompoundOperator::Sub => BinaryOperator::Sub,
            CompoundOperator::Mul => BinaryOperator::Mul,
            CompoundOperator::Div => BinaryOperator::Div,
        }
    }
}
