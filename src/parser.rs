use std::fmt;

use crate::{
    ast::{BinaryOperator, ChecksumValue, CompoundOperator, Node},
    token::{Token, TokenKind},
};

pub mod memo;

#[cfg(test)]
mod tests;

use memo::{Key, Lookup, Memo, Production};

type Result<T, E = Miss> = std::result::Result<T, E>;

/// Parses a full token stream into a [`Node::Root`].
///
/// Fails only if the root production cannot consume every token.
pub fn parse(tokens: &[Token]) -> Result<Node, Error> {
    let mut p = Parser::new(tokens);
    let (body, next) = p.statements(0, None);
    let stats = p.memo.stats();
    log::trace!(
        "memo: {} hits, {} re-entries, {} cached results",
        stats.hits,
        stats.reentries,
        stats.cached,
    );

    if next < tokens.len() {
        return Err(Error {
            index: next,
            remaining: tokens[next..].to_vec(),
            reason: p.furthest,
        });
    }
    log::debug!(
        "parsed {} statements from {} tokens",
        body.iter().filter(|node| !node.is_new_line()).count(),
        tokens.len(),
    );
    Ok(Node::Root(body))
}

/// A successful match: the node and the index of the first token after it.
#[derive(Clone, Debug)]
struct Parsed {
    node: Node,
    next: usize,
}

impl Parsed {
    fn new(node: Node, next: usize) -> Parsed {
        Parsed { node, next }
    }
}

struct Parser<'tok> {
    tokens: &'tok [Token],
    memo: Memo<Result<Parsed>>,
    /// The miss that happened furthest into the token stream.
    furthest: Option<Miss>,
}

impl Parser<'_> {
    /// Parses `(statement? separator)*` until `closer` or the end of input.
    /// Never fails; the caller decides what to do with the stopping point.
    fn statements(&mut self, mut i: usize, closer: Option<TokenKind>) -> (Vec<Node>, usize) {
        let mut body = Vec::new();
        while let Some(token) = self.tokens.get(i) {
            if Some(token.kind) == closer {
                break;
            }
            if token.is_separator() {
                if !body.last().is_some_and(Node::is_new_line) {
                    body.push(Node::NewLine);
                }
                i += 1;
                continue;
            }
            let Ok(statement) = self.statement(i) else {
                break;
            };
            body.push(statement.node);
            i = statement.next;
            if !self.at_statement_end(i, closer) {
                self.miss(i, Reason::ExpectedSeparator);
                break;
            }
        }
        (body, i)
    }

    fn at_statement_end(&self, i: usize, closer: Option<TokenKind>) -> bool {
        match self.tokens.get(i) {
            None => true,
            Some(token) => token.is_separator() || Some(token.kind) == closer,
        }
    }

    fn statement(&mut self, i: usize) -> Result<Parsed> {
        let token = self.peek(i, Reason::ExpectedStatement)?;
        match token.kind {
            TokenKind::Script => self.script(i),
            TokenKind::If => self.if_statement(i),
            TokenKind::While => self.while_loop(i),
            TokenKind::Random => self.random(i),
            TokenKind::Break => Ok(Parsed::new(Node::Break, i + 1)),
            TokenKind::Return => {
                let (params, next) = self.params(i + 1);
                Ok(Parsed::new(Node::Return(params), next))
            }
            _ => self
                .assignment(i, true)
                .or_else(|_| self.super_expression(i, true)),
        }
    }

    /// `script name params { body }`. Parameters follow the invocation
    /// rules, so a trailing struct default may have to give its braces back
    /// to the body.
    fn script(&mut self, i: usize) -> Result<Parsed> {
        let i = self.consume(i, TokenKind::Script)?;
        let name = self.name(i)?;
        let (params, next) = self.params(name.next);
        let head = Parsed::new(
            Node::Invocation {
                target: Box::new(name.node),
                params,
            },
            next,
        );
        let (head, body, next) = self.body_after(head)?;
        let (name, defaults) = match head {
            Node::Invocation { target, params } => (target, params),
            other => (Box::new(other), Vec::new()),
        };
        let script = Node::Script {
            name,
            defaults,
            body,
        };
        Ok(Parsed::new(script, next))
    }

    fn if_statement(&mut self, i: usize) -> Result<Parsed> {
        let mut next = self.consume(i, TokenKind::If)?;
        let mut conditions = Vec::new();
        let mut bodies = Vec::new();
        loop {
            let condition = self.super_expression(next, true)?;
            let (condition, body, after) = self.body_after(condition)?;
            conditions.push(condition);
            bodies.push(body);
            next = after;

            let Some(else_at) = self.else_ahead(next) else {
                break;
            };
            next = else_at + 1;
            if self.is(next, TokenKind::If) {
                next += 1;
                continue;
            }
            let (body, after) = self.body(next)?;
            bodies.push(body);
            next = after;
            break;
        }
        let node = Node::IfStatement { conditions, bodies };
        Ok(Parsed::new(node, next))
    }

    /// Finds an `else` after the current position, possibly on a later line.
    fn else_ahead(&self, mut i: usize) -> Option<usize> {
        while self.tokens.get(i).is_some_and(Token::is_separator) {
            i += 1;
        }
        self.is(i, TokenKind::Else).then_some(i)
    }

    fn while_loop(&mut self, i: usize) -> Result<Parsed> {
        let i = self.consume(i, TokenKind::While)?;
        let (body, next) = self.body(i)?;
        Ok(Parsed::new(Node::WhileLoop(body), next))
    }

    /// `random { weight { body } ... }`
    fn random(&mut self, i: usize) -> Result<Parsed> {
        let i = self.consume(i, TokenKind::Random)?;
        let mut next = self.consume(i, TokenKind::LBrace)?;
        let mut weights = Vec::new();
        let mut branches = Vec::new();
        loop {
            while self.tokens.get(next).is_some_and(Token::is_separator) {
                next += 1;
            }
            if self.is(next, TokenKind::RBrace) {
                break;
            }
            let weight = self.peek(next, Reason::ExpectedWeight)?;
            if !weight.is(TokenKind::Integer) {
                return Err(self.miss(next, Reason::ExpectedWeight));
            }
            weights.push(Node::Integer(weight.text.clone()));
            let (body, after) = self.body(next + 1)?;
            branches.push(body);
            next = after;
        }
        if branches.is_empty() {
            return Err(self.miss(next, Reason::EmptyRandom));
        }
        let next = self.consume(next, TokenKind::RBrace)?;
        Ok(Parsed::new(Node::Random { weights, branches }, next))
    }

    /// `{ statements }`
    fn body(&mut self, i: usize) -> Result<(Vec<Node>, usize)> {
        let i = self.consume(i, TokenKind::LBrace)?;
        let (body, next) = self.statements(i, Some(TokenKind::RBrace));
        let next = self.consume(next, TokenKind::RBrace)?;
        Ok((body, next))
    }

    /// Parses the body that must follow `head`. If `head` ends with a struct
    /// literal and no body follows, the literal was the body: it is detached
    /// and its braces are reparsed as one.
    fn body_after(&mut self, head: Parsed) -> Result<(Node, Vec<Node>, usize)> {
        if !self.is(head.next, TokenKind::LBrace) {
            if let Some(detached) = detach_trailing_struct(self.tokens, &head) {
                let (body, next) = self.body(detached.next)?;
                return Ok((detached.node, body, next));
            }
        }
        let (body, next) = self.body(head.next)?;
        Ok((head.node, body, next))
    }

    /// Greedily parses invocation parameters until one fails to parse.
    ///
    /// A parameter may not start with `-`, so that `(a - 1)` stays an
    /// operation; negative positional literals must be parenthesized.
    fn params(&mut self, mut i: usize) -> (Vec<Node>, usize) {
        let mut params = Vec::new();
        while self.tokens.get(i).is_some_and(|t| !t.is(TokenKind::Minus)) {
            let Ok(param) = self.param(i) else {
                break;
            };
            params.push(param.node);
            i = param.next;
        }
        (params, i)
    }

    /// `name = value` or a plain expression, both without invocations.
    fn param(&mut self, i: usize) -> Result<Parsed> {
        self.assignment(i, false)
            .or_else(|_| self.expression(i, false))
    }

    fn assignment(&mut self, i: usize, invoke: bool) -> Result<Parsed> {
        let target = if self.is(i, TokenKind::Less) {
            self.local_reference(i)?
        } else {
            self.name(i)?
        };
        let j = self.consume(target.next, TokenKind::Equals)?;
        if self.is(j, TokenKind::Equals) {
            return Err(self.miss(j, Reason::ExpectedExpression));
        }
        let value = self.super_expression(j, invoke)?;
        let node = Node::Assignment {
            name: Box::new(target.node),
            value: Box::new(value.node),
        };
        Ok(Parsed::new(node, value.next))
    }

    /// The longer of an operation and a plain expression starting at `i`.
    fn super_expression(&mut self, i: usize, invoke: bool) -> Result<Parsed> {
        let key = Key::new(Production::SuperExpression, invoke, i);
        self.memoized(key, |p| {
            let operation = p.operation(i, invoke);
            let expression = p.expression(i, invoke);
            match (operation, expression) {
                (Ok(op), Ok(expr)) if expr.next > op.next => Ok(expr),
                (Ok(op), _) => Ok(op),
                (Err(_), expr) => expr,
            }
        })
    }

    /// `operation op sub_expression | sub_expression op sub_expression`.
    /// Left recursive: grown from the seed until it stops consuming tokens.
    fn operation(&mut self, i: usize, invoke: bool) -> Result<Parsed> {
        let key = Key::new(Production::Operation, invoke, i);
        self.grown(key, |p| {
            let lhs = p
                .operation(i, invoke)
                .or_else(|_| p.sub_expression(i, invoke))?;
            let (op, j) = p.operator(lhs.next)?;
            let rhs = p.sub_expression(j, invoke)?;
            let node = Node::Binary {
                op,
                lhs: Box::new(lhs.node),
                rhs: Box::new(rhs.node),
            };
            Ok(Parsed::new(node, rhs.next))
        })
    }

    /// An operand of an operation.
    fn sub_expression(&mut self, i: usize, invoke: bool) -> Result<Parsed> {
        let key = Key::new(Production::SubExpression, invoke, i);
        self.memoized(key, |p| p.expression(i, invoke))
    }

    fn operator(&mut self, i: usize) -> Result<(BinaryOperator, usize)> {
        use BinaryOperator::*;
        let token = self.peek(i, Reason::ExpectedOperator)?;
        let followed_by_equals = self.is(i + 1, TokenKind::Equals);
        let op = match (token.kind, followed_by_equals) {
            // `+=` and friends are compound assignments, not operators.
            (TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash, true) => {
                return Err(self.miss(i, Reason::ExpectedOperator));
            }
            (TokenKind::Plus, false) => (Add, i + 1),
            (TokenKind::Minus, false) => (Sub, i + 1),
            (TokenKind::Star, false) => (Mul, i + 1),
            (TokenKind::Slash, false) => (Div, i + 1),
            (TokenKind::Less, true) => (LessEquals, i + 2),
            (TokenKind::Less, false) => (Less, i + 1),
            (TokenKind::Greater, true) => (GreaterEquals, i + 2),
            (TokenKind::Greater, false) => (Greater, i + 1),
            (TokenKind::Equals, true) => (Equals, i + 2),
            (TokenKind::Equals, false) => (Equals, i + 1),
            (TokenKind::Bang, true) => (NotEquals, i + 2),
            _ => return Err(self.miss(i, Reason::ExpectedOperator)),
        };
        Ok(op)
    }

    fn expression(&mut self, i: usize, invoke: bool) -> Result<Parsed> {
        let key = Key::new(Production::Expression, invoke, i);
        self.memoized(key, |p| {
            let primary = p.primary(i, invoke)?;
            Ok(p.trailer(primary, invoke))
        })
    }

    fn primary(&mut self, i: usize, invoke: bool) -> Result<Parsed> {
        let token = self.peek(i, Reason::ExpectedExpression)?;
        match token.kind {
            TokenKind::Less => self.local_reference(i),
            TokenKind::Minus => match self.number(i) {
                Some(number) => Ok(number),
                None => Err(self.miss(i, Reason::ExpectedExpression)),
            },
            TokenKind::Bang => {
                let inner = self.expression(i + 1, invoke)?;
                Ok(Parsed::new(Node::LogicalNot(Box::new(inner.node)), inner.next))
            }
            TokenKind::Identifier | TokenKind::Hash => {
                let name = self.name(i)?;
                if invoke {
                    let (params, next) = self.params(name.next);
                    if !params.is_empty() {
                        let invocation = Node::Invocation {
                            target: Box::new(name.node),
                            params,
                        };
                        return Ok(Parsed::new(invocation, next));
                    }
                }
                Ok(name)
            }
            TokenKind::Integer => Ok(Parsed::new(Node::Integer(token.text.clone()), i + 1)),
            TokenKind::Float => Ok(Parsed::new(Node::Float(token.text.clone()), i + 1)),
            TokenKind::String => Ok(Parsed::new(Node::String(token.text.clone()), i + 1)),
            TokenKind::LParen => self.parenthesized(i),
            TokenKind::LBracket => self.array(i),
            TokenKind::LBrace => self.structure(i),
            _ => Err(self.miss(i, Reason::ExpectedExpression)),
        }
    }

    /// Dotted or colon access, `and`/`or`, and compound assignment. A trailer
    /// whose right-hand side fails to parse is simply not part of `lhs`.
    fn trailer(&mut self, lhs: Parsed, invoke: bool) -> Parsed {
        let j = lhs.next;
        let Some(kind) = self.tokens.get(j).map(|t| t.kind) else {
            return lhs;
        };
        let compound = match kind {
            TokenKind::Plus => Some(CompoundOperator::Add),
            TokenKind::Minus => Some(CompoundOperator::Sub),
            TokenKind::Star => Some(CompoundOperator::Mul),
            TokenKind::Slash => Some(CompoundOperator::Div),
            _ => None,
        };
        if let Some(op) = compound {
            if !self.is(j + 1, TokenKind::Equals) {
                return lhs;
            }
            let Ok(value) = self.super_expression(j + 2, invoke) else {
                return lhs;
            };
            let node = Node::CompoundAssignment {
                op,
                name: Box::new(lhs.node),
                value: Box::new(value.node),
            };
            return Parsed::new(node, value.next);
        }

        let (op, rhs_invoke) = match kind {
            TokenKind::Dot => (BinaryOperator::Dot, false),
            TokenKind::Colon => (BinaryOperator::Colon, false),
            TokenKind::And => (BinaryOperator::And, invoke),
            TokenKind::Or => (BinaryOperator::Or, invoke),
            _ => return lhs,
        };
        let Ok(rhs) = self.expression(j + 1, rhs_invoke) else {
            return lhs;
        };
        let node = Node::Binary {
            op,
            lhs: Box::new(lhs.node),
            rhs: Box::new(rhs.node),
        };
        Parsed::new(node, rhs.next)
    }

    /// `<...>` or `<expr>`.
    fn local_reference(&mut self, i: usize) -> Result<Parsed> {
        let i = self.consume(i, TokenKind::Less)?;
        let ellipsis = [
            TokenKind::Dot,
            TokenKind::Dot,
            TokenKind::Dot,
            TokenKind::Greater,
        ];
        if ellipsis.iter().enumerate().all(|(k, kind)| self.is(i + k, *kind)) {
            return Ok(Parsed::new(Node::AllArguments, i + ellipsis.len()));
        }
        let inner = self.expression(i, false)?;
        let next = self.consume(inner.next, TokenKind::Greater)?;
        Ok(Parsed::new(Node::LocalReference(Box::new(inner.node)), next))
    }

    /// An integer or float literal, with a leading `-` folded into its text.
    fn number(&self, i: usize) -> Option<Parsed> {
        let (negative, j) = if self.is(i, TokenKind::Minus) {
            (true, i + 1)
        } else {
            (false, i)
        };
        let token = self.tokens.get(j).filter(|t| t.kind.is_number())?;
        let text = if negative {
            format!("-{}", token.text)
        } else {
            token.text.clone()
        };
        let node = match token.kind {
            TokenKind::Integer => Node::Integer(text),
            _ => Node::Float(text),
        };
        Some(Parsed::new(node, j + 1))
    }

    /// `(a, b)` pair, `(a, b, c)` vector, or `(super_expression)`.
    fn parenthesized(&mut self, i: usize) -> Result<Parsed> {
        let i = self.consume(i, TokenKind::LParen)?;
        if let Some(tuple) = self.tuple(i) {
            return Ok(tuple);
        }
        let inner = self.super_expression(i, true)?;
        let next = self.consume(inner.next, TokenKind::RParen)?;
        Ok(Parsed::new(Node::UnaryExpression(Box::new(inner.node)), next))
    }

    fn tuple(&self, mut i: usize) -> Option<Parsed> {
        let mut elements = Vec::with_capacity(3);
        loop {
            let element = self.number(i)?;
            elements.push(element.node);
            i = element.next;
            if self.is(i, TokenKind::Comma) && elements.len() < 3 {
                i += 1;
                continue;
            }
            break;
        }
        if !self.is(i, TokenKind::RParen) {
            return None;
        }
        let mut elements = elements.into_iter().map(Box::new);
        let node = match (elements.next(), elements.next(), elements.next()) {
            (Some(a), Some(b), None) => Node::Pair(a, b),
            (Some(a), Some(b), Some(c)) => Node::Vector(a, b, c),
            // A single number is a parenthesized expression.
            _ => return None,
        };
        Some(Parsed::new(node, i + 1))
    }

    /// `[ element* ]`
    fn array(&mut self, i: usize) -> Result<Parsed> {
        let i = self.consume(i, TokenKind::LBracket)?;
        let (elements, next) = self.elements(i, TokenKind::RBracket)?;
        Ok(Parsed::new(Node::Array(elements), next))
    }

    /// `{ element* }`
    fn structure(&mut self, i: usize) -> Result<Parsed> {
        let i = self.consume(i, TokenKind::LBrace)?;
        let (elements, next) = self.elements(i, TokenKind::RBrace)?;
        Ok(Parsed::new(Node::Struct(elements), next))
    }

    /// Elements of an array or struct, up to and including `closer`. Commas
    /// and line breaks are kept since they are encoded too.
    fn elements(&mut self, mut i: usize, closer: TokenKind) -> Result<(Vec<Node>, usize)> {
        let mut elements = Vec::new();
        loop {
            let token = self.peek(i, Reason::Expected(closer))?;
            if token.is(closer) {
                return Ok((elements, i + 1));
            }
            if token.is_separator() {
                if !elements.last().is_some_and(Node::is_new_line) {
                    elements.push(Node::NewLine);
                }
                i += 1;
                continue;
            }
            if token.is(TokenKind::Comma) {
                elements.push(Node::Comma);
                i += 1;
                continue;
            }
            let element = self.param(i)?;
            elements.push(element.node);
            i = element.next;
        }
    }

    /// An identifier or a raw hash literal.
    fn name(&mut self, i: usize) -> Result<Parsed> {
        let token = self.peek(i, Reason::ExpectedName)?;
        let value = match token.kind {
            TokenKind::Identifier => ChecksumValue::Name(token.text.clone()),
            TokenKind::Hash => match u32::from_str_radix(&token.text, 16) {
                Ok(hash) => ChecksumValue::Raw(hash.to_le_bytes()),
                Err(_) => return Err(self.miss(i, Reason::ExpectedName)),
            },
            _ => return Err(self.miss(i, Reason::ExpectedName)),
        };
        Ok(Parsed::new(Node::Checksum(value), i + 1))
    }
}

/// Detaches a trailing struct literal from `parsed`, returning the remaining
/// node and the index of the literal's opening brace.
///
/// Applies to invocations (plain, negated, on an assignment's right-hand side
/// or as the last operand of a binary expression) whose last parameter is a
/// struct literal that ends exactly where `parsed` does.
fn detach_trailing_struct(tokens: &[Token], parsed: &Parsed) -> Option<Parsed> {
    let open = matching_open_brace(tokens, parsed.next)?;
    let node = strip_trailing_struct(&parsed.node)?;
    Some(Parsed::new(node, open))
}

fn strip_trailing_struct(node: &Node) -> Option<Node> {
    let stripped = match node {
        Node::Invocation { target, params } => match params.split_last()? {
            (Node::Struct(_), []) => (**target).clone(),
            (Node::Struct(_), rest) => Node::Invocation {
                target: target.clone(),
                params: rest.to_vec(),
            },
            _ => return None,
        },
        Node::LogicalNot(inner) => Node::LogicalNot(Box::new(strip_trailing_struct(inner)?)),
        Node::Assignment { name, value } => Node::Assignment {
            name: name.clone(),
            value: Box::new(strip_trailing_struct(value)?),
        },
        Node::Binary { op, lhs, rhs } => Node::Binary {
            op: *op,
            lhs: lhs.clone(),
            rhs: Box::new(strip_trailing_struct(rhs)?),
        },
        _ => return None,
    };
    Some(stripped)
}

/// Index of the `{` matching the `}` just before `next`.
fn matching_open_brace(tokens: &[Token], next: usize) -> Option<usize> {
    let close = next.checked_sub(1)?;
    if !tokens.get(close)?.is(TokenKind::RBrace) {
        return None;
    }
    let mut depth = 0_usize;
    for (i, token) in tokens[..=close].iter().enumerate().rev() {
        match token.kind {
            TokenKind::RBrace => depth += 1,
            TokenKind::LBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => (),
        }
    }
    None
}

impl<'tok> Parser<'tok> {
    fn new(tokens: &'tok [Token]) -> Parser<'tok> {
        Parser {
            tokens,
            memo: Memo::with_capacity(tokens.len() * 2),
            furthest: None,
        }
    }

    /// Runs `f` once per (production, index), caching the result.
    fn memoized(&mut self, key: Key, f: impl FnOnce(&mut Self) -> Result<Parsed>) -> Result<Parsed> {
        match self.memo.lookup(key) {
            Lookup::Cached(result) => return result,
            Lookup::Reentered(seed) => {
                return seed.unwrap_or_else(|| Err(self.left_recursion(key.index)));
            }
            Lookup::Fresh => (),
        }
        self.memo.enter(key);
        let result = f(self);
        self.memo.leave(key, &result);
        result
    }

    /// Like [`Parser::memoized`], but re-runs `f` with its previous success
    /// planted as the seed for as long as the match keeps growing.
    fn grown(&mut self, key: Key, f: impl Fn(&mut Self) -> Result<Parsed>) -> Result<Parsed> {
        match self.memo.lookup(key) {
            Lookup::Cached(result) => return result,
            Lookup::Reentered(seed) => {
                return seed.unwrap_or_else(|| Err(self.left_recursion(key.index)));
            }
            Lookup::Fresh => (),
        }
        self.memo.enter(key);
        let mut best = f(self);
        while let Ok(seed) = &best {
            let reached = seed.next;
            self.memo.plant_seed(key, best.clone());
            match f(self) {
                Ok(grown) if grown.next > reached => best = Ok(grown),
                _ => break,
            }
        }
        self.memo.leave(key, &best);
        best
    }

    /// Records a miss, keeping track of the furthest one.
    fn miss(&mut self, index: usize, reason: Reason) -> Miss {
        let found = self.tokens.get(index).map(|t| t.kind);
        let miss = Miss {
            index,
            found,
            reason,
        };
        if self.furthest.as_ref().is_none_or(|f| index > f.index) {
            self.furthest = Some(miss.clone());
        }
        miss
    }

    /// A re-entry without a seed. Not recorded as a miss since it says
    /// nothing about the input.
    fn left_recursion(&self, index: usize) -> Miss {
        Miss {
            index,
            found: self.tokens.get(index).map(|t| t.kind),
            reason: Reason::LeftRecursion,
        }
    }

    /// Returns the token at `i`, or a miss with `reason` at the end of input.
    fn peek(&mut self, i: usize, reason: Reason) -> Result<&'tok Token> {
        let tokens = self.tokens;
        match tokens.get(i) {
            Some(token) => Ok(token),
            None => Err(self.miss(i, reason)),
        }
    }

    fn is(&self, i: usize, kind: TokenKind) -> bool {
        self.tokens.get(i).is_some_and(|t| t.is(kind))
    }

    /// Returns the index after the expected token.
    fn consume(&mut self, i: usize, expect: TokenKind) -> Result<usize> {
        if self.is(i, expect) {
            Ok(i + 1)
        } else {
            Err(self.miss(i, Reason::Expected(expect)))
        }
    }
}

/// A production's failure to match. Not an error by itself: alternatives are
/// selected by trying productions and discarding misses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Miss {
    pub index: usize,
    /// `None` at the end of input.
    pub found: Option<TokenKind>,
    pub reason: Reason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    Expected(TokenKind),
    ExpectedStatement,
    ExpectedExpression,
    ExpectedName,
    ExpectedOperator,
    ExpectedSeparator,
    ExpectedWeight,
    EmptyRandom,
    LeftRecursion,
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Reason::Expected(kind) => write!(f, "expected {kind:?}")?,
            Reason::ExpectedStatement => write!(f, "expected a statement")?,
            Reason::ExpectedExpression => write!(f, "expected an expression")?,
            Reason::ExpectedName => write!(f, "expected a name")?,
            Reason::ExpectedOperator => write!(f, "expected an operator")?,
            Reason::ExpectedSeparator => write!(f, "expected a line break")?,
            Reason::ExpectedWeight => write!(f, "expected an integer weight")?,
            Reason::EmptyRandom => write!(f, "random needs at least one branch")?,
            Reason::LeftRecursion => write!(f, "left recursion")?,
        }
        match self.found {
            Some(kind) => write!(f, ", found {kind:?}"),
            None => write!(f, ", found end of input"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    /// Index of the first unconsumed token.
    pub index: usize,
    /// The unconsumed suffix of the token stream.
    pub remaining: Vec<Token>,
    /// The miss that got furthest into the token stream.
    pub reason: Option<Miss>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.remaining.first() {
            Some(token) => write!(
                f,
                "line {}: unexpected {:?} {:?}",
                token.line, token.kind, token.text
            )?,
            None => write!(f, "unexpected end of input")?,
        }
        if let Some(reason) = &self.reason {
            write!(f, " ({reason} at token {})", reason.index)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
