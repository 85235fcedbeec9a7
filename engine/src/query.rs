//! Boolean query lexing and infix-to-RPN conversion. Pure string
//! processing; the evaluator in [`crate::search`] owns stemming and index
//! lookups.
//!
//! `and`, `or` and `not` are reserved: after normalisation they always lex
//! as operators, so they cannot be searched for as literal words.

/// `not` binds tightest and is right-associative; it is *binary* here
/// (`A NOT B` is set difference), with the evaluator substituting the
/// document universe when no left operand exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Not,
    And,
    Or,
}

impl Operator {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "not" => Some(Operator::Not),
            "and" => Some(Operator::And),
            "or" => Some(Operator::Or),
            _ => None,
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Not => 3,
            Operator::And => 2,
            Operator::Or => 1,
        }
    }

    pub fn is_left_associative(self) -> bool {
        !matches!(self, Operator::Not)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    Term(String),
    Op(Operator),
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpnToken {
    Term(String),
    Op(Operator),
}

/// Lowercase, then trim characters that are neither ASCII alphanumeric nor
/// apostrophe from both ends. Interior punctuation survives ("pip-boy"
/// stays one term).
fn normalize_token(raw: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    lowered
        .trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .to_string()
}

/// Split a query into term, operator and paren tokens. Parens are padded
/// with spaces first so they separate from adjacent terms; tokens that
/// normalise to the empty string are dropped.
pub fn lex(query: &str) -> Vec<QueryToken> {
    let mut spaced = String::with_capacity(query.len() * 2);
    for c in query.chars() {
        if c == '(' || c == ')' {
            spaced.push(' ');
            spaced.push(c);
            spaced.push(' ');
        } else {
            spaced.push(c);
        }
    }

    let mut tokens = Vec::new();
    for raw in spaced.split_whitespace() {
        match raw {
            "(" => tokens.push(QueryToken::LParen),
            ")" => tokens.push(QueryToken::RParen),
            _ => {
                let normalized = normalize_token(raw);
                if normalized.is_empty() {
                    continue;
                }
                match Operator::parse(&normalized) {
                    Some(op) => tokens.push(QueryToken::Op(op)),
                    None => tokens.push(QueryToken::Term(normalized)),
                }
            }
        }
    }
    tokens
}

/// Shunting-yard conversion to postfix. Malformed input is not rejected:
/// unmatched `(` is discarded at the end, unmatched `)` pops what it can.
pub fn to_rpn(tokens: &[QueryToken]) -> Vec<RpnToken> {
    let mut output = Vec::new();
    let mut stack: Vec<QueryToken> = Vec::new();

    for token in tokens {
        match token {
            QueryToken::Term(term) => output.push(RpnToken::Term(term.clone())),
            QueryToken::LParen => stack.push(QueryToken::LParen),
            QueryToken::RParen => {
                while let Some(QueryToken::Op(op)) = stack.last() {
                    output.push(RpnToken::Op(*op));
                    stack.pop();
                }
                if matches!(stack.last(), Some(QueryToken::LParen)) {
                    stack.pop();
                }
            }
            QueryToken::Op(op) => {
                while let Some(QueryToken::Op(top)) = stack.last() {
                    let pops = top.precedence() > op.precedence()
                        || (top.precedence() == op.precedence() && op.is_left_associative());
                    if !pops {
                        break;
                    }
                    output.push(RpnToken::Op(*top));
                    stack.pop();
                }
                stack.push(QueryToken::Op(*op));
            }
        }
    }

    while let Some(token) = stack.pop() {
        if let QueryToken::Op(op) = token {
            output.push(RpnToken::Op(op));
        }
    }
    output
}
