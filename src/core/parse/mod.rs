use {
    crate::core::{lex::EPSILON, spec::SpecError},
    std::{error, fmt},
};

pub mod automaton;
pub mod grammar;
pub mod recovery;
pub mod resolver;
pub mod rewrite;
pub mod sets;
pub mod table;
pub mod tree;

#[derive(PartialEq, Eq, Clone, Debug, Hash, PartialOrd, Ord)]
pub struct Production {
    pub head: String,
    pub body: Vec<String>,
}

impl Production {
    pub fn new(head: &str, body: Vec<String>) -> Self {
        Production {
            head: head.to_string(),
            body,
        }
    }

    pub fn from_text(head: &str, body: &str) -> Self {
        Production::new(head, split_body(body))
    }

    pub fn is_epsilon(&self) -> bool {
        is_epsilon_body(&self.body)
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.head, self.body.join(" "))
    }
}

/// Splits a body on whitespace. `ε` only survives as the sole symbol of an empty body.
pub fn split_body(body: &str) -> Vec<String> {
    let symbols: Vec<String> = body
        .split_whitespace()
        .filter(|symbol| *symbol != EPSILON)
        .map(String::from)
        .collect();

    if symbols.is_empty() {
        vec![EPSILON.to_string()]
    } else {
        symbols
    }
}

pub fn is_epsilon_body(body: &[String]) -> bool {
    body.len() == 1 && body[0] == EPSILON
}

#[derive(Debug)]
pub enum GrammarError {
    SpecErr(SpecError),
    EmptyGrammar,
    TerminalHead(String),
    UnbalancedParentheses { head: String, body: String },
    DanglingQuantifier { head: String, body: String },
    UndefinedNonTerminal(String),
    UndefinedStart(String),
    FirstFollowConflict { non_terminal: String, terminal: String },
    UnresolvedConflict(String),
    InvalidResolution { non_terminal: String, body: String },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GrammarError::SpecErr(ref err) => write!(f, "Grammar file error: {}", err),
            GrammarError::EmptyGrammar => write!(f, "Grammar has no rules"),
            GrammarError::TerminalHead(ref head) => {
                write!(f, "Terminal '{}' cannot be the head of a rule", head)
            }
            GrammarError::UnbalancedParentheses { ref head, ref body } => write!(
                f,
                "Unbalanced parentheses in rule '{}': {}",
                head, body
            ),
            GrammarError::DanglingQuantifier { ref head, ref body } => write!(
                f,
                "Quantifier without operand in rule '{}': {}",
                head, body
            ),
            GrammarError::UndefinedNonTerminal(ref symbol) => write!(
                f,
                "Symbol '{}' is neither a declared token nor defined by any rule",
                symbol
            ),
            GrammarError::UndefinedStart(ref start) => {
                write!(f, "Start symbol '{}' has no productions", start)
            }
            GrammarError::FirstFollowConflict {
                ref non_terminal,
                ref terminal,
            } => write!(
                f,
                "FIRST/FOLLOW conflict for '{}' on '{}': the grammar is not LL(1)",
                non_terminal, terminal
            ),
            GrammarError::UnresolvedConflict(ref non_terminal) => write!(
                f,
                "Conflict for '{}' has no registered resolver",
                non_terminal
            ),
            GrammarError::InvalidResolution {
                ref non_terminal,
                ref body,
            } => write!(
                f,
                "Resolver for '{}' selects '{}', which is not one of its productions",
                non_terminal, body
            ),
        }
    }
}

impl error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            GrammarError::SpecErr(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<SpecError> for GrammarError {
    fn from(err: SpecError) -> GrammarError {
        GrammarError::SpecErr(err)
    }
}
