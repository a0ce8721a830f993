use std::{collections::BTreeMap, error, fmt, str::FromStr};

static WORD_COMPARISONS: [&str; 4] = ["large", "small", "equal", "notequal"];
static WORD_ARITHMETIC: [&str; 4] = ["add", "subtract", "multiply", "divide"];
static ARITHMETIC_LITERALS: [&str; 4] = ["+", "-", "*", "/"];

/// The kind of construct a non-terminal stands for, as far as error recovery cares.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub enum Category {
    Command,
    Assignment,
    Conditional,
    Loop,
    Comparison,
    Arithmetic,
}

impl Category {
    /// Expression categories refine the diagnosis of the statement enclosing them.
    pub fn is_expression(self) -> bool {
        match self {
            Category::Comparison | Category::Arithmetic => true,
            _ => false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Category::Command => "command",
            Category::Assignment => "assignment",
            Category::Conditional => "conditional",
            Category::Loop => "loop",
            Category::Comparison => "comparison",
            Category::Arithmetic => "arithmetic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Category, String> {
        match &s.to_lowercase()[..] {
            "command" => Ok(Category::Command),
            "assignment" => Ok(Category::Assignment),
            "conditional" => Ok(Category::Conditional),
            "loop" => Ok(Category::Loop),
            "comparison" => Ok(Category::Comparison),
            "arithmetic" => Ok(Category::Arithmetic),
            _ => Err(format!("Unknown recovery category '{}'", s)),
        }
    }
}

/// Which terminals and non-terminals the recovery heuristics key on.
#[derive(Clone, Debug)]
pub struct RecoveryPolicy {
    pub terminator: String,
    pub separator: String,
    pub quote: String,
    pub block_open: String,
    pub block_close: String,
    pub string_symbol: String,
    pub categories: BTreeMap<String, Category>,
}

impl RecoveryPolicy {
    pub fn category_of(&self, non_terminal: &str) -> Option<Category> {
        self.categories.get(non_terminal).cloned()
    }

    pub fn is_word_comparison(literal: &str) -> bool {
        WORD_COMPARISONS
            .iter()
            .any(|word| word.eq_ignore_ascii_case(literal))
    }

    pub fn is_word_arithmetic(literal: &str) -> bool {
        WORD_ARITHMETIC
            .iter()
            .any(|word| word.eq_ignore_ascii_case(literal))
    }

    pub fn is_arithmetic_literal(literal: &str) -> bool {
        ARITHMETIC_LITERALS.contains(&literal)
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        let categories: BTreeMap<String, Category> = vec![
            ("command", Category::Command),
            ("assignstatement", Category::Assignment),
            ("condstatement", Category::Conditional),
            ("loopstatement", Category::Loop),
            ("comExp", Category::Comparison),
            ("mathExp", Category::Arithmetic),
        ]
        .into_iter()
        .map(|(name, category)| (name.to_string(), category))
        .collect();

        RecoveryPolicy {
            terminator: "SEMI".to_string(),
            separator: "COMMA".to_string(),
            quote: "QUO".to_string(),
            block_open: "LBRACE".to_string(),
            block_close: "RBRACE".to_string(),
            string_symbol: "string".to_string(),
            categories,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Diagnostic {
    MissingTerminator,
    ParameterCount,
    UnexpectedParameters,
    ParameterType,
    UnparenthesizedMath,
    NeedlessParentheses(String),
    InvalidAssignedValue(String),
    MissingBlockOpen(Category),
    ParenthesizedCondition(Category),
    WordComparison(String),
    InvalidComparison,
    WordArithmetic(String),
    InvalidArithmetic,
    AssignmentTarget,
    MissingBlockClose,
    IncompleteProgram,
    Statement(Option<Category>),
}

impl Diagnostic {
    /// Whether recovery stops the parse instead of resynchronising.
    pub fn is_final(&self) -> bool {
        match *self {
            Diagnostic::MissingBlockClose | Diagnostic::IncompleteProgram => true,
            _ => false,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Diagnostic::MissingTerminator => write!(f, "This statement must end with ';'"),
            Diagnostic::ParameterCount => write!(f, "The number of parameters is illegal"),
            Diagnostic::UnexpectedParameters => write!(f, "This command takes no parameters"),
            Diagnostic::ParameterType => write!(f, "Parameter types of the command are invalid"),
            Diagnostic::UnparenthesizedMath => write!(
                f,
                "Mathematical expressions must be enclosed in parentheses"
            ),
            Diagnostic::NeedlessParentheses(ref function) => {
                write!(f, "'{}' does not take parentheses", function)
            }
            Diagnostic::InvalidAssignedValue(ref value) => write!(
                f,
                "Invalid value '{}' on the right side of the assignment",
                value
            ),
            Diagnostic::MissingBlockOpen(category) => {
                write!(f, "Missing '{{' in {} statement", category)
            }
            Diagnostic::ParenthesizedCondition(category) => write!(
                f,
                "The condition of a {} statement must not be enclosed in parentheses",
                category
            ),
            Diagnostic::WordComparison(ref word) => write!(
                f,
                "Invalid comparison operator '{}', use '>', '<', '==' or '!=' instead",
                word
            ),
            Diagnostic::InvalidComparison => write!(f, "Invalid boolean expression"),
            Diagnostic::WordArithmetic(ref word) => write!(
                f,
                "Invalid math operator '{}', use '+', '-', '*' or '/' instead",
                word
            ),
            Diagnostic::InvalidArithmetic => write!(f, "Invalid math expression"),
            Diagnostic::AssignmentTarget => write!(
                f,
                "The left side of the assignment operator must be an identifier"
            ),
            Diagnostic::MissingBlockClose => write!(f, "Missing '}}' at the end of a block"),
            Diagnostic::IncompleteProgram => {
                write!(f, "The end of the program is incomplete or contains errors")
            }
            Diagnostic::Statement(Some(category)) => {
                write!(f, "The {} statement contains errors", category)
            }
            Diagnostic::Statement(None) => write!(f, "Unexpected token"),
        }
    }
}

/// A recovered syntax error. `near` is the trimmed source line the error is reported on.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ParseError {
    pub line: usize,
    pub near: String,
    pub diagnostic: Diagnostic,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid syntax at line {}, near '{}': {}",
            self.line, self.near, self.diagnostic
        )
    }
}

impl error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_categories() {
        //setup
        let policy = RecoveryPolicy::default();

        //exercise/verify
        assert_eq!(policy.category_of("command"), Some(Category::Command));
        assert_eq!(policy.category_of("mathExp"), Some(Category::Arithmetic));
        assert_eq!(policy.category_of("program"), None);
        assert!(Category::Comparison.is_expression());
        assert!(!Category::Loop.is_expression());
    }

    #[test]
    fn category_from_str() {
        //exercise/verify
        assert_eq!("Loop".parse::<Category>(), Ok(Category::Loop));
        assert_eq!(
            "while".parse::<Category>(),
            Err("Unknown recovery category 'while'".to_string())
        );
    }

    #[test]
    fn word_operators() {
        //exercise/verify
        assert!(RecoveryPolicy::is_word_comparison("LARGE"));
        assert!(!RecoveryPolicy::is_word_comparison(">"));
        assert!(RecoveryPolicy::is_word_arithmetic("Multiply"));
        assert!(RecoveryPolicy::is_arithmetic_literal("/"));
        assert!(!RecoveryPolicy::is_arithmetic_literal("="));
    }

    #[test]
    fn parse_error_display() {
        //setup
        let err = ParseError {
            line: 4,
            near: "if (x > 3) {".to_string(),
            diagnostic: Diagnostic::ParenthesizedCondition(Category::Conditional),
        };

        //exercise
        let message = err.to_string();

        //verify
        assert_eq!(
            message,
            "Invalid syntax at line 4, near 'if (x > 3) {': \
             The condition of a conditional statement must not be enclosed in parentheses"
        );
    }
}
