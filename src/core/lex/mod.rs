use {
    crate::core::lex::{
        matcher::TokenMatcher,
        rules::{RuleSet, ID, NUMBER, UNKNOWN},
    },
    regex::{Captures, Regex},
    std::{error, fmt},
};

pub mod dfa;
pub mod matcher;
pub mod rules;

pub static END_MARKER: &str = "$";
pub static EPSILON: &str = "ε";

static COMMENT: char = '#';

lazy_static! {
    static ref ILLEGAL_CHAR: Regex = Regex::new(r"[^a-zA-Z0-9_.]").unwrap();
    static ref NUMBER_LIKE: Regex = Regex::new(r"^\d+(\.\d+)*$").unwrap();
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Token {
    pub kind: String,
    pub literal: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: &str, literal: &str, line: usize) -> Self {
        Token {
            kind: kind.to_string(),
            literal: literal.to_string(),
            line,
        }
    }

    pub fn end(line: usize) -> Self {
        Token::new(END_MARKER, END_MARKER, line)
    }

    pub fn is_end(&self) -> bool {
        self.kind == END_MARKER
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} <- '{}' (line {})", self.kind, self.literal, self.line)
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexerOptions {
    /// Report identifiers that only differ from a keyword by case, e.g. `FORWARD`.
    pub keyword_case_check: bool,
}

pub struct Lexer {
    rules: RuleSet,
    splitter: Option<Regex>,
    options: LexerOptions,
}

impl Lexer {
    pub fn new(rules: RuleSet) -> Self {
        Lexer::with_options(rules, LexerOptions::default())
    }

    pub fn with_options(rules: RuleSet, options: LexerOptions) -> Self {
        let splitter = rules.special_splitter();
        Lexer {
            rules,
            splitter,
            options,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Every declared token name, keyword pool first, followed by the synthesized
    /// `ID`, `NUMBER` and `ε` terminals.
    pub fn all_terminal_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .rules
            .keywords()
            .iter()
            .chain(self.rules.specials().iter())
            .map(|rule| rule.token_name.clone())
            .collect();

        names.push(ID.to_string());
        names.push(NUMBER.to_string());
        names.push(EPSILON.to_string());
        names
    }

    pub fn tokenize(&self, input: &str) -> Lexed {
        let mut lexed = Lexed {
            tokens: Vec::new(),
            errors: Vec::new(),
            lines: input.lines().map(String::from).collect(),
        };

        for (i, line) in input.lines().enumerate() {
            self.tokenize_line(line, i + 1, &mut lexed);
        }

        lexed.tokens.push(Token::end(lexed.lines.len() + 1));

        debug!(
            "Lexed {} tokens with {} errors",
            lexed.tokens.len(),
            lexed.errors.len()
        );

        lexed
    }

    fn tokenize_line(&self, line: &str, line_number: usize, lexed: &mut Lexed) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT) {
            return;
        }

        let code = match line.find(COMMENT) {
            Some(index) => &line[..index],
            None => line,
        };

        let spaced = match self.splitter {
            Some(ref splitter) => splitter
                .replace_all(code, |caps: &Captures| format!(" {} ", &caps[0]))
                .to_string(),
            None => code.to_string(),
        };

        let matcher = TokenMatcher::new(&self.rules);

        for word in spaced.split_whitespace() {
            let (kind, literal) = matcher.classify(word);

            if kind == UNKNOWN {
                lexed.errors.push(LexicalError::unknown(word, line_number));
                continue;
            }

            if kind == ID && self.options.keyword_case_check && self.is_miscased_keyword(word) {
                lexed.errors.push(LexicalError {
                    word: word.to_string(),
                    line: line_number,
                    hint: LexicalHint::KeywordCase,
                });
            }

            lexed.tokens.push(Token::new(kind, literal, line_number));
        }
    }

    fn is_miscased_keyword(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.rules
            .keywords()
            .iter()
            .any(|rule| rule.pattern != word && rule.pattern == lower)
    }
}

/// The result of tokenizing one input.
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexicalError>,
    pub lines: Vec<String>,
}

impl Lexed {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LexicalHint {
    IllegalCharacter(char),
    IllegalNumber,
    IllegalIdentifier,
    KeywordCase,
}

impl fmt::Display for LexicalHint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LexicalHint::IllegalCharacter(c) => write!(f, "'{}' is an illegal character", c),
            LexicalHint::IllegalNumber => write!(f, "The number is illegal"),
            LexicalHint::IllegalIdentifier => write!(f, "The identifier is illegal"),
            LexicalHint::KeywordCase => write!(f, "Keywords should be lower case"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LexicalError {
    pub word: String,
    pub line: usize,
    pub hint: LexicalHint,
}

impl LexicalError {
    fn unknown(word: &str, line: usize) -> Self {
        let hint = if let Some(illegal) = ILLEGAL_CHAR.find(word) {
            LexicalHint::IllegalCharacter(illegal.as_str().chars().next().unwrap_or(' '))
        } else if NUMBER_LIKE.is_match(word) {
            LexicalHint::IllegalNumber
        } else {
            LexicalHint::IllegalIdentifier
        };

        LexicalError {
            word: word.to_string(),
            line,
            hint,
        }
    }
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "At line {}, token '{}': {}", self.line, self.word, self.hint)
    }
}

impl error::Error for LexicalError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::core::lex::rules::Rule};

    fn robot_rules() -> RuleSet {
        let mut rules = RuleSet::new();
        rules
            .add_keyword(Rule::new("FORWARD", "forward"))
            .add_keyword(Rule::new("GOTO", "goto"))
            .add_special(Rule::new("SEMI", ";"))
            .add_special(Rule::new("COMMA", ","))
            .add_special(Rule::new("ASSIGN", "="))
            .add_special(Rule::new("EQUAL", "=="))
            .add_special(Rule::new("NOTEQUAL", "!="));
        rules
    }

    fn kinds(lexed: &Lexed) -> Vec<&str> {
        lexed.tokens.iter().map(|token| &token.kind[..]).collect()
    }

    #[test]
    fn tokenize_simple() {
        //setup
        let lexer = Lexer::new(robot_rules());

        //exercise
        let lexed = lexer.tokenize("forward 3;\ngoto x,y;");

        //verify
        assert!(!lexed.has_errors());
        assert_eq!(
            kinds(&lexed),
            vec!["FORWARD", "NUMBER", "SEMI", "GOTO", "ID", "COMMA", "ID", "SEMI", "$"]
        );
        assert_eq!(lexed.tokens[3].line, 2);
        assert_eq!(lexed.tokens[8], Token::end(3));
    }

    #[test]
    fn tokenize_longest_punctuation() {
        //setup
        let lexer = Lexer::new(robot_rules());

        //exercise
        let lexed = lexer.tokenize("a==b!=c=d");

        //verify
        assert_eq!(
            kinds(&lexed),
            vec!["ID", "EQUAL", "ID", "NOTEQUAL", "ID", "ASSIGN", "ID", "$"]
        );
    }

    #[test]
    fn tokenize_skips_comments() {
        //setup
        let lexer = Lexer::new(robot_rules());
        let input = "# header\n\n   \nforward 1; # trailing\n";

        //exercise
        let lexed = lexer.tokenize(input);

        //verify
        assert_eq!(kinds(&lexed), vec!["FORWARD", "NUMBER", "SEMI", "$"]);
        assert_eq!(lexed.tokens[0].line, 4);
        assert_eq!(lexed.tokens[3].line, 5);
    }

    #[test]
    fn tokenize_drops_unknown_words() {
        //setup
        let lexer = Lexer::new(robot_rules());

        //exercise
        let lexed = lexer.tokenize("forward 12.3.4;\nforward @x;\nforward 3b;");

        //verify
        assert_eq!(
            kinds(&lexed),
            vec!["FORWARD", "SEMI", "FORWARD", "SEMI", "FORWARD", "SEMI", "$"]
        );
        assert_eq!(
            lexed.errors,
            vec![
                LexicalError {
                    word: "12.3.4".to_string(),
                    line: 1,
                    hint: LexicalHint::IllegalNumber,
                },
                LexicalError {
                    word: "@x".to_string(),
                    line: 2,
                    hint: LexicalHint::IllegalCharacter('@'),
                },
                LexicalError {
                    word: "3b".to_string(),
                    line: 3,
                    hint: LexicalHint::IllegalIdentifier,
                },
            ]
        );
    }

    #[test]
    fn keyword_case_check() {
        //setup
        let lexer = Lexer::with_options(
            robot_rules(),
            LexerOptions {
                keyword_case_check: true,
            },
        );

        //exercise
        let lexed = lexer.tokenize("FORWARD 3;");

        //verify
        assert_eq!(kinds(&lexed), vec!["ID", "NUMBER", "SEMI", "$"]);
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(lexed.errors[0].hint, LexicalHint::KeywordCase);
    }

    #[test]
    fn all_terminal_names() {
        //setup
        let lexer = Lexer::new(robot_rules());

        //exercise
        let names = lexer.all_terminal_names();

        //verify
        assert_eq!(
            names,
            vec![
                "FORWARD", "GOTO", "SEMI", "COMMA", "ASSIGN", "EQUAL", "NOTEQUAL", "ID",
                "NUMBER", "ε"
            ]
        );
    }

    #[test]
    fn empty_input_yields_end_marker() {
        //setup
        let lexer = Lexer::new(RuleSet::new());

        //exercise
        let lexed = lexer.tokenize("");

        //verify
        assert_eq!(lexed.tokens, vec![Token::end(1)]);
    }
}
