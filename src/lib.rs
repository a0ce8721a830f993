#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

use std::{error, fmt};

pub use crate::core::{
    data::stream::TokenCursor,
    lex::{
        matcher::TokenMatcher,
        rules::{Rule, RuleSet, ID, NUMBER, UNKNOWN},
        Lexed, Lexer, LexerOptions, LexicalError, LexicalHint, Token, END_MARKER, EPSILON,
    },
    parse::{
        automaton::{ParseOutcome, ParsingAutomaton},
        recovery::{Category, Diagnostic, ParseError, RecoveryPolicy},
        resolver::{ConflictResolver, LookaheadResolver, Resolvers},
        table::{Conflict, GrammarTable, Prediction, PredictiveTable},
        tree::{Node, NodeId, SyntaxTree},
        GrammarError, Production,
    },
    spec::{parse_grammar, parse_rules, RawRule, SpecError},
};

mod core;

/// Everything about a front end that is not read from the rule and grammar files.
#[derive(Clone, Debug, Default)]
pub struct FrontendOptions {
    pub start: Option<String>,
    pub lexer: LexerOptions,
    pub recovery: RecoveryPolicy,
    pub resolvers: Resolvers,
}

/// A lexer and predictive parser built from a token-rule file and a grammar file.
pub struct Frontend {
    lexer: Lexer,
    grammar: GrammarTable,
    recovery: RecoveryPolicy,
    resolvers: Resolvers,
}

impl Frontend {
    pub fn build(rules: &str, grammar: &str) -> Result<Frontend, BuildError> {
        Frontend::build_with(rules, grammar, FrontendOptions::default())
    }

    pub fn build_with(
        rules: &str,
        grammar: &str,
        options: FrontendOptions,
    ) -> Result<Frontend, BuildError> {
        let rules = crate::core::spec::parse_rules(rules)?;
        let lexer = Lexer::with_options(rules, options.lexer);

        let grammar = GrammarTable::load_from_spec(
            grammar,
            &lexer.all_terminal_names(),
            options.start.as_ref().map(|start| &start[..]),
        )?;

        ParsingAutomaton::new(&grammar, options.resolvers.clone(), options.recovery.clone())?;

        Ok(Frontend {
            lexer,
            grammar,
            recovery: options.recovery,
            resolvers: options.resolvers,
        })
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn grammar(&self) -> &GrammarTable {
        &self.grammar
    }

    pub fn tokenize(&self, input: &str) -> Lexed {
        self.lexer.tokenize(input)
    }

    /// Lexes and parses `input`. Lexical errors do not prevent parsing.
    pub fn compile(&self, input: &str) -> Result<Compilation, BuildError> {
        let lexed = self.lexer.tokenize(input);

        let mut automaton =
            ParsingAutomaton::new(&self.grammar, self.resolvers.clone(), self.recovery.clone())?;
        let outcome = automaton.run(&lexed.tokens, &lexed.lines);

        Ok(Compilation {
            tokens: lexed.tokens,
            lexical_errors: lexed.errors,
            lines: lexed.lines,
            tree: outcome.tree,
            parse_errors: outcome.errors,
        })
    }
}

pub struct Compilation {
    pub tokens: Vec<Token>,
    pub lexical_errors: Vec<LexicalError>,
    pub lines: Vec<String>,
    pub tree: SyntaxTree,
    pub parse_errors: Vec<ParseError>,
}

impl Compilation {
    /// Whether the tree can be handed to later passes.
    pub fn is_usable(&self) -> bool {
        self.lexical_errors.is_empty() && self.parse_errors.is_empty()
    }
}

#[derive(Debug)]
pub enum BuildError {
    SpecErr(SpecError),
    GrammarErr(GrammarError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BuildError::SpecErr(ref err) => write!(f, "Failed to read token rules: {}", err),
            BuildError::GrammarErr(ref err) => write!(f, "Failed to build grammar: {}", err),
        }
    }
}

impl error::Error for BuildError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            BuildError::SpecErr(ref err) => Some(err),
            BuildError::GrammarErr(ref err) => Some(err),
        }
    }
}

impl From<SpecError> for BuildError {
    fn from(err: SpecError) -> BuildError {
        BuildError::SpecErr(err)
    }
}

impl From<GrammarError> for BuildError {
    fn from(err: GrammarError) -> BuildError {
        BuildError::GrammarErr(err)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::error::Error};

    static RULES: &str = "
FORWARD : 'forward';
SYMBOL SEMI : ';';
";

    #[test]
    fn compile_valid_program() {
        //setup
        let frontend = Frontend::build(
            RULES,
            "program : command* ;\ncommand : FORWARD NUMBER SEMI ;",
        )
        .unwrap();

        //exercise
        let compilation = frontend.compile("forward 3 ; forward 5 ;").unwrap();

        //verify
        assert!(compilation.is_usable());
        let tree = &compilation.tree;
        let commands = tree.logical_children(tree.root());
        assert_eq!(commands.len(), 2);
        assert!(commands
            .iter()
            .all(|&command| tree.node(command).symbol == "command"));
        assert_eq!(compilation.tokens.len(), 7);
    }

    #[test]
    fn compile_collects_errors() {
        //setup
        let frontend = Frontend::build(
            RULES,
            "program : command* ;\ncommand : FORWARD NUMBER SEMI ;",
        )
        .unwrap();

        //exercise
        let compilation = frontend.compile("forward 3 forward 5 ;\nforward 2 1x ;").unwrap();

        //verify
        assert!(!compilation.is_usable());
        assert_eq!(compilation.parse_errors.len(), 1);
        assert_eq!(compilation.parse_errors[0].line, 1);
        assert_eq!(compilation.lexical_errors.len(), 1);
        assert_eq!(compilation.lexical_errors[0].line, 2);
    }

    #[test]
    fn failed_rules() {
        //setup
        let rules = "FORWARD 'forward';";

        //exercise
        let res = Frontend::build(rules, "program : FORWARD ;");

        //verify
        assert!(res.is_err());

        let mut err: &dyn Error = &res.err().unwrap();
        assert_eq!(
            format!("{}", err),
            "Failed to read token rules: Rule starting at line 1 is missing ':'"
        );

        err = err.source().unwrap();
        assert_eq!(
            format!("{}", err),
            "Rule starting at line 1 is missing ':'"
        );

        assert!(err.source().is_none());
    }

    #[test]
    fn failed_grammar_file() {
        //setup
        let grammar = "program : FORWARD";

        //exercise
        let res = Frontend::build(RULES, grammar);

        //verify
        assert!(res.is_err());

        let mut err: &dyn Error = &res.err().unwrap();
        assert_eq!(
            format!("{}", err),
            "Failed to build grammar: Grammar file error: \
             Rule starting at line 1 is not terminated by ';'"
        );

        err = err.source().unwrap();
        assert_eq!(
            format!("{}", err),
            "Grammar file error: Rule starting at line 1 is not terminated by ';'"
        );

        err = err.source().unwrap();
        assert_eq!(
            format!("{}", err),
            "Rule starting at line 1 is not terminated by ';'"
        );

        assert!(err.source().is_none());
    }

    #[test]
    fn failed_unresolved_conflict() {
        //setup
        let grammar = "
program : choice SEMI ;
choice : FORWARD NUMBER | FORWARD ID ;
other : a | b ;
a : ID NUMBER ;
b : ID ID ;
";

        //exercise
        let res = Frontend::build(RULES, grammar);

        //verify
        let err = res.err().unwrap();
        assert_eq!(
            format!("{}", err),
            "Failed to build grammar: Conflict for 'other' has no registered resolver"
        );
        assert!(err.source().unwrap().source().is_none());
    }

    #[test]
    fn custom_start_and_resolver() {
        //setup
        let grammar = "
other : a | b ;
a : ID NUMBER SEMI ;
b : ID ID SEMI ;
program : FORWARD NUMBER SEMI ;
";
        let mut resolvers = Resolvers::new();
        resolvers.register(
            "other",
            LookaheadResolver::new(&["SEMI"], &["NUMBER"], &["a"], &["b"]),
        );
        let options = FrontendOptions {
            start: Some("other".to_string()),
            resolvers,
            ..FrontendOptions::default()
        };
        let frontend = Frontend::build_with(RULES, grammar, options).unwrap();

        //exercise
        let numeric = frontend.compile("x 3 ;").unwrap();
        let named = frontend.compile("x y ;").unwrap();

        //verify
        assert!(numeric.is_usable());
        assert!(named.is_usable());
        let tree = &numeric.tree;
        let chosen = tree.logical_children(tree.root());
        assert_eq!(tree.node(chosen[0]).symbol, "a");
        let tree = &named.tree;
        let chosen = tree.logical_children(tree.root());
        assert_eq!(tree.node(chosen[0]).symbol, "b");
    }
}
