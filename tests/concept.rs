extern crate llgen;

use {
    llgen::{
        ConflictResolver, Diagnostic, Frontend, FrontendOptions, LexerOptions,
        LexicalHint, Resolvers, TokenCursor,
    },
    std::{sync::Arc, thread},
};

static ROBOT_RULES: &str = include_str!("spec/robot.rules");
static ROBOT_GRAMMAR: &str = include_str!("spec/robot.grammar");

static COMMAND_RULES: &str = "
FORWARD : 'forward';
SYMBOL SEMI : ';';
";

static COMMAND_GRAMMAR: &str = "
program : command* ;
command : FORWARD NUMBER SEMI ;
";

#[test]
fn test_commands_parse_cleanly() {
    //setup
    let frontend = Frontend::build(COMMAND_RULES, COMMAND_GRAMMAR).unwrap();

    //exercise
    let res = frontend.compile("forward 3 ; forward 5 ;").unwrap();

    //verify
    assert!(res.is_usable());
    assert!(res.parse_errors.is_empty());

    let tree = &res.tree;
    assert_eq!(tree.node(tree.root()).symbol, "program");
    let children: Vec<&str> = tree
        .logical_children(tree.root())
        .into_iter()
        .map(|id| &tree.node(id).symbol[..])
        .collect();
    assert_eq!(children, vec!["command", "command"]);
}

#[test]
fn test_missing_semicolon_is_reported_once() {
    //setup
    let frontend = Frontend::build(COMMAND_RULES, COMMAND_GRAMMAR).unwrap();

    //exercise
    let res = frontend.compile("forward 3 forward 5 ;").unwrap();

    //verify
    assert!(!res.is_usable());
    assert_eq!(res.parse_errors.len(), 1);
    assert_eq!(res.parse_errors[0].line, 1);
    assert_eq!(res.parse_errors[0].diagnostic, Diagnostic::MissingTerminator);
}

#[test]
fn test_robot_table_is_deterministic() {
    //setup
    let first = Frontend::build(ROBOT_RULES, ROBOT_GRAMMAR).unwrap();

    //exercise
    let second = Frontend::build(ROBOT_RULES, ROBOT_GRAMMAR).unwrap();

    //verify
    assert_eq!(first.grammar().dump_table(), second.grammar().dump_table());
    assert_eq!(first.grammar().conflicts(), second.grammar().conflicts());
}

#[test]
fn test_robot_conflicts_are_confined_to_statement() {
    //setup
    let frontend = Frontend::build(ROBOT_RULES, ROBOT_GRAMMAR).unwrap();

    //exercise
    let conflicts = frontend.grammar().conflicts();

    //verify
    let cells: Vec<(&str, &str)> = conflicts
        .iter()
        .map(|conflict| (&conflict.non_terminal[..], &conflict.terminal[..]))
        .collect();
    assert_eq!(cells, vec![("statement", "ID"), ("statement", "NUMBER")]);
    assert_eq!(
        conflicts[0].to_string(),
        "'statement' on 'ID' may derive [boolExp] or [mathExp]"
    );
}

struct AlwaysMath;

impl ConflictResolver for AlwaysMath {
    fn resolve(&self, _: &mut TokenCursor) -> Vec<String> {
        vec!["mathExp".to_string()]
    }

    fn candidates(&self) -> Vec<Vec<String>> {
        vec![vec!["mathExp".to_string()]]
    }
}

#[test]
fn test_custom_resolver() {
    //setup
    let mut resolvers = Resolvers::new();
    resolvers.register("statement", AlwaysMath);
    let options = FrontendOptions {
        resolvers,
        ..FrontendOptions::default()
    };
    let frontend = Frontend::build_with(ROBOT_RULES, ROBOT_GRAMMAR, options).unwrap();

    //exercise
    let res = frontend.compile("x = y > 3;").unwrap();

    //verify
    let diagnostics: Vec<&Diagnostic> = res.parse_errors.iter().map(|err| &err.diagnostic).collect();
    assert_eq!(
        diagnostics,
        vec![&Diagnostic::MissingTerminator, &Diagnostic::AssignmentTarget]
    );
}

#[test]
fn test_keyword_case_check() {
    //setup
    let options = FrontendOptions {
        lexer: LexerOptions {
            keyword_case_check: true,
        },
        ..FrontendOptions::default()
    };
    let frontend = Frontend::build_with(ROBOT_RULES, ROBOT_GRAMMAR, options).unwrap();

    //exercise
    let res = frontend.compile("Forward 3;").unwrap();

    //verify
    assert_eq!(res.lexical_errors.len(), 1);
    assert_eq!(res.lexical_errors[0].hint, LexicalHint::KeywordCase);
    assert_eq!(res.parse_errors.len(), 1);
}

#[test]
fn test_independent_runs_in_parallel() {
    //setup
    let frontend = Arc::new(Frontend::build(ROBOT_RULES, ROBOT_GRAMMAR).unwrap());
    let inputs = vec!["forward 1;", "x = (a + 1);", "turnleft 9", "if x > 1 { grasp cup; }"];

    //exercise
    let handles: Vec<thread::JoinHandle<usize>> = inputs
        .into_iter()
        .map(|input| {
            let frontend = Arc::clone(&frontend);
            thread::spawn(move || frontend.compile(input).unwrap().parse_errors.len())
        })
        .collect();
    let errors: Vec<usize> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    //verify
    assert_eq!(errors, vec![0, 0, 1, 0]);
}
