extern crate colored;
extern crate difference;
extern crate llgen;

use {
    colored::Colorize,
    difference::{Changeset, Difference},
    llgen::{Compilation, Frontend, NodeId, SyntaxTree},
    std::{
        fs::File,
        io::{Read, Write},
    },
};

#[test]
fn test_robot_valid() {
    test_compile("robot_valid", "robot");
}

#[test]
fn test_robot_errors() {
    test_compile("robot_errors", "robot");
}

#[test]
fn test_robot_blocks() {
    test_compile("robot_blocks", "robot");
}

#[test]
fn test_robot_lexical() {
    test_compile("robot_lexical", "robot");
}

fn test_compile(case_name: &str, spec_name: &str) {
    //setup
    let frontend = Frontend::build(
        &load_spec(&format!("{}.rules", spec_name)),
        &load_spec(&format!("{}.grammar", spec_name)),
    )
    .unwrap();
    let input = load_input(case_name);

    //exercise
    let res = frontend.compile(&input).unwrap();

    //verify
    assert_matches_file(render(&res), case_name)
}

/// Errors first, then the logical tree and every subtree begun after recovery.
fn render(compilation: &Compilation) -> String {
    let mut out = String::new();

    for err in &compilation.lexical_errors {
        out.push_str(&format!("lexical: {}\n", err));
    }
    for err in &compilation.parse_errors {
        out.push_str(&format!("syntax: {}\n", err));
    }

    let tree = &compilation.tree;
    render_node(tree, tree.root(), 0, &mut out);
    for &root in tree.recovery_roots() {
        out.push_str("recovered:\n");
        render_node(tree, root, 0, &mut out);
    }

    out
}

fn render_node(tree: &SyntaxTree, id: NodeId, depth: usize, out: &mut String) {
    let node = tree.node(id);
    let indent = "  ".repeat(depth);

    match node.literal {
        Some(ref literal) => out.push_str(&format!("{}{} <- '{}'\n", indent, node.symbol, literal)),
        None => out.push_str(&format!("{}{}\n", indent, node.symbol)),
    }

    for child in tree.logical_children(id) {
        render_node(tree, child, depth + 1, out);
    }
}

fn load_spec(name: &str) -> String {
    let mut spec = String::new();
    let spec_file = File::open(format!("tests/spec/{}", name));
    match spec_file {
        Ok(_) => {
            spec_file.unwrap().read_to_string(&mut spec).unwrap();
        }
        Err(e) => panic!("Could't find specification file: {}", e),
    }
    spec
}

fn load_input(name: &str) -> String {
    let mut input = String::new();
    let input_file = File::open(format!("tests/input/{}", name));
    match input_file {
        Ok(_) => {
            input_file.unwrap().read_to_string(&mut input).unwrap();
        }
        Err(e) => panic!("Could't find input file: {}", e),
    }
    input
}

fn assert_matches_file(result: String, file_name: &str) {
    let file_path = format!("tests/output/{}", file_name);
    let mut output = String::new();
    let output_file = File::open(&file_path);
    match output_file {
        Ok(_) => {
            output_file.unwrap().read_to_string(&mut output).unwrap();
        }
        Err(_) => {
            let output_file = File::create(&file_path);
            match output_file {
                Ok(_) => {
                    output_file.unwrap().write(result.as_bytes()).unwrap();
                }
                Err(e) => panic!("Couldn't create output file: {}", e),
            }
            panic!("Couldn't find output file, creating new file with results");
        }
    }

    let change_set = Changeset::new(&output, &result, "\n");
    if change_set.distance != 0 {
        print_pretty_diff(&change_set);
        panic!("Output did not match file");
    }
}

fn print_pretty_diff(change_set: &Changeset) {
    for diff in &change_set.diffs {
        match diff {
            Difference::Same(string) => {
                for line in string.split('\n') {
                    println!(" |{}", line);
                }
            }
            Difference::Rem(string) => {
                for line in string.split('\n') {
                    println!("{}", format!("-|{}", line).bright_red());
                }
            }
            Difference::Add(string) => {
                for line in string.split('\n') {
                    println!("{}", format!("+|{}", line).bright_green());
                }
            }
        };
    }
}
