use {
    crate::cli::{
        configuration::{self, Configuration},
        logger,
    },
    clap::ArgMatches,
    colored::{ColoredString, Colorize},
    llgen::Frontend,
    std::{fs, path::Path},
    stopwatch::Stopwatch,
};

static DEFAULT_CONFIG_PATH: &str = "llgen.yml";

pub fn load_configuration(matches: &ArgMatches) -> Configuration {
    let path = match matches.value_of("config") {
        Some(path) => Path::new(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Configuration::default();
            }
            default
        }
    };

    match configuration::read_configuration(path) {
        Ok(conf) => {
            debug!("Loaded configuration from {}", path.display());
            conf
        }
        Err(err) => logger::fatal(&format!("{}", err)),
    }
}

fn load_frontend(matches: &ArgMatches, conf: &Configuration) -> Frontend {
    let rules_path = setting(matches, "rules", &conf.rules);
    let grammar_path = setting(matches, "grammar", &conf.grammar);

    let rules = read_file(&rules_path);
    let grammar = read_file(&grammar_path);

    let options = match conf.frontend_options() {
        Ok(options) => options,
        Err(err) => logger::fatal(&format!("{}", err)),
    };

    match Frontend::build_with(&rules, &grammar, options) {
        Ok(frontend) => frontend,
        Err(err) => logger::fatal(&format!(
            "Error loading {} and {}: {}",
            rules_path, grammar_path, err
        )),
    }
}

/// A file path from the command line, falling back to the configuration file.
fn setting(matches: &ArgMatches, name: &str, configured: &Option<String>) -> String {
    match matches.value_of(name) {
        Some(path) => path.to_string(),
        None => match *configured {
            Some(ref path) => path.clone(),
            None => logger::fatal(&format!(
                "No {} file given, pass --{} or set '{}' in the configuration file",
                name, name, name
            )),
        },
    }
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => logger::fatal(&format!("Couldn't read file \"{}\": {}", path, err)),
    }
}

/// Returns the process exit status: 0 if the input compiled cleanly, 1 otherwise.
pub fn parse(matches: &ArgMatches, sub_matches: &ArgMatches, conf: &Configuration) -> i32 {
    let sw = Stopwatch::start_new();

    let frontend = load_frontend(matches, conf);
    let input_path = sub_matches.value_of("input").unwrap_or_default();
    let input = read_file(input_path);

    let compilation = match frontend.compile(&input) {
        Ok(compilation) => compilation,
        Err(err) => logger::fatal(&format!("{}", err)),
    };

    for err in &compilation.lexical_errors {
        logger::lexical_err(&format!("{}", err));
    }
    for err in &compilation.parse_errors {
        logger::syntax_err(&format!("{}", err));
    }

    if sub_matches.is_present("tree") {
        print!("{}", compilation.tree);
    }

    if compilation.is_usable() {
        logger::ok(input_path);
    }

    print_final_status(
        sw.elapsed_ms(),
        compilation.tokens.len(),
        compilation.lexical_errors.len(),
        compilation.parse_errors.len(),
    );

    if compilation.is_usable() {
        0
    } else {
        1
    }
}

pub fn print_final_status(elapsed_ms: i64, tokens: usize, lexical: usize, syntax: usize) {
    let mut lexical_msg: ColoredString = format!("{} lexical errors", lexical).normal();
    if lexical > 0 {
        lexical_msg = lexical_msg.bright_red()
    }

    let mut syntax_msg: ColoredString = format!("{} syntax errors", syntax).normal();
    if syntax > 0 {
        syntax_msg = syntax_msg.bright_red()
    }

    println!();
    println!(
        "COMPLETE: {}ms : {} tokens, {}, {}",
        elapsed_ms, tokens, lexical_msg, syntax_msg
    );
    info!(
        "COMPLETE: {}ms : {} tokens, {} lexical errors, {} syntax errors",
        elapsed_ms, tokens, lexical, syntax
    );
}

pub fn tokens(matches: &ArgMatches, sub_matches: &ArgMatches, conf: &Configuration) -> i32 {
    let frontend = load_frontend(matches, conf);
    let input_path = sub_matches.value_of("input").unwrap_or_default();
    let lexed = frontend.tokenize(&read_file(input_path));

    for token in &lexed.tokens {
        println!("{}", token);
    }
    for err in &lexed.errors {
        logger::lexical_err(&format!("{}", err));
    }

    if lexed.has_errors() {
        1
    } else {
        0
    }
}

pub fn table(matches: &ArgMatches, conf: &Configuration) -> i32 {
    let frontend = load_frontend(matches, conf);
    let grammar = frontend.grammar();

    logger::info(&format!("Start symbol: {}", grammar.start()));
    println!("\n{}", "Productions".bold());
    println!("{}", grammar.dump_productions());
    println!("\n{}", "FIRST / FOLLOW".bold());
    println!("{}", grammar.dump_sets());
    println!("\n{}", "Predictive table".bold());
    println!("{}", grammar.dump_table());

    if !grammar.conflicts().is_empty() {
        println!();
        for conflict in grammar.conflicts() {
            logger::conflict(&format!("{}", conflict));
        }
    }

    0
}
