#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

use {
    clap::{App, AppSettings, Arg, ArgMatches, SubCommand},
    cli::{cmd, logger},
    std::process,
};

#[macro_use]
mod cli;

fn main() {
    let matches = app().get_matches();

    let status = catch_fatal!(
        {
            logger::init(&matches);
            run(&matches)
        },
        { 1 }
    );

    process::exit(status);
}

fn run(matches: &ArgMatches) -> i32 {
    let conf = cmd::load_configuration(matches);

    match matches.subcommand() {
        ("parse", Some(sub_matches)) => cmd::parse(matches, sub_matches, &conf),
        ("tokens", Some(sub_matches)) => cmd::tokens(matches, sub_matches, &conf),
        ("table", Some(_)) => cmd::table(matches, &conf),
        (name, _) => logger::fatal(&format!("Unknown command '{}'", name)),
    }
}

fn app() -> App<'static, 'static> {
    let input = Arg::with_name("input")
        .help("Path of the program to read")
        .required(true)
        .index(1);

    App::new("llgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Table-driven LL(1) front end for a robot command language")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("YAML configuration file, llgen.yml is used if present")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("rules")
                .short("r")
                .long("rules")
                .value_name("FILE")
                .help("Token rule file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("grammar")
                .short("g")
                .long("grammar")
                .value_name("FILE")
                .help("Grammar file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("logfile")
                .long("logfile")
                .value_name("FILE")
                .help("Write logs to this file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("loglevel")
                .long("loglevel")
                .value_name("LEVEL")
                .possible_values(&["error", "warn", "info", "debug", "trace"])
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("parse")
                .about("Lexes and parses a program, reporting every error found")
                .arg(input.clone())
                .arg(
                    Arg::with_name("tree")
                        .short("t")
                        .long("tree")
                        .help("Print the syntax tree"),
                ),
        )
        .subcommand(
            SubCommand::with_name("tokens")
                .about("Prints the token stream of a program")
                .arg(input),
        )
        .subcommand(
            SubCommand::with_name("table")
                .about("Prints the rewritten grammar, FIRST/FOLLOW sets and predictive table"),
        )
}
