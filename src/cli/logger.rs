use {
    clap::ArgMatches,
    colored::{ColoredString, Colorize},
    log::LevelFilter,
    log4rs::{
        append::file::FileAppender,
        config::{Appender, Config, Root},
        encode::pattern::PatternEncoder,
        Handle,
    },
    std::{error::Error, fmt, panic, sync::Mutex},
};

static DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
static LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} - {m}{n}";

lazy_static! {
    static ref PREFIX_FATAL: ColoredString = "fatal".on_bright_red();
    static ref PREFIX_LEX: ColoredString = "  LEX".bright_yellow();
    static ref PREFIX_SYNTAX: ColoredString = "PARSE".bright_red();
    static ref PREFIX_CONFLICT: ColoredString = " WARN".yellow();
    static ref PREFIX_OK: ColoredString = "   OK".bright_green();
    static ref LOGGER_HANDLE: Mutex<Option<Handle>> = Mutex::new(None);
}

/// Runs `$body`, evaluating to its value. If the body raised a `Fatal` error through
/// `logger::fatal`, evaluates `$catch` instead; any other panic is reported with a
/// backtrace and resumed.
macro_rules! catch_fatal {
    ($body: block, $catch: block) => {{
        std::panic::set_hook(Box::new(|info| {
            if !info.payload().is::<$crate::cli::logger::Fatal>() {
                let backtrace = backtrace::Backtrace::new();

                println!("{}", info);
                error!("{}", info);
                println!("{:?}", backtrace);
                error!("{:?}", backtrace);
                println!("Something terrible has happened, this is a bug in llgen");
                error!("Something terrible has happened, this is a bug in llgen");
            }
        }));

        let result = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(err) => {
                if err.is::<$crate::cli::logger::Fatal>() {
                    $catch
                } else {
                    std::panic::resume_unwind(err)
                }
            }
        };

        let _ = std::panic::take_hook();
        result
    }};
}

#[derive(Debug)]
pub enum Fatal {
    Error,
}

impl fmt::Display for Fatal {
    fn fmt(&self, _: &mut fmt::Formatter) -> fmt::Result {
        Ok(())
    }
}

impl Error for Fatal {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

pub fn init(matches: &ArgMatches) {
    if let Some(log_file) = matches.value_of("logfile") {
        let log_level = match matches.value_of("loglevel") {
            Some("error") => LevelFilter::Error,
            Some("warn") => LevelFilter::Warn,
            Some("info") => LevelFilter::Info,
            Some("debug") => LevelFilter::Debug,
            Some("trace") => LevelFilter::Trace,
            _ => DEFAULT_LOG_LEVEL,
        };

        let file_appender_res = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(log_file);

        let file_appender = match file_appender_res {
            Ok(file_appender) => file_appender,
            Err(err) => fatal(&format!("Failed to build log file appender: {}", err)),
        };

        let config_res = Config::builder()
            .appender(Appender::builder().build("file", Box::new(file_appender)))
            .build(Root::builder().appender("file").build(log_level));

        let config = match config_res {
            Ok(config) => config,
            Err(err) => fatal(&format!("Failed to build logger configuration: {}", err)),
        };

        let mut handle_opt = match LOGGER_HANDLE.lock() {
            Ok(handle_opt) => handle_opt,
            Err(poisoned) => poisoned.into_inner(),
        };

        if handle_opt.is_none() {
            match log4rs::init_config(config) {
                Ok(handle) => {
                    *handle_opt = Some(handle);
                }
                Err(err) => fatal(&format!("Failed to initialize logger: {}", err)),
            }
        } else if let Some(ref handle) = *handle_opt {
            handle.set_config(config);
        }
    }

    info!("llgen {}", env!("CARGO_PKG_VERSION"));
}

pub fn info(string: &str) {
    println!("{}", string);
    info!("{}", string);
}

pub fn fatal(string: &str) -> ! {
    println!("{}: {}", *PREFIX_FATAL, string);
    error!("{}", string);
    panic::panic_any(Fatal::Error);
}

pub fn lexical_err(string: &str) {
    println!("{}| {}", *PREFIX_LEX, string);
    warn!("{}", string);
}

pub fn syntax_err(string: &str) {
    println!("{}| {}", *PREFIX_SYNTAX, string);
    warn!("{}", string);
}

pub fn conflict(string: &str) {
    println!("{}| {}", *PREFIX_CONFLICT, string);
    warn!("{}", string);
}

pub fn ok(string: &str) {
    println!("{}| {}", *PREFIX_OK, string);
    debug!("{}", string);
}
