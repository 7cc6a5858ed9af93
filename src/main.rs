use std::{env, fs::read_to_string, process::ExitCode, rc::Rc, time::Instant};

use log::{info, LevelFilter, Log, Metadata, Record};
use schema_lang::{
    errors::errors::Error,
    format_error,
    interpreter::interpreter::evaluate,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, TypeChecker},
    RunOptions,
};

/// Writes log records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Installs the logger at the level named by `SCHEMA_LOG`; logging is off otherwise.
fn init_logging() {
    let level = match env::var("SCHEMA_LOG").ok().as_deref() {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Off,
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

struct Args {
    file_path: String,
    options: RunOptions,
}

fn parse_args() -> Result<Args, String> {
    let mut file_path = None;
    let mut options = RunOptions {
        echo: true,
        ..RunOptions::default()
    };

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--no-check" => options.type_check = false,
            "--quiet" => options.echo = false,
            flag if flag.starts_with("--") => return Err(format!("unknown flag `{}`", flag)),
            path if file_path.is_none() => file_path = Some(path.to_string()),
            _ => return Err(String::from("only one source file can be run")),
        }
    }

    let file_path = file_path.ok_or_else(|| String::from("usage: schema_lang <file> [--no-check] [--quiet]"))?;
    options.file_name = file_path.rsplit('/').next().unwrap_or(&file_path).to_string();

    Ok(Args { file_path, options })
}

fn run(source: &str, options: &RunOptions) -> Result<(), Error> {
    let start = Instant::now();

    let tokens = tokenize(source.to_string(), Some(options.file_name.clone()))?;
    info!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let (_, program) = parse(tokens, Rc::new(options.file_name.clone()));
    let program = program?;
    info!("Parsed in {:?}", parse_start.elapsed());

    let check_start = Instant::now();
    let program = if options.type_check {
        type_check(program).1?
    } else {
        TypeChecker::new().infer(&program)?
    };
    info!("Type checked in {:?}", check_start.elapsed());

    let eval_start = Instant::now();
    let (output, error) = evaluate(&program, options);
    info!(
        "Evaluated in {:?}, {} lines printed",
        eval_start.elapsed(),
        output.len()
    );
    info!("Total time: {:?}", start.elapsed());

    match error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    init_logging();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    let source = match read_to_string(&args.file_path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", args.file_path, error);
            return ExitCode::from(2);
        }
    };

    match run(&source, &args.options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", format_error(&error, &source));
            ExitCode::FAILURE
        }
    }
}
