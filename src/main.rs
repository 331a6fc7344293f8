//! `main.rs` contains the command-line interface for bibnote. It collects the
//! values and options, sets up the logger, assembles the configuration, and
//! passes the configuration to the main function.
#[macro_use]
extern crate slog;

use ansi_term::Color;
use bibnote::config::{BibnoteCommand, BibnoteConfig, Options, Output};
use clap::{crate_version, value_parser, Arg, ArgAction, Command};
use slog::{debug, Drain, Level};
use std::{fs::OpenOptions, path::PathBuf, process, sync::Mutex};

fn main() {
    // Get the command-line arguments and options
    let matches = Command::new("bibnote")
        .version(crate_version!())
        .about("Turns (@key) citation markers in a Markdown tree into footnotes")
        .subcommand_negates_reqs(true)
        .arg(
            Arg::new("input")
                .value_name("INPUT FILE")
                .help("The document tree to process, as mdast JSON")
                .index(1)
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("bibtex")
                .value_name("BIBTEX FILE")
                .help("The BibTeX library (overrides the options file)")
                .index(2)
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT FILE")
                .help("The JSON output (blank outputs to terminal)")
                .index(3)
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_name("TEMPLATE")
                .help("The bibliography style: apa, vancouver, or harvard1")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("OPTIONS FILE")
                .help("A RON file containing bibnote options")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("force_overwrite")
                .short('W')
                .long("force_overwrite")
                .action(ArgAction::SetTrue)
                .help("Required to overwrite the input file with the output"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Outputs debug log to bibnote-log.json")
                .hide_short_help(true)
                .hide_long_help(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .value_name("NUMBER")
                .help("Verbosity level between 0 and 5")
                .hide_short_help(true)
                .hide_long_help(true)
                .default_value("1")
                .value_parser(value_parser!(u8).range(0..=5)),
        )
        .subcommand(Command::new("new").about("For creating a blank options file"))
        .get_matches();

    // Setup the logger.
    //
    // If the debug flag is set, the log is also output to a file
    // `bibnote-log.json`. Otherwise, all logging goes to the terminal.
    let debug = matches.get_one::<bool>("debug").copied().unwrap_or(false);
    let min_log_level = match matches.get_one::<u8>("verbose").copied().unwrap_or(1) {
        0 => Level::Critical,
        1 => Level::Error,
        2 => Level::Warning,
        3 => Level::Info,
        4 => Level::Debug,
        _ => Level::Trace,
    };

    let term_decorator = slog_term::TermDecorator::new().build();
    let term_drain = slog_term::CompactFormat::new(term_decorator).build().fuse();
    let term_drain = term_drain.filter_level(min_log_level).fuse();

    let _guard: slog_scope::GlobalLoggerGuard = if debug {
        // Setup the file AND terminal loggers
        let log_file = match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open("./bibnote-log.json")
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "{} Unable to open the debug log: {}",
                    Color::Red.paint("ERRO"),
                    e
                );
                process::exit(1);
            }
        };
        let file_drain = slog_json::Json::new(log_file)
            .set_pretty(true)
            .add_default_keys()
            .build()
            .fuse();
        let file_drain = file_drain.filter_level(Level::Trace).fuse();
        let dual_logger = slog::Logger::root(
            Mutex::new(slog::Duplicate(term_drain, file_drain)).fuse(),
            o!("version" => crate_version!()),
        );
        slog_scope::set_global_logger(dual_logger)
    } else {
        // Setup just the terminal logger
        let term_logger = slog::Logger::root(
            Mutex::new(term_drain).fuse(),
            o!("version" => crate_version!()),
        );
        slog_scope::set_global_logger(term_logger)
    };

    debug!(slog_scope::logger(), "Logger setup");

    // The subcommand needs no files.
    if matches.subcommand_name() == Some("new") {
        let config = BibnoteConfig::new(
            BibnoteCommand::NewOptionsFile,
            Output::StandardOut,
            Options::default(),
        );
        run(config);
        return;
    }

    // Files
    let Some(input) = matches.get_one::<PathBuf>("input") else {
        eprintln!("{} No input file given", Color::Red.paint("ERRO"));
        process::exit(1);
    };
    let output = matches.get_one::<PathBuf>("output");
    let force_overwrite = matches
        .get_one::<bool>("force_overwrite")
        .copied()
        .unwrap_or(false);

    // Deal with command-line errors.
    //
    // If the input and output paths are identical and force_overwrite has not
    // been used, return an error and exit.
    if output == Some(input) && !force_overwrite {
        eprintln!("{} The input file ({}) and output file ({}) are the same,\n     but the force overwrite option was not set.\n     If you want to overwrite the input file, use -W/--force_overwrite.", Color::Red.paint("ERRO"), Color::Blue.paint(input.to_string_lossy()), Color::Blue.paint(input.to_string_lossy()));
        process::exit(1);
    }

    // Command-line options win over the options file.
    let cli_options = Options::new(
        matches.get_one::<PathBuf>("bibtex").cloned(),
        matches.get_one::<String>("template").cloned(),
    );
    let options = match matches.get_one::<PathBuf>("config") {
        Some(path) => match Options::from_ron_file(path) {
            Ok(o) => cli_options.or(o),
            Err(e) => {
                error!(slog_scope::logger(), "Options file error: {}", e);
                eprintln!("{} Options file error: {}", Color::Red.paint("ERRO"), e);
                process::exit(1);
            }
        },
        None => cli_options,
    };

    let output_option = match output {
        Some(path) => Output::File(path),
        None => Output::StandardOut,
    };

    run(BibnoteConfig::new(
        BibnoteCommand::Resolve(input),
        output_option,
        options,
    ));
}

/// Run the program, reporting any error and exiting.
fn run(config: BibnoteConfig) {
    if let Err(e) = bibnote::bibnote(config) {
        error!(slog_scope::logger(), "{}", e);
        eprintln!("{} {}", Color::Red.paint("ERRO"), e);
        process::exit(1);
    }
}
