//! `tauc` — thin CLI driver over the semantic analysis pipeline.
//!
//! CLI parsing via `clap`, a `-v`/`-vv` verbosity ladder feeding a
//! `tracing_subscriber` `EnvFilter`, and the binary's only job being to
//! wire the library together and translate its result into a process exit
//! code. No lexer, parser, or code generator lives here — this binary
//! compiles the canned fixture in [`tauc::demo`] until a real parser
//! exists to hand it a `Prog` built from source text.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tauc::config::CompilerConfig;
use tauc::pipeline::CompilationContext;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "tauc", version, about = "Tau semantic analysis driver")]
struct Cli {
    /// Raise log verbosity (`-v` = info, `-vv` = debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a `tauc.toml` configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the resulting AST as JSON instead of just a summary.
    #[arg(long)]
    dump_ast: bool,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(verbose >= 2).compact())
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => match CompilerConfig::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => CompilerConfig::default(),
    };

    info!("starting tauc");
    let mut ctx = CompilationContext::new(config);
    let prog = tauc::demo::fixture_program(&mut ctx.registry, &mut ctx.tokens);

    debug!("running pipeline over fixture program");
    ctx.compile(prog);

    if cli.dump_ast {
        let dump = tauc::ast::dump::dump_node(&ctx.registry, prog);
        match serde_json::to_string_pretty(&dump) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: failed to serialize AST dump: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    for diag in ctx.bag().iter() {
        eprintln!("{:?}: {:?}", diag.severity(), diag.kind);
    }

    if ctx.fails_build() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
