use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use anyhow::Context as _;
use clap::Parser;
use obstruct::{Config, run_source};
use tracing_subscriber::EnvFilter;

/// obstruct runs programs written in a small sigil-based language with
/// fixed-width integers, generics and a checked heap.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Check the program for errors without running it.
    #[arg(long)]
    check: bool,

    /// Close the headless window after this many drawn frames.
    #[arg(long, value_name = "N")]
    frame_limit: Option<u64>,

    /// Log filter, for example `debug` or `obstruct::interpreter=trace`.
    #[arg(long, env = "OBSTRUCT_LOG", default_value = "warn")]
    log: String,

    /// The program to run.
    file: PathBuf,

    /// Arguments passed to the program's `main`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt().with_writer(std::io::stderr)
                             .with_env_filter(EnvFilter::new(&args.log))
                             .init();

    let source = match read_program(&args.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(obstruct::error::STATIC_ERROR_EXIT_CODE);
        },
    };

    let mut program_args = vec![args.file.display().to_string()];
    program_args.extend(args.args);
    let config = Config::default().with_args(program_args)
                                  .with_frame_limit(args.frame_limit)
                                  .with_check_only(args.check);

    match run_source(&source, &config) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(e.exit_code());
        },
    }
}

fn read_program(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}
