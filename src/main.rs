use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use preproc_harness::config;
use preproc_harness::{
    HarnessError, HarnessResult, Report, RunProgress, Runner, preprocessor_suite, render_progress,
    render_test_header,
};

/// Run the preprocessor unit test executables and report the results
#[derive(Parser, Debug)]
#[command(
    name = "preproc-harness",
    about = "Run comprehensive preprocessor tests",
    after_help = "ENVIRONMENT VARIABLES:\n\
        PREPROC_TESTS_BUILD_DIR    Build directory containing test executables\n\
        PREPROC_TESTS_SUITE_DIR    Suite directory relative to the build directory\n\
        PREPROC_TESTS_TIMEOUT      Per-test timeout in seconds\n\
        PREPROC_TESTS_POLL_MS      Exit poll interval in milliseconds\n\
        RUST_LOG                   Log filter (overrides --verbose)"
)]
struct Args {
    /// Build directory containing test executables
    #[arg(long, default_value_os_t = config::get().build_dir.clone())]
    build_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.verbose {
        println!("Verbose mode enabled");
    }

    match run(&args.build_dir) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(HarnessError::BuildDirMissing(path)) => {
            println!("❌ Build directory not found: {}", path.display());
            println!("Please build the project first using CMake:");
            println!("  mkdir build && cd build");
            println!("  cmake .. && make");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(1)
        }
    }
}

/// Run the whole suite; `Ok(true)` when every test passed
fn run(build_dir: &Path) -> HarnessResult<bool> {
    let display_dir = std::path::absolute(build_dir).unwrap_or_else(|_| build_dir.to_path_buf());
    if !build_dir.is_dir() {
        return Err(HarnessError::BuildDirMissing(display_dir));
    }

    let manifest = preprocessor_suite();
    println!("🚀 Starting Comprehensive Preprocessor Test Suite");
    println!("Build directory: {}", display_dir.display());
    println!("Total tests to run: {}", manifest.len());

    let runner = Runner::new(build_dir);
    let run = runner.run_all_with_progress(manifest, |event| match event {
        RunProgress::Started { spec, .. } => print!("{}", render_test_header(spec)),
        RunProgress::Finished { result, .. } => print!("{}", render_progress(result)),
    });

    print!("{}", Report::new(&run));
    Ok(run.success())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "preproc_harness=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init();
}
