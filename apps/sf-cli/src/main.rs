use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use sf_core::elapsed_day_hour;
use sf_engine::{RunProgressEvent, RunStage, run};

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "StormFlow CLI - Drainage network simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Path to the project YAML file
        input: PathBuf,
        /// Report text file to write
        report: PathBuf,
        /// Results artifact path; omitted, results go to a scratch
        /// file deleted when the run closes
        results: Option<PathBuf>,
    },
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        input: PathBuf,
    },
    /// Print version information
    Version,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Run {
            input,
            report,
            results,
        } => cmd_run(&input, &report, results.as_deref()),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Version => cmd_version(),
    };
    std::process::exit(code);
}

fn cmd_run(input: &Path, report: &Path, results: Option<&Path>) -> i32 {
    println!("Running simulation: {}", input.display());

    let started = Instant::now();
    let mut last_emit = Instant::now();
    let mut callback = |event: RunProgressEvent| {
        let emit_now = event.stage != RunStage::Running || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(&event, started.elapsed().as_secs_f64());
            last_emit = Instant::now();
        }
    };
    let code = run(input, report, results, Some(&mut callback));
    clear_progress_line();

    if code == 0 {
        println!("✓ Simulation completed in {:.2}s", started.elapsed().as_secs_f64());
        println!("  Report: {}", report.display());
        if let Some(results) = results {
            println!("  Results: {}", results.display());
        }
    } else {
        eprintln!(
            "✗ Simulation failed with error code {} (see {})",
            code,
            report.display()
        );
    }
    code
}

fn cmd_validate(input: &Path) -> i32 {
    println!("Validating project: {}", input.display());
    let project = match sf_project::load_yaml(input) {
        Ok(project) => project,
        Err(err) => {
            eprintln!("✗ {}", err);
            return 200;
        }
    };
    for warning in sf_project::project_warnings(&project) {
        println!("  WARNING: {}", warning);
    }
    println!("✓ Project is valid");
    0
}

fn cmd_version() -> i32 {
    println!(
        "stormflow {} (engine version {})",
        sf_core::version_string(),
        sf_engine::engine_version()
    );
    0
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent, elapsed_wall_s: f64) {
    match event.stage {
        RunStage::Running => {
            let width = 28usize;
            let filled = ((event.fraction * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            let (day, hour) = elapsed_day_hour(event.elapsed_days);
            print!(
                "\r[{}] {:>6.2}%  day {} hour {:02}  elapsed={:.1}s",
                bar,
                event.fraction * 100.0,
                day,
                hour,
                elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((elapsed_wall_s * 10.0) as usize) % spinner.len();
            print!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
    }
}
