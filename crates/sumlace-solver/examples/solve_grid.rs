//! Solve a grid file from the command line.
//!
//! The file holds ten whitespace-separated rows of ten tokens: `.` for an
//! empty cell, an integer for an entered value, and letter-bearing tokens
//! (such as `R12` or `7D`) for clues.

use std::{fs, path::PathBuf, process::ExitCode, sync::Arc, thread, time::Duration};

use clap::Parser;
use sumlace_core::Grid;
use sumlace_solver::{CancelToken, ProgressTracker, SolveOutcome, Solver};

#[derive(Debug, Parser)]
#[command(about = "Solve a sum-vector grid puzzle")]
struct Args {
    /// Path to the grid file.
    grid: PathBuf,
    /// Skip the propagation passes before searching.
    #[arg(long)]
    no_propagation: bool,
    /// Print a progress line every second while searching.
    #[arg(long)]
    progress: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let text = match fs::read_to_string(&args.grid) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("cannot read {}: {err}", args.grid.display());
            return ExitCode::FAILURE;
        }
    };
    let grid: Grid = match text.parse() {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("cannot parse grid: {err}");
            return ExitCode::FAILURE;
        }
    };

    let progress = ProgressTracker::new();
    let mut solver = match Solver::new(&grid) {
        Ok(solver) => solver
            .with_cancel(CancelToken::new())
            .with_progress(progress.clone()),
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if args.no_propagation {
        solver = solver.without_propagation();
    }

    let reporter = args.progress.then(|| {
        let progress = progress.clone();
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let stop = Arc::clone(&done);
        let handle = thread::spawn(move || {
            while !stop.load(std::sync::atomic::Ordering::Acquire) {
                eprintln!(
                    "{}: {}/{}",
                    progress.phase(),
                    progress.completed(),
                    progress.total()
                );
                thread::sleep(Duration::from_secs(1));
            }
        });
        (done, handle)
    });

    let outcome = solver.run();

    if let Some((done, handle)) = reporter {
        done.store(true, std::sync::atomic::Ordering::Release);
        let _ = handle.join();
    }

    match outcome {
        SolveOutcome::Solved(assignment) => {
            for (position, value) in assignment.iter() {
                println!("{position} = {value}");
            }
            ExitCode::SUCCESS
        }
        SolveOutcome::NoSolution => {
            eprintln!("no solution");
            ExitCode::FAILURE
        }
        SolveOutcome::Canceled => {
            eprintln!("canceled");
            ExitCode::FAILURE
        }
    }
}
