//! CLI for phit: phase-bit sampling, PRNG, and calibrated routing experiments.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "phit")]
#[command(about = "phit — randomness and fair routing from CPU-timer clock phase jitter")]
#[command(version = phit_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit raw phit samples and characterize the delta distribution
    Sample {
        /// Number of samples to print
        #[arg(long, default_value = "8")]
        count: usize,

        /// Compound reads per sample (1 = plain sampling)
        #[arg(long, default_value = "1")]
        compound: u32,

        /// Deltas to draw for the distribution characterization
        #[arg(long, default_value = "50000")]
        deltas: usize,

        /// Workload strategy: alu, memory, branch, io
        #[arg(long, default_value = "alu", value_parser = ["alu", "memory", "branch", "io"])]
        workload: String,
    },

    /// Generate random output from a phase-seeded generator
    Prng {
        /// Number of 64-bit values to print
        #[arg(long, default_value = "10")]
        count: usize,

        /// Print doubles in [0,1) instead of hex words
        #[arg(long)]
        doubles: bool,

        /// Emit this many raw bytes as hex instead of values
        #[arg(long)]
        bytes: Option<usize>,
    },

    /// Calibrate a CDF routing table and verify slot uniformity
    Route {
        /// Number of destination slots
        #[arg(long, default_value = "8")]
        slots: usize,

        /// Calibration sample count
        #[arg(long, default_value = "200000")]
        calibrate: usize,

        /// Fresh draws routed through the frozen table
        #[arg(long, default_value = "200000")]
        draws: usize,

        /// Workload strategy: alu, memory, branch, io
        #[arg(long, default_value = "alu", value_parser = ["alu", "memory", "branch", "io"])]
        workload: String,

        /// Print a machine-readable JSON report
        #[arg(long)]
        json: bool,
    },

    /// Run the statistical battery against fresh PRNG output
    Validate {
        /// Number of 64-bit words to generate and analyze
        #[arg(long, default_value = "20000")]
        words: usize,

        /// Print a machine-readable JSON report
        #[arg(long)]
        json: bool,
    },

    /// Multi-threaded routing scenario: each worker owns its own sampler
    Dispatch {
        /// Number of worker threads
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Tasks dispatched per worker loop
        #[arg(long, default_value = "50000")]
        tasks: usize,
    },

    /// Run the built-in self-test (exit code 0 on pass, 1 on fail)
    Selftest,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sample {
            count,
            compound,
            deltas,
            workload,
        } => commands::sample::run(count, compound, deltas, &workload),
        Commands::Prng {
            count,
            doubles,
            bytes,
        } => commands::prng::run(count, doubles, bytes),
        Commands::Route {
            slots,
            calibrate,
            draws,
            workload,
            json,
        } => commands::route::run(slots, calibrate, draws, &workload, json),
        Commands::Validate { words, json } => commands::validate::run(words, json),
        Commands::Dispatch { workers, tasks } => commands::dispatch::run(workers, tasks),
        Commands::Selftest => {
            let ok = phit_core::selftest();
            println!("self-test: {}", if ok { "PASS" } else { "FAIL" });
            std::process::exit(if ok { 0 } else { 1 });
        }
    }
}
