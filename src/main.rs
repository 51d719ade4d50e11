use clap::Parser;
use retrocast::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
