//! Entry point of the program.

mod cli;
mod error;
mod output;
mod run;
mod script;
mod shape;

use crate::cli::{Command, Options};

fn main() {
    env_logger::init();

    let opts = <Options as clap::Parser>::parse();

    let result = match opts.command {
        Command::Run(run) => run.run(opts.global),

        Command::Shape(shape) => shape.run(opts.global),
    };

    result.unwrap_or_else(|e| e.report())
}
