use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use crate::{
    cli::{GlobalOptions, OutputFormat},
    error::{CliResult, Error},
    output,
    script::{self, Replay},
};

#[derive(clap::Parser, Debug)]
pub struct RunCommand {
    /// Script file, omit to read from stdin
    pub script: Option<PathBuf>,

    /// Checks the structural invariants of the sequence after every step
    #[arg(long)]
    pub check: bool,
}

impl RunCommand {
    pub fn run(self, global: GlobalOptions) -> CliResult<()> {
        let source = match &self.script {
            Some(path) => fs::read_to_string(path).map_err(|error| Error::Io {
                path: path.clone(),
                error,
            })?,
            None => {
                let mut source = String::new();
                io::stdin()
                    .read_to_string(&mut source)
                    .map_err(|error| Error::Stdin { error })?;
                source
            }
        };

        print!("{}", replay(&source, self.check, global.format)?);
        Ok(())
    }
}

pub fn replay(source: &str, check: bool, format: OutputFormat) -> CliResult<String> {
    let steps = script::parse(source)?;
    let reports = Replay::new(check).run(&steps)?;
    output::reports(&reports, format)
}
