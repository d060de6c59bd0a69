use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not read {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("could not read standard input: {error}")]
    Stdin { error: std::io::Error },
    #[error("invalid script: {error}")]
    Parse { error: serde_json::Error },
    #[error("could not serialize the report: {error}")]
    Serialize { error: serde_json::Error },
    /// An `expect_*` step of a script didn't hold.
    #[error("step {step}: expected {expected}, got {actual}")]
    Expectation {
        step: usize,
        expected: String,
        actual: String,
    },
    /// A script referred to a sequence that was never saved.
    #[error("step {step}: no sequence was saved under `{name}`")]
    UnknownName { step: usize, name: String },
}

pub type CliResult<T> = Result<T, Error>;

impl Error {
    pub fn report(self) {
        eprintln!("error: {self}");
        std::process::exit(1)
    }
}
