use std::str::FromStr;

use rrb_seq::Sequence;

use crate::{cli::GlobalOptions, error::CliResult, output};

/// Slice bounds given as `FROM:TO`. Negative bounds count from the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub from: isize,
    pub to: isize,
}

impl FromStr for Bounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once(':')
            .ok_or_else(|| format!("expected FROM:TO, got `{s}`"))?;
        let parse = |bound: &str| {
            bound
                .trim()
                .parse::<isize>()
                .map_err(|e| format!("invalid bound `{bound}`: {e}"))
        };
        Ok(Bounds {
            from: parse(from)?,
            to: parse(to)?,
        })
    }
}

#[derive(clap::Parser, Debug)]
pub struct ShapeCommand {
    /// Number of elements to build the sequence from
    #[arg(long, default_value_t = 1000)]
    pub len: usize,

    /// Builds the sequence by prepending elements instead of appending them
    #[arg(long)]
    pub prepend: bool,

    /// Slices the sequence after building it
    #[arg(long, value_name = "FROM:TO", allow_hyphen_values = true)]
    pub slice: Option<Bounds>,

    /// Concatenates a second sequence with this many elements at the end
    #[arg(long, value_name = "N")]
    pub concat_with: Option<usize>,
}

impl ShapeCommand {
    fn build(&self) -> Sequence<i64> {
        let len = self.len as i64;
        let mut seq = Sequence::new();
        if self.prepend {
            for i in (0..len).rev() {
                seq.push_front(i);
            }
        } else {
            for i in 0..len {
                seq.push_back(i);
            }
        }

        if let Some(Bounds { from, to }) = self.slice {
            seq.slice_in_place(from, to);
        }
        if let Some(n) = self.concat_with {
            seq.append_all(Sequence::range(len, len + n as i64));
        }
        seq
    }

    pub fn run(self, global: GlobalOptions) -> CliResult<()> {
        let seq = self.build();
        seq.check_invariants();
        print!("{}", output::shape(&seq.shape(), global.format)?);
        Ok(())
    }
}
