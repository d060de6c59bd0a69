//! Rendering of reports in the format selected on the command line.

use rrb_seq::Shape;

use crate::{
    cli::OutputFormat,
    error::{CliResult, Error},
    script::Report,
};

fn json<V: serde::Serialize + ?Sized>(value: &V) -> CliResult<String> {
    let mut out =
        serde_json::to_string_pretty(value).map_err(|error| Error::Serialize { error })?;
    out.push('\n');
    Ok(out)
}

fn shape_text(shape: &Shape) -> String {
    format!(
        "length {}, depth {}, prefix {}, suffix {}, offset {}, \
         {} leaves, {} dense nodes, {} relaxed nodes\n",
        shape.length,
        shape.depth,
        shape.prefix_len,
        shape.suffix_len,
        shape.offset,
        shape.leaves,
        shape.dense_nodes,
        shape.relaxed_nodes,
    )
}

pub fn reports(reports: &[Report], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => json(reports),
        OutputFormat::Text => Ok(reports
            .iter()
            .map(|report| {
                format!(
                    "step {}: {:?}\n  {}",
                    report.step,
                    report.elements,
                    shape_text(&report.shape)
                )
            })
            .collect()),
    }
}

pub fn shape(shape: &Shape, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => json(shape),
        OutputFormat::Text => Ok(shape_text(shape)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report() -> Report {
        Report {
            step: 2,
            elements: vec![1, 2],
            shape: Shape {
                length: 2,
                prefix_len: 1,
                suffix_len: 1,
                ..Shape::default()
            },
        }
    }

    #[test]
    fn text() {
        assert_eq!(
            reports(&[report()], OutputFormat::Text).unwrap(),
            "step 2: [1, 2]\n  length 2, depth 0, prefix 1, suffix 1, offset 0, \
             0 leaves, 0 dense nodes, 0 relaxed nodes\n"
        );
    }

    #[test]
    fn json_is_parseable() {
        let out = reports(&[report()], OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["elements"], serde_json::json!([1, 2]));
        assert_eq!(parsed[0]["shape"]["prefix_len"], 1);
    }
}
