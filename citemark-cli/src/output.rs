//! Output renderings offered by the CLI.

use citemark_config::OutputFormat;
use citemark_parser::citemark::tag::{serialize_segments, serialize_segments_resolved};
use citemark_parser::{number_citations, SegmentSequence, SourceIndex};

/// Names accepted by `--format`.
pub const AVAILABLE_FORMATS: &[&str] = &["json", "tag", "numbered"];

pub fn parse_format(name: &str) -> Option<OutputFormat> {
    match name {
        "json" => Some(OutputFormat::Json),
        "tag" => Some(OutputFormat::Tag),
        "numbered" => Some(OutputFormat::Numbered),
        _ => None,
    }
}

/// Render parsed segments in the requested format.
pub fn render(
    segments: &SegmentSequence,
    format: OutputFormat,
    pretty: bool,
    sources: Option<&SourceIndex>,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => {
            let rendered = if pretty {
                serde_json::to_string_pretty(segments)
            } else {
                serde_json::to_string(segments)
            };
            rendered.map_err(|e| format!("JSON serialization failed: {}", e))
        }
        OutputFormat::Tag => Ok(match sources {
            Some(sources) => serialize_segments_resolved(segments, sources),
            None => serialize_segments(segments),
        }),
        OutputFormat::Numbered => Ok(render_numbered(segments, sources)),
    }
}

fn render_numbered(segments: &SegmentSequence, sources: Option<&SourceIndex>) -> String {
    let numbered = number_citations(segments);
    let mut output = numbered.text;
    if numbered.references.is_empty() {
        return output;
    }
    output.push_str("\n\n");
    for reference in &numbered.references {
        output.push_str(&format!(
            "[{}] {} P.{}",
            reference.number, reference.source_title, reference.pages
        ));
        if let Some(sources) = sources {
            match sources.resolve(&reference.source_title) {
                Some(entry) => output.push_str(&format!(" ({})", entry.id)),
                None => output.push_str(" (source not found)"),
            }
        }
        output.push('\n');
    }
    output
}
