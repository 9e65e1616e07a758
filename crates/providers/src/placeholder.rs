//! Local Placeholder Renderer
//!
//! The guaranteed last resort of the generation pipeline: synthesizes an
//! SVG entirely locally, with the prompt text laid over a gradient
//! background derived from the prompt hash. Deterministic for a given
//! prompt, no I/O, cannot fail.

use sha2::{Digest, Sha256};

use crate::GeneratedImage;

pub const PLACEHOLDER_WIDTH: u32 = 1024;
pub const PLACEHOLDER_HEIGHT: u32 = 1024;
pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/svg+xml";

const MAX_LINE_CHARS: usize = 34;
const MAX_LINES: usize = 9;

/// Render the placeholder image for a prompt.
pub fn render(prompt: &str) -> GeneratedImage {
    let digest = Sha256::digest(prompt.as_bytes());

    // Two hues seeded by the prompt so every placeholder looks distinct
    // but the same prompt always renders the same bytes.
    let hue_a = u32::from(digest[0]) * 360 / 256;
    let hue_b = u32::from(digest[1]) * 360 / 256;

    let mut svg = String::with_capacity(2048);
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = PLACEHOLDER_WIDTH,
        h = PLACEHOLDER_HEIGHT,
    ));
    svg.push_str(&format!(
        "<defs><linearGradient id=\"bg\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"1\">\
         <stop offset=\"0%\" stop-color=\"hsl({hue_a},70%,40%)\"/>\
         <stop offset=\"100%\" stop-color=\"hsl({hue_b},70%,18%)\"/>\
         </linearGradient></defs>"
    ));
    svg.push_str(&format!(
        "<rect width=\"{}\" height=\"{}\" fill=\"url(#bg)\"/>",
        PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT
    ));

    let lines = wrap_prompt(prompt);
    let line_height = 52;
    let block_height = lines.len() as u32 * line_height;
    let mut y = (PLACEHOLDER_HEIGHT - block_height) / 2;

    for line in &lines {
        y += line_height;
        svg.push_str(&format!(
            "<text x=\"512\" y=\"{}\" text-anchor=\"middle\" \
             font-family=\"sans-serif\" font-size=\"40\" fill=\"#ffffff\">{}</text>",
            y,
            escape_xml(line)
        ));
    }

    // The embedded explanation of degraded quality
    svg.push_str(&format!(
        "<text x=\"512\" y=\"{}\" text-anchor=\"middle\" \
         font-family=\"sans-serif\" font-size=\"22\" fill=\"#d0d0d0\">\
         Generated locally: image providers were unavailable</text>",
        PLACEHOLDER_HEIGHT - 48
    ));
    svg.push_str("</svg>");

    GeneratedImage {
        content_type: PLACEHOLDER_CONTENT_TYPE.to_string(),
        bytes: svg.into_bytes(),
    }
}

/// Wrap the prompt into centered lines, truncating past the line budget.
fn wrap_prompt(prompt: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in prompt.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= MAX_LINE_CHARS {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }

        if lines.len() == MAX_LINES {
            break;
        }
    }

    if lines.len() < MAX_LINES && !current.is_empty() {
        lines.push(current);
    } else if lines.len() == MAX_LINES {
        let last = lines.last_mut().expect("line budget is non-zero");
        last.push('…');
    }

    if lines.is_empty() {
        lines.push("(no prompt)".to_string());
    }

    lines
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
