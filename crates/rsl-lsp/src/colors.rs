//! Document color support for `color(r, g, b)` literals
//!
//! RSL colors are written as calls with float components in [0, 1]; the
//! editor renders a swatch over each literal and round-trips edits through
//! the presentation label.

use regex::Regex;
use std::sync::OnceLock;
use tower_lsp::lsp_types::{Color, ColorInformation, ColorPresentation, Position, Range};

fn color_rgx() -> &'static Regex {
    static RGX: OnceLock<Regex> = OnceLock::new();
    RGX.get_or_init(|| {
        Regex::new(r"color\s*\(\s*(\d+\.?\d*)\s*,\s*(\d+\.?\d*)\s*,\s*(\d+\.?\d*)\s*\)").unwrap()
    })
}

/// Extract every color literal in the document, with its text range
pub fn document_colors(text: &str) -> Vec<ColorInformation> {
    let mut colors = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        for m in color_rgx().captures_iter(line) {
            let whole = m.get(0).unwrap();
            let range = Range {
                start: Position::new(line_idx as u32, whole.start() as u32),
                end: Position::new(line_idx as u32, whole.end() as u32),
            };

            let component = |i: usize| m.get(i).unwrap().as_str().parse::<f32>().unwrap_or(0.0);
            let color = Color {
                red: component(1),
                green: component(2),
                blue: component(3),
                alpha: 1.0,
            };

            colors.push(ColorInformation { range, color });
        }
    }

    colors
}

/// Presentation label written back into the source on edit
pub fn color_presentation(color: &Color) -> ColorPresentation {
    ColorPresentation {
        label: format!(
            "color({:.2}, {:.2}, {:.2})",
            color.red, color.green, color.blue
        ),
        text_edit: None,
        additional_text_edits: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_color_literal_with_range() {
        let text = "surface s() {\n    Ci = color(0.1, 0.2, 0.3);\n}\n";
        let colors = document_colors(text);
        assert_eq!(colors.len(), 1);

        let info = &colors[0];
        assert_eq!(info.range.start.line, 1);
        assert_eq!(info.range.start.character, 9);
        assert!((info.color.red - 0.1).abs() < 1e-6);
        assert!((info.color.green - 0.2).abs() < 1e-6);
        assert!((info.color.blue - 0.3).abs() < 1e-6);
        assert_eq!(info.color.alpha, 1.0);
    }

    #[test]
    fn test_multiple_colors_on_one_line() {
        let text = "mix(color(1, 0, 0), color(0, 1, 0), t)\n";
        let colors = document_colors(text);
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn test_non_color_calls_ignored() {
        let text = "vector(0.1, 0.2, 0.3)\ncolor(0.5)\n";
        assert!(document_colors(text).is_empty());
    }

    #[test]
    fn test_presentation_label() {
        let color = Color {
            red: 0.5,
            green: 0.25,
            blue: 1.0,
            alpha: 1.0,
        };
        let presentation = color_presentation(&color);
        assert_eq!(presentation.label, "color(0.50, 0.25, 1.00)");
    }
}
