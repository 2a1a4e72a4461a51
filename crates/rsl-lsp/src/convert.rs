//! Type conversions between build diagnostics and LSP types

use rsl_build::{Diagnostic, Severity};
use tower_lsp::lsp_types;

/// Convert a build diagnostic to an LSP diagnostic
pub fn diagnostic_to_lsp(diag: &Diagnostic) -> lsp_types::Diagnostic {
    lsp_types::Diagnostic {
        range: lsp_types::Range {
            start: lsp_types::Position {
                line: diag.range.start.line,
                character: diag.range.start.character,
            },
            end: lsp_types::Position {
                line: diag.range.end.line,
                character: diag.range.end.character,
            },
        },
        severity: Some(match diag.severity {
            Severity::Error => lsp_types::DiagnosticSeverity::ERROR,
            Severity::Information => lsp_types::DiagnosticSeverity::INFORMATION,
        }),
        source: Some("rsl".to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}
