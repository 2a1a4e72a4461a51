//! RSL Language Server Protocol (LSP) server
//!
//! Provides build diagnostics and color decorations for RenderMan Shading
//! Language files in editors like VSCode, Neovim, and Zed.

use rsl_lsp::server::RslLspServer;
use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() {
    // Set up LSP service
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(RslLspServer::new);

    // Start the server
    Server::new(stdin, stdout, socket).serve(service).await;
}
