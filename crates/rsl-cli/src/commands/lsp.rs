//! LSP command - start the language server on stdio

use anyhow::Result;
use rsl_lsp::server::RslLspServer;
use tower_lsp::{LspService, Server};

/// Run the LSP server
pub fn run() -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();

        let (service, socket) = LspService::new(RslLspServer::new);
        Server::new(stdin, stdout, socket).serve(service).await;
    });

    Ok(())
}
