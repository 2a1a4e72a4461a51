//! RSL LSP Server implementation

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::colors;
use crate::convert;
use crate::document::DocumentState;
use rsl_build::{BuildOutcome, BuildPipeline, DiagnosticCollection, ScenePicker};
use rsl_config::ConfigLoader;

/// Workspace command that runs one build for the active document
pub const COMPILE_COMMAND: &str = "rsl.compileScene";

/// RSL Language Server
pub struct RslLspServer {
    client: Client,
    documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    diagnostics: Arc<Mutex<DiagnosticCollection>>,
    workspace_root: Arc<Mutex<Option<PathBuf>>>,
}

impl RslLspServer {
    /// Create a new RSL LSP server
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(Mutex::new(HashMap::new())),
            diagnostics: Arc::new(Mutex::new(DiagnosticCollection::new())),
            workspace_root: Arc::new(Mutex::new(None)),
        }
    }

    /// Run one build for the document at `uri` and forward the results
    async fn compile_scene(&self, uri: Url) {
        let Ok(active_file) = uri.to_file_path() else {
            self.client
                .show_message(MessageType::ERROR, format!("Not a file: {}", uri))
                .await;
            return;
        };

        let project_root = {
            let root = self.workspace_root.lock().await;
            root.clone().unwrap_or_else(|| {
                active_file
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."))
            })
        };

        let config = match ConfigLoader::new().load_from_directory(&project_root) {
            Ok(config) => config,
            Err(e) => {
                self.client
                    .show_message(MessageType::ERROR, format!("Configuration error: {}", e))
                    .await;
                return;
            }
        };

        let pipeline = BuildPipeline::new(&project_root, config);
        let picker = ClientScenePicker {
            client: &self.client,
        };

        let outcome = {
            let mut diagnostics = self.diagnostics.lock().await;
            let outcome = pipeline.run(&active_file, &picker, &mut diagnostics).await;
            self.flush_diagnostics(&mut diagnostics).await;
            outcome
        };

        match outcome {
            BuildOutcome::Success { image } => {
                self.client
                    .show_message(
                        MessageType::INFO,
                        format!("Rendered {}", image.display()),
                    )
                    .await;
            }
            BuildOutcome::ShaderCompileFailure { failures } => {
                self.client
                    .show_message(
                        MessageType::ERROR,
                        format!("{} shader(s) failed to compile", failures.len()),
                    )
                    .await;
            }
            BuildOutcome::SceneCompileFailure { .. } => {
                self.client
                    .show_message(MessageType::ERROR, "Scene failed to render")
                    .await;
            }
            BuildOutcome::Aborted { reason } => {
                self.client
                    .show_message(MessageType::ERROR, format!("Build aborted: {}", reason))
                    .await;
            }
        }
    }

    /// Forward every diagnostic entry that changed since the last flush.
    /// An entry that disappeared is published as an empty set, clearing it
    /// in the editor.
    async fn flush_diagnostics(&self, diagnostics: &mut DiagnosticCollection) {
        for file in diagnostics.take_dirty() {
            let Ok(uri) = Url::from_file_path(&file) else {
                continue;
            };
            let published = diagnostics
                .get(&file)
                .map(|set| set.iter().map(convert::diagnostic_to_lsp).collect())
                .unwrap_or_default();
            self.client.publish_diagnostics(uri, published, None).await;
        }
    }
}

/// Disambiguates scene files through an editor prompt
struct ClientScenePicker<'a> {
    client: &'a Client,
}

#[async_trait::async_trait]
impl ScenePicker for ClientScenePicker<'_> {
    async fn pick(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        let actions: Vec<MessageActionItem> = candidates
            .iter()
            .map(|path| MessageActionItem {
                title: path.display().to_string(),
                properties: Default::default(),
            })
            .collect();

        let chosen = self
            .client
            .show_message_request(
                MessageType::INFO,
                "Multiple scene files found; choose one to build".to_string(),
                Some(actions),
            )
            .await
            .ok()
            .flatten()?;

        candidates
            .iter()
            .find(|path| path.display().to_string() == chosen.title)
            .cloned()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for RslLspServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Remember where the project lives for config loading
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|folder| folder.uri.to_file_path().ok());
        *self.workspace_root.lock().await = root;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                color_provider: Some(ColorProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![COMPILE_COMMAND.to_string()],
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "rsl-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "RSL LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let doc = DocumentState::new(
            uri.clone(),
            params.text_document.text,
            params.text_document.version,
        );

        let mut documents = self.documents.lock().await;
        documents.insert(uri, doc);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let mut documents = self.documents.lock().await;
        if let Some(doc) = documents.get_mut(&uri) {
            // Full sync: the last change carries the whole text
            for change in params.content_changes {
                doc.update(change.text, version);
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut documents = self.documents.lock().await;
        documents.remove(&params.text_document.uri);
        // Build diagnostics outlive the document; they are cleared when the
        // file next rebuilds successfully
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<serde_json::Value>> {
        if params.command != COMPILE_COMMAND {
            return Ok(None);
        }

        let uri = params
            .arguments
            .first()
            .and_then(|arg| arg.as_str())
            .and_then(|raw| Url::parse(raw).ok());

        match uri {
            Some(uri) => self.compile_scene(uri).await,
            None => {
                self.client
                    .show_message(
                        MessageType::ERROR,
                        format!("{} expects a document URI argument", COMPILE_COMMAND),
                    )
                    .await;
            }
        }

        Ok(None)
    }

    async fn document_color(&self, params: DocumentColorParams) -> Result<Vec<ColorInformation>> {
        let documents = self.documents.lock().await;
        let colors = documents
            .get(&params.text_document.uri)
            .map(|doc| colors::document_colors(&doc.text))
            .unwrap_or_default();
        Ok(colors)
    }

    async fn color_presentation(
        &self,
        params: ColorPresentationParams,
    ) -> Result<Vec<ColorPresentation>> {
        Ok(vec![colors::color_presentation(&params.color)])
    }
}
