//! MCP server handler implementation.

use std::sync::Arc;

use rmcp::{
    ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, ErrorData, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::{RequestContext, RoleServer},
    transport::stdio,
};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::tools::{Dispatcher, DispatcherConfig};

/// The MCP server exposing the transcription and shell tools.
///
/// Tools are listed and called by hand rather than through a generated router, so that an
/// unknown tool name is answered with a text result instead of a protocol error.
#[derive(Clone)]
pub struct WhisperServer {
    dispatcher: Arc<Dispatcher>,
}

impl WhisperServer {
    /// Create a new server with the given dispatcher configuration.
    #[must_use]
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(config)),
        }
    }

    /// Returns a reference to the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl Default for WhisperServer {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

impl std::fmt::Debug for WhisperServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperServer")
            .field("config", self.dispatcher.config())
            .finish()
    }
}

impl ServerHandler for WhisperServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Transcribe audio with whisper-cli (whisper_transcribe) and run shell commands \
                 (shell_command). Shell commands are screened by a simple denylist only."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools: Vec<Tool> = self
            .dispatcher
            .list_tools()
            .into_iter()
            .map(Tool::from)
            .collect();
        debug!(count = tools.len(), "Listing tools");
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let response = self
            .dispatcher
            .call_tool(&request.name, request.arguments)
            .await;
        Ok(response.into())
    }
}

/// Run the MCP server.
///
/// This function starts the server with stdio transport and waits for it to complete.
///
/// # Errors
///
/// Returns error if server initialization or transport fails.
pub async fn run(config: DispatcherConfig) -> crate::error::Result<()> {
    info!("Starting whisper-cli MCP server");
    debug!(?config, "Using stdio transport");

    let server = WhisperServer::new(config);

    let service = server
        .serve(stdio())
        .await
        .map_err(|e| ServerError::InitializationFailed(e.to_string()))?;

    info!("Server initialized, waiting for requests");

    service
        .waiting()
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_advertises_tools_capability() {
        let info = WhisperServer::default().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_server_uses_given_config() {
        let config = DispatcherConfig::default().with_whisper_binary("whisper");
        let server = WhisperServer::new(config.clone());
        assert_eq!(server.dispatcher().config(), &config);
    }
}
