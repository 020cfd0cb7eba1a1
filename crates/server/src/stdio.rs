//! stdio transport
//!
//! Newline-delimited JSON-RPC on stdin/stdout. stdout carries protocol
//! messages only; logs go to stderr.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use concierge_tools::ToolExecutor;

use crate::mcp_server::handle_line;
use crate::state::AppState;
use crate::ServerError;

/// Answer each request line until the reader hits EOF
pub async fn serve_lines<R, W>(
    tools: &dyn ToolExecutor,
    reader: R,
    mut writer: W,
) -> Result<usize, ServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        handled += 1;
        if let Some(response) = handle_line(tools, line).await {
            let mut out = serde_json::to_string(&response)
                .map_err(|e| ServerError::Internal(format!("Failed to encode response: {}", e)))?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    Ok(handled)
}

/// Serve MCP over the process's stdin and stdout
pub async fn run_stdio(state: AppState) -> Result<(), ServerError> {
    tracing::info!(tools = state.tools.len(), "Serving MCP over stdio");

    let reader = BufReader::new(tokio::io::stdin());
    let handled = serve_lines(state.tools.as_ref(), reader, tokio::io::stdout()).await?;

    tracing::info!(messages = handled, "stdin closed, stdio transport finished");
    Ok(())
}
