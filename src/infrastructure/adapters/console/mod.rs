//! Stdin adapter for the developer console

use std::future::Future;
use std::io::BufRead;
use std::sync::Arc;
use crate::application::console::Console;
use crate::application::services::ConsoleContext;

/// Read console lines from stdin until EOF, dispatching them one at a time
pub async fn run_stdin(console: Arc<Console<ConsoleContext>>, ctx: ConsoleContext) {
    tracing::info!("Console ready");
    loop {
        let line = match tokio::task::spawn_blocking(read_line).await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Console reader failed: {}", e);
                break;
            }
        };

        if line.is_empty() {
            continue;
        }
        run_line(&console, &ctx, &line).await;
    }
    tracing::info!("Console closed");
}

/// Dispatch one line; errors are logged, never returned
pub async fn run_line(console: &Console<ConsoleContext>, ctx: &ConsoleContext, line: &str) {
    match console.dispatch(ctx.fresh(), line).await {
        Ok(status) => tracing::debug!("'{}' exited with {}", line, status.code()),
        Err(e) => tracing::error!("{}", e),
    }
}

/// Run `future` to completion on a new runtime
///
/// The stdin reader may still be parked in a blocking read when the client
/// stops, so the runtime is shut down without waiting for blocking tasks.
pub fn block_on<F: Future>(future: F) -> std::io::Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(future);
    rt.shutdown_background();
    Ok(output)
}

/// `None` at EOF or on a read error
fn read_line() -> Option<String> {
    let mut input = String::new();
    match std::io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}
