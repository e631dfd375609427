//! Fetch command - run one request through the offline shell

use crate::app::App;
use crate::cli::args::FetchArgs;
use crate::error::{DexError, DexResult};
use crate::shell::ShellRequest;
use std::io::Write;
use tokio::fs;
use tracing::info;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, app: &App) -> DexResult<()> {
    let request = if args.navigate {
        ShellRequest::navigate(&args.url)
    } else {
        ShellRequest::subresource(&args.url)
    };

    let response = app
        .shell()
        .intercept(&request)
        .await
        .ok_or_else(|| DexError::NetworkUnavailable(format!("{} could not be served", args.url)))?;
    info!("{} -> {} ({} bytes)", args.url, response.status, response.body.len());

    match args.output {
        Some(path) => fs::write(&path, &response.body)
            .await
            .map_err(|e| DexError::io(format!("writing {}", path.display()), e))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&response.body)
                .and_then(|_| stdout.flush())
                .map_err(|e| DexError::io("writing response", e))?;
        }
    }

    Ok(())
}
