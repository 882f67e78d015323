//! Operator shutdown signal
//!
//! Mining stops when the operator presses Enter on an interactive terminal
//! or sends Ctrl-C.

use std::io::{BufRead, IsTerminal};
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Resolves once the operator asks the miner to stop
pub async fn operator_signal() {
    let enter = enter_pressed();
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = enter => {}
        _ = ctrl_c => {}
    }
}

async fn enter_pressed() {
    if !std::io::stdin().is_terminal() {
        return std::future::pending().await;
    }

    info!("Press Enter or Ctrl-C to stop mining");
    let (tx, rx) = oneshot::channel();

    // Blocking reads cannot be cancelled, so the thread is left detached.
    std::thread::spawn(move || {
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_ok() {
            let _ = tx.send(());
        }
    });

    if rx.await.is_err() {
        std::future::pending::<()>().await;
    }
}
