use tokio_util::sync::CancellationToken;

pub mod generate_script;
pub mod migrate_repo;
pub mod wait_for_migration;

/// Token that fires on Ctrl-C. Cancelling a wait never stops the remote
/// migration; it only stops us watching it.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping the wait");
            signal_token.cancel();
        }
    });
    token
}
