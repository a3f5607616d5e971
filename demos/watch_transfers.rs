//! Prints the last day of Autonity `Transfer` events, then follows new ones until Ctrl-C.
//!
//! ```sh
//! RPC_URL=wss://rpc.example.org RUST_LOG=event_bindings=debug \
//!     cargo run --example watch_transfers
//! ```

use std::time::Duration;

use event_bindings::{
    FilterOpts, WatchOpts, bindings::AutonityFilterer, robust_provider::{RobustProvider, RobustProviderBuilder},
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const BLOCKS_PER_DAY: u64 = 86_400;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).try_init();

    let url = std::env::var("RPC_URL").unwrap_or_else(|_| "ws://localhost:8546".to_string());

    let provider: RobustProvider = RobustProviderBuilder::new(url.as_str())
        .call_timeout(Duration::from_secs(30))
        .max_retries(5)
        .min_delay(Duration::from_millis(500))
        .build()
        .await?;
    let latest = alloy::providers::Provider::get_block_number(provider.primary()).await?;
    let autonity = AutonityFilterer::deployed(provider);

    let opts = FilterOpts::new().from_block(latest.saturating_sub(BLOCKS_PER_DAY));
    let mut past = autonity.filter_transfer(&opts, &[], &[]).await?;
    while let Some(transfer) = past.next().await {
        let transfer = transfer?;
        info!(
            block = ?transfer.block_number(),
            from = %transfer.event.from,
            to = %transfer.event.to,
            value = %transfer.event.value,
            "Past transfer"
        );
    }

    let (sink, mut transfers) = mpsc::channel(64);
    let mut session = autonity.watch_transfer(&WatchOpts::new(), sink, &[], &[]).await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                session.unsubscribe();
                break;
            }
            Some(transfer) = transfers.recv() => {
                info!(
                    block = ?transfer.block_number(),
                    from = %transfer.event.from,
                    to = %transfer.event.to,
                    value = %transfer.event.value,
                    "New transfer"
                );
            }
            else => break,
        }
    }

    if let Err(e) = session.wait().await {
        error!("Watch session failed: {}", e);
    }

    Ok(())
}
