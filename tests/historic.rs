use alloy::{primitives::U256, rpc::types::Log};
use event_bindings::{
    BindingError, ContractFilterer, EventFilter, FilterOpts, IteratorState, MemoryLogSource,
    SolEventDecoder, topic_rule,
};

mod common;

use common::{A, B, C, CountIncreased, TOKEN, Transfer, mined, three_transfer_logs, three_transfers};

fn token(logs: Vec<Log>) -> ContractFilterer<MemoryLogSource> {
    ContractFilterer::new(TOKEN, MemoryLogSource::with_logs(logs))
}

#[tokio::test]
async fn three_transfers_are_yielded_in_order_then_iteration_ends() -> anyhow::Result<()> {
    let mut iter =
        token(three_transfer_logs()).filter::<Transfer>(&FilterOpts::new(), vec![]).await?;

    for expected in three_transfers() {
        let typed = iter.next().await.expect("a record")?;
        assert_eq!(typed.event, expected);
    }
    assert!(iter.next().await.is_none());
    assert_eq!(iter.state(), &IteratorState::Exhausted);
    assert!(iter.state().error().is_none());

    Ok(())
}

#[tokio::test]
async fn raw_log_is_kept_for_provenance() -> anyhow::Result<()> {
    let logs = three_transfer_logs();
    let events = token(logs.clone())
        .filter::<Transfer>(&FilterOpts::new(), vec![])
        .await?
        .try_collect()
        .await?;

    let raw: Vec<_> = events.into_iter().map(|typed| typed.raw).collect();
    assert_eq!(raw, logs);

    Ok(())
}

#[tokio::test]
async fn sender_rule_selects_matching_transfers() -> anyhow::Result<()> {
    let events = token(three_transfer_logs())
        .filter::<Transfer>(&FilterOpts::new(), vec![topic_rule(&[A])])
        .await?
        .try_collect()
        .await?;

    let recipients: Vec<_> = events.iter().map(|typed| typed.event.to).collect();
    assert_eq!(recipients, vec![B, C]);

    Ok(())
}

#[tokio::test]
async fn block_bounds_are_inclusive() -> anyhow::Result<()> {
    let events = token(three_transfer_logs())
        .filter::<Transfer>(&FilterOpts::new().from_block(2).to_block(3), vec![])
        .await?
        .try_collect()
        .await?;

    let blocks: Vec<_> = events.iter().filter_map(|typed| typed.block_number()).collect();
    assert_eq!(blocks, vec![2, 3]);

    Ok(())
}

#[tokio::test]
async fn failure_is_sticky() -> anyhow::Result<()> {
    // the filter has no signature, so the counter log reaches the transfer decoder
    let mut logs = three_transfer_logs();
    logs.insert(1, mined(&CountIncreased { newCount: U256::from(1) }, 1, 1));

    let mut iter = token(logs)
        .filter_with::<Transfer, _>(EventFilter::new(), &FilterOpts::new(), SolEventDecoder::new())
        .await?;

    assert!(iter.next().await.expect("first record").is_ok());
    let err = iter.next().await.expect("the failure").expect_err("decode failure");
    assert!(err.is_decode_error());

    for _ in 0..3 {
        assert!(iter.next().await.is_none());
    }
    assert_eq!(iter.state().error(), Some(&err));

    Ok(())
}

#[tokio::test]
async fn close_is_idempotent_even_without_iterating() -> anyhow::Result<()> {
    let mut iter =
        token(three_transfer_logs()).filter::<Transfer>(&FilterOpts::new(), vec![]).await?;

    iter.close();
    iter.close();

    assert!(iter.next().await.is_none());
    Ok(())
}

#[tokio::test]
async fn retrieval_error_is_returned_before_iteration() {
    let source = MemoryLogSource::new();
    source.fail_fetches_with(BindingError::Timeout);

    let result =
        ContractFilterer::new(TOKEN, source).filter::<Transfer>(&FilterOpts::new(), vec![]).await;

    assert!(matches!(result, Err(BindingError::Timeout)));
}
