use alloy::{primitives::Address, sol};

use crate::{ContractFilterer, LogSource};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event Approval(address indexed owner, address indexed spender, uint256 value);

    #[derive(Debug, PartialEq, Eq)]
    event BurnedStake(address addr, uint256 amount);

    #[derive(Debug, PartialEq, Eq)]
    event ContractUpgraded(string version);

    #[derive(Debug, PartialEq, Eq)]
    event MinimumBaseFeeUpdated(uint256 gasPrice);

    #[derive(Debug, PartialEq, Eq)]
    event MintedStake(address addr, uint256 amount);

    #[derive(Debug, PartialEq, Eq)]
    event RegisteredValidator(address treasury, address addr, string enode, address liquidContract);

    #[derive(Debug, PartialEq, Eq)]
    event RemovedValidator(address addr);

    #[derive(Debug, PartialEq, Eq)]
    event Rewarded(address addr, uint256 amount);

    #[derive(Debug, PartialEq, Eq)]
    event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Address of the Autonity contract: the first contract created by the zero deployer.
#[must_use]
pub fn autonity_contract_address() -> Address {
    Address::ZERO.create(0)
}

/// Event access for the Autonity contract.
#[derive(Clone, Debug)]
pub struct AutonityFilterer<S> {
    inner: ContractFilterer<S>,
}

impl<S: LogSource> AutonityFilterer<S> {
    #[must_use]
    pub fn new(address: Address, source: S) -> Self {
        Self { inner: ContractFilterer::new(address, source) }
    }

    /// Binds to the contract at [`autonity_contract_address`].
    #[must_use]
    pub fn deployed(source: S) -> Self {
        Self::new(autonity_contract_address(), source)
    }

    #[must_use]
    pub fn filterer(&self) -> &ContractFilterer<S> {
        &self.inner
    }

    event_methods! {
        Approval => filter_approval, watch_approval, parse_approval,
            [owner: Address, spender: Address];
        BurnedStake => filter_burned_stake, watch_burned_stake, parse_burned_stake;
        ContractUpgraded => filter_contract_upgraded, watch_contract_upgraded,
            parse_contract_upgraded;
        MinimumBaseFeeUpdated => filter_minimum_base_fee_updated, watch_minimum_base_fee_updated,
            parse_minimum_base_fee_updated;
        MintedStake => filter_minted_stake, watch_minted_stake, parse_minted_stake;
        RegisteredValidator => filter_registered_validator, watch_registered_validator,
            parse_registered_validator;
        RemovedValidator => filter_removed_validator, watch_removed_validator,
            parse_removed_validator;
        Rewarded => filter_rewarded, watch_rewarded, parse_rewarded;
        Transfer => filter_transfer, watch_transfer, parse_transfer, [from: Address, to: Address];
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{U256, address},
        sol_types::SolEvent,
    };
    use tokio::sync::mpsc;

    use super::*;
    use crate::{FilterOpts, MemoryLogSource, WatchOpts, test_utils::raw_log};

    const TREASURY: Address = address!("0x0000000000000000000000000000000000000101");
    const VALIDATOR: Address = address!("0x0000000000000000000000000000000000000202");
    const LIQUID: Address = address!("0x0000000000000000000000000000000000000303");

    fn registered() -> RegisteredValidator {
        RegisteredValidator {
            treasury: TREASURY,
            addr: VALIDATOR,
            enode: "enode://abc@127.0.0.1:30303".to_string(),
            liquidContract: LIQUID,
        }
    }

    fn bound(logs: Vec<alloy::rpc::types::Log>) -> AutonityFilterer<MemoryLogSource> {
        let logs = logs.into_iter().map(|mut log| {
            log.inner.address = autonity_contract_address();
            log
        });
        AutonityFilterer::deployed(MemoryLogSource::with_logs(logs))
    }

    #[test]
    fn signatures_match_the_contract_abi() {
        assert_eq!(
            RegisteredValidator::SIGNATURE,
            "RegisteredValidator(address,address,string,address)"
        );
        assert_eq!(MinimumBaseFeeUpdated::SIGNATURE, "MinimumBaseFeeUpdated(uint256)");
        assert_eq!(ContractUpgraded::SIGNATURE, "ContractUpgraded(string)");
    }

    #[tokio::test]
    async fn filters_events_with_dynamic_fields() -> anyhow::Result<()> {
        let autonity = bound(vec![
            raw_log(&registered(), 1, 0),
            raw_log(&RemovedValidator { addr: VALIDATOR }, 2, 0),
            raw_log(&ContractUpgraded { version: "v0.14.0".to_string() }, 3, 0),
        ]);

        let registered_events =
            autonity.filter_registered_validator(&FilterOpts::new()).await?.try_collect().await?;
        assert_eq!(registered_events.len(), 1);
        assert_eq!(registered_events[0].event, registered());

        let opts = FilterOpts::new().from_block(3);
        let mut upgrades = autonity.filter_contract_upgraded(&opts).await?;
        let upgrade = upgrades.next().await.expect("one upgrade")?;
        assert_eq!(upgrade.event.version, "v0.14.0");
        assert!(upgrades.next().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn transfer_filter_applies_indexed_arguments() -> anyhow::Result<()> {
        let to = address!("0x0000000000000000000000000000000000000404");
        let autonity = bound(vec![
            raw_log(&Transfer { from: TREASURY, to, value: U256::from(1) }, 1, 0),
            raw_log(&Transfer { from: VALIDATOR, to, value: U256::from(2) }, 1, 1),
        ]);

        let events = autonity
            .filter_transfer(&FilterOpts::new(), &[VALIDATOR], &[])
            .await?
            .try_collect()
            .await?;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.value, U256::from(2));
        Ok(())
    }

    #[tokio::test]
    async fn watch_rewarded_forwards_events() -> anyhow::Result<()> {
        let autonity = bound(vec![]);
        let (sink, mut received) = mpsc::channel(4);

        let mut session = autonity.watch_rewarded(&WatchOpts::new(), sink).await?;
        let feed = autonity.filterer().source().take_feed().expect("subscription opened");

        let reward = Rewarded { addr: VALIDATOR, amount: U256::from(10) };
        assert!(feed.send(raw_log(&reward, 5, 0)).await.is_open());

        let event = received.recv().await.expect("reward delivered");
        assert_eq!(event.event, reward);

        session.unsubscribe();
        assert!(session.wait().await.is_ok());
        Ok(())
    }

    #[test]
    fn parse_minimum_base_fee_updated() -> anyhow::Result<()> {
        let autonity = bound(vec![]);
        let update = MinimumBaseFeeUpdated { gasPrice: U256::from(500_000_000u64) };

        let parsed = autonity.parse_minimum_base_fee_updated(raw_log(&update, 1, 0))?;

        assert_eq!(parsed.event, update);
        assert!(autonity.parse_burned_stake(raw_log(&update, 1, 0)).is_err());
        Ok(())
    }
}
