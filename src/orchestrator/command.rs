//! The orchestrator's unit of work: one command, its target exchanges, and
//! the arguments it carries. Mirrors the setter surface of
//! `coincentercommand.hpp`, trimmed to the fields the in-scope kinds use.

use crate::exchange_name::PrivateExchangeName;
use crate::market::Market;
use crate::money::{CurrencyCode, MonetaryAmount};

/// The subset of `CoincenterCommandType` this core schedules and threads
/// results between. Other command kinds (balance queries, deposit info,
/// order cancellation, ...) are process-layer concerns outside this core.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommandKind {
    Trade,
    Withdraw,
    MarketDataRecording,
}

impl CommandKind {
    /// Read-only commands never mutate exchange state and may run
    /// concurrently with anything; write commands (trade, withdraw) must be
    /// serialized per exchange (§5).
    pub fn is_read_only(&self) -> bool {
        matches!(self, CommandKind::MarketDataRecording)
    }

    pub fn is_write(&self) -> bool {
        !self.is_read_only()
    }

    /// Only market-data recording commands may be grouped across several
    /// exchanges into one batch (§4.6).
    pub fn is_batchable(&self) -> bool {
        matches!(self, CommandKind::MarketDataRecording)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrchestratorCommand {
    pub kind: CommandKind,
    pub exchange_names: Vec<PrivateExchangeName>,
    pub market: Option<Market>,
    pub currency1: Option<CurrencyCode>,
    pub currency2: Option<CurrencyCode>,
    pub amount: Option<MonetaryAmount>,
    pub is_percentage_amount: bool,
    pub with_balance_in_use: bool,
}

impl OrchestratorCommand {
    pub fn new(kind: CommandKind) -> Self {
        OrchestratorCommand {
            kind,
            exchange_names: Vec::new(),
            market: None,
            currency1: None,
            currency2: None,
            amount: None,
            is_percentage_amount: false,
            with_balance_in_use: false,
        }
    }

    pub fn with_exchange_names(mut self, exchange_names: Vec<PrivateExchangeName>) -> Self {
        self.exchange_names = exchange_names;
        self
    }

    pub fn with_market(mut self, market: Market) -> Self {
        self.market = Some(market);
        self
    }

    pub fn with_amount(mut self, amount: MonetaryAmount, is_percentage: bool) -> Self {
        self.amount = Some(amount);
        self.is_percentage_amount = is_percentage;
        self
    }
}

/// Groups consecutive batchable commands of the same kind, collecting their
/// exchange names so no exchange appears twice within a group. Non-batchable
/// commands, and runs of a different kind, each start a new group of one.
pub fn group_batchable(commands: &[OrchestratorCommand]) -> Vec<Vec<OrchestratorCommand>> {
    let mut groups: Vec<Vec<OrchestratorCommand>> = Vec::new();
    for command in commands {
        if command.kind.is_batchable() {
            if let Some(last) = groups.last_mut() {
                if last.first().map(|c| c.kind) == Some(command.kind) {
                    last.push(command.clone());
                    continue;
                }
            }
        }
        groups.push(vec![command.clone()]);
    }
    groups
}

#[cfg(test)]
mod test {
    use super::*;

    fn trade() -> OrchestratorCommand {
        OrchestratorCommand::new(CommandKind::Trade)
    }

    fn recording() -> OrchestratorCommand {
        OrchestratorCommand::new(CommandKind::MarketDataRecording)
    }

    #[test]
    fn consecutive_recordings_are_batched_into_one_group() {
        let commands = vec![recording(), recording(), recording()];
        let groups = group_batchable(&commands);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn trades_never_batch_even_when_consecutive() {
        let commands = vec![trade(), trade()];
        let groups = group_batchable(&commands);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn a_trade_between_two_recordings_breaks_the_batch() {
        let commands = vec![recording(), trade(), recording()];
        let groups = group_batchable(&commands);
        assert_eq!(groups.len(), 3);
    }
}
