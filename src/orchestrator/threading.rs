//! Threads results from one command into the missing arguments of the next
//! one in a script. Grounded on `transferablecommandresult.cpp`'s
//! `ComputeTradeAmountAndExchanges`/`ComputeWithdrawAmount`.

use crate::exchange_name::PrivateExchangeName;
use crate::money::MonetaryAmount;

use super::command::OrchestratorCommand;

/// What one exchange handed back from a completed command: the amount it
/// produced and which account produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferableCommandResult {
    pub targeted_exchange: PrivateExchangeName,
    pub resulted_amount: MonetaryAmount,
}

impl TransferableCommandResult {
    pub fn new(targeted_exchange: PrivateExchangeName, resulted_amount: MonetaryAmount) -> Self {
        TransferableCommandResult { targeted_exchange, resulted_amount }
    }
}

/// Resolves the `(amount, exchanges)` a follow-up Trade command should run
/// with. `None` means: log and skip this command.
///
/// - An explicit amount on the command wins outright; previous results are
///   ignored.
/// - Otherwise, every previous result must share one currency; their amounts
///   are accumulated and deduplicated exchange names collected.
pub fn compute_trade_amount_and_exchanges(
    cmd: &OrchestratorCommand,
    previous: &[TransferableCommandResult],
) -> Option<(MonetaryAmount, Vec<PrivateExchangeName>)> {
    if let Some(amount) = cmd.amount {
        return Some((amount, cmd.exchange_names.clone()));
    }

    let mut accumulated: Option<MonetaryAmount> = None;
    let mut exchange_names: Vec<PrivateExchangeName> = Vec::new();
    for result in previous {
        accumulated = Some(match accumulated {
            None => result.resulted_amount,
            Some(acc) => {
                if acc.currency_code() != result.resulted_amount.currency_code() {
                    tracing::error!("skipping trade as there are multiple currencies in previous resulted amounts");
                    return None;
                }
                log_and_drop_error(acc.checked_add(result.resulted_amount))?
            }
        });
        if !exchange_names.contains(&result.targeted_exchange) {
            exchange_names.push(result.targeted_exchange.clone());
        }
    }

    accumulated.map(|amount| (amount, exchange_names))
}

/// Resolves the `(amount, source exchange)` a follow-up Withdraw command
/// should run with.
///
/// - With an explicit amount and both source and destination exchanges
///   named, that amount and the source exchange are used outright.
/// - With no amount and only the destination exchange named, exactly one
///   previous result is required; its amount and source exchange are used.
pub fn compute_withdraw_amount(
    cmd: &OrchestratorCommand,
    previous: &[TransferableCommandResult],
) -> Option<(MonetaryAmount, PrivateExchangeName)> {
    if cmd.amount.is_none() && cmd.exchange_names.len() == 1 {
        if previous.len() != 1 {
            tracing::error!(
                destination = %cmd.exchange_names[0],
                previous_len = previous.len(),
                "skipping withdraw as invalid previous transferable results size, expected 1"
            );
            return None;
        }
        let result = &previous[0];
        return Some((result.resulted_amount, result.targeted_exchange.clone()));
    }
    if cmd.exchange_names.len() == 2 {
        if let Some(amount) = cmd.amount {
            return Some((amount, cmd.exchange_names[0].clone()));
        }
    }
    None
}

fn log_and_drop_error<T>(result: Result<T, crate::error::MoneyError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::error!(%err, "arithmetic error accumulating previous trade results");
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::exchange_name::ExchangeName;
    use crate::orchestrator::command::CommandKind;

    fn private(exchange: ExchangeName) -> PrivateExchangeName {
        PrivateExchangeName::new(exchange, None)
    }

    fn amount(v: &str) -> MonetaryAmount {
        MonetaryAmount::parse(v).unwrap()
    }

    #[test]
    fn explicit_amount_ignores_previous_results() {
        let cmd = OrchestratorCommand::new(CommandKind::Trade).with_amount(amount("100 USDT"), false);
        let previous = vec![TransferableCommandResult::new(private(ExchangeName::Kraken), amount("50 USDT"))];
        let (resolved, _) = compute_trade_amount_and_exchanges(&cmd, &previous).unwrap();
        assert_eq!(resolved, amount("100 USDT"));
    }

    #[test]
    fn same_currency_previous_results_accumulate() {
        let cmd = OrchestratorCommand::new(CommandKind::Trade);
        let previous = vec![
            TransferableCommandResult::new(private(ExchangeName::Kraken), amount("50 USDT")),
            TransferableCommandResult::new(private(ExchangeName::Binance), amount("25 USDT")),
        ];
        let (resolved, exchanges) = compute_trade_amount_and_exchanges(&cmd, &previous).unwrap();
        assert_eq!(resolved, amount("75 USDT"));
        assert_eq!(exchanges.len(), 2);
    }

    #[test]
    fn mixed_currency_previous_results_are_skipped() {
        let cmd = OrchestratorCommand::new(CommandKind::Trade);
        let previous = vec![
            TransferableCommandResult::new(private(ExchangeName::Kraken), amount("50 USDT")),
            TransferableCommandResult::new(private(ExchangeName::Binance), amount("25 EUR")),
        ];
        assert!(compute_trade_amount_and_exchanges(&cmd, &previous).is_none());
    }

    #[test]
    fn withdraw_with_single_destination_requires_exactly_one_previous_result() {
        let cmd = OrchestratorCommand::new(CommandKind::Withdraw)
            .with_exchange_names(vec![private(ExchangeName::Kraken)]);
        let previous = vec![TransferableCommandResult::new(private(ExchangeName::Binance), amount("1 BTC"))];
        let (resolved_amount, source) = compute_withdraw_amount(&cmd, &previous).unwrap();
        assert_eq!(resolved_amount, amount("1 BTC"));
        assert_eq!(source, private(ExchangeName::Binance));
    }

    #[test]
    fn withdraw_with_wrong_previous_result_count_is_skipped() {
        let cmd = OrchestratorCommand::new(CommandKind::Withdraw)
            .with_exchange_names(vec![private(ExchangeName::Kraken)]);
        let previous = vec![];
        assert!(compute_withdraw_amount(&cmd, &previous).is_none());
    }

    #[test]
    fn withdraw_with_explicit_amount_and_both_exchanges_ignores_previous() {
        let cmd = OrchestratorCommand::new(CommandKind::Withdraw)
            .with_exchange_names(vec![private(ExchangeName::Binance), private(ExchangeName::Kraken)])
            .with_amount(amount("1 BTC"), false);
        let (resolved_amount, source) = compute_withdraw_amount(&cmd, &[]).unwrap();
        assert_eq!(resolved_amount, amount("1 BTC"));
        assert_eq!(source, private(ExchangeName::Binance));
    }
}
