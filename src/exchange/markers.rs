//! Zero-behavior adapters: one per supported platform, each reporting only
//! its own name and otherwise falling through to the trait's
//! `NotImplemented` defaults. HTTP transport and exchange-specific wire
//! formats are out of scope for this core; these exist so the orchestrator
//! and its tests have concrete, nameable [`Exchange`] values to hold.

use super::Exchange;
use crate::exchange_name::ExchangeName;

macro_rules! marker_adapter {
    ($name:ident, $exchange_name:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Exchange for $name {
            fn name(&self) -> ExchangeName {
                $exchange_name
            }
        }
    };
}

marker_adapter!(Binance, ExchangeName::Binance);
marker_adapter!(Bithumb, ExchangeName::Bithumb);
marker_adapter!(Huobi, ExchangeName::Huobi);
marker_adapter!(Kraken, ExchangeName::Kraken);
marker_adapter!(Kucoin, ExchangeName::Kucoin);
marker_adapter!(Upbit, ExchangeName::Upbit);
