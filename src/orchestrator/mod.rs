//! Groups independent commands, threads *transferable results* between
//! adjacent commands in a script, and repeats the whole script on a
//! schedule. Does not itself call any [`crate::exchange::Exchange`] — the
//! process layer drives dispatch and feeds results back through
//! [`threading`].

mod command;
mod schedule;
mod threading;

pub use command::{group_batchable, CommandKind, OrchestratorCommand};
pub use schedule::{run_repeating, CancellationFlag, Repeats};
pub use threading::{compute_trade_amount_and_exchanges, compute_withdraw_amount, TransferableCommandResult};
