//! Pipeline services
//!
//! Status sources, the transaction monitor and the per-user chat session.

pub mod monitor;
pub mod session;
pub mod status;

pub use monitor::{
    IntervalTicker, ManualTicker, MonitorCore, MonitorState, MonitorStatus, MonitorSubscription,
    StatusKind, TickHandle, Ticker, TransactionMonitor,
};
pub use session::{ChatSession, DisplayEvent, Submission};
pub use status::{
    LayeredStatusSource, ReceiptStatusSource, StatusReport, StatusSource, TransactionRecord,
};
