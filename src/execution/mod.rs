//! Order dispatch

mod dispatcher;
mod paper;

pub use dispatcher::{DispatchSummary, OrderDispatcher};
pub use paper::PaperBroker;
