pub mod http;

mod config;
pub use config::Config;

mod error;
pub use error::{Error, Result};

mod observability;
pub use observability::configure_observability;

pub mod options;
pub use options::{OptionValue, ResolvedOptions};

pub mod correlator;
pub use correlator::{ResponseCorrelator, MODAL_TIMEOUT};

mod context;
pub use context::InteractionContext;

mod dispatcher;
pub use dispatcher::{CommandHandler, ComponentHandler, Dispatcher};

mod gateway;
pub use gateway::Gateway;

pub mod handlers;

#[cfg(test)]
mod testing;
