pub mod config;
pub mod error;
pub mod events;
pub mod hex;
pub mod query;
pub mod refresh;
pub mod repository;
pub mod retry;
pub mod rpc;
pub mod scanner;

pub use config::Config;
pub use error::{MalformedHex, RefreshError, RpcError};
pub use refresh::{RefreshReport, RefreshState, Refresher};
