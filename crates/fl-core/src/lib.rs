pub mod badge;
pub mod chat;
pub mod config;
pub mod desk;
pub mod error;
pub mod followup;
pub mod frontloop;
pub mod help;
pub mod knowledge;
pub mod lifecycle;
pub mod list_view;
pub mod notifications;
pub mod remote;
pub mod store;
pub mod sync;

pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::config::Settings;
pub use crate::error::{ClientError, FrontloopError};
pub use crate::frontloop::Frontloop;
pub use crate::notifications::NotificationCenter;
pub use crate::store::Store;
pub use crate::sync::{Observer, PollingSynchronizer};
