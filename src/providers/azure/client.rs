mod core;
mod definitions;
mod endpoints;
mod listing;

pub use self::core::{AzureClient, ConnectionSettings};
#[cfg(test)]
pub(crate) use self::core::tests::test_settings;
