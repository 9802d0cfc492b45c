pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod platform;
pub mod profiles;
pub mod sheet;

#[cfg(test)]
pub mod test_helpers;
