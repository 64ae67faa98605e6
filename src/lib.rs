pub mod backend;
pub mod booking_view;
pub mod calendar;
pub mod clock;
pub mod configuration;
pub mod configuration_handler;
pub mod error;
pub mod http;
pub mod selection;
pub mod slot_fetcher;
pub mod terminal;
#[cfg(test)]
mod testutils;
pub mod types;
