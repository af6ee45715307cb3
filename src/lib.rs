pub mod channel;
pub mod clock;
pub mod collector;
pub mod config;
pub mod coordinator;
pub mod producer;
