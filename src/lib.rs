pub mod commands;
pub mod config;
pub mod display;
pub mod event;
pub mod extract;
pub mod gateway;
pub mod normalize;
pub mod session;
pub mod store;
pub mod watch;
