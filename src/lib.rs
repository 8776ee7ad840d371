pub mod app;
pub mod context;
pub mod focus;
pub mod multiplexer;
pub mod notify;
pub mod runner;
