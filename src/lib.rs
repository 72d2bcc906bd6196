#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod coordinator;
pub mod error;
pub mod game;
pub mod metrics;
pub mod routes;
pub mod startup;
pub mod websocket;
