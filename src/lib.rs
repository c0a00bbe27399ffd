pub mod app;
pub mod common;
pub mod domain;
pub mod generation;
pub mod io;
pub mod store;
pub mod worker;
