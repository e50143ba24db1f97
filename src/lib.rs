pub mod auth;
pub mod config;
pub mod error;
pub mod paths;
pub mod routes;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
