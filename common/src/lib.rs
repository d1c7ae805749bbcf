pub mod handler;
pub mod maze;
pub mod snapshot;
