//! Core types shared by adapters, the switchboard and the pipeline.

pub mod generation;
pub mod message;
pub mod response;

pub use generation::*;
pub use message::*;
pub use response::*;
