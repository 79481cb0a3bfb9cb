pub mod collections;
pub mod logging;
