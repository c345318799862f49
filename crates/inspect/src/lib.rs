//! Library side of `resp-inspect`: configuration, stream inspection and
//! `redis-cli` style rendering of RESP values.

pub mod config;
pub mod inspect;
pub mod render;

pub use inspect::InspectError;
pub use inspect::Summary;
pub use inspect::run;
