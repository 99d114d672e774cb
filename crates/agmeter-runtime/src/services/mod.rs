pub mod stats;
pub mod sync;
