pub mod info;
pub mod stats;
pub mod sync;
pub mod usage;
