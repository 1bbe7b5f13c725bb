pub mod options;
pub mod probe;
pub mod source;
pub mod stats;
