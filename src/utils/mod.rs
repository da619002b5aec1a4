pub mod log;
pub mod path;
