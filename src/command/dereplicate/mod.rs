mod command;
pub mod constants;
pub mod core;

pub use command::DereplicateCMD;
pub use self::core::core::Dereplicate;
