pub mod batch;
pub mod codec;
pub mod command;
pub mod fileformat;
pub mod neighbor;
pub mod record;
pub mod runtime;
