pub mod batch;
pub mod common;
pub mod decode;
