pub mod bytecode;
pub mod chartable;
pub mod decoder;
pub mod encoder;
pub mod po;
pub mod refs;
pub mod tables;
pub mod text;
