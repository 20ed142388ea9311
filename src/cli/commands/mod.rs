//! CLI command implementations

pub mod init;
pub mod status;
pub mod transfer;
pub mod validate;
