pub mod dto;
pub mod envelope;
pub mod error_code;
pub mod role;
#[cfg(feature = "validation")]
pub mod validation;
