pub mod crypto;
pub mod line_signature;
pub mod markers;
pub mod token;
