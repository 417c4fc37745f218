//! Built-in quote sources.

pub mod cryptonatorcom;
pub mod fondidocit;

pub use cryptonatorcom::Cryptonatorcom;
pub use fondidocit::Fondidocit;
