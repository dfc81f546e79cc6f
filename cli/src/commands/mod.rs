//! CLI command implementations.

mod crypto;
mod keygen;
mod registry;

pub use crypto::{decrypt, encrypt, print_random, sign, verify};
pub use keygen::generate_keys;
pub use registry::{register, show};
