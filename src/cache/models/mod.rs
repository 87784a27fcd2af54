pub mod token;

pub use token::CachedIdentity;
