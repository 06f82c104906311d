pub mod argon2;
pub mod bcrypt;
pub mod errors;
pub mod hasher;

pub use errors::PasswordError;
pub use hasher::HashScheme;
pub use hasher::PasswordHasher;
