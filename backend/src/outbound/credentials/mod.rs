//! Credential adapters: token signing, password hashing and code generation.

mod argon2_hasher;
mod jwt;
mod otp_generator;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt::{JwtSettings, JwtTokenIssuer};
pub use otp_generator::RandomOtpCodeGenerator;
