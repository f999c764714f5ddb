/// Authentication primitives for TaskNest
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and verification
///
/// The token service is constructed explicitly from configuration rather
/// than reading ambient global state, so it can be tested in isolation and
/// a secret rotation is just a new instance.
pub mod jwt;
pub mod password;
