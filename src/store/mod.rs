/// Durable stores
///
/// Credential records and the revoked-token set, both on Postgres. The
/// database arbitrates concurrent writes; the application layer adds no
/// locking of its own.
pub mod credentials;
pub mod revocation;

pub use credentials::NewUser;
pub use credentials::UserRecord;
