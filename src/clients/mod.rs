/// Typed HTTP clients for remote collaborators: one plain struct with one
/// method per remote call, explicit timeout attached per call.
mod profile;
mod validation;

pub use profile::ProfileClient;
pub use validation::ValidationClient;
