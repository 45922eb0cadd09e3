/// Token codec module
///
/// Produces and validates signed, time-bound tokens. The codec holds the
/// signing configuration given at startup and no mutable state; revocation
/// is the store layer's concern, not the codec's.
mod claims;
mod codec;

pub use claims::Claims;
pub use codec::TokenCodec;
pub use codec::TokenError;
pub use codec::TokenKind;
