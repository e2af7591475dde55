/// Identifier syntax
///
/// The gateway only checks that a path segment is a syntactically valid DID.
/// Whether the DID exists is decided later by the identity agent.

pub mod did;

pub use did::{is_valid_identifier, Did};
