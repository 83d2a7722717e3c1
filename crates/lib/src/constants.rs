//! Constants shared across the userinfo library.

/// Flag naming the rendezvous server handed to clients in `Config`.
///
/// An empty value means no rendezvous server is configured.
pub const RENDEZVOUS_SERVER_FLAG: &str = "use.rendezvousserver";

/// Environment prefix used by `flags::EnvFlags` when none is given.
pub const DEFAULT_FLAG_ENV_PREFIX: &str = "USERINFO";
