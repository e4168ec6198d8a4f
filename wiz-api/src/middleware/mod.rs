pub mod session;

pub use session::{require_privileged, Session, SessionClaims, CLIENT_HEADER};
