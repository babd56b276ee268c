//! Error types for the record layer.

/// Errors that can occur when interpreting data from the store boundary.
///
/// Internally-produced values can never hit these — the role catalog is a
/// closed enum and records are built through constructors. They exist for
/// data that arrives from outside: a record written by another client, or
/// a hand-typed value from the presentation layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A role string outside the four defined roles.
    ///
    /// The distributor only ever produces catalog roles, so seeing this
    /// means a foreign writer put garbage in the record. Treated as fatal
    /// by callers — there is no sensible recovery.
    #[error("unknown role {0:?}")]
    UnknownRole(String),

    /// A room record that violates its structural invariants
    /// (host entry missing, started game with unassigned roles, ...).
    #[error("malformed room record: {0}")]
    InvalidRecord(String),
}
