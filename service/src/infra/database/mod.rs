//! [`Database`]-related implementations.

#[cfg(test)]
pub(crate) mod mock;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    /// Violation of the exclusion constraint with the provided name, raised
    /// by the in-memory [`Database`].
    #[cfg(test)]
    #[display("Exclusion constraint `{_0}` is violated")]
    #[from(ignore)]
    MockExclusionViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the unique constraint
    /// with the provided name.
    ///
    /// Any unique constraint matches if no name is provided.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_unique_violation(constraint),
            #[cfg(test)]
            Self::MockExclusionViolation(_) => false,
        }
    }

    /// Checks whether this [`Error`] is a violation of the exclusion
    /// constraint with the provided name.
    ///
    /// Any exclusion constraint matches if no name is provided.
    #[must_use]
    pub fn is_exclusion_violation(&self, constraint: Option<&str>) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_exclusion_violation(constraint),
            #[cfg(test)]
            Self::MockExclusionViolation(name) => {
                constraint.map_or(true, |c| c == name)
            }
        }
    }
}
