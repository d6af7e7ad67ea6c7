//! [`Query`] collection related to the multiple [`Booking`]s.

use common::operations::By;

use crate::{domain::Booking, read};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries [`Booking`]s a [`User`] takes part in, the newest first.
pub type OfParty = DatabaseQuery<By<Vec<Booking>, read::booking::Party>>;
