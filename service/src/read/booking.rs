//! [`Booking`]-related read definitions.

use derive_more::{From, Into};

use crate::domain::{user, Booking};
#[cfg(doc)]
use crate::domain::User;

/// Party of [`Booking`]s a [`User`] takes part in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Party {
    /// [`User`] renting the booked car.
    Renter(user::Id),

    /// [`User`] owning the booked car.
    Owner(user::Id),
}

impl Party {
    /// Indicates whether the provided [`Booking`] is made by this [`Party`].
    #[must_use]
    pub fn takes_part_in(&self, booking: &Booking) -> bool {
        match *self {
            Self::Renter(id) => booking.user_id == id,
            Self::Owner(id) => booking.owner_id == id,
        }
    }
}

/// Number of [`Booking`]s still having to be fulfilled.
#[derive(Clone, Copy, Debug, Default, Eq, From, Hash, Into, PartialEq)]
pub struct ActiveCount(i64);

impl ActiveCount {
    /// Indicates whether there are no active [`Booking`]s at all.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}
