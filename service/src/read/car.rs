//! [`Car`]-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::Car;

/// Indicator whether a [`Car`] is free of bookings for some period.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsAvailable(pub bool);

impl PartialEq<bool> for IsAvailable {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

pub mod list {
    //! [`Car`] list definitions.

    use crate::domain::{car, user, Car};
    #[cfg(doc)]
    use crate::domain::User;

    /// Filter of a [`Car`]s list.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`car::Location`] the listed [`Car`]s are picked up at.
        pub location: Option<car::Location>,

        /// ID of the [`User`] owning the listed [`Car`]s.
        pub owner_id: Option<user::Id>,

        /// Indicator whether only [`Car`]s offered for rent should be listed.
        pub only_available: bool,
    }

    impl Filter {
        /// Indicates whether the provided [`Car`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, car: &Car) -> bool {
            car.is_listed()
                && self
                    .location
                    .as_ref()
                    .map_or(true, |l| car.location.matches(l))
                && self.owner_id.map_or(true, |id| car.is_owned_by(id))
                && (!self.only_available || car.is_available)
        }
    }
}
