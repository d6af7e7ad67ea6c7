//! [`Car`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Car listed for rent by its owner.
#[derive(Clone, Debug)]
pub struct Car {
    /// ID of this [`Car`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Car`].
    ///
    /// [`None`] once this [`Car`] is removed from listing by its owner.
    pub owner_id: Option<user::Id>,

    /// [`Brand`] of this [`Car`].
    pub brand: Brand,

    /// [`Model`] of this [`Car`].
    pub model: Model,

    /// Manufacturing year of this [`Car`].
    pub year: Year,

    /// [`Category`] of this [`Car`].
    pub category: Category,

    /// Number of seats in this [`Car`].
    pub seating_capacity: SeatingCapacity,

    /// [`Transmission`] of this [`Car`].
    pub transmission: Transmission,

    /// [`FuelType`] of this [`Car`].
    pub fuel_type: FuelType,

    /// Rent price of this [`Car`] for a single day.
    pub price_per_day: Money,

    /// [`Location`] this [`Car`] is picked up at.
    pub location: Location,

    /// [`Description`] of this [`Car`].
    pub description: Description,

    /// Indicator whether this [`Car`] is offered for rent by its owner.
    ///
    /// Independent of the bookings made upon this [`Car`].
    pub is_available: bool,

    /// [`DateTime`] when this [`Car`] was created.
    pub created_at: CreationDateTime,
}

impl Car {
    /// Indicates whether this [`Car`] belongs to the [`User`] with the
    /// provided ID.
    #[must_use]
    pub fn is_owned_by(&self, user_id: user::Id) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Indicates whether this [`Car`] is still listed by its owner.
    #[must_use]
    pub fn is_listed(&self) -> bool {
        self.owner_id.is_some()
    }

    /// Removes this [`Car`] from listing, keeping it for the history of its
    /// bookings.
    pub fn unlist(&mut self) {
        self.owner_id = None;
        self.is_available = false;
    }
}

/// ID of a [`Car`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Brand of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Brand(String);

impl Brand {
    /// Creates a new [`Brand`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `brand` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(brand: impl Into<String>) -> Self {
        Self(brand.into())
    }

    /// Creates a new [`Brand`] if the given `brand` is valid.
    #[must_use]
    pub fn new(brand: impl Into<String>) -> Option<Self> {
        let brand = brand.into();
        is_short_text(&brand).then_some(Self(brand))
    }
}

impl FromStr for Brand {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Brand`")
    }
}

/// Model of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `model` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(model: impl Into<String>) -> Self {
        Self(model.into())
    }

    /// Creates a new [`Model`] if the given `model` is valid.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        is_short_text(&model).then_some(Self(model))
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// Location a [`Car`] is picked up at.
///
/// Compared case-insensitively when searching for [`Car`]s.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `location` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        is_short_text(&location).then_some(Self(location))
    }

    /// Indicates whether this [`Location`] is the same place as the `other`
    /// one.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// Free-form description of a [`Car`].
#[derive(AsRef, Clone, Debug, Default, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `text` is valid.
    ///
    /// Empty [`Description`]s are allowed.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.trim() == text && text.len() <= 4096).then_some(Self(text))
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Checks whether the given `text` is a trimmed non-empty line of a sane
/// length.
fn is_short_text(text: &str) -> bool {
    text.trim() == text && !text.is_empty() && text.len() <= 128
}

/// Manufacturing year of a [`Car`].
pub type Year = u16;

/// Number of seats in a [`Car`].
pub type SeatingCapacity = u16;

define_kind! {
    #[doc = "Body category of a [`Car`]."]
    enum Category {
        #[doc = "Sedan."]
        Sedan = 1,

        #[doc = "Sport utility vehicle."]
        Suv = 2,

        #[doc = "Van."]
        Van = 3,
    }
}

define_kind! {
    #[doc = "Transmission of a [`Car`]."]
    enum Transmission {
        #[doc = "Manual gearbox."]
        Manual = 1,

        #[doc = "Automatic gearbox."]
        Automatic = 2,

        #[doc = "Automated manual gearbox."]
        SemiAutomatic = 3,
    }
}

define_kind! {
    #[doc = "Fuel type of a [`Car`]."]
    enum FuelType {
        #[doc = "Gas."]
        Gas = 1,

        #[doc = "Diesel."]
        Diesel = 2,

        #[doc = "Petrol."]
        Petrol = 3,

        #[doc = "Battery electric."]
        Electric = 4,

        #[doc = "Hybrid electric."]
        Hybrid = 5,
    }
}

/// [`DateTime`] when a [`Car`] was created.
pub type CreationDateTime = DateTimeOf<(Car, unit::Creation)>;
