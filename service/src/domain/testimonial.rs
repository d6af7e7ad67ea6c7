//! [`Testimonial`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Review of the service left by a [`User`].
#[derive(Clone, Debug)]
pub struct Testimonial {
    /// ID of this [`Testimonial`].
    pub id: Id,

    /// ID of the [`User`] who wrote this [`Testimonial`].
    pub author_id: user::Id,

    /// [`Name`] this [`Testimonial`] is signed with.
    pub name: Name,

    /// [`Rating`] given by this [`Testimonial`].
    pub rating: Rating,

    /// [`Text`] of this [`Testimonial`].
    pub text: Text,

    /// IDs of the [`User`]s who reported this [`Testimonial`], in the order
    /// of reporting.
    pub reported_by: Vec<user::Id>,

    /// [`DateTime`] when this [`Testimonial`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Testimonial`] was modified last time.
    pub updated_at: ModificationDateTime,
}

impl Testimonial {
    /// Number of reports removing a [`Testimonial`].
    pub const REMOVAL_REPORTS: usize = 5;

    /// Indicates whether this [`Testimonial`] is written by the [`User`] with
    /// the provided ID.
    #[must_use]
    pub fn is_written_by(&self, user_id: user::Id) -> bool {
        self.author_id == user_id
    }

    /// Reports this [`Testimonial`] by the [`User`] with the provided ID.
    ///
    /// Returns `false` if the [`User`] has reported it already.
    pub fn report(&mut self, by: user::Id) -> bool {
        if self.reported_by.contains(&by) {
            return false;
        }
        self.reported_by.push(by);
        true
    }

    /// Indicates whether this [`Testimonial`] is reported enough times to be
    /// removed.
    #[must_use]
    pub fn is_to_be_removed(&self) -> bool {
        self.reported_by.len() >= Self::REMOVAL_REPORTS
    }
}

/// ID of a [`Testimonial`].
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

/// Name a [`Testimonial`] is signed with.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (name.trim() == name && !name.is_empty() && name.len() <= 128)
            .then_some(Self(name))
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Text of a [`Testimonial`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Text(String);

impl Text {
    /// Creates a new [`Text`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.trim() == text && !text.is_empty() && text.len() <= 2048)
            .then_some(Self(text))
    }
}

impl FromStr for Text {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Text`")
    }
}

/// Rating given by a [`Testimonial`], from one to five stars.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rating(u8);

impl Rating {
    /// Lowest possible [`Rating`].
    pub const MIN: Self = Self(1);

    /// Highest possible [`Rating`].
    pub const MAX: Self = Self(5);

    /// Creates a new [`Rating`] if the given number of `stars` is in range.
    #[must_use]
    pub fn new(stars: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&stars)
            .then_some(Self(stars))
    }

    /// Returns the number of stars of this [`Rating`].
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

/// [`DateTime`] when a [`Testimonial`] was created.
pub type CreationDateTime = DateTimeOf<(Testimonial, unit::Creation)>;

/// [`DateTime`] when a [`Testimonial`] was modified.
pub type ModificationDateTime = DateTimeOf<(Testimonial, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::user;

    use super::{Id, Name, Rating, Testimonial, Text};

    fn testimonial() -> Testimonial {
        Testimonial {
            id: Id::new(),
            author_id: user::Id::new(),
            name: Name::new("Juan").unwrap(),
            rating: Rating::MAX,
            text: Text::new("Smooth pickup").unwrap(),
            reported_by: vec![],
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn rates_from_one_to_five() {
        assert_eq!(Rating::new(0), None);
        assert_eq!(Rating::new(1), Some(Rating::MIN));
        assert_eq!(Rating::new(3).map(Rating::stars), Some(3));
        assert_eq!(Rating::new(5), Some(Rating::MAX));
        assert_eq!(Rating::new(6), None);
    }

    #[test]
    fn requires_trimmed_text() {
        assert!(Text::new("").is_none());
        assert!(Text::new(" Great ").is_none());
        assert!(Text::new("x".repeat(2049)).is_none());
        assert!(Text::new("Great").is_some());
        assert!(Name::new("").is_none());
    }

    #[test]
    fn counts_one_report_per_user() {
        let mut t = testimonial();
        let reporter = user::Id::new();

        assert!(t.report(reporter));
        assert!(!t.report(reporter));
        assert_eq!(t.reported_by, [reporter]);
    }

    #[test]
    fn removes_on_fifth_report() {
        let mut t = testimonial();

        for _ in 1..Testimonial::REMOVAL_REPORTS {
            assert!(t.report(user::Id::new()));
            assert!(!t.is_to_be_removed());
        }
        assert!(t.report(user::Id::new()));
        assert!(t.is_to_be_removed());
    }
}
