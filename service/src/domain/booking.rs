//! [`Booking`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateRange, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{car, user};
#[cfg(doc)]
use crate::domain::{Car, User};

/// Reservation of a [`Car`] by a renter for a [`DateRange`].
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the booked [`Car`].
    pub car_id: car::Id,

    /// ID of the [`User`] renting the [`Car`].
    pub user_id: user::Id,

    /// ID of the [`User`] owning the [`Car`] at the moment of booking.
    pub owner_id: user::Id,

    /// Inclusive range of [`Date`]s from pickup till return of the [`Car`].
    pub period: DateRange,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// Total price of this [`Booking`].
    pub price: Money,

    /// [`PaymentMethod`] chosen by the renter.
    pub payment_method: PaymentMethod,

    /// [`Contact`] of the renter at the moment of booking.
    pub customer_contact: Contact,

    /// [`Contact`] of the owner at the moment of booking.
    pub owner_contact: Contact,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was modified last time.
    pub updated_at: ModificationDateTime,
}

impl Booking {
    /// Calculates the price of renting a [`Car`] for the provided `period`.
    ///
    /// Every started day is paid in full. Returns [`None`] if the price
    /// overflows.
    #[must_use]
    pub fn price_for(
        price_per_day: Money,
        period: &DateRange,
    ) -> Option<Money> {
        price_per_day.checked_mul(period.days())
    }

    /// Returns the [`Date`] when the [`Car`] is picked up.
    #[must_use]
    pub fn pickup_date(&self) -> Date {
        self.period.start()
    }

    /// Returns the [`Date`] when the [`Car`] is returned.
    #[must_use]
    pub fn return_date(&self) -> Date {
        self.period.end()
    }

    /// Indicates whether this [`Booking`] occupies its [`Car`] for its
    /// `period`.
    #[must_use]
    pub fn occupies(&self, period: &DateRange) -> bool {
        self.status.occupies_car() && self.period.overlaps(period)
    }
}

/// ID of a [`Booking`].
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

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Awaits a decision of the owner."]
        Pending = 1,

        #[doc = "Accepted by the owner."]
        Confirmed = 2,

        #[doc = "Cancelled by the owner or the renter."]
        Cancelled = 3,

        #[doc = "Car has been returned."]
        Completed = 4,
    }
}

impl Status {
    /// Indicates whether no transition is possible from this [`Status`].
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Indicates whether a [`Booking`] in this [`Status`] still has to be
    /// fulfilled.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Indicates whether a [`Booking`] in this [`Status`] holds its [`Car`]
    /// for its period.
    #[must_use]
    pub const fn occupies_car(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Indicates whether this [`Status`] may be changed to the `next` one.
    ///
    /// ```text
    /// Pending   -> Confirmed | Cancelled
    /// Confirmed -> Completed | Cancelled
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Completed | Self::Cancelled),
        )
    }
}

define_kind! {
    #[doc = "Method a [`Booking`] is paid with."]
    enum PaymentMethod {
        #[doc = "Cash on pickup."]
        Cash = 1,

        #[doc = "Bank card."]
        Card = 2,

        #[doc = "GCash e-wallet."]
        Gcash = 3,

        #[doc = "Maya e-wallet."]
        Maya = 4,
    }
}

/// Contact information snapshot stored in a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Contact(String);

impl Contact {
    /// Placeholder used when no contact is known.
    pub const NOT_PROVIDED: &'static str = "Not provided";

    /// Creates a new [`Contact`] if the given `contact` is valid.
    #[must_use]
    pub fn new(contact: impl Into<String>) -> Option<Self> {
        let contact = contact.into();
        let is_valid = contact.trim() == contact
            && !contact.is_empty()
            && contact.len() <= 256;
        is_valid.then_some(Self(contact))
    }

    /// Creates a placeholder [`Contact`] for a party without contacts.
    #[must_use]
    pub fn not_provided() -> Self {
        Self(Self::NOT_PROVIDED.into())
    }
}

impl From<user::Phone> for Contact {
    fn from(phone: user::Phone) -> Self {
        Self(phone.to_string())
    }
}

impl FromStr for Contact {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Contact`")
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was modified.
pub type ModificationDateTime = DateTimeOf<(Booking, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, DateRange, Money};

    use super::{Booking, Contact, PaymentMethod, Status};

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(start.parse::<Date>().unwrap(), end.parse().unwrap())
            .unwrap()
    }

    #[test]
    fn transition_table() {
        use Status as S;

        let all = [S::Pending, S::Confirmed, S::Cancelled, S::Completed];
        let allowed = [
            (S::Pending, S::Confirmed),
            (S::Pending, S::Cancelled),
            (S::Confirmed, S::Completed),
            (S::Confirmed, S::Cancelled),
        ];

        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}",
                );
            }
        }
    }

    #[test]
    fn final_and_active_statuses() {
        assert!(!Status::Pending.is_final());
        assert!(!Status::Confirmed.is_final());
        assert!(Status::Cancelled.is_final());
        assert!(Status::Completed.is_final());

        assert!(Status::Pending.is_active());
        assert!(Status::Confirmed.is_active());
        assert!(!Status::Cancelled.is_active());
        assert!(!Status::Completed.is_active());

        assert!(!Status::Cancelled.occupies_car());
        assert!(Status::Completed.occupies_car());
    }

    #[test]
    fn prices_per_day() {
        let per_day = Money::new(1000, Currency::Php);
        assert_eq!(
            Booking::price_for(per_day, &range("2025-06-01", "2025-06-03")),
            Some(Money::new(2000, Currency::Php)),
        );

        let per_day = Money::new(2000, Currency::Php);
        assert_eq!(
            Booking::price_for(per_day, &range("2025-07-01", "2025-07-03")),
            Some(Money::new(4000, Currency::Php)),
        );
        assert_eq!(
            Booking::price_for(per_day, &range("2025-07-01", "2025-07-02")),
            Some(Money::new(2000, Currency::Php)),
        );
    }

    #[test]
    fn parses_payment_method() {
        assert_eq!("gcash".parse::<PaymentMethod>(), Ok(PaymentMethod::Gcash));
        assert_eq!("CASH".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert_eq!("Maya".parse::<PaymentMethod>(), Ok(PaymentMethod::Maya));
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn contact_placeholder() {
        assert_eq!(AsRef::<str>::as_ref(&Contact::not_provided()), "Not provided");
        assert!(Contact::new("").is_none());
        assert!(Contact::new(" 0917").is_none());
        assert!(Contact::new("+639171234567").is_some());
    }
}
