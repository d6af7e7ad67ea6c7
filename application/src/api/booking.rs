//! [`Booking`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// A reservation of a `Car` for a range of dates.
#[derive(Clone, Debug, From, Into)]
pub struct Booking(domain::Booking);

/// A reservation of a `Car` for an inclusive range of dates.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Booked `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.car",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn car(&self) -> api::Car {
        #[expect(
            unsafe_code,
            reason = "`Car`s are never deleted before their `Booking`s"
        )]
        unsafe {
            api::Car::new_unchecked(self.0.car_id)
        }
    }

    /// `User` renting the `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.renter",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn renter(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`Booking`s are deleted along with their renter"
        )]
        unsafe {
            api::User::new_unchecked(self.0.user_id)
        }
    }

    /// `User` owning the `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn owner(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`Booking`s are deleted along with the `Car` owner"
        )]
        unsafe {
            api::User::new_unchecked(self.0.owner_id)
        }
    }

    /// `Date` when the `Car` is picked up.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.pickupDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn pickup_date(&self) -> Date {
        self.0.pickup_date()
    }

    /// `Date` when the `Car` is returned.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.returnDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn return_date(&self) -> Date {
        self.0.return_date()
    }

    /// Number of paid days of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.days",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn days(&self) -> i32 {
        i32::try_from(self.0.period.days()).unwrap_or(i32::MAX)
    }

    /// Current `BookingStatus` of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Total price of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn price(&self) -> Money {
        self.0.price
    }

    /// `PaymentMethod` chosen by the renter.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.paymentMethod",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.0.payment_method.into()
    }

    /// Contact of the renter at the moment of booking.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.customerContact",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn customer_contact(&self) -> Contact {
        self.0.customer_contact.clone().into()
    }

    /// Contact of the `Car` owner at the moment of booking.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.ownerContact",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn owner_contact(&self) -> Contact {
        self.0.owner_contact.clone().into()
    }

    /// `DateTime` when this `Booking` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `Booking` was modified last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of a `Booking`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::booking::Id)]
#[into(domain::booking::Id)]
#[graphql(name = "BookingId", transparent)]
pub struct Id(Uuid);

/// Contact information of a `Booking` party.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BookingContact",
    with = scalar::Via::<domain::booking::Contact>,
)]
pub struct Contact(domain::booking::Contact);

/// Status of a `Booking`.
///
/// ```text
/// PENDING   -> CONFIRMED | CANCELLED
/// CONFIRMED -> COMPLETED | CANCELLED
/// ```
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BookingStatus")]
pub enum Status {
    /// Awaits a decision of the `Car` owner.
    Pending,

    /// Accepted by the `Car` owner.
    Confirmed,

    /// Cancelled by the `Car` owner or the renter.
    Cancelled,

    /// `Car` has been returned.
    Completed,
}

impl From<domain::booking::Status> for Status {
    fn from(status: domain::booking::Status) -> Self {
        use domain::booking::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Confirmed => Self::Confirmed,
            S::Cancelled => Self::Cancelled,
            S::Completed => Self::Completed,
        }
    }
}

impl From<Status> for domain::booking::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Pending,
            Status::Confirmed => Self::Confirmed,
            Status::Cancelled => Self::Cancelled,
            Status::Completed => Self::Completed,
        }
    }
}

/// Method a `Booking` is paid with.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "PaymentMethod")]
pub enum PaymentMethod {
    /// Cash on pickup.
    Cash,

    /// Bank card.
    Card,

    /// GCash e-wallet.
    Gcash,

    /// Maya e-wallet.
    Maya,
}

impl From<domain::booking::PaymentMethod> for PaymentMethod {
    fn from(method: domain::booking::PaymentMethod) -> Self {
        use domain::booking::PaymentMethod as M;
        match method {
            M::Cash => Self::Cash,
            M::Card => Self::Card,
            M::Gcash => Self::Gcash,
            M::Maya => Self::Maya,
        }
    }
}

impl From<PaymentMethod> for domain::booking::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Card => Self::Card,
            PaymentMethod::Gcash => Self::Gcash,
            PaymentMethod::Maya => Self::Maya,
        }
    }
}
