//! [`Dashboard`] report definition.

use std::sync::OnceLock;

use common::Money;
use juniper::graphql_object;
use service::query;

use crate::{api, Context};

/// Converts the provided count into a GraphQL `Int`, saturating on overflow.
fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Report summarizing `Car`s and `Booking`s of an owner.
#[derive(Clone, Debug)]
pub struct Dashboard {
    /// Underlying [`query::report::dashboard::Output`].
    output: query::report::dashboard::Output,

    /// Newest [`api::Booking`]s of this report.
    recent_bookings: OnceLock<Vec<api::Booking>>,
}

impl From<query::report::dashboard::Output> for Dashboard {
    fn from(output: query::report::dashboard::Output) -> Self {
        Self {
            output,
            recent_bookings: OnceLock::new(),
        }
    }
}

/// Report summarizing `Car`s and `Booking`s of an owner.
#[graphql_object(name = "OwnerDashboard", context = Context)]
impl Dashboard {
    /// Number of `Car`s listed by the owner.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "OwnerDashboard.totalCars",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn total_cars(&self) -> i32 {
        count(self.output.total_cars)
    }

    /// Number of all `Booking`s of the owner's `Car`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "OwnerDashboard.totalBookings",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn total_bookings(&self) -> i32 {
        count(self.output.total_bookings)
    }

    /// Number of `PENDING` `Booking`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "OwnerDashboard.pendingBookings",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn pending_bookings(&self) -> i32 {
        count(self.output.pending_bookings)
    }

    /// Number of `CONFIRMED` `Booking`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "OwnerDashboard.confirmedBookings",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn confirmed_bookings(&self) -> i32 {
        count(self.output.confirmed_bookings)
    }

    /// Number of `COMPLETED` `Booking`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "OwnerDashboard.completedBookings",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn completed_bookings(&self) -> i32 {
        count(self.output.completed_bookings)
    }

    /// Newest `Booking`s of the owner's `Car`s, the newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "OwnerDashboard.recentBookings",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn recent_bookings(&self) -> &[api::Booking] {
        self.recent_bookings
            .get_or_init(|| {
                self.output
                    .recent_bookings
                    .iter()
                    .cloned()
                    .map(Into::into)
                    .collect()
            })
            .as_slice()
    }

    /// Revenue of `CONFIRMED` and `COMPLETED` `Booking`s created in the
    /// current month, one amount per currency.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "OwnerDashboard.monthlyRevenue",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn monthly_revenue(&self) -> &[Money] {
        &self.output.monthly_revenue
    }
}
