//! [`Dashboard`] definition.

use common::{
    operations::{By, Select},
    Date, Money,
};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking, Car},
    infra::{database, Database},
    read::{self, booking::Party},
    Query, Service,
};

/// Number of the newest [`Booking`]s shown in a [`Dashboard`].
pub const RECENT_BOOKINGS: usize = 5;

/// [`Query`] summarizing [`Car`]s and [`Booking`]s of an owner.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Dashboard {
    /// ID of the owner [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,
}

/// Output of the [`Dashboard`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Number of [`Car`]s listed by the owner.
    pub total_cars: usize,

    /// Number of all [`Booking`]s of the owner's [`Car`]s.
    pub total_bookings: usize,

    /// Number of [`booking::Status::Pending`] [`Booking`]s.
    pub pending_bookings: usize,

    /// Number of [`booking::Status::Confirmed`] [`Booking`]s.
    pub confirmed_bookings: usize,

    /// Number of [`booking::Status::Completed`] [`Booking`]s.
    pub completed_bookings: usize,

    /// Newest [`Booking`]s, the newest first.
    pub recent_bookings: Vec<Booking>,

    /// Revenue of confirmed and completed [`Booking`]s created in the current
    /// month, per currency.
    pub monthly_revenue: Vec<Money>,
}

impl<Db> Query<Dashboard> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Car>, read::car::list::Filter>>,
            Ok = Vec<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, Party>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Dashboard { owner_id }: Dashboard,
    ) -> Result<Self::Ok, Self::Err> {
        let cars = self
            .database()
            .execute(Select(By::<Vec<Car>, _>::new(
                read::car::list::Filter {
                    owner_id: Some(owner_id),
                    ..read::car::list::Filter::default()
                },
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let bookings = self
            .database()
            .execute(Select(By::<Vec<Booking>, _>::new(Party::Owner(
                owner_id,
            ))))
            .await
            .map_err(tracerr::wrap!())?;

        let count = |status: booking::Status| {
            bookings.iter().filter(|b| b.status == status).count()
        };

        let month_start = Date::today().start_of_month();
        let mut monthly_revenue = Vec::<Money>::new();
        for b in bookings.iter().filter(|b| {
            matches!(
                b.status,
                booking::Status::Confirmed | booking::Status::Completed,
            ) && b.created_at.date() >= month_start
        }) {
            match monthly_revenue
                .iter_mut()
                .find(|m| m.currency == b.price.currency)
            {
                Some(total) => {
                    total.amount = total.amount.saturating_add(b.price.amount);
                }
                None => monthly_revenue.push(b.price),
            }
        }

        Ok(Output {
            total_cars: cars.len(),
            total_bookings: bookings.len(),
            pending_bookings: count(booking::Status::Pending),
            confirmed_bookings: count(booking::Status::Confirmed),
            completed_bookings: count(booking::Status::Completed),
            recent_bookings: bookings
                .iter()
                .take(RECENT_BOOKINGS)
                .cloned()
                .collect(),
            monthly_revenue,
        })
    }
}
