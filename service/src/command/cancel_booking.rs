//! [`Command`] for cancelling a [`Booking`] by its renter.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`] by its renter, freeing the booked
/// dates.
///
/// Only [`Booking`]s which haven't started yet may be cancelled.
#[derive(Clone, Copy, Debug)]
pub struct CancelBooking {
    /// ID of the [`Booking`] to be cancelled.
    pub booking_id: booking::Id,

    /// ID of the [`User`] cancelling the [`Booking`].
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,
}

impl<Db> Command<CancelBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CancelBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBooking { booking_id, by } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Booking`.
        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if booking.user_id != by {
            return Err(tracerr::new!(E::NotAuthorized(by)));
        }
        if booking.status.is_final() {
            return Err(tracerr::new!(E::AlreadyFinal(booking.status)));
        }
        if booking.pickup_date() < Date::today() {
            return Err(tracerr::new!(E::PastBooking(booking.pickup_date())));
        }

        booking.status = booking::Status::Cancelled;
        booking.updated_at = DateTime::now().coerce();
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(booking.id = %booking.id, "`Booking` cancelled");

        Ok(booking)
    }
}

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is already cancelled or completed.
    #[display("`Booking` is already `{_0}`")]
    #[from(ignore)]
    AlreadyFinal(#[error(not(source))] booking::Status),

    /// [`Booking`] doesn't exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] is not the renter of the [`Booking`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the renter of the `Booking`")]
    #[from(ignore)]
    NotAuthorized(#[error(not(source))] user::Id),

    /// [`Booking`] has already started.
    #[display("`Booking` has started on `{_0}`")]
    #[from(ignore)]
    PastBooking(#[error(not(source))] Date),
}

#[cfg(test)]
pub(crate) mod spec {
    use common::{money::Currency, DateRange, DateTime, Money};

    use crate::{
        domain::{
            booking::{self, Contact, PaymentMethod, Status},
            user, Booking, User,
        },
        infra::database::mock::{fixture, Mock},
        Command as _,
    };

    use super::{CancelBooking, ExecutionError};

    /// Stores a new [`Booking`] of a fresh [`Car`] of the `owner` by the
    /// `renter`.
    ///
    /// [`Car`]: crate::domain::Car
    pub(crate) fn booking(
        db: &Mock,
        owner: &User,
        renter: &User,
        period: DateRange,
        status: Status,
    ) -> Booking {
        let car = fixture::car(db, owner, 1000);
        let booking = Booking {
            id: booking::Id::new(),
            car_id: car.id,
            user_id: renter.id,
            owner_id: owner.id,
            period,
            status,
            price: Booking::price_for(car.price_per_day, &period).unwrap(),
            payment_method: PaymentMethod::Maya,
            customer_contact: Contact::not_provided(),
            owner_contact: Contact::not_provided(),
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        };
        drop(db.state().bookings.insert(booking.id, booking.clone()));
        booking
    }

    #[tokio::test]
    async fn cancels_once() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let b = booking(
            &db,
            &owner,
            &renter,
            fixture::days(0, 2),
            Status::Confirmed,
        );
        let cmd = CancelBooking {
            booking_id: b.id,
            by: renter.id,
        };

        let cancelled = svc.execute(cmd).await.unwrap();
        assert_eq!(cancelled.status, Status::Cancelled);
        assert_eq!(db.state().bookings[&b.id].status, Status::Cancelled);

        let err = svc.execute(cmd).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::AlreadyFinal(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_completed() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let b = booking(
            &db,
            &owner,
            &renter,
            fixture::days(2, 4),
            Status::Completed,
        );

        let err = svc
            .execute(CancelBooking {
                booking_id: b.id,
                by: renter.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::AlreadyFinal(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_started() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let b = booking(
            &db,
            &owner,
            &renter,
            fixture::days(-1, 2),
            Status::Pending,
        );

        let err = svc
            .execute(CancelBooking {
                booking_id: b.id,
                by: renter.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::PastBooking(_)),
            "{err}",
        );
        assert_eq!(db.state().bookings[&b.id].status, Status::Pending);
    }

    #[tokio::test]
    async fn forbids_owner() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let b = booking(
            &db,
            &owner,
            &renter,
            fixture::days(2, 4),
            Status::Pending,
        );

        let err = svc
            .execute(CancelBooking {
                booking_id: b.id,
                by: owner.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::NotAuthorized(_)),
            "{err}",
        );
    }
}
