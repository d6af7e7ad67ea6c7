//! [`Command`] for deleting a [`Booking`] by its renter.

use common::{
    operations::{
        By, Commit, Delete, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Booking`] by its renter.
///
/// An active [`Booking`] is cancelled before being deleted, so its dates are
/// freed within the same transaction.
#[derive(Clone, Copy, Debug)]
pub struct DeleteBooking {
    /// ID of the [`Booking`] to be deleted.
    pub booking_id: booking::Id,

    /// ID of the [`User`] deleting the [`Booking`].
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,
}

impl<Db> Command<DeleteBooking> for Service<Db>
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
        + Database<
            Delete<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteBooking { booking_id, by } = cmd;

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

        if !booking.status.is_final() {
            booking.status = booking::Status::Cancelled;
            booking.updated_at = DateTime::now().coerce();
            tx.execute(Update(booking))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        tx.execute(Delete(By::<Booking, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(booking.id = %booking_id, "`Booking` deleted");

        Ok(())
    }
}

/// Error of [`DeleteBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{cancel_booking::spec::booking, CreateBooking},
        domain::{
            booking::{Contact, PaymentMethod, Status},
            user,
        },
        infra::database::mock::fixture,
        Command as _,
    };

    use super::{DeleteBooking, ExecutionError};

    #[tokio::test]
    async fn frees_booked_dates() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 1000);
        let book = || CreateBooking {
            user_id: renter.id,
            car_id: car.id,
            pickup_date: fixture::day(4),
            return_date: fixture::day(6),
            contact: Contact::new("renter@mail.ph").unwrap(),
            payment_method: PaymentMethod::Cash,
        };
        let first = svc.execute(book()).await.unwrap();
        assert!(svc.execute(book()).await.is_err());

        svc.execute(DeleteBooking {
            booking_id: first.id,
            by: renter.id,
        })
        .await
        .unwrap();

        assert!(!db.state().bookings.contains_key(&first.id));
        let second = svc.execute(book()).await.unwrap();
        assert_eq!(second.status, Status::Pending);
    }

    #[tokio::test]
    async fn deletes_past_bookings() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let b = booking(
            &db,
            &owner,
            &renter,
            fixture::days(-5, -3),
            Status::Completed,
        );

        svc.execute(DeleteBooking {
            booking_id: b.id,
            by: renter.id,
        })
        .await
        .unwrap();

        assert!(db.state().bookings.is_empty());
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
            .execute(DeleteBooking {
                booking_id: b.id,
                by: owner.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::NotAuthorized(_)),
            "{err}",
        );
        assert_eq!(db.state().bookings[&b.id].status, Status::Pending);
    }
}
