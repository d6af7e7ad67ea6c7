//! [`Command`] for deleting a [`User`] account.

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, Booking, Car, Testimonial, User},
    infra::{database, Database},
    read::booking::{ActiveCount, Party},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`User`] account along with its [`Car`]s, its
/// [`Testimonial`]s and all the [`Booking`]s it takes part in.
///
/// Refused while any of these [`Booking`]s is still active. Either everything
/// is deleted, or nothing is.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteUser {
    /// ID of the [`User`] to be deleted.
    pub user_id: user::Id,
}

impl<Db> Command<DeleteUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<ActiveCount, Party>>,
            Ok = ActiveCount,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vec<Booking>, Party>>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vec<Car>, user::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vec<Testimonial>, user::Id>>,
            Err = Traced<database::Error>,
        > + Database<Delete<By<User, user::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser { user_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if user.is_owner() {
            let active = tx
                .execute(Select(By::<ActiveCount, _>::new(Party::Owner(
                    user_id,
                ))))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !active.is_zero() {
                return Err(tracerr::new!(E::ActiveBookingsAsOwner(user_id)));
            }
        }

        let active = tx
            .execute(Select(By::<ActiveCount, _>::new(Party::Renter(user_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !active.is_zero() {
            return Err(tracerr::new!(E::ActiveBookingsAsRenter(user_id)));
        }

        for party in [Party::Renter(user_id), Party::Owner(user_id)] {
            tx.execute(Delete(By::<Vec<Booking>, _>::new(party)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        tx.execute(Delete(By::<Vec<Car>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Delete(By::<Vec<Testimonial>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Delete(By::<User, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(user.id = %user.id, "`User` account deleted");

        Ok(())
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`]s of the [`User`] have [`Booking`]s to be fulfilled.
    #[display("`User(id: {_0})` has active `Booking`s of its `Car`s")]
    #[from(ignore)]
    ActiveBookingsAsOwner(#[error(not(source))] user::Id),

    /// [`User`] has [`Booking`]s to be fulfilled.
    #[display("`User(id: {_0})` has active `Booking`s")]
    #[from(ignore)]
    ActiveBookingsAsRenter(#[error(not(source))] user::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};

    use crate::{
        domain::{
            booking::{self, Contact, PaymentMethod, Status},
            user, Booking, Car, User,
        },
        infra::database::mock::{fixture, Mock},
        Command as _,
    };

    use super::{DeleteUser, ExecutionError};

    fn book(db: &Mock, renter: &User, car: &Car, status: Status) -> Booking {
        let booking = Booking {
            id: booking::Id::new(),
            car_id: car.id,
            user_id: renter.id,
            owner_id: car.owner_id.unwrap(),
            period: fixture::days(3, 5),
            status,
            price: Money::new(2000, Currency::Php),
            payment_method: PaymentMethod::Cash,
            customer_contact: Contact::not_provided(),
            owner_contact: Contact::not_provided(),
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        };
        drop(db.state().bookings.insert(booking.id, booking.clone()));
        booking
    }

    #[tokio::test]
    async fn deletes_everything_related() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let other = fixture::user(&db, "other", user::Role::Owner, None);
        let own_car = fixture::car(&db, &owner, 1500);
        let other_car = fixture::car(&db, &other, 1500);
        drop(book(&db, &renter, &own_car, Status::Completed));
        drop(book(&db, &owner, &other_car, Status::Cancelled));
        let unrelated = book(&db, &renter, &other_car, Status::Pending);
        let own_review = fixture::testimonial(&db, owner.id);
        let other_review = fixture::testimonial(&db, other.id);

        svc.execute(DeleteUser { user_id: owner.id }).await.unwrap();

        let state = db.state();
        assert!(!state.users.contains_key(&owner.id));
        assert!(!state.cars.contains_key(&own_car.id));
        assert!(state.cars.contains_key(&other_car.id));
        assert_eq!(state.bookings.len(), 1);
        assert!(state.bookings.contains_key(&unrelated.id));
        assert!(!state.testimonials.contains_key(&own_review.id));
        assert!(state.testimonials.contains_key(&other_review.id));
    }

    #[tokio::test]
    async fn aborts_on_active_bookings_as_owner() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 1500);
        drop(book(&db, &renter, &car, Status::Confirmed));

        let err = svc
            .execute(DeleteUser { user_id: owner.id })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::ActiveBookingsAsOwner(_)),
            "{err}",
        );
        let state = db.state();
        assert!(state.users.contains_key(&owner.id));
        assert!(state.cars.contains_key(&car.id));
        assert_eq!(state.bookings.len(), 1);
    }

    #[tokio::test]
    async fn aborts_on_active_bookings_as_renter() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 1500);
        drop(book(&db, &renter, &car, Status::Pending));

        let err = svc
            .execute(DeleteUser { user_id: renter.id })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::ActiveBookingsAsRenter(_)),
            "{err}",
        );
        assert!(db.state().users.contains_key(&renter.id));
        assert_eq!(db.state().bookings.len(), 1);
    }
}
