//! [`Command`] for removing a [`Car`] from listing.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Booking;
use crate::{
    domain::{car, user, Car},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a [`Car`] from listing by its owner.
///
/// The [`Car`] itself is kept, so its [`Booking`]s history stays intact, but
/// it can't be found or booked anymore.
#[derive(Clone, Copy, Debug)]
pub struct DeleteCar {
    /// ID of the [`Car`] to be removed.
    pub car_id: car::Id,

    /// ID of the [`User`] removing the [`Car`].
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,
}

impl<Db> Command<DeleteCar> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Car, car::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<Update<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCar { car_id, by } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Car`.
        tx.execute(Lock(By::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut car = tx
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(Car::is_listed)
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;
        if !car.is_owned_by(by) {
            return Err(tracerr::new!(E::NotAuthorized(by)));
        }

        car.unlist();
        tx.execute(Update(car))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(car.id = %car_id, "`Car` removed from listing");

        Ok(())
    }
}

/// Error of [`DeleteCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] doesn't exist.
    #[display("`Car(id: {_0})` does not exist")]
    #[from(ignore)]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't own the [`Car`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the owner of the `Car`")]
    #[from(ignore)]
    NotAuthorized(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{domain::user, infra::database::mock::fixture, Command as _};

    use super::{DeleteCar, ExecutionError};

    #[tokio::test]
    async fn unlists_car() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let car = fixture::car(&db, &owner, 2000);
        let cmd = DeleteCar {
            car_id: car.id,
            by: owner.id,
        };

        svc.execute(cmd).await.unwrap();

        let stored = db.state().cars[&car.id].clone();
        assert!(!stored.is_listed());
        assert!(!stored.is_available);

        let err = svc.execute(cmd).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::CarNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn forbids_strangers() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let other = fixture::user(&db, "other", user::Role::Owner, None);
        let car = fixture::car(&db, &owner, 2000);

        let err = svc
            .execute(DeleteCar {
                car_id: car.id,
                by: other.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::NotAuthorized(_)),
            "{err}",
        );
        assert!(db.state().cars[&car.id].is_listed());
    }
}
