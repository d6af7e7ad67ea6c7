//! [`Command`] for toggling availability of a [`Car`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{car, user, Car},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for offering a [`Car`] for rent, or withdrawing it, by its
/// owner.
///
/// Existing bookings of the [`Car`] remain untouched.
#[derive(Clone, Copy, Debug)]
pub struct ToggleCarAvailability {
    /// ID of the [`Car`] to be toggled.
    pub car_id: car::Id,

    /// ID of the [`User`] performing the toggle.
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,
}

impl<Db> Command<ToggleCarAvailability> for Service<Db>
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
    type Ok = Car;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleCarAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleCarAvailability { car_id, by } = cmd;

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

        car.is_available = !car.is_available;
        tx.execute(Update(car.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            car.id = %car.id,
            car.is_available = car.is_available,
            "`Car` availability toggled",
        );

        Ok(car)
    }
}

/// Error of [`ToggleCarAvailability`] [`Command`] execution.
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

    use super::{ExecutionError, ToggleCarAvailability};

    #[tokio::test]
    async fn flips_availability() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let car = fixture::car(&db, &owner, 2000);
        let cmd = ToggleCarAvailability {
            car_id: car.id,
            by: owner.id,
        };

        assert!(!svc.execute(cmd).await.unwrap().is_available);
        assert!(!db.state().cars[&car.id].is_available);
        assert!(svc.execute(cmd).await.unwrap().is_available);
    }

    #[tokio::test]
    async fn forbids_strangers() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);

        let err = svc
            .execute(ToggleCarAvailability {
                car_id: car.id,
                by: renter.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::NotAuthorized(_)),
            "{err}",
        );
        assert!(db.state().cars[&car.id].is_available);
    }
}
