//! [`Command`] for updating a [`Car`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{car, user, Car},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating properties of a [`Car`] by its owner.
///
/// Properties left as [`None`] remain untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateCar {
    /// ID of the [`Car`] to be updated.
    pub car_id: car::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,

    /// New [`car::Brand`].
    pub brand: Option<car::Brand>,

    /// New [`car::Model`].
    pub model: Option<car::Model>,

    /// New [`car::Year`].
    pub year: Option<car::Year>,

    /// New [`car::Category`].
    pub category: Option<car::Category>,

    /// New [`car::SeatingCapacity`].
    pub seating_capacity: Option<car::SeatingCapacity>,

    /// New [`car::Transmission`].
    pub transmission: Option<car::Transmission>,

    /// New [`car::FuelType`].
    pub fuel_type: Option<car::FuelType>,

    /// New rent price for a single day.
    pub price_per_day: Option<Money>,

    /// New [`car::Location`].
    pub location: Option<car::Location>,

    /// New [`car::Description`].
    pub description: Option<car::Description>,
}

impl<Db> Command<UpdateCar> for Service<Db>
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

    async fn execute(&self, cmd: UpdateCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateCar {
            car_id,
            by,
            brand,
            model,
            year,
            category,
            seating_capacity,
            transmission,
            fuel_type,
            price_per_day,
            location,
            description,
        } = cmd;

        if price_per_day.is_some_and(|p| p.amount < Decimal::ZERO)
            || seating_capacity == Some(0)
        {
            return Err(tracerr::new!(E::InvalidCar));
        }

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

        if let Some(brand) = brand {
            car.brand = brand;
        }
        if let Some(model) = model {
            car.model = model;
        }
        if let Some(year) = year {
            car.year = year;
        }
        if let Some(category) = category {
            car.category = category;
        }
        if let Some(seats) = seating_capacity {
            car.seating_capacity = seats;
        }
        if let Some(transmission) = transmission {
            car.transmission = transmission;
        }
        if let Some(fuel_type) = fuel_type {
            car.fuel_type = fuel_type;
        }
        if let Some(price) = price_per_day {
            car.price_per_day = price;
        }
        if let Some(location) = location {
            car.location = location;
        }
        if let Some(description) = description {
            car.description = description;
        }

        tx.execute(Update(car.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(car)
    }
}

/// Error of [`UpdateCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] doesn't exist.
    #[display("`Car(id: {_0})` does not exist")]
    #[from(ignore)]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Car`] properties are inconsistent.
    #[display("`Car` must have seats and a non-negative price")]
    InvalidCar,

    /// [`User`] doesn't own the [`Car`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the owner of the `Car`")]
    #[from(ignore)]
    NotAuthorized(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money};

    use crate::{
        domain::{car, user},
        infra::database::mock::fixture,
        Command as _,
    };

    use super::{ExecutionError, UpdateCar};

    #[tokio::test]
    async fn updates_only_provided_fields() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let car = fixture::car(&db, &owner, 2000);

        let updated = svc
            .execute(UpdateCar {
                car_id: car.id,
                by: owner.id,
                price_per_day: Some(Money::new(2200, Currency::Php)),
                location: Some(car::Location::new("Davao").unwrap()),
                ..UpdateCar::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.price_per_day, Money::new(2200, Currency::Php));
        assert_eq!(AsRef::<str>::as_ref(&updated.location), "Davao");
        assert_eq!(updated.brand, car.brand);
        assert_eq!(updated.seating_capacity, car.seating_capacity);
        let stored = &db.state().cars[&car.id];
        assert_eq!(AsRef::<str>::as_ref(&stored.location), "Davao");
    }

    #[tokio::test]
    async fn forbids_strangers() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let other = fixture::user(&db, "other", user::Role::Owner, None);
        let car = fixture::car(&db, &owner, 2000);

        let err = svc
            .execute(UpdateCar {
                car_id: car.id,
                by: other.id,
                year: Some(2024),
                ..UpdateCar::default()
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::NotAuthorized(_)),
            "{err}",
        );
        assert_eq!(db.state().cars[&car.id].year, car.year);
    }

    #[tokio::test]
    async fn rejects_unknown_car() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);

        let err = svc
            .execute(UpdateCar {
                car_id: car::Id::new(),
                by: owner.id,
                ..UpdateCar::default()
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::CarNotExists(_)),
            "{err}",
        );
    }
}
