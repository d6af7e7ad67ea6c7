//! [`Command`] for listing a new [`Car`].

use common::{
    operations::{By, Insert, Select},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::car::{
    Brand, Category, Description, FuelType, Location, Model, SeatingCapacity,
    Transmission, Year,
};
use crate::{
    domain::{car, user, Car, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Car`] for rent.
///
/// Only an [`Owner`] may list [`Car`]s.
///
/// [`Owner`]: user::Role::Owner
#[derive(Clone, Debug)]
pub struct CreateCar {
    /// ID of the [`User`] listing the [`Car`].
    pub owner_id: user::Id,

    /// [`Brand`] of a new [`Car`].
    pub brand: car::Brand,

    /// [`Model`] of a new [`Car`].
    pub model: car::Model,

    /// [`Year`] of a new [`Car`].
    pub year: car::Year,

    /// [`Category`] of a new [`Car`].
    pub category: car::Category,

    /// [`SeatingCapacity`] of a new [`Car`].
    pub seating_capacity: car::SeatingCapacity,

    /// [`Transmission`] of a new [`Car`].
    pub transmission: car::Transmission,

    /// [`FuelType`] of a new [`Car`].
    pub fuel_type: car::FuelType,

    /// Rent price of a new [`Car`] for a single day.
    pub price_per_day: Money,

    /// [`Location`] of a new [`Car`].
    pub location: car::Location,

    /// [`Description`] of a new [`Car`].
    pub description: car::Description,
}

impl<Db> Command<CreateCar> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Car>, Err = Traced<database::Error>>,
{
    type Ok = Car;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCar {
            owner_id,
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

        let owner = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(owner_id))
            .map_err(tracerr::wrap!())?;
        if !owner.is_owner() {
            return Err(tracerr::new!(E::NotOwner(owner_id)));
        }
        if price_per_day.amount < Decimal::ZERO || seating_capacity == 0 {
            return Err(tracerr::new!(E::InvalidCar));
        }

        let car = Car {
            id: car::Id::new(),
            owner_id: Some(owner.id),
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
            is_available: true,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(car.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(car.id = %car.id, owner.id = %owner.id, "`Car` listed");

        Ok(car)
    }
}

/// Error of [`CreateCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Car`] properties are inconsistent.
    #[display("`Car` must have seats and a non-negative price")]
    InvalidCar,

    /// [`User`] is not allowed to list [`Car`]s.
    #[display("`User(id: {_0})` is not an owner")]
    #[from(ignore)]
    NotOwner(#[error(not(source))] user::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
