//! [`Car`]-related definitions.

use std::future;

use common::{DateTime, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A car offered for rent.
#[derive(Clone, Debug, From)]
pub struct Car {
    /// ID of this [`Car`].
    id: Id,

    /// Underlying [`domain::Car`].
    car: OnceCell<domain::Car>,
}

impl From<domain::Car> for Car {
    fn from(car: domain::Car) -> Self {
        Self {
            id: car.id.into(),
            car: OnceCell::new_with(Some(car)),
        }
    }
}

impl Car {
    /// Creates a new [`Car`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Car`] with the provided ID exists,
    /// otherwise accessing this [`Car`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            car: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Car`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Car`] doesn't exist.
    async fn car(&self, ctx: &Context) -> Result<&domain::Car, Error> {
        let id = self.id.into();
        self.car
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::car::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(c.ok_or_else(|| {
                            api::query::CarError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A car offered for rent.
#[graphql_object(context = Context)]
impl Car {
    /// Unique identifier of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `User` owning this `Car`.
    ///
    /// `null` once this `Car` is removed by its owner.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owner(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::User>, Error> {
        Ok(self.car(ctx).await?.owner_id.map(|id| {
            #[expect(
                unsafe_code,
                reason = "`Car`s are deleted along with their owner"
            )]
            unsafe {
                api::User::new_unchecked(id)
            }
        }))
    }

    /// Brand of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.brand",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn brand(&self, ctx: &Context) -> Result<Brand, Error> {
        Ok(self.car(ctx).await?.brand.clone().into())
    }

    /// Model of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.model",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn model(&self, ctx: &Context) -> Result<Model, Error> {
        Ok(self.car(ctx).await?.model.clone().into())
    }

    /// Manufacturing year of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.year",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn year(&self, ctx: &Context) -> Result<Year, Error> {
        Ok(self.car(ctx).await?.year.into())
    }

    /// Body category of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.category",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn category(&self, ctx: &Context) -> Result<Category, Error> {
        Ok(self.car(ctx).await?.category.into())
    }

    /// Number of seats in this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.seatingCapacity",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn seating_capacity(
        &self,
        ctx: &Context,
    ) -> Result<SeatingCapacity, Error> {
        Ok(self.car(ctx).await?.seating_capacity.into())
    }

    /// Transmission of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.transmission",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn transmission(
        &self,
        ctx: &Context,
    ) -> Result<Transmission, Error> {
        Ok(self.car(ctx).await?.transmission.into())
    }

    /// Fuel type of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.fuelType",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn fuel_type(&self, ctx: &Context) -> Result<FuelType, Error> {
        Ok(self.car(ctx).await?.fuel_type.into())
    }

    /// Rent price of this `Car` for a single day.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.pricePerDay",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price_per_day(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.car(ctx).await?.price_per_day)
    }

    /// Location this `Car` is picked up at.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.location",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn location(&self, ctx: &Context) -> Result<Location, Error> {
        Ok(self.car(ctx).await?.location.clone().into())
    }

    /// Description of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.description",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn description(
        &self,
        ctx: &Context,
    ) -> Result<Description, Error> {
        Ok(self.car(ctx).await?.description.clone().into())
    }

    /// Indicator whether this `Car` is offered for rent by its owner.
    ///
    /// Doesn't consider `Booking`s, use `isCarAvailable` query for that.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.isAvailable",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_available(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.car(ctx).await?.is_available)
    }

    /// `DateTime` when this `Car` was listed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.car(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Car`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::car::Id)]
#[into(domain::car::Id)]
#[graphql(name = "CarId", transparent)]
pub struct Id(Uuid);

/// Brand of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "CarBrand", with = scalar::Via::<domain::car::Brand>)]
pub struct Brand(domain::car::Brand);

/// Model of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "CarModel", with = scalar::Via::<domain::car::Model>)]
pub struct Model(domain::car::Model);

/// Location a `Car` is picked up at.
///
/// Compared case-insensitively.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CarLocation",
    with = scalar::Via::<domain::car::Location>,
)]
pub struct Location(domain::car::Location);

/// Description of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CarDescription",
    with = scalar::Via::<domain::car::Description>,
)]
pub struct Description(domain::car::Description);

/// Manufacturing year of a `Car`.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "CarYear", with = scalar::Int::<domain::car::Year>)]
pub struct Year(domain::car::Year);

/// Number of seats in a `Car`.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CarSeatingCapacity",
    with = scalar::Int::<domain::car::SeatingCapacity>,
)]
pub struct SeatingCapacity(domain::car::SeatingCapacity);

/// Body category of a `Car`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "CarCategory")]
pub enum Category {
    /// Sedan.
    Sedan,

    /// Sport utility vehicle.
    Suv,

    /// Van.
    Van,
}

impl From<domain::car::Category> for Category {
    fn from(category: domain::car::Category) -> Self {
        use domain::car::Category as C;
        match category {
            C::Sedan => Self::Sedan,
            C::Suv => Self::Suv,
            C::Van => Self::Van,
        }
    }
}

impl From<Category> for domain::car::Category {
    fn from(category: Category) -> Self {
        match category {
            Category::Sedan => Self::Sedan,
            Category::Suv => Self::Suv,
            Category::Van => Self::Van,
        }
    }
}

/// Transmission of a `Car`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "CarTransmission")]
pub enum Transmission {
    /// Manual gearbox.
    Manual,

    /// Automatic gearbox.
    Automatic,

    /// Automated manual gearbox.
    SemiAutomatic,
}

impl From<domain::car::Transmission> for Transmission {
    fn from(transmission: domain::car::Transmission) -> Self {
        use domain::car::Transmission as T;
        match transmission {
            T::Manual => Self::Manual,
            T::Automatic => Self::Automatic,
            T::SemiAutomatic => Self::SemiAutomatic,
        }
    }
}

impl From<Transmission> for domain::car::Transmission {
    fn from(transmission: Transmission) -> Self {
        match transmission {
            Transmission::Manual => Self::Manual,
            Transmission::Automatic => Self::Automatic,
            Transmission::SemiAutomatic => Self::SemiAutomatic,
        }
    }
}

/// Fuel type of a `Car`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "CarFuelType")]
pub enum FuelType {
    /// Gas.
    Gas,

    /// Diesel.
    Diesel,

    /// Petrol.
    Petrol,

    /// Battery electric.
    Electric,

    /// Hybrid electric.
    Hybrid,
}

impl From<domain::car::FuelType> for FuelType {
    fn from(fuel: domain::car::FuelType) -> Self {
        use domain::car::FuelType as F;
        match fuel {
            F::Gas => Self::Gas,
            F::Diesel => Self::Diesel,
            F::Petrol => Self::Petrol,
            F::Electric => Self::Electric,
            F::Hybrid => Self::Hybrid,
        }
    }
}

impl From<FuelType> for domain::car::FuelType {
    fn from(fuel: FuelType) -> Self {
        match fuel {
            FuelType::Gas => Self::Gas,
            FuelType::Diesel => Self::Diesel,
            FuelType::Petrol => Self::Petrol,
            FuelType::Electric => Self::Electric,
            FuelType::Hybrid => Self::Hybrid,
        }
    }
}
