//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Searches for `Car`s which may be booked from `pickupDate` till
    /// `returnDate`, both inclusive.
    ///
    /// `location` is matched case-insensitively, any location matches if it's
    /// omitted.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `returnDate` is not after `pickupDate`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "availableCars",
            location = ?location.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            pickup_date = %pickup_date,
            return_date = %return_date,
        ),
    )]
    pub async fn available_cars(
        location: Option<api::car::Location>,
        pickup_date: Date,
        return_date: Date,
        ctx: &Context,
    ) -> Result<Vec<api::Car>, Error> {
        ctx.service()
            .execute(query::cars::Available {
                location: location.map(Into::into),
                pickup_date,
                return_date,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cars| cars.into_iter().map(Into::into).collect())
    }

    /// Checks whether the `Car` with the specified ID has no `Booking`s from
    /// `pickupDate` till `returnDate`, both inclusive.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `returnDate` is not after `pickupDate`.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            gql.name = "isCarAvailable",
            otel.name = Self::SPAN_NAME,
            pickup_date = %pickup_date,
            return_date = %return_date,
        ),
    )]
    pub async fn is_car_available(
        car_id: api::car::Id,
        pickup_date: Date,
        return_date: Date,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(query::car::IsAvailable {
                car_id: car_id.into(),
                pickup_date,
                return_date,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Returns the `Car` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "car",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn car(
        id: api::car::Id,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        ctx.service()
            .execute(query::car::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| CarError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists `Car`s offered for rent, the newest first.
    ///
    /// `location` is matched case-insensitively, any location matches if it's
    /// omitted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cars",
            location = ?location.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cars(
        location: Option<api::car::Location>,
        ctx: &Context,
    ) -> Result<Vec<api::Car>, Error> {
        ctx.service()
            .execute(query::cars::List::by(read::car::list::Filter {
                location: location.map(Into::into),
                owner_id: None,
                only_available: true,
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cars| cars.into_iter().map(Into::into).collect())
    }

    /// Returns the `Booking` with the specified ID.
    ///
    /// Only the renter and the `Car` owner may see a `Booking`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist or is not visible to the current
    ///                          `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "booking",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id.into();
        ctx.service()
            .execute(query::booking::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .filter(|b| {
                read::booking::Party::Renter(my_id).takes_part_in(b)
                    || read::booking::Party::Owner(my_id).takes_part_in(b)
            })
            .ok_or_else(|| BookingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists `Booking`s made by the current `User`, the newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBookings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_bookings(
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::bookings::OfParty::by(
                read::booking::Party::Renter(my_id.into()),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bs| bs.into_iter().map(Into::into).collect())
    }

    /// Lists `Booking`s of the `Car`s owned by the current `User`, the newest
    /// first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_OWNER` - the current `User` is not a `Car` owner.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ownerBookings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn owner_bookings(
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        let my_id = ctx.current_owner_session().await?.user_id;
        ctx.service()
            .execute(query::bookings::OfParty::by(
                read::booking::Party::Owner(my_id.into()),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bs| bs.into_iter().map(Into::into).collect())
    }

    /// Lists `Car`s listed by the current `User`, the newest first.
    ///
    /// Includes the `Car`s not offered for rent at the moment.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_OWNER` - the current `User` is not a `Car` owner.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myCars",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_cars(ctx: &Context) -> Result<Vec<api::Car>, Error> {
        let my_id = ctx.current_owner_session().await?.user_id;
        ctx.service()
            .execute(query::cars::List::by(read::car::list::Filter {
                owner_id: Some(my_id.into()),
                ..read::car::list::Filter::default()
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cars| cars.into_iter().map(Into::into).collect())
    }

    /// Summarizes `Car`s and `Booking`s of the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_OWNER` - the current `User` is not a `Car` owner.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ownerDashboard",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn owner_dashboard(
        ctx: &Context,
    ) -> Result<api::report::Dashboard, Error> {
        let my_id = ctx.current_owner_session().await?.user_id;
        ctx.service()
            .execute(query::report::Dashboard {
                owner_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the few newest `Testimonial`s to be featured.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "latestTestimonials",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn latest_testimonials(
        ctx: &Context,
    ) -> Result<Vec<api::Testimonial>, Error> {
        ctx.service()
            .execute(query::testimonials::Latest)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ts| ts.into_iter().map(Into::into).collect())
    }

    /// Lists all the `Testimonial`s, the newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "testimonials",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn testimonials(
        ctx: &Context,
    ) -> Result<Vec<api::Testimonial>, Error> {
        ctx.service()
            .execute(query::testimonials::List::by(
                read::testimonial::Newest::default(),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ts| ts.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum CarError {
        #[code = "CAR_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Car` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
