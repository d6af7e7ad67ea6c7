//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money};
use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` and signs it in.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
            phone = ?phone.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        phone: Option<api::user::Phone>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                phone: phone.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `User` session with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials don't match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Updates the current `User`'s phone to the provided one.
    ///
    /// Omitted `phone` removes it.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateUserPhone",
            otel.name = Self::SPAN_NAME,
            phone = ?phone.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn update_user_phone(
        phone: Option<api::user::Phone>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateUserPhone {
                user_id: my_id.into(),
                number: phone.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Allows the current `User` to list own `Car`s for rent.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "becomeOwner",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn become_owner(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::BecomeOwner {
                user_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the current `User` along with its `Car`s and `Booking`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ACTIVE_BOOKINGS_AS_OWNER` - `Car`s of the `User` have `PENDING` or
    ///                                `CONFIRMED` `Booking`s;
    /// - `ACTIVE_BOOKINGS_AS_RENTER` - the `User` has `PENDING` or
    ///                                 `CONFIRMED` `Booking`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteMyAccount",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_my_account(ctx: &Context) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteUser {
                user_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Lists a new `Car` for rent.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OWNER` - the current `User` is not a `Car` owner;
    /// - `INVALID_CAR` - `seatingCapacity` is zero or `pricePerDay` is
    ///                   negative.
    #[tracing::instrument(
        skip_all,
        fields(
            brand = %brand,
            category = ?category,
            fuel_type = ?fuel_type,
            gql.name = "createCar",
            location = %location,
            model = %model,
            otel.name = Self::SPAN_NAME,
            price_per_day = %price_per_day,
            seating_capacity = %seating_capacity,
            transmission = ?transmission,
            year = %year,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn create_car(
        brand: api::car::Brand,
        model: api::car::Model,
        year: api::car::Year,
        category: api::car::Category,
        seating_capacity: api::car::SeatingCapacity,
        transmission: api::car::Transmission,
        fuel_type: api::car::FuelType,
        price_per_day: Money,
        location: api::car::Location,
        description: Option<api::car::Description>,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateCar {
                owner_id: my_id.into(),
                brand: brand.into(),
                model: model.into(),
                year: year.into(),
                category: category.into(),
                seating_capacity: seating_capacity.into(),
                transmission: transmission.into(),
                fuel_type: fuel_type.into(),
                price_per_day,
                location: location.into(),
                description: description.map(Into::into).unwrap_or_default(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the provided properties of the `Car` owned by the current
    /// `User`.
    ///
    /// Omitted properties remain untouched.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `NOT_AUTHORIZED` - the current `User` doesn't own the `Car`;
    /// - `INVALID_CAR` - `seatingCapacity` is zero or `pricePerDay` is
    ///                   negative.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            gql.name = "updateCar",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn update_car(
        car_id: api::car::Id,
        brand: Option<api::car::Brand>,
        model: Option<api::car::Model>,
        year: Option<api::car::Year>,
        category: Option<api::car::Category>,
        seating_capacity: Option<api::car::SeatingCapacity>,
        transmission: Option<api::car::Transmission>,
        fuel_type: Option<api::car::FuelType>,
        price_per_day: Option<Money>,
        location: Option<api::car::Location>,
        description: Option<api::car::Description>,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateCar {
                car_id: car_id.into(),
                by: my_id.into(),
                brand: brand.map(Into::into),
                model: model.map(Into::into),
                year: year.map(Into::into),
                category: category.map(Into::into),
                seating_capacity: seating_capacity.map(Into::into),
                transmission: transmission.map(Into::into),
                fuel_type: fuel_type.map(Into::into),
                price_per_day,
                location: location.map(Into::into),
                description: description.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Offers the `Car` owned by the current `User` for rent, or withdraws
    /// it if it's offered already.
    ///
    /// Existing `Booking`s of the `Car` are kept.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `NOT_AUTHORIZED` - the current `User` doesn't own the `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            gql.name = "toggleCarAvailability",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn toggle_car_availability(
        car_id: api::car::Id,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ToggleCarAvailability {
                car_id: car_id.into(),
                by: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `Car` owned by the current `User` from listing.
    ///
    /// `Booking`s of the `Car` are kept.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `NOT_AUTHORIZED` - the current `User` doesn't own the `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            gql.name = "deleteCar",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_car(
        car_id: api::car::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteCar {
                car_id: car_id.into(),
                by: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Books the `Car` from `pickupDate` till `returnDate`, both inclusive.
    ///
    /// The created `Booking` is `PENDING` until the `Car` owner decides on
    /// it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `returnDate` is not after `pickupDate`;
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `SELF_BOOKING_FORBIDDEN` - the current `User` owns the `Car`;
    /// - `CAR_UNAVAILABLE` - the `Car` is not offered for rent;
    /// - `DATE_RANGE_CONFLICT` - the `Car` is booked within the dates
    ///                           already;
    /// - `PRICE_OVERFLOW` - the `Booking` price is too large.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            gql.name = "createBooking",
            otel.name = Self::SPAN_NAME,
            payment_method = ?payment_method,
            pickup_date = %pickup_date,
            return_date = %return_date,
        ),
    )]
    pub async fn create_booking(
        car_id: api::car::Id,
        pickup_date: Date,
        return_date: Date,
        contact_number: api::booking::Contact,
        payment_method: api::booking::PaymentMethod,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateBooking {
                user_id: my_id.into(),
                car_id: car_id.into(),
                pickup_date,
                return_date,
                contact: contact_number.into(),
                payment_method: payment_method.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Changes the `BookingStatus` of the `Booking` of a `Car` owned by the
    /// current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `NOT_AUTHORIZED` - the current `User` doesn't own the booked `Car`;
    /// - `INVALID_STATUS_TRANSITION` - the `Booking` cannot move to the
    ///                                 provided `BookingStatus`.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "changeBookingStatus",
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn change_booking_status(
        booking_id: api::booking::Id,
        status: api::booking::Status,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ChangeBookingStatus {
                booking_id: booking_id.into(),
                by: my_id.into(),
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Booking` made by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `NOT_AUTHORIZED` - the current `User` hasn't made the `Booking`;
    /// - `BOOKING_ALREADY_FINAL` - the `Booking` is `CANCELLED` or
    ///                             `COMPLETED` already;
    /// - `PAST_BOOKING` - the `Car` pickup date has passed.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "cancelBooking",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_booking(
        booking_id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CancelBooking {
                booking_id: booking_id.into(),
                by: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Booking` made by the current `User`, cancelling it first
    /// if it's still active.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `NOT_AUTHORIZED` - the current `User` hasn't made the `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "deleteBooking",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_booking(
        booking_id: api::booking::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteBooking {
                booking_id: booking_id.into(),
                by: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Writes a new `Testimonial` by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_RATING` - `rating` is not from 1 to 5.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createTestimonial",
            name = %name,
            otel.name = Self::SPAN_NAME,
            rating = %rating,
        ),
    )]
    pub async fn create_testimonial(
        name: api::testimonial::Name,
        rating: i32,
        text: api::testimonial::Text,
        ctx: &Context,
    ) -> Result<api::Testimonial, Error> {
        let rating = api::testimonial::rating(rating).map_err(ctx.error())?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateTestimonial {
                author_id: my_id.into(),
                name: name.into(),
                rating,
                text: text.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Edits the `Testimonial` written by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_RATING` - `rating` is not from 1 to 5;
    /// - `TESTIMONIAL_NOT_EXISTS` - the `Testimonial` with the provided ID
    ///                              does not exist;
    /// - `NOT_AUTHORIZED` - the current `User` hasn't written the
    ///                      `Testimonial`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateTestimonial",
            otel.name = Self::SPAN_NAME,
            rating = %rating,
            testimonial_id = %testimonial_id,
        ),
    )]
    pub async fn update_testimonial(
        testimonial_id: api::testimonial::Id,
        rating: i32,
        text: api::testimonial::Text,
        ctx: &Context,
    ) -> Result<api::Testimonial, Error> {
        let rating = api::testimonial::rating(rating).map_err(ctx.error())?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateTestimonial {
                testimonial_id: testimonial_id.into(),
                by: my_id.into(),
                rating,
                text: text.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Testimonial` written by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `TESTIMONIAL_NOT_EXISTS` - the `Testimonial` with the provided ID
    ///                              does not exist;
    /// - `NOT_AUTHORIZED` - the current `User` hasn't written the
    ///                      `Testimonial`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteTestimonial",
            otel.name = Self::SPAN_NAME,
            testimonial_id = %testimonial_id,
        ),
    )]
    pub async fn delete_testimonial(
        testimonial_id: api::testimonial::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteTestimonial {
                testimonial_id: testimonial_id.into(),
                by: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Reports the `Testimonial` as inappropriate on behalf of the current
    /// `User`.
    ///
    /// The `Testimonial` is removed once reported by 5 different `User`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `TESTIMONIAL_NOT_EXISTS` - the `Testimonial` with the provided ID
    ///                              does not exist;
    /// - `ALREADY_REPORTED` - the current `User` has reported the
    ///                        `Testimonial` already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reportTestimonial",
            otel.name = Self::SPAN_NAME,
            testimonial_id = %testimonial_id,
        ),
    )]
    pub async fn report_testimonial(
        testimonial_id: api::testimonial::Id,
        ctx: &Context,
    ) -> Result<api::testimonial::ReportResult, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ReportTestimonial {
                testimonial_id: testimonial_id.into(),
                by: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum OwnershipError {
        #[code = "NOT_AUTHORIZED"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` is not allowed to act upon the \
                     requested entity"]
        NotAuthorized,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Provided `UserEmail` is occupied already"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::Blocking(_) | Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Provided credentials don't match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::WrongCredentials => Some(Error::WrongCredentials.into()),
            Self::Blocking(_)
            | Self::JsonWebTokenEncodeError(_)
            | Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::update_user_phone::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::become_owner::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ACTIVE_BOOKINGS_AS_OWNER"]
                #[status = CONFLICT]
                #[message = "`Car`s of the `User` have active `Booking`s"]
                ActiveBookingsAsOwner,

                #[code = "ACTIVE_BOOKINGS_AS_RENTER"]
                #[status = CONFLICT]
                #[message = "`User` has active `Booking`s"]
                ActiveBookingsAsRenter,
            }
        }

        Some(match self {
            Self::ActiveBookingsAsOwner(_) => {
                Error::ActiveBookingsAsOwner.into()
            }
            Self::ActiveBookingsAsRenter(_) => {
                Error::ActiveBookingsAsRenter.into()
            }
            Self::Db(e) => return e.try_as_error(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

/// [`Error`] of a [`Car`] having inconsistent properties.
///
/// [`Car`]: api::Car
#[derive(Clone, Copy, Debug)]
struct InvalidCar;

impl From<InvalidCar> for Error {
    fn from(InvalidCar: InvalidCar) -> Self {
        define_error! {
            enum Error {
                #[code = "INVALID_CAR"]
                #[status = BAD_REQUEST]
                #[message = "`Car` must have seats and a non-negative price"]
                InvalidCar,
            }
        }

        Error::InvalidCar.into()
    }
}

impl AsError for command::create_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidCar => InvalidCar.into(),
            Self::NotOwner(_) => api::PrivilegeError::Owner.into(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::update_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidCar => InvalidCar.into(),
            Self::NotAuthorized(_) => OwnershipError::NotAuthorized.into(),
        })
    }
}

impl AsError for command::toggle_car_availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotAuthorized(_) => OwnershipError::NotAuthorized.into(),
        })
    }
}

impl AsError for command::delete_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotAuthorized(_) => OwnershipError::NotAuthorized.into(),
        })
    }
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CAR_UNAVAILABLE"]
                #[status = CONFLICT]
                #[message = "`Car` is not offered for rent"]
                CarUnavailable,

                #[code = "DATE_RANGE_CONFLICT"]
                #[status = CONFLICT]
                #[message = "`Car` is booked within the requested dates \
                             already"]
                DateRangeConflict,

                #[code = "PRICE_OVERFLOW"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` price is too large"]
                PriceOverflow,

                #[code = "SELF_BOOKING_FORBIDDEN"]
                #[status = FORBIDDEN]
                #[message = "`Car` cannot be booked by its owner"]
                SelfBookingForbidden,
            }
        }

        Some(match self {
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::CarUnavailable(_) => Error::CarUnavailable.into(),
            Self::DateRangeConflict(_) => Error::DateRangeConflict.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::ForbiddenSelfBooking(_) => {
                Error::SelfBookingForbidden.into()
            }
            Self::InvalidDateRange(..) => {
                error::DateRangeError::InvalidDateRange.into()
            }
            Self::PriceOverflow(_) => Error::PriceOverflow.into(),
        })
    }
}

impl AsError for command::change_booking_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_STATUS_TRANSITION"]
                #[status = CONFLICT]
                #[message = "`Booking` cannot move to the requested status"]
                InvalidTransition,
            }
        }

        Some(match self {
            Self::BookingNotExists(_) => {
                api::query::BookingError::NotExists.into()
            }
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidTransition { .. } => Error::InvalidTransition.into(),
            Self::NotAuthorized(_) => OwnershipError::NotAuthorized.into(),
        })
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BOOKING_ALREADY_FINAL"]
                #[status = CONFLICT]
                #[message = "`Booking` is cancelled or completed already"]
                AlreadyFinal,

                #[code = "PAST_BOOKING"]
                #[status = CONFLICT]
                #[message = "`Booking` cannot be cancelled after its pickup \
                             date"]
                PastBooking,
            }
        }

        Some(match self {
            Self::AlreadyFinal(_) => Error::AlreadyFinal.into(),
            Self::BookingNotExists(_) => {
                api::query::BookingError::NotExists.into()
            }
            Self::Db(e) => return e.try_as_error(),
            Self::NotAuthorized(_) => OwnershipError::NotAuthorized.into(),
            Self::PastBooking(_) => Error::PastBooking.into(),
        })
    }
}

impl AsError for command::delete_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::BookingNotExists(_) => {
                api::query::BookingError::NotExists.into()
            }
            Self::Db(e) => return e.try_as_error(),
            Self::NotAuthorized(_) => OwnershipError::NotAuthorized.into(),
        })
    }
}

define_error! {
    enum TestimonialError {
        #[code = "TESTIMONIAL_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Testimonial` with the specified ID does not exist"]
        NotExists,
    }
}

impl AsError for command::create_testimonial::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::update_testimonial::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotAuthor(_) => OwnershipError::NotAuthorized.into(),
            Self::TestimonialNotExists(_) => TestimonialError::NotExists.into(),
        })
    }
}

impl AsError for command::delete_testimonial::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotAuthor(_) => OwnershipError::NotAuthorized.into(),
            Self::TestimonialNotExists(_) => TestimonialError::NotExists.into(),
        })
    }
}

impl AsError for command::report_testimonial::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_REPORTED"]
                #[status = CONFLICT]
                #[message = "`Testimonial` is reported by the `User` already"]
                AlreadyReported,
            }
        }

        Some(match self {
            Self::AlreadyReported(_) => Error::AlreadyReported.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::TestimonialNotExists(_) => TestimonialError::NotExists.into(),
        })
    }
}
