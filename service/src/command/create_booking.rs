//! [`Command`] for booking a [`Car`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Date, DateRange, DateTime,
};
#[cfg(doc)]
use common::Money;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        booking::{self, Contact},
        car, user, Booking, Car, User,
    },
    infra::{database, Database},
    read::car::IsAvailable,
    Service,
};

use super::Command;

/// [`Command`] for booking a [`Car`] by a renter.
///
/// A new [`Booking`] starts as [`booking::Status::Pending`] and awaits a
/// decision of the [`Car`] owner.
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`User`] renting the [`Car`].
    pub user_id: user::Id,

    /// ID of the [`Car`] to be booked.
    pub car_id: car::Id,

    /// [`Date`] when the [`Car`] is picked up.
    pub pickup_date: Date,

    /// [`Date`] when the [`Car`] is returned.
    pub return_date: Date,

    /// [`Contact`] of the renter.
    pub contact: Contact,

    /// [`booking::PaymentMethod`] chosen by the renter.
    pub payment_method: booking::PaymentMethod,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<IsAvailable, (car::Id, DateRange)>>,
            Ok = IsAvailable,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Car, car::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<IsAvailable, (car::Id, DateRange)>>,
            Ok = IsAvailable,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            user_id,
            car_id,
            pickup_date,
            return_date,
            contact,
            payment_method,
        } = cmd;

        let period = DateRange::new(pickup_date, return_date)
            .ok_or(E::InvalidDateRange(pickup_date, return_date))
            .map_err(tracerr::wrap!())?;

        let car = self
            .database()
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let (_, owner_id) = check_bookable(car, car_id, user_id)?;

        let is_available = self
            .database()
            .execute(Select(By::<IsAvailable, _>::new((car_id, period))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !*is_available {
            return Err(tracerr::new!(E::DateRangeConflict(period)));
        }

        let owner_contact = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .and_then(|owner| owner.phone)
            .map_or_else(Contact::not_provided, Contact::from);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `Car`.
        tx.execute(Lock(By::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // The `Car` may have changed since the checks above.
        let car = tx
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let (car, owner_id) = check_bookable(car, car_id, user_id)?;
        let is_available = tx
            .execute(Select(By::<IsAvailable, _>::new((car_id, period))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !*is_available {
            return Err(tracerr::new!(E::DateRangeConflict(period)));
        }

        let price = Booking::price_for(car.price_per_day, &period)
            .ok_or(E::PriceOverflow(car_id))
            .map_err(tracerr::wrap!())?;
        let now = DateTime::now();
        let booking = Booking {
            id: booking::Id::new(),
            car_id,
            user_id,
            owner_id,
            period,
            status: booking::Status::Pending,
            price,
            payment_method,
            customer_contact: contact,
            owner_contact,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        match tx.execute(Insert(booking.clone())).await {
            Err(e) if e.as_ref().is_exclusion_violation(Some(NO_OVERLAP)) => {
                return Err(tracerr::new!(E::DateRangeConflict(period)));
            }
            res => res.map_err(tracerr::map_from_and_wrap!(=> E)).map(drop)?,
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            booking.id = %booking.id,
            car.id = %car_id,
            user.id = %user_id,
            booking.period = %period,
            "`Booking` created",
        );

        Ok(booking)
    }
}

/// Checks whether the provided [`Car`] may be booked by the [`User`] with the
/// provided ID, returning it along with the ID of its owner.
fn check_bookable(
    car: Option<Car>,
    car_id: car::Id,
    user_id: user::Id,
) -> Result<(Car, user::Id), Traced<ExecutionError>> {
    use ExecutionError as E;

    let (car, owner_id) = car
        .and_then(|c| c.owner_id.map(|owner| (c, owner)))
        .ok_or(E::CarNotExists(car_id))
        .map_err(tracerr::wrap!())?;
    if owner_id == user_id {
        return Err(tracerr::new!(E::ForbiddenSelfBooking(car_id)));
    }
    if !car.is_available {
        return Err(tracerr::new!(E::CarUnavailable(car_id)));
    }
    Ok((car, owner_id))
}

/// Name of the exclusion constraint preventing overlapping [`Booking`]s of
/// the same [`Car`].
const NO_OVERLAP: &str = "bookings_no_overlap";

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] doesn't exist or is not listed anymore.
    #[display("`Car(id: {_0})` does not exist")]
    #[from(ignore)]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Car`] is not offered for rent by its owner.
    #[display("`Car(id: {_0})` is not available for rent")]
    #[from(ignore)]
    CarUnavailable(#[error(not(source))] car::Id),

    /// [`Car`] is already booked for some of the requested [`Date`]s.
    #[display("`Car` is already booked within `{_0}`")]
    #[from(ignore)]
    DateRangeConflict(#[error(not(source))] DateRange),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Owner tries to book its own [`Car`].
    #[display("`Car(id: {_0})` cannot be booked by its owner")]
    #[from(ignore)]
    ForbiddenSelfBooking(#[error(not(source))] car::Id),

    /// Return [`Date`] doesn't go after the pickup one.
    #[display("Return date `{_1}` must be after pickup date `{_0}`")]
    #[from(ignore)]
    InvalidDateRange(Date, Date),

    /// Price of the [`Booking`] doesn't fit into [`Money`].
    #[display("Price of `Car(id: {_0})` overflows for the requested dates")]
    #[from(ignore)]
    PriceOverflow(#[error(not(source))] car::Id),
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, Money};
    use rust_decimal::Decimal;

    use crate::{
        command::ChangeBookingStatus,
        domain::{
            booking::{Contact, PaymentMethod, Status},
            user,
        },
        infra::database::mock::fixture,
        query::car::IsAvailable,
        Command as _, Query as _,
    };

    use super::{CreateBooking, ExecutionError};

    fn cmd(
        user_id: user::Id,
        car_id: crate::domain::car::Id,
        pickup: i64,
        ret: i64,
    ) -> CreateBooking {
        CreateBooking {
            user_id,
            car_id,
            pickup_date: fixture::day(pickup),
            return_date: fixture::day(ret),
            contact: Contact::new("+63 917 555 0101").unwrap(),
            payment_method: PaymentMethod::Gcash,
        }
    }

    #[tokio::test]
    async fn books_car_for_two_days() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(
            &db,
            "owner",
            user::Role::Owner,
            Some("+639171234567"),
        );
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);

        let booking = svc
            .execute(cmd(renter.id, car.id, 10, 12))
            .await
            .unwrap();

        assert_eq!(booking.status, Status::Pending);
        assert_eq!(booking.price, Money::new(4000, Currency::Php));
        assert_eq!(booking.owner_id, owner.id);
        assert_eq!(AsRef::<str>::as_ref(&booking.owner_contact), "+639171234567");
        assert_eq!(AsRef::<str>::as_ref(&booking.customer_contact), "+63 917 555 0101");
        assert_eq!(booking.pickup_date(), fixture::day(10));
        assert_eq!(booking.return_date(), fixture::day(12));
        assert!(db.state().bookings.contains_key(&booking.id));
    }

    #[test]
    fn price_is_deterministic() {
        let period = common::DateRange::new(
            "2025-06-01".parse::<Date>().unwrap(),
            "2025-06-03".parse().unwrap(),
        )
        .unwrap();

        let price = crate::domain::Booking::price_for(
            Money::new(1000, Currency::Php),
            &period,
        );

        assert_eq!(price, Some(Money::new(2000, Currency::Php)));
    }

    #[tokio::test]
    async fn owner_contact_defaults_to_placeholder() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);

        let booking = svc
            .execute(cmd(renter.id, car.id, 1, 2))
            .await
            .unwrap();

        assert_eq!(AsRef::<str>::as_ref(&booking.owner_contact), Contact::NOT_PROVIDED);
    }

    #[tokio::test]
    async fn conflicts_until_cancelled() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let first = fixture::user(&db, "first", user::Role::User, None);
        let second = fixture::user(&db, "second", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);

        let booking = svc
            .execute(cmd(first.id, car.id, 10, 12))
            .await
            .unwrap();

        // Touching the boundary day conflicts too.
        for (pickup, ret) in [(11, 13), (8, 10), (12, 14), (9, 15)] {
            let err = svc
                .execute(cmd(second.id, car.id, pickup, ret))
                .await
                .unwrap_err();
            assert!(
                matches!(err.as_ref(), ExecutionError::DateRangeConflict(_)),
                "{err}",
            );
        }
        assert_eq!(db.state().bookings.len(), 1);

        drop(
            svc.execute(ChangeBookingStatus {
                booking_id: booking.id,
                by: owner.id,
                status: Status::Cancelled,
            })
            .await
            .unwrap(),
        );

        let rebooked = svc.execute(cmd(second.id, car.id, 11, 13)).await;
        assert_eq!(rebooked.unwrap().status, Status::Pending);
    }

    #[tokio::test]
    async fn availability_agrees_with_booking() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);
        drop(svc.execute(cmd(renter.id, car.id, 5, 7)).await.unwrap());

        for (pickup, ret) in [(1, 4), (1, 5), (7, 9), (8, 9)] {
            let available = svc
                .execute(IsAvailable {
                    car_id: car.id,
                    pickup_date: fixture::day(pickup),
                    return_date: fixture::day(ret),
                })
                .await
                .unwrap();
            let booked = svc.execute(cmd(renter.id, car.id, pickup, ret)).await;
            assert_eq!(available, booked.is_ok(), "{pickup}..{ret}");
        }
    }

    #[tokio::test]
    async fn forbids_self_booking() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let car = fixture::car(&db, &owner, 2000);

        let err = svc
            .execute(cmd(owner.id, car.id, 1, 2))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::ForbiddenSelfBooking(_)),
            "{err}",
        );
        assert!(db.state().bookings.is_empty());
    }

    #[tokio::test]
    async fn rejects_unavailable_car() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);
        db.state().cars.get_mut(&car.id).unwrap().is_available = false;

        let err = svc
            .execute(cmd(renter.id, car.id, 1, 2))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::CarUnavailable(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_unlisted_car() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);
        db.state().cars.get_mut(&car.id).unwrap().unlist();

        let err = svc
            .execute(cmd(renter.id, car.id, 1, 2))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::CarNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_inverted_range() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);

        for (pickup, ret) in [(3, 3), (4, 3)] {
            let err = svc
                .execute(cmd(renter.id, car.id, pickup, ret))
                .await
                .unwrap_err();
            assert!(
                matches!(err.as_ref(), ExecutionError::InvalidDateRange(..)),
                "{err}",
            );
        }
    }

    #[tokio::test]
    async fn rejects_overflowing_price() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);
        db.state().cars.get_mut(&car.id).unwrap().price_per_day.amount =
            Decimal::MAX;

        let err = svc
            .execute(cmd(renter.id, car.id, 1, 3))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::PriceOverflow(_)),
            "{err}",
        );
        assert!(db.state().bookings.is_empty());
    }

    #[tokio::test]
    async fn prices_by_car_read_under_lock() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);
        let car_id = car.id;
        db.on_transact(move |s| {
            s.cars.get_mut(&car_id).unwrap().price_per_day =
                Money::new(3000, Currency::Php);
        });

        let booking = svc
            .execute(cmd(renter.id, car.id, 10, 12))
            .await
            .unwrap();

        assert_eq!(booking.price, Money::new(6000, Currency::Php));
    }

    #[tokio::test]
    async fn rechecks_range_under_lock() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let other = fixture::user(&db, "other", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);
        let concurrent = fixture::booking(
            &car,
            &other,
            fixture::days(10, 12),
            Status::Pending,
        );
        let concurrent_id = concurrent.id;
        db.on_transact(move |s| {
            drop(s.bookings.insert(concurrent.id, concurrent));
        });

        let err = svc
            .execute(cmd(renter.id, car.id, 11, 13))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::DateRangeConflict(_)),
            "{err}",
        );
        let bookings = db.state().bookings.keys().copied().collect::<Vec<_>>();
        assert_eq!(bookings, [concurrent_id]);
    }

    #[tokio::test]
    async fn reports_storage_overlap_as_conflict() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);
        db.state().violated_exclusion = Some("bookings_no_overlap");

        let err = svc
            .execute(cmd(renter.id, car.id, 1, 3))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::DateRangeConflict(_)),
            "{err}",
        );
        assert!(db.state().bookings.is_empty());
    }

    #[tokio::test]
    async fn propagates_unrelated_storage_violation() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let car = fixture::car(&db, &owner, 2000);
        db.state().violated_exclusion = Some("some_other_constraint");

        let err = svc
            .execute(cmd(renter.id, car.id, 1, 3))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)), "{err}");
    }
}
