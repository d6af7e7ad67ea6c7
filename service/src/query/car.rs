//! [`Query`] collection related to a single [`Car`].

use common::{
    operations::{By, Select},
    Date, DateRange,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{car, Car},
    infra::{database, Database},
    read, Query, Service,
};

use super::DatabaseQuery;

/// Queries a [`Car`] by its [`car::Id`].
///
/// Unlisted [`Car`]s are returned too, as they're still referred by their
/// bookings.
pub type ById = DatabaseQuery<By<Option<Car>, car::Id>>;

/// [`Query`] checking whether a [`Car`] is free of bookings between the
/// provided [`Date`]s, both inclusive.
///
/// Only cancelled bookings don't occupy a [`Car`].
#[derive(Clone, Copy, Debug)]
pub struct IsAvailable {
    /// ID of the [`Car`] to check.
    pub car_id: car::Id,

    /// [`Date`] when the [`Car`] would be picked up.
    pub pickup_date: Date,

    /// [`Date`] when the [`Car`] would be returned.
    pub return_date: Date,
}

impl<Db> Query<IsAvailable> for Service<Db>
where
    Db: Database<
        Select<By<read::car::IsAvailable, (car::Id, DateRange)>>,
        Ok = read::car::IsAvailable,
        Err = Traced<database::Error>,
    >,
{
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: IsAvailable) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let IsAvailable {
            car_id,
            pickup_date,
            return_date,
        } = query;

        let period = DateRange::new(pickup_date, return_date)
            .ok_or(E::InvalidDateRange(pickup_date, return_date))
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Select(By::<read::car::IsAvailable, _>::new((
                car_id, period,
            ))))
            .await
            .map(|available| *available)
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`IsAvailable`] and [`Available`] [`Query`] execution.
///
/// [`Available`]: super::cars::Available
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Return [`Date`] doesn't go after the pickup one.
    #[display("Return date `{_1}` must be after pickup date `{_0}`")]
    #[from(ignore)]
    InvalidDateRange(Date, Date),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::cancel_booking::spec::booking,
        domain::{booking::Status, user},
        infra::database::mock::fixture,
        Query as _,
    };

    use super::{ExecutionError, IsAvailable};

    #[tokio::test]
    async fn treats_boundaries_as_inclusive() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let b = booking(
            &db,
            &owner,
            &renter,
            fixture::days(3, 6),
            Status::Pending,
        );

        for (pickup, ret, expected) in [
            (0, 2, true),
            (0, 3, false),
            (4, 5, false),
            (6, 8, false),
            (7, 9, true),
            (1, 10, false),
        ] {
            let available = svc
                .execute(IsAvailable {
                    car_id: b.car_id,
                    pickup_date: fixture::day(pickup),
                    return_date: fixture::day(ret),
                })
                .await
                .unwrap();
            assert_eq!(available, expected, "{pickup}..{ret}");
        }
    }

    #[tokio::test]
    async fn ignores_cancelled_bookings_only() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);

        for (status, expected) in [
            (Status::Cancelled, true),
            (Status::Completed, false),
            (Status::Confirmed, false),
        ] {
            let b = booking(&db, &owner, &renter, fixture::days(1, 2), status);
            let available = svc
                .execute(IsAvailable {
                    car_id: b.car_id,
                    pickup_date: fixture::day(1),
                    return_date: fixture::day(2),
                })
                .await
                .unwrap();
            assert_eq!(available, expected, "{status:?}");
        }
    }

    #[tokio::test]
    async fn rejects_empty_range() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let car = fixture::car(&db, &owner, 1000);

        let err = svc
            .execute(IsAvailable {
                car_id: car.id,
                pickup_date: fixture::day(1),
                return_date: fixture::day(1),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::InvalidDateRange(..)),
            "{err}",
        );
    }
}
