//! [`Query`] collection related to the multiple [`Car`]s.

use common::{
    operations::{By, Select},
    Date, DateRange,
};
use futures::future;
use tracerr::Traced;

use crate::{
    domain::{car, Car},
    infra::{database, Database},
    read, Query, Service,
};

use super::{car::ExecutionError, DatabaseQuery};

/// Queries listed [`Car`]s passing a [`read::car::list::Filter`], the newest
/// first.
pub type List = DatabaseQuery<By<Vec<Car>, read::car::list::Filter>>;

/// [`Query`] searching for [`Car`]s which may be booked between the provided
/// [`Date`]s, both inclusive.
#[derive(Clone, Debug)]
pub struct Available {
    /// [`car::Location`] to search [`Car`]s at.
    ///
    /// [`None`] means anywhere.
    pub location: Option<car::Location>,

    /// [`Date`] when a [`Car`] would be picked up.
    pub pickup_date: Date,

    /// [`Date`] when a [`Car`] would be returned.
    pub return_date: Date,
}

impl<Db> Query<Available> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Car>, read::car::list::Filter>>,
            Ok = Vec<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::car::IsAvailable, (car::Id, DateRange)>>,
            Ok = read::car::IsAvailable,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Car>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Available) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Available {
            location,
            pickup_date,
            return_date,
        } = query;

        let period = DateRange::new(pickup_date, return_date)
            .ok_or(E::InvalidDateRange(pickup_date, return_date))
            .map_err(tracerr::wrap!())?;

        let cars = self
            .database()
            .execute(Select(By::<Vec<Car>, _>::new(read::car::list::Filter {
                location,
                owner_id: None,
                only_available: true,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let free = future::try_join_all(cars.iter().map(|c| {
            self.database().execute(Select(By::<
                read::car::IsAvailable,
                _,
            >::new((c.id, period))))
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(cars
            .into_iter()
            .zip(free)
            .filter_map(|(car, free)| (*free).then_some(car))
            .collect())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{booking::Status, car, user},
        infra::database::mock::fixture,
        query::car::ExecutionError,
        Query as _,
    };

    use super::Available;

    #[tokio::test]
    async fn skips_booked_and_withdrawn_cars() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let owner = fixture::user(&db, "owner", user::Role::Owner, None);
        let renter = fixture::user(&db, "renter", user::Role::User, None);
        let free = fixture::car(&db, &owner, 1000);
        let withdrawn = fixture::car(&db, &owner, 1000);
        db.state().cars.get_mut(&withdrawn.id).unwrap().is_available = false;
        let elsewhere = fixture::car(&db, &owner, 1000);
        db.state().cars.get_mut(&elsewhere.id).unwrap().location =
            car::Location::new("Baguio").unwrap();
        let booked = crate::command::cancel_booking::spec::booking(
            &db,
            &owner,
            &renter,
            fixture::days(3, 6),
            Status::Confirmed,
        );
        let cancelled = crate::command::cancel_booking::spec::booking(
            &db,
            &owner,
            &renter,
            fixture::days(3, 6),
            Status::Cancelled,
        );

        let found = svc
            .execute(Available {
                location: Some(car::Location::new("CEBU city").unwrap()),
                pickup_date: fixture::day(5),
                return_date: fixture::day(8),
            })
            .await
            .unwrap();

        let mut ids = found.iter().map(|c| c.id).collect::<Vec<_>>();
        ids.sort_by_key(ToString::to_string);
        let mut expected = vec![free.id, cancelled.car_id];
        expected.sort_by_key(ToString::to_string);
        assert_eq!(ids, expected);
        assert!(!ids.contains(&booked.car_id));
        assert!(!ids.contains(&withdrawn.id));
        assert!(!ids.contains(&elsewhere.id));
    }

    #[tokio::test]
    async fn rejects_inverted_range() {
        let svc = fixture::service();

        let err = svc
            .execute(Available {
                location: None,
                pickup_date: fixture::day(2),
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
