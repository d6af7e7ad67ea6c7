//! [`Booking`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    DateRange, Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, car, user, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{
        self,
        booking::{ActiveCount, Party},
    },
};

/// Columns of the `bookings` table to build a [`Booking`] from.
const COLUMNS: &str = "\
    id, car_id, user_id, owner_id, \
    pickup_date, return_date, status, \
    price, price_currency, payment_method, \
    customer_contact, owner_contact, \
    created_at, updated_at";

/// Builds a [`Booking`] out of the provided [`Row`] having [`COLUMNS`].
fn from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        car_id: row.get("car_id"),
        user_id: row.get("user_id"),
        owner_id: row.get("owner_id"),
        period: DateRange::new(row.get("pickup_date"), row.get("return_date"))
            .expect("`bookings_period_check` constraint"),
        status: row.get("status"),
        price: Money {
            amount: row.get("price"),
            currency: row.get("price_currency"),
        },
        payment_method: row.get("payment_method"),
        customer_contact: row.get("customer_contact"),
        owner_contact: row.get("owner_contact"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Returns the `bookings` column identifying the provided [`Party`] along
/// with the [`user::Id`] to match it against.
fn party_column(party: Party) -> (&'static str, user::Id) {
    match party {
        Party::Renter(id) => ("user_id", id),
        Party::Owner(id) => ("owner_id", id),
    }
}

impl<C, IDs> Database<Select<By<HashMap<booking::Id, Booking>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[booking::Id]>,
{
    type Ok = HashMap<booking::Id, Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<booking::Id, Booking>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[booking::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let booking = from_row(row);
                (booking.id, booking)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<booking::Id, Booking>, [booking::Id; 1]>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<read::car::IsAvailable, (car::Id, DateRange)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::car::IsAvailable;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::car::IsAvailable, (car::Id, DateRange)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (car_id, period) = by.into_inner();

        const SQL: &str = "\
            SELECT NOT EXISTS (\
                SELECT 1 \
                FROM bookings \
                WHERE car_id = $1::UUID \
                  AND status <> $2::INT2 \
                  AND pickup_date <= $4::DATE \
                  AND return_date >= $3::DATE\
            )";
        self.query_opt(
            SQL,
            &[
                &car_id,
                &booking::Status::Cancelled,
                &period.start(),
                &period.end(),
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| {
            let row = row.expect("always exists");
            read::car::IsAvailable(row.get::<_, bool>(0))
        })
    }
}

impl<C> Database<Select<By<Vec<Booking>, Party>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, Party>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (column, user_id) = party_column(by.into_inner());

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE {column} = $1::UUID \
             ORDER BY created_at DESC, id",
        );
        Ok(self
            .query(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<ActiveCount, Party>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ActiveCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<ActiveCount, Party>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (column, user_id) = party_column(by.into_inner());

        let sql = format!(
            "SELECT COUNT(*) \
             FROM bookings \
             WHERE {column} = $1::UUID \
               AND status IN ($2::INT2, $3::INT2)",
        );
        self.query_opt(
            &sql,
            &[
                &user_id,
                &booking::Status::Pending,
                &booking::Status::Confirmed,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| row.expect("always exists").get::<_, i64>(0).into())
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            car_id,
            user_id,
            owner_id,
            period,
            status,
            price,
            payment_method,
            customer_contact,
            owner_contact,
            created_at,
            updated_at,
        } = booking;

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, car_id, user_id, owner_id, \
                pickup_date, return_date, status, \
                price, price_currency, payment_method, \
                customer_contact, owner_contact, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::DATE, $6::DATE, $7::INT2, \
                $8::DECIMAL, $9::INT2, $10::INT2, \
                $11::VARCHAR, $12::VARCHAR, \
                $13::TIMESTAMPTZ, $14::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET pickup_date = EXCLUDED.pickup_date, \
                return_date = EXCLUDED.return_date, \
                status = EXCLUDED.status, \
                price = EXCLUDED.price, \
                price_currency = EXCLUDED.price_currency, \
                payment_method = EXCLUDED.payment_method, \
                customer_contact = EXCLUDED.customer_contact, \
                owner_contact = EXCLUDED.owner_contact, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &car_id,
                &user_id,
                &owner_id,
                &period.start(),
                &period.end(),
                &status,
                &price.amount,
                &price.currency,
                &payment_method,
                &customer_contact,
                &owner_contact,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM bookings \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<Booking>, Party>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Booking>, Party>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (column, user_id) = party_column(by.into_inner());

        let sql = format!(
            "DELETE FROM bookings \
             WHERE {column} = $1::UUID",
        );
        self.exec(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<W, C> Database<Lock<By<W, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<W, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO bookings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
