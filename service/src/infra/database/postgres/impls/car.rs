//! [`Car`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{car, user, Car},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `cars` table to build a [`Car`] from.
const COLUMNS: &str = "\
    id, owner_id, \
    brand, model, year, category, seating_capacity, \
    transmission, fuel_type, \
    price_per_day, price_per_day_currency, \
    location, description, is_available, \
    created_at";

/// Builds a [`Car`] out of the provided [`Row`] having [`COLUMNS`].
fn from_row(row: &Row) -> Car {
    Car {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        brand: row.get("brand"),
        model: row.get("model"),
        year: u16::try_from(row.get::<_, i32>("year"))
            .expect("`year` overflow"),
        category: row.get("category"),
        seating_capacity: u16::try_from(row.get::<_, i32>("seating_capacity"))
            .expect("`seating_capacity` overflow"),
        transmission: row.get("transmission"),
        fuel_type: row.get("fuel_type"),
        price_per_day: Money {
            amount: row.get("price_per_day"),
            currency: row.get("price_per_day_currency"),
        },
        location: row.get("location"),
        description: row.get("description"),
        is_available: row.get("is_available"),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<car::Id, Car>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[car::Id]>,
{
    type Ok = HashMap<car::Id, Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<car::Id, Car>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[car::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM cars \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let car = from_row(row);
                (car.id, car)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Car>, car::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<car::Id, Car>, [car::Id; 1]>>,
        Ok = HashMap<car::Id, Car>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Car>, read::car::list::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Car>, read::car::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::car::list::Filter {
            location,
            owner_id,
            only_available,
        } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];

        let location_idx = location.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });
        let owner_idx = owner_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM cars \
             WHERE owner_id IS NOT NULL \
                   {location_filtering} \
                   {owner_filtering} \
                   {availability_filtering} \
             ORDER BY created_at DESC, id",
            location_filtering =
                location_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(location) = LOWER(${idx}::VARCHAR)"
                    ))
                }),
            owner_filtering = owner_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND owner_id = ${idx}::UUID"))
            }),
            availability_filtering =
                if only_available { "AND is_available" } else { "" },
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Car>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Car>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(car): Insert<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(car)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Car>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(car): Update<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        let Car {
            id,
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
            is_available,
            created_at,
        } = car;

        const SQL: &str = "\
            INSERT INTO cars (\
                id, owner_id, \
                brand, model, year, category, seating_capacity, \
                transmission, fuel_type, \
                price_per_day, price_per_day_currency, \
                location, description, is_available, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, $5::INT4, $6::INT2, $7::INT4, \
                $8::INT2, $9::INT2, \
                $10::DECIMAL, $11::INT2, \
                $12::VARCHAR, $13::VARCHAR, $14::BOOLEAN, \
                $15::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET owner_id = EXCLUDED.owner_id, \
                brand = EXCLUDED.brand, \
                model = EXCLUDED.model, \
                year = EXCLUDED.year, \
                category = EXCLUDED.category, \
                seating_capacity = EXCLUDED.seating_capacity, \
                transmission = EXCLUDED.transmission, \
                fuel_type = EXCLUDED.fuel_type, \
                price_per_day = EXCLUDED.price_per_day, \
                price_per_day_currency = EXCLUDED.price_per_day_currency, \
                location = EXCLUDED.location, \
                description = EXCLUDED.description, \
                is_available = EXCLUDED.is_available";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &brand,
                &model,
                &i32::from(year),
                &category,
                &i32::from(seating_capacity),
                &transmission,
                &fuel_type,
                &price_per_day.amount,
                &price_per_day.currency,
                &location,
                &description,
                &is_available,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<Car>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Car>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let owner_id: user::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM cars \
            WHERE owner_id = $1::UUID";
        self.exec(SQL, &[&owner_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<W, C> Database<Lock<By<W, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<W, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: car::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO cars_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
