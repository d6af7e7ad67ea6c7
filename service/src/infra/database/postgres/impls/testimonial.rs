//! [`Testimonial`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{testimonial, user, Testimonial},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `testimonials` table to build a [`Testimonial`] from.
const COLUMNS: &str = "\
    id, author_id, name, rating, text, reported_by, \
    created_at, updated_at";

/// Builds a [`Testimonial`] out of the provided [`Row`] having [`COLUMNS`].
fn from_row(row: &Row) -> Testimonial {
    Testimonial {
        id: row.get("id"),
        author_id: row.get("author_id"),
        name: row.get("name"),
        rating: u8::try_from(row.get::<_, i16>("rating"))
            .ok()
            .and_then(testimonial::Rating::new)
            .expect("`rating` is checked by constraint"),
        text: row.get("text"),
        reported_by: row.get("reported_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Testimonial>, testimonial::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Testimonial>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Testimonial>, testimonial::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: testimonial::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM testimonials \
             WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Testimonial>, read::testimonial::Newest>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Testimonial>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Testimonial>, read::testimonial::Newest>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::testimonial::Newest { limit } = by.into_inner();
        // `LIMIT NULL` doesn't limit anything.
        let limit = limit.map(i64::from);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM testimonials \
             ORDER BY created_at DESC, id \
             LIMIT $1::INT8",
        );
        Ok(self
            .query(&sql, &[&limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Testimonial>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Testimonial>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(testimonial): Insert<Testimonial>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(testimonial))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Testimonial>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(testimonial): Update<Testimonial>,
    ) -> Result<Self::Ok, Self::Err> {
        let Testimonial {
            id,
            author_id,
            name,
            rating,
            text,
            reported_by,
            created_at,
            updated_at,
        } = testimonial;

        const SQL: &str = "\
            INSERT INTO testimonials (\
                id, author_id, name, rating, text, reported_by, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::INT2, $5::VARCHAR, \
                $6::UUID[], \
                $7::TIMESTAMPTZ, $8::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET rating = EXCLUDED.rating, \
                text = EXCLUDED.text, \
                reported_by = EXCLUDED.reported_by, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &author_id,
                &name,
                &i16::from(rating.stars()),
                &text,
                &reported_by,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Testimonial, testimonial::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Testimonial, testimonial::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: testimonial::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM testimonials \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<Testimonial>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Testimonial>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let author_id: user::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM testimonials \
            WHERE author_id = $1::UUID";
        self.exec(SQL, &[&author_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<W, C> Database<Lock<By<W, testimonial::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<W, testimonial::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: testimonial::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO testimonials_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
