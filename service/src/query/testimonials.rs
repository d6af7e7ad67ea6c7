//! [`Query`] collection related to the multiple [`Testimonial`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::Testimonial,
    infra::{database, Database},
    read, Query, Service,
};

use super::DatabaseQuery;

/// Queries [`Testimonial`]s selected by a [`read::testimonial::Newest`].
pub type List = DatabaseQuery<By<Vec<Testimonial>, read::testimonial::Newest>>;

/// [`Query`] of the few newest [`Testimonial`]s to be featured.
#[derive(Clone, Copy, Debug, Default)]
pub struct Latest;

impl Latest {
    /// Number of the featured [`Testimonial`]s.
    pub const COUNT: u32 = 3;
}

impl<Db> Query<Latest> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Testimonial>, read::testimonial::Newest>>,
        Ok = Vec<Testimonial>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Testimonial>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Latest) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(By::<Vec<Testimonial>, _>::new(
                read::testimonial::Newest {
                    limit: Some(Latest::COUNT),
                },
            )))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        domain::{testimonial, user, Testimonial},
        infra::database::mock::{fixture, Mock},
        read, Query as _,
    };

    use super::{Latest, List};

    fn write(db: &Mock, author: user::Id, age_mins: i64) -> Testimonial {
        let at = DateTime::from_unix_timestamp(
            DateTime::now().unix_timestamp() - age_mins * 60,
        )
        .unwrap();
        let mut t = fixture::testimonial(db, author);
        t.created_at = at.coerce();
        t.updated_at = at.coerce();
        drop(db.state().testimonials.insert(t.id, t.clone()));
        t
    }

    #[tokio::test]
    async fn features_three_newest() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);
        let ids = (0..5)
            .map(|age| write(&db, author.id, age).id)
            .collect::<Vec<_>>();

        let latest = svc.execute(Latest).await.unwrap();

        let latest = latest.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(latest, ids[..3]);
    }

    #[tokio::test]
    async fn lists_all_newest_first() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);
        let older = write(&db, author.id, 10);
        let newer = write(&db, author.id, 1);

        let all = svc
            .execute(List::by(read::testimonial::Newest::default()))
            .await
            .unwrap();

        let all = all.iter().map(|t| t.id).collect::<Vec<testimonial::Id>>();
        assert_eq!(all, [newer.id, older.id]);
    }
}
