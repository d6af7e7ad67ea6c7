//! [`Command`] for writing a new [`Testimonial`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::testimonial::{Name, Rating, Text};
use crate::{
    domain::{testimonial, user, Testimonial, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for writing a new [`Testimonial`] by a [`User`].
#[derive(Clone, Debug)]
pub struct CreateTestimonial {
    /// ID of the [`User`] writing the [`Testimonial`].
    pub author_id: user::Id,

    /// [`Name`] to sign a new [`Testimonial`] with.
    pub name: testimonial::Name,

    /// [`Rating`] given by a new [`Testimonial`].
    pub rating: testimonial::Rating,

    /// [`Text`] of a new [`Testimonial`].
    pub text: testimonial::Text,
}

impl<Db> Command<CreateTestimonial> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Testimonial>, Err = Traced<database::Error>>,
{
    type Ok = Testimonial;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateTestimonial,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateTestimonial {
            author_id,
            name,
            rating,
            text,
        } = cmd;

        let author = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(author_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(author_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let testimonial = Testimonial {
            id: testimonial::Id::new(),
            author_id: author.id,
            name,
            rating,
            text,
            reported_by: vec![],
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        self.database()
            .execute(Insert(testimonial.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            testimonial.id = %testimonial.id,
            author.id = %author.id,
            "`Testimonial` written",
        );

        Ok(testimonial)
    }
}

/// Error of [`CreateTestimonial`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{testimonial, user},
        infra::database::mock::fixture,
        Command as _,
    };

    use super::{CreateTestimonial, ExecutionError};

    fn cmd(author_id: user::Id) -> CreateTestimonial {
        CreateTestimonial {
            author_id,
            name: testimonial::Name::new("Jose").unwrap(),
            rating: testimonial::Rating::new(4).unwrap(),
            text: testimonial::Text::new("Fair prices").unwrap(),
        }
    }

    #[tokio::test]
    async fn stores_unreported_testimonial() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);

        let t = svc.execute(cmd(author.id)).await.unwrap();

        assert!(t.is_written_by(author.id));
        assert_eq!(t.rating.stars(), 4);
        assert!(t.reported_by.is_empty());
        assert_eq!(
            t.created_at.unix_timestamp(),
            t.updated_at.unix_timestamp(),
        );
        assert!(db.state().testimonials.contains_key(&t.id));
    }

    #[tokio::test]
    async fn rejects_unknown_author() {
        let svc = fixture::service();
        let db = svc.database().clone();

        let err = svc.execute(cmd(user::Id::new())).await.unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::UserNotExists(_)),
            "{err}",
        );
        assert!(db.state().testimonials.is_empty());
    }
}
