//! [`Command`] for editing a [`Testimonial`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::testimonial::{Rating, Text};
use crate::{
    domain::{testimonial, user, Testimonial},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing a [`Testimonial`] by its author.
///
/// Reports made upon the [`Testimonial`] are kept.
#[derive(Clone, Debug)]
pub struct UpdateTestimonial {
    /// ID of the [`Testimonial`] to be edited.
    pub testimonial_id: testimonial::Id,

    /// ID of the [`User`] editing the [`Testimonial`].
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,

    /// New [`Rating`].
    pub rating: testimonial::Rating,

    /// New [`Text`].
    pub text: testimonial::Text,
}

impl<Db> Command<UpdateTestimonial> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Testimonial, testimonial::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Testimonial>, testimonial::Id>>,
            Ok = Option<Testimonial>,
            Err = Traced<database::Error>,
        > + Database<Update<Testimonial>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Testimonial;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateTestimonial,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateTestimonial {
            testimonial_id,
            by,
            rating,
            text,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent edits and reports of the same `Testimonial`.
        tx.execute(Lock(By::new(testimonial_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut testimonial = tx
            .execute(Select(By::<Option<Testimonial>, _>::new(testimonial_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TestimonialNotExists(testimonial_id))
            .map_err(tracerr::wrap!())?;
        if !testimonial.is_written_by(by) {
            return Err(tracerr::new!(E::NotAuthor(by)));
        }

        testimonial.rating = rating;
        testimonial.text = text;
        testimonial.updated_at = DateTime::now().coerce();

        tx.execute(Update(testimonial.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(testimonial)
    }
}

/// Error of [`UpdateTestimonial`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] hasn't written the [`Testimonial`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the author of the `Testimonial`")]
    #[from(ignore)]
    NotAuthor(#[error(not(source))] user::Id),

    /// [`Testimonial`] doesn't exist.
    #[display("`Testimonial(id: {_0})` does not exist")]
    #[from(ignore)]
    TestimonialNotExists(#[error(not(source))] testimonial::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{testimonial, user},
        infra::database::mock::fixture,
        Command as _,
    };

    use super::{ExecutionError, UpdateTestimonial};

    #[tokio::test]
    async fn edits_rating_and_text() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);
        let reporter = fixture::user(&db, "reporter", user::Role::User, None);
        let t = fixture::testimonial(&db, author.id);
        db.state()
            .testimonials
            .get_mut(&t.id)
            .unwrap()
            .reported_by
            .push(reporter.id);

        let updated = svc
            .execute(UpdateTestimonial {
                testimonial_id: t.id,
                by: author.id,
                rating: testimonial::Rating::MIN,
                text: testimonial::Text::new("Late pickup").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(updated.rating, testimonial::Rating::MIN);
        assert_eq!(AsRef::<str>::as_ref(&updated.text), "Late pickup");
        assert_eq!(updated.name, t.name);
        assert_eq!(updated.reported_by, [reporter.id]);
        assert!(updated.updated_at >= t.updated_at);
        let stored = &db.state().testimonials[&t.id];
        assert_eq!(stored.rating, testimonial::Rating::MIN);
    }

    #[tokio::test]
    async fn forbids_others() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);
        let other = fixture::user(&db, "other", user::Role::Owner, None);
        let t = fixture::testimonial(&db, author.id);

        let err = svc
            .execute(UpdateTestimonial {
                testimonial_id: t.id,
                by: other.id,
                rating: testimonial::Rating::MIN,
                text: t.text.clone(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotAuthor(_)), "{err}");
        assert_eq!(db.state().testimonials[&t.id].rating, t.rating);
    }

    #[tokio::test]
    async fn rejects_unknown_testimonial() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);

        let err = svc
            .execute(UpdateTestimonial {
                testimonial_id: testimonial::Id::new(),
                by: author.id,
                rating: testimonial::Rating::MAX,
                text: testimonial::Text::new("Great").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::TestimonialNotExists(_)),
            "{err}",
        );
    }
}
