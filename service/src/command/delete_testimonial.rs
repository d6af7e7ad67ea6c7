//! [`Command`] for deleting a [`Testimonial`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{testimonial, user, Testimonial},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Testimonial`] by its author.
#[derive(Clone, Copy, Debug)]
pub struct DeleteTestimonial {
    /// ID of the [`Testimonial`] to be deleted.
    pub testimonial_id: testimonial::Id,

    /// ID of the [`User`] deleting the [`Testimonial`].
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,
}

impl<Db> Command<DeleteTestimonial> for Service<Db>
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
        > + Database<
            Delete<By<Testimonial, testimonial::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteTestimonial,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteTestimonial { testimonial_id, by } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent edits and reports of the same `Testimonial`.
        tx.execute(Lock(By::new(testimonial_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let testimonial = tx
            .execute(Select(By::<Option<Testimonial>, _>::new(testimonial_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TestimonialNotExists(testimonial_id))
            .map_err(tracerr::wrap!())?;
        if !testimonial.is_written_by(by) {
            return Err(tracerr::new!(E::NotAuthor(by)));
        }

        tx.execute(Delete(By::<Testimonial, _>::new(testimonial_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            testimonial.id = %testimonial_id,
            "`Testimonial` deleted by its author",
        );

        Ok(())
    }
}

/// Error of [`DeleteTestimonial`] [`Command`] execution.
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
    use crate::{domain::user, infra::database::mock::fixture, Command as _};

    use super::{DeleteTestimonial, ExecutionError};

    #[tokio::test]
    async fn deletes_own_testimonial() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);
        let t = fixture::testimonial(&db, author.id);
        let kept = fixture::testimonial(&db, author.id);
        let cmd = DeleteTestimonial {
            testimonial_id: t.id,
            by: author.id,
        };

        svc.execute(cmd).await.unwrap();

        assert!(!db.state().testimonials.contains_key(&t.id));
        assert!(db.state().testimonials.contains_key(&kept.id));

        let err = svc.execute(cmd).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::TestimonialNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn forbids_others() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);
        let other = fixture::user(&db, "other", user::Role::User, None);
        let t = fixture::testimonial(&db, author.id);

        let err = svc
            .execute(DeleteTestimonial {
                testimonial_id: t.id,
                by: other.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotAuthor(_)), "{err}");
        assert!(db.state().testimonials.contains_key(&t.id));
    }
}
