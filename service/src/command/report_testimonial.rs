//! [`Command`] for reporting an inappropriate [`Testimonial`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{testimonial, user, Testimonial},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for reporting a [`Testimonial`] by a [`User`].
///
/// Every [`User`] may report a [`Testimonial`] only once. The
/// [`Testimonial`] is deleted once it collects
/// [`Testimonial::REMOVAL_REPORTS`].
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug)]
pub struct ReportTestimonial {
    /// ID of the [`Testimonial`] to be reported.
    pub testimonial_id: testimonial::Id,

    /// ID of the [`User`] reporting the [`Testimonial`].
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,
}

/// Outcome of a [`ReportTestimonial`] [`Command`].
#[derive(Clone, Debug)]
pub enum Output {
    /// [`Testimonial`] is kept with the new report.
    Reported(Testimonial),

    /// [`Testimonial`] is deleted as reported too many times.
    Removed,
}

impl<Db> Command<ReportTestimonial> for Service<Db>
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
        + Database<
            Delete<By<Testimonial, testimonial::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReportTestimonial,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReportTestimonial { testimonial_id, by } = cmd;

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
        if !testimonial.report(by) {
            return Err(tracerr::new!(E::AlreadyReported(by)));
        }

        let output = if testimonial.is_to_be_removed() {
            tx.execute(Delete(By::<Testimonial, _>::new(testimonial_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Output::Removed
        } else {
            tx.execute(Update(testimonial.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Output::Reported(testimonial)
        };
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if matches!(output, Output::Removed) {
            tracing::info!(
                testimonial.id = %testimonial_id,
                "`Testimonial` removed as reported too many times",
            );
        }

        Ok(output)
    }
}

/// Error of [`ReportTestimonial`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`User`] has reported the [`Testimonial`] already.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` has reported the `Testimonial` already")]
    #[from(ignore)]
    AlreadyReported(#[error(not(source))] user::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Testimonial`] doesn't exist.
    #[display("`Testimonial(id: {_0})` does not exist")]
    #[from(ignore)]
    TestimonialNotExists(#[error(not(source))] testimonial::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{testimonial, user, Testimonial},
        infra::database::mock::fixture,
        Command as _,
    };

    use super::{ExecutionError, Output, ReportTestimonial};

    #[tokio::test]
    async fn counts_single_report_per_user() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);
        let reporter = fixture::user(&db, "reporter", user::Role::User, None);
        let t = fixture::testimonial(&db, author.id);
        let cmd = ReportTestimonial {
            testimonial_id: t.id,
            by: reporter.id,
        };

        let out = svc.execute(cmd).await.unwrap();

        let Output::Reported(reported) = out else {
            panic!("`Testimonial` is removed after a single report");
        };
        assert_eq!(reported.reported_by, [reporter.id]);

        let err = svc.execute(cmd).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::AlreadyReported(_)),
            "{err}",
        );
        assert_eq!(db.state().testimonials[&t.id].reported_by.len(), 1);
    }

    #[tokio::test]
    async fn removes_on_threshold() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let author = fixture::user(&db, "author", user::Role::User, None);
        let t = fixture::testimonial(&db, author.id);

        for n in 1..=Testimonial::REMOVAL_REPORTS {
            let out = svc
                .execute(ReportTestimonial {
                    testimonial_id: t.id,
                    by: user::Id::new(),
                })
                .await
                .unwrap();

            if n < Testimonial::REMOVAL_REPORTS {
                assert!(matches!(out, Output::Reported(_)), "report #{n}");
                assert!(db.state().testimonials.contains_key(&t.id));
            } else {
                assert!(matches!(out, Output::Removed), "report #{n}");
            }
        }
        assert!(!db.state().testimonials.contains_key(&t.id));
    }

    #[tokio::test]
    async fn rejects_unknown_testimonial() {
        let svc = fixture::service();

        let err = svc
            .execute(ReportTestimonial {
                testimonial_id: testimonial::Id::new(),
                by: user::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::TestimonialNotExists(_)),
            "{err}",
        );
    }
}
