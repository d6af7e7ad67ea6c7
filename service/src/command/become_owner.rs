//! [`Command`] for upgrading a [`User`] to an [`Owner`].
//!
//! [`Owner`]: user::Role::Owner

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for upgrading a [`User`] to an [`Owner`], allowing to list
/// cars.
///
/// Upgrading an [`Owner`] is a no-op.
///
/// [`Owner`]: user::Role::Owner
#[derive(Clone, Copy, Debug, From)]
pub struct BecomeOwner {
    /// ID of the [`User`] to be upgraded.
    pub user_id: user::Id,
}

impl<Db> Command<BecomeOwner> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: BecomeOwner) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let BecomeOwner { user_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;
        if user.is_owner() {
            return Ok(user);
        }

        user.role = user::Role::Owner;
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(user.id = %user.id, "`User` became an owner");

        Ok(user)
    }
}

/// Error of [`BecomeOwner`] [`Command`] execution.
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
    use crate::{domain::user, infra::database::mock::fixture, Command as _};

    use super::BecomeOwner;

    #[tokio::test]
    async fn upgrades_role_once() {
        let svc = fixture::service();
        let db = svc.database().clone();
        let user = fixture::user(&db, "rico", user::Role::User, None);

        let upgraded = svc.execute(BecomeOwner { user_id: user.id }).await;
        assert_eq!(upgraded.unwrap().role, user::Role::Owner);
        assert_eq!(db.state().users[&user.id].role, user::Role::Owner);

        let again = svc.execute(BecomeOwner { user_id: user.id }).await;
        assert_eq!(again.unwrap().role, user::Role::Owner);
    }
}
