//! [`Command`] for changing a [`booking::Status`] by a [`Car`] owner.
//!
//! [`Car`]: crate::domain::Car

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for moving a [`Booking`] to the provided [`booking::Status`]
/// by the owner of the booked [`Car`].
///
/// Only transitions allowed by [`booking::Status::can_transition_to()`] are
/// performed.
///
/// [`Car`]: crate::domain::Car
#[derive(Clone, Copy, Debug)]
pub struct ChangeBookingStatus {
    /// ID of the [`Booking`] to be changed.
    pub booking_id: booking::Id,

    /// ID of the [`User`] performing the change.
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,

    /// New [`booking::Status`] of the [`Booking`].
    pub status: booking::Status,
}

impl<Db> Command<ChangeBookingStatus> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ChangeBookingStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ChangeBookingStatus {
            booking_id,
            by,
            status,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Booking`.
        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if booking.owner_id != by {
            return Err(tracerr::new!(E::NotAuthorized(by)));
        }
        if !booking.status.can_transition_to(status) {
            return Err(tracerr::new!(E::InvalidTransition {
                from: booking.status,
                to: status,
            }));
        }

        let prev = booking.status;
        booking.status = status;
        booking.updated_at = DateTime::now().coerce();
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            booking.id = %booking.id,
            %prev,
            %status,
            "`Booking` status changed",
        );

        Ok(booking)
    }
}

/// Error of [`ChangeBookingStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] doesn't exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requested transition of [`booking::Status`] is not allowed.
    #[display("`Booking` cannot move from `{from}` to `{to}`")]
    #[from(ignore)]
    InvalidTransition {
        /// Current [`booking::Status`].
        from: booking::Status,

        /// Requested [`booking::Status`].
        to: booking::Status,
    },

    /// [`User`] doesn't own the booked [`Car`].
    ///
    /// [`Car`]: crate::domain::Car
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not the owner of the booked `Car`")]
    #[from(ignore)]
    NotAuthorized(#[error(not(source))] user::Id),
}
