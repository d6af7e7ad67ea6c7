//! [`Command`] definition.

pub mod authorize_user_session;
pub mod become_owner;
pub mod cancel_booking;
pub mod change_booking_status;
pub mod create_booking;
pub mod create_car;
pub mod create_testimonial;
pub mod create_user;
pub mod create_user_session;
pub mod delete_booking;
pub mod delete_car;
pub mod delete_testimonial;
pub mod delete_user;
pub mod report_testimonial;
pub mod toggle_car_availability;
pub mod update_car;
pub mod update_testimonial;
pub mod update_user_phone;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession, become_owner::BecomeOwner,
    cancel_booking::CancelBooking, change_booking_status::ChangeBookingStatus,
    create_booking::CreateBooking, create_car::CreateCar,
    create_testimonial::CreateTestimonial, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_booking::DeleteBooking,
    delete_car::DeleteCar, delete_testimonial::DeleteTestimonial,
    delete_user::DeleteUser, report_testimonial::ReportTestimonial,
    toggle_car_availability::ToggleCarAvailability, update_car::UpdateCar,
    update_testimonial::UpdateTestimonial,
    update_user_phone::UpdateUserPhone,
};
