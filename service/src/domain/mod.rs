//! Domain definitions.

pub mod booking;
pub mod car;
pub mod testimonial;
pub mod user;

pub use self::{
    booking::Booking, car::Car, testimonial::Testimonial, user::User,
};
