//! Read entities definitions.

pub mod booking;
pub mod car;
pub mod testimonial;
