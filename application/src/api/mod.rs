//! GraphQL API definitions.

pub mod booking;
pub mod car;
mod mutation;
mod query;
pub mod report;
pub mod scalar;
mod subscription;
pub mod testimonial;
pub mod user;

use crate::define_error;

pub use self::{
    booking::Booking, car::Car, mutation::Mutation, query::Query,
    subscription::Subscription, testimonial::Testimonial, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PrivilegeError {
        #[code = "NOT_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be a `Car` owner"]
        Owner,
    }
}
