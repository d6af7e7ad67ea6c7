//! [`Testimonial`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, define_error, Context, Error};

/// A review of the service left by a `User`.
#[derive(Clone, Debug, From)]
pub struct Testimonial(domain::Testimonial);

/// A review of the service left by a `User`.
#[graphql_object(context = Context)]
impl Testimonial {
    /// Unique identifier of this `Testimonial`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Testimonial.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` who wrote this `Testimonial`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Testimonial.author",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn author(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`Testimonial`s are deleted along with their author"
        )]
        unsafe {
            api::User::new_unchecked(self.0.author_id)
        }
    }

    /// Name this `Testimonial` is signed with.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Testimonial.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Number of stars given by this `Testimonial`, from 1 to 5.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Testimonial.rating",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn rating(&self) -> i32 {
        self.0.rating.stars().into()
    }

    /// Text of this `Testimonial`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Testimonial.text",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn text(&self) -> Text {
        self.0.text.clone().into()
    }

    /// Number of times this `Testimonial` was reported.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Testimonial.reportCount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn report_count(&self) -> i32 {
        i32::try_from(self.0.reported_by.len()).unwrap_or(i32::MAX)
    }

    /// `DateTime` when this `Testimonial` was written.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Testimonial.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `Testimonial` was edited last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Testimonial.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of a `Testimonial`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::testimonial::Id)]
#[into(domain::testimonial::Id)]
#[graphql(name = "TestimonialId", transparent)]
pub struct Id(Uuid);

/// Name a `Testimonial` is signed with.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TestimonialName",
    with = scalar::Via::<domain::testimonial::Name>,
)]
pub struct Name(domain::testimonial::Name);

/// Text of a `Testimonial`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TestimonialText",
    with = scalar::Via::<domain::testimonial::Text>,
)]
pub struct Text(domain::testimonial::Text);

/// Parses the provided number of `stars` as a
/// [`domain::testimonial::Rating`].
///
/// # Errors
///
/// If the `stars` are not from 1 to 5.
pub(crate) fn rating(
    stars: i32,
) -> Result<domain::testimonial::Rating, Error> {
    u8::try_from(stars)
        .ok()
        .and_then(domain::testimonial::Rating::new)
        .ok_or_else(|| RatingError::Invalid.into())
}

/// Outcome of reporting a `Testimonial`.
#[derive(Clone, Debug)]
pub struct ReportResult {
    /// Reported [`Testimonial`], if it's still kept.
    testimonial: Option<Testimonial>,
}

impl From<service::command::report_testimonial::Output> for ReportResult {
    fn from(out: service::command::report_testimonial::Output) -> Self {
        use service::command::report_testimonial::Output as O;

        Self {
            testimonial: match out {
                O::Reported(t) => Some(t.into()),
                O::Removed => None,
            },
        }
    }
}

/// Outcome of reporting a `Testimonial`.
#[graphql_object(name = "TestimonialReportResult", context = Context)]
impl ReportResult {
    /// Indicator whether the `Testimonial` was removed as reported too many
    /// times.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "TestimonialReportResult.removed",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn removed(&self) -> bool {
        self.testimonial.is_none()
    }

    /// Reported `Testimonial`, `null` if it was removed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "TestimonialReportResult.testimonial",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn testimonial(&self) -> Option<Testimonial> {
        self.testimonial.clone()
    }
}

define_error! {
    enum RatingError {
        #[code = "INVALID_RATING"]
        #[status = BAD_REQUEST]
        #[message = "`Testimonial` rating must be from 1 to 5"]
        Invalid,
    }
}

#[cfg(test)]
mod spec {
    use super::rating;

    #[test]
    fn accepts_one_to_five_stars() {
        assert!(rating(0).is_err());
        assert!(rating(-3).is_err());
        assert!(rating(6).is_err());
        assert!(rating(256 + 3).is_err());
        for stars in 1..=5_u8 {
            assert_eq!(rating(stars.into()).unwrap().stars(), stars);
        }
    }
}
