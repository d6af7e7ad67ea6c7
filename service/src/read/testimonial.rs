//! [`Testimonial`]-related read definitions.

use crate::domain::Testimonial;

/// Selector of the newest [`Testimonial`]s.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Newest {
    /// Maximum number of the selected [`Testimonial`]s.
    ///
    /// [`None`] selects all of them.
    pub limit: Option<u32>,
}

impl Newest {
    /// Orders the provided [`Testimonial`]s from the newest one and cuts
    /// them to the [`Newest::limit`].
    pub fn apply(self, testimonials: &mut Vec<Testimonial>) {
        testimonials.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
        });
        if let Some(limit) = self.limit {
            let limit = usize::try_from(limit).unwrap_or(usize::MAX);
            testimonials.truncate(limit);
        }
    }
}
