//! In-memory [`Database`] used for testing [`Command`]s and [`Query`]s.
//!
//! Mutations are applied immediately, so [`Commit`] is a no-op and a
//! [`Lock`] never blocks. [`Transact`] runs the [`State::on_transact`] hooks,
//! emulating concurrent changes made before a transaction starts.
//!
//! [`Command`]: crate::Command
//! [`Query`]: crate::Query

use std::{
    collections::HashMap,
    fmt, mem,
    sync::{Arc, Mutex, MutexGuard},
};

use common::{
    operations::{By, Commit, Delete, Insert, Lock, Select, Transact, Update},
    DateRange,
};
use tracerr::Traced;

use crate::{
    domain::{
        booking, car, testimonial, user, Booking, Car, Testimonial, User,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`] shared between its clones.
#[derive(Clone, Debug, Default)]
pub(crate) struct Mock(Arc<Mutex<State>>);

/// Stored entities of a [`Mock`].
#[derive(Debug, Default)]
pub(crate) struct State {
    /// Stored [`User`]s.
    pub(crate) users: HashMap<user::Id, User>,

    /// Stored [`Car`]s.
    pub(crate) cars: HashMap<car::Id, Car>,

    /// Stored [`Booking`]s.
    pub(crate) bookings: HashMap<booking::Id, Booking>,

    /// Stored [`Testimonial`]s.
    pub(crate) testimonials: HashMap<testimonial::Id, Testimonial>,

    /// [`Hook`]s run once on the next [`Transact`].
    pub(crate) on_transact: Vec<Hook>,

    /// Name of the exclusion constraint the next [`Booking`] insertion
    /// violates.
    pub(crate) violated_exclusion: Option<&'static str>,
}

/// Change of a [`State`] made by a [`Mock`] on some operation.
pub(crate) struct Hook(Box<dyn FnOnce(&mut State) + Send>);

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook")
    }
}

impl Mock {
    /// Locks the [`State`] of this [`Mock`].
    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    /// Makes the next [`Transact`] apply the provided change to the
    /// [`State`] first.
    pub(crate) fn on_transact(
        &self,
        change: impl FnOnce(&mut State) + Send + 'static,
    ) {
        self.state().on_transact.push(Hook(Box::new(change)));
    }
}

/// Shortcut for a [`Result`] of a [`Mock`] operation.
type Result<T> = std::result::Result<T, Traced<database::Error>>;

impl Database<Transact> for Mock {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok> {
        let mut state = self.state();
        for Hook(change) in mem::take(&mut state.on_transact) {
            change(&mut state);
        }
        drop(state);
        Ok(self.clone())
    }
}

impl Database<Commit> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<W> Database<Lock<By<W, user::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Lock<By<W, user::Id>>) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<W> Database<Lock<By<W, car::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Lock<By<W, car::Id>>) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<W> Database<Lock<By<W, booking::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Lock<By<W, booking::Id>>) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<W> Database<Lock<By<W, testimonial::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<W, testimonial::Id>>,
    ) -> Result<Self::Ok> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Mock {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok> {
        Ok(self.state().users.get(&by.into_inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Mock {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok> {
        let email = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

impl Database<Insert<User>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, Insert(user): Insert<User>) -> Result<Self::Ok> {
        drop(self.state().users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Update<User>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, Update(user): Update<User>) -> Result<Self::Ok> {
        drop(self.state().users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Delete<By<User, user::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok> {
        drop(self.state().users.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Select<By<Option<Car>, car::Id>>> for Mock {
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, car::Id>>,
    ) -> Result<Self::Ok> {
        Ok(self.state().cars.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Car>, read::car::list::Filter>>> for Mock {
    type Ok = Vec<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Car>, read::car::list::Filter>>,
    ) -> Result<Self::Ok> {
        let filter = by.into_inner();
        let mut cars = self
            .state()
            .cars
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect::<Vec<_>>();
        cars.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cars)
    }
}

impl Database<Insert<Car>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, Insert(car): Insert<Car>) -> Result<Self::Ok> {
        drop(self.state().cars.insert(car.id, car));
        Ok(())
    }
}

impl Database<Update<Car>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, Update(car): Update<Car>) -> Result<Self::Ok> {
        drop(self.state().cars.insert(car.id, car));
        Ok(())
    }
}

impl Database<Delete<By<Vec<Car>, user::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Car>, user::Id>>,
    ) -> Result<Self::Ok> {
        let owner_id = by.into_inner();
        self.state().cars.retain(|_, c| !c.is_owned_by(owner_id));
        Ok(())
    }
}

impl Database<Select<By<Option<Booking>, booking::Id>>> for Mock {
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok> {
        Ok(self.state().bookings.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<read::car::IsAvailable, (car::Id, DateRange)>>>
    for Mock
{
    type Ok = read::car::IsAvailable;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::car::IsAvailable, (car::Id, DateRange)>>,
    ) -> Result<Self::Ok> {
        let (car_id, period) = by.into_inner();
        let is_occupied = self
            .state()
            .bookings
            .values()
            .any(|b| b.car_id == car_id && b.occupies(&period));
        Ok(read::car::IsAvailable(!is_occupied))
    }
}

impl Database<Select<By<Vec<Booking>, read::booking::Party>>> for Mock {
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::Party>>,
    ) -> Result<Self::Ok> {
        let party = by.into_inner();
        let mut bookings = self
            .state()
            .bookings
            .values()
            .filter(|b| party.takes_part_in(b))
            .cloned()
            .collect::<Vec<_>>();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }
}

impl Database<Select<By<read::booking::ActiveCount, read::booking::Party>>>
    for Mock
{
    type Ok = read::booking::ActiveCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::ActiveCount, read::booking::Party>,
        >,
    ) -> Result<Self::Ok> {
        let party = by.into_inner();
        let count = self
            .state()
            .bookings
            .values()
            .filter(|b| party.takes_part_in(b) && b.status.is_active())
            .count();
        Ok(i64::try_from(count).unwrap().into())
    }
}

impl Database<Insert<Booking>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok> {
        let mut state = self.state();
        if let Some(constraint) = state.violated_exclusion.take() {
            return Err(tracerr::new!(
                database::Error::MockExclusionViolation(constraint)
            ));
        }
        drop(state.bookings.insert(booking.id, booking));
        Ok(())
    }
}

impl Database<Update<Booking>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok> {
        drop(self.state().bookings.insert(booking.id, booking));
        Ok(())
    }
}

impl Database<Delete<By<Booking, booking::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok> {
        drop(self.state().bookings.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Delete<By<Vec<Booking>, read::booking::Party>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Booking>, read::booking::Party>>,
    ) -> Result<Self::Ok> {
        let party = by.into_inner();
        self.state().bookings.retain(|_, b| !party.takes_part_in(b));
        Ok(())
    }
}

impl Database<Select<By<Option<Testimonial>, testimonial::Id>>> for Mock {
    type Ok = Option<Testimonial>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Testimonial>, testimonial::Id>>,
    ) -> Result<Self::Ok> {
        Ok(self.state().testimonials.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Testimonial>, read::testimonial::Newest>>>
    for Mock
{
    type Ok = Vec<Testimonial>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Testimonial>, read::testimonial::Newest>>,
    ) -> Result<Self::Ok> {
        let mut testimonials =
            self.state().testimonials.values().cloned().collect();
        by.into_inner().apply(&mut testimonials);
        Ok(testimonials)
    }
}

impl Database<Insert<Testimonial>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(testimonial): Insert<Testimonial>,
    ) -> Result<Self::Ok> {
        drop(self.state().testimonials.insert(testimonial.id, testimonial));
        Ok(())
    }
}

impl Database<Update<Testimonial>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(testimonial): Update<Testimonial>,
    ) -> Result<Self::Ok> {
        drop(self.state().testimonials.insert(testimonial.id, testimonial));
        Ok(())
    }
}

impl Database<Delete<By<Testimonial, testimonial::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Testimonial, testimonial::Id>>,
    ) -> Result<Self::Ok> {
        drop(self.state().testimonials.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Delete<By<Vec<Testimonial>, user::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Testimonial>, user::Id>>,
    ) -> Result<Self::Ok> {
        let author_id = by.into_inner();
        self.state()
            .testimonials
            .retain(|_, t| !t.is_written_by(author_id));
        Ok(())
    }
}

/// Fixtures seeding a [`Mock`] for tests.
pub(crate) mod fixture {
    use std::time::Duration;

    use common::{money::Currency, Date, DateRange, DateTime, Money};

    use crate::{
        domain::{
            booking, car, testimonial, user, Booking, Car, Testimonial, User,
        },
        Config, Service,
    };

    use super::Mock;

    /// Creates a new [`Service`] backed by an empty [`Mock`].
    pub(crate) fn service() -> Service<Mock> {
        let secret = b"test-secret";
        Service::new(
            Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    secret,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    secret,
                ),
                session_ttl: Duration::from_secs(60 * 60),
            },
            Mock::default(),
        )
    }

    /// Stores a new [`User`] with the provided [`user::Role`] and
    /// [`user::Phone`].
    pub(crate) fn user(
        db: &Mock,
        name: &str,
        role: user::Role,
        phone: Option<&str>,
    ) -> User {
        // SAFETY: Never verified by the tests using it.
        #[expect(unsafe_code, reason = "bcrypt is slow")]
        let password_hash =
            unsafe { user::PasswordHash::new_unchecked("not-a-real-hash") };
        let user = User {
            id: user::Id::new(),
            name: user::Name::new(name).unwrap(),
            email: user::Email::new(format!("{name}@mail.ph")).unwrap(),
            password_hash,
            phone: phone.map(|p| user::Phone::new(p).unwrap()),
            role,
            created_at: DateTime::now().coerce(),
        };
        drop(db.state().users.insert(user.id, user.clone()));
        user
    }

    /// Stores a new available [`Car`] owned by the provided [`User`] and
    /// priced in pesos.
    pub(crate) fn car(db: &Mock, owner: &User, price_per_day: i64) -> Car {
        let car = Car {
            id: car::Id::new(),
            owner_id: Some(owner.id),
            brand: car::Brand::new("Toyota").unwrap(),
            model: car::Model::new("Vios").unwrap(),
            year: 2022,
            category: car::Category::Sedan,
            seating_capacity: 5,
            transmission: car::Transmission::Automatic,
            fuel_type: car::FuelType::Gas,
            price_per_day: Money::new(price_per_day, Currency::Php),
            location: car::Location::new("Cebu City").unwrap(),
            description: car::Description::default(),
            is_available: true,
            created_at: DateTime::now().coerce(),
        };
        drop(db.state().cars.insert(car.id, car.clone()));
        car
    }

    /// Builds a new [`Booking`] of the provided [`Car`] by the `renter`,
    /// without storing it.
    pub(crate) fn booking(
        car: &Car,
        renter: &User,
        period: DateRange,
        status: booking::Status,
    ) -> Booking {
        Booking {
            id: booking::Id::new(),
            car_id: car.id,
            user_id: renter.id,
            owner_id: car.owner_id.unwrap(),
            period,
            status,
            price: Booking::price_for(car.price_per_day, &period).unwrap(),
            payment_method: booking::PaymentMethod::Cash,
            customer_contact: booking::Contact::not_provided(),
            owner_contact: booking::Contact::not_provided(),
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        }
    }

    /// Stores a new five-star [`Testimonial`] written by the [`User`] with
    /// the provided ID.
    pub(crate) fn testimonial(db: &Mock, author_id: user::Id) -> Testimonial {
        let testimonial = Testimonial {
            id: testimonial::Id::new(),
            author_id,
            name: testimonial::Name::new("Maria").unwrap(),
            rating: testimonial::Rating::MAX,
            text: testimonial::Text::new("Clean car, easy pickup").unwrap(),
            reported_by: vec![],
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        };
        drop(
            db.state()
                .testimonials
                .insert(testimonial.id, testimonial.clone()),
        );
        testimonial
    }

    /// Returns the [`Date`] shifted from today by the provided `days`.
    pub(crate) fn day(days: i64) -> Date {
        Date::today().checked_add_days(days).unwrap()
    }

    /// Returns the [`DateRange`] between the provided days from today.
    pub(crate) fn days(start: i64, end: i64) -> DateRange {
        DateRange::new(day(start), day(end)).unwrap()
    }
}
