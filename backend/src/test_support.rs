//! Shared builders and doubles for unit tests inside the crate.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    DisplayName, Email, NewTravelRequest, PasswordDigest, TravelRequest, TravelRequestId, User,
    UserDraft, UserId, UserRole,
};

/// Instant every fixture is anchored to.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock that reports a settable instant.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        *self.0.lock().expect("clock mutex") += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

/// Active user with a unique email derived from `name`.
pub fn user_named(name: &str, role: UserRole) -> User {
    let slug = name.to_lowercase().replace(' ', ".");
    User::new(UserDraft {
        id: UserId::random(),
        name: DisplayName::new(name).expect("fixture name"),
        email: Email::new(format!("{slug}@example.com")).expect("fixture email"),
        password: PasswordDigest::new("hashed:secret"),
        role,
        created_at: fixture_now() - Duration::days(30),
    })
}

/// `Solicited` request to Paris departing 30 days after [`fixture_now`].
pub fn paris_request(owner: User) -> TravelRequest {
    let now = fixture_now();
    TravelRequest::create(
        TravelRequestId::random(),
        owner,
        NewTravelRequest {
            traveler_name: "Ada Lovelace".to_owned(),
            destination: "Paris".to_owned(),
            departure: now + Duration::days(30),
            return_date: Some(now + Duration::days(37)),
        },
        now,
    )
    .expect("fixture request is valid")
}
