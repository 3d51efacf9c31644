//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    LoginService, MockLoginService, MockTravelRequestCommand, MockTravelRequestQuery,
    MockUserRegistration, TravelRequestCommand, TravelRequestQuery, UserRegistration,
};

use super::state::{HttpState, HttpStatePorts};

/// Ports for a handler test. Unset ports are mocks without expectations, so
/// any call to them fails the test.
pub struct TestPorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn UserRegistration>,
    pub travel: Arc<dyn TravelRequestCommand>,
    pub travel_query: Arc<dyn TravelRequestQuery>,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self {
            login: Arc::new(MockLoginService::new()),
            registration: Arc::new(MockUserRegistration::new()),
            travel: Arc::new(MockTravelRequestCommand::new()),
            travel_query: Arc::new(MockTravelRequestQuery::new()),
        }
    }
}

impl TestPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(self.into()))
    }
}

/// State whose only working port is `login`.
pub fn state_with_login(login: Arc<dyn LoginService>) -> HttpState {
    HttpState::new(HttpStatePorts {
        login,
        ..HttpStatePorts::from(TestPorts::default())
    })
}

impl From<TestPorts> for HttpStatePorts {
    fn from(ports: TestPorts) -> Self {
        Self {
            login: ports.login,
            registration: ports.registration,
            travel: ports.travel,
            travel_query: ports.travel_query,
        }
    }
}
