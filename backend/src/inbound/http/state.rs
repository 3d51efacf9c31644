//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on driving ports, so
//! they can be exercised with mocks or in-memory stores.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, TravelRequestCommand, TravelRequestQuery, UserRegistration,
};

/// Parameter object bundling the driving ports.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn UserRegistration>,
    pub travel: Arc<dyn TravelRequestCommand>,
    pub travel_query: Arc<dyn TravelRequestQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn UserRegistration>,
    pub travel: Arc<dyn TravelRequestCommand>,
    pub travel_query: Arc<dyn TravelRequestQuery>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            registration,
            travel,
            travel_query,
        } = ports;
        Self {
            login,
            registration,
            travel,
            travel_query,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
