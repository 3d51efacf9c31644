//! Builders wiring repositories and adapters into the HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use backend::domain::ports::{TravelRequestRepository, UserRepository};
use backend::domain::{AuthService, TravelRequestService};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::memory::{InMemoryTravelRequestRepository, InMemoryUserRepository};
use backend::outbound::notification::TracingStatusChangeNotifier;
use backend::outbound::persistence::{DieselTravelRequestRepository, DieselUserRepository};
use backend::outbound::security::{Argon2PasswordHasher, JwtCredentialIssuer};

use super::ServerConfig;

/// Assemble the account and travel services over the given stores.
fn http_state_for<U, T>(users: Arc<U>, travels: Arc<T>, jwt_secret: Option<&str>) -> HttpState
where
    U: UserRepository + 'static,
    T: TravelRequestRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let issuer = Arc::new(JwtCredentialIssuer::new(jwt_secret, Arc::clone(&clock)));
    let auth = Arc::new(AuthService::new(
        Arc::clone(&users),
        Arc::new(Argon2PasswordHasher),
        issuer,
        Arc::clone(&clock),
    ));
    let travel = Arc::new(TravelRequestService::new(
        travels,
        users,
        Arc::new(TracingStatusChangeNotifier),
        clock,
    ));

    HttpState::new(HttpStatePorts {
        login: auth.clone(),
        registration: auth,
        travel: travel.clone(),
        travel_query: travel,
    })
}

/// Build the shared HTTP state, using PostgreSQL when a pool is configured.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let jwt_secret = config.jwt_secret.as_deref();
    let state = match &config.db_pool {
        Some(pool) => http_state_for(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselTravelRequestRepository::new(pool.clone())),
            jwt_secret,
        ),
        None => {
            warn!("no database configured; users and travel requests live in memory");
            let users = Arc::new(InMemoryUserRepository::new());
            let travels = Arc::new(InMemoryTravelRequestRepository::new(Arc::clone(&users)));
            http_state_for(users, travels, jwt_secret)
        }
    };
    web::Data::new(state)
}
