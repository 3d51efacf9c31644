//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every inbound HTTP path, the payload schemas, and the
//! bearer security scheme. Swagger UI serves it at `/docs` in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::travels_dto::{
    ChangeStatusBody, CreateTravelRequestBody, TravelRequestResponse, UpdateTravelRequestBody,
};
use crate::inbound::http::users::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

/// Name of the bearer security scheme in the document.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Adds the HS256 bearer scheme issued by `POST /api/v1/auth/login`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.bearer_format = Some("JWT".to_owned());
        scheme.description = Some("Token issued by POST /api/v1/auth/login.".to_owned());
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Travel request approval API",
        description = "Register, authenticate, and manage corporate travel requests through their approval workflow."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::travels::create_travel,
        crate::inbound::http::travels::list_travels,
        crate::inbound::http::travels::get_travel,
        crate::inbound::http::travels::update_travel,
        crate::inbound::http::travels::change_travel_status,
        crate::inbound::http::travels::list_all_travels,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UserResponse,
        CreateTravelRequestBody,
        UpdateTravelRequestBody,
        ChangeStatusBody,
        TravelRequestResponse,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "travels", description = "Travel request workflow"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
