//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, AuthCommand, JobCommand, JobQuery, Messaging,
    NotificationInbox, ProfileCommand, ProfileQuery, ReviewCommand, ReviewQuery,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use khedma::inbound::http::state::HttpState;
///
/// fn app(state: HttpState) -> App<
///     impl actix_web::dev::ServiceFactory<
///         actix_web::dev::ServiceRequest,
///         Config = (),
///         Response = actix_web::dev::ServiceResponse,
///         Error = actix_web::Error,
///         InitError = (),
///     >,
/// > {
///     App::new()
///         .app_data(web::Data::new(state))
///         .configure(khedma::inbound::http::routes::configure)
/// }
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthCommand>,
    pub jobs: Arc<dyn JobCommand>,
    pub jobs_query: Arc<dyn JobQuery>,
    pub applications: Arc<dyn ApplicationCommand>,
    pub applications_query: Arc<dyn ApplicationQuery>,
    pub reviews: Arc<dyn ReviewCommand>,
    pub reviews_query: Arc<dyn ReviewQuery>,
    pub profile: Arc<dyn ProfileCommand>,
    pub profile_query: Arc<dyn ProfileQuery>,
    pub messaging: Arc<dyn Messaging>,
    pub notifications: Arc<dyn NotificationInbox>,
}
