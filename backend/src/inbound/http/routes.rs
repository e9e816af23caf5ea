//! Route table for the `/api/v1` scope.
//!
//! Extractor failures (malformed JSON, query strings or path segments) are
//! mapped onto the domain error so every rejection shares one body shape.

use actix_web::{HttpRequest, error::JsonPayloadError, error::PathError, error::QueryPayloadError, web};

use crate::domain::Error;

use super::{applications, auth, conversations, jobs, notifications, reviews, users};

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}")).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}")).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid path: {err}")).into()
}

/// Register every API handler.
///
/// Literal segments such as `/jobs/my` are registered before their
/// parameterised siblings so they are never captured as identifiers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(auth::send_otp)
        .service(auth::verify_otp)
        .service(auth::register)
        .service(auth::login)
        .service(auth::refresh)
        .service(jobs::my_jobs)
        .service(jobs::create_job)
        .service(jobs::search_jobs)
        .service(jobs::get_job)
        .service(jobs::start_job)
        .service(jobs::complete_job)
        .service(jobs::confirm_job)
        .service(jobs::cancel_job)
        .service(applications::apply)
        .service(applications::job_applications)
        .service(applications::my_applications)
        .service(applications::accept)
        .service(applications::decline)
        .service(reviews::create_review)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::list_addresses)
        .service(users::add_address)
        .service(users::public_profile)
        .service(reviews::user_reviews)
        .service(conversations::list_conversations)
        .service(conversations::list_messages)
        .service(conversations::send_message)
        .service(conversations::mark_read)
        .service(notifications::unread_count)
        .service(notifications::list_notifications)
        .service(notifications::mark_read)
        .service(notifications::mark_all_read);
}
