//! Builders wiring repositories, credential adapters and domain services
//! into the shared HTTP and WebSocket state.

use std::sync::Arc;

use actix_web::web;

use khedma::domain::ports::{
    AddressRepository, ApplicationRepository, ConversationRepository, JobLifecycleRepository,
    JobRepository, NotificationRepository, Notifier, OtpRepository, ReviewRepository,
    UserRepository,
};
use khedma::domain::{
    ApplicationRepositories, ApplicationService, AuthAdapters, AuthService, JobService,
    MessagingService, NotificationService, ProfileService, ReviewService,
};
use khedma::inbound::http::state::HttpState;
use khedma::inbound::ws::hub::ConnectionHub;
use khedma::inbound::ws::state::WsState;
use khedma::outbound::credentials::{Argon2PasswordHasher, JwtTokenIssuer};
use khedma::outbound::memory::MemoryStore;
use khedma::outbound::persistence::{
    DbPool, DieselAddressRepository, DieselApplicationRepository, DieselConversationRepository,
    DieselJobLifecycleRepository, DieselJobRepository, DieselNotificationRepository,
    DieselOtpRepository, DieselReviewRepository, DieselUserRepository,
};

use super::ServerConfig;
use super::config::Storage;

/// One adapter per repository port.
struct Repositories<U, O, A, J, P, L, R, N, C> {
    users: Arc<U>,
    otps: Arc<O>,
    addresses: Arc<A>,
    jobs: Arc<J>,
    applications: Arc<P>,
    lifecycle: Arc<L>,
    reviews: Arc<R>,
    notifications: Arc<N>,
    conversations: Arc<C>,
}

type DieselRepositories = Repositories<
    DieselUserRepository,
    DieselOtpRepository,
    DieselAddressRepository,
    DieselJobRepository,
    DieselApplicationRepository,
    DieselJobLifecycleRepository,
    DieselReviewRepository,
    DieselNotificationRepository,
    DieselConversationRepository,
>;

type MemoryRepositories = Repositories<
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
>;

fn diesel_repositories(pool: &DbPool) -> DieselRepositories {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        otps: Arc::new(DieselOtpRepository::new(pool.clone())),
        addresses: Arc::new(DieselAddressRepository::new(pool.clone())),
        jobs: Arc::new(DieselJobRepository::new(pool.clone())),
        applications: Arc::new(DieselApplicationRepository::new(pool.clone())),
        lifecycle: Arc::new(DieselJobLifecycleRepository::new(pool.clone())),
        reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        conversations: Arc::new(DieselConversationRepository::new(pool.clone())),
    }
}

fn memory_repositories(store: &Arc<MemoryStore>) -> MemoryRepositories {
    Repositories {
        users: store.clone(),
        otps: store.clone(),
        addresses: store.clone(),
        jobs: store.clone(),
        applications: store.clone(),
        lifecycle: store.clone(),
        reviews: store.clone(),
        notifications: store.clone(),
        conversations: store.clone(),
    }
}

/// Adapter state registered on every worker's app.
#[derive(Clone)]
pub(super) struct AdapterStates {
    pub(super) http: web::Data<HttpState>,
    pub(super) ws: web::Data<WsState>,
}

/// Compose the domain services over `repos`.
///
/// The notification service is shared: it is the inbox port for handlers
/// and the notifier every other service writes through. The connection hub
/// is likewise shared between the messaging service and `/ws` sessions.
fn wire<U, O, A, J, P, L, R, N, C>(
    repos: Repositories<U, O, A, J, P, L, R, N, C>,
    config: &ServerConfig,
) -> AdapterStates
where
    U: UserRepository + 'static,
    O: OtpRepository + 'static,
    A: AddressRepository + 'static,
    J: JobRepository + 'static,
    P: ApplicationRepository + 'static,
    L: JobLifecycleRepository + 'static,
    R: ReviewRepository + 'static,
    N: NotificationRepository + 'static,
    C: ConversationRepository + 'static,
{
    let clock = config.clock.clone();
    let notifications = Arc::new(NotificationService::new(repos.notifications, clock.clone()));
    let notifier: Arc<dyn Notifier> = notifications.clone();

    let hub = Arc::new(ConnectionHub::new());

    let auth = Arc::new(AuthService::new(
        repos.users.clone(),
        repos.otps,
        AuthAdapters {
            tokens: Arc::new(JwtTokenIssuer::new(&config.jwt, clock.clone())),
            hasher: Arc::new(Argon2PasswordHasher::new()),
            sms: config.sms.clone(),
            codes: config.codes.clone(),
        },
        clock.clone(),
        config.otp_policy,
    ));
    let jobs = Arc::new(JobService::new(
        repos.jobs.clone(),
        repos.addresses.clone(),
        repos.users.clone(),
        notifier.clone(),
        clock.clone(),
    ));
    let applications = Arc::new(ApplicationService::new(
        ApplicationRepositories {
            applications: repos.applications,
            jobs: repos.jobs.clone(),
            lifecycle: repos.lifecycle,
            users: repos.users.clone(),
        },
        notifier.clone(),
        clock.clone(),
    ));
    let reviews = Arc::new(ReviewService::new(
        repos.reviews,
        repos.jobs,
        notifier.clone(),
        clock.clone(),
    ));
    let profile = Arc::new(ProfileService::new(
        repos.users,
        repos.addresses,
        clock.clone(),
    ));
    let messaging = Arc::new(MessagingService::new(
        repos.conversations,
        notifier,
        hub.clone(),
        clock,
    ));

    let ws = WsState::new(auth.clone(), messaging.clone(), hub);
    let http = HttpState {
        auth,
        jobs: jobs.clone(),
        jobs_query: jobs,
        applications: applications.clone(),
        applications_query: applications,
        reviews: reviews.clone(),
        reviews_query: reviews,
        profile: profile.clone(),
        profile_query: profile,
        messaging,
        notifications,
    };
    AdapterStates {
        http: web::Data::new(http),
        ws: web::Data::new(ws),
    }
}

/// Build the shared adapter state for the configured storage.
pub(super) fn build_states(config: &ServerConfig) -> AdapterStates {
    match &config.storage {
        Storage::Database(pool) => wire(diesel_repositories(pool), config),
        Storage::Memory(store) => wire(memory_repositories(store), config),
    }
}
