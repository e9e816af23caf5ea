//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, token signing, hashing, SMS, code
//! generation) are implemented by outbound adapters. Driving ports are
//! implemented by the domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::{define_port_error, define_repository_error};

mod address_repository;
mod application_command;
mod application_query;
mod application_repository;
mod auth_command;
mod conversation_repository;
mod job_command;
mod job_lifecycle_repository;
mod job_query;
mod job_repository;
mod messaging;
mod notification_inbox;
mod notification_repository;
mod notifier;
mod otp_code_generator;
mod otp_repository;
mod password_hasher;
mod profile_command;
mod profile_query;
mod realtime_publisher;
mod review_command;
mod review_query;
mod review_repository;
mod sms_sender;
mod token_issuer;
mod user_repository;

#[cfg(test)]
pub use address_repository::MockAddressRepository;
pub use address_repository::{AddressPersistenceError, AddressRepository};
pub use application_command::ApplicationCommand;
#[cfg(test)]
pub use application_command::MockApplicationCommand;
pub use application_query::ApplicationQuery;
#[cfg(test)]
pub use application_query::MockApplicationQuery;
#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{ApplicationPersistenceError, ApplicationRepository};
#[cfg(test)]
pub use auth_command::MockAuthCommand;
pub use auth_command::{AuthCommand, SendOtpRequest, VerifyOtpRequest};
#[cfg(test)]
pub use conversation_repository::MockConversationRepository;
pub use conversation_repository::{ConversationPersistenceError, ConversationRepository};
pub use job_command::JobCommand;
#[cfg(test)]
pub use job_command::MockJobCommand;
#[cfg(test)]
pub use job_lifecycle_repository::MockJobLifecycleRepository;
pub use job_lifecycle_repository::{JobLifecyclePersistenceError, JobLifecycleRepository};
pub use job_query::JobQuery;
#[cfg(test)]
pub use job_query::MockJobQuery;
#[cfg(test)]
pub use job_repository::MockJobRepository;
pub use job_repository::{JobPersistenceError, JobRepository};
pub use messaging::Messaging;
#[cfg(test)]
pub use messaging::MockMessaging;
#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::NotificationInbox;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationPersistenceError, NotificationRepository};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{NoOpNotifier, Notifier};
#[cfg(test)]
pub use otp_code_generator::MockOtpCodeGenerator;
pub use otp_code_generator::{FixedOtpCodeGenerator, OtpCodeGenerator};
#[cfg(test)]
pub use otp_repository::MockOtpRepository;
pub use otp_repository::{OtpPersistenceError, OtpRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::ProfileCommand;
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use realtime_publisher::MockRealtimePublisher;
pub use realtime_publisher::{NoOpRealtimePublisher, RealtimePublisher};
#[cfg(test)]
pub use review_command::MockReviewCommand;
pub use review_command::ReviewCommand;
#[cfg(test)]
pub use review_query::MockReviewQuery;
pub use review_query::ReviewQuery;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewPersistenceError, ReviewRepository};
#[cfg(test)]
pub use sms_sender::MockSmsSender;
pub use sms_sender::{SmsError, SmsSender};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
