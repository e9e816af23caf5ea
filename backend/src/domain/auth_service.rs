//! OTP issuance, registration and token domain service.
//!
//! This service implements the [`AuthCommand`] driving port:
//! - codes are generated, stored, then delivered best-effort by SMS;
//! - verification consumes a code with a conditional update so concurrent
//!   correct guesses cannot both succeed;
//! - registration requires a phone-verification token issued by a prior
//!   successful verification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};

use super::service_errors::{map_hash_error, map_otp_error, map_token_error, map_user_error};
use crate::domain::ports::{
    AuthCommand, OtpCodeGenerator, OtpRepository, PasswordHasher, SendOtpRequest, SmsSender,
    TokenIssuer, UserRepository, VerifyOtpRequest,
};
use crate::domain::{
    AuthSession, Error, HelperProfile, LoginCredentials, NewUser, OtpCode, OtpDispatch,
    OtpPolicy, OtpPurpose, OtpVerified, PhoneNumber, PhoneVerification, RegistrationDraft,
    TokenPair, User, UserId, UserRole, UserStatus,
};

const OTP_EXPIRED_OR_INVALID: &str = "OTP expired or invalid";
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Credential adapters used by [`AuthService`].
#[derive(Clone)]
pub struct AuthAdapters {
    pub tokens: Arc<dyn TokenIssuer>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub sms: Arc<dyn SmsSender>,
    pub codes: Arc<dyn OtpCodeGenerator>,
}

/// Authentication service implementing [`AuthCommand`].
#[derive(Clone)]
pub struct AuthService<U, O> {
    users: Arc<U>,
    otps: Arc<O>,
    adapters: AuthAdapters,
    clock: Arc<dyn Clock>,
    policy: OtpPolicy,
}

impl<U, O> AuthService<U, O> {
    /// Create a new service with the given repositories and adapters.
    pub fn new(
        users: Arc<U>,
        otps: Arc<O>,
        adapters: AuthAdapters,
        clock: Arc<dyn Clock>,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            users,
            otps,
            adapters,
            clock,
            policy,
        }
    }
}

impl<U, O> AuthService<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    async fn phone_registered(&self, phone: &PhoneNumber) -> Result<bool, Error> {
        Ok(self
            .users
            .find_by_phone(phone)
            .await
            .map_err(map_user_error)?
            .is_some())
    }

    fn issue_pair(&self, user: &UserId) -> Result<TokenPair, Error> {
        self.adapters
            .tokens
            .issue_pair(user)
            .map_err(|err| map_token_error(err, "token issuance failed"))
    }

    fn new_user(draft: &RegistrationDraft, role: UserRole, now: DateTime<Utc>) -> User {
        User {
            id: UserId::random(),
            phone: draft.phone.clone(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            role,
            status: UserStatus::Active,
            city: draft.city.clone(),
            avatar_url: None,
            phone_verified: true,
            last_login_at: None,
            created_at: now,
        }
    }
}

#[async_trait]
impl<U, O> AuthCommand for AuthService<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    async fn send_otp(&self, request: SendOtpRequest) -> Result<OtpDispatch, Error> {
        let SendOtpRequest { phone, purpose } = request;
        if purpose == OtpPurpose::Registration && self.phone_registered(&phone).await? {
            return Err(Error::conflict("phone number already registered"));
        }

        let now = self.clock.utc();
        let otp = OtpCode::issue(
            phone.clone(),
            purpose,
            self.adapters.codes.generate(),
            now,
            self.policy,
        );
        self.otps.insert(&otp).await.map_err(map_otp_error)?;

        if let Err(error) = self.adapters.sms.send_code(&phone, &otp.code).await {
            warn!(
                phone = %phone.fingerprint(),
                %purpose,
                error = %error,
                "failed to deliver one-time code"
            );
        }
        info!(phone = %phone.fingerprint(), %purpose, "issued one-time code");

        Ok(OtpDispatch {
            message: "OTP sent".to_owned(),
            expires_in: self.policy.ttl.num_seconds(),
        })
    }

    async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<OtpVerified, Error> {
        let now = self.clock.utc();
        let Some(otp) = self
            .otps
            .find_active(&request.phone, request.purpose, now)
            .await
            .map_err(map_otp_error)?
        else {
            return Err(Error::invalid_request(OTP_EXPIRED_OR_INVALID));
        };

        if otp.attempts_exhausted() {
            return Err(Error::invalid_request("maximum attempts exceeded"));
        }

        if !otp.code.matches(&request.code) {
            self.otps
                .increment_attempts(otp.id)
                .await
                .map_err(map_otp_error)?;
            info!(
                phone = %request.phone.fingerprint(),
                attempts = otp.attempts + 1,
                "one-time code mismatch"
            );
            return Err(Error::invalid_request("incorrect code"));
        }

        if !self
            .otps
            .mark_used(otp.id, now)
            .await
            .map_err(map_otp_error)?
        {
            return Err(Error::invalid_request(OTP_EXPIRED_OR_INVALID));
        }

        let verification_token = self
            .adapters
            .tokens
            .issue_verification(&PhoneVerification {
                phone: request.phone,
                purpose: request.purpose,
            })
            .map_err(|err| map_token_error(err, "token issuance failed"))?;

        Ok(OtpVerified {
            verified: true,
            verification_token,
        })
    }

    async fn register(&self, draft: RegistrationDraft) -> Result<AuthSession, Error> {
        let verification = self
            .adapters
            .tokens
            .verify_verification(&draft.verification_token)
            .map_err(|err| map_token_error(err, "invalid verification token"))?;
        if verification.purpose != OtpPurpose::Registration || verification.phone != draft.phone {
            return Err(Error::unauthorized(
                "verification token does not match this phone number",
            ));
        }
        let role = draft
            .role
            .self_assignable()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        if self.phone_registered(&draft.phone).await? {
            return Err(Error::conflict("phone number already registered"));
        }

        let password_hash = self
            .adapters
            .hasher
            .hash(&draft.password)
            .map_err(map_hash_error)?;
        let user = Self::new_user(&draft, role, self.clock.utc());
        let helper_profile = (role == UserRole::Helper).then(|| HelperProfile::empty(user.id));

        self.users
            .insert(
                &NewUser {
                    user: user.clone(),
                    password_hash,
                },
                helper_profile,
            )
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, %role, "registered user");

        let tokens = self.issue_pair(&user.id)?;
        Ok(AuthSession { user, tokens })
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let Some(stored) = self
            .users
            .find_by_phone(&credentials.phone)
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .adapters
            .hasher
            .verify(&credentials.password, &stored.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let mut user = stored.user;
        if !user.is_active() {
            return Err(Error::forbidden("account is not active"));
        }

        let now = self.clock.utc();
        self.users
            .record_login(&user.id, now)
            .await
            .map_err(map_user_error)?;
        user.last_login_at = Some(now);

        let tokens = self.issue_pair(&user.id)?;
        Ok(AuthSession { user, tokens })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error> {
        let user_id = self
            .adapters
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|err| map_token_error(err, "invalid refresh token"))?;
        let account = self
            .users
            .find_account(&user_id)
            .await
            .map_err(map_user_error)?;
        match account {
            Some(account) if account.user.is_active() => self.issue_pair(&user_id),
            _ => Err(Error::unauthorized("invalid refresh token")),
        }
    }

    async fn authenticate(&self, access_token: &str) -> Result<UserId, Error> {
        self.adapters
            .tokens
            .verify_access(access_token)
            .map_err(|err| map_token_error(err, "invalid or expired token"))
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
