//! HS256 JSON Web Token adapter for the token port.
//!
//! Access, refresh and phone-verification tokens each use their own secret
//! and audience, so a token minted for one purpose fails verification as
//! any other.

use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::{OtpPurpose, PhoneNumber, PhoneVerification, TokenPair, UserId};

const ACCESS_AUDIENCE: &str = "khedma:access";
const REFRESH_AUDIENCE: &str = "khedma:refresh";
const VERIFICATION_AUDIENCE: &str = "khedma:phone-verification";

/// Secrets and lifetimes for the three token kinds.
#[derive(Clone)]
pub struct JwtSettings {
    pub access_secret: Zeroizing<String>,
    pub refresh_secret: Zeroizing<String>,
    pub verification_secret: Zeroizing<String>,
    pub access_ttl: TimeDelta,
    pub refresh_ttl: TimeDelta,
    pub verification_ttl: TimeDelta,
}

impl JwtSettings {
    /// Settings with the default lifetimes: fifteen minutes for access
    /// tokens, seven days for refresh tokens and ten minutes for
    /// verification tokens.
    pub fn with_secrets(
        access_secret: Zeroizing<String>,
        refresh_secret: Zeroizing<String>,
        verification_secret: Zeroizing<String>,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            verification_secret,
            access_ttl: TimeDelta::minutes(15),
            refresh_ttl: TimeDelta::days(7),
            verification_ttl: TimeDelta::minutes(10),
        }
    }
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl SigningKey {
    fn new(secret: &str, audience: &'static str, ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "aud", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SubjectClaims {
    sub: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct VerificationClaims {
    sub: String,
    aud: String,
    iat: i64,
    exp: i64,
    purpose: String,
    verified: bool,
}

/// Token port implementation backed by `jsonwebtoken`.
pub struct JwtTokenIssuer {
    access: SigningKey,
    refresh: SigningKey,
    verification: SigningKey,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    /// Issuer signing with the configured secrets and lifetimes.
    pub fn new(settings: &JwtSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: SigningKey::new(&settings.access_secret, ACCESS_AUDIENCE, settings.access_ttl),
            refresh: SigningKey::new(
                &settings.refresh_secret,
                REFRESH_AUDIENCE,
                settings.refresh_ttl,
            ),
            verification: SigningKey::new(
                &settings.verification_secret,
                VERIFICATION_AUDIENCE,
                settings.verification_ttl,
            ),
            clock,
        }
    }

    fn window(&self, key: &SigningKey) -> (i64, i64) {
        let now = self.clock.utc();
        (now.timestamp(), (now + key.ttl).timestamp())
    }

    fn sign_subject(
        &self,
        key: &SigningKey,
        audience: &str,
        subject: &UserId,
    ) -> Result<String, TokenError> {
        let (iat, exp) = self.window(key);
        let claims = SubjectClaims {
            sub: subject.to_string(),
            aud: audience.to_owned(),
            iat,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify_subject(&self, key: &SigningKey, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<SubjectClaims>(token, &key.decoding, &key.validation)
            .map_err(map_decode_error)?;
        UserId::new(&data.claims.sub).map_err(|err| TokenError::invalid(err.to_string()))
    }
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenError::expired(),
        _ => TokenError::invalid(error.to_string()),
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_pair(&self, user: &UserId) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign_subject(&self.access, ACCESS_AUDIENCE, user)?,
            refresh_token: self.sign_subject(&self.refresh, REFRESH_AUDIENCE, user)?,
            expires_in: self.access.ttl.num_seconds(),
        })
    }

    fn verify_access(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_subject(&self.access, token)
    }

    fn verify_refresh(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_subject(&self.refresh, token)
    }

    fn issue_verification(&self, verification: &PhoneVerification) -> Result<String, TokenError> {
        let (iat, exp) = self.window(&self.verification);
        let claims = VerificationClaims {
            sub: verification.phone.as_str().to_owned(),
            aud: VERIFICATION_AUDIENCE.to_owned(),
            iat,
            exp,
            purpose: verification.purpose.as_str().to_owned(),
            verified: true,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.verification.encoding,
        )
        .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify_verification(&self, token: &str) -> Result<PhoneVerification, TokenError> {
        let data = decode::<VerificationClaims>(
            token,
            &self.verification.decoding,
            &self.verification.validation,
        )
        .map_err(map_decode_error)?;
        let claims = data.claims;
        if !claims.verified {
            return Err(TokenError::invalid("phone was not verified"));
        }
        let phone =
            PhoneNumber::new(claims.sub).map_err(|err| TokenError::invalid(err.to_string()))?;
        let purpose = claims
            .purpose
            .parse::<OtpPurpose>()
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(PhoneVerification { phone, purpose })
    }
}

#[cfg(test)]
mod tests {
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::fixtures::fixture_clock;

    fn secret(value: &str) -> Zeroizing<String> {
        Zeroizing::new(value.to_owned())
    }

    #[fixture]
    fn settings() -> JwtSettings {
        JwtSettings::with_secrets(
            secret("access-secret-for-tests"),
            secret("refresh-secret-for-tests"),
            secret("verification-secret-for-tests"),
        )
    }

    #[fixture]
    fn issuer(settings: JwtSettings) -> JwtTokenIssuer {
        JwtTokenIssuer::new(&settings, Arc::new(DefaultClock))
    }

    #[fixture]
    fn verification() -> PhoneVerification {
        PhoneVerification {
            phone: PhoneNumber::new("+212612345678").expect("valid phone"),
            purpose: OtpPurpose::Registration,
        }
    }

    #[rstest]
    fn access_and_refresh_tokens_round_trip(issuer: JwtTokenIssuer) {
        let user = UserId::random();
        let pair = issuer.issue_pair(&user).expect("pair");

        assert_eq!(pair.expires_in, 900);
        assert_eq!(issuer.verify_access(&pair.access_token).expect("access"), user);
        assert_eq!(
            issuer.verify_refresh(&pair.refresh_token).expect("refresh"),
            user
        );
    }

    #[rstest]
    fn refresh_token_is_not_an_access_token(issuer: JwtTokenIssuer) {
        let pair = issuer.issue_pair(&UserId::random()).expect("pair");

        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(TokenError::Invalid { .. })
        ));
        assert!(matches!(
            issuer.verify_refresh(&pair.access_token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    fn verification_token_round_trips(issuer: JwtTokenIssuer, verification: PhoneVerification) {
        let token = issuer.issue_verification(&verification).expect("token");

        assert_eq!(
            issuer.verify_verification(&token).expect("verified"),
            verification
        );
        assert!(issuer.verify_access(&token).is_err());
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_rejected(
        issuer: JwtTokenIssuer,
        mut settings: JwtSettings,
    ) {
        settings.access_secret = secret("a-different-access-secret");
        let other = JwtTokenIssuer::new(&settings, Arc::new(DefaultClock));
        let pair = other.issue_pair(&UserId::random()).expect("pair");

        assert!(matches!(
            issuer.verify_access(&pair.access_token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    fn expired_tokens_report_expiry(settings: JwtSettings, verification: PhoneVerification) {
        let stale = JwtTokenIssuer::new(&settings, fixture_clock());
        let token = stale.issue_verification(&verification).expect("token");

        let fresh = JwtTokenIssuer::new(&settings, Arc::new(DefaultClock));
        assert_eq!(
            fresh.verify_verification(&token),
            Err(TokenError::Expired)
        );
    }

    #[rstest]
    fn garbage_is_invalid(issuer: JwtTokenIssuer) {
        assert!(matches!(
            issuer.verify_access("not-a-token"),
            Err(TokenError::Invalid { .. })
        ));
    }
}
