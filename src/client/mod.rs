// ============================================================================
// CLIENT REST HEALTHSAFE
// ============================================================================
//
// Description:
//   Client HTTP (reqwest) de l'API /api, pour les outils et les tests
//   d'intégration. Il applique côté client:
//     - une session unique par processus (SessionCache)
//     - 3 nouvelles tentatives sur échec réseau, avec backoff
//     - une déconnexion locale forcée sur 401 UNAUTHENTICATED
//
// ============================================================================

pub mod retry;
pub mod session;

use log::warn;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::enums::Decision;
use retry::{FailureKind, RetryDecision, RetryPolicy};
use session::{CachedSession, SessionCache, SessionUser};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Serveur injoignable: {0}")]
    Connectivity(String),

    #[error("Session expirée")]
    SessionExpired,

    #[error("{message} ({code})")]
    Api { status: u16, code: String, message: String },

    #[error("Réponse illisible: {0}")]
    Decode(String),
}

impl ClientError {
    /// Code d'erreur de l'API, pour navigation::redirect_for_error_code
    pub fn code(&self) -> &str {
        match self {
            ClientError::Api { code, .. } => code,
            ClientError::SessionExpired => retry::SESSION_ERROR_CODE,
            ClientError::Connectivity(_) | ClientError::Decode(_) => "CONNECTIVITY",
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

#[derive(Deserialize)]
struct LoginBody {
    token: String,
    user: SessionUser,
}

pub struct HealthSafeClient {
    http: Client,
    base_url: String,
    session: &'static SessionCache,
    policy: RetryPolicy,
}

impl HealthSafeClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_policy(base_url, RetryPolicy::default())
    }

    pub fn with_policy(base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session: SessionCache::global(),
            policy,
        }
    }

    pub fn session(&self) -> &'static SessionCache {
        self.session
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let body: LoginBody = self
            .send(Method::POST, "/auth/login", Some(json!({ "email": email, "password": password })))
            .await?;

        self.session.store(CachedSession {
            token: body.token,
            user: body.user.clone(),
        });
        Ok(body.user)
    }

    /// Relit la session côté serveur ; un rôle différent du cache invalide
    /// la session locale
    pub async fn me(&self) -> Result<Value, ClientError> {
        let me: Value = self.send(Method::GET, "/auth/me", None).await?;

        let role = me.get("role").cloned().and_then(|role| serde_json::from_value(role).ok());
        if let Some(role) = role {
            if self.session.invalidate_if_role_changed(role) {
                return Err(ClientError::SessionExpired);
            }
        }
        Ok(me)
    }

    /// La session locale est effacée même si le serveur ne répond pas
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result: Result<Value, ClientError> = self.send(Method::POST, "/auth/logout", None).await;
        self.session.invalidate();
        result.map(|_| ())
    }

    pub async fn demander_acces(&self, code_patient: &str, motif: &str) -> Result<Value, ClientError> {
        self.send(
            Method::POST,
            "/acces/demander",
            Some(json!({ "codePatient": code_patient, "motif": motif })),
        )
        .await
    }

    pub async fn repondre_demande(&self, reference: &str, decision: Decision) -> Result<Value, ClientError> {
        self.send(
            Method::POST,
            &format!("/acces/{}/repondre", reference),
            Some(json!({ "decision": decision })),
        )
        .await
    }

    pub async fn liste_acces(&self) -> Result<Value, ClientError> {
        self.send(Method::GET, "/acces", None).await
    }

    pub async fn get_dossier(&self, numero: &str) -> Result<Value, ClientError> {
        self.send(Method::GET, &format!("/dossiers/{}", numero), None).await
    }

    /// Appel brut avec la politique de retry
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let url = format!("{}/api{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            let mut request = self.http.request(method.clone(), &url);
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let (kind, error) = match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if status < 400 {
                        return response
                            .json::<T>()
                            .await
                            .map_err(|e| ClientError::Decode(e.to_string()));
                    }
                    let error = Self::api_error(status, response).await;
                    (FailureKind::from_response(status, error.code()), error)
                }
                Err(e) => (FailureKind::Transport, ClientError::Connectivity(e.to_string())),
            };

            attempt += 1;
            match self.policy.decide(kind, attempt) {
                RetryDecision::RetryAfter(delay) => {
                    warn!("{} {} failed (attempt {}): {}, retrying", method, path, attempt, error);
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::ForceLogout => {
                    self.session.invalidate();
                    return Err(ClientError::SessionExpired);
                }
                RetryDecision::GiveUp => {
                    return Err(match error {
                        ClientError::Api { status, .. } if status >= 500 => {
                            ClientError::Connectivity(format!("status {}", status))
                        }
                        other => other,
                    });
                }
            }
        }
    }

    async fn api_error(status: u16, response: reqwest::Response) -> ClientError {
        match response.json::<ErrorBody>().await {
            Ok(body) => ClientError::Api {
                status,
                code: body.error,
                message: body.message,
            },
            Err(_) => ClientError::Api {
                status,
                code: "UNKNOWN".to_string(),
                message: format!("HTTP {}", status),
            },
        }
    }
}
