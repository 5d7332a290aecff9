use std::time::Duration;

/// Nombre de nouvelles tentatives après un échec réseau
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Code renvoyé par l'API quand la session est absente ou périmée
pub const SESSION_ERROR_CODE: &str = "UNAUTHENTICATED";

/// Catégorie d'un échec d'appel API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connexion, timeout, réponse 5xx : on peut réessayer
    Transport,
    /// 401 UNAUTHENTICATED : la session n'est plus valable, déconnexion locale
    Session,
    /// Erreur métier (4xx) : affichée telle quelle
    Domain,
}

impl FailureKind {
    /// Classe une réponse en échec à partir du statut et du code d'erreur
    /// de l'API. Un 401 INVALID_CREDENTIALS (mauvais mot de passe) reste une
    /// erreur métier et ne touche pas à la session en cours.
    pub fn from_response(status: u16, code: &str) -> Self {
        match status {
            401 if code == SESSION_ERROR_CODE => FailureKind::Session,
            500..=599 => FailureKind::Transport,
            _ => FailureKind::Domain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    ForceLogout,
    GiveUp,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// `attempt` = nombre d'échecs déjà subis pour cet appel (1 au premier)
    pub fn decide(&self, kind: FailureKind, attempt: u32) -> RetryDecision {
        match kind {
            FailureKind::Session => RetryDecision::ForceLogout,
            FailureKind::Domain => RetryDecision::GiveUp,
            FailureKind::Transport if attempt > self.max_retries => RetryDecision::GiveUp,
            FailureKind::Transport => RetryDecision::RetryAfter(self.delay_for(attempt)),
        }
    }

    /// Backoff exponentiel borné
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_retries_then_give_up() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(FailureKind::Transport, 1), RetryDecision::RetryAfter(Duration::from_millis(200)));
        assert_eq!(policy.decide(FailureKind::Transport, 2), RetryDecision::RetryAfter(Duration::from_millis(400)));
        assert_eq!(policy.decide(FailureKind::Transport, 3), RetryDecision::RetryAfter(Duration::from_millis(800)));
        assert_eq!(policy.decide(FailureKind::Transport, 4), RetryDecision::GiveUp);
    }

    #[test]
    fn test_session_and_domain_failures_not_retried() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(FailureKind::Session, 1), RetryDecision::ForceLogout);
        assert_eq!(policy.decide(FailureKind::Domain, 1), RetryDecision::GiveUp);
    }

    #[test]
    fn test_response_classification() {
        assert_eq!(FailureKind::from_response(401, "UNAUTHENTICATED"), FailureKind::Session);
        assert_eq!(FailureKind::from_response(403, "FORBIDDEN"), FailureKind::Domain);
        assert_eq!(FailureKind::from_response(503, "UNKNOWN"), FailureKind::Transport);
    }

    #[test]
    fn test_wrong_password_is_not_a_session_failure() {
        let kind = FailureKind::from_response(401, "INVALID_CREDENTIALS");
        assert_eq!(kind, FailureKind::Domain);
        assert_eq!(RetryPolicy::default().decide(kind, 1), RetryDecision::GiveUp);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy { max_retries: 10, ..RetryPolicy::default() };
        assert_eq!(policy.decide(FailureKind::Transport, 8), RetryDecision::RetryAfter(Duration::from_secs(2)));
    }
}
