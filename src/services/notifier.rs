use async_trait::async_trait;
use log::info;

/// Canal de sortie des liens à usage unique (email en production).
/// Le gabarit des emails n'est pas du ressort du backend.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification(&self, email: &str, link: &str);

    async fn send_password_reset(&self, email: &str, link: &str);
}

/// Implémentation par défaut: le lien part dans les logs
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification(&self, email: &str, _link: &str) {
        info!("Verification link issued for {}", email);
    }

    async fn send_password_reset(&self, email: &str, _link: &str) {
        info!("Password reset link issued for {}", email);
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Garde les liens envoyés pour que les tests puissent les suivre
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        /// Dernier token envoyé à cette adresse (dernier segment du lien)
        pub fn last_token_for(&self, email: &str) -> Option<String> {
            let sent = self.sent.lock().unwrap();
            sent.iter()
                .rev()
                .find(|(to, _)| to == email)
                .and_then(|(_, link)| link.rsplit('/').next().map(str::to_string))
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_verification(&self, email: &str, link: &str) {
            self.sent.lock().unwrap().push((email.to_string(), link.to_string()));
        }

        async fn send_password_reset(&self, email: &str, link: &str) {
            self.sent.lock().unwrap().push((email.to_string(), link.to_string()));
        }
    }
}
