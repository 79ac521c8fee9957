use std::sync::Arc;

use kinboard_application::EmailService;
use kinboard_core::AppError;
use kinboard_infrastructure::{ConsoleEmailService, SmtpEmailConfig, SmtpEmailService};
use tracing::info;

use crate::api_config::EmailProviderConfig;

pub fn build_email_service(
    config: &EmailProviderConfig,
) -> Result<Arc<dyn EmailService>, AppError> {
    match config {
        EmailProviderConfig::Console => {
            info!("email provider: console");
            Ok(Arc::new(ConsoleEmailService::new()))
        }
        EmailProviderConfig::Smtp(smtp) => {
            info!(host = %smtp.host, port = smtp.port, tls = ?smtp.tls, "email provider: smtp");
            Ok(Arc::new(SmtpEmailService::new(SmtpEmailConfig {
                host: smtp.host.clone(),
                port: smtp.port,
                username: smtp.username.clone(),
                password: smtp.password.clone(),
                from_address: smtp.from_address.clone(),
                tls: smtp.tls,
            })?))
        }
    }
}
