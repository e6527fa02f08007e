use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

use learnsmart_config::EmailConfig;
use learnsmart_core::AppError;

/// Sends account emails over SMTP. With `SMTP_ENABLED=false` messages are
/// only logged.
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn reset_link(&self, reset_token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.config.frontend_url.trim_end_matches('/'),
            reset_token
        )
    }

    #[instrument(skip(self, reset_token))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        reset_token: &str,
    ) -> Result<(), AppError> {
        let reset_link = self.reset_link(reset_token);
        let expiry = self.expiry_text();

        let html_body = password_reset_template(to_name, &reset_link, &expiry);
        let text_body = format!(
            "Hi {},\n\n\
             You requested to reset your LearnSmart password.\n\n\
             Open the link below to choose a new password:\n\
             {}\n\n\
             This link will expire in {}.\n\n\
             If you didn't request this, please ignore this email.\n\n\
             The LearnSmart Team",
            to_name, reset_link, expiry
        );

        self.send_email(to_email, "Reset your LearnSmart password", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self))]
    pub async fn send_password_reset_confirmation(
        &self,
        to_email: &str,
        to_name: &str,
    ) -> Result<(), AppError> {
        let html_body = password_reset_confirmation_template(to_name);
        let text_body = format!(
            "Hi {},\n\n\
             Your LearnSmart password has been changed.\n\n\
             If you didn't make this change, please contact support immediately.\n\n\
             The LearnSmart Team",
            to_name
        );

        self.send_email(to_email, "Your password was changed", &text_body, &html_body)
            .await
    }

    fn expiry_text(&self) -> String {
        match self.config.reset_token_ttl_minutes {
            60 => "1 hour".to_string(),
            m if m % 60 == 0 => format!("{} hours", m / 60),
            m => format!("{} minutes", m),
        }
    }

    #[instrument(skip(self, html_body, text_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(to = %to_email, subject = %subject, body = %text_body, "SMTP disabled, email not sent");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal_error(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, accent: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: {accent}; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">LearnSmart</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px; color: #444444; font-size: 16px; line-height: 1.5;">
                            <h2 style="margin: 0 0 20px 0; color: #222222; font-size: 22px;">{title}</h2>
                            {content}
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from LearnSmart. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#
    )
}

fn password_reset_template(name: &str, reset_link: &str, expiry: &str) -> String {
    let name = escape_html(name);
    let link = escape_html(reset_link);
    let content = format!(
        r#"<p>Hi <strong>{name}</strong>,</p>
                            <p>We received a request to reset your password. Use the button below to choose a new one:</p>
                            <p style="text-align: center; margin: 30px 0;">
                                <a href="{link}" style="display: inline-block; padding: 14px 40px; background-color: #2563EB; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">Reset Password</a>
                            </p>
                            <p style="font-size: 14px;">Or paste this link into your browser:</p>
                            <p style="font-size: 14px; color: #2563EB; word-break: break-all;">{link}</p>
                            <p style="font-size: 14px;"><strong>This link will expire in {expiry}.</strong></p>
                            <p style="font-size: 14px;">If you didn't request a password reset, you can ignore this email.</p>"#
    );
    layout("Password Reset Request", "#2563EB", &content)
}

fn password_reset_confirmation_template(name: &str) -> String {
    let name = escape_html(name);
    let content = format!(
        r#"<p>Hi <strong>{name}</strong>,</p>
                            <p>Your password has been changed. You can now sign in with your new password.</p>
                            <div style="background-color: #FEF3C7; border-left: 4px solid #F59E0B; padding: 15px; margin: 20px 0; font-size: 14px; color: #92400E;">
                                <strong>Security Notice:</strong> If you didn't make this change, please contact support immediately.
                            </div>"#
    );
    layout("Password Changed", "#10B981", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@learnsmart.app".to_string(),
            from_name: "LearnSmart".to_string(),
            frontend_url: "http://localhost:3001/".to_string(),
            reset_token_ttl_minutes: 60,
        }
    }

    #[test]
    fn test_reset_link() {
        let service = EmailService::new(config());
        assert_eq!(
            service.reset_link("abc123"),
            "http://localhost:3001/reset-password?token=abc123"
        );
    }

    #[test]
    fn test_expiry_text() {
        assert_eq!(EmailService::new(config()).expiry_text(), "1 hour");
        let service = EmailService::new(EmailConfig {
            reset_token_ttl_minutes: 30,
            ..config()
        });
        assert_eq!(service.expiry_text(), "30 minutes");
    }

    #[test]
    fn test_templates_escape_names() {
        let html = password_reset_template("<b>Eve</b>", "http://x/reset?token=t", "1 hour");
        assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(!html.contains("<b>Eve</b>"));
        assert!(html.contains("http://x/reset?token=t"));

        let html = password_reset_confirmation_template("O'Neil");
        assert!(html.contains("O&#39;Neil"));
    }

    #[tokio::test]
    async fn test_disabled_smtp_is_noop() {
        let service = EmailService::new(config());
        assert!(
            service
                .send_password_reset_email("user@example.com", "User", "token")
                .await
                .is_ok()
        );
    }
}
