use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;
use serde_json::json;
use tera::{Context, Tera};
use tracing::{error, info, warn};

use crate::domain::models::rsvp::Rsvp;
use crate::domain::ports::{EmailService, OutgoingEmail};
use crate::domain::services::deadline::with_deadline;
use crate::error::AppError;

pub const GUEST_HTML: &str = "guest_confirmation.html";
pub const GUEST_TEXT: &str = "guest_confirmation.txt";
pub const ADMIN_HTML: &str = "admin_alert.html";
pub const ADMIN_TEXT: &str = "admin_alert.txt";
pub const ADMIN_LOGIN_PAGE: &str = "admin_login.html";
pub const ADMIN_DASHBOARD_PAGE: &str = "admin_dashboard.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(String),
    Skipped(String),
    Failed(String),
}

impl SendOutcome {
    pub fn message_id(&self) -> Option<String> {
        match self {
            SendOutcome::Sent(id) => Some(id.clone()),
            _ => None,
        }
    }

    /// Skips report their reason here too, so the caller can tell nothing went out.
    pub fn error(&self) -> Option<String> {
        match self {
            SendOutcome::Sent(_) => None,
            SendOutcome::Skipped(reason) => Some(reason.clone()),
            SendOutcome::Failed(msg) => Some(msg.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationReport {
    pub guest: SendOutcome,
    pub admin: SendOutcome,
}

/// Wire shape of the `email` block in the submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub user_id: Option<String>,
    pub admin_id: Option<String>,
    pub user_error: Option<String>,
    pub admin_error: Option<String>,
}

impl From<&NotificationReport> for EmailSummary {
    fn from(report: &NotificationReport) -> Self {
        Self {
            user_id: report.guest.message_id(),
            admin_id: report.admin.message_id(),
            user_error: report.guest.error(),
            admin_error: report.admin.error(),
        }
    }
}

pub struct NotificationDispatcher {
    email_service: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    from: String,
    admin_list: Vec<String>,
    site_name: String,
    couple_names: String,
    timeout: Duration,
}

pub struct DispatcherSettings {
    pub from: String,
    pub admin_list: Vec<String>,
    pub site_name: String,
    pub couple_names: String,
    pub timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(email_service: Arc<dyn EmailService>, templates: Arc<Tera>, settings: DispatcherSettings) -> Self {
        Self {
            email_service,
            templates,
            from: settings.from,
            admin_list: settings.admin_list,
            site_name: settings.site_name,
            couple_names: settings.couple_names,
            timeout: settings.timeout,
        }
    }

    /// Sends the guest confirmation and the admin alert side by side. Never fails:
    /// every problem ends up in the report.
    pub async fn notify(&self, record: &Rsvp, family: &[String]) -> NotificationReport {
        let context = self.context(record, family);

        let (guest, admin) = tokio::join!(
            self.send_guest_confirmation(record, &context),
            self.send_admin_alert(record, &context),
        );

        info!(
            guest = ?guest,
            admin = ?admin,
            "Notifications dispatched for rsvp {}", record.id
        );

        NotificationReport { guest, admin }
    }

    async fn send_guest_confirmation(&self, record: &Rsvp, context: &Context) -> SendOutcome {
        let to = record.email.as_deref().map(str::trim).unwrap_or_default();
        if to.is_empty() {
            warn!("Skipping guest email: no recipient address");
            return SendOutcome::Skipped("guest email empty".to_string());
        }

        let email = match self.render(GUEST_HTML, GUEST_TEXT, context) {
            Ok((html, text)) => OutgoingEmail {
                from: self.from.clone(),
                to: vec![to.to_string()],
                subject: format!("RSVP received: {}", self.site_name),
                html,
                text,
                reply_to: self.admin_list.first().cloned(),
            },
            Err(e) => return SendOutcome::Failed(e.to_string()),
        };

        self.deliver("guest confirmation", &email).await
    }

    async fn send_admin_alert(&self, record: &Rsvp, context: &Context) -> SendOutcome {
        if self.admin_list.is_empty() {
            warn!("Skipping admin email: no admin recipients configured");
            return SendOutcome::Skipped("admin list empty".to_string());
        }

        let subject = match record.group() {
            Some(group) => format!("New RSVP: {} ({})", record.full_name(), group),
            None => format!("New RSVP: {}", record.full_name()),
        };

        let email = match self.render(ADMIN_HTML, ADMIN_TEXT, context) {
            Ok((html, text)) => OutgoingEmail {
                from: self.from.clone(),
                to: self.admin_list.clone(),
                subject,
                html,
                text,
                reply_to: None,
            },
            Err(e) => return SendOutcome::Failed(e.to_string()),
        };

        self.deliver("admin alert", &email).await
    }

    async fn deliver(&self, label: &str, email: &OutgoingEmail) -> SendOutcome {
        match with_deadline(self.timeout, label, self.email_service.send(email)).await {
            Ok(id) => SendOutcome::Sent(id),
            Err(e) => {
                error!("Sending {} failed: {}", label, e);
                SendOutcome::Failed(e.to_string())
            }
        }
    }

    fn render(&self, html_template: &str, text_template: &str, context: &Context) -> Result<(String, String), AppError> {
        let html = self.templates.render(html_template, context)
            .map_err(|e| AppError::InternalWithMsg(format!("Template {} failed: {:?}", html_template, e)))?;
        let text = self.templates.render(text_template, context)
            .map_err(|e| AppError::InternalWithMsg(format!("Template {} failed: {:?}", text_template, e)))?;
        Ok((html, text))
    }

    fn context(&self, record: &Rsvp, family: &[String]) -> Context {
        let data = json!({
            "rsvp_id": record.id,
            "first_name": record.first_name,
            "last_name": record.last_name,
            "email": record.email.clone().unwrap_or_default(),
            "phone": record.phone,
            "group_id": record.group(),
            "attending": record.attending,
            "guests": record.guests,
            "diet": record.diet,
            "message": record.message,
            "family": family,
            "site_name": self.site_name,
            "couple_names": self.couple_names,
        });
        Context::from_value(data).unwrap_or_default()
    }
}

/// Registers the built-in mail and page templates.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (GUEST_HTML, include_str!("../../../templates/guest_confirmation.html")),
        (GUEST_TEXT, include_str!("../../../templates/guest_confirmation.txt")),
        (ADMIN_HTML, include_str!("../../../templates/admin_alert.html")),
        (ADMIN_TEXT, include_str!("../../../templates/admin_alert.txt")),
        (ADMIN_LOGIN_PAGE, include_str!("../../../templates/admin_login.html")),
        (ADMIN_DASHBOARD_PAGE, include_str!("../../../templates/admin_dashboard.html")),
    ])?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::rsvp::NewRsvpParams;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_admin: bool,
    }

    #[async_trait]
    impl EmailService for Recorder {
        async fn send(&self, email: &OutgoingEmail) -> Result<String, AppError> {
            if self.fail_admin && email.subject.starts_with("New RSVP") {
                return Err(AppError::Upstream("provider rejected".into()));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(email.clone());
            Ok(format!("msg-{}", sent.len()))
        }
    }

    fn dispatcher(recorder: Arc<Recorder>, admins: Vec<String>) -> NotificationDispatcher {
        NotificationDispatcher::new(
            recorder,
            Arc::new(load_templates().unwrap()),
            DispatcherSettings {
                from: "Weddings <noreply@example.com>".into(),
                admin_list: admins,
                site_name: "Our Wedding".into(),
                couple_names: "A & B".into(),
                timeout: Duration::from_secs(2),
            },
        )
    }

    fn record(email: Option<&str>) -> Rsvp {
        Rsvp::new(NewRsvpParams {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            group_id: Some("g7".into()),
            attending: true,
            guests: 1,
            email: email.map(str::to_string),
            phone: None,
            diet: Some("<vegan>".into()),
            message: None,
        })
    }

    #[tokio::test]
    async fn sends_both_messages() {
        let recorder = Arc::new(Recorder { sent: Mutex::new(vec![]), fail_admin: false });
        let d = dispatcher(recorder.clone(), vec!["couple@example.com".into()]);

        let report = d.notify(&record(Some("ada@example.com")), &["Ada Lovelace".into(), "Bea Lovelace".into()]).await;

        assert!(report.guest.message_id().is_some());
        assert!(report.admin.message_id().is_some());

        let sent = recorder.sent.lock().unwrap();
        let guest = sent.iter().find(|e| e.to == vec!["ada@example.com".to_string()]).unwrap();
        assert_eq!(guest.reply_to.as_deref(), Some("couple@example.com"));
        assert!(guest.html.contains("&lt;vegan&gt;"));
        assert!(guest.text.contains("Family: Ada Lovelace, Bea Lovelace"));

        let admin = sent.iter().find(|e| e.subject.starts_with("New RSVP")).unwrap();
        assert_eq!(admin.subject, "New RSVP: Ada Lovelace (g7)");
    }

    #[tokio::test]
    async fn missing_recipients_are_skipped() {
        let recorder = Arc::new(Recorder { sent: Mutex::new(vec![]), fail_admin: false });
        let d = dispatcher(recorder.clone(), vec![]);

        let report = d.notify(&record(Some("  ")), &[]).await;

        assert!(matches!(report.guest, SendOutcome::Skipped(_)));
        assert!(matches!(report.admin, SendOutcome::Skipped(_)));
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_failure_does_not_hide_the_other() {
        let recorder = Arc::new(Recorder { sent: Mutex::new(vec![]), fail_admin: true });
        let d = dispatcher(recorder, vec!["couple@example.com".into()]);

        let report = d.notify(&record(Some("ada@example.com")), &[]).await;
        let summary = EmailSummary::from(&report);

        assert!(summary.user_id.is_some());
        assert!(summary.user_error.is_none());
        assert!(summary.admin_id.is_none());
        assert!(summary.admin_error.unwrap().contains("provider rejected"));
    }
}
