use chrono::{DateTime, Local, Utc};
use fl_core::notifications::{NotificationEvent, RemovalReason};
use fl_core::types::{HelpRequest, NotificationKind};
use owo_colors::{OwoColorize, Stream};

fn clock(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

pub fn request_line(request: &HelpRequest) -> String {
    let mut line = format!(
        "{}  {}  {}: {}",
        clock(&request.created_at),
        request.id,
        request.customer_name,
        request.question
    );
    if let Some(answer) = &request.answer {
        line.push_str(&format!("  -> {answer}"));
    }
    line
}

pub fn badge_line(observer: &str, pending: usize) -> String {
    let count = pending.to_string();
    format!(
        "[{observer}] pending: {}",
        count.if_supports_color(Stream::Stdout, |text| text.bold())
    )
}

/// Render a notification event, or `None` for events not worth printing.
pub fn notification_line(event: &NotificationEvent) -> Option<String> {
    match event {
        NotificationEvent::Posted(notification) => {
            let tag = match notification.kind {
                NotificationKind::Success => "ok".if_supports_color(Stream::Stdout, |t| t.green()).to_string(),
                NotificationKind::Error => "error".if_supports_color(Stream::Stdout, |t| t.red()).to_string(),
                NotificationKind::Info => "info".if_supports_color(Stream::Stdout, |t| t.cyan()).to_string(),
            };
            Some(format!("[{tag}] {}", notification.message))
        }
        NotificationEvent::Removed {
            reason: RemovalReason::Evicted,
            id,
        } => Some(format!("(notification {id} dropped)")),
        NotificationEvent::Removed { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fl_core::types::{HelpRequestId, Notification, NotificationId};

    #[test]
    fn resolved_requests_show_their_answer() {
        let mut request = HelpRequest::pending(
            HelpRequestId::new("r1".to_string()).expect("id"),
            "Dana".to_string(),
            "Do you do perms?".to_string(),
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        );
        assert!(request_line(&request).ends_with("r1  Dana: Do you do perms?"));
        request.answer = Some("Yes".to_string());
        assert!(request_line(&request).ends_with("-> Yes"));
    }

    #[test]
    fn expirations_are_silent() {
        let id = NotificationId::generate();
        let expired = NotificationEvent::Removed {
            id: id.clone(),
            reason: RemovalReason::Expired,
        };
        assert_eq!(notification_line(&expired), None);

        let now = Utc::now();
        let posted = NotificationEvent::Posted(Notification {
            id,
            kind: NotificationKind::Error,
            message: "Error: connection refused".to_string(),
            created_at: now,
            expires_at: now,
        });
        assert!(
            notification_line(&posted)
                .expect("printed")
                .ends_with("] Error: connection refused")
        );
    }
}
