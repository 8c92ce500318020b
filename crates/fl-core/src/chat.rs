use crate::desk::SubmitGuard;
use crate::error::{ClientError, ValidationError};
use crate::notifications::NotificationCenter;
use crate::remote::AgentClient;
use crate::types::ChatReply;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Customer,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// The customer's conversation with the agent.
pub struct CustomerChat<A> {
    agent: Arc<A>,
    customer_name: String,
    notifications: NotificationCenter,
    transcript: Mutex<Vec<ChatTurn>>,
    sending: AtomicBool,
}

impl<A: AgentClient> CustomerChat<A> {
    pub fn new(agent: Arc<A>, customer_name: impl Into<String>, notifications: NotificationCenter) -> Self {
        Self {
            agent,
            customer_name: customer_name.into(),
            notifications,
            transcript: Mutex::new(Vec::new()),
            sending: AtomicBool::new(false),
        }
    }

    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Send one message. Blank messages are rejected without contacting the agent.
    pub async fn send(&self, message: &str) -> Result<ChatReply, ClientError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        let Some(_guard) = SubmitGuard::acquire(&self.sending) else {
            return Err(ClientError::SubmissionInFlight);
        };
        self.record(Speaker::Customer, message);

        match self.agent.converse(message, &self.customer_name).await {
            Ok(reply) => {
                if let Some(request_id) = &reply.request_id {
                    tracing::info!(%request_id, "message escalated to a supervisor");
                }
                self.record(Speaker::Agent, &reply.response);
                Ok(reply)
            }
            Err(error) => {
                tracing::warn!(%error, "agent unreachable");
                if error.is_reportable() {
                    self.notifications.error(format!("Error: {error}"));
                }
                Err(error)
            }
        }
    }

    /// Append a late agent message, such as a supervisor's follow-up answer.
    pub fn record_agent(&self, text: &str) {
        self.record(Speaker::Agent, text);
    }

    fn record(&self, speaker: Speaker, text: &str) {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ChatTurn {
                speaker,
                text: text.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeAgent, id};
    use crate::types::NotificationKind;

    fn chat(agent: &Arc<FakeAgent>, center: &NotificationCenter) -> CustomerChat<FakeAgent> {
        CustomerChat::new(agent.clone(), "Dana", center.clone())
    }

    #[tokio::test]
    async fn reply_is_appended_to_transcript() {
        let agent = Arc::new(FakeAgent::default());
        let chat = chat(&agent, &NotificationCenter::default());

        let reply = chat.send("  do you take walk-ins? ").await.expect("agent answers");
        assert_eq!(reply.response, "echo: do you take walk-ins?");
        assert_eq!(
            chat.transcript(),
            vec![
                ChatTurn {
                    speaker: Speaker::Customer,
                    text: "do you take walk-ins?".to_string()
                },
                ChatTurn {
                    speaker: Speaker::Agent,
                    text: "echo: do you take walk-ins?".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn blank_message_is_rejected_locally() {
        let agent = Arc::new(FakeAgent::default());
        let center = NotificationCenter::default();
        let chat = chat(&agent, &center);

        assert_eq!(
            chat.send("   ").await,
            Err(ClientError::Validation(ValidationError::EmptyMessage))
        );
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
        assert!(chat.transcript().is_empty());
        assert!(center.active().is_empty());
    }

    #[tokio::test]
    async fn escalation_carries_request_id() {
        let agent = Arc::new(FakeAgent::default());
        agent.escalate_to(id("help_1"));
        let chat = chat(&agent, &NotificationCenter::default());

        let reply = chat.send("can you dye my dog?").await.expect("agent answers");
        assert_eq!(reply.request_id, Some(id("help_1")));
    }

    #[tokio::test]
    async fn transport_failure_posts_error_notification() {
        let agent = Arc::new(FakeAgent::default());
        agent.fail_with(Some(ClientError::Transport {
            message: "backend unreachable".to_string(),
        }));
        let center = NotificationCenter::default();
        let chat = chat(&agent, &center);

        assert!(chat.send("hello there").await.is_err());
        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, NotificationKind::Error);
        assert_eq!(active[0].message, "Error: backend unreachable");
        assert!(!chat.is_sending());
    }

    #[tokio::test]
    async fn one_message_in_flight_at_a_time() {
        let agent = Arc::new(FakeAgent::default());
        let chat = chat(&agent, &NotificationCenter::default());

        let (first, second) = tokio::join!(chat.send("one"), chat.send("two"));
        assert!(first.is_ok());
        assert_eq!(second, Err(ClientError::SubmissionInFlight));
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    }
}
