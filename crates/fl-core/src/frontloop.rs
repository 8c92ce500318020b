use crate::error::{FrontloopError, HelpError, KnowledgeError, ValidationError};
use crate::help::HelpRepository;
use crate::knowledge::{KnowledgeRepository, normalize_question};
use crate::lifecycle::check_answer;
use crate::store::Store;
use crate::types::{
    AddKnowledgeInput, ChatInput, ChatReply, CreateHelpRequestInput, HelpRequest, HelpRequestId,
    KnowledgeEntry, RequestFilter, ResolveRequestInput,
};

pub const ESCALATION_REPLY: &str = "Let me check with my supervisor and get back to you.";
pub const GREETING_REPLY: &str = "Hello! Thanks for reaching out. How can I help you today?";
const DEFAULT_CUSTOMER: &str = "Customer";
const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

pub struct Frontloop<S: Store> {
    store: S,
}

impl<S: Store> Frontloop<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn help(&self) -> HelpApi<'_, S> {
        HelpApi { core: self }
    }

    pub fn knowledge(&self) -> KnowledgeApi<'_, S> {
        KnowledgeApi { core: self }
    }

    pub fn agent(&self) -> AgentApi<'_, S> {
        AgentApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

pub struct HelpApi<'a, S: Store> {
    core: &'a Frontloop<S>,
}

impl<S: Store> HelpApi<'_, S> {
    pub fn request(&self, input: CreateHelpRequestInput) -> Result<HelpRequest, FrontloopError> {
        if input.question.trim().is_empty() {
            return Err(HelpError::InvalidInput {
                message: "question must not be empty".to_string(),
            }
            .into());
        }
        let input = CreateHelpRequestInput {
            customer_name: customer_or_default(&input.customer_name),
            question: input.question.trim().to_string(),
        };
        let request = self.core.store.help().create(input)?;
        tracing::info!(request_id = %request.id, customer = %request.customer_name, "help request created");
        Ok(request)
    }

    pub fn get(&self, id: &HelpRequestId) -> Result<Option<HelpRequest>, FrontloopError> {
        Ok(self.core.store.help().get(id)?)
    }

    pub fn list(&self, filter: &RequestFilter) -> Result<Vec<HelpRequest>, FrontloopError> {
        Ok(self.core.store.help().list(filter)?)
    }

    /// Resolve a pending request and remember the answer for future lookups.
    pub fn resolve(&self, input: ResolveRequestInput) -> Result<HelpRequest, FrontloopError> {
        check_answer(&input.answer)?;
        let resolved = self.core.store.with_tx(|store| {
            let resolved = store.help().resolve(&input.request_id, &input.answer)?;
            store.knowledge().add(&resolved.question, &input.answer)?;
            Ok(resolved)
        })?;
        tracing::info!(request_id = %resolved.id, "help request resolved");
        Ok(resolved)
    }
}

pub struct KnowledgeApi<'a, S: Store> {
    core: &'a Frontloop<S>,
}

impl<S: Store> KnowledgeApi<'_, S> {
    pub fn add(&self, input: AddKnowledgeInput) -> Result<KnowledgeEntry, FrontloopError> {
        if normalize_question(&input.question).is_empty() || input.answer.trim().is_empty() {
            return Err(KnowledgeError::InvalidInput {
                message: "question and answer must not be empty".to_string(),
            }
            .into());
        }
        Ok(self.core.store.knowledge().add(&input.question, &input.answer)?)
    }

    pub fn list(&self) -> Result<Vec<KnowledgeEntry>, FrontloopError> {
        Ok(self.core.store.knowledge().list()?)
    }

    pub fn lookup(&self, question: &str) -> Result<Option<String>, FrontloopError> {
        Ok(self.core.store.knowledge().get_answer(question)?)
    }
}

pub struct AgentApi<'a, S: Store> {
    core: &'a Frontloop<S>,
}

impl<S: Store> AgentApi<'_, S> {
    /// Answer from the knowledge base when possible, otherwise escalate to a supervisor.
    pub fn converse(&self, input: ChatInput) -> Result<ChatReply, FrontloopError> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        if is_greeting(message) {
            return Ok(ChatReply {
                response: GREETING_REPLY.to_string(),
                request_id: None,
            });
        }
        if let Some(answer) = self.core.knowledge().lookup(message)? {
            tracing::debug!("answered from knowledge base");
            return Ok(ChatReply {
                response: answer,
                request_id: None,
            });
        }
        let request = self.core.help().request(CreateHelpRequestInput {
            customer_name: input.customer_name,
            question: message.to_string(),
        })?;
        Ok(ChatReply {
            response: ESCALATION_REPLY.to_string(),
            request_id: Some(request.id),
        })
    }
}

fn is_greeting(message: &str) -> bool {
    let normalized = normalize_question(message);
    let normalized = normalized.trim_end_matches(',');
    GREETINGS.contains(&normalized)
}

fn customer_or_default(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_CUSTOMER.to_string()
    } else {
        name.to_string()
    }
}
