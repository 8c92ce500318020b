use crate::error::HelpError;
use crate::types::{CreateHelpRequestInput, HelpRequest, HelpRequestId, RequestFilter};

pub trait HelpRepository {
    fn create(&self, input: CreateHelpRequestInput) -> Result<HelpRequest, HelpError>;
    fn get(&self, id: &HelpRequestId) -> Result<Option<HelpRequest>, HelpError>;
    /// Newest first.
    fn list(&self, filter: &RequestFilter) -> Result<Vec<HelpRequest>, HelpError>;
    /// Resolve only if still pending. A request that is already resolved yields
    /// `AlreadyResolved` and is left untouched.
    fn resolve(&self, id: &HelpRequestId, answer: &str) -> Result<HelpRequest, HelpError>;
}
