use crate::FrontloopError;
use crate::help::HelpRepository;
use crate::knowledge::KnowledgeRepository;

pub trait Store {
    type Help<'a>: HelpRepository
    where
        Self: 'a;
    type Knowledge<'a>: KnowledgeRepository
    where
        Self: 'a;

    fn help(&self) -> Self::Help<'_>;
    fn knowledge(&self) -> Self::Knowledge<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, FrontloopError>
    where
        F: FnOnce(&Self) -> Result<T, FrontloopError>;
}
