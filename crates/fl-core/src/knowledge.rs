use crate::error::KnowledgeError;
use crate::types::KnowledgeEntry;

pub trait KnowledgeRepository {
    /// Insert or replace the answer for `question`. Keys are normalized first.
    fn add(&self, question: &str, answer: &str) -> Result<KnowledgeEntry, KnowledgeError>;
    fn get_answer(&self, question: &str) -> Result<Option<String>, KnowledgeError>;
    fn list(&self) -> Result<Vec<KnowledgeEntry>, KnowledgeError>;
}

/// Lookup key for a question: trimmed, lowercased, trailing `?`, `!` and `.` removed.
pub fn normalize_question(question: &str) -> String {
    question
        .trim()
        .trim_end_matches(['?', '!', '.'])
        .trim_end()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::normalize_question;

    #[test]
    fn normalization_ignores_case_padding_and_punctuation() {
        assert_eq!(
            normalize_question("  What are your working hours?? "),
            "what are your working hours"
        );
        assert_eq!(normalize_question("Where are you located."), "where are you located");
        assert_eq!(normalize_question("hello !"), "hello");
        assert_eq!(normalize_question("???"), "");
    }
}
