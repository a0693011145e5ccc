//! Prompt assembly.
//!
//! Everything the model sees for one turn is a single text blob, built here
//! in a fixed order:
//!
//! 1. system instructions
//! 2. `参考文書:` followed by the selected documents
//! 3. `ユーザーの質問:` followed by the question
//! 4. `関連法令:` followed by each selected statute (only when there are any)
//! 5. the closing instructions about citing statutes
//!
//! Nothing is truncated. The functions are pure: identical inputs give
//! byte-identical output.

use lawdesk_core::{Document, StatuteContent};

/// Header placed before the document context.
pub const DOCUMENTS_HEADER: &str = "参考文書:";

/// Prefix of the question line.
pub const QUESTION_PREFIX: &str = "ユーザーの質問: ";

/// Header placed before the statute context.
pub const STATUTES_HEADER: &str = "関連法令:";

/// Closing instructions appended to every prompt.
/// Each line carries a four-space indent and the block ends with one.
pub const CLOSING_INSTRUCTIONS: &str = "\n    上記の情報を基に、ユーザーの質問に答えてください。関連法令からの情報を使用する場合は、必ず該当する法令名と条文番号を明記してください。\n    法令の解釈が必要な場合は、その旨を明確に述べ、可能な解釈を示してください。\n    情報が不足している場合は、どのような追加情報が必要かを説明してください。\n    ";

/// Render documents as prompt context, in the order given.
pub fn document_context<'a>(documents: impl IntoIterator<Item = &'a Document>) -> String {
    let mut context = String::new();
    for document in documents {
        context.push_str("ファイル名: ");
        context.push_str(&document.name);
        context.push_str("\n内容:\n");
        context.push_str(&document.content);
        context.push_str("\n\n");
    }
    context
}

/// Build the prompt for one turn.
///
/// `statutes` of `None` and `Some(&[])` both omit the statute section.
pub fn assemble(
    system_prompt: &str,
    document_context: &str,
    statutes: Option<&[StatuteContent]>,
    question: &str,
) -> String {
    let mut prompt = format!(
        "{system_prompt}\n\n{DOCUMENTS_HEADER}\n{document_context}\n\n{QUESTION_PREFIX}{question}\n\n"
    );

    if let Some(statutes) = statutes.filter(|s| !s.is_empty()) {
        prompt.push_str(STATUTES_HEADER);
        prompt.push('\n');
        for statute in statutes {
            prompt.push_str("法令名: ");
            prompt.push_str(&statute.name);
            prompt.push_str("\n法令内容:\n");
            prompt.push_str(&statute.full_text);
            prompt.push_str("\n\n");
        }
    }

    prompt.push_str(CLOSING_INSTRUCTIONS);
    prompt
}
