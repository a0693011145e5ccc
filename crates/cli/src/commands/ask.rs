//! `lawdesk ask` — One-shot question.

use std::path::PathBuf;

use lawdesk_agent::Workbench;
use lawdesk_core::{ChatError, ChatModel, Error, Session};

use super::{load_config, print_missing_credential, print_stream, print_upload_report, read_uploads};

pub async fn run(
    question: String,
    files: Vec<PathBuf>,
    laws: Vec<String>,
    model: Option<ChatModel>,
    show_prompt: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(model)?;

    // Check for the API key early, before any uploads or registry calls
    if !config.has_api_key() {
        print_missing_credential();
        return Err(ChatError::MissingCredential.into());
    }

    let mut bench = Workbench::from_config(&config);
    let mut session = bench.new_session();

    if !files.is_empty() {
        let report = bench.upload(&mut session, read_uploads(&files).await);
        print_upload_report(&report);
    }

    for (id, e) in attach_statutes(&bench, &mut session, &laws).await {
        eprintln!("  ⚠️  Statute {id} not attached: {e}");
    }

    let stream = bench.ask(&mut session, &question).await?;
    print_stream(stream).await?;

    if show_prompt && let Some(prompt) = bench.last_prompt() {
        eprintln!("\n──── prompt ────\n{prompt}");
    }

    Ok(())
}

/// Attach each statute in turn. Failures are collected and the question
/// still goes ahead with whatever was attached.
async fn attach_statutes<'a>(bench: &Workbench, session: &mut Session, ids: &'a [String]) -> Vec<(&'a str, Error)> {
    let mut skipped = Vec::new();
    for id in ids {
        if let Err(e) = attach_statute(bench, session, id).await {
            skipped.push((id.as_str(), e));
        }
    }
    skipped
}

async fn attach_statute(bench: &Workbench, session: &mut Session, id: &str) -> lawdesk_core::Result<()> {
    let statute = bench.fetch_statute(session, id).await?;
    eprintln!("  ✅ Attached {} ({} chars)", statute.name, statute.full_text.chars().count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use lawdesk_agent::ChatOrchestrator;
    use lawdesk_core::StatuteMode;
    use lawdesk_providers::GeminiProvider;
    use lawdesk_statutes::StatuteClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CIVIL_CODE_DATA: &str = "<DataRoot><Result><Code>0</Code></Result><ApplData><LawId>id1</LawId><LawFullText><Law><LawBody><LawTitle>民法</LawTitle><MainProvision><Article><Sentence>私権は、公共の福祉に適合しなければならない。</Sentence></Article></MainProvision></LawBody></Law></LawFullText></ApplData></DataRoot>";

    #[tokio::test]
    async fn failed_statutes_are_collected_and_the_rest_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lawdata/id1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CIVIL_CODE_DATA))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lawdata/gone"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("key", server.uri(), Duration::from_secs(5));
        let bench = Workbench::new(
            StatuteClient::new(server.uri(), Duration::from_secs(5)),
            ChatOrchestrator::new(Arc::new(provider), ChatModel::Gemini15Pro),
            "system",
            StatuteMode::Multi,
        );
        let mut session = bench.new_session();

        let ids = vec!["gone".to_string(), "id1".to_string()];
        let skipped = attach_statutes(&bench, &mut session, &ids).await;

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, "gone");
        assert!(matches!(skipped[0].1, Error::Statute(_)));
        assert_eq!(session.selected_statutes().len(), 1);
        assert!(session.selected_statutes()[0].full_text.contains("私権は"));
    }
}
