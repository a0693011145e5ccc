//! The presentation-facing façade.
//!
//! A [`Workbench`] bundles the statute client, the chat orchestrator and the
//! system prompt. Presentation layers (the CLI REPL, one-shot commands) call
//! these methods with the user's [`Session`] and render what comes back.

use std::sync::Arc;

use lawdesk_config::AppConfig;
use lawdesk_core::{
    ChatError, ChatModel, DocumentError, LawCategory, Session, StatuteContent, StatuteError,
    StatuteMode, UploadItem,
};
use lawdesk_documents::extract_batch;
use lawdesk_providers::GeminiProvider;
use lawdesk_statutes::StatuteClient;
use tracing::{debug, info, warn};

use crate::orchestrator::{ChatOrchestrator, TurnStream};

/// Outcome of adding uploaded files to a session.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Names of the documents added or replaced, in upload order
    pub added: Vec<String>,

    /// One entry per file that was skipped
    pub warnings: Vec<DocumentError>,
}

pub struct Workbench {
    statutes: StatuteClient,
    orchestrator: ChatOrchestrator,
    system_prompt: String,
    statute_mode: StatuteMode,
}

impl Workbench {
    pub fn new(
        statutes: StatuteClient,
        orchestrator: ChatOrchestrator,
        system_prompt: impl Into<String>,
        statute_mode: StatuteMode,
    ) -> Self {
        Self {
            statutes,
            orchestrator,
            system_prompt: system_prompt.into(),
            statute_mode,
        }
    }

    /// Wire up the Gemini provider and the registry client from config.
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = Arc::new(GeminiProvider::from_config(config));
        Self::new(
            StatuteClient::from_config(config),
            ChatOrchestrator::new(provider, config.model),
            config.system_prompt.clone(),
            config.statute_mode,
        )
    }

    /// A fresh, empty session using the configured statute mode.
    pub fn new_session(&self) -> Session {
        Session::new(self.statute_mode)
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    pub fn orchestrator(&self) -> &ChatOrchestrator {
        &self.orchestrator
    }

    /// Switch the model used for the following questions.
    pub fn set_model(&mut self, model: ChatModel) {
        info!(model = %model, "Switching chat model");
        self.orchestrator.set_model(model);
    }

    /// Extract a batch of uploads and add the successes to the session.
    ///
    /// Added documents are selected. Failed files are reported, never fatal.
    pub fn upload(
        &self,
        session: &mut Session,
        items: impl IntoIterator<Item = UploadItem>,
    ) -> UploadReport {
        let outcome = extract_batch(items);
        let mut report = UploadReport {
            added: Vec::with_capacity(outcome.documents.len()),
            warnings: outcome.warnings,
        };

        for document in outcome.documents {
            let name = document.name.clone();
            if session.add_document(document) {
                debug!(name = %name, "Replaced existing document");
            }
            report.added.push(name);
        }

        info!(
            session_id = %session.id(),
            added = report.added.len(),
            skipped = report.warnings.len(),
            "Processed upload batch"
        );
        report
    }

    /// Replace the session's statute list with the registry's list for
    /// `category`. On failure the list is left empty.
    pub async fn load_statute_list(
        &self,
        session: &mut Session,
        category: LawCategory,
    ) -> Result<usize, StatuteError> {
        match self.statutes.list_statutes(category).await {
            Ok(list) => {
                let count = list.len();
                session.replace_statute_list(list);
                Ok(count)
            }
            Err(e) => {
                session.replace_statute_list(Vec::new());
                Err(e)
            }
        }
    }

    /// Fetch a statute's full text and attach it to the session.
    ///
    /// The statute name comes from the session's current list; an id that
    /// is not listed is used as its own name. On any error the selection is
    /// left as it was.
    pub async fn fetch_statute<'s>(
        &self,
        session: &'s mut Session,
        id: &str,
    ) -> Result<&'s StatuteContent, StatuteError> {
        let name = match session.find_summary(id) {
            Some(summary) => summary.name.clone(),
            None => {
                debug!(statute_id = id, "Statute not in current list, using id as name");
                id.to_string()
            }
        };

        let full_text = self.statutes.fetch_statute_content(id).await.inspect_err(|e| {
            warn!(statute_id = id, error = %e, "Statute selection unchanged");
        })?;

        session.select_statute(StatuteContent::new(name.clone(), full_text));
        session
            .statute(&name)
            .ok_or_else(|| StatuteError::NotFound { id: id.to_string() })
    }

    /// Ask a question within the session. See [`ChatOrchestrator::handle_user_turn`].
    pub async fn ask<'s>(
        &mut self,
        session: &'s mut Session,
        question: &str,
    ) -> Result<TurnStream<'s>, ChatError> {
        self.orchestrator
            .handle_user_turn(session, &self.system_prompt, question)
            .await
    }

    /// The prompt sent with the most recent question.
    pub fn last_prompt(&self) -> Option<&str> {
        self.orchestrator.last_prompt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::CLOSING_INSTRUCTIONS;
    use crate::test_helpers::{Script, ScriptedProvider};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CIVIL_CODE_LIST: &str = "<DataRoot><ApplData><LawNameListInfo><LawId>id1</LawId><LawName>民法</LawName><LawNo>明治二十九年法律第八十九号</LawNo></LawNameListInfo></ApplData></DataRoot>";
    const CIVIL_CODE_DATA: &str = "<DataRoot><ApplData><LawFullText><Law><LawBody><LawTitle>民法</LawTitle><Article><ArticleTitle>第一条</ArticleTitle><Sentence>私権は、公共の福祉に適合しなければならない。</Sentence></Article></LawBody></Law></LawFullText></ApplData></DataRoot>";

    async fn registry() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lawlists/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CIVIL_CODE_LIST))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lawdata/id1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CIVIL_CODE_DATA))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lawdata/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<DataRoot><ApplData/></DataRoot>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lawlists/3"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    }

    fn workbench(server: &MockServer, provider: Arc<ScriptedProvider>, mode: StatuteMode) -> Workbench {
        Workbench::new(
            StatuteClient::new(server.uri(), Duration::from_secs(5)),
            ChatOrchestrator::new(provider, ChatModel::Gemini15Pro),
            "SYS",
            mode,
        )
    }

    #[tokio::test]
    async fn civil_code_flows_into_prompt() {
        let server = registry().await;
        let provider = Arc::new(ScriptedProvider::new(vec![Script::text(&["回答"])]));
        let mut bench = workbench(&server, provider.clone(), StatuteMode::Multi);
        let mut session = bench.new_session();

        let count = bench
            .load_statute_list(&mut session, LawCategory::ConstitutionAndStatutes)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(session.statute_list()[0].name, "民法");

        let content = bench.fetch_statute(&mut session, "id1").await.unwrap();
        assert_eq!(content.name, "民法");
        assert!(!content.full_text.is_empty());

        let answer = bench
            .ask(&mut session, "第一条について教えてください")
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();
        assert_eq!(answer, "回答");

        let prompt = bench.last_prompt().unwrap();
        assert!(prompt.contains("民法"));
        assert!(prompt.contains("私権は、公共の福祉に適合しなければならない。"));
        assert!(prompt.contains(CLOSING_INSTRUCTIONS));
    }

    #[tokio::test]
    async fn empty_statute_leaves_selection_unchanged() {
        let server = registry().await;
        let bench = workbench(&server, Arc::new(ScriptedProvider::new(vec![])), StatuteMode::Single);
        let mut session = bench.new_session();

        bench.fetch_statute(&mut session, "id1").await.unwrap();
        let err = bench.fetch_statute(&mut session, "empty").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(session.selected_statutes().len(), 1);
        assert_eq!(session.selected_statutes()[0].name, "id1");
        assert!(!session.selected_statutes()[0].full_text.is_empty());
    }

    #[tokio::test]
    async fn failed_list_empties_statute_list() {
        let server = registry().await;
        let bench = workbench(&server, Arc::new(ScriptedProvider::new(vec![])), StatuteMode::Multi);
        let mut session = bench.new_session();

        bench
            .load_statute_list(&mut session, LawCategory::ConstitutionAndStatutes)
            .await
            .unwrap();
        let err = bench
            .load_statute_list(&mut session, LawCategory::CabinetAndImperialOrders)
            .await
            .unwrap_err();

        assert!(matches!(err, StatuteError::Network(_)));
        assert!(session.statute_list().is_empty());
    }

    #[tokio::test]
    async fn upload_adds_successes_and_reports_failures() {
        let server = registry().await;
        let bench = workbench(&server, Arc::new(ScriptedProvider::new(vec![])), StatuteMode::Multi);
        let mut session = bench.new_session();

        let report = bench.upload(
            &mut session,
            vec![
                UploadItem::new("契約書.md", "# 契約書".as_bytes().to_vec()),
                UploadItem::new("notes.txt", b"plain".to_vec()),
            ],
        );

        assert_eq!(report.added, vec!["契約書.md"]);
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(report.warnings[0], DocumentError::UnsupportedFormat { .. }));
        assert_eq!(session.documents().len(), 1);
        assert!(session.is_document_selected("契約書.md"));
    }

    #[tokio::test]
    async fn model_and_system_prompt_changes_apply_to_next_question() {
        let server = registry().await;
        let provider = Arc::new(ScriptedProvider::new(vec![Script::text(&["はい"])]));
        let mut bench = workbench(&server, provider.clone(), StatuteMode::Multi);
        let mut session = bench.new_session();

        bench.set_model(ChatModel::GeminiPro);
        bench.set_system_prompt("簡潔に答えてください。");
        assert_eq!(bench.orchestrator().model(), ChatModel::GeminiPro);
        assert_eq!(bench.system_prompt(), "簡潔に答えてください。");

        bench.ask(&mut session, "q").await.unwrap().finish().await.unwrap();
        assert!(provider.prompts()[0].starts_with("簡潔に答えてください。\n\n"));
        assert_eq!(provider.models(), vec![ChatModel::GeminiPro]);
    }

    #[tokio::test]
    async fn ask_without_credential_is_rejected() {
        let server = registry().await;
        let mut bench = workbench(&server, Arc::new(ScriptedProvider::unconfigured()), StatuteMode::Multi);
        let mut session = bench.new_session();

        assert!(matches!(
            bench.ask(&mut session, "q").await,
            Err(ChatError::MissingCredential)
        ));
        assert!(session.chat_history().is_empty());
    }
}
