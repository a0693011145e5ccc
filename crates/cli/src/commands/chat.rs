//! `lawdesk chat` — Interactive session.
//!
//! Plain input is a question; lines starting with `/` manage the session.

use std::io::Write;
use std::path::PathBuf;

use lawdesk_agent::Workbench;
use lawdesk_core::{ChatModel, LawCategory, Role, Session, StatuteError, StatuteMode};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::laws::print_list;
use super::{load_config, print_stream, print_upload_report, read_uploads};

const HELP: &str = "\
  /upload <path>      Add a PDF or Markdown file
  /docs               List uploaded documents (* = used as context)
  /select <name>      Use a document as context
  /deselect <name>    Stop using a document as context
  /laws [1-4]         Load the statute list for a category, or show the current list
  /fetch <no.|id>     Fetch a statute by list number or registry id and attach it
  /statutes           List attached statutes
  /drop <name>        Detach a statute
  /show <name>        Print a document's or statute's text
  /prompt             Print the prompt sent with the last question
  /model [name]       Show or switch the model (gemini-1.5-pro, gemini-pro)
  /system [text]      Show or replace the system instructions
  /history            Print the chat history
  /reset              Start a new session
  /help               Show this help
  /exit               Quit";

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Ask(String),
    Upload(PathBuf),
    Docs,
    Select(String),
    Deselect(String),
    Laws(Option<LawCategory>),
    Fetch(String),
    Statutes,
    Drop(String),
    Show(String),
    Prompt,
    Model(Option<ChatModel>),
    System(Option<String>),
    History,
    Reset,
    Help,
    Exit,
    Invalid(String),
}

fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if !line.starts_with('/') {
        return if matches!(line, "exit" | "quit" | ":q") {
            ReplCommand::Exit
        } else {
            ReplCommand::Ask(line.to_string())
        };
    }

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    let required = |make: fn(String) -> ReplCommand| {
        if arg.is_empty() {
            ReplCommand::Invalid(format!("{command} needs an argument. Type /help for usage."))
        } else {
            make(arg.to_string())
        }
    };

    match command {
        "/upload" => required(|a| ReplCommand::Upload(PathBuf::from(a))),
        "/docs" => ReplCommand::Docs,
        "/select" => required(ReplCommand::Select),
        "/deselect" => required(ReplCommand::Deselect),
        "/laws" if arg.is_empty() => ReplCommand::Laws(None),
        "/laws" => match arg.parse::<LawCategory>() {
            Ok(category) => ReplCommand::Laws(Some(category)),
            Err(e) => ReplCommand::Invalid(e),
        },
        "/fetch" => required(ReplCommand::Fetch),
        "/statutes" => ReplCommand::Statutes,
        "/drop" => required(ReplCommand::Drop),
        "/show" => required(ReplCommand::Show),
        "/prompt" => ReplCommand::Prompt,
        "/model" if arg.is_empty() => ReplCommand::Model(None),
        "/model" => match arg.parse::<ChatModel>() {
            Ok(model) => ReplCommand::Model(Some(model)),
            Err(e) => ReplCommand::Invalid(e.to_string()),
        },
        "/system" if arg.is_empty() => ReplCommand::System(None),
        "/system" => ReplCommand::System(Some(arg.to_string())),
        "/history" => ReplCommand::History,
        "/reset" => ReplCommand::Reset,
        "/help" => ReplCommand::Help,
        "/exit" | "/quit" => ReplCommand::Exit,
        other => ReplCommand::Invalid(format!("Unknown command {other}. Type /help for usage.")),
    }
}

/// Resolve a `/fetch` argument: a 1-based list number or a registry id.
fn resolve_statute_id(session: &Session, arg: &str) -> String {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| session.statute_list().get(i))
        .map(|summary| summary.id.clone())
        .unwrap_or_else(|| arg.to_string())
}

pub async fn run(
    files: Vec<PathBuf>,
    mode: Option<StatuteMode>,
    model: Option<ChatModel>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(model)?;
    if let Some(mode) = mode {
        config.statute_mode = mode;
    }

    let mut bench = Workbench::from_config(&config);
    let mut session = bench.new_session();

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        LawDesk — Interactive Session         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:        {}", config.model);
    println!("  Statute mode: {:?}", config.statute_mode);
    if !config.has_api_key() {
        println!("  API key:      missing (questions will fail, run `lawdesk doctor`)");
    }
    println!();
    println!("  Ask a question, or type /help for commands.");
    println!();

    if !files.is_empty() {
        let report = bench.upload(&mut session, read_uploads(&files).await);
        print_upload_report(&report);
        println!();
    }

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt_user()?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt_user()?;
            continue;
        }

        match parse_command(&line) {
            ReplCommand::Exit => break,
            command => {
                if let Err(e) = execute(&mut bench, &mut session, command).await {
                    eprintln!("  [Error] {e}");
                }
            }
        }

        println!();
        prompt_user()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

fn prompt_user() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

async fn execute(
    bench: &mut Workbench,
    session: &mut Session,
    command: ReplCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ReplCommand::Ask(question) => {
            let stream = bench.ask(session, &question).await?;
            print!("\n  Assistant > ");
            print_stream(stream).await?;
        }
        ReplCommand::Upload(path) => {
            let report = bench.upload(session, read_uploads(std::slice::from_ref(&path)).await);
            print_upload_report(&report);
        }
        ReplCommand::Docs => {
            if session.documents().is_empty() {
                println!("  No documents uploaded.");
            }
            for document in session.documents() {
                let marker = if session.is_document_selected(&document.name) { "*" } else { " " };
                println!(
                    "  {marker} {} ({} chars)",
                    document.name,
                    document.content.chars().count()
                );
            }
        }
        ReplCommand::Select(name) => {
            if !session.select_document(&name) {
                return Err(format!("No document named {name}").into());
            }
            println!("  ✅ {name} is used as context");
        }
        ReplCommand::Deselect(name) => {
            if !session.deselect_document(&name) {
                return Err(format!("{name} is not selected").into());
            }
            println!("  ✅ {name} is no longer used as context");
        }
        ReplCommand::Laws(Some(category)) => {
            let count = bench.load_statute_list(session, category).await?;
            println!("  📚 {category} — {count} statutes\n");
            print_list(session.statute_list());
        }
        ReplCommand::Laws(None) => {
            if session.statute_list().is_empty() {
                println!("  No statute list loaded. Use /laws <1-4>.");
            }
            print_list(session.statute_list());
        }
        ReplCommand::Fetch(arg) => {
            let id = resolve_statute_id(session, &arg);
            match bench.fetch_statute(session, &id).await {
                Ok(statute) => println!(
                    "  ✅ Attached {} ({} chars)",
                    statute.name,
                    statute.full_text.chars().count()
                ),
                Err(StatuteError::NotFound { .. }) => {
                    return Err(format!("Statute {id} returned no content; nothing attached").into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        ReplCommand::Statutes => {
            if session.selected_statutes().is_empty() {
                println!("  No statutes attached.");
            }
            for statute in session.selected_statutes() {
                println!("  • {} ({} chars)", statute.name, statute.full_text.chars().count());
            }
        }
        ReplCommand::Drop(name) => {
            if !session.deselect_statute(&name) {
                return Err(format!("{name} is not attached").into());
            }
            println!("  ✅ Detached {name}");
        }
        ReplCommand::Show(name) => {
            if let Some(document) = session.document(&name) {
                println!("{}", document.content);
            } else if let Some(statute) = session.statute(&name) {
                println!("{}", statute.full_text);
            } else {
                return Err(format!("No document or statute named {name}").into());
            }
        }
        ReplCommand::Prompt => match bench.last_prompt() {
            Some(prompt) => println!("{prompt}"),
            None => println!("  No question asked yet."),
        },
        ReplCommand::Model(Some(model)) => {
            bench.set_model(model);
            println!("  ✅ Using {model}");
        }
        ReplCommand::Model(None) => println!("  Model: {}", bench.orchestrator().model()),
        ReplCommand::System(Some(prompt)) => {
            bench.set_system_prompt(prompt);
            println!("  ✅ System instructions replaced");
        }
        ReplCommand::System(None) => println!("{}", bench.system_prompt()),
        ReplCommand::History => {
            for turn in session.chat_history() {
                let who = match turn.role {
                    Role::User => "You",
                    Role::Assistant => "Assistant",
                };
                println!("  [{}] {who} > {}", turn.timestamp.format("%H:%M:%S"), turn.content);
            }
        }
        ReplCommand::Reset => {
            session.reset();
            println!("  ✅ Started a new session");
        }
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Invalid(message) => return Err(message.into()),
        ReplCommand::Exit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawdesk_core::StatuteSummary;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse_command("  契約を解除できますか？ "),
            ReplCommand::Ask("契約を解除できますか？".into())
        );
        assert_eq!(parse_command("quit"), ReplCommand::Exit);
        assert_eq!(parse_command("/exit"), ReplCommand::Exit);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(
            parse_command("/upload ~/docs/賃貸 契約.pdf"),
            ReplCommand::Upload(PathBuf::from("~/docs/賃貸 契約.pdf"))
        );
        assert_eq!(parse_command("/select a.md"), ReplCommand::Select("a.md".into()));
        assert_eq!(parse_command("/fetch 3"), ReplCommand::Fetch("3".into()));
        assert_eq!(
            parse_command("/laws 2"),
            ReplCommand::Laws(Some(LawCategory::ConstitutionAndStatutes))
        );
        assert_eq!(parse_command("/laws"), ReplCommand::Laws(None));
        assert_eq!(
            parse_command("/model gemini-pro"),
            ReplCommand::Model(Some(ChatModel::GeminiPro))
        );
        assert_eq!(parse_command("/model"), ReplCommand::Model(None));
        assert_eq!(
            parse_command("/system 条文番号を必ず示してください。"),
            ReplCommand::System(Some("条文番号を必ず示してください。".into()))
        );
        assert_eq!(parse_command("/system"), ReplCommand::System(None));
    }

    #[test]
    fn invalid_commands() {
        assert!(matches!(parse_command("/laws 9"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/select"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/frobnicate"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/model gpt-4o"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn fetch_resolves_list_numbers() {
        let mut session = Session::default();
        session.replace_statute_list(vec![
            StatuteSummary {
                id: "321CONSTITUTION".into(),
                name: "日本国憲法".into(),
                number: "昭和二十一年憲法".into(),
            },
            StatuteSummary {
                id: "129AC0000000089".into(),
                name: "民法".into(),
                number: "明治二十九年法律第八十九号".into(),
            },
        ]);

        assert_eq!(resolve_statute_id(&session, "2"), "129AC0000000089");
        assert_eq!(resolve_statute_id(&session, "0"), "0");
        assert_eq!(resolve_statute_id(&session, "7"), "7");
        assert_eq!(resolve_statute_id(&session, "140AC0000000045"), "140AC0000000045");
    }
}
