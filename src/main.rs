//! Line-oriented driver for local experimentation.
//!
//! Reads one message per line from stdin and prints the reply. Lines
//! starting with `:` are driver commands:
//!
//! - `:items` lists the project's canonical items
//! - `:move <item-id> <state>` changes an item's state
//! - `:quit` exits
//!
//! Usage: `brainstorm-core [project-id] [project title...]`

use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use brainstorm_core::adapters::ai::{AnthropicConfig, AnthropicProvider, MockAIProvider};
use brainstorm_core::adapters::quality::LexicalQualityChecker;
use brainstorm_core::adapters::storage::{FileItemStore, InMemoryItemStore};
use brainstorm_core::application::{
    HandleMessageCommand, HandleMessageHandler, HandleMessageResult, ProjectLocks,
    ReconcileCandidatesHandler, TransitionItemStateCommand, TransitionItemStateHandler,
};
use brainstorm_core::config::{AiConfig, AiProvider, AppConfig, StorageConfig};
use brainstorm_core::domain::conversation::ConversationTurn;
use brainstorm_core::domain::foundation::{ItemId, ProjectId};
use brainstorm_core::domain::item::ItemState;
use brainstorm_core::domain::reconciliation::ReconciliationEngine;
use brainstorm_core::ports::{AIProvider, ItemStore};
use brainstorm_core::telemetry::init_telemetry;

const DEFAULT_TITLE: &str = "Untitled project";

struct App {
    project_id: ProjectId,
    project_title: String,
    store: Arc<dyn ItemStore>,
    messages: HandleMessageHandler,
    transitions: TransitionItemStateHandler,
    history: Vec<ConversationTurn>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_telemetry(&config.logging);
    config.validate()?;

    let mut args = std::env::args().skip(1);
    let project_id = match args.next() {
        Some(raw) => raw.parse::<ProjectId>()?,
        None => ProjectId::new(),
    };
    let title: Vec<String> = args.collect();
    let project_title = if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.join(" ")
    };

    let mut app = App::build(&config, project_id, project_title)?;
    tracing::info!(
        project_id = %app.project_id,
        persistent = config.storage.is_persistent(),
        "driver started"
    );

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("project {}\n", app.project_id).as_bytes())
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }

        let output = app.dispatch(line).await;
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}

impl App {
    fn build(
        config: &AppConfig,
        project_id: ProjectId,
        project_title: String,
    ) -> Result<Self, Box<dyn Error>> {
        let ai = build_ai(&config.ai)?;
        let store = build_store(&config.storage);
        let locks = Arc::new(ProjectLocks::new());

        let reconcile = ReconcileCandidatesHandler::new(
            store.clone(),
            locks.clone(),
            ReconciliationEngine::new(config.similarity),
        )
        .with_quality_checker(Arc::new(LexicalQualityChecker::new(config.similarity)));

        Ok(Self {
            project_id,
            project_title,
            messages: HandleMessageHandler::new(ai, store.clone(), reconcile),
            transitions: TransitionItemStateHandler::new(store.clone(), locks)
                .with_policy(config.similarity),
            store,
            history: Vec::new(),
        })
    }

    async fn dispatch(&mut self, line: &str) -> String {
        match line.strip_prefix(':') {
            Some(command) => self.run_command(command).await,
            None => self.send(line).await,
        }
    }

    async fn send(&mut self, message: &str) -> String {
        let cmd = HandleMessageCommand {
            project_id: self.project_id,
            project_title: self.project_title.clone(),
            message: message.to_string(),
            history: self.history.clone(),
        };

        match self.messages.handle(cmd).await {
            Ok(result) => {
                self.history.push(ConversationTurn::user(message));
                self.history.push(ConversationTurn::assistant(result.reply.as_str()));
                render(&result)
            }
            Err(err) => format!("error [{}]: {}", err.code(), err),
        }
    }

    async fn run_command(&self, command: &str) -> String {
        let parts: Vec<&str> = command.split_whitespace().collect();
        match parts.as_slice() {
            ["items"] => self.list_items().await,
            ["move", id, state] => self.move_item(id, state).await,
            _ => "commands: :items, :move <item-id> <state>, :quit".to_string(),
        }
    }

    async fn list_items(&self) -> String {
        match self.store.get_items(self.project_id).await {
            Ok(items) if items.is_empty() => "(no items)".to_string(),
            Ok(items) => items
                .iter()
                .map(|item| format!("{} [{}] {}", item.id, item.state, item.text))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(err) => format!("error: {}", err),
        }
    }

    async fn move_item(&self, id: &str, state: &str) -> String {
        let (item_id, target) = match (id.parse::<ItemId>(), state.parse::<ItemState>()) {
            (Ok(item_id), Ok(target)) => (item_id, target),
            (Err(err), _) => return format!("error: {}", err),
            (_, Err(err)) => return format!("error: {}", err),
        };

        let cmd = TransitionItemStateCommand {
            project_id: self.project_id,
            item_id,
            target,
        };
        match self.transitions.handle(cmd).await {
            Ok(result) => format!(
                "{}: {} -> {}",
                result.item.text, result.previous_state, result.item.state
            ),
            Err(err) => format!("error [{}]: {}", err.code(), err),
        }
    }
}

fn build_ai(config: &AiConfig) -> Result<Arc<dyn AIProvider>, Box<dyn Error>> {
    let ai = connect_ai(config)?;
    let info = ai.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "language model ready");
    Ok(ai)
}

fn connect_ai(config: &AiConfig) -> Result<Arc<dyn AIProvider>, Box<dyn Error>> {
    match config.provider {
        AiProvider::Mock => Ok(Arc::new(MockAIProvider::new())),
        AiProvider::Anthropic => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .ok_or("missing Anthropic API key")?;
            let mut anthropic = AnthropicConfig::new(api_key)
                .with_model(config.model.as_str())
                .with_base_url(config.base_url.as_str())
                .with_timeout(config.timeout())
                .with_max_retries(config.max_retries);
            if let Some(cap) = config.max_tokens {
                anthropic = anthropic.with_max_tokens_cap(cap);
            }
            Ok(Arc::new(AnthropicProvider::new(anthropic)?))
        }
    }
}

fn build_store(config: &StorageConfig) -> Arc<dyn ItemStore> {
    match &config.data_dir {
        Some(dir) => Arc::new(FileItemStore::new(dir)),
        None => Arc::new(InMemoryItemStore::new()),
    }
}

fn render(result: &HandleMessageResult) -> String {
    let mut out = format!("[{}] {}", result.mode, result.reply);

    for item in &result.committed {
        out.push_str(&format!("\n  + {} ({})", item.text, item.state));
    }
    for dropped in &result.dropped {
        out.push_str(&format!(
            "\n  - dropped \"{}\" ({:.0}% like {})",
            dropped.text,
            dropped.similarity * 100.0,
            dropped.duplicate_of
        ));
    }
    for found in &result.matches {
        out.push_str(&format!(
            "\n  ~ {} {:.2} {}",
            found.canonical_item_id, found.similarity, found.recommendation
        ));
    }
    if let Some(report) = &result.quality {
        if !report.is_clean() {
            out.push_str(&format!(
                "\n  ! {} assumption(s), {} conflict(s)",
                report.assumption_count(),
                report.conflict_count()
            ));
        }
    }

    out
}
