use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::llm::Role;
use crate::session::{Session, SessionReply};

/// Dispatches terminal input to the session: `ingest`, `clear`, `help`, or
/// a free-text question. Everything renders the full history afterwards;
/// the turn log is state, not a stream.
pub struct CommandHandler {
    session: Session,
}

impl CommandHandler {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        let input = input.trim();

        match input.to_lowercase().as_str() {
            "" => Ok(()),
            "help" => {
                self.print_help();
                Ok(())
            }
            "ingest" => self.handle_ingest().await,
            "clear" => {
                self.session.clear();
                println!("{}", "🧹 Chat history cleared.".cyan());
                self.render_history();
                Ok(())
            }
            _ => self.handle_submission(input).await,
        }
    }

    async fn handle_ingest(&mut self) -> Result<(), String> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(120));
        spinner.set_message("Ingesting documents...");

        let result = self.session.ingest().await;
        spinner.finish_and_clear();

        match result {
            Ok(summary) => {
                println!(
                    "{}",
                    format!(
                        "📚 Documents ingested successfully! ({} documents, {} chunks)",
                        summary.documents, summary.chunks
                    )
                    .green()
                );
                Ok(())
            }
            Err(e) => Err(format!("Ingestion failed: {}", e)),
        }
    }

    async fn handle_submission(&mut self, input: &str) -> Result<(), String> {
        match self.session.submit(input).await {
            SessionReply::Empty => {}
            SessionReply::Farewell => {
                println!("{}", "Exiting the chat. Goodbye!".yellow());
            }
            SessionReply::Answer(_) => {
                self.render_history();
            }
            SessionReply::Failure(message) => {
                println!("{}", message.red());
            }
        }
        Ok(())
    }

    fn render_history(&self) {
        println!();
        for turn in self.session.history() {
            match turn.role {
                Role::User => println!("{} {}", "👤".cyan(), turn.content.cyan()),
                Role::Assistant => {
                    println!("{} {}", "🤖", turn.content.truecolor(255, 236, 179));
                }
            }
        }
        println!();
    }

    fn print_help(&self) {
        println!("\n📖 Knowledge Agent Commands:");
        println!("  ingest       - (Re)ingest documents from the data directory");
        println!("  clear        - Clear the chat history");
        println!("  help         - Show this menu");
        println!("  exit         - Say goodbye (Ctrl-C or Ctrl-D quits)");
        println!("  <anything>   - Ask a question about the ingested documents\n");
    }
}
