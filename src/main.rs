use knowledge_agent::commands::CommandHandler;
use knowledge_agent::config::Settings;
use knowledge_agent::database::PineconeStore;
use knowledge_agent::providers::GeminiProvider;
use knowledge_agent::session::Session;
use knowledge_agent::api;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(author, version, about = "Retrieval-augmented chat over a Pinecone collection")]
struct Args {
    /// Directory to ingest documents from (overrides DATA_DIR)
    #[arg(long)]
    data_dir: Option<String>,

    /// Serve the HTTP API instead of the interactive terminal
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    // Missing secrets are fatal; nothing downstream can work without them.
    let mut settings = Settings::from_env()?;
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }

    let provider = Arc::new(GeminiProvider::new(
        settings.google_api_key.clone(),
        settings.gemini_model.clone(),
    ));
    let store =
        Arc::new(PineconeStore::connect(&settings.pinecone_api_key, &settings.index_name).await?);

    let session = Session::new(settings, provider, store);

    if args.api {
        run_api_server(session, args.port).await
    } else {
        run_cli(session).await
    }
}

async fn run_cli(session: Session) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("{}", "🧠 Knowledge Agent Chatbot".bold());
    println!("Ingest documents into the Pinecone index and ask questions about them.\n");

    let mut command_handler = CommandHandler::new(session);
    command_handler.handle_command("help").await.ok();

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(
    session: Session,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    let app = api::create_api(session);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("API server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}
