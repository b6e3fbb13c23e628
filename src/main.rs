use meetscribe::api::recorder_routes;
use meetscribe::config::RecorderConfig;
use meetscribe::session::RecorderService;
use meetscribe::summarize::create_summarizer;
use meetscribe::transcribe::create_provider;
use tracing_subscriber::fmt::writer::MakeWriterExt as _;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing: console + rotating daily log file
    let file_appender = tracing_appender::rolling::daily(".", "meetscribe.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(file_writer.and(std::io::stdout))
        .with_target(false)
        .init();

    let config = RecorderConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let transcriber = create_provider(&config.transcribe).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-... (whisper)");
        eprintln!("  export GOOGLE_SPEECH_API_KEY=... (fallback)");
        std::process::exit(1);
    });
    let summarizer = create_summarizer(&config.summarize);

    eprintln!("🎙 meetscribe v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Transcription: {}", transcriber.name());
    eprintln!("   Summarizer: {}", summarizer.name());
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);
    eprintln!("   Health: http://0.0.0.0:{}/healthcheck\n", config.port);

    let service = RecorderService::new(transcriber, summarizer);
    let app = recorder_routes(service);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Recording server started");
    axum::serve(listener, app).await?;

    Ok(())
}
