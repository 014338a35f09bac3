use anyhow::{Context, Result};
use bytes::Bytes;
use echonote::preview::PreviewFile;
use echonote::{
    ApiError, CaptureHandle, Config, ConfigManager, DEFAULT_LOG_LEVEL, GENERIC_UPLOAD_ERROR,
    Language, NoteRecord, NotesClient, Recorder, RecorderSession, TranscriptionReply,
    UnknownLanguage, UploadCoordinator, UploadOutcome, VERSION, format_elapsed, probe_wav,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ECHONOTE_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .init();

    // Load config
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;

    info!(version = VERSION, api_url = config.api_url(), "echonote starting");

    let client = NotesClient::new(config.api_url(), config.request_timeout())?;
    let mut app = App::new(&config, client);
    app.run().await
}

enum Action {
    Done,
    Recording,
    Quit,
}

struct App {
    session: RecorderSession,
    recorder: Recorder,
    capture: Option<CaptureHandle>,
    preview: Option<PreviewFile>,
    coordinator: UploadCoordinator<NotesClient>,
    client: NotesClient,
    language: Language,
}

impl App {
    fn new(config: &Config, client: NotesClient) -> Self {
        Self {
            session: RecorderSession::new(),
            recorder: Recorder::new(),
            capture: None,
            preview: None,
            coordinator: UploadCoordinator::new(client.clone()),
            client,
            language: config.language(),
        }
    }

    async fn run(&mut self) -> Result<()> {
        print_help();

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read stdin")? else {
                        break;
                    };
                    match self.handle_command(line.trim()).await {
                        Action::Quit => break,
                        // Align the first tick with the start of the take.
                        Action::Recording => ticker.reset(),
                        Action::Done => {}
                    }
                }
                _ = ticker.tick(), if self.session.is_recording() => {
                    self.on_tick();
                }
            }
        }

        self.teardown();
        Ok(())
    }

    async fn handle_command(&mut self, line: &str) -> Action {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Action::Done;
        };
        let args: Vec<&str> = parts.collect();

        match command {
            "record" | "r" => {
                if self.cmd_record() {
                    return Action::Recording;
                }
            }
            "stop" | "s" => self.cmd_stop(),
            "upload" | "u" => match self.parse_language(args.first()) {
                Ok(language) => self.cmd_upload(language).await,
                Err(e) => println!("{e}. Supported: en, zh, yue."),
            },
            "file" | "f" => match args.split_first() {
                Some((path, rest)) => match self.parse_language(rest.first()) {
                    Ok(language) => self.cmd_upload_file(path, language).await,
                    Err(e) => println!("{e}. Supported: en, zh, yue."),
                },
                None => println!("Usage: file <path> [language]"),
            },
            "notes" | "n" => self.cmd_notes().await,
            "search" => self.cmd_search(&args.join(" ")).await,
            "test" | "t" => match self.parse_language(args.first()) {
                Ok(language) => self.cmd_test(language).await,
                Err(e) => println!("{e}. Supported: en, zh, yue."),
            },
            "lang" | "l" => match args.first() {
                Some(code) => self.cmd_language(code),
                None => println!(
                    "Current language: {} ({}).",
                    self.language.display_name(),
                    self.language
                ),
            },
            "help" | "h" | "?" => print_help(),
            "quit" | "exit" | "q" => return Action::Quit,
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
        Action::Done
    }

    fn parse_language(&self, arg: Option<&&str>) -> std::result::Result<Language, UnknownLanguage> {
        match arg {
            Some(code) => code.parse(),
            None => Ok(self.language),
        }
    }

    /// Returns true when a new take actually started.
    fn cmd_record(&mut self) -> bool {
        if self.session.is_recording() {
            println!("Already recording.");
            return false;
        }
        // Release the previous take's preview before a new one begins.
        self.preview.take();
        match self.recorder.start() {
            Ok(handle) => {
                self.capture = Some(handle);
                self.session.begin();
                println!("Recording... type 'stop' to finish.");
                true
            }
            Err(e) => {
                error!(error = %e, "failed to start recording");
                println!("Could not access the microphone. Check your input device and permissions.");
                false
            }
        }
    }

    fn cmd_stop(&mut self) {
        let Some(capture) = self.capture.take() else {
            println!("Not recording.");
            return;
        };
        // finish() releases the device and hands back the tail of the take.
        for chunk in capture.finish() {
            self.session.push_chunk(chunk);
        }
        self.session.finish();

        match self.session.blob() {
            Some(blob) if !blob.is_empty() => {
                println!(
                    "Recording complete ({}). Ready to upload.",
                    format_elapsed(self.session.elapsed_secs())
                );
                let filename = format!("echonote-preview-{}.wav", std::process::id());
                match PreviewFile::write(blob, &filename) {
                    Ok(preview) => {
                        println!("Preview: {}", preview.path().display());
                        self.preview = Some(preview);
                    }
                    Err(e) => warn!("failed to write preview: {e:#}"),
                }
            }
            _ => println!("Recording finished but no audio was captured."),
        }
    }

    async fn cmd_upload(&mut self, language: Language) {
        if self.session.is_recording() {
            println!("Stop the recording before uploading.");
            return;
        }
        println!("Uploading recording with language: {language}...");
        match self.coordinator.upload(&self.session, language).await {
            Ok(UploadOutcome::Success(reply)) => print_reply(&reply, language),
            Ok(UploadOutcome::Failure { message }) => println!("{message}"),
            // upload resolves before returning; Pending is only observable mid-flight
            Ok(UploadOutcome::Pending) => {}
            Err(ApiError::NoRecording) => println!("No audio recorded yet."),
            Err(ApiError::Busy) => println!("An upload is already in progress."),
            Err(e) => {
                error!(error = %e, "upload error");
                println!("{GENERIC_UPLOAD_ERROR}");
            }
        }
    }

    async fn cmd_upload_file(&self, path: &str, language: Language) {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                println!("Could not read {path}: {e}");
                return;
            }
        };
        let filename = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.wav")
            .to_string();
        if let Some(info) = probe_wav(&data) {
            info!(
                channels = info.channels,
                sample_rate = info.sample_rate,
                duration_secs = info.duration_secs,
                "probed audio file"
            );
        }

        println!("Uploading {filename} with language: {language}...");
        match self
            .client
            .upload_audio(Bytes::from(data), &filename, language)
            .await
        {
            Ok(reply) => print_reply(&reply, language),
            Err(e) => {
                error!(error = %e, "file upload failed");
                println!("Upload failed. Please check the file or try again.");
            }
        }
    }

    async fn cmd_notes(&self) {
        match self.client.notes().await {
            Ok(notes) if notes.is_empty() => {
                println!("No transcriptions found. Try recording or uploading audio.");
            }
            Ok(notes) => render_notes(&notes),
            Err(e) => {
                error!(error = %e, "failed to fetch notes");
                println!("Failed to load notes. Please try again later.");
            }
        }
    }

    async fn cmd_search(&self, query: &str) {
        if query.trim().is_empty() {
            println!("Please enter a search term.");
            return;
        }
        match self.client.search(query).await {
            Ok(results) if results.is_empty() => {
                println!("No results found for \"{query}\".");
            }
            Ok(results) => {
                println!("{} matching transcription(s):", results.len());
                render_notes(&results);
            }
            Err(e) => {
                error!(error = %e, "search failed");
                println!("Search failed. Please try again later.");
            }
        }
    }

    async fn cmd_test(&self, language: Language) {
        println!("Running test transcription for {}...", language.display_name());
        match self.client.test_transcription(language).await {
            Ok(payload) => match serde_json::to_string_pretty(&payload) {
                Ok(pretty) => println!("{pretty}"),
                Err(_) => println!("{payload}"),
            },
            Err(e) => {
                error!(error = %e, "test transcription failed");
                println!("Failed to run test transcription. Is the backend running?");
            }
        }
    }

    fn cmd_language(&mut self, code: &str) {
        match code.parse::<Language>() {
            Ok(language) => {
                self.language = language;
                println!("Language set to {} ({language}).", language.display_name());
            }
            Err(e) => println!("{e}. Supported: en, zh, yue."),
        }
    }

    fn on_tick(&mut self) {
        self.session.tick();
        if let Some(capture) = &mut self.capture {
            for chunk in capture.drain() {
                self.session.push_chunk(chunk);
            }
        }
        println!("  recording {}", format_elapsed(self.session.elapsed_secs()));
    }

    fn teardown(&mut self) {
        // Quitting mid-take must not leak the stream, the timer, or the
        // preview file.
        self.capture.take();
        self.preview.take();
        self.session.reset();
        info!("echonote shut down");
    }
}

fn print_reply(reply: &TranscriptionReply, language: Language) {
    println!("Transcription:");
    println!("{}", reply.transcription);
    if language != Language::En {
        if let Some(translation) = reply.translation.as_deref() {
            println!("English translation:");
            println!("{translation}");
        }
    }
    if let Some(summary) = reply.summary.as_deref() {
        println!("Summary:");
        println!("{summary}");
    }
}

fn render_notes(notes: &[NoteRecord]) {
    for note in notes {
        println!(
            "#{} {} [{}] {}",
            note.id, note.filename, note.language, note.created_at
        );
        let text = if note.transcription_text.is_empty() {
            "No transcription available."
        } else {
            &note.transcription_text
        };
        let mut preview: String = text.chars().take(120).collect();
        if preview.len() < text.len() {
            preview.push('…');
        }
        println!("    {preview}");
    }
}

fn print_help() {
    println!("echonote {VERSION} — voice notes with transcription");
    println!();
    println!("  record              start recording from the default microphone");
    println!("  stop                stop recording and keep the take for upload");
    println!("  upload [lang]       send the finished recording for transcription");
    println!("  file <path> [lang]  upload an audio file from disk");
    println!("  notes               list stored transcriptions");
    println!("  search <query>      keyword search over transcriptions");
    println!("  test [lang]         run the backend's sample transcription check");
    println!("  lang [code]         show or set the default language (en, zh, yue)");
    println!("  quit                exit");
}
