use std::path::{Path, PathBuf};

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio::sync::mpsc;
use weaver_upload_host::resolver::detect_mime;
use weaver_upload_host::{
    Config, Coords, DataUrlResolver, DirectoryResolver, DropEvent, EditorState, FileHandle,
    ImageUploader, InteractionContext, Node, Resolver, SharedView, UploadSettings,
};

mod telemetry;

#[derive(Parser)]
#[command(version, about = "Drop image files into a document and resolve their placeholders", long_about = None)]
struct Cli {
    /// Image files to drop into the document
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON settings file (placeholder_src, accepted_types)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Store files in this directory instead of inlining them as data URLs
    #[arg(long)]
    store: Option<PathBuf>,

    /// Text of the paragraph the files are dropped into
    #[arg(long, default_value = "")]
    text: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    telemetry::init(telemetry::TelemetryConfig::from_env());

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => UploadSettings::load(path)?,
        None => UploadSettings::default(),
    };
    let files = read_files(&cli.files).await?;

    match cli.store {
        Some(dir) => drop_files(settings, DirectoryResolver::new(dir), &cli.text, files).await,
        None => drop_files(settings, DataUrlResolver, &cli.text, files).await,
    }
}

async fn read_files(paths: &[PathBuf]) -> Result<Vec<FileHandle>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path).await.into_diagnostic()?;
        let mut file = FileHandle::new(file_name(path), "", data);
        file.mime_type = detect_mime(&file).into();
        files.push(file);
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn drop_files(
    settings: UploadSettings,
    resolver: impl Resolver,
    text: &str,
    files: Vec<FileHandle>,
) -> Result<()> {
    let expected = files.iter().filter(|f| settings.accepts(&f.mime_type)).count();
    for file in files.iter().filter(|f| !settings.accepts(&f.mime_type)) {
        tracing::warn!(name = %file.name, mime_type = %file.mime_type, "file type not accepted, skipping");
    }

    let (tx, mut reports) = mpsc::unbounded_channel();
    let plugin = ImageUploader::new(Config::new(resolver).with_settings(settings).with_reports(tx));

    let paragraph = if text.is_empty() {
        Node::paragraph(Vec::new())
    } else {
        Node::paragraph(vec![Node::text(text)])
    };
    // Every drop lands at the end of the paragraph.
    let end = paragraph.content_size() + 1;
    let view = SharedView::new(EditorState::new(Node::doc(vec![paragraph]))).with_coords(move |_| Some(end));

    let mut ctx = InteractionContext::new();
    plugin.handle_focus(&mut ctx, &view);
    if !plugin.handle_drop(&mut ctx, &view, DropEvent::new(files, Coords::new(0.0, 0.0))) {
        return Err(miette::miette!("drop was not handled"));
    }
    println!("pending:  {}", view.doc().outline());

    for _ in 0..expected {
        let Some(report) = reports.recv().await else {
            break;
        };
        println!("{report}");
    }

    println!("resolved: {}", view.doc().outline());
    Ok(())
}

fn init_miette() {
    if let Err(e) = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    })) {
        eprintln!("couldn't set the miette hook: {e}");
    }
    miette::set_panic_hook();
}
