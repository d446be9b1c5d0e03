//! Open a notebook snapshot and print where the reader should land.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use mockable::DefaultClock;
use notebooks::WorkspaceSettings;
use notebooks::domain::ports::{
    AddPageRequest, NotebookCommand, NotebookQuery, NotebookTarget,
};
use notebooks::domain::{Navigation, NavigationSession, Notebook, NotebookService, PageId, UserId};
use notebooks::outbound::{
    InMemoryIdentityDirectory, InMemoryNotebookRepository, TracingWorkspaceNotifier,
};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;

/// `notebook-nav` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "notebook-nav",
    about = "Resolve the landing page for a notebook snapshot",
    version
)]
struct CliArgs {
    /// Path to a notebook JSON snapshot.
    #[arg(long = "notebook", value_name = "path")]
    notebook_path: PathBuf,
    /// Page the reader asked for.
    #[arg(long = "page", value_name = "id")]
    page: Option<PageId>,
    /// Acting user. Defaults to the notebook owner.
    #[arg(long = "as", value_name = "user-id")]
    actor: Option<String>,
    /// Create a root page with this title when the notebook is empty.
    #[arg(long = "create-first-page", value_name = "title")]
    first_page_title: Option<String>,
}

fn main() -> io::Result<()> {
    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        tracing::warn!(%error, "tracing subscriber already installed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = WorkspaceSettings::load_from_iter([OsString::from("notebook-nav")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;

    let notebook = read_notebook(&args.notebook_path)?;
    let notebook_id = notebook.id();
    let actor = match args.actor.as_deref() {
        Some(raw) => UserId::new(raw)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?,
        None => notebook.owner_id().clone(),
    };

    let service = NotebookService::new(
        Arc::new(InMemoryNotebookRepository::with_notebooks([notebook])),
        Arc::new(InMemoryIdentityDirectory::default()),
        Arc::new(TracingWorkspaceNotifier),
        Arc::new(DefaultClock),
    )
    .with_limits(settings.limits());

    let opened = service
        .open_notebook(&actor, notebook_id, args.page)
        .await
        .map_err(|error| io::Error::other(format!("open notebook: {error}")))?;

    let mut session = NavigationSession::new();
    session
        .loaded(opened.navigation)
        .map_err(io::Error::other)?;

    let navigation = match (opened.navigation, args.first_page_title) {
        (Navigation::Empty, Some(title)) => {
            let committed = service
                .add_page(AddPageRequest {
                    target: NotebookTarget::new(actor, notebook_id)
                        .at_revision(opened.notebook.revision()),
                    title,
                    parent_id: None,
                })
                .await
                .map_err(|error| io::Error::other(format!("create first page: {error}")))?;
            session
                .page_created(committed.value.id())
                .map_err(io::Error::other)?;
            Navigation::Page(committed.value.id())
        }
        (navigation, _) => navigation,
    };

    let rendered = serde_json::to_string(&navigation)
        .map_err(|error| io::Error::other(format!("render navigation: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn read_notebook(path: &Path) -> io::Result<Notebook> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "notebook path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open notebook directory '{}': {error}",
            parent.display()
        ))
    })?;
    let raw = directory.read_to_string(Path::new(file_name)).map_err(|error| {
        io::Error::other(format!("read notebook '{}': {error}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("parse notebook '{}': {error}", path.display()),
        )
    })
}
