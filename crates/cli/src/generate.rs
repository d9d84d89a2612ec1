//! The `generate` command.

use std::path::{Path, PathBuf};

use clap::Args;
use discogen_core::discovery::DISCOVERY_ROOT;
use discogen_core::{DirectoryList, RestDescription, generate_from};
use rayon::prelude::*;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::compile::cargo_build;
use crate::directory::{ALL_APIS, select_apis};
use crate::fetch::Fetcher;
use crate::output::{CrateLayout, WriteResult, crate_manifest, write_file_if_changed};
use crate::run_cli_async;

/// Flags of `discogen generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// API id to generate, e.g. "tasks:v1", or "*" for every API
    #[arg(long, default_value = ALL_APIS)]
    pub api: String,

    /// Root directory for generated crates
    #[arg(long, value_name = "DIR", default_value = "gen")]
    pub gendir: PathBuf,

    /// Always download documents, neither reading nor writing the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Generate from local discovery documents instead of the directory
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Run `cargo build` in each generated crate
    #[arg(long)]
    pub build: bool,

    /// Local path of the runtime crate referenced by generated manifests
    #[arg(long, value_name = "DIR")]
    pub runtime_path: Option<PathBuf>,

    /// Discovery directory endpoint
    #[arg(long, value_name = "URL", default_value = DISCOVERY_ROOT)]
    pub directory_url: String,
}

/// A discovery document waiting to be generated.
#[derive(Debug, Clone)]
pub struct Source {
    /// API id, or the file path for local documents
    pub id: String,
    /// Document text
    pub json: String,
}

/// A successfully written client crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedApi {
    /// API id from the document
    pub id: String,
    /// Crate directory
    pub dir: PathBuf,
    /// Whether any file was rewritten
    pub changed: bool,
}

/// Outcome of one `generate` run. Failures don't stop other APIs.
#[derive(Debug, Default)]
pub struct Report {
    /// Crates written, in source order
    pub generated: Vec<GeneratedApi>,
    /// One message per failed API
    pub failures: Vec<String>,
}

impl Report {
    fn into_result(self) -> Result<(), String> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self.failures.join("\n"))
        }
    }
}

/// Run the command, printing one line per generated API.
pub async fn run(args: GenerateArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: GenerateArgs) -> Result<(), String> {
    let fetcher = Fetcher::from_env(!args.no_cache);
    let report = generate(&args, &fetcher).await?;
    for api in &report.generated {
        let status = if api.changed { "generated" } else { "unchanged" };
        println!("{} {status} in {}", api.id, api.dir.display());
    }
    report.into_result()
}

/// Collect sources, generate every API and optionally build the results.
///
/// Errors that prevent any work (unreadable directory, no matching API)
/// return `Err`; per-API failures land in [`Report::failures`].
pub async fn generate(args: &GenerateArgs, fetcher: &Fetcher) -> Result<Report, String> {
    let mut report = Report::default();

    let sources = if args.files.is_empty() {
        fetch_sources(args, fetcher, &mut report.failures).await?
    } else {
        read_sources(&args.files, &mut report.failures)
    };

    let runtime_path = args
        .runtime_path
        .as_deref()
        .map(std::path::absolute)
        .transpose()
        .map_err(|e| format!("Invalid runtime path: {e}"))?;
    let gendir = args.gendir.clone();

    let results = tokio::task::spawn_blocking(move || {
        sources
            .par_iter()
            .map(|source| {
                generate_one(source, &gendir, runtime_path.as_deref())
                    .map_err(|err| format!("API {} failed to generate code: {err}", source.id))
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| format!("Generation task failed: {e}"))?;

    for result in results {
        match result {
            Ok(api) => report.generated.push(api),
            Err(err) => report.failures.push(err),
        }
    }

    if args.build {
        for api in &report.generated {
            if let Err(err) = cargo_build(&api.dir).await {
                report
                    .failures
                    .push(format!("API {} failed to compile: {err}", api.id));
            }
        }
    }

    Ok(report)
}

async fn fetch_sources(
    args: &GenerateArgs,
    fetcher: &Fetcher,
    failures: &mut Vec<String>,
) -> Result<Vec<Source>, String> {
    let listing = fetcher.fetch(&args.directory_url).await?;
    let list = DirectoryList::from_json(&listing)
        .map_err(|e| format!("Failed to decode API directory: {e}"))?;
    let items = select_apis(list, &args.api)?;
    debug!(count = items.len(), "Selected APIs");

    let mut tasks = JoinSet::new();
    for item in items {
        let url = match item.discovery_url() {
            Ok(url) => url,
            Err(err) => {
                failures.push(format!("API {} failed to generate code: {err}", item.id));
                continue;
            }
        };
        let fetcher = fetcher.clone();
        tasks.spawn(async move {
            let json = fetcher.fetch(&url).await;
            (item.id, json)
        });
    }

    let mut sources = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (id, json) = joined.map_err(|e| format!("Fetch task failed: {e}"))?;
        match json {
            Ok(json) => sources.push(Source { id, json }),
            Err(err) => failures.push(format!("API {id} failed to generate code: {err}")),
        }
    }
    sources.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(sources)
}

fn read_sources(files: &[PathBuf], failures: &mut Vec<String>) -> Vec<Source> {
    let mut sources = Vec::new();
    for path in files {
        let id = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(json) => sources.push(Source { id, json }),
            Err(err) => failures.push(format!(
                "API {id} failed to generate code: failed to read file: {err}"
            )),
        }
    }
    sources
}

fn generate_one(
    source: &Source,
    gendir: &Path,
    runtime_path: Option<&Path>,
) -> Result<GeneratedApi, String> {
    let doc = RestDescription::from_json(&source.json).map_err(|e| e.to_string())?;
    let code = generate_from(&doc).map_err(|e| e.to_string())?;

    let package = doc.package();
    let layout = CrateLayout::new(gendir, &package, &doc.version);
    let description = doc
        .description
        .clone()
        .unwrap_or_else(|| doc.title.clone());
    let manifest = crate_manifest(&package, &doc.version, &description, runtime_path)?;

    let mut changed = false;
    for (path, content) in [
        (&layout.manifest, manifest.as_str()),
        (&layout.source, code.as_str()),
        (&layout.document, source.json.as_str()),
    ] {
        changed |= write_file_if_changed(path, content)? == WriteResult::Written;
    }

    info!(api = %doc.id, dir = %layout.dir.display(), changed, "Generated client");
    Ok(GeneratedApi {
        id: doc.id,
        dir: layout.dir,
        changed,
    })
}
