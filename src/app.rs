use crate::cli::{Cli, Commands, OutputFormat};
use crate::errors::SmasherError;
use crate::graph::resolver::DescendantCache;
use crate::graph::{HeaderName, IncludeGraph, ScanOptions};
use crate::query::{DescendantsQuery, HeaderCount, Query, ScoreQuery};
use crate::utils::cache::CacheMode;
use crate::utils::config::{self, Config};
use clap::CommandFactory;
use clap_complete::generate;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILENAME: &str = "foo.cpp";
pub const DEFAULT_SAVE_PATH: &str = "/tmp/deps";
pub const DEFAULT_HEADER_WIDTH: usize = 40;

/// Effective `scan` options after merging CLI flags, config file and defaults.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub include_paths: Vec<PathBuf>,
    pub exclude: Option<String>,
    pub respect_ignore: bool,
    pub headers: bool,
    pub system: bool,
    pub verbose: bool,
    pub save: bool,
    pub filename: String,
    pub save_path: PathBuf,
    pub header_width: usize,
    pub format: OutputFormat,
    pub cache_mode: CacheMode,
}

/// Scan flags as given on the command line, before merging.
#[derive(Debug, Clone, Default)]
pub struct ScanFlags {
    pub include_paths: Vec<PathBuf>,
    pub exclude: Option<String>,
    pub respect_ignore: bool,
    pub headers: bool,
    pub system: bool,
    pub verbose: bool,
    pub save: bool,
    pub filename: Option<String>,
    pub save_path: Option<PathBuf>,
    pub header_width: Option<usize>,
    pub format: Option<OutputFormat>,
    pub cache: bool,
    pub rebuild: bool,
}

impl ScanSettings {
    /// CLI wins over config, config wins over defaults; toggles are on if either sets them.
    /// Relative include paths from the config resolve against `root`.
    #[must_use]
    pub fn resolve(root: &Path, flags: ScanFlags, cfg: Option<&Config>) -> Self {
        let scan = cfg.and_then(|c| c.scan.clone()).unwrap_or_default();
        let report = cfg.and_then(|c| c.report.clone()).unwrap_or_default();

        let mut include_paths: Vec<PathBuf> = scan
            .include_paths
            .unwrap_or_default()
            .into_iter()
            .map(|p| if p.is_relative() { root.join(p) } else { p })
            .collect();
        include_paths.extend(flags.include_paths);

        let format = flags
            .format
            .or_else(|| report.default_format.as_deref().and_then(OutputFormat::from_name))
            .unwrap_or(OutputFormat::Text);

        Self {
            include_paths,
            exclude: flags.exclude.or(scan.exclude),
            respect_ignore: flags.respect_ignore || scan.respect_ignore.unwrap_or(false),
            headers: flags.headers || report.headers.unwrap_or(false),
            system: flags.system || report.system.unwrap_or(false),
            verbose: flags.verbose,
            save: flags.save,
            filename: flags
                .filename
                .or(report.filename)
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            save_path: flags
                .save_path
                .or(report.save_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH)),
            header_width: flags
                .header_width
                .or(report.header_width)
                .unwrap_or(DEFAULT_HEADER_WIDTH),
            format,
            cache_mode: CacheMode::from_flags(flags.cache, flags.rebuild),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonFile {
    path: String,
    deps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    descendants: Option<Vec<HeaderName>>,
}

#[derive(Debug, Serialize)]
struct JsonReport {
    files: Vec<JsonFile>,
    total_deps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<Vec<HeaderCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers_total_deps: Option<usize>,
}

fn load_config(root: &Path, explicit: Option<&Path>) -> Option<Config> {
    match explicit {
        Some(p) => config::load_config_at(p),
        None => config::load_config_near(root),
    }
}

fn build_graph(opts: &ScanOptions) -> Result<IncludeGraph, i32> {
    IncludeGraph::build(opts).map_err(|e| {
        eprintln!("{e}");
        1
    })
}

fn compile_exclude(pattern: Option<&str>) -> Result<Option<Regex>, SmasherError> {
    Ok(pattern.map(Regex::new).transpose()?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value).map_err(SmasherError::from) {
        Ok(s) => {
            println!("{s}");
            0
        }
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}

fn save_descendants(path: &Path, descendants: &[HeaderName]) {
    let body = descendants.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join("\n");
    if let Err(e) = fs::write(path, body) {
        eprintln!("Failed to write descendants to {}: {e}", path.display());
    }
}

/// Run the `scan` command: build the graph, score it and print the report.
///
/// Returns an exit code (0 = success).
#[must_use]
pub fn run_scan(root: &Path, settings: &ScanSettings, quiet: bool) -> i32 {
    let exclude = match compile_exclude(settings.exclude.as_deref()) {
        Ok(re) => re,
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };

    let opts = ScanOptions::new(root)
        .with_include_paths(settings.include_paths.clone())
        .with_respect_ignore(settings.respect_ignore)
        .with_cache_mode(settings.cache_mode);
    let graph = match build_graph(&opts) {
        Ok(g) => g,
        Err(code) => return code,
    };

    let mut query = ScoreQuery::new();
    if let Some(re) = exclude {
        query = query.with_exclude(re);
    }

    let json = matches!(settings.format, OutputFormat::Json);
    let mut json_descendants: Vec<(PathBuf, Vec<HeaderName>)> = Vec::new();
    let mut cache = DescendantCache::new();
    let report = query.run_with(&graph, &mut cache, |tu, _deps, descendants| {
        if settings.save && tu.file_name() == Some(settings.filename.as_str()) {
            save_descendants(&settings.save_path, descendants);
        }
        if settings.verbose {
            if json {
                json_descendants.push((tu.path.clone(), descendants.to_vec()));
            } else {
                for header in descendants {
                    println!("\t{header}");
                }
            }
        }
    });

    let headers = settings.headers.then(|| report.header_popularity(settings.system));
    let headers_total: Option<usize> =
        headers.as_ref().map(|rows| rows.iter().map(|h| h.count).sum());

    if json {
        let mut by_path: std::collections::HashMap<PathBuf, Vec<HeaderName>> =
            json_descendants.into_iter().collect();
        let out = JsonReport {
            files: report
                .files
                .iter()
                .map(|f| JsonFile {
                    path: f.path.display().to_string(),
                    deps: f.deps,
                    descendants: by_path.remove(&f.path),
                })
                .collect(),
            total_deps: report.total_deps,
            headers,
            headers_total_deps: headers_total,
        };
        return print_json(&out);
    }

    if !quiet {
        for f in &report.files {
            println!("{} {}", f.path.display(), f.deps);
        }
    }
    println!("src files total deps {}", report.total_deps);

    if let (Some(rows), Some(total)) = (headers, headers_total) {
        if !quiet {
            let width = settings.header_width;
            for row in &rows {
                println!("{:<width$} {}", row.header, row.count);
            }
        }
        println!("headers files total deps {total}");
    }
    0
}

/// Run the CLI logic in-process.
///
/// Returns an exit code (0 = success).
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = env!("CARGO_PKG_NAME");
            let mut out = io::stdout();
            generate(shell, &mut cmd, bin_name, &mut out);
            0
        }
        Commands::Scan {
            root,
            include_paths,
            config,
            filename,
            save,
            save_path,
            verbose,
            headers,
            system,
            exclude,
            respect_ignore,
            cache,
            rebuild,
            format,
            header_width,
        } => {
            if !root.is_dir() {
                eprintln!("Invalid input folder: {}", root.display());
                return 1;
            }
            let cfg = load_config(&root, config.as_deref());
            let flags = ScanFlags {
                include_paths,
                exclude,
                respect_ignore,
                headers,
                system,
                verbose,
                save,
                filename,
                save_path,
                header_width,
                format,
                cache,
                rebuild,
            };
            let settings = ScanSettings::resolve(&root, flags, cfg.as_ref());
            tracing::debug!(?settings, "scan settings");
            run_scan(&root, &settings, cli.quiet)
        }
        Commands::Descendants {
            root,
            header,
            include_paths,
            config,
            respect_ignore,
            cache,
            format,
            offset,
            limit,
        } => {
            if !root.is_dir() {
                eprintln!("Invalid input folder: {}", root.display());
                return 1;
            }
            let cfg = load_config(&root, config.as_deref());
            let flags = ScanFlags { include_paths, respect_ignore, format, cache, ..Default::default() };
            let settings = ScanSettings::resolve(&root, flags, cfg.as_ref());
            let opts = ScanOptions::new(&root)
                .with_include_paths(settings.include_paths)
                .with_respect_ignore(settings.respect_ignore)
                .with_cache_mode(settings.cache_mode);
            let graph = match build_graph(&opts) {
                Ok(g) => g,
                Err(code) => return code,
            };

            let results = DescendantsQuery::new(&header).run(&graph);
            let start = offset.min(results.len());
            let end = match limit {
                Some(l) => (start + l).min(results.len()),
                None => results.len(),
            };
            let page = &results[start..end];
            if matches!(settings.format, OutputFormat::Json) {
                return print_json(page);
            }
            if !cli.quiet {
                let rows: Vec<Vec<String>> = page
                    .iter()
                    .enumerate()
                    .map(|(i, h)| vec![format!("{}", start + i + 1), h.to_string()])
                    .collect();
                let table = crate::utils::table::render(&["#", "Header"], &rows);
                println!("{table}");
            }
            println!("{} descendants {}", DescendantsQuery::new(&header).header, results.len());
            0
        }
    }
}
