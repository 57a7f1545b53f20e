//! Command-line arguments and command handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};

use swallow_lib::extractor::{self, matches_student_id};
use swallow_lib::scraper::ProgressEvent;
use swallow_lib::templates::{TemplateOrigin, ALL_TEMPLATE};
use swallow_lib::{
    input_loader, output, Categories, Extractor, HttpFetcher, Job, ScrapeConfig, Scraper,
    SessionState, SwallowError, TemplateStore,
};

#[derive(Parser, Debug)]
#[command(
    name = "swallow",
    version,
    about = "Collect emails, Chinese mobile numbers and student IDs from web pages"
)]
pub struct Cli {
    /// Enable verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Template file (defaults to ~/.student_id_templates.json)
    #[arg(long, global = true, env = "SWALLOW_TEMPLATE_FILE", value_name = "PATH")]
    pub template_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one URL or a batch file of URLs and extract contacts
    Scrape(ScrapeArgs),

    /// Manage student-ID templates
    Template {
        #[command(subcommand)]
        action: TemplateCommand,
    },
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Single URL to scrape
    #[arg(long, conflicts_with = "batch", required_unless_present = "batch")]
    pub url: Option<String>,

    /// Text file with one URL per line
    #[arg(long, value_name = "FILE")]
    pub batch: Option<PathBuf>,

    /// Do not extract emails
    #[arg(long)]
    pub no_email: bool,

    /// Do not extract phone numbers
    #[arg(long)]
    pub no_phone: bool,

    /// Extract student IDs
    #[arg(long)]
    pub student_ids: bool,

    /// Student-ID template to use (see `template list`)
    #[arg(long, value_name = "NAME")]
    pub template: Option<String>,

    /// Custom student-ID regular expression; overrides --template
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Save results under <DIR>/Output
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Print every unique result when done
    #[arg(long)]
    pub print: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Re-check the collected sets and report their counts
    #[arg(long)]
    pub dedupe_report: bool,

    /// Skip the network check before fetching
    #[arg(long)]
    pub skip_connectivity_check: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// List every template
    List,

    /// Print one template's pattern
    Show { name: String },

    /// Save a pattern under a name
    Save { name: String, pattern: String },

    /// Remove a saved template
    Remove { name: String },

    /// Check whether a candidate ID fully matches a pattern
    Test {
        candidate: String,

        #[arg(long, value_name = "NAME", conflicts_with = "pattern")]
        template: Option<String>,

        #[arg(long, value_name = "REGEX")]
        pattern: Option<String>,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let mut config = ScrapeConfig::default();
        if let Some(path) = self.template_file {
            config.template_file = path;
        }

        match self.command {
            Command::Scrape(args) => scrape(args, config),
            Command::Template { action } => template(action, &config),
        }
    }
}

fn scrape(args: ScrapeArgs, mut config: ScrapeConfig) -> Result<()> {
    if let Some(secs) = args.timeout {
        config.fetch_timeout = Duration::from_secs(secs);
    }

    let categories = Categories {
        email: !args.no_email,
        phone: !args.no_phone,
        student_id: args.student_ids,
    };
    if categories.is_empty() {
        bail!(SwallowError::NoCategory);
    }

    let extractor = if categories.student_id {
        let store = TemplateStore::load(&config.template_file);
        let pattern =
            student_id_pattern(&store, args.template.as_deref(), args.pattern.as_deref())?;
        info!("Student ID pattern: {}", pattern);
        Extractor::with_student_id_pattern(&pattern)
    } else {
        Extractor::new()
    };

    let urls = match (&args.url, &args.batch) {
        (Some(url), _) => {
            input_loader::validate_url(url)?;
            vec![url.trim().to_string()]
        }
        (None, Some(path)) => input_loader::load_urls(path)
            .with_context(|| format!("Failed to read batch file {:?}", path))?,
        (None, None) => bail!(SwallowError::NoUrls),
    };
    if urls.is_empty() {
        bail!(SwallowError::NoUrls);
    }

    let fetcher = HttpFetcher::new(&config)?;
    let scraper = Scraper::new(Box::new(fetcher), extractor, categories);
    scraper.preflight(!args.skip_connectivity_check)?;

    let handle = Job::spawn(scraper, SessionState::new(), urls);
    let cancel = handle.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || {
        cancel.store(true, std::sync::atomic::Ordering::SeqCst);
    }) {
        warn!("Ctrl-C will not stop the run gracefully: {}", e);
    }

    for event in handle.events() {
        if let ProgressEvent::UrlProcessed(report) = event {
            let counts: Vec<String> = report
                .categories
                .iter()
                .map(|c| match &c.error {
                    Some(_) => format!("{}: error", c.category.plural()),
                    None => format!(
                        "{}: {} (+{})",
                        c.category.plural(),
                        c.found,
                        c.new_items.len()
                    ),
                })
                .collect();
            println!("{}  {}", report.url, counts.join(", "));
        }
    }

    let (mut state, summary) = handle.join()?;

    if args.dedupe_report {
        for count in state.manual_dedupe() {
            println!(
                "{}: {} before dedupe, {} after",
                count.category.plural(),
                count.before,
                count.after
            );
        }
    }

    if args.print {
        for category in categories.enabled() {
            println!("# {}", category.plural());
            for item in state.set(category).sorted() {
                println!("{}", item);
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} URLs: {} processed, {} skipped{}",
            summary.total_urls,
            summary.processed,
            summary.skipped,
            if summary.cancelled { ", cancelled" } else { "" }
        );
        println!(
            "unique emails: {}, phone numbers: {}, student IDs: {}",
            summary.unique_emails, summary.unique_phones, summary.unique_student_ids
        );
    }

    if let Some(dir) = args.output {
        match output::save_results(&state, &dir) {
            Ok(files) => {
                for file in files {
                    println!("saved {}", file.display());
                }
            }
            Err(SwallowError::NothingToSave) => warn!("No results to save"),
            Err(e) => error!("Failed to save results: {}", e),
        }
    }

    Ok(())
}

/// Custom pattern first, then the named template, then the composite.
fn student_id_pattern(
    store: &TemplateStore,
    template: Option<&str>,
    custom: Option<&str>,
) -> Result<String> {
    if let Some(custom) = custom.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(custom.to_string());
    }
    let name = template.unwrap_or(ALL_TEMPLATE);
    store
        .select(name)
        .map(str::to_string)
        .ok_or_else(|| SwallowError::UnknownTemplate(name.to_string()).into())
}

fn template(action: TemplateCommand, config: &ScrapeConfig) -> Result<()> {
    let mut store = TemplateStore::load(&config.template_file);

    match action {
        TemplateCommand::List => {
            for name in store.names() {
                let origin = match store.origin(name) {
                    Some(TemplateOrigin::BuiltIn) | None => "built-in",
                    Some(TemplateOrigin::Modified) => "modified",
                    Some(TemplateOrigin::User) => "user",
                };
                let pattern = store.select(name).unwrap_or_default();
                println!("{:<16} {:<9} {}", name, origin, pattern);
            }
        }
        TemplateCommand::Show { name } => match store.select(&name) {
            Some(pattern) => println!("{}", pattern),
            None => bail!(SwallowError::UnknownTemplate(name)),
        },
        TemplateCommand::Save { name, pattern } => {
            store.save(&name, &pattern)?;
            println!("Template '{}' saved to {:?}", name.trim(), store.path());
        }
        TemplateCommand::Remove { name } => {
            store.remove(&name)?;
            println!("Template '{}' removed", name);
        }
        TemplateCommand::Test {
            candidate,
            template,
            pattern,
        } => {
            let pattern = match (pattern, template) {
                (Some(p), _) => {
                    extractor::validate_pattern(&p)?;
                    Some(p)
                }
                (None, Some(name)) => Some(
                    store
                        .select(&name)
                        .map(str::to_string)
                        .ok_or(SwallowError::UnknownTemplate(name))?,
                ),
                (None, None) => None,
            };
            let candidate = candidate.trim();
            if matches_student_id(candidate, pattern.as_deref())? {
                println!("'{}' matches the {} pattern", candidate, label(&pattern));
            } else {
                println!("'{}' does not match the {} pattern", candidate, label(&pattern));
            }
        }
    }
    Ok(())
}

fn label(pattern: &Option<String>) -> &'static str {
    if pattern.is_some() {
        "selected"
    } else {
        "composite"
    }
}
