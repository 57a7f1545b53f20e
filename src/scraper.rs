use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info, warn};
use serde::Serialize;

use crate::config::Categories;
use crate::dedup::{Category, SessionState};
use crate::error::{Result, SwallowError};
use crate::extractor::Extractor;
use crate::fetcher::Fetch;
use crate::input_loader;

/// Per-category outcome for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub found: usize,
    pub new_items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub url: String,
    pub categories: Vec<CategoryReport>,
}

impl PageReport {
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|r| r.category == category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UrlOutcome {
    Processed(PageReport),
    Skipped { url: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_urls: usize,
    pub processed: usize,
    pub skipped: usize,
    pub cancelled: bool,
    pub unique_emails: usize,
    pub unique_phones: usize,
    pub unique_student_ids: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { total: usize },
    UrlStarted { index: usize, total: usize, url: String },
    UrlSkipped { url: String, reason: String },
    UrlProcessed(PageReport),
    Finished(RunSummary),
    Cancelled(RunSummary),
}

/// Fetches pages one at a time and folds their matches into a session.
pub struct Scraper {
    fetcher: Box<dyn Fetch + Send>,
    extractor: Extractor,
    categories: Categories,
}

impl Scraper {
    pub fn new(fetcher: Box<dyn Fetch + Send>, extractor: Extractor, categories: Categories) -> Self {
        Scraper {
            fetcher,
            extractor,
            categories,
        }
    }

    pub fn categories(&self) -> Categories {
        self.categories
    }

    /// Checks that must pass before any page is fetched.
    pub fn preflight(&self, check_connectivity: bool) -> Result<()> {
        if self.categories.is_empty() {
            return Err(SwallowError::NoCategory);
        }
        if self.categories.student_id {
            if let Some(e) = self.extractor.student_id_error() {
                warn!("Student IDs will not be extracted: {}", e);
            }
        }
        if check_connectivity {
            self.fetcher.check_connectivity()?;
        }
        Ok(())
    }

    pub fn process_url(&self, state: &mut SessionState, url: &str) -> UrlOutcome {
        if let Err(e) = input_loader::validate_url(url) {
            warn!("[{}] Skipping: {}", url, e);
            return UrlOutcome::Skipped {
                url: url.to_string(),
                reason: e.to_string(),
            };
        }

        match self.fetcher.fetch(url) {
            Ok(content) => UrlOutcome::Processed(self.process_page(state, url, &content)),
            Err(e) => {
                error!("[{}] {}", url, e);
                UrlOutcome::Skipped {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Runs every enabled category over `content`. A failing category is
    /// reported and the others still run.
    pub fn process_page(&self, state: &mut SessionState, url: &str, content: &str) -> PageReport {
        let categories = self
            .categories
            .enabled()
            .into_iter()
            .map(|category| match self.extractor.extract(category, content) {
                Ok(page) => {
                    let merge = state.record(category, page);
                    log_merge(url, category, merge.found, &merge.new_items);
                    CategoryReport {
                        category,
                        found: merge.found,
                        new_items: merge.new_items,
                        error: None,
                    }
                }
                Err(e) => {
                    error!("[{}] {} extraction failed: {}", url, category, e);
                    CategoryReport {
                        category,
                        found: 0,
                        new_items: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        PageReport {
            url: url.to_string(),
            categories,
        }
    }

    pub fn run(&self, state: &mut SessionState, urls: &[String]) -> RunSummary {
        self.run_with(state, urls, &AtomicBool::new(false), |_| {})
    }

    /// Processes `urls` in order. `cancel` is checked before each URL; the
    /// page being fetched when it is set still completes.
    pub fn run_with<F>(
        &self,
        state: &mut SessionState,
        urls: &[String],
        cancel: &AtomicBool,
        mut on_event: F,
    ) -> RunSummary
    where
        F: FnMut(ProgressEvent),
    {
        let total = urls.len();
        let mut summary = RunSummary {
            total_urls: total,
            ..RunSummary::default()
        };
        info!("Starting scrape of {} URLs", total);
        on_event(ProgressEvent::Started { total });

        for (i, url) in urls.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                summary.cancelled = true;
                break;
            }

            info!("===== Processing {} / {} : {} =====", i + 1, total, url);
            on_event(ProgressEvent::UrlStarted {
                index: i + 1,
                total,
                url: url.clone(),
            });

            match self.process_url(state, url) {
                UrlOutcome::Processed(report) => {
                    summary.processed += 1;
                    on_event(ProgressEvent::UrlProcessed(report));
                }
                UrlOutcome::Skipped { url, reason } => {
                    summary.skipped += 1;
                    on_event(ProgressEvent::UrlSkipped { url, reason });
                }
            }
        }

        summary.unique_emails = state.set(Category::Email).len();
        summary.unique_phones = state.set(Category::Phone).len();
        summary.unique_student_ids = state.set(Category::StudentId).len();

        if summary.cancelled {
            warn!(
                "Scrape cancelled after {} of {} URLs",
                summary.processed + summary.skipped,
                total
            );
        } else {
            info!("===== Scrape completed =====");
        }
        info!("Unique emails: {}", summary.unique_emails);
        info!("Unique phone numbers: {}", summary.unique_phones);
        info!("Unique student IDs: {}", summary.unique_student_ids);

        on_event(if summary.cancelled {
            ProgressEvent::Cancelled(summary.clone())
        } else {
            ProgressEvent::Finished(summary.clone())
        });
        summary
    }
}

fn log_merge(url: &str, category: Category, found: usize, new_items: &[String]) {
    if !new_items.is_empty() {
        info!(
            "[{}] Found {} {}, {} new:",
            url,
            found,
            category.plural(),
            new_items.len()
        );
        for item in new_items {
            info!("  - {}", item);
        }
    } else if found > 0 {
        info!("[{}] Found {} {}, all duplicates", url, found, category.plural());
    } else {
        warn!("[{}] No {} found", url, category.plural());
    }
}
