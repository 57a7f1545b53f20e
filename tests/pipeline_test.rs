use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use swallow_lib::input_loader::parse_urls;
use swallow_lib::scraper::ProgressEvent;
use swallow_lib::{
    output, Categories, Category, Extractor, Fetch, Job, Result, Scraper, SessionState,
    SwallowError, UrlOutcome,
};

/// Serves canned pages; unknown URLs fail like a timed-out request.
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
    online: bool,
    fetches: Arc<AtomicUsize>,
    /// Set after the first fetch, simulating Ctrl-C mid-run.
    cancel_after_first: Option<Arc<AtomicBool>>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        StubFetcher {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            online: true,
            ..Default::default()
        }
    }
}

impl Fetch for StubFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(cancel) = &self.cancel_after_first {
            cancel.store(true, Ordering::SeqCst);
        }
        self.pages.get(url).cloned().ok_or_else(|| SwallowError::Fetch {
            url: url.to_string(),
            message: "operation timed out".to_string(),
        })
    }

    fn check_connectivity(&self) -> Result<()> {
        if self.online {
            Ok(())
        } else {
            Err(SwallowError::Connectivity("dns error".to_string()))
        }
    }
}

fn scraper(fetcher: StubFetcher, categories: Categories) -> Scraper {
    Scraper::new(Box::new(fetcher), Extractor::new(), categories)
}

#[test]
fn single_url_reports_only_new_emails() {
    let page = "联系我们: office@school.edu.cn, old@school.edu.cn";
    let s = scraper(
        StubFetcher::new(&[("https://school.edu.cn/contact", page)]),
        Categories::default(),
    );

    let mut state = SessionState::new();
    state.record(
        Category::Email,
        ["old@school.edu.cn".to_string()].into_iter().collect(),
    );

    let outcome = s.process_url(&mut state, "https://school.edu.cn/contact");
    let UrlOutcome::Processed(report) = outcome else {
        panic!("expected the page to be processed");
    };
    let emails = report.category(Category::Email).unwrap();
    assert_eq!(emails.found, 2);
    assert_eq!(emails.new_items, vec!["office@school.edu.cn"]);
    assert_eq!(state.set(Category::Email).len(), 2);
}

#[test]
fn repeated_page_adds_nothing() {
    let page = "a@b.cn 13812345678";
    let s = scraper(StubFetcher::new(&[("http://a.cn", page)]), Categories::default());
    let mut state = SessionState::new();

    s.process_url(&mut state, "http://a.cn");
    let UrlOutcome::Processed(report) = s.process_url(&mut state, "http://a.cn") else {
        panic!("expected the page to be processed");
    };
    assert!(report.categories.iter().all(|c| c.new_items.is_empty()));
    assert!(report.categories.iter().all(|c| c.found == 1));
}

#[test]
fn batch_continues_past_failures() {
    let urls = parse_urls(
        "http://one.cn\nnot-a-url\nhttp://down.cn\nhttp://one.cn\n\nhttp://two.cn\n",
    );
    assert_eq!(urls.len(), 4);

    let s = scraper(
        StubFetcher::new(&[
            ("http://one.cn", "tel: +86 138 1234 5678"),
            ("http://two.cn", "tel: 13812345678, 139 8765 4321"),
        ]),
        Categories::default(),
    );
    let mut state = SessionState::new();
    let summary = s.run(&mut state, &urls);

    assert_eq!(summary.total_urls, 4);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 2);
    assert!(!summary.cancelled);
    assert_eq!(summary.unique_phones, 2);
    assert_eq!(state.set(Category::Phone).sorted(), vec!["13812345678", "13987654321"]);
}

#[test]
fn invalid_custom_pattern_keeps_other_categories() {
    let s = Scraper::new(
        Box::new(StubFetcher::new(&[("http://a.cn", "x@y.cn 2023010203")])),
        Extractor::with_student_id_pattern("(?P<broken"),
        Categories::all(),
    );
    let mut state = SessionState::new();
    let summary = s.run(&mut state, &["http://a.cn".to_string()]);

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.unique_emails, 1);
    assert_eq!(summary.unique_student_ids, 0);
}

#[test]
fn preflight_fails_offline() {
    let fetcher = StubFetcher {
        online: false,
        ..StubFetcher::new(&[])
    };
    let fetches = fetcher.fetches.clone();
    let s = scraper(fetcher, Categories::default());

    assert!(matches!(s.preflight(true), Err(SwallowError::Connectivity(_))));
    assert!(s.preflight(false).is_ok());
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn job_cancel_stops_before_next_url() {
    let cancel = Arc::new(AtomicBool::new(false));
    let fetcher = StubFetcher {
        cancel_after_first: Some(cancel.clone()),
        ..StubFetcher::new(&[("http://a.cn", "a@a.cn"), ("http://b.cn", "b@b.cn")])
    };
    let fetches = fetcher.fetches.clone();

    let handle = Job::spawn_with_cancel(
        scraper(fetcher, Categories::default()),
        SessionState::new(),
        vec!["http://a.cn".to_string(), "http://b.cn".to_string()],
        cancel,
    );
    let events: Vec<ProgressEvent> = handle.events().collect();
    let (state, summary) = handle.join().unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.processed, 1);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(state.set(Category::Email).sorted(), vec!["a@a.cn"]);
    assert!(matches!(events.last(), Some(ProgressEvent::Cancelled(_))));
}

#[test]
fn job_results_can_be_saved() {
    let dir = tempfile::TempDir::new().unwrap();
    let handle = Job::spawn(
        scraper(
            StubFetcher::new(&[("http://a.cn", "z@a.cn a@a.cn 15000000000")]),
            Categories::default(),
        ),
        SessionState::new(),
        vec!["http://a.cn".to_string()],
    );
    let (state, _) = handle.join().unwrap();

    let files = output::save_results(&state, dir.path()).unwrap();
    assert_eq!(files.len(), 2);
    let emails = std::fs::read_to_string(dir.path().join("Output/unique_emails.txt")).unwrap();
    assert_eq!(emails, "a@a.cn\nz@a.cn");
}
