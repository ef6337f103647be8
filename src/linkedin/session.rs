// src/linkedin/session.rs
//! One scraping run: log in with a session cookie, walk the profile pages in
//! a fixed order, extract each section and persist the result once.

use anyhow::{Context, Result};
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::driver::BrowserDriver;
use super::extract::{resolve_username, Section};
use super::serialize::ToRecord;
use crate::core::config_manager::ScraperSettings;
use crate::core::database::ProfileStore;
use crate::types::{ExtractionMode, ExtractionOutcome, Profile};

/// What LinkedIn serves on the feed when the session cookie is rejected
pub const INVALID_SESSION_BODY: &str = "<html><head></head><body></body></html>";
pub const AUTH_FAILURE_MESSAGE: &str = "LinkedIn rejected the session token";
const NOT_FOUND_MARKER: &str = "404";
const FOOTER_LANGUAGE_SELECT: &str = "globalfooter-select_language";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Authenticate,
    ResolveUsername,
    Section(Section),
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Authenticate => f.write_str("authenticate"),
            Stage::ResolveUsername => f.write_str("resolve username"),
            Stage::Section(section) => write!(f, "extract {}", section),
            Stage::Persist => f.write_str("persist"),
        }
    }
}

pub struct ProfileSession<D: BrowserDriver> {
    driver: D,
    settings: ScraperSettings,
    run_id: Uuid,
}

impl<D: BrowserDriver> ProfileSession<D> {
    pub fn new(driver: D, settings: ScraperSettings) -> Self {
        Self {
            driver,
            settings,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Scrape the LinkedIn account behind `token` and store it for `owner`.
    ///
    /// The browser session is closed whatever the outcome.
    pub async fn run<S: ProfileStore + ?Sized>(
        mut self,
        store: &S,
        token: &str,
        owner: &str,
        mode: ExtractionMode,
    ) -> Result<ExtractionOutcome> {
        info!(
            "[{}] Starting {:?} extraction for {}",
            self.run_id, mode, owner
        );

        let outcome = self.extract(store, token, owner, mode).await;

        if let Err(e) = self.driver.close().await {
            warn!("[{}] Failed to close browser session: {}", self.run_id, e);
        }

        match &outcome {
            Ok(result) => info!("[{}] Finished for {}: {}", self.run_id, owner, result),
            Err(e) => warn!("[{}] Aborted for {}: {:#}", self.run_id, owner, e),
        }
        outcome
    }

    async fn extract<S: ProfileStore + ?Sized>(
        &mut self,
        store: &S,
        token: &str,
        owner: &str,
        mode: ExtractionMode,
    ) -> Result<ExtractionOutcome> {
        self.authenticate(token)
            .await
            .with_context(|| format!("{} stage failed", Stage::Authenticate))?;

        let feed_url = format!("{}/feed/", self.base_url());
        let feed = self
            .load(&feed_url)
            .await
            .with_context(|| format!("{} stage failed", Stage::ResolveUsername))?;

        if feed.trim() == INVALID_SESSION_BODY {
            return Ok(ExtractionOutcome::AuthFailure {
                message: AUTH_FAILURE_MESSAGE.to_string(),
            });
        }

        let username = resolve_username(&feed)
            .with_context(|| format!("{} stage failed", Stage::ResolveUsername))?;
        info!("[{}] LinkedIn username: {}", self.run_id, username);

        if mode == ExtractionMode::ExistenceCheck {
            return Ok(ExtractionOutcome::Exists { exists: true });
        }

        let stage = Stage::Section(Section::General);
        let profile_url = self.section_url(&username, Section::General);
        self.open(&profile_url)
            .await
            .with_context(|| format!("{} stage failed", stage))?;

        let current_url = self
            .driver
            .current_url()
            .await
            .with_context(|| format!("{} stage failed", stage))?;
        if current_url.contains(NOT_FOUND_MARKER) {
            return Ok(ExtractionOutcome::NotFound { username });
        }

        if mode == ExtractionMode::ExistenceCheckAndResolve {
            return Ok(ExtractionOutcome::Exists { exists: true });
        }

        let profile = self.collect_sections(&username).await?;

        let record = profile.to_record();
        store
            .upsert(owner, &record, self.run_id)
            .await
            .with_context(|| format!("{} stage failed", Stage::Persist))?;

        Ok(ExtractionOutcome::Success {
            username,
            run_id: self.run_id,
        })
    }

    /// Walk every section in order, starting on the already open profile page.
    async fn collect_sections(&mut self, username: &str) -> Result<Profile> {
        let mut profile = Profile::default();

        for section in Section::ALL {
            let stage = Stage::Section(section);
            let html = self
                .section_markup(username, section)
                .await
                .with_context(|| format!("{} stage failed", stage))?;

            profile = section
                .apply(&html, profile)
                .with_context(|| format!("{} stage failed", stage))?;
            info!("[{}::{}] {} loaded", self.run_id, username, section);
        }

        Ok(profile)
    }

    async fn section_markup(&mut self, username: &str, section: Section) -> Result<String> {
        if section != Section::General {
            let url = self.section_url(username, section);
            self.open(&url).await?;
        }
        if section.needs_scroll() {
            self.scroll().await?;
        }
        if section == Section::General {
            self.pick_language().await;
        }

        Ok(self.driver.page_source().await?)
    }

    async fn authenticate(&mut self, token: &str) -> Result<()> {
        let login = format!("{}/login", self.base_url());
        self.driver.navigate(&login).await?;
        self.driver
            .add_cookie(&self.settings.session_cookie, token)
            .await?;

        if self
            .driver
            .cookie(&self.settings.session_cookie)
            .await?
            .is_none()
        {
            warn!(
                "[{}] Browser did not keep the {} cookie",
                self.run_id, self.settings.session_cookie
            );
        }
        Ok(())
    }

    /// Navigate and wait for the document to be ready
    async fn open(&mut self, url: &str) -> Result<()> {
        self.driver
            .navigate(url)
            .await
            .with_context(|| format!("Failed to open {}", url))?;
        self.driver
            .wait_until_ready(self.settings.ready_timeout)
            .await?;
        Ok(())
    }

    async fn load(&mut self, url: &str) -> Result<String> {
        self.open(url).await?;
        Ok(self.driver.page_source().await?)
    }

    /// Keep scrolling down until the time budget is spent so lazily loaded
    /// list items get rendered.
    async fn scroll(&mut self) -> Result<()> {
        let start = Instant::now();
        let mut offset = self.settings.scroll_step;

        loop {
            self.driver.scroll_to(0, offset).await?;
            offset += self.settings.scroll_step;
            tokio::time::sleep(self.settings.scroll_pause).await;

            if start.elapsed() >= self.settings.scroll_timeout {
                return Ok(());
            }
        }
    }

    async fn pick_language(&mut self) {
        let language = self.settings.language.clone();
        if let Err(e) = self
            .driver
            .select_option(FOOTER_LANGUAGE_SELECT, &language)
            .await
        {
            warn!("[{}] Could not switch page language to {}: {}", self.run_id, language, e);
            return;
        }

        if let Err(e) = self
            .driver
            .wait_until_ready(self.settings.ready_timeout)
            .await
        {
            warn!("[{}] Page not ready after language switch: {}", self.run_id, e);
        }
    }

    fn base_url(&self) -> &str {
        self.settings.linkedin_url.trim_end_matches('/')
    }

    fn section_url(&self, username: &str, section: Section) -> String {
        format!("{}/in/{}/{}", self.base_url(), username, section.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkedin::driver::DriverError;
    use crate::linkedin::extract::fixtures::*;
    use crate::linkedin::serialize::Record;
    use crate::types::StoredProfile;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const BASE: &str = "https://li.test";

    #[derive(Default)]
    struct Trace {
        navigations: Vec<String>,
        cookies: Vec<(String, String)>,
        /// (page, vertical offset) of every scroll
        scrolls: Vec<(String, i64)>,
        /// (page, select id, value) of every language switch
        selects: Vec<(String, String, String)>,
        closed: bool,
    }

    impl Trace {
        fn offsets(&self, url: &str) -> Vec<i64> {
            self.scrolls
                .iter()
                .filter(|(page, _)| page == url)
                .map(|(_, offset)| *offset)
                .collect()
        }
    }

    struct FakeDriver {
        pages: HashMap<String, String>,
        redirects: HashMap<String, String>,
        current: String,
        footer: bool,
        trace: Arc<Mutex<Trace>>,
    }

    impl FakeDriver {
        fn new(pages: Vec<(&str, String)>) -> (Self, Arc<Mutex<Trace>>) {
            let trace = Arc::new(Mutex::new(Trace::default()));
            let driver = Self {
                pages: pages
                    .into_iter()
                    .map(|(path, html)| (format!("{}{}", BASE, path), html))
                    .collect(),
                redirects: HashMap::new(),
                current: String::new(),
                footer: true,
                trace: Arc::clone(&trace),
            };
            (driver, trace)
        }

        fn redirect(mut self, from: &str, to: &str) -> Self {
            self.redirects
                .insert(format!("{}{}", BASE, from), format!("{}{}", BASE, to));
            self
        }

        fn without_footer(mut self) -> Self {
            self.footer = false;
            self
        }
    }

    fn arg(args: &[Value], index: usize) -> String {
        args.get(index)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    #[async_trait]
    impl BrowserDriver for FakeDriver {
        async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
            self.trace.lock().unwrap().navigations.push(url.to_string());
            self.current = url.to_string();
            Ok(())
        }

        async fn wait_until_ready(&mut self, _timeout: Duration) -> Result<(), DriverError> {
            Ok(())
        }

        async fn execute_script(&mut self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
            let mut trace = self.trace.lock().unwrap();
            if script.contains("window.scrollTo") {
                let offset = args.get(1).and_then(Value::as_i64).unwrap_or_default();
                trace.scrolls.push((self.current.clone(), offset));
                return Ok(Value::Null);
            }
            if script.contains("getElementById") {
                trace
                    .selects
                    .push((self.current.clone(), arg(&args, 0), arg(&args, 1)));
                return Ok(Value::Bool(self.footer));
            }
            Ok(Value::Null)
        }

        async fn page_source(&mut self) -> Result<String, DriverError> {
            Ok(self
                .pages
                .get(&self.current)
                .cloned()
                .unwrap_or_else(|| page("")))
        }

        async fn current_url(&mut self) -> Result<String, DriverError> {
            Ok(self
                .redirects
                .get(&self.current)
                .cloned()
                .unwrap_or_else(|| self.current.clone()))
        }

        async fn add_cookie(&mut self, name: &str, value: &str) -> Result<(), DriverError> {
            self.trace
                .lock()
                .unwrap()
                .cookies
                .push((name.to_string(), value.to_string()));
            Ok(())
        }

        async fn cookie(&mut self, name: &str) -> Result<Option<String>, DriverError> {
            Ok(self
                .trace
                .lock()
                .unwrap()
                .cookies
                .iter()
                .rev()
                .find(|(cookie, _)| cookie == name)
                .map(|(_, value)| value.clone()))
        }

        async fn close(&mut self) -> Result<(), DriverError> {
            self.trace.lock().unwrap().closed = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: tokio::sync::Mutex<HashMap<String, (Record, Uuid)>>,
    }

    #[async_trait]
    impl ProfileStore for MemoryStore {
        async fn find(&self, owner: &str) -> anyhow::Result<Option<StoredProfile>> {
            let records = self.records.lock().await;
            Ok(records.get(owner).map(|(record, run_id)| StoredProfile {
                owner: owner.to_string(),
                data: Value::Object(record.clone()).to_string(),
                run_id: run_id.to_string(),
                last_modified: Utc::now(),
            }))
        }

        async fn upsert(&self, owner: &str, record: &Record, run_id: Uuid) -> anyhow::Result<()> {
            self.records
                .lock()
                .await
                .insert(owner.to_string(), (record.clone(), run_id));
            Ok(())
        }
    }

    fn settings() -> ScraperSettings {
        ScraperSettings {
            linkedin_url: format!("{}/", BASE),
            ready_timeout: Duration::from_millis(10),
            scroll_timeout: Duration::ZERO,
            scroll_pause: Duration::ZERO,
            ..ScraperSettings::default()
        }
    }

    fn feed() -> String {
        page(r#"<div class="feed-identity-module__actor-meta break-words"><a href="/in/ada/">Ada</a></div>"#)
    }

    fn landing() -> String {
        page(r#"<h1 class="text-heading-xlarge inline t-24 v-align-middle break-words">Ada Lovelace</h1>"#)
    }

    fn contact() -> String {
        page(r#"<div class="pv-contact-info__ci-container t-14"><a>ada@example.org</a></div>"#)
    }

    fn certifications_page() -> String {
        details_page(&[item(
            ITEM_CLASS,
            &format!("{}{}", title(LINKED_TITLE_CLASS, "CKA"), subtitle("CNCF")),
        )])
    }

    fn projects_page(with_time: bool) -> String {
        let mut content = title(PLAIN_TITLE_CLASS, "Notes");
        if with_time {
            content.push_str(&subtitle("1843"));
        }
        details_page(&[item(ITEM_CLASS, &content)])
    }

    fn full_site(projects: String) -> Vec<(&'static str, String)> {
        vec![
            ("/feed/", feed()),
            ("/in/ada/", landing()),
            ("/in/ada/overlay/contact-info/", contact()),
            ("/in/ada/details/certifications/", certifications_page()),
            ("/in/ada/details/projects/", projects),
        ]
    }

    fn urls(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|path| format!("{}{}", BASE, path)).collect()
    }

    #[tokio::test]
    async fn test_full_session_persists_profile() {
        let (driver, trace) = FakeDriver::new(full_site(projects_page(true)));
        let store = MemoryStore::default();
        let session = ProfileSession::new(driver, settings());
        let run_id = session.run_id();

        let outcome = session
            .run(&store, "secret-token", "ada-owner", ExtractionMode::Full)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ExtractionOutcome::Success {
                username: "ada".to_string(),
                run_id,
            }
        );

        let trace = trace.lock().unwrap();
        assert_eq!(
            trace.navigations,
            urls(&[
                "/login",
                "/feed/",
                "/in/ada/",
                "/in/ada/overlay/contact-info/",
                "/in/ada/details/certifications/",
                "/in/ada/details/experience/",
                "/in/ada/details/education/",
                "/in/ada/details/projects/",
            ])
        );
        assert_eq!(
            trace.cookies,
            vec![("li_at".to_string(), "secret-token".to_string())]
        );
        assert_eq!(
            trace.scrolls,
            urls(&[
                "/in/ada/",
                "/in/ada/details/certifications/",
                "/in/ada/details/experience/",
                "/in/ada/details/education/",
                "/in/ada/details/projects/",
            ])
            .into_iter()
            .map(|url| (url, 1000_i64))
            .collect::<Vec<_>>()
        );
        assert_eq!(
            trace.selects,
            vec![(
                format!("{}/in/ada/", BASE),
                "globalfooter-select_language".to_string(),
                "en_US".to_string(),
            )]
        );
        assert!(trace.closed);

        let stored = store.find("ada-owner").await.unwrap().expect("persisted");
        let record = stored.record().unwrap();
        assert_eq!(record["name"], "Ada Lovelace");
        assert_eq!(record["email"], "ada@example.org");
        assert_eq!(record["licences"][0]["emitted_by"], "CNCF");
        assert_eq!(record["experiences"], Value::Array(Vec::new()));
        assert_eq!(record["projects"][0]["time"], "1843");
        assert_eq!(stored.run_id, run_id.to_string());
    }

    #[tokio::test]
    async fn test_invalid_session_stops_after_feed() {
        let (driver, trace) = FakeDriver::new(vec![("/feed/", INVALID_SESSION_BODY.to_string())]);
        let store = MemoryStore::default();

        let outcome = ProfileSession::new(driver, settings())
            .run(&store, "expired", "ada-owner", ExtractionMode::Full)
            .await
            .unwrap();

        assert_eq!(INVALID_SESSION_BODY.len(), 39);
        assert_eq!(
            outcome,
            ExtractionOutcome::AuthFailure {
                message: AUTH_FAILURE_MESSAGE.to_string(),
            }
        );

        let trace = trace.lock().unwrap();
        assert_eq!(trace.navigations, urls(&["/login", "/feed/"]));
        assert!(trace.closed);
        assert!(store.find("ada-owner").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let (driver, trace) = FakeDriver::new(full_site(projects_page(true)));
        let driver = driver.redirect("/in/ada/", "/404/");
        let store = MemoryStore::default();

        let outcome = ProfileSession::new(driver, settings())
            .run(&store, "secret-token", "ada-owner", ExtractionMode::Full)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ExtractionOutcome::NotFound {
                username: "ada".to_string(),
            }
        );
        assert_eq!(
            trace.lock().unwrap().navigations,
            urls(&["/login", "/feed/", "/in/ada/"])
        );
        assert!(store.find("ada-owner").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_existence_check_modes() {
        let (driver, trace) = FakeDriver::new(full_site(projects_page(true)));
        let outcome = ProfileSession::new(driver, settings())
            .run(&MemoryStore::default(), "t", "o", ExtractionMode::ExistenceCheck)
            .await
            .unwrap();
        assert_eq!(outcome, ExtractionOutcome::Exists { exists: true });
        assert_eq!(trace.lock().unwrap().navigations, urls(&["/login", "/feed/"]));

        let (driver, trace) = FakeDriver::new(full_site(projects_page(true)));
        let store = MemoryStore::default();
        let outcome = ProfileSession::new(driver, settings())
            .run(&store, "t", "o", ExtractionMode::ExistenceCheckAndResolve)
            .await
            .unwrap();
        assert_eq!(outcome, ExtractionOutcome::Exists { exists: true });
        assert_eq!(
            trace.lock().unwrap().navigations,
            urls(&["/login", "/feed/", "/in/ada/"])
        );
        assert!(store.find("o").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_project_failure_aborts_without_persisting() {
        let (driver, trace) = FakeDriver::new(full_site(projects_page(false)));
        let store = MemoryStore::default();

        let err = ProfileSession::new(driver, settings())
            .run(&store, "secret-token", "ada-owner", ExtractionMode::Full)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("extract projects stage failed"));
        assert!(trace.lock().unwrap().closed);
        assert!(store.find("ada-owner").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_feed_is_an_error() {
        let (driver, _trace) = FakeDriver::new(vec![("/feed/", page("<p>feed</p>"))]);

        let err = ProfileSession::new(driver, settings())
            .run(&MemoryStore::default(), "t", "o", ExtractionMode::Full)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("resolve username stage failed"));
    }

    #[tokio::test]
    async fn test_scroll_keeps_going_until_timeout() {
        let (driver, trace) = FakeDriver::new(full_site(projects_page(true)));
        let settings = ScraperSettings {
            scroll_timeout: Duration::from_millis(30),
            scroll_pause: Duration::from_millis(5),
            ..settings()
        };

        let outcome = ProfileSession::new(driver, settings)
            .run(&MemoryStore::default(), "t", "o", ExtractionMode::Full)
            .await
            .unwrap();
        assert!(outcome.is_persisted());

        let trace = trace.lock().unwrap();
        for path in [
            "/in/ada/",
            "/in/ada/details/certifications/",
            "/in/ada/details/experience/",
            "/in/ada/details/education/",
            "/in/ada/details/projects/",
        ] {
            let offsets = trace.offsets(&format!("{}{}", BASE, path));
            // every pass sleeps 5ms, so a 30ms budget allows 2 to 6 passes
            assert!(
                (2..=6).contains(&offsets.len()),
                "{}: {:?}",
                path,
                offsets
            );
            let expected: Vec<i64> = (1..=offsets.len() as i64).map(|n| n * 1000).collect();
            assert_eq!(offsets, expected, "{}", path);
        }
        assert!(trace
            .offsets(&format!("{}/in/ada/overlay/contact-info/", BASE))
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_language_footer_is_tolerated() {
        let (driver, trace) = FakeDriver::new(full_site(projects_page(true)));
        let driver = driver.without_footer();
        let store = MemoryStore::default();

        let outcome = ProfileSession::new(driver, settings())
            .run(&store, "t", "ada-owner", ExtractionMode::Full)
            .await
            .unwrap();

        assert!(outcome.is_persisted());
        assert_eq!(trace.lock().unwrap().selects.len(), 1);
        let stored = store.find("ada-owner").await.unwrap().expect("persisted");
        assert_eq!(stored.record().unwrap()["name"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_resolve_mode_reports_missing_profile() {
        let (driver, trace) = FakeDriver::new(full_site(projects_page(true)));
        let driver = driver.redirect("/in/ada/", "/404/");
        let store = MemoryStore::default();

        let outcome = ProfileSession::new(driver, settings())
            .run(&store, "t", "ada-owner", ExtractionMode::ExistenceCheckAndResolve)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ExtractionOutcome::NotFound {
                username: "ada".to_string(),
            }
        );
        let trace = trace.lock().unwrap();
        assert_eq!(trace.navigations, urls(&["/login", "/feed/", "/in/ada/"]));
        assert!(trace.scrolls.is_empty());
        assert!(trace.closed);
        drop(trace);
        assert!(store.find("ada-owner").await.unwrap().is_none());
    }
}
