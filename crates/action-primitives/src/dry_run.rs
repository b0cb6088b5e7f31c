//! In-memory simulated browser
//!
//! [`DryRunActor`] keeps just enough session state (tabs with history, frame
//! depth, a cookie jar and a fixture DOM keyed by selector) to run scripts
//! without a real browser. Page content comes from [`DryRunConfig::fixtures`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::actor::{pick_duration, ActorResult, BrowserActor};
use crate::errors::ActorError;
use crate::types::{CdpCommand, Cookie, FetchRequest, ScrollTarget};

/// PNG signature; enough for consumers that sniff the format
const PLACEHOLDER_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const BLANK: &str = "about:blank";

/// Settings of the simulated browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DryRunConfig {
    /// URL of the first tab
    pub start_url: String,

    /// Page title; defaults to the host of the current URL
    pub title: Option<String>,

    /// Elements present on every page, keyed by selector
    pub fixtures: BTreeMap<String, ElementFixture>,

    /// Actually wait on `sleep` and `random_sleep`
    pub real_sleep: bool,
}

impl Default for DryRunConfig {
    fn default() -> Self {
        Self {
            start_url: BLANK.to_string(),
            title: None,
            fixtures: BTreeMap::new(),
            real_sleep: false,
        }
    }
}

impl DryRunConfig {
    pub fn with_fixture(mut self, selector: impl Into<String>, fixture: ElementFixture) -> Self {
        self.fixtures.insert(selector.into(), fixture);
        self
    }
}

/// Simulated element
///
/// In configuration a fixture is either a bare string (its text) or a map with
/// the fields below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FixtureDocument")]
pub struct ElementFixture {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Clicking the element navigates here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigates_to: Option<String>,
}

impl ElementFixture {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn navigating_to(mut self, url: impl Into<String>) -> Self {
        self.navigates_to = Some(url.into());
        self
    }

    fn outer_html(&self) -> String {
        match &self.html {
            Some(html) => html.clone(),
            None => format!("<div>{}</div>", self.text),
        }
    }

    fn to_soup(&self) -> Value {
        json!({
            "text": self.text,
            "html": self.outer_html(),
            "attributes": self.attributes,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureDocument {
    Text(String),
    Full {
        #[serde(default)]
        text: String,
        #[serde(default)]
        html: Option<String>,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        #[serde(default)]
        navigates_to: Option<String>,
    },
}

impl From<FixtureDocument> for ElementFixture {
    fn from(doc: FixtureDocument) -> Self {
        match doc {
            FixtureDocument::Text(text) => ElementFixture::text(text),
            FixtureDocument::Full {
                text,
                html,
                attributes,
                navigates_to,
            } => ElementFixture {
                text,
                html,
                attributes,
                navigates_to,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Tab {
    handle: String,
    url: String,
    back: Vec<String>,
    forward: Vec<String>,
    navigation_pending: bool,
}

impl Tab {
    fn new(handle: String, url: String) -> Self {
        Self {
            handle,
            url,
            back: Vec::new(),
            forward: Vec::new(),
            navigation_pending: false,
        }
    }

    fn visit(&mut self, url: String) {
        let previous = std::mem::replace(&mut self.url, url);
        self.back.push(previous);
        self.forward.clear();
        self.navigation_pending = true;
    }
}

#[derive(Debug)]
struct SessionState {
    tabs: Vec<Tab>,
    active: usize,
    opened: u64,
    frame_depth: usize,
    cookies: Vec<Cookie>,
    human_mode: bool,
    inputs: BTreeMap<String, String>,
    noop_calls: u64,
    calls: Vec<String>,
}

impl SessionState {
    fn tab(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }
}

/// Simulated browser session
pub struct DryRunActor {
    config: DryRunConfig,
    state: Mutex<SessionState>,
}

impl DryRunActor {
    pub fn new(config: DryRunConfig) -> Self {
        let first = Tab::new("tab-0".to_string(), config.start_url.clone());
        Self {
            config,
            state: Mutex::new(SessionState {
                tabs: vec![first],
                active: 0,
                opened: 1,
                frame_depth: 0,
                cookies: Vec::new(),
                human_mode: false,
                inputs: BTreeMap::new(),
                noop_calls: 0,
                calls: Vec::new(),
            }),
        }
    }

    /// Operations performed so far, oldest first
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn current_url(&self) -> String {
        self.state.lock().tab().url.clone()
    }

    pub fn cookies(&self) -> Vec<Cookie> {
        self.state.lock().cookies.clone()
    }

    pub fn tab_count(&self) -> usize {
        self.state.lock().tabs.len()
    }

    pub fn frame_depth(&self) -> usize {
        self.state.lock().frame_depth
    }

    pub fn human_mode(&self) -> bool {
        self.state.lock().human_mode
    }

    /// Text typed into an input and not cleared since
    pub fn input_value(&self, selector: &str) -> Option<String> {
        self.state.lock().inputs.get(selector).cloned()
    }

    fn record(&self, state: &mut SessionState, call: String) {
        debug!(call = %call, "dry-run");
        state.calls.push(call);
    }

    fn element(&self, selector: &str) -> Result<&ElementFixture, ActorError> {
        self.config
            .fixtures
            .get(selector)
            .ok_or_else(|| ActorError::ElementNotFound(selector.to_string()))
    }

    fn parse_url(url: &str) -> Result<Url, ActorError> {
        Url::parse(url).map_err(|err| ActorError::Navigation(format!("{}: {}", url, err)))
    }

    fn title_for(&self, url: &str) -> String {
        if let Some(title) = &self.config.title {
            return title.clone();
        }
        Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    fn goto(&self, url: &str, call: String) -> ActorResult {
        let target = Self::parse_url(url)?;
        let mut state = self.state.lock();
        state.tab().visit(target.to_string());
        state.frame_depth = 0;
        self.record(&mut state, call);
        Ok(Value::String(target.to_string()))
    }

    /// Element operation with no effect beyond the lookup
    fn touch(&self, op: &str, selector: &str) -> ActorResult {
        self.element(selector)?;
        let mut state = self.state.lock();
        self.record(&mut state, format!("{} {}", op, selector));
        Ok(Value::Null)
    }

    fn page_text(&self) -> String {
        self.config
            .fixtures
            .values()
            .map(|fixture| fixture.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn page_html(&self, title: &str) -> String {
        let body: String = self
            .config
            .fixtures
            .values()
            .map(ElementFixture::outer_html)
            .collect();
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        )
    }

    async fn pause(&self, duration: Duration) {
        if self.config.real_sleep {
            tokio::time::sleep(duration).await;
        }
    }
}

impl Default for DryRunActor {
    fn default() -> Self {
        Self::new(DryRunConfig::default())
    }
}

/// Parse a Netscape cookies.txt document
fn parse_netscape(text: &str) -> Result<Vec<Cookie>, ActorError> {
    let mut cookies = Vec::new();
    for (number, raw) in text.lines().enumerate() {
        let (line, http_only) = match raw.strip_prefix("#HttpOnly_") {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let [domain, _subdomains, path, secure, expiry, name, value] = fields.as_slice() else {
            return Err(ActorError::InvalidArgument(format!(
                "cookies line {}: expected 7 tab-separated fields, got {}",
                number + 1,
                fields.len()
            )));
        };

        let mut cookie = Cookie::new();
        cookie.insert("domain".into(), json!(domain));
        cookie.insert("path".into(), json!(path));
        cookie.insert("secure".into(), json!(secure.eq_ignore_ascii_case("TRUE")));
        cookie.insert("httpOnly".into(), json!(http_only));
        if let Ok(expiry) = expiry.parse::<i64>() {
            if expiry > 0 {
                cookie.insert("expiry".into(), json!(expiry));
            }
        }
        cookie.insert("name".into(), json!(name));
        cookie.insert("value".into(), json!(value));
        cookies.push(cookie);
    }
    Ok(cookies)
}

fn cookie_name(cookie: &Cookie) -> Option<&str> {
    cookie.get("name").and_then(Value::as_str)
}

fn store_cookies(jar: &mut Vec<Cookie>, incoming: Vec<Cookie>) {
    for cookie in incoming {
        let name = cookie_name(&cookie).map(str::to_string);
        jar.retain(|existing| cookie_name(existing) != name.as_deref());
        jar.push(cookie);
    }
}

#[async_trait]
impl BrowserActor for DryRunActor {
    async fn navigate(&self, url: &str) -> ActorResult {
        self.goto(url, format!("navigate {}", url))
    }

    async fn google_get(&self, url: &str) -> ActorResult {
        self.goto(url, format!("google_get {}", url))
    }

    async fn get_via(&self, url: &str, via: &str) -> ActorResult {
        Self::parse_url(via)?;
        self.goto(url, format!("get_via {} via {}", url, via))
    }

    async fn back(&self) -> ActorResult {
        let mut state = self.state.lock();
        let tab = state.tab();
        if let Some(previous) = tab.back.pop() {
            let current = std::mem::replace(&mut tab.url, previous);
            tab.forward.push(current);
            tab.navigation_pending = true;
        }
        let url = tab.url.clone();
        self.record(&mut state, "back".to_string());
        Ok(Value::String(url))
    }

    async fn forward(&self) -> ActorResult {
        let mut state = self.state.lock();
        let tab = state.tab();
        if let Some(next) = tab.forward.pop() {
            let current = std::mem::replace(&mut tab.url, next);
            tab.back.push(current);
            tab.navigation_pending = true;
        }
        let url = tab.url.clone();
        self.record(&mut state, "forward".to_string());
        Ok(Value::String(url))
    }

    async fn refresh(&self) -> ActorResult {
        let mut state = self.state.lock();
        let tab = state.tab();
        tab.navigation_pending = true;
        let url = tab.url.clone();
        self.record(&mut state, "refresh".to_string());
        Ok(Value::String(url))
    }

    async fn click(&self, selector: &str) -> ActorResult {
        let fixture = self.element(selector)?;
        match &fixture.navigates_to {
            Some(url) => self.goto(url, format!("click {}", selector)),
            None => self.touch("click", selector),
        }
    }

    async fn type_text(&self, selector: &str, text: &str) -> ActorResult {
        self.element(selector)?;
        let mut state = self.state.lock();
        state
            .inputs
            .entry(selector.to_string())
            .or_default()
            .push_str(text);
        self.record(&mut state, format!("type {}", selector));
        Ok(Value::Null)
    }

    async fn clear(&self, selector: &str) -> ActorResult {
        self.element(selector)?;
        let mut state = self.state.lock();
        state.inputs.remove(selector);
        self.record(&mut state, format!("clear {}", selector));
        Ok(Value::Null)
    }

    async fn select_option(&self, selector: &str, value: &str) -> ActorResult {
        self.element(selector)?;
        let mut state = self.state.lock();
        state.inputs.insert(selector.to_string(), value.to_string());
        self.record(&mut state, format!("select_option {} {}", selector, value));
        Ok(Value::Null)
    }

    async fn scroll(&self, target: ScrollTarget) -> ActorResult {
        let mut state = self.state.lock();
        let call = match target {
            ScrollTarget::By { x, y } => format!("scroll {} {}", x, y),
            ScrollTarget::Bottom => "scroll bottom".to_string(),
        };
        self.record(&mut state, call);
        Ok(Value::Null)
    }

    async fn scroll_into_view(&self, selector: &str) -> ActorResult {
        self.touch("scroll_into_view", selector)
    }

    async fn hover(&self, selector: &str) -> ActorResult {
        self.touch("hover", selector)
    }

    async fn focus(&self, selector: &str) -> ActorResult {
        self.touch("focus", selector)
    }

    async fn drag_and_drop(&self, source: &str, target: &str) -> ActorResult {
        self.element(source)?;
        self.element(target)?;
        let mut state = self.state.lock();
        self.record(&mut state, format!("drag_and_drop {} {}", source, target));
        Ok(Value::Null)
    }

    async fn get_text(&self, selector: &str) -> ActorResult {
        Ok(Value::String(self.element(selector)?.text.clone()))
    }

    async fn get_attribute(&self, selector: &str, attribute: &str) -> ActorResult {
        let fixture = self.element(selector)?;
        Ok(fixture
            .attributes
            .get(attribute)
            .map(|value| Value::String(value.clone()))
            .unwrap_or(Value::Null))
    }

    async fn get_html(&self, selector: &str) -> ActorResult {
        Ok(Value::String(self.element(selector)?.outer_html()))
    }

    async fn get_page_html(&self) -> ActorResult {
        let url = self.current_url();
        Ok(Value::String(self.page_html(&self.title_for(&url))))
    }

    async fn get_page_text(&self) -> ActorResult {
        Ok(Value::String(self.page_text()))
    }

    async fn get_url(&self) -> ActorResult {
        Ok(Value::String(self.current_url()))
    }

    async fn get_title(&self) -> ActorResult {
        let url = self.current_url();
        Ok(Value::String(self.title_for(&url)))
    }

    async fn get_cookies(&self) -> ActorResult {
        Ok(Value::Array(
            self.cookies().into_iter().map(|c| json!(c)).collect(),
        ))
    }

    async fn is_element_present(&self, selector: &str) -> ActorResult {
        Ok(Value::Bool(self.config.fixtures.contains_key(selector)))
    }

    async fn soupify(&self, selector: Option<&str>) -> ActorResult {
        match selector {
            Some(selector) => Ok(self.element(selector)?.to_soup()),
            None => {
                let url = self.current_url();
                let title = self.title_for(&url);
                Ok(json!({
                    "title": title,
                    "text": self.page_text(),
                    "html": self.page_html(&title),
                }))
            }
        }
    }

    async fn soupify_select(&self, selector: &str) -> ActorResult {
        Ok(self
            .config
            .fixtures
            .get(selector)
            .map(ElementFixture::to_soup)
            .unwrap_or(Value::Null))
    }

    async fn soupify_select_all(&self, selector: &str) -> ActorResult {
        Ok(Value::Array(
            self.config
                .fixtures
                .get(selector)
                .map(ElementFixture::to_soup)
                .into_iter()
                .collect(),
        ))
    }

    async fn run_js(&self, script: &str, selector: Option<&str>) -> ActorResult {
        if let Some(selector) = selector {
            self.element(selector)?;
        }
        let mut state = self.state.lock();
        self.record(&mut state, format!("run_js {}", script));
        Ok(Value::Null)
    }

    async fn run_cdp(&self, command: CdpCommand) -> ActorResult {
        if !command.cmd.contains('.') {
            return Err(ActorError::CdpIo(format!(
                "'{}' is not a Domain.method name",
                command.cmd
            )));
        }
        let mut state = self.state.lock();
        self.record(&mut state, format!("run_cdp {}", command.cmd));
        Ok(json!({}))
    }

    async fn set_cookies(&self, cookies: &[Cookie]) -> ActorResult {
        for cookie in cookies {
            if cookie_name(cookie).is_none() || !cookie.contains_key("value") {
                return Err(ActorError::InvalidArgument(
                    "cookie requires 'name' and 'value'".to_string(),
                ));
            }
        }
        let mut state = self.state.lock();
        store_cookies(&mut state.cookies, cookies.to_vec());
        self.record(&mut state, format!("set_cookies {}", cookies.len()));
        Ok(Value::from(cookies.len()))
    }

    async fn delete_cookies(&self, name: Option<&str>) -> ActorResult {
        let mut state = self.state.lock();
        let before = state.cookies.len();
        match name {
            Some(name) => state.cookies.retain(|c| cookie_name(c) != Some(name)),
            None => state.cookies.clear(),
        }
        let removed = before - state.cookies.len();
        self.record(&mut state, format!("delete_cookies {}", name.unwrap_or("*")));
        Ok(Value::from(removed))
    }

    async fn load_cookies_netscape(&self, text: &str) -> ActorResult {
        let cookies = parse_netscape(text)?;
        let loaded = cookies.len();
        let mut state = self.state.lock();
        store_cookies(&mut state.cookies, cookies);
        self.record(&mut state, format!("load_cookies_netscape {}", loaded));
        Ok(Value::from(loaded))
    }

    async fn screenshot(&self) -> ActorResult {
        Ok(Value::String(BASE64.encode(PLACEHOLDER_PNG)))
    }

    async fn screenshot_element(&self, selector: &str) -> ActorResult {
        self.element(selector)?;
        Ok(Value::String(BASE64.encode(PLACEHOLDER_PNG)))
    }

    async fn new_tab(&self) -> ActorResult {
        let mut state = self.state.lock();
        let handle = format!("tab-{}", state.opened);
        state.opened += 1;
        state.tabs.push(Tab::new(handle.clone(), BLANK.to_string()));
        self.record(&mut state, format!("new_tab {}", handle));
        Ok(Value::String(handle))
    }

    async fn switch_tab(&self, index: usize) -> ActorResult {
        let mut state = self.state.lock();
        let open = state.tabs.len();
        if index >= open {
            return Err(ActorError::TabOutOfRange { index, open });
        }
        state.active = index;
        state.frame_depth = 0;
        let handle = state.tab().handle.clone();
        self.record(&mut state, format!("switch_tab {}", index));
        Ok(Value::String(handle))
    }

    async fn close_tab(&self) -> ActorResult {
        let mut state = self.state.lock();
        if state.tabs.len() == 1 {
            return Err(ActorError::InvalidArgument(
                "cannot close the last tab".to_string(),
            ));
        }
        let active = state.active;
        let closed = state.tabs.remove(active);
        state.active = 0;
        state.frame_depth = 0;
        self.record(&mut state, format!("close_tab {}", closed.handle));
        Ok(Value::from(state.tabs.len()))
    }

    async fn get_tabs(&self) -> ActorResult {
        let state = self.state.lock();
        Ok(Value::Array(
            state
                .tabs
                .iter()
                .map(|tab| Value::String(tab.handle.clone()))
                .collect(),
        ))
    }

    async fn select_iframe(&self, selector: &str) -> ActorResult {
        if !self.config.fixtures.contains_key(selector) {
            return Err(ActorError::FrameNotFound(selector.to_string()));
        }
        let mut state = self.state.lock();
        state.frame_depth += 1;
        let depth = state.frame_depth;
        self.record(&mut state, format!("select_iframe {}", selector));
        Ok(Value::from(depth))
    }

    async fn get_iframe_by_link(&self, url: &str) -> ActorResult {
        let selector = self
            .config
            .fixtures
            .iter()
            .find(|(_, fixture)| {
                fixture
                    .attributes
                    .get("src")
                    .is_some_and(|src| src.contains(url))
            })
            .map(|(selector, _)| selector.clone())
            .ok_or_else(|| ActorError::FrameNotFound(url.to_string()))?;

        let mut state = self.state.lock();
        state.frame_depth += 1;
        self.record(&mut state, format!("get_iframe_by_link {}", url));
        Ok(Value::String(selector))
    }

    async fn exit_iframe(&self) -> ActorResult {
        let mut state = self.state.lock();
        state.frame_depth = 0;
        self.record(&mut state, "exit_iframe".to_string());
        Ok(Value::Null)
    }

    async fn sleep(&self, duration: Duration) -> ActorResult {
        self.pause(duration).await;
        Ok(Value::Null)
    }

    async fn random_sleep(&self, min: Duration, max: Duration) -> ActorResult {
        let duration = pick_duration(min, max);
        self.pause(duration).await;
        Ok(Value::from(duration.as_secs_f64()))
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> ActorResult {
        let mut state = self.state.lock();
        let tab = state.tab();
        if !tab.navigation_pending {
            return Err(ActorError::NavTimeout(format!(
                "no navigation within {:?}",
                timeout
            )));
        }
        tab.navigation_pending = false;
        Ok(Value::String(tab.url.clone()))
    }

    async fn wait_for_element(&self, selector: &str, _timeout: Duration) -> ActorResult {
        Ok(Value::Bool(self.config.fixtures.contains_key(selector)))
    }

    async fn enable_human_mode(&self) -> ActorResult {
        let mut state = self.state.lock();
        state.human_mode = true;
        self.record(&mut state, "enable_human_mode".to_string());
        Ok(Value::Bool(true))
    }

    async fn disable_human_mode(&self) -> ActorResult {
        let mut state = self.state.lock();
        state.human_mode = false;
        self.record(&mut state, "disable_human_mode".to_string());
        Ok(Value::Bool(false))
    }

    async fn fetch_get(&self, request: FetchRequest) -> ActorResult {
        self.fetch("GET", request)
    }

    async fn fetch_post(&self, request: FetchRequest) -> ActorResult {
        self.fetch("POST", request)
    }

    async fn noop(&self) -> ActorResult {
        let mut state = self.state.lock();
        state.noop_calls += 1;
        Ok(Value::from(state.noop_calls))
    }
}

impl DryRunActor {
    /// Echo the request the way an in-page fetch would report it
    fn fetch(&self, method: &str, request: FetchRequest) -> ActorResult {
        let base = Self::parse_url(&self.current_url()).ok();
        let resolved = match base {
            Some(base) => base.join(&request.url),
            None => Url::parse(&request.url),
        }
        .map_err(|err| ActorError::InvalidArgument(format!("{}: {}", request.url, err)))?;

        let mut state = self.state.lock();
        self.record(&mut state, format!("fetch {} {}", method, resolved));
        Ok(json!({
            "url": resolved.to_string(),
            "method": method,
            "status": 200,
            "ok": true,
            "headers": request.headers,
            "body": request.body.unwrap_or(Value::Null),
        }))
    }
}
