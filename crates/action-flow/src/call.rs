//! Typed action calls
//!
//! [`ActionCall::build`] checks an (already interpolated) action step against
//! the requirements of its kind and produces a closed, typed call.
//! [`ActionCall::invoke`] is the single exhaustive dispatch onto the actor.

use std::collections::BTreeMap;
use std::time::Duration;

use action_primitives::{
    ActorResult, BrowserActor, CdpCommand, Cookie, FetchRequest, ScrollTarget,
};
use script_model::{ActionKind, ActionStep};
use serde_json::Value;
use soulscript_core_types::value_to_string;

use crate::errors::FlowError;

/// Timeout used by the wait actions when `seconds` is not given
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// One fully validated actor operation
#[derive(Debug, Clone, PartialEq)]
pub enum ActionCall {
    Navigate { url: String },
    GoogleGet { url: String },
    GetVia { url: String, via: String },
    Back,
    Forward,
    Refresh,

    Click { selector: String },
    Type { selector: String, text: String },
    Clear { selector: String },
    SelectOption { selector: String, value: String },
    Scroll(ScrollTarget),
    ScrollIntoView { selector: String },
    Hover { selector: String },
    Focus { selector: String },
    DragAndDrop { source: String, target: String },

    GetText { selector: String },
    GetAttribute { selector: String, attribute: String },
    GetHtml { selector: String },
    GetPageHtml,
    GetPageText,
    GetUrl,
    GetTitle,
    GetCookies,
    IsElementPresent { selector: String },

    Soupify { selector: Option<String> },
    SoupifySelect { selector: String },
    SoupifySelectAll { selector: String },

    RunJs { script: String, selector: Option<String> },
    RunCdp(CdpCommand),

    SetCookies(Vec<Cookie>),
    DeleteCookies { name: Option<String> },
    LoadCookiesNetscape { text: String },

    Screenshot,
    ScreenshotElement { selector: String },

    NewTab,
    SwitchTab { index: usize },
    CloseTab,
    GetTabs,

    SelectIframe { selector: String },
    GetIframeByLink { url: String },
    ExitIframe,

    Sleep(Duration),
    RandomSleep { min: Duration, max: Duration },
    WaitForNavigation { timeout: Duration },
    WaitForElement { selector: String, timeout: Duration },

    EnableHumanMode,
    DisableHumanMode,

    FetchGet(FetchRequest),
    FetchPost(FetchRequest),

    Noop,
}

/// Field accessors that turn absent or malformed input into validation errors
struct Fields<'a> {
    step: &'a ActionStep,
}

impl<'a> Fields<'a> {
    fn fail(&self, reason: impl Into<String>) -> FlowError {
        FlowError::validation(&self.step.action, reason)
    }

    fn text(&self, name: &str, field: &Option<String>) -> Result<String, FlowError> {
        match field.as_deref() {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(self.fail(format!("{} is required", name))),
        }
    }

    fn selector(&self) -> Result<String, FlowError> {
        self.text("selector", &self.step.selector)
    }

    fn url(&self) -> Result<String, FlowError> {
        self.text("url", &self.step.url)
    }

    fn optional_selector(&self) -> Option<String> {
        self.step.selector.clone().filter(|s| !s.is_empty())
    }

    fn param(&self, key: &str) -> Option<&'a Value> {
        self.step
            .params
            .as_ref()
            .and_then(|params| params.get(key))
            .filter(|value| !value.is_null())
    }

    fn param_text(&self, key: &str) -> Result<String, FlowError> {
        self.param(key)
            .map(value_to_string)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| self.fail(format!("'{}' parameter is required", key)))
    }

    fn param_number(&self, key: &str) -> Result<Option<f64>, FlowError> {
        match self.param(key) {
            None => Ok(None),
            Some(Value::Number(number)) => Ok(number.as_f64()),
            Some(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.fail(format!("'{}' must be numeric, got '{}'", key, text))),
            Some(other) => Err(self.fail(format!("'{}' must be numeric, got {}", key, other))),
        }
    }

    fn param_object(&self, key: &str) -> Result<BTreeMap<String, Value>, FlowError> {
        match self.param(key) {
            None => Ok(BTreeMap::new()),
            Some(Value::Object(map)) => Ok(map.clone().into_iter().collect()),
            Some(_) => Err(self.fail(format!("'{}' must be an object", key))),
        }
    }

    fn duration(&self, name: &str, seconds: f64) -> Result<Duration, FlowError> {
        Duration::try_from_secs_f64(seconds).map_err(|_| {
            self.fail(format!(
                "{} must be a non-negative number of seconds, got {}",
                name, seconds
            ))
        })
    }

    /// `seconds` as a wait timeout; absent or zero means the default
    fn timeout(&self) -> Result<Duration, FlowError> {
        match self.step.seconds {
            Some(seconds) if seconds != 0.0 => self.duration("seconds", seconds),
            _ => Ok(DEFAULT_WAIT_TIMEOUT),
        }
    }

    fn scroll_target(&self) -> Result<ScrollTarget, FlowError> {
        let x = self.param_number("x")?;
        let y = self.param_number("y")?;
        if x.is_none() && y.is_none() {
            return Ok(ScrollTarget::Bottom);
        }
        Ok(ScrollTarget::By {
            x: x.unwrap_or(0.0),
            y: y.unwrap_or(0.0),
        })
    }

    fn fetch(&self, with_body: bool) -> Result<FetchRequest, FlowError> {
        let request = FetchRequest::get(self.url()?).with_headers(self.param_object("headers")?);
        if !with_body {
            return Ok(request);
        }
        let body = self
            .param("body")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        Ok(request.with_body(body))
    }
}

impl ActionCall {
    /// Validate an interpolated action step and turn it into a typed call
    pub fn build(step: &ActionStep) -> Result<Self, FlowError> {
        let kind: ActionKind = step
            .action
            .parse()
            .map_err(|_| FlowError::UnknownAction(step.action.clone()))?;
        let f = Fields { step };

        let call = match kind {
            ActionKind::Navigate => ActionCall::Navigate { url: f.url()? },
            ActionKind::GoogleGet => ActionCall::GoogleGet { url: f.url()? },
            ActionKind::GetVia => ActionCall::GetVia {
                url: f.url()?,
                via: f.param_text("via")?,
            },
            ActionKind::Back => ActionCall::Back,
            ActionKind::Forward => ActionCall::Forward,
            ActionKind::Refresh => ActionCall::Refresh,

            ActionKind::Click => ActionCall::Click {
                selector: f.selector()?,
            },
            ActionKind::Type => ActionCall::Type {
                selector: f.selector()?,
                text: f.text("text", &step.text)?,
            },
            ActionKind::Clear => ActionCall::Clear {
                selector: f.selector()?,
            },
            ActionKind::SelectOption => ActionCall::SelectOption {
                selector: f.selector()?,
                value: f.text("value", &step.value)?,
            },
            ActionKind::Scroll => ActionCall::Scroll(f.scroll_target()?),
            ActionKind::ScrollIntoView => ActionCall::ScrollIntoView {
                selector: f.selector()?,
            },
            ActionKind::Hover => ActionCall::Hover {
                selector: f.selector()?,
            },
            ActionKind::Focus => ActionCall::Focus {
                selector: f.selector()?,
            },
            ActionKind::DragAndDrop => ActionCall::DragAndDrop {
                source: f.selector()?,
                target: f.param_text("target")?,
            },

            ActionKind::GetText => ActionCall::GetText {
                selector: f.selector()?,
            },
            ActionKind::GetAttribute => ActionCall::GetAttribute {
                selector: f.selector()?,
                attribute: f.text("attribute", &step.attribute)?,
            },
            ActionKind::GetHtml => ActionCall::GetHtml {
                selector: f.selector()?,
            },
            ActionKind::GetPageHtml => ActionCall::GetPageHtml,
            ActionKind::GetPageText => ActionCall::GetPageText,
            ActionKind::GetUrl => ActionCall::GetUrl,
            ActionKind::GetTitle => ActionCall::GetTitle,
            ActionKind::GetCookies => ActionCall::GetCookies,
            ActionKind::IsElementPresent => ActionCall::IsElementPresent {
                selector: f.selector()?,
            },

            ActionKind::Soupify => ActionCall::Soupify {
                selector: f.optional_selector(),
            },
            ActionKind::SoupifySelect => ActionCall::SoupifySelect {
                selector: f.selector()?,
            },
            ActionKind::SoupifySelectAll => ActionCall::SoupifySelectAll {
                selector: f.selector()?,
            },

            ActionKind::RunJs => ActionCall::RunJs {
                script: f.text("script", &step.script)?,
                selector: f.optional_selector(),
            },
            ActionKind::RunCdp => ActionCall::RunCdp(CdpCommand {
                cmd: f.param_text("cmd")?,
                params: Value::Object(f.param_object("params")?.into_iter().collect()),
            }),

            ActionKind::SetCookies => match step.cookies.as_ref() {
                Some(cookies) if !cookies.is_empty() => ActionCall::SetCookies(cookies.clone()),
                _ => return Err(f.fail("cookies are required")),
            },
            ActionKind::DeleteCookies => ActionCall::DeleteCookies {
                name: f.param("name").map(value_to_string),
            },
            ActionKind::LoadCookiesNetscape => ActionCall::LoadCookiesNetscape {
                text: f.text("cookies_text", &step.cookies_text)?,
            },

            ActionKind::Screenshot => ActionCall::Screenshot,
            ActionKind::ScreenshotElement => ActionCall::ScreenshotElement {
                selector: f.selector()?,
            },

            ActionKind::NewTab => ActionCall::NewTab,
            ActionKind::SwitchTab => {
                let index = step
                    .tab_index
                    .ok_or_else(|| f.fail("tab_index is required"))?;
                let index = usize::try_from(index)
                    .map_err(|_| f.fail(format!("Invalid tab index: {}", index)))?;
                ActionCall::SwitchTab { index }
            }
            ActionKind::CloseTab => ActionCall::CloseTab,
            ActionKind::GetTabs => ActionCall::GetTabs,

            ActionKind::SelectIframe => ActionCall::SelectIframe {
                selector: f.text("iframe_selector", &step.iframe_selector)?,
            },
            ActionKind::GetIframeByLink => ActionCall::GetIframeByLink { url: f.url()? },
            ActionKind::ExitIframe => ActionCall::ExitIframe,

            ActionKind::Sleep => {
                let seconds = step.seconds.ok_or_else(|| f.fail("seconds is required"))?;
                ActionCall::Sleep(f.duration("seconds", seconds)?)
            }
            ActionKind::RandomSleep => {
                let (Some(min), Some(max)) = (step.min_seconds, step.max_seconds) else {
                    return Err(f.fail("min_seconds and max_seconds are required"));
                };
                let min = f.duration("min_seconds", min)?;
                let max = f.duration("max_seconds", max)?;
                if min > max {
                    return Err(f.fail("min_seconds must not exceed max_seconds"));
                }
                ActionCall::RandomSleep { min, max }
            }
            ActionKind::WaitForNavigation => ActionCall::WaitForNavigation {
                timeout: f.timeout()?,
            },
            ActionKind::WaitForElement => ActionCall::WaitForElement {
                selector: f.selector()?,
                timeout: f.timeout()?,
            },

            ActionKind::EnableHumanMode => ActionCall::EnableHumanMode,
            ActionKind::DisableHumanMode => ActionCall::DisableHumanMode,

            ActionKind::FetchGet => ActionCall::FetchGet(f.fetch(false)?),
            ActionKind::FetchPost => ActionCall::FetchPost(f.fetch(true)?),

            ActionKind::Noop => ActionCall::Noop,
        };

        Ok(call)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ActionCall::Navigate { .. } => ActionKind::Navigate,
            ActionCall::GoogleGet { .. } => ActionKind::GoogleGet,
            ActionCall::GetVia { .. } => ActionKind::GetVia,
            ActionCall::Back => ActionKind::Back,
            ActionCall::Forward => ActionKind::Forward,
            ActionCall::Refresh => ActionKind::Refresh,
            ActionCall::Click { .. } => ActionKind::Click,
            ActionCall::Type { .. } => ActionKind::Type,
            ActionCall::Clear { .. } => ActionKind::Clear,
            ActionCall::SelectOption { .. } => ActionKind::SelectOption,
            ActionCall::Scroll(_) => ActionKind::Scroll,
            ActionCall::ScrollIntoView { .. } => ActionKind::ScrollIntoView,
            ActionCall::Hover { .. } => ActionKind::Hover,
            ActionCall::Focus { .. } => ActionKind::Focus,
            ActionCall::DragAndDrop { .. } => ActionKind::DragAndDrop,
            ActionCall::GetText { .. } => ActionKind::GetText,
            ActionCall::GetAttribute { .. } => ActionKind::GetAttribute,
            ActionCall::GetHtml { .. } => ActionKind::GetHtml,
            ActionCall::GetPageHtml => ActionKind::GetPageHtml,
            ActionCall::GetPageText => ActionKind::GetPageText,
            ActionCall::GetUrl => ActionKind::GetUrl,
            ActionCall::GetTitle => ActionKind::GetTitle,
            ActionCall::GetCookies => ActionKind::GetCookies,
            ActionCall::IsElementPresent { .. } => ActionKind::IsElementPresent,
            ActionCall::Soupify { .. } => ActionKind::Soupify,
            ActionCall::SoupifySelect { .. } => ActionKind::SoupifySelect,
            ActionCall::SoupifySelectAll { .. } => ActionKind::SoupifySelectAll,
            ActionCall::RunJs { .. } => ActionKind::RunJs,
            ActionCall::RunCdp(_) => ActionKind::RunCdp,
            ActionCall::SetCookies(_) => ActionKind::SetCookies,
            ActionCall::DeleteCookies { .. } => ActionKind::DeleteCookies,
            ActionCall::LoadCookiesNetscape { .. } => ActionKind::LoadCookiesNetscape,
            ActionCall::Screenshot => ActionKind::Screenshot,
            ActionCall::ScreenshotElement { .. } => ActionKind::ScreenshotElement,
            ActionCall::NewTab => ActionKind::NewTab,
            ActionCall::SwitchTab { .. } => ActionKind::SwitchTab,
            ActionCall::CloseTab => ActionKind::CloseTab,
            ActionCall::GetTabs => ActionKind::GetTabs,
            ActionCall::SelectIframe { .. } => ActionKind::SelectIframe,
            ActionCall::GetIframeByLink { .. } => ActionKind::GetIframeByLink,
            ActionCall::ExitIframe => ActionKind::ExitIframe,
            ActionCall::Sleep(_) => ActionKind::Sleep,
            ActionCall::RandomSleep { .. } => ActionKind::RandomSleep,
            ActionCall::WaitForNavigation { .. } => ActionKind::WaitForNavigation,
            ActionCall::WaitForElement { .. } => ActionKind::WaitForElement,
            ActionCall::EnableHumanMode => ActionKind::EnableHumanMode,
            ActionCall::DisableHumanMode => ActionKind::DisableHumanMode,
            ActionCall::FetchGet(_) => ActionKind::FetchGet,
            ActionCall::FetchPost(_) => ActionKind::FetchPost,
            ActionCall::Noop => ActionKind::Noop,
        }
    }

    /// Perform the call on the actor
    pub async fn invoke(&self, actor: &dyn BrowserActor) -> ActorResult {
        match self {
            ActionCall::Navigate { url } => actor.navigate(url).await,
            ActionCall::GoogleGet { url } => actor.google_get(url).await,
            ActionCall::GetVia { url, via } => actor.get_via(url, via).await,
            ActionCall::Back => actor.back().await,
            ActionCall::Forward => actor.forward().await,
            ActionCall::Refresh => actor.refresh().await,

            ActionCall::Click { selector } => actor.click(selector).await,
            ActionCall::Type { selector, text } => actor.type_text(selector, text).await,
            ActionCall::Clear { selector } => actor.clear(selector).await,
            ActionCall::SelectOption { selector, value } => {
                actor.select_option(selector, value).await
            }
            ActionCall::Scroll(target) => actor.scroll(*target).await,
            ActionCall::ScrollIntoView { selector } => actor.scroll_into_view(selector).await,
            ActionCall::Hover { selector } => actor.hover(selector).await,
            ActionCall::Focus { selector } => actor.focus(selector).await,
            ActionCall::DragAndDrop { source, target } => {
                actor.drag_and_drop(source, target).await
            }

            ActionCall::GetText { selector } => actor.get_text(selector).await,
            ActionCall::GetAttribute {
                selector,
                attribute,
            } => actor.get_attribute(selector, attribute).await,
            ActionCall::GetHtml { selector } => actor.get_html(selector).await,
            ActionCall::GetPageHtml => actor.get_page_html().await,
            ActionCall::GetPageText => actor.get_page_text().await,
            ActionCall::GetUrl => actor.get_url().await,
            ActionCall::GetTitle => actor.get_title().await,
            ActionCall::GetCookies => actor.get_cookies().await,
            ActionCall::IsElementPresent { selector } => actor.is_element_present(selector).await,

            ActionCall::Soupify { selector } => actor.soupify(selector.as_deref()).await,
            ActionCall::SoupifySelect { selector } => actor.soupify_select(selector).await,
            ActionCall::SoupifySelectAll { selector } => {
                actor.soupify_select_all(selector).await
            }

            ActionCall::RunJs { script, selector } => {
                actor.run_js(script, selector.as_deref()).await
            }
            ActionCall::RunCdp(command) => actor.run_cdp(command.clone()).await,

            ActionCall::SetCookies(cookies) => actor.set_cookies(cookies).await,
            ActionCall::DeleteCookies { name } => actor.delete_cookies(name.as_deref()).await,
            ActionCall::LoadCookiesNetscape { text } => actor.load_cookies_netscape(text).await,

            ActionCall::Screenshot => actor.screenshot().await,
            ActionCall::ScreenshotElement { selector } => {
                actor.screenshot_element(selector).await
            }

            ActionCall::NewTab => actor.new_tab().await,
            ActionCall::SwitchTab { index } => actor.switch_tab(*index).await,
            ActionCall::CloseTab => actor.close_tab().await,
            ActionCall::GetTabs => actor.get_tabs().await,

            ActionCall::SelectIframe { selector } => actor.select_iframe(selector).await,
            ActionCall::GetIframeByLink { url } => actor.get_iframe_by_link(url).await,
            ActionCall::ExitIframe => actor.exit_iframe().await,

            ActionCall::Sleep(duration) => actor.sleep(*duration).await,
            ActionCall::RandomSleep { min, max } => actor.random_sleep(*min, *max).await,
            ActionCall::WaitForNavigation { timeout } => {
                actor.wait_for_navigation(*timeout).await
            }
            ActionCall::WaitForElement { selector, timeout } => {
                actor.wait_for_element(selector, *timeout).await
            }

            ActionCall::EnableHumanMode => actor.enable_human_mode().await,
            ActionCall::DisableHumanMode => actor.disable_human_mode().await,

            ActionCall::FetchGet(request) => actor.fetch_get(request.clone()).await,
            ActionCall::FetchPost(request) => actor.fetch_post(request.clone()).await,

            ActionCall::Noop => actor.noop().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(step: ActionStep) -> Result<ActionCall, FlowError> {
        ActionCall::build(&step)
    }

    fn reason(result: Result<ActionCall, FlowError>) -> String {
        match result {
            Err(FlowError::Validation { reason, .. }) => reason,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn navigation_requires_url() {
        assert_eq!(
            build(ActionStep::new("navigate").with_url("https://a.io")).unwrap(),
            ActionCall::Navigate {
                url: "https://a.io".into()
            }
        );
        assert_eq!(reason(build(ActionStep::new("navigate"))), "url is required");
        assert_eq!(
            reason(build(ActionStep::new("navigate").with_url(""))),
            "url is required"
        );
    }

    #[test]
    fn get_via_requires_via_param() {
        let step = ActionStep::new("get_via").with_url("https://a.io");
        assert!(reason(build(step.clone())).contains("'via'"));
        let call = build(step.with_param("via", json!("https://ref.io"))).unwrap();
        assert_eq!(call.kind(), ActionKind::GetVia);
    }

    #[test]
    fn type_requires_selector_and_text() {
        let step = ActionStep::new("type").with_selector("#q");
        assert_eq!(reason(build(step.clone())), "text is required");
        assert_eq!(
            build(step.with_text("rust")).unwrap(),
            ActionCall::Type {
                selector: "#q".into(),
                text: "rust".into()
            }
        );
    }

    #[test]
    fn scroll_defaults_to_bottom() {
        assert_eq!(
            build(ActionStep::new("scroll")).unwrap(),
            ActionCall::Scroll(ScrollTarget::Bottom)
        );
        assert_eq!(
            build(ActionStep::new("scroll").with_param("y", json!("250"))).unwrap(),
            ActionCall::Scroll(ScrollTarget::By { x: 0.0, y: 250.0 })
        );
        let step = ActionStep::new("scroll").with_param("x", json!("far"));
        assert!(reason(build(step)).contains("numeric"));
    }

    #[test]
    fn run_cdp_defaults_params_to_empty_object() {
        let call =
            build(ActionStep::new("run_cdp").with_param("cmd", json!("Page.reload"))).unwrap();
        assert_eq!(
            call,
            ActionCall::RunCdp(CdpCommand {
                cmd: "Page.reload".into(),
                params: json!({})
            })
        );
    }

    #[test]
    fn set_cookies_rejects_empty_list() {
        let mut step = ActionStep::new("set_cookies");
        step.cookies = Some(vec![]);
        assert_eq!(reason(build(step)), "cookies are required");
    }

    #[test]
    fn switch_tab_rejects_negative_index() {
        let mut step = ActionStep::new("switch_tab");
        assert_eq!(reason(build(step.clone())), "tab_index is required");
        step.tab_index = Some(-1);
        assert_eq!(reason(build(step.clone())), "Invalid tab index: -1");
        step.tab_index = Some(2);
        assert_eq!(build(step).unwrap(), ActionCall::SwitchTab { index: 2 });
    }

    #[test]
    fn sleeps_validate_their_bounds() {
        assert!(reason(build(ActionStep::new("sleep"))).contains("seconds"));
        let negative = ActionStep::new("sleep").with_seconds(-1.0);
        assert!(reason(build(negative)).contains("non-negative"));
        assert_eq!(
            build(ActionStep::new("sleep").with_seconds(0.0)).unwrap(),
            ActionCall::Sleep(Duration::ZERO)
        );

        let mut step = ActionStep::new("random_sleep");
        step.min_seconds = Some(2.0);
        step.max_seconds = Some(1.0);
        assert!(reason(build(step.clone())).contains("must not exceed"));
        step.max_seconds = Some(3.0);
        assert_eq!(
            build(step).unwrap(),
            ActionCall::RandomSleep {
                min: Duration::from_secs(2),
                max: Duration::from_secs(3)
            }
        );
    }

    #[test]
    fn waits_default_their_timeout() {
        assert_eq!(
            build(ActionStep::new("wait_for_navigation")).unwrap(),
            ActionCall::WaitForNavigation {
                timeout: DEFAULT_WAIT_TIMEOUT
            }
        );
        assert_eq!(
            build(
                ActionStep::new("wait_for_element")
                    .with_selector("#x")
                    .with_seconds(5.0)
            )
            .unwrap(),
            ActionCall::WaitForElement {
                selector: "#x".into(),
                timeout: Duration::from_secs(5)
            }
        );
    }

    #[test]
    fn fetch_post_defaults_body_and_checks_headers() {
        let call = build(ActionStep::new("fetch_post").with_url("/api")).unwrap();
        let ActionCall::FetchPost(request) = call else {
            panic!("expected fetch_post");
        };
        assert_eq!(request.body, Some(json!({})));
        assert!(request.headers.is_empty());

        let bad = ActionStep::new("fetch_get")
            .with_url("/api")
            .with_param("headers", json!("x"));
        assert!(reason(build(bad)).contains("'headers' must be an object"));
    }

    #[test]
    fn unknown_action_is_its_own_error() {
        assert!(matches!(
            build(ActionStep::new("teleport")),
            Err(FlowError::UnknownAction(name)) if name == "teleport"
        ));
    }

    #[test]
    fn every_kind_round_trips_through_build() {
        let mut step = ActionStep::new("")
            .with_selector("#s")
            .with_url("https://a.io")
            .with_text("t")
            .with_value("v")
            .with_seconds(1.0)
            .with_param("via", json!("https://r.io"))
            .with_param("target", json!("#t"))
            .with_param("cmd", json!("Page.reload"));
        step.attribute = Some("href".into());
        step.script = Some("return 1".into());
        step.cookies = Some(vec![Cookie::new()]);
        step.cookies_text = Some("x".into());
        step.min_seconds = Some(0.0);
        step.max_seconds = Some(1.0);
        step.tab_index = Some(0);
        step.iframe_selector = Some("#f".into());

        for kind in ActionKind::ALL {
            step.action = kind.as_str().to_string();
            let call = ActionCall::build(&step).unwrap();
            assert_eq!(call.kind(), *kind);
        }
    }
}
