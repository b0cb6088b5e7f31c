//! Browser actor capability
//!
//! The interpreter never touches a browser directly. Every action kind maps to
//! one operation of [`BrowserActor`], which returns the action's result value
//! (saved by `save_as`) or an [`ActorError`].
//!
//! Operations default to [`ActorError::Unsupported`] so that partial actors
//! (test doubles, headless fetchers) only implement what they need. `sleep`,
//! `random_sleep` and `noop` have working defaults.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;

use crate::errors::ActorError;
use crate::types::{CdpCommand, Cookie, FetchRequest, ScrollTarget};

/// Result of one actor operation
pub type ActorResult = Result<Value, ActorError>;

/// Capability set of a browser session
#[async_trait]
pub trait BrowserActor: Send + Sync {
    // Navigation

    async fn navigate(&self, _url: &str) -> ActorResult {
        Err(ActorError::Unsupported("navigate"))
    }

    /// Navigate with a search-engine referrer
    async fn google_get(&self, _url: &str) -> ActorResult {
        Err(ActorError::Unsupported("google_get"))
    }

    /// Navigate with `via` as the referrer
    async fn get_via(&self, _url: &str, _via: &str) -> ActorResult {
        Err(ActorError::Unsupported("get_via"))
    }

    async fn back(&self) -> ActorResult {
        Err(ActorError::Unsupported("back"))
    }

    async fn forward(&self) -> ActorResult {
        Err(ActorError::Unsupported("forward"))
    }

    async fn refresh(&self) -> ActorResult {
        Err(ActorError::Unsupported("refresh"))
    }

    // Interaction

    async fn click(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("click"))
    }

    async fn type_text(&self, _selector: &str, _text: &str) -> ActorResult {
        Err(ActorError::Unsupported("type"))
    }

    async fn clear(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("clear"))
    }

    async fn select_option(&self, _selector: &str, _value: &str) -> ActorResult {
        Err(ActorError::Unsupported("select_option"))
    }

    async fn scroll(&self, _target: ScrollTarget) -> ActorResult {
        Err(ActorError::Unsupported("scroll"))
    }

    async fn scroll_into_view(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("scroll_into_view"))
    }

    async fn hover(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("hover"))
    }

    async fn focus(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("focus"))
    }

    async fn drag_and_drop(&self, _source: &str, _target: &str) -> ActorResult {
        Err(ActorError::Unsupported("drag_and_drop"))
    }

    // Extraction

    async fn get_text(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("get_text"))
    }

    async fn get_attribute(&self, _selector: &str, _attribute: &str) -> ActorResult {
        Err(ActorError::Unsupported("get_attribute"))
    }

    async fn get_html(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("get_html"))
    }

    async fn get_page_html(&self) -> ActorResult {
        Err(ActorError::Unsupported("get_page_html"))
    }

    async fn get_page_text(&self) -> ActorResult {
        Err(ActorError::Unsupported("get_page_text"))
    }

    async fn get_url(&self) -> ActorResult {
        Err(ActorError::Unsupported("get_url"))
    }

    async fn get_title(&self) -> ActorResult {
        Err(ActorError::Unsupported("get_title"))
    }

    async fn get_cookies(&self) -> ActorResult {
        Err(ActorError::Unsupported("get_cookies"))
    }

    async fn is_element_present(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("is_element_present"))
    }

    // Parsing

    /// Parsed view (`text`, `html`, `title`) of the page or of one element
    async fn soupify(&self, _selector: Option<&str>) -> ActorResult {
        Err(ActorError::Unsupported("soupify"))
    }

    /// First element matching the selector, or null
    async fn soupify_select(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("soupify_select"))
    }

    async fn soupify_select_all(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("soupify_select_all"))
    }

    // Script

    async fn run_js(&self, _script: &str, _selector: Option<&str>) -> ActorResult {
        Err(ActorError::Unsupported("run_js"))
    }

    async fn run_cdp(&self, _command: CdpCommand) -> ActorResult {
        Err(ActorError::Unsupported("run_cdp"))
    }

    // Cookies

    async fn set_cookies(&self, _cookies: &[Cookie]) -> ActorResult {
        Err(ActorError::Unsupported("set_cookies"))
    }

    /// Delete one cookie by name, or all cookies
    async fn delete_cookies(&self, _name: Option<&str>) -> ActorResult {
        Err(ActorError::Unsupported("delete_cookies"))
    }

    /// Load cookies from a Netscape cookies.txt document
    async fn load_cookies_netscape(&self, _text: &str) -> ActorResult {
        Err(ActorError::Unsupported("load_cookies_netscape"))
    }

    // Screenshots

    /// Base64-encoded PNG of the viewport
    async fn screenshot(&self) -> ActorResult {
        Err(ActorError::Unsupported("screenshot"))
    }

    async fn screenshot_element(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("screenshot_element"))
    }

    // Tabs

    async fn new_tab(&self) -> ActorResult {
        Err(ActorError::Unsupported("new_tab"))
    }

    async fn switch_tab(&self, _index: usize) -> ActorResult {
        Err(ActorError::Unsupported("switch_tab"))
    }

    async fn close_tab(&self) -> ActorResult {
        Err(ActorError::Unsupported("close_tab"))
    }

    async fn get_tabs(&self) -> ActorResult {
        Err(ActorError::Unsupported("get_tabs"))
    }

    // Frames

    async fn select_iframe(&self, _selector: &str) -> ActorResult {
        Err(ActorError::Unsupported("select_iframe"))
    }

    /// Enter the first frame whose source contains `url`
    async fn get_iframe_by_link(&self, _url: &str) -> ActorResult {
        Err(ActorError::Unsupported("get_iframe_by_link"))
    }

    async fn exit_iframe(&self) -> ActorResult {
        Err(ActorError::Unsupported("exit_iframe"))
    }

    // Waiting

    async fn sleep(&self, duration: Duration) -> ActorResult {
        tokio::time::sleep(duration).await;
        Ok(Value::Null)
    }

    /// Sleep a uniformly random time in `[min, max]`; returns the seconds slept
    async fn random_sleep(&self, min: Duration, max: Duration) -> ActorResult {
        let duration = pick_duration(min, max);
        tokio::time::sleep(duration).await;
        Ok(Value::from(duration.as_secs_f64()))
    }

    async fn wait_for_navigation(&self, _timeout: Duration) -> ActorResult {
        Err(ActorError::Unsupported("wait_for_navigation"))
    }

    /// Whether the element appeared before the timeout
    async fn wait_for_element(&self, _selector: &str, _timeout: Duration) -> ActorResult {
        Err(ActorError::Unsupported("wait_for_element"))
    }

    // Human mode

    async fn enable_human_mode(&self) -> ActorResult {
        Err(ActorError::Unsupported("enable_human_mode"))
    }

    async fn disable_human_mode(&self) -> ActorResult {
        Err(ActorError::Unsupported("disable_human_mode"))
    }

    // Fetch

    async fn fetch_get(&self, _request: FetchRequest) -> ActorResult {
        Err(ActorError::Unsupported("fetch_get"))
    }

    async fn fetch_post(&self, _request: FetchRequest) -> ActorResult {
        Err(ActorError::Unsupported("fetch_post"))
    }

    // Diagnostics

    async fn noop(&self) -> ActorResult {
        Ok(Value::Null)
    }
}

/// Uniform pick in `[min, max]`; callers guarantee `min <= max`
pub fn pick_duration(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    #[async_trait]
    impl BrowserActor for Bare {}

    #[tokio::test]
    async fn unimplemented_operations_are_unsupported() {
        let actor = Bare;
        assert_eq!(
            actor.click("#a").await,
            Err(ActorError::Unsupported("click"))
        );
        assert_eq!(
            actor.type_text("#a", "x").await,
            Err(ActorError::Unsupported("type"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn default_sleep_and_noop_work() {
        let actor = Bare;
        assert_eq!(actor.sleep(Duration::from_secs(5)).await, Ok(Value::Null));
        assert_eq!(actor.noop().await, Ok(Value::Null));

        let slept = actor
            .random_sleep(Duration::from_secs(1), Duration::from_secs(2))
            .await
            .unwrap();
        let secs = slept.as_f64().unwrap();
        assert!((1.0..=2.0).contains(&secs));
    }

    #[test]
    fn pick_duration_handles_degenerate_range() {
        let one = Duration::from_secs(1);
        assert_eq!(pick_duration(one, one), one);
    }
}
