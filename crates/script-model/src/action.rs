//! Action vocabulary
//!
//! The fixed set of operations a script may ask the browser actor to perform.
//! Wire names are snake_case and match the `action` key of a step document.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Functional grouping of action kinds, used for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionGroup {
    Navigation,
    Interaction,
    Extraction,
    Parsing,
    Script,
    Cookies,
    Screenshots,
    Tabs,
    Frames,
    Waiting,
    HumanMode,
    Fetch,
    Diagnostics,
}

impl ActionGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionGroup::Navigation => "navigation",
            ActionGroup::Interaction => "interaction",
            ActionGroup::Extraction => "extraction",
            ActionGroup::Parsing => "parsing",
            ActionGroup::Script => "script",
            ActionGroup::Cookies => "cookies",
            ActionGroup::Screenshots => "screenshots",
            ActionGroup::Tabs => "tabs",
            ActionGroup::Frames => "frames",
            ActionGroup::Waiting => "waiting",
            ActionGroup::HumanMode => "human_mode",
            ActionGroup::Fetch => "fetch",
            ActionGroup::Diagnostics => "diagnostics",
        }
    }
}

macro_rules! action_kinds {
    ($(
        $(#[$meta:meta])*
        $variant:ident => $name:literal, $group:ident, [$($field:literal),*];
    )*) => {
        /// One entry of the action vocabulary
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        pub enum ActionKind {
            $( $(#[$meta])* #[serde(rename = $name)] $variant, )*
        }

        impl ActionKind {
            /// Every action kind, in vocabulary order
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$variant,)*];

            /// Wire name of the action
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ActionKind::$variant => $name,)*
                }
            }

            pub fn group(&self) -> ActionGroup {
                match self {
                    $(ActionKind::$variant => ActionGroup::$group,)*
                }
            }

            /// Human-readable list of the fields this kind requires
            pub fn required_fields(&self) -> &'static [&'static str] {
                match self {
                    $(ActionKind::$variant => &[$($field),*],)*
                }
            }
        }

        impl FromStr for ActionKind {
            type Err = ModelError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $($name => Ok(ActionKind::$variant),)*
                    other => Err(ModelError::UnknownAction(other.to_string())),
                }
            }
        }
    };
}

action_kinds! {
    /// Load a URL in the current tab
    Navigate => "navigate", Navigation, ["url"];
    /// Load a URL with a search-engine referrer
    GoogleGet => "google_get", Navigation, ["url"];
    /// Load a URL with `params.via` as referrer
    GetVia => "get_via", Navigation, ["url", "params.via"];
    Back => "back", Navigation, [];
    Forward => "forward", Navigation, [];
    Refresh => "refresh", Navigation, [];

    Click => "click", Interaction, ["selector"];
    /// Send keys to an element
    Type => "type", Interaction, ["selector", "text"];
    Clear => "clear", Interaction, ["selector"];
    SelectOption => "select_option", Interaction, ["selector", "value"];
    /// Scroll by `params.x`/`params.y`, or to the bottom of the page
    Scroll => "scroll", Interaction, [];
    ScrollIntoView => "scroll_into_view", Interaction, ["selector"];
    Hover => "hover", Interaction, ["selector"];
    Focus => "focus", Interaction, ["selector"];
    DragAndDrop => "drag_and_drop", Interaction, ["selector", "params.target"];

    GetText => "get_text", Extraction, ["selector"];
    GetAttribute => "get_attribute", Extraction, ["selector", "attribute"];
    GetHtml => "get_html", Extraction, ["selector"];
    GetPageHtml => "get_page_html", Extraction, [];
    GetPageText => "get_page_text", Extraction, [];
    GetUrl => "get_url", Extraction, [];
    GetTitle => "get_title", Extraction, [];
    GetCookies => "get_cookies", Extraction, [];
    IsElementPresent => "is_element_present", Extraction, ["selector"];

    /// Parse the page (or one element) into text/html/title
    Soupify => "soupify", Parsing, [];
    SoupifySelect => "soupify_select", Parsing, ["selector"];
    SoupifySelectAll => "soupify_select_all", Parsing, ["selector"];

    RunJs => "run_js", Script, ["script"];
    /// Raw DevTools protocol command from `params.cmd`
    RunCdp => "run_cdp", Script, ["params.cmd"];

    SetCookies => "set_cookies", Cookies, ["cookies"];
    DeleteCookies => "delete_cookies", Cookies, [];
    LoadCookiesNetscape => "load_cookies_netscape", Cookies, ["cookies_text"];

    Screenshot => "screenshot", Screenshots, [];
    ScreenshotElement => "screenshot_element", Screenshots, ["selector"];

    NewTab => "new_tab", Tabs, [];
    SwitchTab => "switch_tab", Tabs, ["tab_index"];
    CloseTab => "close_tab", Tabs, [];
    GetTabs => "get_tabs", Tabs, [];

    SelectIframe => "select_iframe", Frames, ["iframe_selector"];
    GetIframeByLink => "get_iframe_by_link", Frames, ["url"];
    ExitIframe => "exit_iframe", Frames, [];

    Sleep => "sleep", Waiting, ["seconds"];
    RandomSleep => "random_sleep", Waiting, ["min_seconds", "max_seconds"];
    WaitForNavigation => "wait_for_navigation", Waiting, [];
    WaitForElement => "wait_for_element", Waiting, ["selector"];

    EnableHumanMode => "enable_human_mode", HumanMode, [];
    DisableHumanMode => "disable_human_mode", HumanMode, [];

    FetchGet => "fetch_get", Fetch, ["url"];
    FetchPost => "fetch_post", Fetch, ["url"];

    /// Do nothing; the actor answers with its own echo value
    Noop => "noop", Diagnostics, [];
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "teleport".parse::<ActionKind>().unwrap_err();
        assert!(matches!(err, ModelError::UnknownAction(name) if name == "teleport"));
    }

    #[test]
    fn serde_uses_wire_names() {
        let encoded = serde_json::to_string(&ActionKind::ScrollIntoView).unwrap();
        assert_eq!(encoded, "\"scroll_into_view\"");
        let decoded: ActionKind = serde_json::from_str("\"get_via\"").unwrap();
        assert_eq!(decoded, ActionKind::GetVia);
    }

    #[test]
    fn requirements_are_described() {
        assert_eq!(ActionKind::Navigate.required_fields(), &["url"]);
        assert!(ActionKind::Back.required_fields().is_empty());
        assert_eq!(ActionKind::Type.group(), ActionGroup::Interaction);
    }
}
