//! Bootstrap navigation for an opened notebook.
//!
//! [`navigate`] is a pure function over an already fetched aggregate: it
//! keeps a requested page when it belongs to the notebook, otherwise points
//! at the first page, and reports an empty notebook as a display state
//! rather than an error. [`NavigationSession`] tracks what the caller does
//! with that answer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::PageId;
use crate::domain::notebook::Notebook;

/// Where an opened notebook should land.
///
/// Serialises as `{"page": id}`, `{"redirectTo": id}`, or `{"empty": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NavigationDto", into = "NavigationDto")]
pub enum Navigation {
    /// Show the requested page as is.
    Page(PageId),
    /// Replace the location with this page.
    RedirectTo(PageId),
    /// The notebook has no pages; offer to create one.
    Empty,
}

impl Navigation {
    /// Page that ends up on screen, if any.
    pub fn target(&self) -> Option<PageId> {
        match self {
            Self::Page(id) | Self::RedirectTo(id) => Some(*id),
            Self::Empty => None,
        }
    }
}

/// Decide which page to display for `requested` within `notebook`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use notebooks::domain::UserId;
/// use notebooks::domain::navigator::{Navigation, navigate};
/// use notebooks::domain::notebook::{Notebook, WorkspaceLimits};
///
/// let limits = WorkspaceLimits::default();
/// let mut notebook =
///     Notebook::create(UserId::random(), "Notes", None, &limits, Utc::now()).expect("notebook");
/// assert_eq!(navigate(&notebook, None), Navigation::Empty);
///
/// let page = notebook.add_page("Intro", None, &limits).expect("page");
/// assert_eq!(navigate(&notebook, None), Navigation::RedirectTo(page.id()));
/// assert_eq!(navigate(&notebook, Some(&page.id())), Navigation::Page(page.id()));
/// ```
pub fn navigate(notebook: &Notebook, requested: Option<&PageId>) -> Navigation {
    let pages = notebook.pages();
    if let Some(page_id) = requested
        && pages.contains(page_id)
    {
        return Navigation::Page(*page_id);
    }
    match pages.first_page() {
        Ok(page) => Navigation::RedirectTo(page.id()),
        Err(_) => Navigation::Empty,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NavigationDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page: Option<PageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redirect_to: Option<PageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    empty: Option<bool>,
}

impl From<Navigation> for NavigationDto {
    fn from(value: Navigation) -> Self {
        let mut dto = Self {
            page: None,
            redirect_to: None,
            empty: None,
        };
        match value {
            Navigation::Page(id) => dto.page = Some(id),
            Navigation::RedirectTo(id) => dto.redirect_to = Some(id),
            Navigation::Empty => dto.empty = Some(true),
        }
        dto
    }
}

/// Malformed navigation payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("navigation must carry exactly one of page, redirectTo, or empty: true")]
pub struct NavigationShapeError;

impl TryFrom<NavigationDto> for Navigation {
    type Error = NavigationShapeError;

    fn try_from(value: NavigationDto) -> Result<Self, Self::Error> {
        match (value.page, value.redirect_to, value.empty) {
            (Some(id), None, None) => Ok(Self::Page(id)),
            (None, Some(id), None) => Ok(Self::RedirectTo(id)),
            (None, None, Some(true)) => Ok(Self::Empty),
            _ => Err(NavigationShapeError),
        }
    }
}

/// Display state of one open notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The aggregate is still being fetched.
    Loading,
    /// A page inside the notebook is on screen.
    HasValidPage(PageId),
    /// Waiting for the location to change to this page.
    Redirecting(PageId),
    /// The notebook has no pages.
    Empty,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("loading"),
            Self::HasValidPage(id) => write!(f, "showing page {id}"),
            Self::Redirecting(id) => write!(f, "redirecting to {id}"),
            Self::Empty => f.write_str("empty"),
        }
    }
}

/// Rejected state change on a [`NavigationSession`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {event} while {from}")]
pub struct InvalidTransition {
    /// State the session was in.
    pub from: SessionState,
    /// Event that was attempted.
    pub event: &'static str,
}

/// Per-notebook navigation state machine.
///
/// `Loading` moves to one of the three outcomes of [`navigate`].
/// `Redirecting` settles once the caller lands on the redirect target and
/// `Empty` settles once a first page exists. Nothing else is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSession {
    state: SessionState,
}

impl Default for NavigationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationSession {
    /// Start a session for a notebook being fetched.
    pub fn new() -> Self {
        Self {
            state: SessionState::Loading,
        }
    }

    /// Current display state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Page whose content may be rendered, if any.
    pub fn current_page(&self) -> Option<PageId> {
        match self.state {
            SessionState::HasValidPage(id) => Some(id),
            _ => None,
        }
    }

    /// Apply the navigator's answer once the aggregate has loaded.
    pub fn loaded(&mut self, navigation: Navigation) -> Result<SessionState, InvalidTransition> {
        if self.state != SessionState::Loading {
            return Err(self.reject("finish loading"));
        }
        self.state = match navigation {
            Navigation::Page(id) => SessionState::HasValidPage(id),
            Navigation::RedirectTo(id) => SessionState::Redirecting(id),
            Navigation::Empty => SessionState::Empty,
        };
        Ok(self.state)
    }

    /// Record that the location now shows `landed_on`.
    pub fn redirect_completed(&mut self, landed_on: PageId) -> Result<SessionState, InvalidTransition> {
        match self.state {
            SessionState::Redirecting(target) if target == landed_on => {
                self.state = SessionState::HasValidPage(landed_on);
                Ok(self.state)
            }
            _ => Err(self.reject("complete a redirect")),
        }
    }

    /// Record that the first page of an empty notebook was created.
    pub fn page_created(&mut self, page_id: PageId) -> Result<SessionState, InvalidTransition> {
        if self.state != SessionState::Empty {
            return Err(self.reject("adopt a created page"));
        }
        self.state = SessionState::HasValidPage(page_id);
        Ok(self.state)
    }

    fn reject(&self, event: &'static str) -> InvalidTransition {
        InvalidTransition {
            from: self.state,
            event,
        }
    }
}
