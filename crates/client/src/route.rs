//! Pages and the route guard applied on every page load.

use carpool_core::{Role, SessionIdentity};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Page {
    Index,
    Login,
    Signup,
    Admin,
    Driver,
    User,
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Index => "index",
            Page::Login => "login",
            Page::Signup => "signup",
            Page::Admin => "admin",
            Page::Driver => "driver",
            Page::User => "user",
        }
    }

    /// Landing page of a logged-in role.
    pub fn landing(role: Role) -> Page {
        match role {
            Role::Admin => Page::Admin,
            Role::Driver => Page::Driver,
            Role::User => Page::User,
        }
    }

    /// Entry and auth pages a logged-in user is sent away from.
    pub fn is_entry(&self) -> bool {
        matches!(self, Page::Index | Page::Login | Page::Signup)
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Page::Admin | Page::Driver | Page::User)
    }
}

impl core::fmt::Display for Page {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where to send the user instead of `page`, if anywhere.
///
/// - logged in on an entry page → the role's landing page
/// - anonymous on a page that needs a session → login
/// - non-admin on the admin page → login
pub fn guard(page: Page, identity: Option<&SessionIdentity>) -> Option<Page> {
    match identity {
        Some(identity) if page.is_entry() => Some(Page::landing(identity.role)),
        Some(identity) if page == Page::Admin && !identity.is_admin() => Some(Page::Login),
        Some(_) => None,
        None if page.requires_auth() => Some(Page::Login),
        None => None,
    }
}
