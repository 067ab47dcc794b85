//! Navigation header derived from the session.

use std::cell::RefCell;
use std::rc::Rc;

use api::{HttpTransport, SessionStore, SubscriptionId};
use store::{KeyValueStore, Session};

use crate::routes::Route;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavItem {
    Link { label: &'static str, route: Route },
    /// Sign out, then go to [`Route::Home`].
    Logout,
}

/// What the header shows for a given session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderModel {
    /// Display name of the signed-in member.
    pub member: Option<String>,
    pub items: Vec<NavItem>,
}

impl HeaderModel {
    pub fn from_session(session: &Session) -> Self {
        let mut items = vec![NavItem::Link {
            label: "Blog",
            route: Route::BlogList,
        }];

        match session.identity() {
            Some(identity) => {
                items.push(NavItem::Link {
                    label: "New post",
                    route: Route::CreatePost,
                });
                items.push(NavItem::Link {
                    label: "My blog",
                    route: Route::MemberBlog(identity.id),
                });
                items.push(NavItem::Logout);
                Self {
                    member: Some(identity.display_name().to_string()),
                    items,
                }
            }
            None => {
                items.push(NavItem::Link {
                    label: "Login",
                    route: Route::Login,
                });
                items.push(NavItem::Link {
                    label: "Sign up",
                    route: Route::Signup,
                });
                Self {
                    member: None,
                    items,
                }
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.member.is_some()
    }

    /// Subscribe to `session` and keep a model current until dropped.
    pub fn bind<S: KeyValueStore, T: HttpTransport>(
        session: &SessionStore<S, T>,
    ) -> LiveHeader<S, T> {
        let model = Rc::new(RefCell::new(Self::from_session(&session.current())));
        let target = Rc::clone(&model);
        let subscription = session.on_change(move |s| {
            target.replace(HeaderModel::from_session(s));
        });
        LiveHeader {
            model,
            session: session.clone(),
            subscription,
        }
    }
}

/// A [`HeaderModel`] kept in sync with a [`SessionStore`].
pub struct LiveHeader<S: KeyValueStore, T: HttpTransport> {
    model: Rc<RefCell<HeaderModel>>,
    session: SessionStore<S, T>,
    subscription: SubscriptionId,
}

impl<S: KeyValueStore, T: HttpTransport> LiveHeader<S, T> {
    pub fn current(&self) -> HeaderModel {
        self.model.borrow().clone()
    }
}

impl<S: KeyValueStore, T: HttpTransport> Drop for LiveHeader<S, T> {
    fn drop(&mut self) {
        self.session.unsubscribe(self.subscription);
    }
}
