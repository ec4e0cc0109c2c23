use std::cell::{Cell, RefCell};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub access_token: Option<String>,
}

impl Identity {
    pub fn new<S: Into<String>>(id: S) -> Identity {
        Identity {
            id: id.into(),
            email: None,
            access_token: None,
        }
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.email {
            Some(ref email) => write!(f, "{}", email),
            None => write!(f, "{}", self.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(usize);

pub type Listener = Box<dyn Fn(Option<&Identity>)>;

/// Where the current user comes from. Passed explicitly to whoever needs
/// it rather than looked up globally.
pub trait IdentityProvider {
    fn current(&self) -> Option<Identity>;

    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// In-process session. Listeners are called synchronously on every change
/// and must not subscribe or unsubscribe from inside the callback.
#[derive(Default)]
pub struct Session {
    identity: RefCell<Option<Identity>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<usize>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn with_identity(identity: Option<Identity>) -> Session {
        let session = Session::new();
        *session.identity.borrow_mut() = identity;
        session
    }

    pub fn sign_in(&self, identity: Identity) {
        debug!(user = %identity.id, "session.sign_in");
        *self.identity.borrow_mut() = Some(identity);
        self.notify();
    }

    pub fn sign_out(&self) {
        let previous = self.identity.borrow_mut().take();
        if previous.is_some() {
            debug!("session.sign_out");
            self.notify();
        }
    }

    fn notify(&self) {
        let identity = self.identity.borrow().clone();
        for &(_, ref listener) in self.listeners.borrow().iter() {
            listener(identity.as_ref());
        }
    }
}

impl IdentityProvider for Session {
    fn current(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|&(listener_id, _)| listener_id != id);
        listeners.len() != before
    }
}
