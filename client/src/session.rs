use std::path::PathBuf;

use apkshelf_lib::auth::{Identity, IdentityProvider, Session, SubscriptionId};

use crate::config::{load_config, save_config, Auth, Config};

/// A session seeded from the `[auth]` table of the config.
pub fn open_session(config: &Config) -> Session {
    Session::with_identity(config.auth.identity())
}

/// Keeps the `[auth]` table of the config file at `path` in step with the
/// session. Other tables in the file are left alone.
pub fn persist_to(session: &Session, path: PathBuf) -> SubscriptionId {
    session.subscribe(Box::new(move |identity: Option<&Identity>| {
        let result = load_config(&path).and_then(|config| {
            save_config(
                &path,
                &Config {
                    auth: Auth::from_identity(identity),
                    ..config
                },
            )
        });
        match result {
            Ok(()) => debug!(path = ?path, "session.persisted"),
            Err(err) => warn!(error = %err, "unable to save login state"),
        }
    }))
}
