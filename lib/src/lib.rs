extern crate chrono;
extern crate data_encoding;
extern crate mime;
extern crate rand;
extern crate rmp_serde;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate quick_error;
#[macro_use]
extern crate tracing;
#[cfg(test)]
#[macro_use]
extern crate matches;
#[cfg(test)]
extern crate tempfile;

pub mod error;
pub mod record;
pub mod backend;
pub mod asset;
pub mod auth;
pub mod draft;
pub mod progress;
pub mod publish;
pub mod catalog;
pub mod format;
pub mod test_helpers;
