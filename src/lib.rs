//! Run LDAP searches off the host's control thread and deliver their results
//! to error-first callbacks.
//!
//! A search is described entirely by an [LDAP URL] such as
//! `ldap://directory.example.com/ou=people,dc=example,dc=com?cn,mail?sub?(objectClass=person)`.
//! The [`Bridge`] validates the caller's arguments, hands the blocking library
//! calls (connect, search, wait for the result, walk the entries) to a bounded
//! pool of worker threads, and invokes exactly one callback per search back on
//! the thread that owns the bridge, as `callback(error, result)` with exactly
//! one of the two present.
//!
//! The LDAP protocol itself is left to a client library behind the
//! [`Directory`] trait. [`ldap::Ldap`] implements it with the `ldap3` crate; for
//! a primer on LDAP itself, the [introduction] that comes with `ldap3` is an
//! excellent resource.
//!
//! [LDAP URL]: https://www.rfc-editor.org/rfc/rfc4516.html
//! [introduction]: https://github.com/inejge/ldap3/blob/master/LDAP-primer.md
//!
//! # Getting started
//! ```no_run
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use ldap_bridge::{Argument, Bridge, Config};
//!
//! let bridge = Bridge::with_ldap3(Config::default())?;
//! bridge.search(vec![
//!     "ldap://localhost:1389/ou=users,dc=example,dc=org?cn,sn?sub?(objectClass=inetOrgPerson)".into(),
//!     Argument::function(|err, result| match (err, result) {
//!         (Some(err), _) => eprintln!("Search failed: {err}"),
//!         (None, Some(entries)) => println!("Result: {entries:#}"),
//!         (None, None) => unreachable!(),
//!     }),
//! ])?;
//!
//! // The control thread is free until it decides to wait.
//! bridge.run_until_idle();
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//! * Each search opens its own connection and binds anonymously; connections
//!   are never pooled or reused.
//! * Results are collected in full before the callback runs; there is no
//!   paging or streaming.
//! * A dispatched search cannot be cancelled.

mod bridge;
pub mod config;
pub mod directory;
pub mod entry;
pub mod error;
pub mod ldap;
pub mod ldap_url;
pub mod request;
pub mod result_code;
pub mod worker;

pub use ldap3;

pub use crate::{
	bridge::Bridge,
	config::{Config, ConnectionConfig, FailureRouting},
	directory::{Connection, Directory, SearchMessage, SearchQuery},
	entry::Entry,
	error::{ArgumentError, Error, INVALID_URI},
	ldap_url::{LdapUrl, Scope},
	request::{Argument, Callback, ConnectionRequest},
	result_code::ResultCode,
};
