//! Config for the search bridge.
use std::time::Duration;

use ldap3::LdapConnSettings;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Bridge configuration.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
	/// Maximum number of worker threads running blocking LDAP calls at once.
	#[serde(default = "default_workers")]
	pub workers: usize,
	/// Connection settings.
	#[serde(default)]
	pub connection: ConnectionConfig,
	/// Which callback receives errors of dispatched requests
	#[serde(default)]
	pub failure_routing: FailureRouting,
}

/// Configuration for how to connect to the LDAP server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
	/// Timeout to establish a connection in seconds.
	pub timeout: u64,

	/// LDAP operation timeout. How long a search waits for its result.
	pub operation_timeout: Duration,
}

/// Where errors of requests that reached a worker are delivered.
///
/// URLs that fail to parse always go to the failure callback when one was
/// given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureRouting {
	/// Deliver them to the success callback's error slot, ignoring any failure
	/// callback.
	#[default]
	SuccessCallback,
	/// Deliver them to the failure callback if one was given.
	FailureCallback,
}

/// Default for [`Config::workers`]
fn default_workers() -> usize {
	4
}

impl Default for Config {
	fn default() -> Self {
		Self {
			workers: default_workers(),
			connection: ConnectionConfig::default(),
			failure_routing: FailureRouting::default(),
		}
	}
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		Self { timeout: 5, operation_timeout: Duration::from_secs(30) }
	}
}

impl Config {
	/// Check that the configuration can be used to start a bridge.
	pub fn validate(&self) -> Result<(), Error> {
		if self.workers == 0 {
			return Err(Error::Config("workers must be at least 1".to_owned()));
		}
		if self.connection.operation_timeout.is_zero() {
			return Err(Error::Config("operation_timeout must not be zero".to_owned()));
		}
		Ok(())
	}
}

impl ConnectionConfig {
	/// Create a [`LdapConnSettings`] based on this [`ConnectionConfig`]
	#[must_use]
	pub fn to_settings(&self) -> LdapConnSettings {
		LdapConnSettings::new().set_conn_timeout(Duration::from_secs(self.timeout))
	}
}
