//! Capturing host arguments into a search request.
use std::fmt;

use serde_json::Value;

use crate::{
	error::ArgumentError,
	ldap_url::{LdapUrl, UrlError},
};

/// A host callback, invoked at most once with `(error, result)`. Exactly one
/// of the two is `Some`.
pub type Callback = Box<dyn FnOnce(Option<String>, Option<Value>)>;

/// One argument passed by the host to [`Bridge::search`](crate::Bridge::search).
pub enum Argument {
	/// A plain host value.
	Value(Value),
	/// A host function.
	Function(Callback),
}

impl Argument {
	/// Wrap a closure as a function argument.
	#[must_use]
	pub fn function<F>(f: F) -> Self
	where
		F: FnOnce(Option<String>, Option<Value>) + 'static,
	{
		Argument::Function(Box::new(f))
	}
}

impl fmt::Debug for Argument {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Argument::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Argument::Function(_) => f.write_str("Function"),
		}
	}
}

impl From<Value> for Argument {
	fn from(value: Value) -> Self {
		Argument::Value(value)
	}
}

impl From<&str> for Argument {
	fn from(value: &str) -> Self {
		Argument::Value(Value::String(value.to_owned()))
	}
}

impl From<String> for Argument {
	fn from(value: String) -> Self {
		Argument::Value(Value::String(value))
	}
}

/// A search request, from argument capture until its callback has run.
pub struct ConnectionRequest {
	/// The URL exactly as the caller passed it
	pub(crate) uri: String,
	/// The parsed URL, or why it could not be parsed
	pub(crate) parsed_url: Result<LdapUrl, UrlError>,
	/// Receives the result, and errors unless routed elsewhere
	pub(crate) on_success: Callback,
	/// Receives URL errors, and optionally other errors
	pub(crate) on_failure: Option<Callback>,
}

impl ConnectionRequest {
	/// Validate host arguments `(ldap_uri, callback[, error_callback])` and
	/// capture them. Fails only on argument shape; a URL that does not parse
	/// is captured and reported through the callbacks later.
	pub fn build(args: Vec<Argument>) -> Result<Self, ArgumentError> {
		if args.len() < 2 {
			return Err(ArgumentError("Required arguments: ldap_uri, callback"));
		}
		if args.len() > 3 {
			return Err(ArgumentError("Too many arguments: ldap_uri, callback, error_callback"));
		}
		let mut args = args.into_iter();
		let (Some(uri), Some(on_success)) = (args.next(), args.next()) else {
			return Err(ArgumentError("Required arguments: ldap_uri, callback"));
		};

		let Argument::Value(Value::String(uri)) = uri else {
			return Err(ArgumentError("ldap_uri should be a string"));
		};
		let Argument::Function(on_success) = on_success else {
			return Err(ArgumentError("success callback should be a function"));
		};
		let on_failure = match args.next() {
			Some(Argument::Function(on_failure)) => Some(on_failure),
			Some(Argument::Value(_)) => {
				return Err(ArgumentError("error callback should be a function"))
			}
			None => None,
		};

		Ok(Self::new(uri, on_success, on_failure))
	}

	/// Capture an already typed request.
	#[must_use]
	pub fn new(uri: impl Into<String>, on_success: Callback, on_failure: Option<Callback>) -> Self {
		let uri = uri.into();
		let parsed_url = LdapUrl::parse(&uri);
		Self { uri, parsed_url, on_success, on_failure }
	}

	/// The URL exactly as given.
	#[must_use]
	pub fn uri(&self) -> &str {
		&self.uri
	}

	/// The parsed URL, or why it is invalid.
	#[must_use]
	pub fn parsed_url(&self) -> Result<&LdapUrl, &UrlError> {
		self.parsed_url.as_ref()
	}
}

impl fmt::Debug for ConnectionRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionRequest")
			.field("uri", &self.uri)
			.field("parsed_url", &self.parsed_url)
			.field("on_failure", &self.on_failure.is_some())
			.finish_non_exhaustive()
	}
}
