#![allow(dead_code)]

use std::{
	cell::RefCell,
	collections::{HashMap, HashSet},
	error::Error,
	rc::Rc,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex, PoisonError,
	},
	thread,
	time::Duration,
};

use ldap3::LdapConnAsync;
use ldap_bridge::{Connection, Directory, Entry, ResultCode, Scope, SearchMessage, SearchQuery};
use serde_json::Value;

/// How a mock server answers.
#[derive(Debug, Clone)]
pub enum Behavior {
	/// Return these entries with a success code.
	Entries(Vec<Entry>),
	/// Return a terminal result carrying this code and no entries.
	Code(ResultCode),
	/// Fail the search call itself.
	SearchFails(ResultCode),
	/// Refuse to initialize a connection.
	Refuse(ResultCode),
	/// Reject the protocol version.
	RejectVersion,
	/// Panic inside the search call.
	Panic,
	/// Sleep, then behave as the inner behavior.
	Delay(Duration, Box<Behavior>),
}

/// A search the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
	pub uri: String,
	pub base: String,
	pub scope: Scope,
	pub filter: String,
	pub attributes: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
	servers: Mutex<HashMap<String, Behavior>>,
	searches: Mutex<Vec<RecordedSearch>>,
	initialize_calls: AtomicUsize,
	connections_opened: AtomicUsize,
	connections_closed: AtomicUsize,
	messages_opened: AtomicUsize,
	messages_closed: AtomicUsize,
}

/// A directory collaborator that serves canned answers per connection URI and
/// counts every handle it hands out and gets back.
#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
	state: Arc<State>,
}

impl MockDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Configure the answer for a connection URI such as `ldap://a:389/`.
	pub fn serve(self, uri: &str, behavior: Behavior) -> Self {
		self.state
			.servers
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(uri.to_owned(), behavior);
		self
	}

	pub fn initialize_calls(&self) -> usize {
		self.state.initialize_calls.load(Ordering::SeqCst)
	}

	pub fn connections(&self) -> (usize, usize) {
		(
			self.state.connections_opened.load(Ordering::SeqCst),
			self.state.connections_closed.load(Ordering::SeqCst),
		)
	}

	pub fn messages(&self) -> (usize, usize) {
		(
			self.state.messages_opened.load(Ordering::SeqCst),
			self.state.messages_closed.load(Ordering::SeqCst),
		)
	}

	/// Assert that every handle handed out was released again.
	pub fn assert_balanced(&self) {
		let (opened, closed) = self.connections();
		assert_eq!(opened, closed, "Every connection handle should be released");
		let (opened, closed) = self.messages();
		assert_eq!(opened, closed, "Every message handle should be released");
	}

	pub fn searches(&self) -> Vec<RecordedSearch> {
		self.state.searches.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}
}

impl Directory for MockDirectory {
	type Connection = MockConnection;

	fn initialize(&self, uri: &str) -> Result<Self::Connection, ResultCode> {
		self.state.initialize_calls.fetch_add(1, Ordering::SeqCst);
		let behavior = self
			.state
			.servers
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(uri)
			.cloned()
			.unwrap_or(Behavior::Refuse(ResultCode::SERVER_DOWN));
		if let Behavior::Refuse(code) = behavior {
			return Err(code);
		}
		self.state.connections_opened.fetch_add(1, Ordering::SeqCst);
		Ok(MockConnection { uri: uri.to_owned(), behavior, state: Arc::clone(&self.state) })
	}
}

pub struct MockConnection {
	uri: String,
	behavior: Behavior,
	state: Arc<State>,
}

impl MockConnection {
	fn answer(&self, behavior: &Behavior) -> Result<MockMessage, ResultCode> {
		match behavior {
			Behavior::Entries(entries) => Ok(self.message(ResultCode::SUCCESS, entries.clone())),
			Behavior::Code(code) => Ok(self.message(*code, Vec::new())),
			Behavior::SearchFails(code) | Behavior::Refuse(code) => Err(*code),
			Behavior::RejectVersion => Err(ResultCode::PROTOCOL_ERROR),
			Behavior::Panic => panic!("mock directory exploded"),
			Behavior::Delay(delay, inner) => {
				thread::sleep(*delay);
				self.answer(inner)
			}
		}
	}

	fn message(&self, code: ResultCode, entries: Vec<Entry>) -> MockMessage {
		self.state.messages_opened.fetch_add(1, Ordering::SeqCst);
		MockMessage { code, entries: entries.into_iter(), state: Arc::clone(&self.state) }
	}
}

impl Connection for MockConnection {
	type Message = MockMessage;

	fn set_protocol_version(&mut self, version: u8) -> Result<(), ResultCode> {
		assert_eq!(version, 3);
		match self.behavior {
			Behavior::RejectVersion => Err(ResultCode::NOT_SUPPORTED),
			_ => Ok(()),
		}
	}

	fn search(&mut self, query: &SearchQuery<'_>, _wait: Duration) -> Result<MockMessage, ResultCode> {
		self.state.searches.lock().unwrap_or_else(PoisonError::into_inner).push(RecordedSearch {
			uri: self.uri.clone(),
			base: query.base.to_owned(),
			scope: query.scope,
			filter: query.filter.to_owned(),
			attributes: query.attributes.to_vec(),
		});
		let behavior = self.behavior.clone();
		self.answer(&behavior)
	}
}

impl Drop for MockConnection {
	fn drop(&mut self) {
		self.state.connections_closed.fetch_add(1, Ordering::SeqCst);
	}
}

pub struct MockMessage {
	code: ResultCode,
	entries: std::vec::IntoIter<Entry>,
	state: Arc<State>,
}

impl SearchMessage for MockMessage {
	fn result_code(&self) -> ResultCode {
		self.code
	}

	fn next_entry(&mut self) -> Option<Entry> {
		self.entries.next()
	}
}

impl Drop for MockMessage {
	fn drop(&mut self) {
		self.state.messages_closed.fetch_add(1, Ordering::SeqCst);
	}
}

/// Every invocation a callback received, in order.
pub type Calls = Rc<RefCell<Vec<(Option<String>, Option<Value>)>>>;

/// A callback that records its invocations into the returned list.
pub fn recorder() -> (Calls, impl FnOnce(Option<String>, Option<Value>) + 'static) {
	let calls = Calls::default();
	let sink = Rc::clone(&calls);
	(calls, move |err, result| sink.borrow_mut().push((err, result)))
}

pub async fn ldap_connect() -> Result<ldap3::Ldap, Box<dyn Error>> {
	let (conn, mut ldap) = LdapConnAsync::new("ldap://localhost:1389").await?;
	let _handle = tokio::spawn(async move {
		if let Err(err) = conn.drive().await {
			panic!("Ldap connection error {err}");
		}
	});
	ldap.simple_bind("cn=admin,dc=example,dc=org", "adminpassword").await?;
	Ok(ldap)
}

pub async fn ldap_add_organizational_unit(
	ldap: &mut ldap3::Ldap,
	ou: &str,
) -> Result<(), Box<dyn Error>> {
	ldap.add(
		&format!("ou={},dc=example,dc=org", ou),
		vec![("objectClass", ["organizationalUnit"].into())],
	)
	.await?
	.success()?;
	Ok(())
}

pub async fn ldap_delete_organizational_unit(
	ldap: &mut ldap3::Ldap,
	ou: &str,
) -> Result<(), Box<dyn Error>> {
	ldap.delete(&format!("ou={},dc=example,dc=org", ou)).await?.success()?;
	Ok(())
}

pub async fn ldap_add_user(
	ldap: &mut ldap3::Ldap,
	cn: &str,
	sn: &str,
	mail: &[&str],
) -> Result<(), Box<dyn Error>> {
	let mut attrs: Vec<(&str, HashSet<&str>)> =
		vec![("objectClass", ["inetOrgPerson"].into()), ("sn", [sn].into())];
	if !mail.is_empty() {
		attrs.push(("mail", mail.iter().copied().collect()));
	}
	ldap.add(&format!("cn={},ou=users,dc=example,dc=org", cn), attrs).await?.success()?;
	Ok(())
}

pub async fn ldap_delete_user(ldap: &mut ldap3::Ldap, cn: &str) -> Result<(), Box<dyn Error>> {
	ldap.delete(&format!("cn={},ou=users,dc=example,dc=org", cn)).await?.success()?;
	Ok(())
}
