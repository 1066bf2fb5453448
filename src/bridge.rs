//! Dispatching searches to the worker pool and completing them on the
//! control thread.
//!
//! A [`Bridge`] lives on the host's control thread. Each search is split in
//! two: the parsed URL travels to a blocking worker thread, while the callbacks
//! stay behind in the bridge, keyed by request id. When a worker finishes it
//! sends its report over a channel; [`Bridge::poll`] and
//! [`Bridge::run_until_idle`] receive reports on the control thread and invoke
//! the matching callback. Callbacks therefore never run on a worker thread.
//!
//! All operations take `&self`, and no internal borrow is held while a callback
//! runs, so a callback may start further searches through a shared
//! `Rc<Bridge>`.
use std::{
	cell::{Cell, RefCell},
	collections::HashMap,
	sync::Arc,
};

use serde_json::Value;
use tokio::{
	runtime::{Handle, Runtime},
	sync::mpsc::{self, error::TryRecvError},
	task,
};
use tracing::{debug, error, warn};

use crate::{
	config::{Config, FailureRouting},
	directory::Directory,
	entry,
	error::{ArgumentError, Error},
	ldap::Ldap,
	request::{Argument, Callback, ConnectionRequest},
	worker::{self, SearchOutcome, WorkerReport},
};

/// Identifies one outstanding request.
type RequestId = u64;

/// The callbacks of a dispatched request, waiting for its report.
struct Pending {
	/// Success callback
	on_success: Callback,
	/// Optional failure callback
	on_failure: Option<Callback>,
}

/// A finished request as seen by the control thread.
#[derive(Debug)]
struct Completion {
	/// Which request finished
	id: RequestId,
	/// How it finished
	report: Report,
}

/// Which callback a completion is meant for.
#[derive(Debug, Clone, Copy)]
enum Target {
	/// The success callback
	Success,
	/// The failure callback, or the success callback if there is none
	Failure,
}

/// How a request finished.
#[derive(Debug)]
enum Report {
	/// The URL did not parse; no worker was involved.
	InvalidUri(Error),
	/// A worker ran the request.
	Worker(WorkerReport),
}

/// Runs LDAP searches on a bounded pool of worker threads and delivers each
/// result to its callback on the thread that owns the bridge.
///
/// Dropping the bridge blocks until every outstanding callback has run. A
/// bridge dropped from inside an async context cannot block; it then shuts its
/// workers down in the background and the outstanding callbacks never run.
pub struct Bridge<D: Directory> {
	/// Bridge configuration
	config: Config,
	/// The LDAP library used by workers
	directory: Arc<D>,
	/// Runtime whose blocking pool runs the workers, taken on drop
	runtime: Option<Runtime>,
	/// Handle to `runtime`
	handle: Handle,
	/// Handed to workers to report completion
	sender: mpsc::UnboundedSender<Completion>,
	/// Reports from workers, read on the control thread only
	receiver: RefCell<mpsc::UnboundedReceiver<Completion>>,
	/// Callbacks of requests that have not completed yet
	pending: RefCell<HashMap<RequestId, Pending>>,
	/// Id for the next request
	next_id: Cell<RequestId>,
}

impl Bridge<Ldap> {
	/// Create a bridge that searches real directories through `ldap3`.
	pub fn with_ldap3(config: Config) -> Result<Self, Error> {
		let directory = Ldap::new(config.connection.clone());
		Self::new(directory, config)
	}
}

impl<D: Directory> Bridge<D> {
	/// Create a bridge running searches against `directory`.
	pub fn new(directory: D, config: Config) -> Result<Self, Error> {
		config.validate()?;
		let runtime = tokio::runtime::Builder::new_multi_thread()
			.worker_threads(1)
			.max_blocking_threads(config.workers)
			.thread_name("ldap-bridge-worker")
			.enable_all()
			.build()?;
		let (sender, receiver) = mpsc::unbounded_channel();
		Ok(Self {
			config,
			directory: Arc::new(directory),
			handle: runtime.handle().clone(),
			runtime: Some(runtime),
			sender,
			receiver: RefCell::new(receiver),
			pending: RefCell::new(HashMap::new()),
			next_id: Cell::new(0),
		})
	}

	/// Start a search from host arguments `(ldap_uri, callback[,
	/// error_callback])`.
	///
	/// Returns immediately. Wrongly shaped arguments are rejected here and
	/// nothing is scheduled; every other outcome, including an unparsable URL,
	/// reaches a callback exactly once.
	pub fn search(&self, args: Vec<Argument>) -> Result<(), ArgumentError> {
		let request = ConnectionRequest::build(args)?;
		self.dispatch(request);
		Ok(())
	}

	/// Start a search with typed arguments.
	pub fn search_with<S>(&self, uri: &str, on_success: S, on_failure: Option<Callback>)
	where
		S: FnOnce(Option<String>, Option<Value>) + 'static,
	{
		self.dispatch(ConnectionRequest::new(uri, Box::new(on_success), on_failure));
	}

	/// Schedule a built request.
	pub fn dispatch(&self, request: ConnectionRequest) {
		let ConnectionRequest { uri, parsed_url, on_success, on_failure } = request;
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		self.pending.borrow_mut().insert(id, Pending { on_success, on_failure });

		let url = match parsed_url {
			Ok(url) => url,
			Err(err) => {
				debug!(id, "Rejecting invalid LDAP URI {uri:?}: {err}");
				self.send(Completion { id, report: Report::InvalidUri(Error::InvalidUri(err)) });
				return;
			}
		};

		debug!(id, "Dispatching search {uri}");
		let directory = Arc::clone(&self.directory);
		let wait = self.config.connection.operation_timeout;
		let sender = self.sender.clone();
		self.handle.spawn(async move {
			let report =
				match task::spawn_blocking(move || worker::run(directory.as_ref(), &url, wait)).await {
					Ok(report) => report,
					Err(err) => {
						error!(id, "Search worker failed: {err}");
						WorkerReport {
							connected: true,
							outcome: SearchOutcome::LibraryError("Worker task failed".to_owned()),
						}
					}
				};
			if sender.send(Completion { id, report: Report::Worker(report) }).is_err() {
				debug!(id, "Bridge dropped before search completed");
			}
		});
	}

	/// Number of requests whose callback has not run yet. While this is not
	/// zero the host must keep calling [`Bridge::poll`] or
	/// [`Bridge::run_until_idle`].
	#[must_use]
	pub fn outstanding(&self) -> usize {
		self.pending.borrow().len()
	}

	/// Run the callbacks of all requests that have finished so far, without
	/// blocking. Returns how many callbacks ran.
	pub fn poll(&self) -> usize {
		let mut completed = 0;
		loop {
			let next = self.receiver.borrow_mut().try_recv();
			match next {
				Ok(completion) => {
					self.complete(completion);
					completed += 1;
				}
				Err(TryRecvError::Empty | TryRecvError::Disconnected) => return completed,
			}
		}
	}

	/// Block the control thread until every outstanding request has run its
	/// callback.
	pub fn run_until_idle(&self) {
		while self.outstanding() > 0 {
			let mut receiver = self.receiver.borrow_mut();
			let next = self.handle.block_on(receiver.recv());
			drop(receiver);
			let Some(completion) = next else {
				return;
			};
			self.complete(completion);
		}
	}

	/// Queue a completion for the control thread.
	fn send(&self, completion: Completion) {
		let id = completion.id;
		if self.sender.send(completion).is_err() {
			error!(id, "Completion queue closed");
		}
	}

	/// Completion-side phase: turn a report into callback arguments and invoke
	/// the one callback it is meant for.
	fn complete(&self, completion: Completion) {
		let Completion { id, report } = completion;
		let removed = self.pending.borrow_mut().remove(&id);
		let Some(Pending { on_success, on_failure }) = removed else {
			error!(id, "Completion for unknown request");
			return;
		};

		let (target, (error, value)) = match report {
			Report::InvalidUri(err) => (Target::Failure, failure(&err)),
			Report::Worker(report) => match result(report) {
				Ok(entries) => (Target::Success, (None, Some(entries))),
				Err(err) => match self.config.failure_routing {
					FailureRouting::FailureCallback => (Target::Failure, failure(&err)),
					FailureRouting::SuccessCallback => (Target::Success, failure(&err)),
				},
			},
		};
		let (callback, spare) = match (target, on_failure) {
			(Target::Failure, Some(on_failure)) => (on_failure, Some(on_success)),
			(_, on_failure) => (on_success, on_failure),
		};

		debug!(id, failed = error.is_some(), "Search completed");
		callback(error, value);
		drop(spare);
	}
}

impl<D: Directory> Drop for Bridge<D> {
	fn drop(&mut self) {
		let Some(runtime) = self.runtime.take() else {
			return;
		};
		if Handle::try_current().is_ok() {
			warn!(outstanding = self.outstanding(), "Bridge dropped inside an async context");
			runtime.shutdown_background();
			return;
		}
		if !std::thread::panicking() {
			// Accepted requests still get their callback.
			self.run_until_idle();
		}
	}
}

impl<D: Directory> std::fmt::Debug for Bridge<D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Bridge")
			.field("config", &self.config)
			.field("outstanding", &self.outstanding())
			.finish_non_exhaustive()
	}
}

/// Interpret a worker report.
fn result(report: WorkerReport) -> Result<Value, Error> {
	if !report.connected {
		return Err(Error::Connect);
	}
	match report.outcome {
		SearchOutcome::Success(entries) => Ok(entry::to_value(&entries)),
		SearchOutcome::LibraryError(message) => Err(Error::Library(message)),
		SearchOutcome::NotAttempted => Err(Error::Library("Unknown error".to_owned())),
	}
}

/// Error-first callback arguments for a failure.
fn failure(err: &Error) -> (Option<String>, Option<Value>) {
	(Some(err.to_string()), None)
}
