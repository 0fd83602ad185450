//! Module for [`JobSession`], the state machine of a single job

use std::path::{
	Path,
	PathBuf,
};

use crate::{
	data::job::JobDescriptor,
	main::{
		directory::{
			DirectorySelection,
			select_directory,
		},
		download::{
			DownloadProgress,
			ExecuteResult,
			execute,
		},
	},
	traits::{
		directory_prompt::DirectoryPrompt,
		options::ExecuteOptions,
	},
};

/// The states a [`JobSession`] can be in
///
/// `Idle -> DirectorySelected -> Running -> {Completed, Failed}`, and `Cancelled` from `Idle` or `DirectorySelected`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
	/// The job has been compiled, but no directory is selected yet
	Idle,
	/// A directory has been selected, the job can be started
	DirectorySelected,
	/// The job is currently executing
	Running,
	/// The job has finished successfully
	Completed,
	/// The job has failed while executing
	Failed,
	/// The user cancelled before the job was started
	Cancelled,
}

impl JobState {
	/// Get whether no more transitions are possible from this state
	pub fn is_terminal(&self) -> bool {
		return matches!(self, Self::Completed | Self::Failed | Self::Cancelled);
	}
}

impl std::fmt::Display for JobState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return write!(f, "{self:?}");
	}
}

/// Tracks a single [`JobDescriptor`] from selection to its end
#[derive(Debug)]
pub struct JobSession {
	job:       JobDescriptor,
	state:     JobState,
	directory: Option<PathBuf>,
}

impl JobSession {
	/// Create a new session in [`JobState::Idle`]
	pub fn new(job: JobDescriptor) -> Self {
		return Self {
			job,
			state: JobState::Idle,
			directory: None,
		};
	}

	/// Get the current state
	pub fn state(&self) -> JobState {
		return self.state;
	}

	/// Get the job this session is for
	pub fn job(&self) -> &JobDescriptor {
		return &self.job;
	}

	/// Get the selected directory, if any
	pub fn directory(&self) -> Option<&Path> {
		return self.directory.as_deref();
	}

	/// Move to "to", if allowed from the current state
	fn transition(&mut self, to: JobState) -> Result<(), crate::Error> {
		let allowed = matches!(
			(self.state, to),
			(JobState::Idle, JobState::DirectorySelected)
				| (JobState::Idle | JobState::DirectorySelected, JobState::Cancelled)
				| (JobState::DirectorySelected, JobState::Running)
				| (JobState::Running, JobState::Completed | JobState::Failed)
		);

		if !allowed {
			return Err(crate::Error::invalid_transition(self.state.to_string(), to.to_string()));
		}

		debug!("Job state {} -> {}", self.state, to);
		self.state = to;

		return Ok(());
	}

	/// Select a directory with the given prompt
	/// Moves to [`JobState::DirectorySelected`] or [`JobState::Cancelled`]
	pub fn select_directory<P: DirectoryPrompt>(&mut self, prompt: &mut P) -> Result<JobState, crate::Error> {
		// check before asking, so that the user is not asked needlessly
		if self.state != JobState::Idle {
			return Err(crate::Error::invalid_transition(
				self.state.to_string(),
				JobState::DirectorySelected.to_string(),
			));
		}

		match select_directory(prompt)? {
			DirectorySelection::Selected(path) => {
				self.transition(JobState::DirectorySelected)?;
				self.directory = Some(path);
			},
			DirectorySelection::Cancelled => self.transition(JobState::Cancelled)?,
		}

		return Ok(self.state);
	}

	/// Set a already validated directory directly, like from a command line argument
	pub fn set_directory<P: AsRef<Path>>(&mut self, directory: P) -> Result<(), crate::Error> {
		self.transition(JobState::DirectorySelected)?;
		self.directory = Some(directory.as_ref().to_owned());

		return Ok(());
	}

	/// Cancel the job, only possible before it has started
	pub fn cancel(&mut self) -> Result<(), crate::Error> {
		return self.transition(JobState::Cancelled);
	}

	/// Move to [`JobState::Running`] and get the job bound to the selected directory
	/// Use this when the job is executed elsewhere (like with [`crate::main::download::spawn_execute`]), and report the result with [`Self::finish`]
	pub fn start(&mut self) -> Result<JobDescriptor, crate::Error> {
		self.transition(JobState::Running)?;

		let Some(directory) = &self.directory else {
			return Err(crate::Error::other("Job is running without a selected directory"));
		};

		return Ok(self.job.with_output_directory(directory));
	}

	/// Move to [`JobState::Completed`] or [`JobState::Failed`] depending on the result
	pub fn finish<T>(&mut self, result: &Result<T, crate::Error>) -> Result<JobState, crate::Error> {
		match result {
			Ok(_) => self.transition(JobState::Completed)?,
			Err(_) => self.transition(JobState::Failed)?,
		}

		return Ok(self.state);
	}

	/// Run the job on the current thread, combining [`Self::start`], [`execute`] and [`Self::finish`]
	pub fn run<A: ExecuteOptions, C: FnMut(DownloadProgress)>(
		&mut self,
		options: &A,
		pgcb: C,
	) -> Result<ExecuteResult, crate::Error> {
		let job = self.start()?;

		let result = execute(&job, options, pgcb);
		self.finish(&result)?;

		return result;
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		data::job::compile,
		error::ErrorInner,
	};

	/// Prompt that always answers the same
	struct FixedPrompt(Option<PathBuf>);

	impl DirectoryPrompt for FixedPrompt {
		fn ask_directory(&mut self) -> Result<Option<PathBuf>, crate::Error> {
			return Ok(self.0.clone());
		}

		fn ask_retry(&mut self, _error: &crate::Error) -> Result<bool, crate::Error> {
			return Ok(false);
		}
	}

	fn new_session() -> JobSession {
		return JobSession::new(
			compile("video", "best", "My Title", "https://www.youtube.com/watch?v=aqz-KE-bpKQ")
				.expect("Expected compile to succeed"),
		);
	}

	fn assert_invalid_transition<T: std::fmt::Debug>(res: Result<T, crate::Error>) {
		let err = res.expect_err("Expected a error");
		assert!(
			matches!(err.inner(), ErrorInner::InvalidTransition(_, _)),
			"Expected InvalidTransition, got {err:?}"
		);
	}

	#[test]
	fn test_happy_path() {
		let tmpdir = tempfile::Builder::new()
			.prefix("ytpick-test-session-")
			.tempdir()
			.expect("Expected a temp dir to be created");
		let mut session = new_session();

		assert_eq!(JobState::Idle, session.state());
		assert_eq!(
			JobState::DirectorySelected,
			session
				.select_directory(&mut FixedPrompt(Some(tmpdir.path().to_owned())))
				.expect("Expected selection to succeed")
		);
		assert_eq!(Some(tmpdir.path()), session.directory());

		let bound = session.start().expect("Expected start to succeed");
		assert_eq!(JobState::Running, session.state());
		assert_eq!(tmpdir.path(), bound.output_directory());

		assert_eq!(
			JobState::Completed,
			session.finish(&Ok::<(), crate::Error>(())).expect("Expected finish to succeed")
		);
		assert!(session.state().is_terminal());
	}

	#[test]
	fn test_failed() {
		let mut session = new_session();
		session.set_directory("/tmp").expect("Expected set_directory to succeed");
		session.start().expect("Expected start to succeed");

		assert_eq!(
			JobState::Failed,
			session
				.finish(&Err::<(), _>(crate::Error::download_error("ERROR: x")))
				.expect("Expected finish to succeed")
		);
	}

	#[test]
	fn test_cancel_from_idle_and_selected() {
		let mut session = new_session();
		session.cancel().expect("Expected cancel to succeed");
		assert_eq!(JobState::Cancelled, session.state());

		let mut session = new_session();
		session.set_directory("/tmp").expect("Expected set_directory to succeed");
		session.cancel().expect("Expected cancel to succeed");
		assert_eq!(JobState::Cancelled, session.state());
	}

	#[test]
	fn test_cancel_by_prompt() {
		let mut session = new_session();

		assert_eq!(
			JobState::Cancelled,
			session
				.select_directory(&mut FixedPrompt(None))
				.expect("Expected selection to succeed")
		);
		assert_eq!(None, session.directory());
	}

	#[test]
	fn test_no_cancel_while_running() {
		let mut session = new_session();
		session.set_directory("/tmp").expect("Expected set_directory to succeed");
		session.start().expect("Expected start to succeed");

		assert_invalid_transition(session.cancel());
		assert_eq!(JobState::Running, session.state());
	}

	#[test]
	fn test_invalid_transitions() {
		// cannot start without a directory
		let mut session = new_session();
		assert_invalid_transition(session.start());

		// cannot finish without running
		assert_invalid_transition(session.finish(&Ok::<(), crate::Error>(())));

		// no transitions out of terminal states
		session.cancel().expect("Expected cancel to succeed");
		assert_invalid_transition(session.set_directory("/tmp"));
		assert_invalid_transition(session.select_directory(&mut FixedPrompt(Some(PathBuf::from("/tmp")))));
		assert_invalid_transition(session.start());
		assert_invalid_transition(session.cancel());

		// no restart after completion
		let mut session = new_session();
		session.set_directory("/tmp").expect("Expected set_directory to succeed");
		session.start().expect("Expected start to succeed");
		session.finish(&Ok::<(), crate::Error>(())).expect("Expected finish to succeed");
		assert_invalid_transition(session.start());
		assert_invalid_transition(session.finish(&Ok::<(), crate::Error>(())));
	}

	#[test]
	fn test_run_unbound_directory_fails_to_start() {
		let mut session = new_session();

		assert_invalid_transition(session.run(&crate::main::download::test_utils::TestOptions::default(), |_| ()));
		assert_eq!(JobState::Idle, session.state());
	}
}
