// crates/api-hub-core/src/runtime/board.rs
// ============================================================================
// Module: API Hub Board
// Description: Kanban board with an explicit optimistic move state machine.
// Purpose: Apply status moves locally, persist them, and roll back on failure.
// Dependencies: crate::core, crate::runtime::service
// ============================================================================

//! ## Overview
//! A [`Board`] holds a snapshot of tasks grouped into the four status columns.
//! A status move runs through [`MoveState`]:
//!
//! ```text
//! Idle -> Pending -> Committed
//!            \-----> RolledBack
//! ```
//!
//! [`Board::begin_move`] applies the new status optimistically,
//! [`Board::commit`] finalizes it, and [`Board::rollback`] restores the prior
//! status while keeping the failure reason so the caller can surface it. Only
//! one move may be pending at a time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Task;
use crate::core::TaskId;
use crate::core::TaskStatus;
use crate::interfaces::TaskFilter;
use crate::runtime::service::HubService;
use crate::runtime::service::ServiceError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One in-flight or settled status move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTicket {
    /// Moved task.
    pub task_id: TaskId,
    /// Status before the move.
    pub from: TaskStatus,
    /// Requested status.
    pub to: TaskStatus,
}

/// Move state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MoveState {
    /// No move has started since the last settle.
    #[default]
    Idle,
    /// Move applied locally, awaiting persistence.
    Pending(MoveTicket),
    /// Move persisted.
    Committed(MoveTicket),
    /// Move failed and was reverted.
    RolledBack {
        /// Reverted move.
        ticket: MoveTicket,
        /// Failure reported by persistence.
        reason: String,
    },
}

/// Result of requesting a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Task already sits in the requested column; nothing happened.
    Unchanged,
    /// Move applied locally and awaiting commit or rollback.
    Pending(MoveTicket),
    /// Move persisted.
    Moved(MoveTicket),
}

/// Board errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Task is not on the board.
    #[error("task {0} is not on the board")]
    UnknownTask(TaskId),
    /// Another move is still pending.
    #[error("a move is already pending for task {0}")]
    MoveInFlight(TaskId),
    /// Ticket does not match the pending move.
    #[error("no pending move matches task {0}")]
    NoPendingMove(TaskId),
    /// Persisting the move failed; the board was rolled back.
    #[error("moving task {task_id} failed: {source}")]
    Persist {
        /// Task whose move was reverted.
        task_id: TaskId,
        /// Underlying failure.
        source: ServiceError,
    },
}

// ============================================================================
// SECTION: Board
// ============================================================================

/// Kanban board snapshot.
#[derive(Debug, Clone, Default)]
pub struct Board {
    /// Tasks on the board in display order.
    tasks: Vec<Task>,
    /// Current move state.
    state: MoveState,
}

impl Board {
    /// Builds a board from a task listing.
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks, state: MoveState::Idle }
    }

    /// Loads a board through the service.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when listing fails.
    pub fn load(service: &HubService, filter: &TaskFilter) -> Result<Self, ServiceError> {
        service.list_tasks(filter).map(Self::new)
    }

    /// Returns the tasks in one column, in display order.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.status == status).collect()
    }

    /// Returns every column in board order with its tasks.
    #[must_use]
    pub fn columns(&self) -> Vec<(TaskStatus, Vec<&Task>)> {
        TaskStatus::ALL.into_iter().map(|status| (status, self.column(status))).collect()
    }

    /// Returns a task on the board.
    #[must_use]
    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == task_id)
    }

    /// Returns the current move state.
    #[must_use]
    pub const fn state(&self) -> &MoveState {
        &self.state
    }

    /// Returns the failure of the last rolled-back move, if that is the latest state.
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        match &self.state {
            MoveState::RolledBack { reason, .. } => Some(reason),
            MoveState::Idle | MoveState::Pending(_) | MoveState::Committed(_) => None,
        }
    }

    /// Applies a status change locally and marks it pending.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownTask`] or [`BoardError::MoveInFlight`].
    pub fn begin_move(
        &mut self,
        task_id: &TaskId,
        to: TaskStatus,
    ) -> Result<MoveOutcome, BoardError> {
        if let MoveState::Pending(ticket) = &self.state {
            return Err(BoardError::MoveInFlight(ticket.task_id.clone()));
        }
        let task = self.task_mut(task_id)?;
        if task.status == to {
            return Ok(MoveOutcome::Unchanged);
        }
        let ticket = MoveTicket { task_id: task_id.clone(), from: task.status, to };
        task.status = to;
        self.state = MoveState::Pending(ticket.clone());
        Ok(MoveOutcome::Pending(ticket))
    }

    /// Finalizes the pending move, adopting the persisted record when given.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::NoPendingMove`] when the ticket is not pending.
    pub fn commit(
        &mut self,
        ticket: &MoveTicket,
        persisted: Option<Task>,
    ) -> Result<(), BoardError> {
        self.ensure_pending(ticket)?;
        if let Some(persisted) = persisted {
            let task = self.task_mut(&ticket.task_id)?;
            *task = persisted;
        }
        self.state = MoveState::Committed(ticket.clone());
        Ok(())
    }

    /// Reverts the pending move and records why.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::NoPendingMove`] when the ticket is not pending.
    pub fn rollback(
        &mut self,
        ticket: &MoveTicket,
        reason: impl Into<String>,
    ) -> Result<(), BoardError> {
        self.ensure_pending(ticket)?;
        let task = self.task_mut(&ticket.task_id)?;
        task.status = ticket.from;
        self.state = MoveState::RolledBack { ticket: ticket.clone(), reason: reason.into() };
        Ok(())
    }

    /// Moves a task: begin, persist through the service, then commit or roll back.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persist`] after rolling back a failed write.
    pub fn apply_move(
        &mut self,
        service: &HubService,
        task_id: &TaskId,
        to: TaskStatus,
    ) -> Result<MoveOutcome, BoardError> {
        let ticket = match self.begin_move(task_id, to)? {
            MoveOutcome::Pending(ticket) => ticket,
            outcome @ (MoveOutcome::Unchanged | MoveOutcome::Moved(_)) => return Ok(outcome),
        };
        match service.set_task_status(task_id, to) {
            Ok(persisted) => {
                self.commit(&ticket, Some(persisted))?;
                Ok(MoveOutcome::Moved(ticket))
            }
            Err(source) => {
                self.rollback(&ticket, source.to_string())?;
                Err(BoardError::Persist { task_id: task_id.clone(), source })
            }
        }
    }

    /// Checks that a ticket is the pending move.
    fn ensure_pending(&self, ticket: &MoveTicket) -> Result<(), BoardError> {
        match &self.state {
            MoveState::Pending(pending) if pending == ticket => Ok(()),
            _ => Err(BoardError::NoPendingMove(ticket.task_id.clone())),
        }
    }

    /// Returns a mutable task on the board.
    fn task_mut(&mut self, task_id: &TaskId) -> Result<&mut Task, BoardError> {
        self.tasks
            .iter_mut()
            .find(|task| &task.id == task_id)
            .ok_or_else(|| BoardError::UnknownTask(task_id.clone()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use super::Board;
    use super::BoardError;
    use super::MoveOutcome;
    use super::MoveState;
    use crate::core::TaskStatus;
    use crate::interfaces::HubStore;
    use crate::interfaces::NewProject;
    use crate::interfaces::NewTask;
    use crate::interfaces::TaskFields;
    use crate::interfaces::TaskFilter;
    use crate::runtime::service::HubService;
    use crate::runtime::store::InMemoryHubStore;
    use crate::runtime::store::SharedHubStore;

    fn seeded() -> (HubService, Board, crate::core::TaskId) {
        let service = HubService::new(SharedHubStore::from_store(InMemoryHubStore::new()));
        let project = service
            .create_project(NewProject {
                name: "Orders".to_string(),
                description: None,
                graphql_endpoint: None,
            })
            .unwrap();
        let task = service
            .create_task(NewTask {
                project_id: project.id,
                status: TaskStatus::Planning,
                created_by: None,
                fields: TaskFields { title: "List orders".to_string(), ..TaskFields::default() },
            })
            .unwrap();
        let board = Board::load(&service, &TaskFilter::default()).unwrap();
        (service, board, task.id)
    }

    #[test]
    fn move_to_same_column_is_unchanged() {
        let (service, mut board, task_id) = seeded();
        let outcome = board.apply_move(&service, &task_id, TaskStatus::Planning).unwrap();
        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(board.state(), &MoveState::Idle);
    }

    #[test]
    fn successful_move_commits_and_persists() {
        let (service, mut board, task_id) = seeded();
        let outcome = board.apply_move(&service, &task_id, TaskStatus::Mocking).unwrap();
        assert!(matches!(outcome, MoveOutcome::Moved(_)));
        assert!(matches!(board.state(), MoveState::Committed(_)));
        assert_eq!(board.column(TaskStatus::Mocking).len(), 1);
        assert_eq!(service.get_task(&task_id).unwrap().status, TaskStatus::Mocking);
    }

    #[test]
    fn failed_persist_rolls_back_and_reports() {
        let (service, mut board, task_id) = seeded();
        assert!(service.store().delete_task(&task_id).unwrap());
        let err = board.apply_move(&service, &task_id, TaskStatus::Done).unwrap_err();
        assert!(matches!(err, BoardError::Persist { .. }));
        assert_eq!(board.task(&task_id).unwrap().status, TaskStatus::Planning);
        assert!(board.last_failure().is_some());
    }

    #[test]
    fn only_one_move_may_be_pending() {
        let (_service, mut board, task_id) = seeded();
        let MoveOutcome::Pending(ticket) = board.begin_move(&task_id, TaskStatus::Done).unwrap()
        else {
            panic!("expected pending move");
        };
        assert_eq!(board.column(TaskStatus::Done).len(), 1);
        assert!(matches!(
            board.begin_move(&task_id, TaskStatus::Mocking),
            Err(BoardError::MoveInFlight(_))
        ));
        board.rollback(&ticket, "network down").unwrap();
        assert_eq!(board.column(TaskStatus::Planning).len(), 1);
        assert_eq!(board.last_failure(), Some("network down"));
        assert!(matches!(board.commit(&ticket, None), Err(BoardError::NoPendingMove(_))));
    }
}
