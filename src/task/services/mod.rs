//! Application services for task lifecycle orchestration.

mod board;

pub use board::{
    BoardView, CreateTaskRequest, TaskAssignee, TaskBoardError, TaskBoardResult, TaskBoardService,
};
