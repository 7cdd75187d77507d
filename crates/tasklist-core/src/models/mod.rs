//! Data models for tasklist

mod todo;

pub use todo::{NewTodo, Todo, TodoId, TodoPatch};
