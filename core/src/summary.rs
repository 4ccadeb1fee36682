//! Derived figures a list view shows next to the todos.

use crate::types::Todo;

/// Number of todos not yet completed.
pub fn items_left(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| !todo.completed).count()
}

/// `"1 item left"`, `"3 items left"`.
pub fn items_left_label(todos: &[Todo]) -> String {
    let count = items_left(todos);
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} item{plural} left")
}
