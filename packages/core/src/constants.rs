use std::env;
use std::path::PathBuf;

/// Get the path to the Taskpad directory (~/.taskpad)
pub fn taskpad_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".taskpad")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".taskpad")
    }
}

/// Get the path to the legacy todos.json snapshot (~/.taskpad/todos.json)
pub fn todos_file() -> PathBuf {
    taskpad_dir().join("todos.json")
}

/// Get the path to the SQLite database (~/.taskpad/taskpad.db)
pub fn database_file() -> PathBuf {
    taskpad_dir().join("taskpad.db")
}
