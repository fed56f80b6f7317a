pub mod ls;
pub mod read_file;
pub mod write_file;
pub mod write_todos;
pub mod read_todos;
pub mod think;
pub mod web_search;
