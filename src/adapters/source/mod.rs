mod json;

pub use json::JsonProgramSource;
