pub mod forms;
pub mod render;
pub mod usecase;
