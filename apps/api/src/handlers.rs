pub mod forms;
pub mod groups;
pub mod health;
pub mod pages;
pub mod rows;
pub mod tables;
