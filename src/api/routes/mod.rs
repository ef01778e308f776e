// API Routes Module

pub mod certificates;
pub mod health;
pub mod pages;
pub mod system;
