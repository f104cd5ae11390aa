// src/models/mod.rs

pub mod question;
pub mod review;
pub mod submission;
