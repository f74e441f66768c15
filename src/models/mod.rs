// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod course;
pub mod user;

pub use course::{Course, NewCourse};
pub use user::User;
