//! Utility modules for tutorial-fetch
//!
//! This module contains various utility functions organized by functionality:
//! - `files`: Cache directory management
//! - `http`: HTTP client and streaming downloads
//! - `archive`: Zip extraction

pub mod archive;
pub mod files;
pub mod http;
