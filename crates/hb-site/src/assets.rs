//! Static assets bundled into every build.

/// Output path of the shared stylesheet, relative to the site root.
pub const STYLESHEET_PATH: &str = "assets/style.css";

/// Shared stylesheet contents.
pub const STYLESHEET: &str = include_str!("../assets/style.css");
