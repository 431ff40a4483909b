//! Layout and navigation constants for the navigator.

/// Rows moved by PageUp/PageDown
pub const PAGE_SIZE: usize = 10;

/// Height of the breadcrumb header (one line plus borders)
pub const HEADER_HEIGHT: u16 = 3;

/// Height of the footer: key hints and the status line, plus borders
pub const FOOTER_HEIGHT: u16 = 4;

/// Height of the free-text entry box
pub const TEXT_BOX_HEIGHT: u16 = 3;

/// Maximum width of the error popup
pub const ERROR_POPUP_MAX_WIDTH: u16 = 72;

/// Minimum margin around the error popup
pub const ERROR_POPUP_MARGIN: u16 = 4;

/// Separator between breadcrumb segments
pub const BREADCRUMB_SEPARATOR: &str = " > ";

pub const INPUT_THREAD_NAME: &str = "pipedeck-input";
