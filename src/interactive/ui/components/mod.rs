pub mod error_popup;
pub mod selection_list;
pub mod text_input;
