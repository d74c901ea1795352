pub mod date_field;
pub mod menu_format;
pub mod search_logic;
pub mod view_state;
