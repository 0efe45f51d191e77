pub mod clock;
pub mod email_index;
