pub mod command_list;
pub mod message_counter;
