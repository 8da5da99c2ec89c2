pub mod status;
pub mod voice_list;
