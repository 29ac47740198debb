pub mod clear_session;
pub mod create_sms_chat;
pub mod flow_lookup;
pub mod gateway;
