pub mod platform;
pub mod twilio;

#[cfg(test)]
pub(crate) mod recording;
