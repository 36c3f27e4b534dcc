use std::time::SystemTime;

/// Pipeline status shown to the user and logged on shutdown
#[derive(Clone, Debug, Default)]
pub struct PipelineStatus {
    pub busy: bool,
    pub last_capture_time: Option<SystemTime>,
    pub capture_count: u64,
    pub save_count: u64,
    pub error_count: u64,
    pub current_message: String,
}

impl PipelineStatus {
    pub fn record_capture(&mut self) {
        self.capture_count += 1;
        self.last_capture_time = Some(SystemTime::now());
    }

    pub fn record_save(&mut self) {
        self.save_count += 1;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_count += 1;
        self.current_message = message.into();
    }

    pub fn set_message(&mut self, message: impl Into<String>, busy: bool) {
        self.current_message = message.into();
        self.busy = busy;
    }
}
