use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

/// Append-only session transcript.
///
/// One timestamped line per ritual event, mirrored to stdout for
/// container logs.
pub struct Transcript {
    file: Mutex<std::fs::File>,
}

impl Transcript {
    pub fn new(path: &str) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub fn log(&self, action: &str, details: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] [{}] {}\n", timestamp, action, details);

        print!("{}", line);

        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }

    pub fn log_reveal(&self, card_name: &str) {
        self.log("REVEAL", card_name);
    }

    pub fn log_capture(&self, slot: &str, item: &str) {
        self.log("CAPTURE", &format!("[{}] {}", slot, item));
    }

    pub fn log_complete(&self, prompt: &str) {
        self.log("COMPLETE", prompt);
    }

    pub fn log_generate(&self, prompt: &str) {
        self.log("GENERATE", prompt);
    }

    pub fn log_error(&self, error: &str) {
        self.log("ERROR", error);
    }
}
